//! # Project Data Model
//!
//! An [`AnalysisProject`] owns everything one liquefaction study needs:
//! metadata, analysis settings, and the borehole logs with their soil layers.
//! The whole tree is JSON-serializable and carries no derived state; analysis
//! results live in their own store keyed by borehole.
//!
//! Upstream data usually arrives as a flat table of layer records (one row per
//! sampled interval). [`AnalysisProject::from_records`] groups those rows into
//! boreholes, resolves loosely-typed fields, and reports every dropped row as
//! a warning.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::methods::Method;
use crate::normalize::{
    parse_numeric, resolve_plasticity_index, PlasticityIndex, UnitWeightUnit,
};
use crate::seismic::SeismicContext;

/// Current schema version for serialized projects
pub const SCHEMA_VERSION: &str = "1.0";

/// Default SPT hammer energy efficiency (percent)
pub const DEFAULT_EM_VALUE: f64 = 72.0;

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub schema_version: String,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        ProjectMetadata {
            name: name.into(),
            engineer: None,
            description: None,
            created: now,
            modified: now,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// Settings shared by every borehole in a project run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Liquefaction analysis method
    pub method: Method,
    /// SPT hammer energy efficiency (percent, 0 < Em <= 100)
    pub em_value: f64,
    /// Unit system of the unit-weight column
    pub unit_weight_unit: UnitWeightUnit,
    /// Whether near-fault spectral interpolation is enabled
    pub use_fault_data: bool,
    /// Project-wide groundwater-table override (m below surface)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gwt_override: Option<f64>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            method: Method::Nceer,
            em_value: DEFAULT_EM_VALUE,
            unit_weight_unit: UnitWeightUnit::TPerM3,
            use_fault_data: false,
            gwt_override: None,
        }
    }
}

/// One soil layer of a borehole log, fields already resolved to typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilLayer {
    pub id: Uuid,
    /// Depth to layer top (m below surface)
    pub top_depth: f64,
    /// Depth to layer bottom (m below surface)
    pub bottom_depth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<String>,
    /// USCS soil classification symbol (e.g. "SM", "CL")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uscs: Option<String>,
    /// SPT blow count (refusal ">N" already resolved to N)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spt_n: Option<f64>,
    /// Unit weight in the project's declared unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_weight: Option<f64>,
    /// Fines content (percent passing #200 sieve)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fines_content: Option<f64>,
    pub plasticity: PlasticityIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silt_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clay_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_content: Option<f64>,
}

impl SoilLayer {
    /// Layer thickness in metres
    pub fn thickness(&self) -> f64 {
        self.bottom_depth - self.top_depth
    }
}

/// One borehole with its ordered soil layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borehole {
    pub id: Uuid,
    /// Field identifier from the drilling log (e.g. "BH-01")
    pub borehole_id: String,
    /// Easting, TWD97 metres
    pub x: f64,
    /// Northing, TWD97 metres
    pub y: f64,
    /// Ground surface elevation (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_elevation: Option<f64>,
    /// Groundwater depth (m below surface)
    pub water_depth: f64,
    /// Administrative district, carried into the seismic context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Administrative village, enables basin micro-zone matching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    pub layers: Vec<SoilLayer>,
    /// Resolved seismic parameters, populated during a run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seismic: Option<SeismicContext>,
}

impl Borehole {
    /// Layers sorted by top depth (processing order)
    pub fn sorted_layers(&self) -> Vec<&SoilLayer> {
        let mut layers: Vec<&SoilLayer> = self.layers.iter().collect();
        layers.sort_by(|a, b| a.top_depth.total_cmp(&b.top_depth));
        layers
    }
}

/// A complete liquefaction analysis project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProject {
    pub id: Uuid,
    pub meta: ProjectMetadata,
    pub settings: AnalysisSettings,
    pub boreholes: Vec<Borehole>,
}

/// Flat upstream ingestion record: one sampled interval of one borehole.
///
/// Loosely-typed fields (`spt_n`, `plastic_index`) stay as raw strings here;
/// grouping resolves them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerRecord {
    pub borehole_id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub surface_elevation: Option<f64>,
    pub water_depth: Option<f64>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub top_depth: Option<f64>,
    pub bottom_depth: Option<f64>,
    pub sample_id: Option<String>,
    pub uscs: Option<String>,
    pub spt_n: Option<String>,
    pub unit_weight: Option<f64>,
    pub fines_content: Option<f64>,
    pub plastic_index: Option<String>,
    pub silt_percent: Option<f64>,
    pub clay_percent: Option<f64>,
    pub water_content: Option<f64>,
}

impl AnalysisProject {
    pub fn new(name: impl Into<String>, settings: AnalysisSettings) -> Self {
        AnalysisProject {
            id: Uuid::new_v4(),
            meta: ProjectMetadata::new(name),
            settings,
            boreholes: Vec::new(),
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Group flat layer records into boreholes.
    ///
    /// Records are validated row by row; a dropped row never aborts the
    /// grouping. Drop rules:
    /// - missing `borehole_id`, `top_depth`, or `bottom_depth`,
    /// - `top_depth >= bottom_depth`,
    /// - a `sample_id` that does not start with `S` (non-SPT sample).
    ///
    /// Returns the project plus one warning per dropped row.
    pub fn from_records(
        name: impl Into<String>,
        settings: AnalysisSettings,
        records: Vec<LayerRecord>,
    ) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut groups: BTreeMap<String, (LayerRecord, Vec<SoilLayer>)> = BTreeMap::new();

        for (index, record) in records.into_iter().enumerate() {
            let row = index + 1;
            let Some(borehole_id) = record.borehole_id.clone().filter(|s| !s.trim().is_empty())
            else {
                warnings.push(format!("row {row}: missing borehole_id, record dropped"));
                continue;
            };
            let (Some(top), Some(bottom)) = (record.top_depth, record.bottom_depth) else {
                warnings.push(format!(
                    "row {row} ({borehole_id}): missing layer depths, record dropped"
                ));
                continue;
            };
            if top >= bottom {
                warnings.push(format!(
                    "row {row} ({borehole_id}): top depth {top} >= bottom depth {bottom}, record dropped"
                ));
                continue;
            }
            if let Some(sample_id) = record.sample_id.as_deref() {
                if !sample_id.trim().to_ascii_uppercase().starts_with('S') {
                    warnings.push(format!(
                        "row {row} ({borehole_id}): non-SPT sample '{sample_id}' skipped"
                    ));
                    continue;
                }
            }

            let spt_n = record.spt_n.as_deref().and_then(parse_numeric);
            let (plasticity, pi_warning) =
                resolve_plasticity_index(record.plastic_index.as_deref());
            if let Some(w) = pi_warning {
                warnings.push(format!("row {row} ({borehole_id}): {w}"));
            }

            let layer = SoilLayer {
                id: Uuid::new_v4(),
                top_depth: top,
                bottom_depth: bottom,
                sample_id: record.sample_id.clone(),
                uscs: record.uscs.clone().map(|s| s.trim().to_ascii_uppercase()),
                spt_n,
                unit_weight: record.unit_weight,
                fines_content: record.fines_content,
                plasticity,
                silt_percent: record.silt_percent,
                clay_percent: record.clay_percent,
                water_content: record.water_content,
            };

            groups
                .entry(borehole_id)
                .or_insert_with(|| (record, Vec::new()))
                .1
                .push(layer);
        }

        let boreholes = groups
            .into_iter()
            .map(|(borehole_id, (first, mut layers))| {
                layers.sort_by(|a, b| a.top_depth.total_cmp(&b.top_depth));
                Borehole {
                    id: Uuid::new_v4(),
                    borehole_id,
                    x: first.x.unwrap_or(0.0),
                    y: first.y.unwrap_or(0.0),
                    surface_elevation: first.surface_elevation,
                    water_depth: first.water_depth.unwrap_or(0.0),
                    district: first.district,
                    village: first.village,
                    layers,
                    seismic: None,
                }
            })
            .collect();

        let mut project = AnalysisProject::new(name, settings);
        project.boreholes = boreholes;
        (project, warnings)
    }

    /// Groundwater depth for a borehole, honouring the project override
    pub fn effective_water_depth(&self, borehole: &Borehole) -> f64 {
        self.settings.gwt_override.unwrap_or(borehole.water_depth)
    }
}
