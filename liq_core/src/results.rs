//! # Analysis Results
//!
//! Result records produced by the engine, the per-method result store, and
//! the LPI summary. Undefined quantities stay `None` in here; the textual
//! `"-"` placeholder belongs to the report layer alone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::methods::Method;

/// Earthquake scenarios evaluated for every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Design-level event at the zone's base magnitude
    Design,
    /// Moderate event, magnitude reduced by 0.2
    MidEq,
    /// Maximum-considered event, magnitude raised by 0.2
    MaxEq,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Design, Scenario::MidEq, Scenario::MaxEq];

    /// Moment-magnitude adjustment relative to the zone's base magnitude
    pub fn mw_adjustment(&self) -> f64 {
        match self {
            Scenario::Design => 0.0,
            Scenario::MidEq => -0.2,
            Scenario::MaxEq => 0.2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Scenario::Design => "Design",
            Scenario::MidEq => "MidEq",
            Scenario::MaxEq => "MaxEq",
        }
    }
}

/// Scenario-dependent outputs for one layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValues {
    pub mw: Option<f64>,
    pub a_value: Option<f64>,
    /// Site-amplified short-period spectral accelerations fed to A_value
    pub sds: Option<f64>,
    pub sms: Option<f64>,
    pub msf: Option<f64>,
    pub rd: Option<f64>,
    pub csr: Option<f64>,
    pub crr: Option<f64>,
    pub fs: Option<f64>,
    pub lpi: Option<f64>,
}

/// Full per-layer, per-method analysis record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerAnalysisResult {
    pub borehole_id: String,
    pub layer_id: Uuid,
    pub method: Method,
    pub top_depth: f64,
    pub bottom_depth: f64,
    pub soil_depth: f64,
    pub thickness: f64,
    pub mid_depth: f64,
    pub analysis_depth: f64,
    pub uscs: Option<String>,
    pub spt_n: Option<f64>,
    pub sigma_v: f64,
    pub sigma_v_csr: f64,
    pub sigma_v_crr: f64,
    pub n60: Option<f64>,
    pub n1_60: Option<f64>,
    pub n1_60cs: Option<f64>,
    pub vs: Option<f64>,
    pub crr_7_5: Option<f64>,
    /// Exclusion reason when susceptibility screening rejected the layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screened: Option<String>,
    pub design: ScenarioValues,
    pub mid_eq: ScenarioValues,
    pub max_eq: ScenarioValues,
}

impl LayerAnalysisResult {
    pub fn scenario(&self, scenario: Scenario) -> &ScenarioValues {
        match scenario {
            Scenario::Design => &self.design,
            Scenario::MidEq => &self.mid_eq,
            Scenario::MaxEq => &self.max_eq,
        }
    }
}

/// LPI accumulation stops at this depth; the crossing layer is clipped
pub const LPI_SUMMARY_DEPTH_M: f64 = 20.0;

/// Per-borehole liquefaction potential index, one value per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoreholeLpiSummary {
    pub borehole_id: String,
    pub x: f64,
    pub y: f64,
    pub surface_elevation: Option<f64>,
    pub design_lpi: f64,
    pub mid_eq_lpi: f64,
    pub max_eq_lpi: f64,
    /// Profile-averaged shear-wave velocity, when enough layers had one
    pub vs30: Option<f64>,
}

impl BoreholeLpiSummary {
    pub fn lpi(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Design => self.design_lpi,
            Scenario::MidEq => self.mid_eq_lpi,
            Scenario::MaxEq => self.max_eq_lpi,
        }
    }
}

/// Sum a scenario's LPI over one borehole's ordered layer results.
///
/// Accumulation stops at 20 m: the first layer crossing the cutoff counts
/// in full (per-layer LPI is already zero for analysis depths below 20 m)
/// and ends the sum; layers starting at or below 20 m never contribute.
pub fn sum_lpi(results: &[LayerAnalysisResult], scenario: Scenario) -> f64 {
    let mut total = 0.0;
    for result in results {
        let layer_top = result.soil_depth - result.thickness;
        if layer_top >= LPI_SUMMARY_DEPTH_M {
            break;
        }
        if let Some(lpi) = result.scenario(scenario).lpi {
            total += lpi;
        }
        if result.soil_depth >= LPI_SUMMARY_DEPTH_M {
            break;
        }
    }
    total
}

/// Stores analysis results per method.
///
/// Re-running a method replaces only that method's results; the other
/// methods' stores are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultStore {
    results: HashMap<Method, Vec<LayerAnalysisResult>>,
    summaries: HashMap<Method, Vec<BoreholeLpiSummary>>,
}

impl ResultStore {
    pub fn new() -> Self {
        ResultStore::default()
    }

    /// Replace one method's results and summaries
    pub fn replace_method(
        &mut self,
        method: Method,
        results: Vec<LayerAnalysisResult>,
        summaries: Vec<BoreholeLpiSummary>,
    ) {
        self.results.insert(method, results);
        self.summaries.insert(method, summaries);
    }

    pub fn results_for(&self, method: Method) -> &[LayerAnalysisResult] {
        self.results.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summaries_for(&self, method: Method) -> &[BoreholeLpiSummary] {
        self.summaries.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.results.keys().copied().collect();
        methods.sort_by_key(|m| m.display_name());
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_row(soil_depth: f64, thickness: f64, lpi: Option<f64>) -> LayerAnalysisResult {
        LayerAnalysisResult {
            borehole_id: "BH-01".to_string(),
            layer_id: Uuid::new_v4(),
            method: Method::Nceer,
            top_depth: soil_depth - thickness,
            bottom_depth: soil_depth,
            soil_depth,
            thickness,
            mid_depth: soil_depth - thickness / 2.0,
            analysis_depth: soil_depth - thickness / 2.0,
            uscs: Some("SM".to_string()),
            spt_n: Some(10.0),
            sigma_v: 1.0,
            sigma_v_csr: 1.0,
            sigma_v_crr: 1.0,
            n60: Some(12.0),
            n1_60: Some(15.0),
            n1_60cs: Some(15.0),
            vs: None,
            crr_7_5: Some(0.15),
            screened: None,
            design: ScenarioValues {
                lpi,
                ..Default::default()
            },
            mid_eq: ScenarioValues::default(),
            max_eq: ScenarioValues::default(),
        }
    }

    #[test]
    fn test_sum_lpi_plain() {
        let rows = vec![
            result_row(5.0, 5.0, Some(2.0)),
            result_row(10.0, 5.0, Some(3.0)),
        ];
        assert_eq!(sum_lpi(&rows, Scenario::Design), 5.0);
    }

    #[test]
    fn test_sum_lpi_cutoff_at_twenty_metres() {
        let rows = vec![
            result_row(18.0, 18.0, Some(4.0)),
            // spans 18-22 m: the crossing layer counts in full and ends the sum
            result_row(22.0, 4.0, Some(2.0)),
            // entirely below 20 m, never reached
            result_row(26.0, 4.0, Some(9.0)),
        ];
        assert_eq!(sum_lpi(&rows, Scenario::Design), 6.0);

        // a layer starting exactly at the cutoff contributes nothing
        let rows = vec![
            result_row(20.0, 20.0, Some(4.0)),
            result_row(24.0, 4.0, Some(2.0)),
        ];
        assert_eq!(sum_lpi(&rows, Scenario::Design), 4.0);
    }

    #[test]
    fn test_sum_lpi_skips_undefined_layers() {
        let rows = vec![
            result_row(5.0, 5.0, None),
            result_row(10.0, 5.0, Some(1.5)),
        ];
        assert_eq!(sum_lpi(&rows, Scenario::Design), 1.5);
    }

    #[test]
    fn test_store_per_method_replacement() {
        let mut store = ResultStore::new();
        store.replace_method(Method::Nceer, vec![result_row(5.0, 5.0, Some(2.0))], vec![]);
        store.replace_method(Method::Hbf, vec![result_row(5.0, 5.0, Some(9.0))], vec![]);

        // re-running NCEER replaces only NCEER
        store.replace_method(Method::Nceer, vec![result_row(6.0, 6.0, Some(1.0))], vec![]);
        assert_eq!(store.results_for(Method::Nceer).len(), 1);
        assert_eq!(store.results_for(Method::Nceer)[0].soil_depth, 6.0);
        assert_eq!(store.results_for(Method::Hbf)[0].soil_depth, 5.0);
        assert!(store.results_for(Method::Aij).is_empty());
    }

    #[test]
    fn test_scenario_adjustments() {
        assert_eq!(Scenario::Design.mw_adjustment(), 0.0);
        assert_eq!(Scenario::MidEq.mw_adjustment(), -0.2);
        assert_eq!(Scenario::MaxEq.mw_adjustment(), 0.2);
    }
}
