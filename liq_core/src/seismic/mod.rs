//! # Seismic Parameter Resolution
//!
//! Resolves the design spectral accelerations and design-earthquake magnitude
//! for a borehole coordinate. Resolution walks a fixed priority chain and
//! records which stage produced the answer:
//!
//! 1. Taipei-basin micro-zone (village match): spectral values used directly,
//!    no site amplification downstream.
//! 2. Near-fault interpolation, when fault data is enabled, a fault lies
//!    within 14 km, and a distance table exists for it.
//! 3. General administrative zone (coordinate box).
//! 4. Region-wide defaults.
//!
//! Coordinates outside the supported bounding box are an error here; the
//! caller recovers per borehole with [`SeismicContext::fallback`].

pub mod fault;
pub mod zones;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

pub use fault::{FaultDistanceTable, FaultGeometry, FaultTableSet, NearestFault, NoFaultData};
pub use zones::{base_magnitude, estimate_vs30, in_bounds, site_class, GroundClass};

/// Which stage of the priority chain produced the spectral parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SeismicSource {
    /// Interpolated from a near-fault distance table
    FaultInterpolated { fault: String, distance_km: f64 },
    /// Taipei-basin micro-zone constants (no Fa amplification)
    BasinMicroZone { zone: String },
    /// General administrative zone table
    GeneralZone { city: String },
    /// Region-wide fallback values
    Default,
}

/// Resolved seismic parameters for one borehole site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicContext {
    pub city: String,
    pub district: Option<String>,
    pub village: Option<String>,
    /// Design-earthquake moment magnitude before scenario adjustment
    pub base_mw: f64,
    /// Design spectral acceleration (short period)
    pub sds: f64,
    /// Maximum-considered spectral acceleration (short period)
    pub sms: f64,
    /// One-second spectral accelerations, when the source provides them
    pub sd1: Option<f64>,
    pub sm1: Option<f64>,
    pub vs30: f64,
    pub site_class: char,
    pub source: SeismicSource,
}

impl SeismicContext {
    /// Whether site amplification (Fa) must be skipped downstream
    pub fn bypasses_amplification(&self) -> bool {
        matches!(self.source, SeismicSource::BasinMicroZone { .. })
    }

    /// Ground class for the site-amplification table
    pub fn ground_class(&self) -> GroundClass {
        GroundClass::from_vs30(self.vs30)
    }

    /// Region-wide fallback context, used when a coordinate cannot be
    /// resolved (out of bounds or lookup failure).
    pub fn fallback() -> Self {
        SeismicContext {
            city: "Unknown".to_string(),
            district: None,
            village: None,
            base_mw: zones::DEFAULT_MW,
            sds: zones::DEFAULT_SDS,
            sms: zones::DEFAULT_SMS,
            sd1: None,
            sm1: None,
            vs30: 450.0,
            site_class: zones::site_class(450.0),
            source: SeismicSource::Default,
        }
    }
}

/// Resolves seismic contexts against the built-in tables and an optional
/// fault-geometry provider.
pub struct SeismicResolver<'a> {
    fault_provider: &'a dyn FaultGeometry,
    fault_tables: &'a FaultTableSet,
    use_fault_data: bool,
}

impl<'a> SeismicResolver<'a> {
    pub fn new(
        fault_provider: &'a dyn FaultGeometry,
        fault_tables: &'a FaultTableSet,
        use_fault_data: bool,
    ) -> Self {
        SeismicResolver {
            fault_provider,
            fault_tables,
            use_fault_data,
        }
    }

    /// Resolver with no fault data; everything goes through zone tables.
    pub fn zones_only() -> SeismicResolver<'static> {
        static NO_FAULTS: NoFaultData = NoFaultData;
        static EMPTY_TABLES: once_cell::sync::Lazy<FaultTableSet> =
            once_cell::sync::Lazy::new(FaultTableSet::default);
        SeismicResolver {
            fault_provider: &NO_FAULTS,
            fault_tables: &EMPTY_TABLES,
            use_fault_data: false,
        }
    }

    /// Resolve the seismic context for a site.
    ///
    /// `village` enables the basin micro-zone match; `district` is carried
    /// through for reporting. Pass `None` when the administrative
    /// subdivision is unknown.
    pub fn resolve(
        &self,
        x: f64,
        y: f64,
        district: Option<&str>,
        village: Option<&str>,
    ) -> EngineResult<SeismicContext> {
        if !zones::in_bounds(x, y) {
            return Err(EngineError::out_of_bounds(x, y));
        }

        let general = zones::find_general_zone(x, y);
        let city = general.map(|z| z.city.to_string()).unwrap_or_else(|| "Unknown".to_string());
        let base_mw = zones::base_magnitude(&city);
        let vs30 = zones::estimate_vs30(x, y);
        let class = zones::site_class(vs30);

        // Basin micro-zones override everything, including fault proximity.
        if let Some(zone) = village.and_then(zones::find_basin_zone) {
            log::debug!("site ({x}, {y}) resolved via basin micro-zone {}", zone.name);
            return Ok(SeismicContext {
                city,
                district: district.map(str::to_string),
                village: village.map(str::to_string),
                base_mw,
                sds: zone.sds,
                sms: zone.sms,
                sd1: None,
                sm1: None,
                vs30,
                site_class: class,
                source: SeismicSource::BasinMicroZone {
                    zone: zone.name.to_string(),
                },
            });
        }

        // The Taipei basin sits on deep alluvium; fault attenuation tables do
        // not apply to boreholes in Taipei or New Taipei even when no
        // micro-zone matched.
        let basin_exempt = matches!(city.as_str(), "Taipei" | "New Taipei");
        if self.use_fault_data && !basin_exempt {
            if let Some(nearest) = self.fault_provider.nearest_fault(x, y) {
                if nearest.distance_km <= fault::MAX_FAULT_DISTANCE_KM {
                    match self.fault_tables.get(&nearest.name) {
                        Ok(table) => {
                            let (sds, sms) = table.interpolate(nearest.distance_km);
                            log::debug!(
                                "site ({x}, {y}) resolved via fault {} at {:.1} km",
                                nearest.name,
                                nearest.distance_km
                            );
                            return Ok(SeismicContext {
                                city,
                                district: district.map(str::to_string),
                                village: village.map(str::to_string),
                                base_mw,
                                sds,
                                sms,
                                sd1: None,
                                sm1: None,
                                vs30,
                                site_class: class,
                                source: SeismicSource::FaultInterpolated {
                                    fault: nearest.name,
                                    distance_km: nearest.distance_km,
                                },
                            });
                        }
                        Err(_) => {
                            log::warn!(
                                "no distance table for fault '{}'; falling back to zone lookup",
                                nearest.name
                            );
                        }
                    }
                }
            }
        }

        if let Some(zone) = general {
            return Ok(SeismicContext {
                city: zone.city.to_string(),
                district: district.map(str::to_string),
                village: village.map(str::to_string),
                base_mw,
                sds: zone.sds,
                sms: zone.sms,
                sd1: Some(zone.sd1),
                sm1: Some(zone.sm1),
                vs30,
                site_class: class,
                source: SeismicSource::GeneralZone {
                    city: zone.city.to_string(),
                },
            });
        }

        log::debug!("site ({x}, {y}) matched no zone; using region defaults");
        Ok(SeismicContext {
            city,
            district: district.map(str::to_string),
            village: village.map(str::to_string),
            base_mw,
            sds: zones::DEFAULT_SDS,
            sms: zones::DEFAULT_SMS,
            sd1: None,
            sm1: None,
            vs30,
            site_class: class,
            source: SeismicSource::Default,
        })
    }
}
