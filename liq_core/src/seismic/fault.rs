//! # Near-Fault Spectral Interpolation
//!
//! Sites close to an active fault take their spectral parameters from
//! fault-specific attenuation tables instead of the administrative zone. The
//! geometry itself (where the faults are) is an external concern behind the
//! [`FaultGeometry`] trait; this module owns the distance-binned tables and
//! the interpolation over them.

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Representative distances (km) at which fault tables carry values
pub const FAULT_BINS: [f64; 8] = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 14.0];

/// Beyond this distance the fault has no spectral influence
pub const MAX_FAULT_DISTANCE_KM: f64 = 14.0;

/// Nearest active fault to a site, as reported by a geometry provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestFault {
    pub name: String,
    pub distance_km: f64,
}

/// Source of fault geometry.
///
/// Implementations typically wrap a GIS layer or a pre-computed spatial index.
/// Returning `None` means no fault is near enough to matter.
pub trait FaultGeometry: Send + Sync {
    fn nearest_fault(&self, x: f64, y: f64) -> Option<NearestFault>;
}

/// A provider with no fault data; every site resolves through zone tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaultData;

impl FaultGeometry for NoFaultData {
    fn nearest_fault(&self, _x: f64, _y: f64) -> Option<NearestFault> {
        None
    }
}

/// Spectral values of one fault at the representative distances.
///
/// `sds`/`sms` arrays are indexed parallel to [`FAULT_BINS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultDistanceTable {
    pub fault_name: String,
    pub sds: [f64; 8],
    pub sms: [f64; 8],
}

impl FaultDistanceTable {
    /// Interpolate spectral values at `distance_km`.
    ///
    /// Distances at or below the first bin use the first bin's values;
    /// distances beyond [`MAX_FAULT_DISTANCE_KM`] are the caller's problem
    /// (checked before lookup) and clamp to the last bin here.
    pub fn interpolate(&self, distance_km: f64) -> (f64, f64) {
        (
            interpolate_binned(&self.sds, distance_km),
            interpolate_binned(&self.sms, distance_km),
        )
    }
}

fn interpolate_binned(values: &[f64; 8], distance_km: f64) -> f64 {
    if distance_km <= FAULT_BINS[0] {
        return values[0];
    }
    if distance_km >= FAULT_BINS[7] {
        return values[7];
    }
    for i in 0..7 {
        let (lo, hi) = (FAULT_BINS[i], FAULT_BINS[i + 1]);
        if distance_km <= hi {
            let t = (distance_km - lo) / (hi - lo);
            return values[i] + t * (values[i + 1] - values[i]);
        }
    }
    values[7]
}

/// Collection of fault tables, keyed by fault name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultTableSet {
    tables: Vec<FaultDistanceTable>,
}

impl FaultTableSet {
    pub fn new(tables: Vec<FaultDistanceTable>) -> Self {
        FaultTableSet { tables }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up a fault's table by name
    pub fn get(&self, fault_name: &str) -> EngineResult<&FaultDistanceTable> {
        self.tables
            .iter()
            .find(|t| t.fault_name == fault_name)
            .ok_or_else(|| {
                EngineError::calculation_failed(
                    format!("fault '{}'", fault_name),
                    "no distance table registered for this fault",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_table() -> FaultDistanceTable {
        FaultDistanceTable {
            fault_name: "Sanchiao".to_string(),
            sds: [1.0, 0.95, 0.9, 0.85, 0.8, 0.75, 0.7, 0.68],
            sms: [1.4, 1.33, 1.26, 1.19, 1.12, 1.05, 0.98, 0.95],
        }
    }

    #[test]
    fn test_interpolation_at_bin_centers() {
        let table = sample_table();
        let (sds, sms) = table.interpolate(5.0);
        assert_relative_eq!(sds, 0.9);
        assert_relative_eq!(sms, 1.26);
    }

    #[test]
    fn test_interpolation_between_bins() {
        let table = sample_table();
        // halfway between 3 km (0.95) and 5 km (0.9)
        let (sds, _) = table.interpolate(4.0);
        assert_relative_eq!(sds, 0.925);
    }

    #[test]
    fn test_interpolation_clamps_outside_bins() {
        let table = sample_table();
        let (near, _) = table.interpolate(0.2);
        assert_relative_eq!(near, 1.0);
        let (far, _) = table.interpolate(14.0);
        assert_relative_eq!(far, 0.68);
    }

    #[test]
    fn test_table_set_lookup() {
        let set = FaultTableSet::new(vec![sample_table()]);
        assert!(set.get("Sanchiao").is_ok());
        assert!(set.get("Chelungpu").is_err());
        assert!(FaultTableSet::default().is_empty());
    }

    #[test]
    fn test_no_fault_data_provider() {
        assert_eq!(NoFaultData.nearest_fault(300_000.0, 2_770_000.0), None);
    }
}
