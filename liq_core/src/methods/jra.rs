//! Japan Road Association (JRA) method.
//!
//! Shares the AIJ screening set and fines correction, adds a plasticity-index
//! exclusion, and uses a lower blow-count threshold in the resistance curve.

use super::{power_law_msf, sqrt_crr_7_5, Aij, LiquefactionMethod, Method};
use crate::profile::ProfileLayer;
use crate::spt;

/// Blow-count threshold for the high-resistance branch of the CRR curve
const NA_THRESHOLD: f64 = 14.0;

/// Plasticity index above which the layer is judged non-liquefiable
const PI_LIMIT: f64 = 15.0;

pub struct Jra;

impl LiquefactionMethod for Jra {
    fn method(&self) -> Method {
        Method::Jra
    }

    fn screen(&self, layer: &ProfileLayer) -> Option<String> {
        Aij::screen_japanese(layer, Some(PI_LIMIT))
    }

    fn fines_correction(&self, fines_content: f64) -> (f64, f64) {
        Aij::japanese_fines_correction(fines_content)
    }

    fn crr_7_5(&self, n1_60cs: f64) -> Option<f64> {
        sqrt_crr_7_5(n1_60cs, NA_THRESHOLD)
    }

    fn rd(&self, z: f64) -> f64 {
        1.0 - 0.015 * z
    }

    fn msf(&self, mw: f64) -> f64 {
        power_law_msf(mw)
    }

    fn estimate_vs(&self, uscs: Option<&str>, n: Option<f64>, _n1_60: f64) -> Option<f64> {
        spt::vs_by_soil_class(uscs, n?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PlasticityIndex;
    use crate::project::SoilLayer;
    use uuid::Uuid;

    fn profile_row(uscs: &str, plasticity: PlasticityIndex) -> ProfileLayer {
        ProfileLayer {
            layer: SoilLayer {
                id: Uuid::new_v4(),
                top_depth: 0.0,
                bottom_depth: 2.0,
                sample_id: None,
                uscs: Some(uscs.to_string()),
                spt_n: Some(10.0),
                unit_weight: Some(1.9),
                fines_content: Some(20.0),
                plasticity,
                silt_percent: None,
                clay_percent: None,
                water_content: None,
            },
            soil_depth: 2.0,
            thickness: 2.0,
            mid_depth: 1.0,
            analysis_depth: 1.0,
            unit_weight: 1.9,
            sigma_v: 1.9,
            sigma_v_csr: 1.9,
            sigma_v_crr: 1.9,
            fines_content: Some(20.0),
        }
    }

    #[test]
    fn test_plasticity_exclusion() {
        // PI 18 passes AIJ but fails JRA's 15 limit
        let row = profile_row("SM", PlasticityIndex::Value(18.0));
        assert!(Jra.screen(&row).is_some());
        assert!(Aij.screen(&row).is_none());

        let row = profile_row("SM", PlasticityIndex::NonPlastic);
        assert!(Jra.screen(&row).is_none());
    }

    #[test]
    fn test_lower_threshold_than_aij() {
        // between the two thresholds only JRA's quartic term is active
        let jra = Jra.crr_7_5(15.0).unwrap();
        let aij = Aij.crr_7_5(15.0).unwrap();
        assert!(jra > aij);
    }
}
