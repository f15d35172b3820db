//! Architectural Institute of Japan (AIJ) method.

use super::{power_law_msf, sqrt_crr_7_5, LiquefactionMethod, Method, GENERIC_EXCLUDED_USCS};
use crate::profile::ProfileLayer;
use crate::spt;

/// Blow-count threshold for the high-resistance branch of the CRR curve
const NA_THRESHOLD: f64 = 16.0;

pub struct Aij;

impl Aij {
    pub(crate) fn screen_japanese(
        layer: &ProfileLayer,
        pi_limit: Option<f64>,
    ) -> Option<String> {
        let uscs = layer.layer.uscs.as_deref().unwrap_or("");
        if GENERIC_EXCLUDED_USCS.contains(&uscs) || uscs == "CL" || uscs == "SC" {
            return Some(format!("{uscs} judged non-liquefiable"));
        }
        if let Some(fc) = layer.fines_content {
            if fc > 35.0 {
                return Some(format!("fines {fc:.0}% judged non-liquefiable"));
            }
        }
        if let Some(limit) = pi_limit {
            if let Some(pi) = layer.layer.plasticity.numeric() {
                if pi > limit {
                    return Some(format!("PI {pi:.0} judged non-liquefiable"));
                }
            }
        }
        None
    }

    pub(crate) fn japanese_fines_correction(fines_content: f64) -> (f64, f64) {
        if fines_content <= 10.0 {
            (0.0, 1.0)
        } else {
            // FC > 35 is screened out before correction; clamp for safety
            ((fines_content.min(35.0) - 10.0) / 6.0, 1.05)
        }
    }
}

impl LiquefactionMethod for Aij {
    fn method(&self) -> Method {
        Method::Aij
    }

    fn screen(&self, layer: &ProfileLayer) -> Option<String> {
        Aij::screen_japanese(layer, None)
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
    use approx::assert_relative_eq;
    use uuid::Uuid;

    fn profile_row(uscs: &str, fines: Option<f64>) -> ProfileLayer {
        ProfileLayer {
            layer: SoilLayer {
                id: Uuid::new_v4(),
                top_depth: 0.0,
                bottom_depth: 2.0,
                sample_id: None,
                uscs: Some(uscs.to_string()),
                spt_n: Some(10.0),
                unit_weight: Some(1.9),
                fines_content: fines,
                plasticity: PlasticityIndex::Absent,
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
            fines_content: fines,
        }
    }

    #[test]
    fn test_screening_stricter_than_generic() {
        // CL passes the generic screen but not the Japanese one
        assert!(Aij.screen(&profile_row("CL", Some(20.0))).is_some());
        assert!(Aij.screen(&profile_row("SC", Some(20.0))).is_some());
        // high fines excluded outright, without a plasticity condition
        assert!(Aij.screen(&profile_row("SM", Some(40.0))).is_some());
        assert!(Aij.screen(&profile_row("SM", Some(20.0))).is_none());
    }

    #[test]
    fn test_fines_correction_bands() {
        assert_eq!(Aij.fines_correction(8.0), (0.0, 1.0));
        let (a, b) = Aij.fines_correction(22.0);
        assert_relative_eq!(a, 2.0);
        assert_relative_eq!(b, 1.05);
    }

    #[test]
    fn test_rd_linear() {
        assert_relative_eq!(Aij.rd(0.0), 1.0);
        assert_relative_eq!(Aij.rd(10.0), 0.85);
    }

    #[test]
    fn test_crr_threshold_branch() {
        let below = Aij.crr_7_5(10.0).unwrap();
        assert_relative_eq!(below, 0.0882 * (10.0f64 / 1.7).sqrt(), epsilon = 1e-12);
        assert!(Aij.crr_7_5(20.0).unwrap() > 0.0882 * (20.0f64 / 1.7).sqrt());
    }
}
