//! Hyperbolic function (HBF) method, the common Taiwan-practice variant.
//!
//! Shares the NCEER resistance curve but carries its own additive fines
//! correction, the piecewise-linear rd profile, a capped magnitude scaling
//! factor for large events, and the generic blow-count Vs correlation.

use super::{
    power_law_msf, rational_crr_7_5, LiquefactionMethod, Method, GENERIC_EXCLUDED_USCS,
};
use crate::profile::ProfileLayer;
use crate::spt;

pub struct Hbf;

impl LiquefactionMethod for Hbf {
    fn method(&self) -> Method {
        Method::Hbf
    }

    fn screen(&self, layer: &ProfileLayer) -> Option<String> {
        let uscs = layer.layer.uscs.as_deref().unwrap_or("");
        if GENERIC_EXCLUDED_USCS.contains(&uscs) {
            return Some(format!("{uscs} judged non-liquefiable"));
        }
        if let (Some(fc), Some(pi)) = (layer.fines_content, layer.layer.plasticity.numeric()) {
            if fc > 35.0 && pi > 18.0 {
                return Some(format!(
                    "fines {fc:.0}% with PI {pi:.0} judged non-liquefiable"
                ));
            }
        }
        None
    }

    fn fines_correction(&self, fines_content: f64) -> (f64, f64) {
        if fines_content <= 5.0 {
            (0.0, 1.0)
        } else if fines_content <= 35.0 {
            (0.2 * (fines_content - 5.0), 1.0)
        } else {
            (6.0, 1.0)
        }
    }

    fn crr_7_5(&self, n1_60cs: f64) -> Option<f64> {
        rational_crr_7_5(n1_60cs)
    }

    /// Piecewise-linear rd (Liao & Whitman form), floored at 0.1
    fn rd(&self, z: f64) -> f64 {
        let rd = if z < 9.15 {
            1.0 - 0.00765 * z
        } else if z < 23.0 {
            1.174 - 0.0267 * z
        } else if z < 30.0 {
            0.744 - 0.008 * z
        } else {
            0.5
        };
        rd.max(0.1)
    }

    /// Power law below Mw 7.5, capped at 0.84 for larger events
    fn msf(&self, mw: f64) -> f64 {
        if mw < 7.5 {
            power_law_msf(mw)
        } else {
            0.84
        }
    }

    fn estimate_vs(&self, _uscs: Option<&str>, _n: Option<f64>, n1_60: f64) -> Option<f64> {
        spt::vs_generic(n1_60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fines_correction_bands() {
        assert_eq!(Hbf.fines_correction(5.0), (0.0, 1.0));
        assert_eq!(Hbf.fines_correction(15.0), (2.0, 1.0));
        assert_eq!(Hbf.fines_correction(35.0), (6.0, 1.0));
        assert_eq!(Hbf.fines_correction(60.0), (6.0, 1.0));
    }

    #[test]
    fn test_rd_piecewise_continuity() {
        // segments meet within rounding slack at the published breakpoints
        let left = Hbf.rd(9.149);
        let right = Hbf.rd(9.151);
        assert!((left - right).abs() < 0.01);
        assert_relative_eq!(Hbf.rd(0.0), 1.0);
        assert!(Hbf.rd(29.0) >= 0.1);
    }

    #[test]
    fn test_msf_capped_above_reference_magnitude() {
        assert!(Hbf.msf(6.5) > 1.0);
        assert_relative_eq!(Hbf.msf(7.5), 0.84);
        assert_relative_eq!(Hbf.msf(8.3), 0.84);
    }

    #[test]
    fn test_vs_uses_generic_correlation() {
        let vs = Hbf.estimate_vs(Some("SM"), Some(10.0), 15.0).unwrap();
        assert_relative_eq!(vs, 114.4 * 15.0f64.powf(0.302), epsilon = 1e-9);
    }
}
