//! NCEER workshop simplified procedure (Youd & Idriss, 2001).

use super::{
    power_law_msf, rational_crr_7_5, LiquefactionMethod, Method, GENERIC_EXCLUDED_USCS,
};
use crate::profile::ProfileLayer;
use crate::spt;

pub struct Nceer;

impl LiquefactionMethod for Nceer {
    fn method(&self) -> Method {
        Method::Nceer
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
            let a = (1.76 - 190.0 / fines_content.powi(2)).exp();
            let b = 0.99 + fines_content.powf(1.5) / 1000.0;
            (a, b)
        } else {
            (5.0, 1.2)
        }
    }

    fn crr_7_5(&self, n1_60cs: f64) -> Option<f64> {
        rational_crr_7_5(n1_60cs)
    }

    /// Rational-polynomial rd profile from the NCEER workshop report
    fn rd(&self, z: f64) -> f64 {
        let sqrt_z = z.sqrt();
        let numerator = 1.0 - 0.4113 * sqrt_z + 0.04052 * z + 0.001753 * z.powf(1.5);
        let denominator =
            1.0 - 0.4117 * sqrt_z + 0.05729 * z - 0.006205 * z.powf(1.5) + 0.001210 * z.powi(2);
        numerator / denominator
    }

    fn msf(&self, mw: f64) -> f64 {
        power_law_msf(mw)
    }

    fn estimate_vs(&self, uscs: Option<&str>, n: Option<f64>, _n1_60: f64) -> Option<f64> {
        spt::vs_by_soil_class(uscs, n?)
    }
}
