//! # Analysis Method Dispatch
//!
//! Four SPT-based liquefaction assessment methods are built in: HBF, NCEER,
//! AIJ, and JRA. They share one calculation skeleton (see `engine`) and differ
//! only in the pieces behind the [`LiquefactionMethod`] trait: susceptibility
//! screening, fines correction, resistance curve, stress-reduction profile,
//! magnitude scaling, and shear-wave estimation.
//!
//! Adding a method means implementing the trait and registering it in
//! [`MethodRegistry::resolve`]; nothing in the skeleton changes.

mod aij;
mod hbf;
mod jra;
mod nceer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::profile::ProfileLayer;

pub use aij::Aij;
pub use hbf::Hbf;
pub use jra::Jra;
pub use nceer::Nceer;

/// Built-in liquefaction analysis methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Hyperbolic function method (Taiwan practice)
    Hbf,
    /// NCEER workshop simplified procedure
    Nceer,
    /// Architectural Institute of Japan method
    Aij,
    /// Japan Road Association method
    Jra,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Hbf, Method::Nceer, Method::Aij, Method::Jra];

    pub fn display_name(&self) -> &'static str {
        match self {
            Method::Hbf => "HBF",
            Method::Nceer => "NCEER",
            Method::Aij => "AIJ",
            Method::Jra => "JRA",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Method {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HBF" => Ok(Method::Hbf),
            "NCEER" => Ok(Method::Nceer),
            "AIJ" => Ok(Method::Aij),
            "JRA" => Ok(Method::Jra),
            other => Err(EngineError::unsupported_method(other)),
        }
    }
}

/// Method-specific pieces of the liquefaction calculation.
///
/// Implementations are stateless; every input arrives through the call.
pub trait LiquefactionMethod: Send + Sync {
    fn method(&self) -> Method;

    /// Susceptibility screening. Returns the exclusion reason when the layer
    /// is judged non-liquefiable (FS reported as the 3.0 ceiling).
    fn screen(&self, layer: &ProfileLayer) -> Option<String>;

    /// Fines-correction pair `(a, b)` for (N1)60cs = a + b · (N1)60
    fn fines_correction(&self, fines_content: f64) -> (f64, f64);

    /// Cyclic resistance ratio at the reference magnitude 7.5.
    /// `None` means the curve is undefined for this blow count.
    fn crr_7_5(&self, n1_60cs: f64) -> Option<f64>;

    /// Stress-reduction coefficient at depth `z` (m)
    fn rd(&self, z: f64) -> f64;

    /// Magnitude scaling factor at moment magnitude `mw`
    fn msf(&self, mw: f64) -> f64;

    /// Per-layer shear-wave velocity estimate (m/s)
    fn estimate_vs(&self, uscs: Option<&str>, n: Option<f64>, n1_60: f64) -> Option<f64>;
}

/// Resolves a [`Method`] tag to its implementation.
pub struct MethodRegistry;

impl MethodRegistry {
    pub fn resolve(method: Method) -> EngineResult<Box<dyn LiquefactionMethod>> {
        match method {
            Method::Hbf => Ok(Box::new(Hbf)),
            Method::Nceer => Ok(Box::new(Nceer)),
            Method::Aij => Ok(Box::new(Aij)),
            Method::Jra => Ok(Box::new(Jra)),
        }
    }
}

/// Power-law magnitude scaling factor (Mw / 7.5)^-2.56, shared by every
/// built-in method.
pub(crate) fn power_law_msf(mw: f64) -> f64 {
    (mw / 7.5).powf(-2.56)
}

/// Four-term rational CRR7.5 curve shared by the HBF and NCEER methods.
///
/// Defined for x < 30; 0.25 at or above 30. Floored at 0.01.
pub(crate) fn rational_crr_7_5(x: f64) -> Option<f64> {
    if !x.is_finite() || x < 0.0 {
        return None;
    }
    if x >= 30.0 {
        return Some(0.25);
    }
    let crr = 1.0 / (34.0 - x) + x / 135.0 + 50.0 / (10.0 * x + 45.0).powi(2) - 1.0 / 200.0;
    Some(crr.max(0.01))
}

/// Square-root CRR7.5 curve shared by the AIJ and JRA methods, with the
/// method's blow-count threshold for the high-resistance branch.
pub(crate) fn sqrt_crr_7_5(na: f64, threshold: f64) -> Option<f64> {
    if !na.is_finite() || na < 0.0 {
        return None;
    }
    let base = 0.0882 * (na / 1.7).sqrt();
    if na >= threshold {
        Some(base + 1.6e-6 * (na - threshold).powf(4.5))
    } else {
        Some(base)
    }
}

/// USCS symbols every built-in method treats as non-liquefiable
pub(crate) const GENERIC_EXCLUDED_USCS: [&str; 8] =
    ["CH", "MH", "OH", "PT", "GW", "GP", "GM", "GC"];
