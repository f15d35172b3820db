//! # SPT Correction Pipeline
//!
//! Standard-penetration-test blow counts go through three corrections before
//! they reach a resistance curve: energy (N60), overburden ((N1)60), and
//! fines content ((N1)60cs). The fines pair `(a, b)` is method-specific and
//! supplied by the method implementation; everything else is shared.
//!
//! Shear-wave velocity estimation also lives here: per-layer Vs from blow
//! count and soil class, and the travel-time average Vs30 over a profile.

use crate::profile::ProfileLayer;

/// Atmospheric reference pressure for the overburden correction (t/m²)
const PA: f64 = 100.0;

/// Overburden-correction cap
const CN_MAX: f64 = 1.7;

/// Effective-stress floor guarding the overburden correction
const SIGMA_FLOOR: f64 = 0.1;

/// Energy-corrected blow count N60 = N · Em / 60
pub fn n60(n: f64, em_value: f64) -> f64 {
    n * em_value / 60.0
}

/// Overburden-corrected blow count (N1)60.
///
/// Cn = min(√(Pa / σ'v), 1.7), with the effective stress floored at 0.1 t/m²
/// so shallow layers cannot blow the correction up.
pub fn n1_60(n60: f64, sigma_v_crr: f64) -> f64 {
    let sigma = sigma_v_crr.max(SIGMA_FLOOR);
    let cn = (PA / sigma).sqrt().min(CN_MAX);
    cn * n60
}

/// Clean-sand equivalent blow count (N1)60cs = a + b · (N1)60,
/// with the method's fines-correction pair.
pub fn n1_60cs(n1_60: f64, fines_pair: (f64, f64)) -> f64 {
    let (a, b) = fines_pair;
    a + b * n1_60
}

/// USCS symbols treated as granular for Vs estimation
const GRANULAR: [&str; 8] = ["GW", "GP", "SW", "SP", "GM", "GC", "SM", "SC"];
/// USCS symbols treated as cohesive for Vs estimation
const COHESIVE: [&str; 6] = ["ML", "CL", "OL", "MH", "CH", "OH"];

/// Shear-wave velocity from blow count, conditioned on soil class.
///
/// Granular soils: 80 · min(N, 50)^⅓; cohesive soils: 100 · min(N, 25)^⅓.
/// Unclassifiable soils return `None`.
pub fn vs_by_soil_class(uscs: Option<&str>, n: f64) -> Option<f64> {
    let uscs = uscs?;
    if GRANULAR.contains(&uscs) {
        Some(80.0 * n.min(50.0).cbrt())
    } else if COHESIVE.contains(&uscs) {
        Some(100.0 * n.min(25.0).cbrt())
    } else {
        None
    }
}

/// Generic shear-wave velocity correlation 114.4 · (N1)60^0.302,
/// independent of soil class.
pub fn vs_generic(n1_60: f64) -> Option<f64> {
    if n1_60 <= 0.0 {
        return None;
    }
    Some(114.4 * n1_60.powf(0.302))
}

/// Travel-time averaged Vs30 over a profile: Σd / Σ(d/Vs).
///
/// Rows without a velocity or with non-positive thickness are skipped;
/// returns `None` when nothing contributes.
pub fn profile_vs30(rows: &[(&ProfileLayer, Option<f64>)]) -> Option<f64> {
    let mut total_thickness = 0.0;
    let mut total_travel = 0.0;
    for (row, vs) in rows {
        let Some(vs) = vs else { continue };
        if row.thickness <= 0.0 || *vs <= 0.0 {
            continue;
        }
        total_thickness += row.thickness;
        total_travel += row.thickness / vs;
    }
    if total_travel > 0.0 {
        Some(total_thickness / total_travel)
    } else {
        None
    }
}
