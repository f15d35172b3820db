//! # Input Normalization
//!
//! Field-level parsing and unit handling for raw borehole records.
//!
//! Upstream data arrives as loosely-typed strings: SPT blow counts may carry a
//! `">50"` refusal prefix, plasticity index may be the non-plastic marker
//! `"NP"`, and unit weights come in either t/m³ or kN/m³ depending on the lab.
//! Everything here resolves those conventions into plain numbers before any
//! physics runs.

use serde::{Deserialize, Serialize};

/// Parse a loosely-formatted numeric field.
///
/// Accepts plain numbers and the refusal convention `">N"` (the prefix is
/// stripped and the bound itself is used). Blank strings, `"-"`, and
/// non-finite values resolve to `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let stripped = trimmed.strip_prefix('>').map(str::trim).unwrap_or(trimmed);
    match stripped.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Resolved plasticity index of a layer.
///
/// `NonPlastic` carries numeric value 0.0 but keeps its provenance so
/// screening rules and the report layer can distinguish "NP" from a measured
/// zero or a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PlasticityIndex {
    /// No plasticity index recorded
    Absent,
    /// Explicit non-plastic marker ("NP")
    NonPlastic,
    /// Measured plasticity index
    Value(f64),
}

impl PlasticityIndex {
    /// Numeric value used in screening comparisons (`NonPlastic` counts as 0)
    pub fn numeric(&self) -> Option<f64> {
        match self {
            PlasticityIndex::Absent => None,
            PlasticityIndex::NonPlastic => Some(0.0),
            PlasticityIndex::Value(v) => Some(*v),
        }
    }

    /// Textual form for reports (round-trips "NP")
    pub fn display(&self) -> String {
        match self {
            PlasticityIndex::Absent => "-".to_string(),
            PlasticityIndex::NonPlastic => "NP".to_string(),
            PlasticityIndex::Value(v) => format!("{}", v),
        }
    }
}

/// Resolve a raw plasticity-index field.
///
/// Returns the resolved index plus an optional warning when the field was
/// present but unparsable (treated as absent).
pub fn resolve_plasticity_index(raw: Option<&str>) -> (PlasticityIndex, Option<String>) {
    let Some(raw) = raw else {
        return (PlasticityIndex::Absent, None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return (PlasticityIndex::Absent, None);
    }
    if trimmed.eq_ignore_ascii_case("np") {
        return (PlasticityIndex::NonPlastic, None);
    }
    match parse_numeric(trimmed) {
        Some(v) => (PlasticityIndex::Value(v), None),
        None => (
            PlasticityIndex::Absent,
            Some(format!("unparsable plasticity index '{}' treated as absent", trimmed)),
        ),
    }
}

/// Resolve a possibly-missing unit weight.
///
/// Missing values resolve to 0.0. There is deliberately no forward-fill from
/// neighbouring layers: a zero unit weight contributes zero overburden and
/// the layer's own stress terms collapse, which keeps the substitution visible
/// in the results instead of silently inventing soil.
pub fn resolve_unit_weight(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Unit system of the unit-weight column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitWeightUnit {
    /// Tonnes per cubic metre (the engine's internal unit)
    TPerM3,
    /// Kilonewtons per cubic metre
    KnPerM3,
}

impl UnitWeightUnit {
    /// Factor converting a value in this unit to t/m³
    pub fn conversion_factor(&self) -> f64 {
        match self {
            UnitWeightUnit::TPerM3 => 1.0,
            UnitWeightUnit::KnPerM3 => 1.0 / 9.81,
        }
    }

    /// Human-readable unit label
    pub fn display_name(&self) -> &'static str {
        match self {
            UnitWeightUnit::TPerM3 => "t/m3",
            UnitWeightUnit::KnPerM3 => "kN/m3",
        }
    }
}

impl Default for UnitWeightUnit {
    fn default() -> Self {
        UnitWeightUnit::TPerM3
    }
}

/// Detect the unit system of a unit-weight sample set.
///
/// Three scored heuristics vote between t/m³ and kN/m³:
/// - mean inside the typical band for a unit scores 3,
/// - min/max both inside the plausible range scores 2,
/// - more than 70% of samples inside the broad range scores 1.
///
/// Ties (including an empty sample set) keep `default`.
pub fn detect_unit_weight_unit(samples: &[f64], default: UnitWeightUnit) -> UnitWeightUnit {
    let values: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if values.is_empty() {
        return default;
    }

    let mut t_score = 0u32;
    let mut kn_score = 0u32;

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if (1.0..=3.0).contains(&mean) {
        t_score += 3;
    } else if (9.8..=30.0).contains(&mean) {
        kn_score += 3;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (0.8..=3.5).contains(&min) && (1.5..=4.0).contains(&max) {
        t_score += 2;
    } else if (8.0..=35.0).contains(&min) && (12.0..=40.0).contains(&max) {
        kn_score += 2;
    }

    let frac_t = values.iter().filter(|v| (0.5..=4.0).contains(*v)).count() as f64
        / values.len() as f64;
    let frac_kn = values.iter().filter(|v| (8.0..=40.0).contains(*v)).count() as f64
        / values.len() as f64;
    if frac_t > 0.7 {
        t_score += 1;
    }
    if frac_kn > 0.7 {
        kn_score += 1;
    }

    if t_score > kn_score {
        UnitWeightUnit::TPerM3
    } else if kn_score > t_score {
        UnitWeightUnit::KnPerM3
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_plain_and_refusal() {
        assert_eq!(parse_numeric("12.5"), Some(12.5));
        assert_eq!(parse_numeric(" 7 "), Some(7.0));
        assert_eq!(parse_numeric(">50"), Some(50.0));
        assert_eq!(parse_numeric("> 50"), Some(50.0));
    }

    #[test]
    fn test_parse_numeric_rejects_blank_and_garbage() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("   "), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("NaN"), None);
    }

    #[test]
    fn test_plasticity_index_np_round_trip() {
        let (pi, warning) = resolve_plasticity_index(Some("NP"));
        assert_eq!(pi, PlasticityIndex::NonPlastic);
        assert!(warning.is_none());
        assert_eq!(pi.numeric(), Some(0.0));
        assert_eq!(pi.display(), "NP");

        let (pi, _) = resolve_plasticity_index(Some("np"));
        assert_eq!(pi, PlasticityIndex::NonPlastic);
    }

    #[test]
    fn test_plasticity_index_values_and_warnings() {
        let (pi, warning) = resolve_plasticity_index(Some("22.5"));
        assert_eq!(pi, PlasticityIndex::Value(22.5));
        assert!(warning.is_none());

        let (pi, warning) = resolve_plasticity_index(Some("high"));
        assert_eq!(pi, PlasticityIndex::Absent);
        assert!(warning.is_some());

        let (pi, warning) = resolve_plasticity_index(None);
        assert_eq!(pi, PlasticityIndex::Absent);
        assert!(warning.is_none());
    }

    #[test]
    fn test_resolve_unit_weight_missing_is_zero() {
        assert_eq!(resolve_unit_weight(Some(1.85)), 1.85);
        assert_eq!(resolve_unit_weight(None), 0.0);
        assert_eq!(resolve_unit_weight(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_conversion_factors() {
        assert_eq!(UnitWeightUnit::TPerM3.conversion_factor(), 1.0);
        let kn = UnitWeightUnit::KnPerM3.conversion_factor();
        assert!((kn - 1.0 / 9.81).abs() < 1e-12);
    }

    #[test]
    fn test_detect_unit_t_per_m3() {
        let samples = [1.8, 1.9, 2.0, 1.75, 1.95];
        assert_eq!(
            detect_unit_weight_unit(&samples, UnitWeightUnit::KnPerM3),
            UnitWeightUnit::TPerM3
        );
    }

    #[test]
    fn test_detect_unit_kn_per_m3() {
        let samples = [17.6, 18.8, 19.5, 17.2, 19.1];
        assert_eq!(
            detect_unit_weight_unit(&samples, UnitWeightUnit::TPerM3),
            UnitWeightUnit::KnPerM3
        );
    }

    #[test]
    fn test_detect_unit_tie_keeps_default() {
        assert_eq!(
            detect_unit_weight_unit(&[], UnitWeightUnit::KnPerM3),
            UnitWeightUnit::KnPerM3
        );
        // values outside every band score nothing for either side
        let odd = [500.0, 600.0];
        assert_eq!(
            detect_unit_weight_unit(&odd, UnitWeightUnit::TPerM3),
            UnitWeightUnit::TPerM3
        );
    }
}
