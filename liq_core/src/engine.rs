//! # Liquefaction Resistance Engine
//!
//! The scenario skeleton shared by every analysis method: magnitude
//! clamping, site amplification, design ground acceleration, cyclic stress
//! and resistance ratios, the factor of safety, and the per-layer LPI
//! contribution. Method-specific pieces are injected through
//! [`LiquefactionMethod`].

use crate::methods::LiquefactionMethod;
use crate::profile::ProfileLayer;
use crate::results::{LayerAnalysisResult, Scenario, ScenarioValues};
use crate::seismic::{GroundClass, SeismicContext};
use crate::spt;

/// Scenario moment magnitudes are clamped to this range
pub const MW_MIN: f64 = 5.0;
pub const MW_MAX: f64 = 8.5;

/// Factor-of-safety reporting ceiling
pub const FS_CEILING: f64 = 3.0;

/// Clamped scenario magnitude
pub fn scenario_mw(base_mw: f64, scenario: Scenario) -> f64 {
    (base_mw + scenario.mw_adjustment()).clamp(MW_MIN, MW_MAX)
}

/// Site-amplification factor Fa for a short-period spectral value.
///
/// Rows are ground classes, columns the spectral bands
/// (<=0.5, 0.6, 0.7, 0.8, >=0.9); values between published points fall into
/// the nearest band below.
pub fn fa(ground_class: GroundClass, spectral: f64) -> f64 {
    const TABLE: [[f64; 5]; 3] = [
        [1.0, 1.0, 1.0, 1.0, 1.0],
        [1.1, 1.1, 1.0, 1.0, 1.0],
        [1.2, 1.2, 1.1, 1.0, 1.0],
    ];
    let row = match ground_class {
        GroundClass::First => 0,
        GroundClass::Second => 1,
        GroundClass::Third => 2,
    };
    let column = if spectral <= 0.5 {
        0
    } else if spectral <= 0.65 {
        1
    } else if spectral <= 0.75 {
        2
    } else if spectral <= 0.85 {
        3
    } else {
        4
    };
    TABLE[row][column]
}

/// Site-adjusted spectral accelerations (SD_S, SM_S).
///
/// Basin micro-zone values already include site response and bypass Fa.
pub fn site_adjusted_spectra(seismic: &SeismicContext) -> (f64, f64) {
    if seismic.bypasses_amplification() {
        (seismic.sds, seismic.sms)
    } else {
        let class = seismic.ground_class();
        (
            fa(class, seismic.sds) * seismic.sds,
            fa(class, seismic.sms) * seismic.sms,
        )
    }
}

/// Design ground acceleration for a scenario, from the site-adjusted spectra
pub fn a_value(scenario: Scenario, sd_s: f64, sm_s: f64) -> f64 {
    match scenario {
        Scenario::Design => 0.4 * sd_s,
        Scenario::MidEq => 0.4 * sd_s / 4.2,
        Scenario::MaxEq => 0.4 * sm_s,
    }
}

/// Cyclic stress ratio 0.65 · A · (σv / σ'v) · rd.
///
/// Undefined when the effective stress is not positive.
pub fn csr(a_value: f64, sigma_v: f64, sigma_v_csr: f64, rd: f64) -> Option<f64> {
    if sigma_v_csr <= 0.0 {
        return None;
    }
    Some(0.65 * a_value * (sigma_v / sigma_v_csr) * rd)
}

/// Factor of safety CRR / CSR, capped at the reporting ceiling.
///
/// A missing or non-positive CSR means no meaningful demand; the ceiling is
/// reported.
pub fn factor_of_safety(crr: f64, csr: Option<f64>) -> f64 {
    match csr {
        Some(csr) if csr > 0.0 => (crr / csr).min(FS_CEILING),
        _ => FS_CEILING,
    }
}

/// Per-layer LPI contribution max(0, 1−FS) · w(z) · thickness with
/// w(z) = max(0, 10 − 0.5·z); zero below 20 m.
pub fn lpi_contribution(fs: f64, z: f64, thickness: f64) -> f64 {
    if z > 20.0 {
        return 0.0;
    }
    let weight = (10.0 - 0.5 * z).max(0.0);
    (1.0 - fs).max(0.0) * weight * thickness
}

/// Analyze one profile row under one method across all three scenarios.
pub fn analyze_layer(
    method: &dyn LiquefactionMethod,
    row: &ProfileLayer,
    seismic: &SeismicContext,
    borehole_id: &str,
    em_value: f64,
) -> LayerAnalysisResult {
    let screened = method.screen(row);

    let n60 = row.layer.spt_n.map(|n| spt::n60(n, em_value));
    let n1_60 = n60.map(|n60| spt::n1_60(n60, row.sigma_v_crr));
    let fines = row.fines_content.unwrap_or(0.0);
    let n1_60cs = n1_60.map(|n| spt::n1_60cs(n, method.fines_correction(fines)));
    let vs = method.estimate_vs(
        row.layer.uscs.as_deref(),
        row.layer.spt_n,
        n1_60.unwrap_or(0.0),
    );

    // Screened layers keep their intermediates but have no resistance curve.
    let crr_7_5 = if screened.is_some() {
        None
    } else {
        n1_60cs.and_then(|n| method.crr_7_5(n))
    };

    let mut scenarios: [ScenarioValues; 3] = Default::default();
    for (slot, scenario) in scenarios.iter_mut().zip(Scenario::ALL) {
        let mw = scenario_mw(seismic.base_mw, scenario);
        let msf = method.msf(mw);
        let rd = method.rd(row.analysis_depth);
        let (sd_s, sm_s) = site_adjusted_spectra(seismic);
        let a = a_value(scenario, sd_s, sm_s);
        let csr_value = csr(a, row.sigma_v, row.sigma_v_csr, rd);
        let crr = crr_7_5.map(|c| c * msf);

        // Undefined resistance (screened layer or no blow count) reports the
        // ceiling outright; intermediates stay populated.
        let fs = match crr {
            Some(crr) => Some(factor_of_safety(crr, csr_value)),
            None => Some(FS_CEILING),
        };
        let lpi = fs.map(|fs| lpi_contribution(fs, row.analysis_depth, row.thickness));

        *slot = ScenarioValues {
            mw: Some(mw),
            a_value: Some(a),
            sds: Some(sd_s),
            sms: Some(sm_s),
            msf: Some(msf),
            rd: Some(rd),
            csr: csr_value,
            crr,
            fs,
            lpi,
        };
    }
    let [design, mid_eq, max_eq] = scenarios;

    LayerAnalysisResult {
        borehole_id: borehole_id.to_string(),
        layer_id: row.layer.id,
        method: method.method(),
        top_depth: row.layer.top_depth,
        bottom_depth: row.layer.bottom_depth,
        soil_depth: row.soil_depth,
        thickness: row.thickness,
        mid_depth: row.mid_depth,
        analysis_depth: row.analysis_depth,
        uscs: row.layer.uscs.clone(),
        spt_n: row.layer.spt_n,
        sigma_v: row.sigma_v,
        sigma_v_csr: row.sigma_v_csr,
        sigma_v_crr: row.sigma_v_crr,
        n60,
        n1_60,
        n1_60cs,
        vs,
        crr_7_5,
        screened,
        design,
        mid_eq,
        max_eq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::{Method, MethodRegistry};
    use crate::normalize::PlasticityIndex;
    use crate::project::SoilLayer;
    use crate::seismic::{SeismicContext, SeismicSource};
    use approx::assert_relative_eq;
    use uuid::Uuid;

    fn taipei_context() -> SeismicContext {
        SeismicContext {
            city: "Taipei".to_string(),
            district: None,
            village: None,
            base_mw: 7.3,
            sds: 0.8,
            sms: 1.2,
            sd1: Some(0.5),
            sm1: Some(0.75),
            vs30: 550.0,
            site_class: 'B',
            source: SeismicSource::GeneralZone {
                city: "Taipei".to_string(),
            },
        }
    }

    fn sand_row(spt_n: Option<f64>) -> ProfileLayer {
        ProfileLayer {
            layer: SoilLayer {
                id: Uuid::new_v4(),
                top_depth: 2.0,
                bottom_depth: 6.0,
                sample_id: Some("S-2".to_string()),
                uscs: Some("SM".to_string()),
                spt_n,
                unit_weight: Some(1.9),
                fines_content: Some(18.0),
                plasticity: PlasticityIndex::NonPlastic,
                silt_percent: None,
                clay_percent: None,
                water_content: None,
            },
            soil_depth: 6.0,
            thickness: 4.0,
            mid_depth: 4.0,
            analysis_depth: 4.0,
            unit_weight: 1.9,
            sigma_v: 7.6,
            sigma_v_csr: 5.1,
            sigma_v_crr: 5.1,
            fines_content: Some(18.0),
        }
    }

    #[test]
    fn test_mw_clamping() {
        assert_relative_eq!(scenario_mw(7.3, Scenario::Design), 7.3);
        assert_relative_eq!(scenario_mw(7.3, Scenario::MidEq), 7.1);
        assert_relative_eq!(scenario_mw(7.3, Scenario::MaxEq), 7.5);
        assert_relative_eq!(scenario_mw(8.4, Scenario::MaxEq), 8.5);
        assert_relative_eq!(scenario_mw(5.1, Scenario::MidEq), 5.0);
    }

    #[test]
    fn test_fa_table() {
        assert_eq!(fa(GroundClass::First, 0.9), 1.0);
        assert_eq!(fa(GroundClass::Second, 0.5), 1.1);
        assert_eq!(fa(GroundClass::Second, 0.7), 1.0);
        assert_eq!(fa(GroundClass::Third, 0.6), 1.2);
        assert_eq!(fa(GroundClass::Third, 0.7), 1.1);
        assert_eq!(fa(GroundClass::Third, 0.9), 1.0);
    }

    #[test]
    fn test_basin_bypasses_fa() {
        let mut seismic = taipei_context();
        seismic.sds = 0.6;
        seismic.sms = 0.8;
        seismic.vs30 = 150.0; // soft ground would amplify
        seismic.source = SeismicSource::BasinMicroZone {
            zone: "臺北一區".to_string(),
        };
        let (sd_s, sm_s) = site_adjusted_spectra(&seismic);
        assert_relative_eq!(sd_s, 0.6);
        assert_relative_eq!(sm_s, 0.8);
    }

    #[test]
    fn test_a_value_scenarios() {
        assert_relative_eq!(a_value(Scenario::Design, 0.8, 1.2), 0.32);
        assert_relative_eq!(a_value(Scenario::MidEq, 0.8, 1.2), 0.32 / 4.2);
        assert_relative_eq!(a_value(Scenario::MaxEq, 0.8, 1.2), 0.48);
    }

    #[test]
    fn test_fs_ceiling() {
        // very strong soil against weak shaking
        assert_relative_eq!(factor_of_safety(10.0, Some(0.1)), FS_CEILING);
        // undefined or non-positive demand reports the ceiling
        assert_relative_eq!(factor_of_safety(0.2, None), FS_CEILING);
        assert_relative_eq!(factor_of_safety(0.2, Some(0.0)), FS_CEILING);
        // ordinary case
        assert_relative_eq!(factor_of_safety(0.15, Some(0.3)), 0.5);
    }

    #[test]
    fn test_lpi_contribution() {
        // FS >= 1 contributes nothing
        assert_eq!(lpi_contribution(1.2, 5.0, 2.0), 0.0);
        // FS 0.5 at 5 m: 0.5 * 7.5 * 2.0
        assert_relative_eq!(lpi_contribution(0.5, 5.0, 2.0), 7.5);
        // below 20 m nothing counts
        assert_eq!(lpi_contribution(0.2, 21.0, 2.0), 0.0);
        // weight floors at zero exactly at 20 m
        assert_eq!(lpi_contribution(0.2, 20.0, 2.0), 0.0);
    }

    #[test]
    fn test_analyze_layer_taipei_sand() {
        let method = MethodRegistry::resolve(Method::Nceer).unwrap();
        let row = sand_row(Some(10.0));
        let result = analyze_layer(method.as_ref(), &row, &taipei_context(), "BH-01", 72.0);

        assert!(result.screened.is_none());
        assert_relative_eq!(result.n60.unwrap(), 12.0);
        // Cn = min(sqrt(100/5.1), 1.7) = 1.7
        assert_relative_eq!(result.n1_60.unwrap(), 12.0 * 1.7);
        assert!(result.n1_60cs.unwrap() > result.n1_60.unwrap());
        assert!(result.crr_7_5.is_some());

        let design = &result.design;
        assert_relative_eq!(design.mw.unwrap(), 7.3);
        // Taipei zone, Vs30 550 => first-class ground, Fa = 1.0
        assert_relative_eq!(design.sds.unwrap(), 0.8);
        assert_relative_eq!(design.a_value.unwrap(), 0.32);
        assert!(design.csr.unwrap() > 0.0);
        let fs = design.fs.unwrap();
        assert!(fs > 0.0 && fs <= FS_CEILING);
        assert!(design.lpi.unwrap() >= 0.0);

        // MidEq demand is much lower, so FS must not decrease
        assert!(result.mid_eq.fs.unwrap() >= fs);
    }

    #[test]
    fn test_missing_blow_count_reports_ceiling() {
        let method = MethodRegistry::resolve(Method::Nceer).unwrap();
        let row = sand_row(None);
        let result = analyze_layer(method.as_ref(), &row, &taipei_context(), "BH-01", 72.0);

        assert!(result.n60.is_none());
        assert!(result.crr_7_5.is_none());
        // undefined resistance short-circuits to the ceiling with the
        // intermediates still populated
        assert_eq!(result.design.fs, Some(FS_CEILING));
        assert_eq!(result.design.lpi, Some(0.0));
        assert!(result.design.csr.is_some());
        assert!(result.design.rd.is_some());
        assert!(result.mid_eq.fs == Some(FS_CEILING) && result.max_eq.fs == Some(FS_CEILING));
    }

    #[test]
    fn test_analyze_layer_screened_reports_ceiling() {
        let method = MethodRegistry::resolve(Method::Nceer).unwrap();
        let mut row = sand_row(Some(10.0));
        row.layer.uscs = Some("CH".to_string());
        let result = analyze_layer(method.as_ref(), &row, &taipei_context(), "BH-01", 72.0);

        assert!(result.screened.is_some());
        assert!(result.crr_7_5.is_none());
        assert_relative_eq!(result.design.fs.unwrap(), FS_CEILING);
        assert_relative_eq!(result.design.lpi.unwrap(), 0.0);
        // intermediates populated despite the short-circuit
        assert!(result.design.csr.is_some());
        assert!(result.design.rd.is_some());
    }
}
