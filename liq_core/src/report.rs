//! # Report Rendering
//!
//! Textual export boundary. Everything upstream works in `Option<f64>`; this
//! module turns results into display strings, using `"-"` for undefined
//! values and round-half-up three-decimal formatting for numbers. No file
//! handling lives here; callers receive rows and rendered strings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::results::{BoreholeLpiSummary, LayerAnalysisResult, Scenario, LPI_SUMMARY_DEPTH_M};

/// Round half-up to `dp` decimals.
///
/// `f64::round` rounds halves away from zero, which coincides with
/// round-half-up for the non-negative magnitudes exported here.
pub fn round_half_up(value: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (value * scale).round() / scale
}

/// Format an optional value with three decimals, `"-"` when undefined
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.3}", round_half_up(v, 3)),
        _ => "-".to_string(),
    }
}

/// Format a blow count: integers stay integers, refusal-capped halves keep
/// one decimal
fn format_blow_count(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 {
                format!("{}", v as i64)
            } else {
                format!("{:.1}", v)
            }
        }
        _ => "-".to_string(),
    }
}

/// One row of the simplified per-layer report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedRow {
    pub hole_id: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub from: String,
    pub to: String,
    pub uscs: String,
    pub spt_n: String,
    pub fs: String,
    pub lpi: String,
}

/// Column headers of the simplified report
pub const SIMPLIFIED_HEADER: [&str; 10] = [
    "HOLE ID", "X", "Y", "Z", "from", "to", "USCS", "SPT-N", "FS", "LPI",
];

/// Build simplified report rows for one scenario.
///
/// The site columns (X/Y/Z) come from the borehole's summary record; unknown
/// boreholes render `"-"`. Each borehole's rows stop at the assessment
/// cutoff: the first layer crossing 20 m is kept with its lower depth
/// rewritten to 20.00, deeper layers are dropped.
pub fn simplified_rows(
    results: &[LayerAnalysisResult],
    summaries: &[BoreholeLpiSummary],
    scenario: Scenario,
) -> Vec<SimplifiedRow> {
    let mut finished: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();
    for result in results {
        if finished.contains(result.borehole_id.as_str()) {
            continue;
        }
        if result.top_depth >= LPI_SUMMARY_DEPTH_M {
            finished.insert(result.borehole_id.as_str());
            continue;
        }
        let mut bottom = result.bottom_depth;
        if bottom > LPI_SUMMARY_DEPTH_M {
            bottom = LPI_SUMMARY_DEPTH_M;
            finished.insert(result.borehole_id.as_str());
        }

        let site = summaries
            .iter()
            .find(|s| s.borehole_id == result.borehole_id);
        let values = result.scenario(scenario);
        rows.push(SimplifiedRow {
            hole_id: result.borehole_id.clone(),
            x: site.map(|s| format!("{:.1}", s.x)).unwrap_or_else(|| "-".to_string()),
            y: site.map(|s| format!("{:.1}", s.y)).unwrap_or_else(|| "-".to_string()),
            z: site
                .and_then(|s| s.surface_elevation)
                .map(|z| format!("{:.2}", z))
                .unwrap_or_else(|| "-".to_string()),
            from: format!("{:.2}", result.top_depth),
            to: format!("{:.2}", bottom),
            uscs: result.uscs.clone().unwrap_or_else(|| "-".to_string()),
            spt_n: format_blow_count(result.spt_n),
            fs: format_value(values.fs),
            lpi: format_value(values.lpi),
        });
    }
    rows
}

/// Render the simplified report as CSV text
pub fn render_simplified_csv(
    results: &[LayerAnalysisResult],
    summaries: &[BoreholeLpiSummary],
    scenario: Scenario,
) -> String {
    let mut out = SIMPLIFIED_HEADER.join(",");
    out.push('\n');
    for row in simplified_rows(results, summaries, scenario) {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            row.hole_id,
            row.x,
            row.y,
            row.z,
            row.from,
            row.to,
            row.uscs,
            row.spt_n,
            row.fs,
            row.lpi
        ));
    }
    out
}

/// Render the per-borehole LPI summary table as CSV text
pub fn render_lpi_summary_csv(summaries: &[BoreholeLpiSummary]) -> String {
    let mut out = String::from("HOLE ID,X,Y,Z,LPI_Design,LPI_MidEq,LPI_MaxEq,Vs30\n");
    for summary in summaries {
        out.push_str(&format!(
            "{},{:.1},{:.1},{},{},{},{},{}\n",
            summary.borehole_id,
            summary.x,
            summary.y,
            summary
                .surface_elevation
                .map(|z| format!("{:.2}", z))
                .unwrap_or_else(|| "-".to_string()),
            format_value(Some(summary.design_lpi)),
            format_value(Some(summary.mid_eq_lpi)),
            format_value(Some(summary.max_eq_lpi)),
            summary
                .vs30
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    out
}
