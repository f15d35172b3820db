//! # Run Orchestration
//!
//! Drives a full analysis run: seismic resolution per borehole, profile
//! construction, the per-layer method calculation, and the LPI roll-up.
//! Boreholes are independent and processed in parallel; the layer loop inside
//! a borehole is sequential because the overburden recurrence demands it.
//!
//! Concurrent runs on the same project are rejected through [`RunRegistry`],
//! an explicit per-project state machine. A `Running` entry older than the
//! stale timeout is treated as an abandoned run (crashed worker) and taken
//! over with a warning instead of locking the project forever.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine;
use crate::errors::{EngineError, EngineResult};
use crate::methods::{LiquefactionMethod, Method, MethodRegistry};
use crate::profile::{self, ProfileLayer};
use crate::project::{AnalysisProject, Borehole};
use crate::results::{
    sum_lpi, BoreholeLpiSummary, LayerAnalysisResult, ResultStore, Scenario,
};
use crate::seismic::{SeismicContext, SeismicResolver};
use crate::spt;

/// A `Running` entry older than this is considered abandoned
pub const STALE_RUN_MINUTES: i64 = 10;

/// Lifecycle of a project's analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum RunState {
    Idle,
    Running { started_at: DateTime<Utc> },
    Completed { finished_at: DateTime<Utc> },
    Failed {
        finished_at: DateTime<Utc>,
        reason: String,
    },
}

/// Per-project run states, shared across workers
#[derive(Debug, Default)]
pub struct RunRegistry {
    states: Mutex<HashMap<Uuid, RunState>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        RunRegistry::default()
    }

    /// Transition a project to `Running`.
    ///
    /// Rejects with `ConcurrentRunConflict` when a fresh run is already in
    /// flight; takes over stale runs with a warning.
    pub fn begin(&self, project_id: Uuid, project_name: &str) -> EngineResult<()> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(RunState::Running { started_at }) = states.get(&project_id) {
            let age = Utc::now() - *started_at;
            if age < Duration::minutes(STALE_RUN_MINUTES) {
                return Err(EngineError::ConcurrentRunConflict {
                    project: project_name.to_string(),
                    started_at: started_at.to_rfc3339(),
                });
            }
            log::warn!(
                "taking over stale run for project '{project_name}' (started {started_at})"
            );
        }
        states.insert(
            project_id,
            RunState::Running {
                started_at: Utc::now(),
            },
        );
        Ok(())
    }

    pub fn complete(&self, project_id: Uuid) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(
            project_id,
            RunState::Completed {
                finished_at: Utc::now(),
            },
        );
    }

    pub fn fail(&self, project_id: Uuid, reason: impl Into<String>) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(
            project_id,
            RunState::Failed {
                finished_at: Utc::now(),
                reason: reason.into(),
            },
        );
    }

    pub fn state(&self, project_id: Uuid) -> RunState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(&project_id).cloned().unwrap_or(RunState::Idle)
    }
}

/// Cooperative cancellation flag, checked between boreholes
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub method: Method,
    pub borehole_count: usize,
    pub analyzed_layer_count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Per-layer results for the method that just ran
    pub results: Vec<LayerAnalysisResult>,
    /// Per-borehole LPI roll-up for the method that just ran
    pub lpi_summary: Vec<BoreholeLpiSummary>,
}

struct BoreholeOutcome {
    borehole_index: usize,
    seismic: SeismicContext,
    results: Vec<LayerAnalysisResult>,
    summary: Option<BoreholeLpiSummary>,
    warnings: Vec<String>,
}

/// Execute an analysis run for a project's configured method.
///
/// Writes the resolved seismic context back onto each borehole and replaces
/// the method's slice of `store`. Recoverable problems (bad records, layers
/// out of range, unresolvable coordinates) become warnings on the
/// [`RunResult`]; hard failures (conflicting run, nothing analyzable) are
/// errors and leave the store untouched.
pub fn run_analysis(
    project: &mut AnalysisProject,
    resolver: &SeismicResolver<'_>,
    registry: &RunRegistry,
    store: &mut ResultStore,
    cancel: &CancelFlag,
) -> EngineResult<RunResult> {
    let settings = project.settings.clone();
    if settings.em_value <= 0.0 || settings.em_value > 100.0 {
        return Err(EngineError::invalid_input(
            "em_value",
            settings.em_value.to_string(),
            "hammer energy efficiency must be in (0, 100]",
        ));
    }
    if project.boreholes.is_empty() {
        return Err(EngineError::no_data("project has no boreholes"));
    }

    registry.begin(project.id, &project.meta.name)?;
    log::info!(
        "starting {} analysis for project '{}' ({} boreholes)",
        settings.method,
        project.meta.name,
        project.boreholes.len()
    );

    let method = match MethodRegistry::resolve(settings.method) {
        Ok(method) => method,
        Err(err) => {
            registry.fail(project.id, err.to_string());
            return Err(err);
        }
    };

    let unit_factor = settings.unit_weight_unit.conversion_factor();
    let outcomes: Vec<BoreholeOutcome> = project
        .boreholes
        .par_iter()
        .enumerate()
        .filter(|_| !cancel.is_cancelled())
        .map(|(index, borehole)| {
            analyze_borehole(
                index,
                borehole,
                method.as_ref(),
                resolver,
                settings.gwt_override.unwrap_or(borehole.water_depth),
                unit_factor,
                settings.em_value,
            )
        })
        .collect();

    if cancel.is_cancelled() {
        registry.fail(project.id, "run cancelled");
        return Ok(RunResult {
            success: false,
            method: settings.method,
            borehole_count: project.boreholes.len(),
            analyzed_layer_count: 0,
            warnings: Vec::new(),
            errors: vec!["run cancelled before completion".to_string()],
            results: Vec::new(),
            lpi_summary: Vec::new(),
        });
    }

    let mut warnings = Vec::new();
    let mut all_results = Vec::new();
    let mut summaries = Vec::new();
    for outcome in outcomes {
        project.boreholes[outcome.borehole_index].seismic = Some(outcome.seismic);
        warnings.extend(outcome.warnings);
        all_results.extend(outcome.results);
        if let Some(summary) = outcome.summary {
            summaries.push(summary);
        }
    }

    let analyzed_layer_count = all_results.len();
    if analyzed_layer_count == 0 {
        let err = EngineError::no_data("no borehole produced an analyzable layer");
        registry.fail(project.id, err.to_string());
        return Err(err);
    }

    store.replace_method(settings.method, all_results.clone(), summaries.clone());
    project.touch();
    registry.complete(project.id);
    log::info!(
        "completed {} analysis: {} layers, {} warnings",
        settings.method,
        analyzed_layer_count,
        warnings.len()
    );

    Ok(RunResult {
        success: true,
        method: settings.method,
        borehole_count: project.boreholes.len(),
        analyzed_layer_count,
        warnings,
        errors: Vec::new(),
        results: all_results,
        lpi_summary: summaries,
    })
}

fn analyze_borehole(
    index: usize,
    borehole: &Borehole,
    method: &dyn LiquefactionMethod,
    resolver: &SeismicResolver<'_>,
    gwt: f64,
    unit_factor: f64,
    em_value: f64,
) -> BoreholeOutcome {
    let mut warnings = Vec::new();

    let mut seismic = match resolver.resolve(
        borehole.x,
        borehole.y,
        borehole.district.as_deref(),
        borehole.village.as_deref(),
    ) {
        Ok(ctx) => ctx,
        Err(err) => {
            warnings.push(format!(
                "borehole {}: {err}; using regional default parameters",
                borehole.borehole_id
            ));
            SeismicContext::fallback()
        }
    };

    let layers = borehole.sorted_layers();
    let (rows, profile_warnings) = profile::build_profile(&layers, gwt, unit_factor);
    warnings.extend(
        profile_warnings
            .into_iter()
            .map(|w| format!("borehole {}: {w}", borehole.borehole_id)),
    );

    // Profile-averaged Vs30 refines the heuristic site value when enough
    // layers carry a velocity estimate.
    let vs_rows: Vec<(&ProfileLayer, Option<f64>)> = rows
        .iter()
        .map(|row| {
            let n1_60 = row
                .layer
                .spt_n
                .map(|n| spt::n1_60(spt::n60(n, em_value), row.sigma_v_crr))
                .unwrap_or(0.0);
            let vs = method.estimate_vs(row.layer.uscs.as_deref(), row.layer.spt_n, n1_60);
            (row, vs)
        })
        .collect();
    let profile_vs30 = spt::profile_vs30(&vs_rows);
    if let Some(vs30) = profile_vs30 {
        seismic.vs30 = vs30;
        seismic.site_class = crate::seismic::site_class(vs30);
    }

    let results: Vec<LayerAnalysisResult> = rows
        .iter()
        .map(|row| engine::analyze_layer(method, row, &seismic, &borehole.borehole_id, em_value))
        .collect();

    let summary = if results.is_empty() {
        warnings.push(format!(
            "borehole {}: no analyzable layers",
            borehole.borehole_id
        ));
        None
    } else {
        Some(BoreholeLpiSummary {
            borehole_id: borehole.borehole_id.clone(),
            x: borehole.x,
            y: borehole.y,
            surface_elevation: borehole.surface_elevation,
            design_lpi: sum_lpi(&results, Scenario::Design),
            mid_eq_lpi: sum_lpi(&results, Scenario::MidEq),
            max_eq_lpi: sum_lpi(&results, Scenario::MaxEq),
            vs30: profile_vs30,
        })
    };

    BoreholeOutcome {
        borehole_index: index,
        seismic,
        results,
        summary,
        warnings,
    }
}
