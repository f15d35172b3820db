//! # liq - Liquefaction Analysis CLI
//!
//! Loads a project JSON file, runs the configured analysis method, and prints
//! a summary plus the simplified CSV reports. `env_logger` picks up the usual
//! `RUST_LOG` filter for engine diagnostics.
//!
//! ```text
//! liq <project.json> [--method HBF|NCEER|AIJ|JRA] [--em <percent>] [--gwt <m>]
//! ```

use std::fs;
use std::process::ExitCode;

use liq_core::aggregator::{run_analysis, CancelFlag, RunRegistry};
use liq_core::report;
use liq_core::results::{ResultStore, Scenario};
use liq_core::seismic::SeismicResolver;
use liq_core::{AnalysisProject, Method};

struct CliArgs {
    project_path: String,
    method: Option<Method>,
    em_value: Option<f64>,
    gwt_override: Option<f64>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut project_path = None;
    let mut method = None;
    let mut em_value = None;
    let mut gwt_override = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--method" => {
                let value = args.next().ok_or("--method requires a value")?;
                method = Some(value.parse::<Method>().map_err(|e| e.to_string())?);
            }
            "--em" => {
                let value = args.next().ok_or("--em requires a value")?;
                em_value = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("invalid --em value '{value}'"))?,
                );
            }
            "--gwt" => {
                let value = args.next().ok_or("--gwt requires a value")?;
                gwt_override = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("invalid --gwt value '{value}'"))?,
                );
            }
            "--help" | "-h" => {
                return Err("usage: liq <project.json> [--method M] [--em E] [--gwt D]"
                    .to_string())
            }
            other if project_path.is_none() && !other.starts_with('-') => {
                project_path = Some(other.to_string());
            }
            other => return Err(format!("unrecognized argument '{other}'")),
        }
    }

    Ok(CliArgs {
        project_path: project_path.ok_or("missing project file argument")?,
        method,
        em_value,
        gwt_override,
    })
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let raw = match fs::read_to_string(&args.project_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading {}: {e}", args.project_path);
            return ExitCode::FAILURE;
        }
    };
    let mut project: AnalysisProject = match serde_json::from_str(&raw) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", args.project_path);
            return ExitCode::FAILURE;
        }
    };

    if let Some(method) = args.method {
        project.settings.method = method;
    }
    if let Some(em) = args.em_value {
        project.settings.em_value = em;
    }
    if let Some(gwt) = args.gwt_override {
        project.settings.gwt_override = Some(gwt);
    }

    let resolver = SeismicResolver::zones_only();
    let registry = RunRegistry::new();
    let mut store = ResultStore::new();

    match run_analysis(
        &mut project,
        &resolver,
        &registry,
        &mut store,
        &CancelFlag::new(),
    ) {
        Ok(run) => {
            let method = run.method;
            println!("═══════════════════════════════════════");
            println!("  LIQUEFACTION ANALYSIS RESULTS");
            println!("═══════════════════════════════════════");
            println!();
            println!("Project:  {}", project.meta.name);
            println!("Method:   {}", method);
            println!("Em:       {:.0}%", project.settings.em_value);
            println!("Boreholes: {}  Layers analyzed: {}",
                run.borehole_count, run.analyzed_layer_count);
            println!();

            if !run.warnings.is_empty() {
                println!("Warnings ({}):", run.warnings.len());
                for warning in &run.warnings {
                    println!("  - {warning}");
                }
                println!();
            }

            println!("LPI Summary:");
            for summary in &run.lpi_summary {
                println!(
                    "  {}  Design={}  MidEq={}  MaxEq={}",
                    summary.borehole_id,
                    report::format_value(Some(summary.design_lpi)),
                    report::format_value(Some(summary.mid_eq_lpi)),
                    report::format_value(Some(summary.max_eq_lpi)),
                );
            }
            println!();
            println!("═══════════════════════════════════════");
            println!();
            println!("Simplified report (Design scenario):");
            print!(
                "{}",
                report::render_simplified_csv(&run.results, &run.lpi_summary, Scenario::Design)
            );

            println!();
            println!("JSON Output (for API use):");
            if let Ok(json) = serde_json::to_string_pretty(&run) {
                println!("{}", json);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
