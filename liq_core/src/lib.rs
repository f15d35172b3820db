//! # liq_core - Soil Liquefaction Analysis Engine
//!
//! `liq_core` evaluates SPT-based soil-liquefaction potential for borehole
//! profiles under three earthquake scenarios, using one of four assessment
//! methods (HBF, NCEER, AIJ, JRA). All inputs and outputs are
//! JSON-serializable, so the engine slots behind any transport without glue
//! code.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure calculation paths; the only shared state is the
//!   per-project run registry
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Option over sentinel**: Undefined quantities stay `None` until the
//!   report layer renders them
//!
//! ## Quick Start
//!
//! ```rust
//! use liq_core::aggregator::{run_analysis, CancelFlag, RunRegistry};
//! use liq_core::project::{AnalysisProject, AnalysisSettings, LayerRecord};
//! use liq_core::results::ResultStore;
//! use liq_core::seismic::SeismicResolver;
//!
//! let records = vec![LayerRecord {
//!     borehole_id: Some("BH-01".into()),
//!     x: Some(300_000.0),
//!     y: Some(2_770_000.0),
//!     water_depth: Some(1.5),
//!     top_depth: Some(0.0),
//!     bottom_depth: Some(3.0),
//!     uscs: Some("SM".into()),
//!     spt_n: Some("12".into()),
//!     unit_weight: Some(1.9),
//!     fines_content: Some(18.0),
//!     ..Default::default()
//! }];
//! let (mut project, warnings) =
//!     AnalysisProject::from_records("Site A", AnalysisSettings::default(), records);
//! assert!(warnings.is_empty());
//!
//! let resolver = SeismicResolver::zones_only();
//! let mut store = ResultStore::new();
//! let run = run_analysis(
//!     &mut project,
//!     &resolver,
//!     &RunRegistry::new(),
//!     &mut store,
//!     &CancelFlag::new(),
//! )
//! .unwrap();
//! assert!(run.success);
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, borehole logs, record grouping
//! - [`normalize`] - Field parsing and unit-weight handling
//! - [`seismic`] - Design-spectrum resolution and fault interpolation
//! - [`profile`] - Layer geometry and overburden stresses
//! - [`spt`] - Blow-count corrections and shear-wave estimates
//! - [`methods`] - The four assessment methods behind one trait
//! - [`engine`] - The shared scenario calculation skeleton
//! - [`results`] - Result records, per-method store, LPI summary
//! - [`aggregator`] - Run orchestration and the run-state registry
//! - [`report`] - Textual rendering with the `"-"` placeholder
//! - [`errors`] - Structured error types

pub mod aggregator;
pub mod engine;
pub mod errors;
pub mod methods;
pub mod normalize;
pub mod profile;
pub mod project;
pub mod report;
pub mod results;
pub mod seismic;
pub mod spt;

// Re-export commonly used types at crate root for convenience
pub use aggregator::{run_analysis, CancelFlag, RunRegistry, RunResult, RunState};
pub use errors::{EngineError, EngineResult};
pub use methods::Method;
pub use project::{AnalysisProject, AnalysisSettings, Borehole, LayerRecord, SoilLayer};
pub use results::{BoreholeLpiSummary, LayerAnalysisResult, ResultStore, Scenario};
pub use seismic::{SeismicContext, SeismicResolver};
