//! # Error Types
//!
//! Structured error types for liq_core. Per-field parse problems and
//! per-borehole resolution failures are recovered locally and surfaced as
//! run warnings; only project-wide structural failures (no input data,
//! conflicting concurrent run) are returned as hard errors from a run.
//!
//! ## Example
//!
//! ```rust
//! use liq_core::errors::{EngineError, EngineResult};
//!
//! fn validate_em(em: f64) -> EngineResult<()> {
//!     if em <= 0.0 || em > 100.0 {
//!         return Err(EngineError::invalid_input(
//!             "em_value",
//!             em.to_string(),
//!             "hammer energy efficiency must be in (0, 100]",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for liq_core operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Structured error type for the liquefaction engine.
///
/// Each variant carries enough context for the caller to report what was
/// skipped and why without re-deriving it from the input data.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EngineError {
    /// An input value is invalid (out of range, unparsable, wrong shape)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing on an input record
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Coordinate outside the supported geographic bounding box
    #[error("Coordinate ({x}, {y}) is outside the supported region")]
    OutOfBounds { x: f64, y: f64 },

    /// Requested analysis method is not registered
    #[error("Unsupported analysis method: {method}")]
    UnsupportedMethod { method: String },

    /// No borehole produced any analyzable layer
    #[error("No analyzable data: {reason}")]
    NoData { reason: String },

    /// A run for this project is already in flight
    #[error("A run for project '{project}' is already in progress (started {started_at})")]
    ConcurrentRunConflict { project: String, started_at: String },

    /// A per-layer or per-borehole computation failed
    #[error("Calculation failed for {context}: {reason}")]
    CalculationFailed { context: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        EngineError::MissingField {
            field: field.into(),
        }
    }

    /// Create an OutOfBounds error
    pub fn out_of_bounds(x: f64, y: f64) -> Self {
        EngineError::OutOfBounds { x, y }
    }

    /// Create an UnsupportedMethod error
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        EngineError::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a NoData error
    pub fn no_data(reason: impl Into<String>) -> Self {
        EngineError::NoData {
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::CalculationFailed {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is recoverable at borehole/layer granularity.
    ///
    /// Recoverable errors become run warnings and the run continues with
    /// the remaining records.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidInput { .. }
                | EngineError::MissingField { .. }
                | EngineError::OutOfBounds { .. }
                | EngineError::CalculationFailed { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::MissingField { .. } => "MISSING_FIELD",
            EngineError::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            EngineError::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            EngineError::NoData { .. } => "NO_DATA",
            EngineError::ConcurrentRunConflict { .. } => "CONCURRENT_RUN_CONFLICT",
            EngineError::CalculationFailed { .. } => "CALCULATION_FAILED",
            EngineError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EngineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError {
            reason: err.to_string(),
        }
    }
}
