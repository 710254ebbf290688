//! Error types for platform description parsing.

use thiserror::Error;

/// Errors raised while parsing or validating a platform description (§6).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// A required field was absent from the document.
    #[error("platform description missing required field '{field}'")]
    MissingField {
        /// Dotted path of the missing field, e.g. `topology.x_size`.
        field: String,
    },

    /// A field was present but had the wrong JSON type or an
    /// out-of-range value.
    #[error("platform description field '{field}' is ill-typed: {message}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: String,
        /// Human-readable explanation.
        message: String,
    },

    /// An instruction catalogue entry referenced a gate name that does
    /// not parse into a known `cc_light_instr_type`.
    #[error("unknown instruction type '{kind}' for instruction '{instr}'")]
    UnknownInstructionType {
        /// The instruction the entry belongs to.
        instr: String,
        /// The unrecognised `cc_light_instr_type` string.
        kind: String,
    },

    /// The document as a whole was not a JSON object.
    #[error("platform description is not a JSON object")]
    NotAnObject,

    /// The underlying JSON text could not be parsed at all.
    #[error("malformed platform description JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
