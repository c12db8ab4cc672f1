//! Error types for roster loading, configuration and inference.

use std::io;

use thiserror::Error;

/// Errors raised while building a family, validating probability tables or
/// running inference.
#[derive(Debug, Error)]
pub enum HeredityError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A structurally invalid roster record.
    #[error("roster error: {0}")]
    Roster(String),

    #[error("person '{0}' appears more than once in the roster")]
    DuplicatePerson(String),

    /// Mother and father must both be given or both be blank.
    #[error("person '{0}' has only one recorded parent")]
    SingleParent(String),

    #[error("person '{person}' references unknown parent '{parent}'")]
    UnknownParent { person: String, parent: String },

    #[error("person '{person}' has unrecognised trait value '{value}'")]
    InvalidTrait { person: String, value: String },

    #[error("family of {size} people exceeds the supported maximum of {max}")]
    FamilyTooLarge { size: usize, max: usize },

    /// Prior, trait table or mutation rate failed validation.
    #[error("invalid probability table: {0}")]
    InvalidCpt(String),

    /// Accumulated probability mass for a field was zero or not finite, so it
    /// cannot be normalized.
    #[error("no probability mass for {field} of '{person}'")]
    ZeroMass { person: String, field: &'static str },

    #[error("inference exceeded its deadline after {0} trait sets")]
    DeadlineExceeded(u64),
}

/// Result type for heredity operations
pub type Result<T> = std::result::Result<T, HeredityError>;
