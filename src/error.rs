//! Error types for score reading and Jianpu encoding.
//!
//! Reading failures (I/O, XML, archive) and encoding failures (table lookups,
//! broken grace/tie contracts) share one error type so that the whole
//! parse-then-encode pipeline can propagate with `?`.

use thiserror::Error;

/// Top-level error type for every fallible operation in the crate.
#[derive(Debug, Clone, Error)]
pub enum JianpuError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("MusicXML parse error: {0}")]
    Parse(String),

    #[error("MXL archive error: {0}")]
    Archive(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupFailure),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// Duration that never settles into quarters, halves or dotted quarters.
    #[error("cannot encode duration {duration} with {divisions} divisions per quarter")]
    InvalidDuration { duration: i64, divisions: i64 },
}

/// A value passed to one of the fixed encoder tables was not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("unknown step letter '{0}'")]
    Step(String),

    #[error("unknown key signature '{0}'")]
    KeySignature(String),

    #[error("octave {0} is outside the accidental table")]
    Octave(i32),
}

/// The event stream broke an assumption the note encoder relies on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("grace note arrived while grace note '{pending}' is still pending")]
    GraceAlreadyPending { pending: String },

    #[error("tie stop without an open tie")]
    TieStopWithoutStart,
}

impl From<std::io::Error> for JianpuError {
    fn from(e: std::io::Error) -> Self {
        JianpuError::Io(e.to_string())
    }
}

impl From<roxmltree::Error> for JianpuError {
    fn from(e: roxmltree::Error) -> Self {
        JianpuError::Parse(e.to_string())
    }
}

impl From<zip::result::ZipError> for JianpuError {
    fn from(e: zip::result::ZipError) -> Self {
        JianpuError::Archive(e.to_string())
    }
}

impl From<serde_json::Error> for JianpuError {
    fn from(e: serde_json::Error) -> Self {
        JianpuError::Json(e.to_string())
    }
}

impl From<toml::de::Error> for JianpuError {
    fn from(e: toml::de::Error) -> Self {
        JianpuError::Config(e.to_string())
    }
}
