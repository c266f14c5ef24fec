//! Error taxonomy for the briefing transforms.
//!
//! Only outright type errors surface as [`BriefError`]. Missing fields,
//! missing sections and unparseable model replies degrade to documented
//! defaults instead; see [`crate::steps::ParseRecoveryNotice`] for the
//! soft-failure channel of the step parser.

/// Errors produced by the core transforms.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// The ticket payload was not a JSON object.
    #[error("invalid ticket payload: {0}")]
    InvalidInput(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, BriefError>;
