use crate::types::OrganizationId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Parser Error: {0}")]
    ParserError(String),

    #[error("Pattern Error: rule `{rule}` is invalid: {message}")]
    PatternError { rule: String, message: String },

    #[error("Knowledge Base Error: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error("Seed Error: {0}")]
    Seed(#[from] csv::Error),

    #[error("Scoring Error: {0}")]
    Scoring(#[from] ScoringError),
}

/// Failures surfaced by the knowledge base administrative surface.
///
/// These are the only errors a caller of the resolver can observe; the resolution path
/// itself degrades instead of failing.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("an organization with id `{0}` already exists")]
    DuplicateId(OrganizationId),

    #[error("no organization with id `{0}`")]
    NotFound(OrganizationId),

    #[error("invalid organization record: {0}")]
    InvalidRecord(String),

    #[error("import rejected, prior state retained: {0}")]
    ImportError(String),

    #[error("export failed: {0}")]
    ExportError(String),
}

/// Internal scorer failures. The scorer maps these to the `error` confidence level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("non-finite {0}")]
    NonFiniteInput(&'static str),

    #[error("confidence weights must be finite, non-negative and not all zero")]
    InvalidWeights,
}

impl From<String> for Error {
    fn from(msg: String) -> Error {
        Error::ParserError(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Error {
        Error::ParserError(msg.to_string())
    }
}
