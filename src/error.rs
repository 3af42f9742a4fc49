use thiserror::Error;

/// Fatal structural problems with a run's input.
///
/// Field-level problems never surface here; they are normalized to
/// "unspecified" by the intake layer.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("community collection must be a JSON array, got {found}")]
    NotACollection { found: &'static str },

    #[error("community record at index {index} must be an object, got {found}")]
    InvalidRecord { index: usize, found: &'static str },

    #[error("community record at index {index} has no identifier")]
    MissingIdentifier { index: usize },

    #[error("duplicate community identifier '{id}' at index {index}")]
    DuplicateIdentifier { index: usize, id: String },

    #[error("preference record must be a JSON object, got {found}")]
    InvalidPreferences { found: &'static str },
}

/// Errors from the external explanation collaborator
#[derive(Debug, Error)]
pub enum ExplainerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Explanation service unavailable: {0}")]
    Unavailable(String),
}

/// Rejected scoring weight configuration
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight '{name}' must be a finite non-negative number, got {value}")]
    Invalid { name: &'static str, value: f64 },

    #[error("scoring weights must not all be zero")]
    AllZero,

    #[error("partner weight ({partner}) must exceed every other weight (largest other: {other})")]
    PartnerNotDominant { partner: f64, other: f64 },
}

/// Errors while rendering tabular output
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
