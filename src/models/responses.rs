use crate::models::domain::ShortlistEntry;
use serde::Serialize;

/// Response for the shortlist endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ShortlistResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub shortlist: Vec<ShortlistEntry>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "eligibleCount")]
    pub eligible_count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
