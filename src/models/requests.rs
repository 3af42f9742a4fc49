use crate::models::domain::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

/// Request to build a shortlist
///
/// `preferences` and `communities` are kept as raw JSON so malformed fields
/// can be normalized instead of rejecting the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShortlistRequest {
    pub preferences: Value,
    pub communities: Value,
    /// Clamped to the configured `matching.max_top_n`
    #[validate(range(min = 1))]
    #[serde(alias = "top_n", rename = "topN", default)]
    pub top_n: Option<usize>,
    /// Optional postal code to coordinate table for communities without a geocode
    #[serde(alias = "postal_codes", rename = "postalCodes", default)]
    pub postal_codes: HashMap<String, GeoPoint>,
}
