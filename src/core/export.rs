use crate::error::ExportError;
use crate::models::ShortlistEntry;
use serde::Serialize;

/// One flat row per shortlisted community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistRow {
    pub identifier: String,
    pub score: f64,
    /// Kilometers; empty when unknown
    pub distance: Option<f64>,
    pub fee: Option<f64>,
    /// Days; empty when unknown
    pub waitlist: Option<u32>,
    pub explanation: String,
}

impl ShortlistRow {
    /// Column names, in serialization order
    pub const HEADERS: [&'static str; 6] =
        ["identifier", "score", "distance", "fee", "waitlist", "explanation"];
}

impl From<&ShortlistEntry> for ShortlistRow {
    fn from(entry: &ShortlistEntry) -> Self {
        Self {
            identifier: entry.community.id.clone(),
            score: round2(entry.score),
            distance: entry.distance_km.map(round2),
            fee: entry.community.monthly_fee,
            waitlist: entry.community.waitlist_days,
            explanation: entry.explanation.clone(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn to_rows(entries: &[ShortlistEntry]) -> Vec<ShortlistRow> {
    entries.iter().map(ShortlistRow::from).collect()
}

/// Render the shortlist as CSV with a header row
pub fn to_csv(entries: &[ShortlistEntry]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let rows = to_rows(entries);
    if rows.is_empty() {
        writer.write_record(ShortlistRow::HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
