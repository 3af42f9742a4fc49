//! Normalization of upstream records into [`Preferences`] and [`Community`] values.
//!
//! Preferences come from a language-model extraction step and community rows
//! from a spreadsheet export, so every field is parsed leniently: anything
//! malformed becomes "unspecified". Only a structurally broken collection is
//! rejected outright.
//!
//! Keys are matched loosely: `"Monthly Fee"`, `"monthly_fee"` and
//! `"monthlyFee"` all address the same field.

use crate::error::MatchError;
use crate::models::domain::{normalize_label, CareLevel, Community, GeoPoint, Preferences};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_MONTH: f64 = 30.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Parse a preference record from extracted JSON
pub fn preferences_from_json(value: &Value) -> Result<Preferences, MatchError> {
    let obj = value.as_object().ok_or(MatchError::InvalidPreferences {
        found: json_kind(value),
    })?;

    let care_level = field(obj, &["care_level", "level_of_care"])
        .and_then(Value::as_str)
        .and_then(CareLevel::parse);
    if care_level.is_none() && field(obj, &["care_level", "level_of_care"]).is_some() {
        tracing::debug!("Unrecognized care level treated as unspecified");
    }

    let max_budget = field(obj, &["max_budget", "budget", "monthly_budget"]).and_then(parse_money);

    let waitlist_tolerance_days = field(obj, &["waitlist_tolerance", "move_in_window"])
        .and_then(parse_duration_days);

    let location = field(obj, &["preferred_location", "location"])
        .and_then(parse_point)
        .or_else(|| point_from_fields(obj));

    let apartment_type = field(obj, &["apartment_type", "unit_type"])
        .and_then(Value::as_str)
        .map(normalize_label)
        .filter(|s| !s.is_empty());

    let mut amenities = BTreeSet::new();
    for key in ["amenities", "desired_amenities", "other_keywords"] {
        if let Some(v) = field(obj, &[key]) {
            amenities.extend(parse_labels(v));
        }
    }
    if field(obj, &["pet_friendly"]).and_then(parse_yes_no) == Some(true) {
        amenities.insert("pet friendly".to_string());
    }

    let flag = |keys: &[&str]| field(obj, keys).and_then(parse_yes_no).unwrap_or(false);

    Ok(Preferences {
        client_name: field(obj, &["name_of_patient", "client_name", "name"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        care_level,
        max_budget,
        waitlist_tolerance_days,
        location,
        apartment_type,
        amenities,
        requires_contract_rate: flag(&["requires_contract_rate", "contract_required", "contract"]),
        requires_enhanced: flag(&["enhanced"]),
        requires_enriched: flag(&["enriched"]),
    })
}

/// Parse the community collection; any structural defect aborts the run
pub fn communities_from_json(value: &Value) -> Result<Vec<Community>, MatchError> {
    let rows = value.as_array().ok_or(MatchError::NotACollection {
        found: json_kind(value),
    })?;

    let mut seen = HashSet::with_capacity(rows.len());
    let mut communities = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or(MatchError::InvalidRecord {
            index,
            found: json_kind(row),
        })?;

        let community = community_from_row(index, obj)?;
        if !seen.insert(community.id.clone()) {
            return Err(MatchError::DuplicateIdentifier {
                index,
                id: community.id,
            });
        }
        communities.push(community);
    }

    Ok(communities)
}

/// Parse one spreadsheet row
pub fn community_from_row(index: usize, row: &Map<String, Value>) -> Result<Community, MatchError> {
    let name = field(row, &["community_name", "name"]).and_then(scalar_text);
    let id = field(row, &["id", "community_id", "identifier"])
        .and_then(scalar_text)
        .or_else(|| name.clone())
        .ok_or(MatchError::MissingIdentifier { index })?;

    let mut service_types = field(row, &["type_of_service", "service_types", "services"])
        .map(parse_service_types)
        .unwrap_or_default();
    if field(row, &["enhanced"]).and_then(parse_yes_no) == Some(true) {
        service_types.insert(CareLevel::Enhanced);
    }
    if field(row, &["enriched"]).and_then(parse_yes_no) == Some(true) {
        service_types.insert(CareLevel::Enriched);
    }

    let location = field(row, &["location", "coordinates"])
        .and_then(parse_point)
        .or_else(|| point_from_fields(row));

    Ok(Community {
        id,
        name,
        service_types,
        waitlist_days: field(row, &["waitlist", "waitlist_length", "estimated_waitlist"])
            .and_then(parse_duration_days),
        monthly_fee: field(row, &["monthly_fee", "fee", "monthly_rate"]).and_then(parse_money),
        contract_rate: field(row, &["contract_w_rate", "contract_rate", "contract"])
            .and_then(parse_column_flag)
            .unwrap_or(false),
        placement_partner: field(row, &["work_with_placement", "placement_partner", "partner"])
            .and_then(parse_yes_no)
            .unwrap_or(false),
        location,
        postal_code: field(row, &["zip", "zip_code", "postal_code", "zipcode"]).and_then(scalar_text),
        apartment_types: field(row, &["apartment_type", "apartment_types", "unit_types"])
            .map(|v| parse_labels(v).into_iter().collect())
            .unwrap_or_default(),
        amenities: field(row, &["amenities"]).map(parse_labels).unwrap_or_default(),
    })
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// First non-null value under any of the given key spellings
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    let wanted: Vec<String> = names.iter().map(|n| normalize_key(n)).collect();
    wanted.iter().find_map(|w| {
        obj.iter()
            .find(|(k, v)| !v.is_null() && normalize_key(k) == *w)
            .map(|(_, v)| v)
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Currency amount such as `5000`, `"$5,000"`, `"4.5k"` or `"$4,200/month"`
pub fn parse_money(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            let head = lowered
                .split(|c: char| c == '/' || c == '(')
                .next()
                .unwrap_or_default()
                .replace("per month", "")
                .replace("a month", "");
            let cleaned: String = head
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' ' | '_'))
                .collect();
            let cleaned = cleaned.trim_start_matches("upto");
            match cleaned.strip_suffix('k') {
                Some(thousands) => thousands.parse::<f64>().ok()? * 1000.0,
                None => cleaned.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Strict yes/no for client answers; anything ambiguous is unspecified
pub fn parse_yes_no(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "required" => Some(true),
            "no" | "n" | "false" | "not required" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Lenient flag for the contract column: any non-negative note counts as yes
///
/// A contract column reading `"Yes - $4,200"` is a contract-rate community.
pub fn parse_column_flag(value: &Value) -> Option<bool> {
    match value {
        Value::String(s) => {
            let text = s.trim().to_lowercase();
            match text.as_str() {
                "" | "nan" | "n/a" | "none" => Some(false),
                "no" | "n" | "false" | "0" => Some(false),
                _ if text.starts_with("no ") => Some(false),
                _ => Some(true),
            }
        }
        other => parse_yes_no(other),
    }
}

/// Waitlist or tolerance in days. `"none"` and `"immediately"` mean zero.
pub fn parse_duration_days(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round().min(u32::MAX as f64) as u32),
        Value::String(s) => parse_duration_text(s),
        _ => None,
    }
}

fn parse_duration_text(raw: &str) -> Option<u32> {
    let text = raw.trim().to_lowercase();
    match text.as_str() {
        "" | "unknown" | "n/a" | "nan" | "tbd" => return None,
        "none" | "no" | "no waitlist" | "immediately" | "immediate" | "asap" | "now"
        | "available" | "available now" => return Some(0),
        _ => {}
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (position, amount) = tokens.iter().enumerate().find_map(|(i, token)| {
        // Ranges such as "3-6" take the upper bound
        let upper = token.rsplit(|c: char| c == '-' || c == '–').next()?;
        let digits: String = upper
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        digits.parse::<f64>().ok().map(|n| (i, n))
    })?;

    let unit_text = tokens[position..].join(" ");
    let days = if unit_text.contains("year") {
        amount * DAYS_PER_YEAR
    } else if unit_text.contains("month") {
        amount * DAYS_PER_MONTH
    } else if unit_text.contains("week") || unit_text.contains("wk") {
        amount * DAYS_PER_WEEK
    } else {
        amount
    };

    (days.is_finite() && days >= 0.0).then(|| days.round().min(u32::MAX as f64) as u32)
}

/// Service types from a free-text column like `"Assisted Living, Memory Care"`
pub fn parse_service_types(value: &Value) -> BTreeSet<CareLevel> {
    let text = match value {
        Value::String(s) => s.to_lowercase(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ")
            .to_lowercase(),
        _ => return BTreeSet::new(),
    };

    let mut levels = BTreeSet::new();
    let keywords = [
        ("independent", CareLevel::Independent),
        ("assisted", CareLevel::Assisted),
        ("enhanced", CareLevel::Enhanced),
        ("enriched", CareLevel::Enriched),
        ("memory", CareLevel::MemoryCare),
    ];
    for (keyword, level) in keywords {
        if text.contains(keyword) {
            levels.insert(level);
        }
    }

    for token in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        match token {
            "il" => {
                levels.insert(CareLevel::Independent);
            }
            "al" | "alr" => {
                levels.insert(CareLevel::Assisted);
            }
            "mc" => {
                levels.insert(CareLevel::MemoryCare);
            }
            _ => {}
        }
    }

    levels
}

/// Set of normalized labels from an array or a comma/semicolon separated string
pub fn parse_labels(value: &Value) -> BTreeSet<String> {
    let raw: Vec<String> = match value {
        Value::String(s) => s.split([',', ';', '|']).map(str::to_string).collect(),
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    };

    raw.iter()
        .map(|s| normalize_label(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Coordinates as `{latitude, longitude}`, `{lat, lon}` or `[lat, lon]`.
/// Place names are not geocoded here and resolve to `None`.
fn parse_point(value: &Value) -> Option<GeoPoint> {
    match value {
        Value::Object(obj) => point_from_fields(obj),
        Value::Array(items) if items.len() == 2 => {
            GeoPoint::new(items[0].as_f64()?, items[1].as_f64()?)
        }
        _ => None,
    }
}

fn point_from_fields(obj: &Map<String, Value>) -> Option<GeoPoint> {
    let lat = field(obj, &["latitude", "lat"]).and_then(number_like)?;
    let lon = field(obj, &["longitude", "lon", "lng"]).and_then(number_like)?;
    GeoPoint::new(lat, lon)
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
