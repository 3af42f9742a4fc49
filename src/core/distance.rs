use crate::models::{Community, Distance, GeoPoint};
use geo::{HaversineDistance, Point};
use std::collections::HashMap;

/// Great-circle distance between two points in kilometers
#[inline]
pub fn haversine_distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);

    // geo reports meters
    (a.haversine_distance(&b) / 1000.0).max(0.0)
}

/// Resolve the distance between two optional points
///
/// Returns [`Distance::Unknown`] when either side is missing or invalid.
pub fn resolve_distance(from: Option<GeoPoint>, to: Option<GeoPoint>) -> Distance {
    match (from, to) {
        (Some(a), Some(b)) if a.is_valid() && b.is_valid() => {
            Distance::Known(haversine_distance(a, b))
        }
        _ => Distance::Unknown,
    }
}

/// Caller-supplied coordinate source for communities
pub trait CoordinateLookup: Send + Sync {
    fn locate(&self, community: &Community) -> Option<GeoPoint>;
}

/// Uses the coordinates already attached to each record
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCoordinates;

impl CoordinateLookup for RecordCoordinates {
    fn locate(&self, community: &Community) -> Option<GeoPoint> {
        community.location
    }
}

/// Falls back to a postal-code table when a record has no coordinates
#[derive(Debug, Clone, Default)]
pub struct PostalCodeLookup {
    table: HashMap<String, GeoPoint>,
}

impl PostalCodeLookup {
    pub fn new(table: HashMap<String, GeoPoint>) -> Self {
        let table = table
            .into_iter()
            .filter(|(_, point)| point.is_valid())
            .map(|(code, point)| (normalize_postal_code(&code), point))
            .collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CoordinateLookup for PostalCodeLookup {
    fn locate(&self, community: &Community) -> Option<GeoPoint> {
        community.location.or_else(|| {
            community
                .postal_code
                .as_deref()
                .and_then(|code| self.table.get(&normalize_postal_code(code)))
                .copied()
        })
    }
}

/// US ZIP+4 collapses to the five-digit code
fn normalize_postal_code(code: &str) -> String {
    let trimmed = code.trim();
    trimmed
        .split('-')
        .next()
        .unwrap_or(trimmed)
        .trim()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_haversine_distance() {
        // Rochester, NY to Buffalo, NY (approximately 107 km)
        let rochester = point(43.1566, -77.6088);
        let buffalo = point(42.8864, -78.8784);

        let distance = haversine_distance(rochester, buffalo);
        assert!((distance - 107.0).abs() < 15.0, "Distance should be ~107km, got {}", distance);
    }

    #[test]
    fn test_resolve_distance_unknown_when_missing() {
        let rochester = point(43.1566, -77.6088);

        assert_eq!(resolve_distance(Some(rochester), None), Distance::Unknown);
        assert_eq!(resolve_distance(None, Some(rochester)), Distance::Unknown);
        assert_eq!(resolve_distance(None, None), Distance::Unknown);
    }

    #[test]
    fn test_resolve_distance_rejects_invalid_point() {
        let bogus = GeoPoint {
            latitude: 120.0,
            longitude: 0.0,
        };
        let rochester = point(43.1566, -77.6088);

        assert_eq!(resolve_distance(Some(bogus), Some(rochester)), Distance::Unknown);
    }

    #[test]
    fn test_postal_code_lookup_fallback() {
        let mut table = HashMap::new();
        table.insert("14618".to_string(), point(43.12, -77.56));
        let lookup = PostalCodeLookup::new(table);

        let with_zip = Community {
            id: "c1".to_string(),
            postal_code: Some("14618-1234".to_string()),
            ..Default::default()
        };
        assert_eq!(lookup.locate(&with_zip), Some(point(43.12, -77.56)));

        let with_coords = Community {
            id: "c2".to_string(),
            location: Some(point(40.0, -75.0)),
            postal_code: Some("14618".to_string()),
            ..Default::default()
        };
        assert_eq!(lookup.locate(&with_coords), Some(point(40.0, -75.0)));

        let unknown = Community {
            id: "c3".to_string(),
            postal_code: Some("99999".to_string()),
            ..Default::default()
        };
        assert_eq!(lookup.locate(&unknown), None);
    }
}
