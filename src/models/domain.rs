use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tier of medical/personal support a client needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareLevel {
    Independent,
    Assisted,
    Enhanced,
    Enriched,
    MemoryCare,
}

impl CareLevel {
    pub const ALL: [CareLevel; 5] = [
        CareLevel::Independent,
        CareLevel::Assisted,
        CareLevel::Enhanced,
        CareLevel::Enriched,
        CareLevel::MemoryCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareLevel::Independent => "independent",
            CareLevel::Assisted => "assisted",
            CareLevel::Enhanced => "enhanced",
            CareLevel::Enriched => "enriched",
            CareLevel::MemoryCare => "memory-care",
        }
    }

    /// Parse a single free-text care level, most specific tier first.
    ///
    /// "Enhanced Assisted Living" is the enhanced tier, not plain assisted.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        if text.contains("memory") || text == "mc" {
            Some(CareLevel::MemoryCare)
        } else if text.contains("enriched") {
            Some(CareLevel::Enriched)
        } else if text.contains("enhanced") {
            Some(CareLevel::Enhanced)
        } else if text.contains("assisted") || text == "al" || text == "alr" {
            Some(CareLevel::Assisted)
        } else if text.contains("independent") || text == "il" {
            Some(CareLevel::Independent)
        } else {
            None
        }
    }
}

impl fmt::Display for CareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let point = Self { latitude, longitude };
        point.is_valid().then_some(point)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Normalized client requirements, built once per matching run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preferences {
    pub client_name: Option<String>,
    pub care_level: Option<CareLevel>,
    pub max_budget: Option<f64>,
    /// Maximum acceptable wait in days. `Some(0)` means no waitlist is tolerated.
    pub waitlist_tolerance_days: Option<u32>,
    pub location: Option<GeoPoint>,
    pub apartment_type: Option<String>,
    pub amenities: BTreeSet<String>,
    pub requires_contract_rate: bool,
    pub requires_enhanced: bool,
    pub requires_enriched: bool,
}

/// Normalized facility attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Community {
    pub id: String,
    pub name: Option<String>,
    pub service_types: BTreeSet<CareLevel>,
    /// Estimated waitlist in days; `None` when unknown, `Some(0)` for no waitlist
    pub waitlist_days: Option<u32>,
    pub monthly_fee: Option<f64>,
    pub contract_rate: bool,
    pub placement_partner: bool,
    pub location: Option<GeoPoint>,
    pub postal_code: Option<String>,
    pub apartment_types: Vec<String>,
    pub amenities: BTreeSet<String>,
}

impl Community {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn supports(&self, level: CareLevel) -> bool {
        self.service_types.contains(&level)
    }

    /// Fee is missing upstream; retained by the filter but scored lower
    pub fn fee_unknown(&self) -> bool {
        self.monthly_fee.is_none()
    }

    pub fn offers_apartment(&self, wanted: &str) -> bool {
        let wanted = normalize_label(wanted);
        self.apartment_types
            .iter()
            .any(|offered| normalize_label(offered) == wanted)
    }
}

/// Lowercase and collapse internal whitespace
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Great-circle distance, or the sentinel for a missing coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Known(f64),
    Unknown,
}

impl Distance {
    pub fn km(&self) -> Option<f64> {
        match self {
            Distance::Known(km) => Some(*km),
            Distance::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Distance::Known(_))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Known(km) => write!(f, "{:.1} km", km),
            Distance::Unknown => f.write_str("unknown"),
        }
    }
}

/// Scoring weights
///
/// `partner` is a business-priority override for placement partners, not a
/// client-preference signal. It must stay the largest weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub distance: f64,
    pub partner: f64,
    pub amenity: f64,
    pub budget: f64,
    pub contract: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance: 0.25,
            partner: 0.35,
            amenity: 0.20,
            budget: 0.15,
            contract: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.distance + self.partner + self.amenity + self.budget + self.contract
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("distance", self.distance),
            ("partner", self.partner),
            ("amenity", self.amenity),
            ("budget", self.budget),
            ("contract", self.contract),
        ]
    }

    pub fn validate(&self) -> Result<(), crate::error::WeightsError> {
        use crate::error::WeightsError;

        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::Invalid { name, value });
            }
        }

        if self.sum() <= 0.0 {
            return Err(WeightsError::AllZero);
        }

        let largest_other = self
            .named()
            .into_iter()
            .filter(|(name, _)| *name != "partner")
            .map(|(_, value)| value)
            .fold(0.0, f64::max);

        if self.partner <= largest_other {
            return Err(WeightsError::PartnerNotDominant {
                partner: self.partner,
                other: largest_other,
            });
        }

        Ok(())
    }
}

/// Per-criterion sub-scores, each normalized to 0-1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub partner: f64,
    pub amenity: f64,
    pub budget: f64,
    pub contract: f64,
}

/// Scored community produced by the ranker
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch<'a> {
    pub community: &'a Community,
    pub score: f64,
    pub distance: Distance,
    pub breakdown: ScoreBreakdown,
}

/// Final shortlist entry with its attached explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistEntry {
    pub rank: usize,
    pub community: Community,
    pub score: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
    /// False when the placeholder text was substituted
    #[serde(rename = "explanationGenerated")]
    pub explanation_generated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_care_level_parse() {
        assert_eq!(CareLevel::parse("Assisted Living"), Some(CareLevel::Assisted));
        assert_eq!(CareLevel::parse("Enhanced Assisted Living"), Some(CareLevel::Enhanced));
        assert_eq!(CareLevel::parse("memory care"), Some(CareLevel::MemoryCare));
        assert_eq!(CareLevel::parse("IL"), Some(CareLevel::Independent));
        assert_eq!(CareLevel::parse("spa resort"), None);
        assert_eq!(CareLevel::parse("  "), None);
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(43.15, -77.61).is_some());
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_offers_apartment_ignores_case_and_spacing() {
        let community = Community {
            id: "c1".to_string(),
            apartment_types: vec!["One  Bedroom".to_string(), "Studio".to_string()],
            ..Default::default()
        };

        assert!(community.offers_apartment("one bedroom"));
        assert!(community.offers_apartment("STUDIO"));
        assert!(!community.offers_apartment("two bedroom"));
    }

    #[test]
    fn test_default_weights_valid() {
        let weights = ScoringWeights::default();
        assert!(weights.validate().is_ok());
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_partner_must_dominate() {
        let weights = ScoringWeights {
            distance: 0.40,
            partner: 0.30,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());

        let tied = ScoringWeights {
            distance: 0.35,
            ..ScoringWeights::default()
        };
        assert!(tied.validate().is_err());
    }

    #[test]
    fn test_weights_reject_negative() {
        let weights = ScoringWeights {
            budget: -0.1,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_distance_display() {
        assert_eq!(Distance::Known(12.345).to_string(), "12.3 km");
        assert_eq!(Distance::Unknown.to_string(), "unknown");
        assert_eq!(Distance::Unknown.km(), None);
    }
}
