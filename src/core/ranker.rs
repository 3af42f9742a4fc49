use crate::core::{
    distance::{resolve_distance, CoordinateLookup},
    scoring::calculate_match_score,
};
use crate::models::{Community, Preferences, RankedMatch, ScoringWeights};
use std::cmp::Ordering;

/// Distance at which the distance sub-score halves
pub const DEFAULT_DISTANCE_SCALE_KM: f64 = 25.0;

/// Ranking configuration, passed in per call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    pub weights: ScoringWeights,
    pub distance_scale_km: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            distance_scale_km: DEFAULT_DISTANCE_SCALE_KM,
        }
    }
}

/// Score and order eligible communities, most preferred first
///
/// The output is a permutation of the input. Ties on score are broken by
/// ascending community identifier.
pub fn rank<'a>(
    preferences: &Preferences,
    eligible: &[&'a Community],
    config: &RankingConfig,
    lookup: &dyn CoordinateLookup,
) -> Vec<RankedMatch<'a>> {
    let mut ranked: Vec<RankedMatch<'a>> = eligible
        .iter()
        .map(|&community| {
            let distance = resolve_distance(preferences.location, lookup.locate(community));
            let (score, breakdown) = calculate_match_score(
                community,
                preferences,
                distance,
                &config.weights,
                config.distance_scale_km,
            );

            RankedMatch {
                community,
                score,
                distance,
                breakdown,
            }
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

/// Sort by score (descending), known distance before unknown, then identifier
fn compare_ranked(a: &RankedMatch<'_>, b: &RankedMatch<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.distance.is_known().cmp(&a.distance.is_known()))
        .then_with(|| a.community.id.cmp(&b.community.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::RecordCoordinates;
    use crate::models::GeoPoint;

    fn create_candidate(id: &str, lat: Option<f64>, partner: bool) -> Community {
        Community {
            id: id.to_string(),
            location: lat.and_then(|lat| GeoPoint::new(lat, -77.6)),
            placement_partner: partner,
            monthly_fee: Some(4000.0),
            ..Default::default()
        }
    }

    fn create_preferences() -> Preferences {
        Preferences {
            location: GeoPoint::new(43.15, -77.6),
            max_budget: Some(5000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_empty() {
        let ranked = rank(&create_preferences(), &[], &RankingConfig::default(), &RecordCoordinates);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_closer_ranks_higher() {
        let near = create_candidate("near", Some(43.16), false);
        let far = create_candidate("far", Some(44.5), false);
        let pool = vec![&far, &near];

        let ranked = rank(&create_preferences(), &pool, &RankingConfig::default(), &RecordCoordinates);

        assert_eq!(ranked[0].community.id, "near");
        assert!(ranked[0].distance.is_known());
    }

    #[test]
    fn test_ties_broken_by_identifier() {
        let b = create_candidate("b", None, false);
        let a = create_candidate("a", None, false);
        let c = create_candidate("c", None, false);
        let pool = vec![&c, &b, &a];

        let ranked = rank(&Preferences::default(), &pool, &RankingConfig::default(), &RecordCoordinates);
        let ids: Vec<&str> = ranked.iter().map(|m| m.community.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_known_distance_wins_score_tie() {
        let unknown = create_candidate("a-unknown", None, false);
        let known = create_candidate("b-known", Some(43.2), false);
        let pool = vec![&unknown, &known];
        let config = RankingConfig {
            weights: ScoringWeights {
                distance: 0.0,
                ..ScoringWeights::default()
            },
            ..RankingConfig::default()
        };
        assert!(config.weights.validate().is_ok());

        let ranked = rank(&create_preferences(), &pool, &config, &RecordCoordinates);

        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].community.id, "b-known");
        assert_eq!(ranked[1].community.id, "a-unknown");
    }

    #[test]
    fn test_partner_weight_is_tunable() {
        let partner = create_candidate("partner", Some(44.5), true);
        let near = create_candidate("near", Some(43.15), false);
        let pool = vec![&near, &partner];

        let ranked = rank(&create_preferences(), &pool, &RankingConfig::default(), &RecordCoordinates);
        assert_eq!(ranked[0].community.id, "partner");

        let no_priority = RankingConfig {
            weights: ScoringWeights {
                partner: 0.0,
                ..ScoringWeights::default()
            },
            ..RankingConfig::default()
        };
        let ranked = rank(&create_preferences(), &pool, &no_priority, &RecordCoordinates);
        assert_eq!(ranked[0].community.id, "near");
    }
}
