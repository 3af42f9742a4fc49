use crate::models::{Community, Distance, Preferences, ScoreBreakdown, ScoringWeights};

/// Headroom score for a community whose fee is missing upstream.
/// Below every known-affordable fee (>= 0.5), above nothing eligible.
pub const FEE_UNKNOWN_SCORE: f64 = 0.25;

/// Calculate a composite score (0-100) for an eligible community
///
/// Scoring formula, normalized by the total weight:
/// score = (
///     distance_score * w.distance +   # Closer = higher, unknown = 0
///     partner_score  * w.partner  +   # Placement partner business priority
///     amenity_fit    * w.amenity  +   # Share of desired amenities offered
///     budget_score   * w.budget   +   # Headroom under the client's budget
///     contract_score * w.contract     # Contract rate offered
/// ) * 100
pub fn calculate_match_score(
    community: &Community,
    preferences: &Preferences,
    distance: Distance,
    weights: &ScoringWeights,
    distance_scale_km: f64,
) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        distance: calculate_distance_score(distance, distance_scale_km),
        partner: calculate_partner_score(community),
        amenity: calculate_amenity_fit(community, preferences),
        budget: calculate_budget_headroom(community, preferences),
        contract: if community.contract_rate { 1.0 } else { 0.0 },
    };

    (composite_score(&breakdown, weights), breakdown)
}

/// Weighted combination of sub-scores on a 0-100 scale
pub fn composite_score(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    let total_weight = weights.sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted = breakdown.distance * weights.distance
        + breakdown.partner * weights.partner
        + breakdown.amenity * weights.amenity
        + breakdown.budget * weights.budget
        + breakdown.contract * weights.contract;

    (weighted / total_weight * 100.0).clamp(0.0, 100.0)
}

/// Calculate distance score (0-1)
/// Inverse decay: 1 at zero distance, 0.5 at `scale_km`; unknown scores 0
#[inline]
pub fn calculate_distance_score(distance: Distance, scale_km: f64) -> f64 {
    match distance {
        Distance::Known(km) => {
            let scale = if scale_km > 0.0 { scale_km } else { 1.0 };
            1.0 / (1.0 + km.max(0.0) / scale)
        }
        Distance::Unknown => 0.0,
    }
}

#[inline]
pub fn calculate_partner_score(community: &Community) -> f64 {
    if community.placement_partner {
        1.0
    } else {
        0.0
    }
}

/// Calculate amenity fit (0-1): fraction of desired amenities present
#[inline]
pub fn calculate_amenity_fit(community: &Community, preferences: &Preferences) -> f64 {
    if preferences.amenities.is_empty() {
        return 0.0;
    }

    let present = preferences
        .amenities
        .iter()
        .filter(|amenity| community.amenities.contains(*amenity))
        .count();

    present as f64 / preferences.amenities.len() as f64
}

/// Calculate budget headroom (0-1)
///
/// Without a client budget every community gets 0.5. Otherwise known fees
/// within budget land in 0.5-1.0 depending on how far under budget they are,
/// and unknown fees get [`FEE_UNKNOWN_SCORE`].
#[inline]
pub fn calculate_budget_headroom(community: &Community, preferences: &Preferences) -> f64 {
    let Some(budget) = preferences.max_budget else {
        return 0.5;
    };

    match community.monthly_fee {
        None => FEE_UNKNOWN_SCORE,
        Some(fee) if fee > budget => 0.0,
        Some(fee) if budget > 0.0 => 0.5 + 0.5 * ((budget - fee) / budget).min(1.0),
        Some(_) => 0.5,
    }
}
