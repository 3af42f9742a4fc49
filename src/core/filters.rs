use crate::models::{CareLevel, Community, Preferences};
use std::fmt;

/// Hard constraints applied by the eligibility filter
///
/// Amenities are deliberately absent: amenity data is sparse, so they are
/// scored instead of filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    CareLevel,
    Enhanced,
    Enriched,
    Budget,
    Waitlist,
    ContractRate,
    ApartmentType,
}

impl Constraint {
    pub const ALL: [Constraint; 7] = [
        Constraint::CareLevel,
        Constraint::Enhanced,
        Constraint::Enriched,
        Constraint::Budget,
        Constraint::Waitlist,
        Constraint::ContractRate,
        Constraint::ApartmentType,
    ];

    /// Unspecified preferences and unknown community data always pass
    pub fn is_satisfied(self, preferences: &Preferences, community: &Community) -> bool {
        match self {
            Constraint::CareLevel => preferences
                .care_level
                .map_or(true, |level| community.supports(level)),
            Constraint::Enhanced => {
                !preferences.requires_enhanced || community.supports(CareLevel::Enhanced)
            }
            Constraint::Enriched => {
                !preferences.requires_enriched || community.supports(CareLevel::Enriched)
            }
            Constraint::Budget => match (preferences.max_budget, community.monthly_fee) {
                (Some(budget), Some(fee)) => fee <= budget,
                _ => true,
            },
            Constraint::Waitlist => {
                match (preferences.waitlist_tolerance_days, community.waitlist_days) {
                    (Some(tolerance), Some(waitlist)) => waitlist <= tolerance,
                    _ => true,
                }
            }
            Constraint::ContractRate => !preferences.requires_contract_rate || community.contract_rate,
            Constraint::ApartmentType => preferences
                .apartment_type
                .as_deref()
                .map_or(true, |wanted| community.offers_apartment(wanted)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Constraint::CareLevel => "care level",
            Constraint::Enhanced => "enhanced services",
            Constraint::Enriched => "enriched services",
            Constraint::Budget => "budget",
            Constraint::Waitlist => "waitlist",
            Constraint::ContractRate => "contract rate",
            Constraint::ApartmentType => "apartment type",
        };
        f.write_str(label)
    }
}

/// Check if a community satisfies every hard constraint
#[inline]
pub fn is_eligible(preferences: &Preferences, community: &Community) -> bool {
    Constraint::ALL
        .iter()
        .all(|constraint| constraint.is_satisfied(preferences, community))
}

/// List the hard constraints a community violates (empty when eligible)
pub fn explain_exclusion(preferences: &Preferences, community: &Community) -> Vec<Constraint> {
    Constraint::ALL
        .iter()
        .copied()
        .filter(|constraint| !constraint.is_satisfied(preferences, community))
        .collect()
}

/// Reduce the candidate pool to eligible communities, preserving input order
pub fn filter_eligible<'a, I>(preferences: &Preferences, communities: I) -> Vec<&'a Community>
where
    I: IntoIterator<Item = &'a Community>,
{
    communities
        .into_iter()
        .filter(|community| {
            let eligible = is_eligible(preferences, community);
            if !eligible {
                tracing::trace!(
                    "Excluded {}: {:?}",
                    community.id,
                    explain_exclusion(preferences, community)
                );
            }
            eligible
        })
        .collect()
}
