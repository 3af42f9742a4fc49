use crate::core::{
    distance::CoordinateLookup,
    filters::filter_eligible,
    ranker::{rank, RankingConfig},
    shortlist::{build_shortlist, ExplanationGenerator, ShortlistConfig},
};
use crate::error::MatchError;
use crate::models::{
    intake::{communities_from_json, preferences_from_json},
    Community, Preferences, RankedMatch, ShortlistEntry,
};
use serde_json::Value;

/// Result of one matching run
#[derive(Debug)]
pub struct MatchOutcome {
    pub shortlist: Vec<ShortlistEntry>,
    pub total_candidates: usize,
    pub eligible_count: usize,
}

impl MatchOutcome {
    /// No community passed the hard constraints
    pub fn is_empty(&self) -> bool {
        self.shortlist.is_empty()
    }
}

/// Run configuration for the whole pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatcherConfig {
    pub ranking: RankingConfig,
    pub shortlist: ShortlistConfig,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility filter (hard constraints)
/// 2. Composite ranking
/// 3. Shortlist with explanations
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self {
            config: MatcherConfig::default(),
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Copy of this matcher with a different shortlist length, clamped to
    /// `1..=max_top_n`
    pub fn with_top_n(&self, top_n: usize) -> Self {
        let mut config = self.config;
        config.shortlist.top_n = top_n.clamp(1, config.shortlist.max_top_n.max(1));
        Self { config }
    }

    /// Filter and rank without requesting explanations
    pub fn rank_candidates<'a>(
        &self,
        preferences: &Preferences,
        communities: &'a [Community],
        lookup: &dyn CoordinateLookup,
    ) -> Vec<RankedMatch<'a>> {
        let eligible = filter_eligible(preferences, communities);

        tracing::debug!(
            "Eligibility filter kept {} of {} communities",
            eligible.len(),
            communities.len()
        );

        rank(preferences, &eligible, &self.config.ranking, lookup)
    }

    /// Find the shortlist for already-normalized records
    pub async fn find_matches(
        &self,
        preferences: &Preferences,
        communities: &[Community],
        lookup: &dyn CoordinateLookup,
        explainer: &dyn ExplanationGenerator,
    ) -> MatchOutcome {
        let total_candidates = communities.len();
        let ranked = self.rank_candidates(preferences, communities, lookup);
        let eligible_count = ranked.len();

        if ranked.is_empty() {
            tracing::info!("No eligible communities among {} candidates", total_candidates);
        }

        let shortlist =
            build_shortlist(preferences, &ranked, &self.config.shortlist, explainer).await;

        tracing::info!(
            "Shortlisted {} communities ({} eligible of {} candidates)",
            shortlist.len(),
            eligible_count,
            total_candidates
        );

        MatchOutcome {
            shortlist,
            total_candidates,
            eligible_count,
        }
    }

    /// Normalize upstream JSON and run the full pipeline
    ///
    /// Returns an error only for structurally invalid input; malformed fields
    /// are treated as unspecified.
    pub async fn find_matches_json(
        &self,
        preferences: &Value,
        communities: &Value,
        lookup: &dyn CoordinateLookup,
        explainer: &dyn ExplanationGenerator,
    ) -> Result<MatchOutcome, MatchError> {
        let preferences = preferences_from_json(preferences)?;
        let communities = communities_from_json(communities)?;

        Ok(self
            .find_matches(&preferences, &communities, lookup, explainer)
            .await)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}
