use crate::error::ExplainerError;
use crate::models::{Community, Preferences, RankedMatch, ShortlistEntry};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Text attached when an explanation cannot be generated in time
pub const EXPLANATION_UNAVAILABLE: &str = "explanation unavailable";

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_MAX_TOP_N: usize = 50;
pub const DEFAULT_EXPLANATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Explanation requests in flight at once
const EXPLANATION_CONCURRENCY: usize = 10;

/// External text-generation collaborator
///
/// Implementations receive the client's preferences and one community and
/// return free text. The text is attached verbatim.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn explain(
        &self,
        preferences: &Preferences,
        community: &Community,
    ) -> Result<String, ExplainerError>;
}

/// Shortlist configuration, passed in per call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortlistConfig {
    pub top_n: usize,
    /// Upper bound for per-request overrides of `top_n`
    pub max_top_n: usize,
    /// Per-call bound; an expired call degrades to the placeholder
    pub explanation_timeout: Duration,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            max_top_n: DEFAULT_MAX_TOP_N,
            explanation_timeout: DEFAULT_EXPLANATION_TIMEOUT,
        }
    }
}

/// Take the top-N ranked matches and attach an explanation to each
///
/// Explanation requests run concurrently, at most
/// `EXPLANATION_CONCURRENCY` in flight, and are put back in rank order. A failed or timed-out request keeps
/// its entry with [`EXPLANATION_UNAVAILABLE`]; it never drops the entry or
/// fails the shortlist.
pub async fn build_shortlist(
    preferences: &Preferences,
    ranked: &[RankedMatch<'_>],
    config: &ShortlistConfig,
    explainer: &dyn ExplanationGenerator,
) -> Vec<ShortlistEntry> {
    let top = &ranked[..ranked.len().min(config.top_n)];

    let mut explanations: Vec<(usize, Option<String>)> =
        stream::iter(top.iter().enumerate().map(|(idx, candidate)| async move {
            let community = candidate.community;
            let explanation = match tokio::time::timeout(
                config.explanation_timeout,
                explainer.explain(preferences, community),
            )
            .await
            {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    tracing::warn!("Explanation failed for {}: {}", community.id, e);
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        "Explanation for {} timed out after {:?}",
                        community.id,
                        config.explanation_timeout
                    );
                    None
                }
            };
            (idx, explanation)
        }))
        .buffer_unordered(EXPLANATION_CONCURRENCY)
        .collect()
        .await;

    // Restore rank order
    explanations.sort_by_key(|(idx, _)| *idx);

    top.iter()
        .zip(explanations.into_iter().map(|(_, explanation)| explanation))
        .enumerate()
        .map(|(index, (candidate, explanation))| ShortlistEntry {
            rank: index + 1,
            community: candidate.community.clone(),
            score: candidate.score,
            distance_km: candidate.distance.km(),
            breakdown: candidate.breakdown,
            explanation_generated: explanation.is_some(),
            explanation: explanation.unwrap_or_else(|| EXPLANATION_UNAVAILABLE.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Distance, ScoreBreakdown};

    struct EchoExplainer;

    #[async_trait]
    impl ExplanationGenerator for EchoExplainer {
        async fn explain(
            &self,
            _preferences: &Preferences,
            community: &Community,
        ) -> Result<String, ExplainerError> {
            if community.id == "broken" {
                return Err(ExplainerError::ApiError("boom".to_string()));
            }
            if community.id == "slow" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(format!("{} fits", community.id))
        }
    }

    fn ranked_match(community: &Community, score: f64) -> RankedMatch<'_> {
        RankedMatch {
            community,
            score,
            distance: Distance::Unknown,
            breakdown: ScoreBreakdown::default(),
        }
    }

    fn community(id: &str) -> Community {
        Community {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_truncates_to_top_n() {
        let pool: Vec<Community> = (0..8).map(|i| community(&format!("c{}", i))).collect();
        let ranked: Vec<RankedMatch<'_>> = pool
            .iter()
            .enumerate()
            .map(|(i, c)| ranked_match(c, 100.0 - i as f64))
            .collect();

        let shortlist = build_shortlist(
            &Preferences::default(),
            &ranked,
            &ShortlistConfig::default(),
            &EchoExplainer,
        )
        .await;

        assert_eq!(shortlist.len(), 5);
        assert_eq!(shortlist[0].rank, 1);
        assert_eq!(shortlist[0].community.id, "c0");
        assert_eq!(shortlist[0].explanation, "c0 fits");
    }

    #[tokio::test]
    async fn test_failure_keeps_entry_with_placeholder() {
        let pool = vec![community("ok"), community("broken")];
        let ranked = vec![ranked_match(&pool[0], 90.0), ranked_match(&pool[1], 80.0)];

        let shortlist = build_shortlist(
            &Preferences::default(),
            &ranked,
            &ShortlistConfig::default(),
            &EchoExplainer,
        )
        .await;

        assert_eq!(shortlist.len(), 2);
        assert!(shortlist[0].explanation_generated);
        assert_eq!(shortlist[1].explanation, EXPLANATION_UNAVAILABLE);
        assert!(!shortlist[1].explanation_generated);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_placeholder() {
        let pool = vec![community("slow"), community("fast")];
        let ranked = vec![ranked_match(&pool[0], 90.0), ranked_match(&pool[1], 80.0)];
        let config = ShortlistConfig {
            top_n: 5,
            explanation_timeout: Duration::from_millis(50),
            ..ShortlistConfig::default()
        };

        let shortlist =
            build_shortlist(&Preferences::default(), &ranked, &config, &EchoExplainer).await;

        assert_eq!(shortlist[0].explanation, EXPLANATION_UNAVAILABLE);
        assert_eq!(shortlist[1].explanation, "fast fits");
    }

    #[tokio::test]
    async fn test_fewer_than_n_not_padded() {
        let pool = vec![community("only")];
        let ranked = vec![ranked_match(&pool[0], 50.0)];

        let shortlist = build_shortlist(
            &Preferences::default(),
            &ranked,
            &ShortlistConfig::default(),
            &EchoExplainer,
        )
        .await;

        assert_eq!(shortlist.len(), 1);
    }
}
