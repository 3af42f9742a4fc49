// Core algorithm exports
pub mod distance;
pub mod export;
pub mod filters;
pub mod matcher;
pub mod ranker;
pub mod scoring;
pub mod shortlist;

pub use distance::{haversine_distance, resolve_distance, CoordinateLookup, PostalCodeLookup, RecordCoordinates};
pub use export::{to_csv, to_rows, ShortlistRow};
pub use filters::{explain_exclusion, filter_eligible, is_eligible, Constraint};
pub use matcher::{MatchOutcome, Matcher, MatcherConfig};
pub use ranker::{rank, RankingConfig};
pub use scoring::calculate_match_score;
pub use shortlist::{build_shortlist, ExplanationGenerator, ShortlistConfig, EXPLANATION_UNAVAILABLE};
