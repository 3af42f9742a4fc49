//! Placement Match - matching and ranking engine for senior living placement
//!
//! This library takes a client's structured preferences and a pool of
//! communities, filters on hard constraints, ranks the survivors by a
//! weighted composite score and builds an explained top-N shortlist.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, MatcherConfig, MatchOutcome, distance::{haversine_distance, resolve_distance}};
pub use error::{MatchError, ExplainerError};
pub use models::{Preferences, Community, CareLevel, GeoPoint, Distance, ShortlistEntry, ScoringWeights};
