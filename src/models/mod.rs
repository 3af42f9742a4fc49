// Model exports
pub mod domain;
pub mod intake;
pub mod requests;
pub mod responses;

pub use domain::{CareLevel, Community, Distance, GeoPoint, Preferences, RankedMatch, ScoreBreakdown, ScoringWeights, ShortlistEntry};
pub use requests::ShortlistRequest;
pub use responses::{ErrorResponse, HealthResponse, ShortlistResponse};
