// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod nearest;
pub mod recommender;
pub mod scoring;

pub use distance::{distance, haversine_distance};
pub use filters::{can_join, is_registered, is_upcoming_for, FAR_EVENT_WARNING_KM};
pub use nearest::{compare_candidates, find_nearest, TIE_BREAK_BAND_KM};
pub use recommender::{build_recommendations, BUCKET_SIZE};
pub use scoring::{calculate_interest_score, rank_by_interest, MAX_INTEREST_RESULTS};
