//! Eco-Connect - event matching and recommendation service
//!
//! This library provides the matching core used by the Eco-Connect volunteer
//! platform: eligibility checks, quick-join selection of the nearest event,
//! interest-based ranking and the dashboard recommendation bundle.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_recommendations, can_join, distance, find_nearest, haversine_distance, rank_by_interest};
pub use crate::models::{Coordinate, Eligibility, Event, NearestEvent, Recommendations, Registration, ScoredEvent, UserProfile};
