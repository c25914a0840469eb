use chrono::NaiveDateTime;

use crate::core::{
    filters::is_upcoming_for,
    nearest::find_nearest,
    scoring::rank_by_interest,
};
use crate::models::{Event, Recommendations, Registration, UserProfile};

/// Size of the upcoming and popular buckets
pub const BUCKET_SIZE: usize = 3;

/// Build the dashboard recommendation bundle
///
/// # Buckets
/// 1. Nearest eligible event (quick join)
/// 2. Interest matches
/// 3. Upcoming events, soonest first
/// 4. Popular events, most volunteers first
///
/// Buckets answer different questions, so the same event may appear in
/// several of them.
pub fn build_recommendations(
    events: &[Event],
    user: &UserProfile,
    registrations: &[Registration],
    now: NaiveDateTime,
) -> Recommendations {
    let open: Vec<&Event> = events
        .iter()
        .filter(|event| is_upcoming_for(event, user, registrations, now))
        .collect();

    let mut upcoming = open.clone();
    upcoming.sort_by_key(|event| event.date);

    let mut popular = open;
    popular.sort_by(|a, b| b.current_volunteers.cmp(&a.current_volunteers));

    let recommendations = Recommendations {
        nearest_event: find_nearest(events, user, registrations, now),
        interest_events: rank_by_interest(events, user, now),
        upcoming_events: upcoming.into_iter().take(BUCKET_SIZE).cloned().collect(),
        popular_events: popular.into_iter().take(BUCKET_SIZE).cloned().collect(),
    };

    tracing::debug!(
        "Recommendations for {}: nearest={}, interest={}, upcoming={}, popular={}",
        user.id,
        recommendations.nearest_event.is_some(),
        recommendations.interest_events.len(),
        recommendations.upcoming_events.len(),
        recommendations.popular_events.len()
    );

    recommendations
}
