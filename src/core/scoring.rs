use chrono::NaiveDateTime;

use crate::core::distance::distance;
use crate::models::{Event, ScoredEvent, UserProfile};

/// Points per tag shared between the event and the user's interests
pub const TAG_MATCH_POINTS: u32 = 10;

/// Maximum number of events returned by [`rank_by_interest`]
pub const MAX_INTEREST_RESULTS: usize = 5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Score an event against a user's interests (integer points)
///
/// Scoring formula:
/// score = (
///     10 * shared_tags +
///     proximity_bonus +            # 20 / 10 / 5 below 10 / 50 / 100 km
///     recency_bonus +              # 15 / 10 / 5 below 7 / 30 / 90 days
///     capacity_bonus               # 10 / 5 / 2 above 10 / 5 / 0 free spots
/// )
pub fn calculate_interest_score(event: &Event, user: &UserProfile, now: NaiveDateTime) -> u32 {
    let shared_tags = event
        .tags
        .iter()
        .filter(|tag| user.is_interested_in(tag))
        .count() as u32;

    let distance_km = distance(user.home_coordinate.as_ref(), event.location.as_ref());
    let days_until = (event.day_start() - now).num_seconds() as f64 / SECONDS_PER_DAY;

    shared_tags * TAG_MATCH_POINTS
        + proximity_bonus(distance_km)
        + recency_bonus(days_until)
        + capacity_bonus(event.free_spots())
}

/// Closer events score higher; unknown locations score nothing
#[inline]
fn proximity_bonus(distance_km: f64) -> u32 {
    if !distance_km.is_finite() {
        0
    } else if distance_km < 10.0 {
        20
    } else if distance_km < 50.0 {
        10
    } else if distance_km < 100.0 {
        5
    } else {
        0
    }
}

/// Sooner events score higher; past days score nothing
#[inline]
fn recency_bonus(days_until: f64) -> u32 {
    if days_until < 0.0 {
        0
    } else if days_until < 7.0 {
        15
    } else if days_until < 30.0 {
        10
    } else if days_until < 90.0 {
        5
    } else {
        0
    }
}

#[inline]
fn capacity_bonus(free_spots: i64) -> u32 {
    if free_spots > 10 {
        10
    } else if free_spots > 5 {
        5
    } else if free_spots > 0 {
        2
    } else {
        0
    }
}

/// Rank events by how well they fit the user's interests
///
/// Events scoring zero are dropped, ties keep the collection order and at
/// most [`MAX_INTEREST_RESULTS`] events are returned. A user without declared
/// interests gets no suggestions.
pub fn rank_by_interest(events: &[Event], user: &UserProfile, now: NaiveDateTime) -> Vec<ScoredEvent> {
    if user.interests.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredEvent> = events
        .iter()
        .filter_map(|event| {
            let score = calculate_interest_score(event, user, now);
            tracing::trace!("Interest score for event {}: {}", event.id, score);
            (score > 0).then(|| ScoredEvent {
                event: event.clone(),
                score,
            })
        })
        .collect();

    // `sort_by` is stable, so equal scores keep their original order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_INTEREST_RESULTS);

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    const HOME: Coordinate = Coordinate { lat: 55.7558, lng: 37.6173 };

    fn create_test_event(tags: &[&str], km: Option<f64>, days_ahead: i64, free: u32) -> Event {
        Event {
            id: format!("{:?}-{:?}-{}", tags, km, days_ahead),
            title: "Cleanup".to_string(),
            description: String::new(),
            date: (now() + Duration::days(days_ahead)).date(),
            time: None,
            location: km.map(|km| Coordinate::new(HOME.lat + km / 111.195, HOME.lng)),
            max_volunteers: 20,
            current_volunteers: 20 - free,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            creator_id: "creator".to_string(),
            creator_name: None,
            volunteers: vec![],
            created_at: None,
        }
    }

    fn create_test_user(interests: &[&str]) -> UserProfile {
        UserProfile {
            id: "user".to_string(),
            full_name: "Test User".to_string(),
            last_name: None,
            first_name: None,
            middle_name: None,
            email: None,
            phone: None,
            city: None,
            interests: interests.iter().map(|t| t.to_string()).collect(),
            home_coordinate: Some(HOME),
            account_type: Default::default(),
            registered_at: None,
            created_events: vec![],
            password_hash: None,
        }
    }

    #[test]
    fn test_full_score_breakdown() {
        let user = create_test_user(&["мусор"]);
        let event = create_test_event(&["мусор", "реки"], Some(5.0), 3, 8);

        // 10 (tag) + 20 (proximity) + 15 (recency) + 5 (capacity)
        assert_eq!(calculate_interest_score(&event, &user, now()), 50);
    }

    #[test]
    fn test_proximity_bonus() {
        assert_eq!(proximity_bonus(0.0), 20);
        assert_eq!(proximity_bonus(9.99), 20);
        assert_eq!(proximity_bonus(10.0), 10);
        assert_eq!(proximity_bonus(49.9), 10);
        assert_eq!(proximity_bonus(99.0), 5);
        assert_eq!(proximity_bonus(100.0), 0);
        assert_eq!(proximity_bonus(f64::INFINITY), 0);
    }

    #[test]
    fn test_recency_bonus() {
        assert_eq!(recency_bonus(-0.5), 0);
        assert_eq!(recency_bonus(0.0), 15);
        assert_eq!(recency_bonus(6.9), 15);
        assert_eq!(recency_bonus(7.0), 10);
        assert_eq!(recency_bonus(29.0), 10);
        assert_eq!(recency_bonus(89.0), 5);
        assert_eq!(recency_bonus(90.0), 0);
    }

    #[test]
    fn test_capacity_bonus() {
        assert_eq!(capacity_bonus(11), 10);
        assert_eq!(capacity_bonus(10), 5);
        assert_eq!(capacity_bonus(6), 5);
        assert_eq!(capacity_bonus(5), 2);
        assert_eq!(capacity_bonus(1), 2);
        assert_eq!(capacity_bonus(0), 0);
        assert_eq!(capacity_bonus(-3), 0);
    }

    #[test]
    fn test_irrelevant_event_excluded() {
        let mut user = create_test_user(&["озеленение"]);
        user.home_coordinate = None;
        let event = create_test_event(&["мусор"], None, 200, 0);

        assert_eq!(calculate_interest_score(&event, &user, now()), 0);
        assert!(rank_by_interest(&[event], &user, now()).is_empty());
    }

    #[test]
    fn test_no_interests_no_suggestions() {
        let user = create_test_user(&[]);
        let event = create_test_event(&["мусор"], Some(1.0), 1, 15);

        assert!(rank_by_interest(&[event], &user, now()).is_empty());
    }

    #[test]
    fn test_rank_truncates_and_sorts() {
        let user = create_test_user(&["мусор"]);
        let events: Vec<Event> = (0..8)
            .map(|i| create_test_event(&["мусор"], Some(i as f64 * 15.0), i, 15))
            .collect();

        let ranked = rank_by_interest(&events, &user, now());

        assert_eq!(ranked.len(), MAX_INTEREST_RESULTS);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let user = create_test_user(&["мусор"]);
        let mut first = create_test_event(&["мусор"], Some(1.0), 1, 15);
        first.id = "first".to_string();
        let mut second = first.clone();
        second.id = "second".to_string();

        let ranked = rank_by_interest(&[first, second], &user, now());

        assert_eq!(ranked[0].event.id, "first");
        assert_eq!(ranked[1].event.id, "second");
    }
}
