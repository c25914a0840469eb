// Unit tests for the Eco-Connect matching core

use chrono::{Duration, NaiveDate, NaiveDateTime};
use eco_connect::core::{
    distance::{distance, haversine_distance},
    filters::can_join,
    nearest::{find_nearest, TIE_BREAK_BAND_KM},
    scoring::{calculate_interest_score, rank_by_interest, MAX_INTEREST_RESULTS},
};
use eco_connect::models::{Coordinate, Event, IneligibleReason, Registration, UserProfile};

const HOME: Coordinate = Coordinate { lat: 55.7558, lng: 37.6173 };

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 14)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

/// Point `km` kilometers due north of HOME
fn north_of_home(km: f64) -> Coordinate {
    Coordinate::new(HOME.lat + km / 111.195, HOME.lng)
}

fn create_event(id: &str, km: Option<f64>, days_ahead: i64, max: u32, current: u32) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Уборка {}", id),
        description: String::new(),
        date: (now() + Duration::days(days_ahead)).date(),
        time: None,
        location: km.map(north_of_home),
        max_volunteers: max,
        current_volunteers: current,
        tags: vec![],
        creator_id: "curator".to_string(),
        creator_name: None,
        volunteers: vec![],
        created_at: None,
    }
}

fn create_user(interests: &[&str], home: Option<Coordinate>) -> UserProfile {
    UserProfile {
        id: "volunteer".to_string(),
        full_name: "Иван Петров".to_string(),
        last_name: None,
        first_name: None,
        middle_name: None,
        email: Some("ivan@example.com".to_string()),
        phone: None,
        city: Some("Москва".to_string()),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        home_coordinate: home,
        account_type: Default::default(),
        registered_at: None,
        created_events: vec![],
        password_hash: None,
    }
}

#[test]
fn test_distance_zero_for_same_point() {
    for point in [HOME, Coordinate::new(-33.86, 151.21), Coordinate::new(0.0, 0.0)] {
        assert_eq!(distance(Some(&point), Some(&point)), 0.0);
    }
}

#[test]
fn test_distance_symmetric() {
    let a = Coordinate::new(56.8389, 60.6057);
    let b = Coordinate::new(47.2357, 39.7015);

    assert_eq!(distance(Some(&a), Some(&b)), distance(Some(&b), Some(&a)));
}

#[test]
fn test_haversine_moscow_to_kazan() {
    // Roughly 720 km
    let km = haversine_distance(55.7558, 37.6173, 55.7961, 49.1064);
    assert!((km - 720.0).abs() < 15.0, "Expected ~720km, got {}", km);
}

#[test]
fn test_full_event_cannot_be_joined() {
    let event = create_event("full", Some(1.0), 1, 10, 10);
    let user = create_user(&[], Some(HOME));

    let result = can_join(&event, &user, &[], now());

    assert!(!result.allowed);
    assert_eq!(result.reason, Some(IneligibleReason::NoFreeSpots));
    assert_eq!(result.reason.map(|r| r.to_string()), Some("no free spots".to_string()));
}

#[test]
fn test_already_registered_on_open_event() {
    let event = create_event("open", Some(1.0), 4, 10, 2);
    let user = create_user(&[], Some(HOME));
    let registrations = vec![Registration::new("open", "volunteer")];

    let result = can_join(&event, &user, &registrations, now());

    assert!(!result.allowed);
    assert_eq!(result.reason, Some(IneligibleReason::AlreadyRegistered));
}

#[test]
fn test_nearest_within_band_prefers_earlier_date() {
    let events = vec![
        create_event("A", Some(3.0), 5, 20, 0),
        create_event("B", Some(7.0), 1, 20, 0),
    ];
    assert!(7.0 - 3.0 < TIE_BREAK_BAND_KM);

    let nearest = find_nearest(&events, &create_user(&[], Some(HOME)), &[], now()).unwrap();
    assert_eq!(nearest.event.id, "B");
}

#[test]
fn test_nearest_never_returns_ineligible() {
    let events = vec![
        create_event("past", Some(0.5), -1, 20, 0),
        create_event("full", Some(1.0), 2, 5, 5),
        create_event("joined", Some(2.0), 2, 20, 1),
        create_event("ok", Some(150.0), 30, 20, 1),
    ];
    let user = create_user(&[], Some(HOME));
    let registrations = vec![Registration::new("joined", "volunteer")];

    let nearest = find_nearest(&events, &user, &registrations, now()).unwrap();

    assert_eq!(nearest.event.id, "ok");
    assert!(can_join(&nearest.event, &user, &registrations, now()).allowed);
}

#[test]
fn test_interest_score_scenario() {
    let user = create_user(&["мусор"], Some(HOME));
    let mut event = create_event("river", Some(5.0), 3, 20, 12);
    event.tags = vec!["мусор".to_string(), "реки".to_string()];

    // 8 free spots fall into the "> 5" bucket:
    // 10 (tag) + 20 (proximity) + 15 (recency) + 5 (capacity)
    assert_eq!(calculate_interest_score(&event, &user, now()), 50);

    // With more than 10 free spots the capacity bonus reaches 10
    event.current_volunteers = 5;
    assert_eq!(calculate_interest_score(&event, &user, now()), 55);
}

#[test]
fn test_zero_score_event_excluded() {
    let user = create_user(&["озеленение"], None);
    let mut event = create_event("nothing", None, 120, 10, 10);
    event.tags = vec!["мусор".to_string()];

    assert_eq!(calculate_interest_score(&event, &user, now()), 0);
    assert!(rank_by_interest(&[event], &user, now()).is_empty());
}

#[test]
fn test_rank_by_interest_bounded_and_sorted() {
    let user = create_user(&["мусор", "листья"], Some(HOME));
    let events: Vec<Event> = (0..12)
        .map(|i| {
            let mut event = create_event(&i.to_string(), Some(i as f64 * 9.0), i * 4, 30, i as u32 * 2);
            event.tags = if i % 2 == 0 {
                vec!["мусор".to_string(), "листья".to_string()]
            } else {
                vec!["озеленение".to_string()]
            };
            event
        })
        .collect();

    let ranked = rank_by_interest(&events, &user, now());

    assert!(ranked.len() <= MAX_INTEREST_RESULTS);
    assert_eq!(ranked.len(), MAX_INTEREST_RESULTS);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score, "Ranking not sorted by score");
    }
}
