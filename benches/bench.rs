// Criterion benchmarks for the Eco-Connect matching core

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eco_connect::core::{build_recommendations, find_nearest, haversine_distance, rank_by_interest};
use eco_connect::models::{Coordinate, Event, Registration, UserProfile};

const TAGS: [&str; 5] = ["мусор", "реки", "озеленение", "парки", "животные"];

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn create_event(id: usize) -> Event {
    let offset = (id as f64 * 0.003) % 1.5;
    Event {
        id: id.to_string(),
        title: format!("Субботник {}", id),
        description: String::new(),
        date: (now() + Duration::days((id % 60) as i64 - 5)).date(),
        time: None,
        location: Some(Coordinate::new(55.7558 + offset, 37.6173 - offset)),
        max_volunteers: 10 + (id % 40) as u32,
        current_volunteers: (id % 25) as u32,
        tags: vec![TAGS[id % TAGS.len()].to_string(), TAGS[(id / 3) % TAGS.len()].to_string()],
        creator_id: "curator".to_string(),
        creator_name: None,
        volunteers: vec![],
        created_at: None,
    }
}

fn create_user() -> UserProfile {
    UserProfile {
        id: "volunteer".to_string(),
        full_name: "Bench User".to_string(),
        last_name: None,
        first_name: None,
        middle_name: None,
        email: None,
        phone: None,
        city: Some("Москва".to_string()),
        interests: vec!["мусор".to_string(), "парки".to_string()],
        home_coordinate: Some(Coordinate::new(55.7558, 37.6173)),
        account_type: Default::default(),
        registered_at: None,
        created_events: vec![],
        password_hash: None,
    }
}

fn create_registrations(events: &[Event]) -> Vec<Registration> {
    events
        .iter()
        .step_by(7)
        .map(|event| Registration::new(&event.id, "volunteer"))
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(55.7558),
                black_box(37.6173),
                black_box(59.9343),
                black_box(30.3351),
            )
        });
    });
}

fn bench_ranking(c: &mut Criterion) {
    let user = create_user();
    let mut group = c.benchmark_group("ranking");

    for event_count in [10, 100, 1000].iter() {
        let events: Vec<Event> = (0..*event_count).map(create_event).collect();
        let registrations = create_registrations(&events);

        group.bench_with_input(BenchmarkId::new("find_nearest", event_count), event_count, |b, _| {
            b.iter(|| {
                find_nearest(
                    black_box(&events),
                    black_box(&user),
                    black_box(&registrations),
                    now(),
                )
            });
        });

        group.bench_with_input(
            BenchmarkId::new("rank_by_interest", event_count),
            event_count,
            |b, _| {
                b.iter(|| rank_by_interest(black_box(&events), black_box(&user), now()));
            },
        );
    }

    group.finish();
}

fn bench_recommendations(c: &mut Criterion) {
    let user = create_user();
    let events: Vec<Event> = (0..500).map(create_event).collect();
    let registrations = create_registrations(&events);

    c.bench_function("build_recommendations_500_events", |b| {
        b.iter(|| {
            build_recommendations(
                black_box(&events),
                black_box(&user),
                black_box(&registrations),
                now(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_ranking,
    bench_recommendations
);

criterion_main!(benches);
