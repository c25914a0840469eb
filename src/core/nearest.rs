use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::core::{distance::distance, filters::can_join};
use crate::models::{Event, NearestEvent, Registration, UserProfile};

/// Within this band two candidates count as equally close and the earlier
/// date wins instead.
pub const TIE_BREAK_BAND_KM: f64 = 10.0;

/// Quick-join ordering between two candidates
///
/// Distances closer than [`TIE_BREAK_BAND_KM`] compare by date, otherwise by
/// distance. Not transitive across bands, so callers must not hand it to
/// `slice::sort_by`.
pub fn compare_candidates(a: &NearestEvent, b: &NearestEvent) -> Ordering {
    let gap = (a.distance_km - b.distance_km).abs();
    if gap < TIE_BREAK_BAND_KM {
        return a.event.date.cmp(&b.event.date);
    }

    a.distance_km
        .partial_cmp(&b.distance_km)
        .unwrap_or(Ordering::Equal)
}

/// Find the single best event for quick join
///
/// Only events passing [`can_join`] are considered; the distance warning is
/// ignored. Returns `None` when nothing is eligible.
pub fn find_nearest(
    events: &[Event],
    user: &UserProfile,
    registrations: &[Registration],
    now: NaiveDateTime,
) -> Option<NearestEvent> {
    let candidates: Vec<NearestEvent> = events
        .iter()
        .filter(|event| can_join(event, user, registrations, now).allowed)
        .map(|event| NearestEvent {
            distance_km: distance(user.home_coordinate.as_ref(), event.location.as_ref()),
            event: event.clone(),
        })
        .collect();

    tracing::debug!(
        "Quick join for {}: {} of {} events eligible",
        user.id,
        candidates.len(),
        events.len()
    );

    insertion_sort_by(candidates, compare_candidates).into_iter().next()
}

/// Stable insertion sort that tolerates comparators without a total order
///
/// Quadratic in the number of candidates, which stays small per call. When
/// band comparisons form a cycle (a beats b, b beats c, c beats a) the winner
/// depends on the input order: each item only moves past the neighbours it
/// compares below, so an earlier head can keep its place.
fn insertion_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut sorted: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        let mut index = sorted.len();
        while index > 0 && compare(&sorted[index - 1], &item) == Ordering::Greater {
            index -= 1;
        }
        sorted.insert(index, item);
    }

    sorted
}
