use chrono::NaiveDateTime;

use crate::core::distance::distance;
use crate::models::{Eligibility, Event, IneligibleReason, Registration, UserProfile};

/// Distance beyond which joining is still allowed but flagged to the user
pub const FAR_EVENT_WARNING_KM: f64 = 100.0;

/// Check whether the user already holds a registration for the event
#[inline]
pub fn is_registered(event_id: &str, user_id: &str, registrations: &[Registration]) -> bool {
    registrations
        .iter()
        .any(|reg| reg.event_id == event_id && reg.user_id == user_id)
}

/// Decide whether a user may join an event right now
///
/// An existing registration is reported first, whatever the date or
/// capacity. Otherwise the checks run in order and stop at the first failure:
/// 1. the event must start strictly after `now`
/// 2. at least one spot must be free
///
/// When all pass and the event is more than 100 km from the user's home,
/// an advisory warning is attached. It never blocks joining.
pub fn can_join(
    event: &Event,
    user: &UserProfile,
    registrations: &[Registration],
    now: NaiveDateTime,
) -> Eligibility {
    if is_registered(&event.id, &user.id, registrations) {
        return Eligibility::denied(IneligibleReason::AlreadyRegistered);
    }

    if event.starts_at() <= now {
        return Eligibility::denied(IneligibleReason::EventAlreadyOccurred);
    }

    if event.free_spots() <= 0 {
        return Eligibility::denied(IneligibleReason::NoFreeSpots);
    }

    let distance_km = distance(user.home_coordinate.as_ref(), event.location.as_ref());
    let warning = (distance_km.is_finite() && distance_km > FAR_EVENT_WARNING_KM)
        .then(|| format!("event is far from you ({} km)", distance_km.round()));

    Eligibility::allowed(warning)
}

/// Events that have not started on their day yet and the user has not joined
///
/// Compares against midnight of the event day, so an event later today
/// is no longer considered upcoming.
pub fn is_upcoming_for(
    event: &Event,
    user: &UserProfile,
    registrations: &[Registration],
    now: NaiveDateTime,
) -> bool {
    event.day_start() > now && !is_registered(&event.id, &user.id, registrations)
}
