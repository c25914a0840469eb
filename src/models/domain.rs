use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Scheduled volunteer activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(rename = "maxVolunteers", default = "default_max_volunteers")]
    pub max_volunteers: u32,
    #[serde(rename = "currentVolunteers", default)]
    pub current_volunteers: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "creatorId")]
    pub creator_id: String,
    #[serde(rename = "creatorName", default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub volunteers: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Event {
    /// Date combined with the start time, midnight when no time is set
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// Midnight at the start of the event day
    pub fn day_start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// Remaining capacity, negative when the event is overbooked
    pub fn free_spots(&self) -> i64 {
        i64::from(self.max_volunteers) - i64::from(self.current_volunteers)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn default_max_volunteers() -> u32 { 50 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Participant,
    Curator,
}

/// User profile as consumed by the matching core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "middleName", default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "homeCoordinate", default)]
    pub home_coordinate: Option<Coordinate>,
    #[serde(rename = "accountType", default)]
    pub account_type: AccountType,
    #[serde(rename = "registeredAt", default)]
    pub registered_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Ids of every event this user ever created, deleted ones included
    #[serde(rename = "createdEvents", default)]
    pub created_events: Vec<String>,
    /// Salted password digest, never sent to clients
    #[serde(rename = "passwordHash", default, skip_serializing)]
    pub password_hash: Option<String>,
}

impl UserProfile {
    pub fn is_interested_in(&self, tag: &str) -> bool {
        self.interests.iter().any(|i| i == tag)
    }

    /// Last, first and middle name for the roster file
    ///
    /// Falls back to splitting `full_name` ("Фамилия Имя Отчество") when the
    /// parts were never given.
    pub fn name_parts(&self) -> (String, String, String) {
        if self.last_name.is_some() || self.first_name.is_some() {
            return (
                self.last_name.clone().unwrap_or_default(),
                self.first_name.clone().unwrap_or_default(),
                self.middle_name.clone().unwrap_or_default(),
            );
        }

        let mut words = self.full_name.split_whitespace();
        let last = words.next().unwrap_or_default().to_string();
        let first = words.next().unwrap_or_default().to_string();
        let middle = words.collect::<Vec<_>>().join(" ");
        (last, first, middle)
    }
}

/// Link between a user and an event they joined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "registeredAt")]
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl Registration {
    pub fn new(event_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            user_id: user_id.into(),
            registered_at: chrono::Utc::now(),
        }
    }
}

/// Why a user may not join an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    EventAlreadyOccurred,
    NoFreeSpots,
    AlreadyRegistered,
}

impl IneligibleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IneligibleReason::EventAlreadyOccurred => "event already occurred",
            IneligibleReason::NoFreeSpots => "no free spots",
            IneligibleReason::AlreadyRegistered => "already registered",
        }
    }
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Downloadable participant list of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub content: String,
    #[serde(rename = "participantsCount")]
    pub participants_count: usize,
}

/// Outcome of the eligibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub allowed: bool,
    pub reason: Option<IneligibleReason>,
    pub warning: Option<String>,
}

impl Eligibility {
    pub fn allowed(warning: Option<String>) -> Self {
        Self { allowed: true, reason: None, warning }
    }

    pub fn denied(reason: IneligibleReason) -> Self {
        Self { allowed: false, reason: Some(reason), warning: None }
    }
}

/// Event ranked by the interest scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEvent {
    #[serde(flatten)]
    pub event: Event,
    pub score: u32,
}

/// Event picked by the quick-join selector together with its distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Kilometers from the user's home, infinite when either side is unknown
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Recommendation bundle for the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(rename = "nearestEvent")]
    pub nearest_event: Option<NearestEvent>,
    #[serde(rename = "interestEvents")]
    pub interest_events: Vec<ScoredEvent>,
    #[serde(rename = "upcomingEvents")]
    pub upcoming_events: Vec<Event>,
    #[serde(rename = "popularEvents")]
    pub popular_events: Vec<Event>,
}

/// Participation summary for a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "totalParticipations")]
    pub total_participations: usize,
    #[serde(rename = "upcomingEvents")]
    pub upcoming_events: usize,
    #[serde(rename = "completedEvents")]
    pub completed_events: usize,
    #[serde(rename = "createdEvents")]
    pub created_events: usize,
    #[serde(rename = "favoriteInterests")]
    pub favorite_interests: Vec<String>,
}

/// Platform-wide counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(rename = "totalUsers")]
    pub total_users: usize,
    #[serde(rename = "totalCurators")]
    pub total_curators: usize,
    #[serde(rename = "totalParticipants")]
    pub total_participants: usize,
    #[serde(rename = "totalEvents")]
    pub total_events: usize,
    #[serde(rename = "activeEvents")]
    pub active_events: usize,
    #[serde(rename = "totalRegistrations")]
    pub total_registrations: usize,
    #[serde(rename = "popularCities")]
    pub popular_cities: Vec<(String, usize)>,
    #[serde(rename = "popularTags")]
    pub popular_tags: Vec<(String, usize)>,
}
