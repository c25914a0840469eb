use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::filters::{can_join, is_registered};
use crate::models::{
    AccountType, Coordinate, Event, IneligibleReason, Registration, RosterFile, SystemStats,
    UserProfile, UserStats,
};
use crate::services::credentials::{hash_password, verify_password};

/// Number of entries in the popular cities/tags rankings
const TOP_RANKING_SIZE: usize = 5;

/// First line of every roster file
pub const ROSTER_HEADER: &str = "Фамилия, Имя, Отчество, Телефон, Email, Дата регистрации";

/// Errors that can occur when mutating the store
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("A user with this {field} already exists")]
    DuplicateUser { field: &'static str },

    #[error("An event titled '{title}' on {date} already exists")]
    DuplicateEvent { title: String, date: NaiveDate },

    #[error("Cannot join event: {0}")]
    Ineligible(IneligibleReason),

    #[error("User {user_id} is not registered for event {event_id}")]
    NotRegistered { event_id: String, user_id: String },

    #[error("The organizer cannot leave their own event")]
    CreatorCannotLeave,

    #[error("Only the organizer can delete an event")]
    NotCreator,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Read side of the persistence store consumed by the matching core
///
/// Every call returns a fresh snapshot; callers should re-read before each
/// ranking query.
pub trait EventStore: Send + Sync {
    /// All events in insertion order
    fn list_events(&self) -> Vec<Event>;

    /// Registrations held by a user
    fn list_registrations(&self, user_id: &str) -> Vec<Registration>;

    /// Known coordinate for a city name
    fn get_home_coordinate(&self, city: &str) -> Option<Coordinate>;
}

/// Data needed to create an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<Coordinate>,
    pub max_volunteers: u32,
    pub tags: Vec<String>,
}

/// Data needed to register a user
///
/// An empty `full_name` is assembled from the name parts.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub full_name: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub interests: Vec<String>,
    pub account_type: AccountType,
}

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub interests: Option<Vec<String>>,
}

/// Single-process store, last write wins
///
/// Keeps users, events, registrations and the city coordinate table in
/// memory. Events keep their insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    users: Vec<UserProfile>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
    cities: HashMap<String, Coordinate>,
}

impl InMemoryStore {
    /// Create an empty store without any known cities
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            events: Vec::new(),
            registrations: Vec::new(),
            cities: HashMap::new(),
        }
    }

    /// Create a store seeded with the coordinates of the largest Russian cities
    pub fn with_default_cities() -> Self {
        let mut store = Self::new();
        for (city, lat, lng) in DEFAULT_CITIES {
            store.add_city_coordinates(city, Coordinate::new(*lat, *lng));
        }
        store
    }

    pub fn add_city_coordinates(&mut self, city: &str, coordinate: Coordinate) -> Coordinate {
        self.cities.insert(city.to_string(), coordinate);
        coordinate
    }

    /// Register a new user; email and phone must be unique
    pub fn register_user(&mut self, new_user: NewUser) -> Result<UserProfile, StoreError> {
        let full_name = if new_user.full_name.trim().is_empty() {
            [&new_user.last_name, &new_user.first_name, &new_user.middle_name]
                .into_iter()
                .flatten()
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            new_user.full_name.trim().to_string()
        };

        if full_name.is_empty() {
            return Err(StoreError::InvalidInput("full name must not be empty".into()));
        }

        self.check_unique_contacts(None, new_user.email.as_ref(), new_user.phone.as_ref())?;

        let home_coordinate = new_user
            .city
            .as_deref()
            .and_then(|city| self.cities.get(city).copied());

        let user = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            last_name: new_user.last_name,
            first_name: new_user.first_name,
            middle_name: new_user.middle_name,
            email: new_user.email,
            phone: new_user.phone,
            city: new_user.city,
            interests: new_user.interests,
            home_coordinate,
            account_type: new_user.account_type,
            registered_at: Some(chrono::Utc::now()),
            created_events: Vec::new(),
            password_hash: new_user.password.as_deref().map(hash_password),
        };

        tracing::debug!("Registered user {}", user.id);
        self.users.push(user.clone());
        Ok(user)
    }

    /// Match an email and password against the registered users
    pub fn login(&self, email: &str, password: &str) -> Result<UserProfile, StoreError> {
        let user = self
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))?;

        match &user.password_hash {
            Some(stored) if verify_password(password, stored) => {
                tracing::debug!("User {} logged in", user.id);
                Ok(user.clone())
            }
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    pub fn get_user(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Apply a partial profile update
    ///
    /// Changing the city drops the stored home coordinate and takes the new
    /// city's known coordinate, if any. Unknown cities are left for the
    /// location resolver.
    pub fn update_user(&mut self, user_id: &str, update: UserUpdate) -> Result<UserProfile, StoreError> {
        if self.get_user(user_id).is_none() {
            return Err(StoreError::UserNotFound(user_id.to_string()));
        }
        if matches!(&update.full_name, Some(name) if name.trim().is_empty()) {
            return Err(StoreError::InvalidInput("full name must not be empty".into()));
        }
        self.check_unique_contacts(Some(user_id), update.email.as_ref(), update.phone.as_ref())?;

        let new_home = update
            .city
            .as_deref()
            .map(|city| self.cities.get(city).copied());

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;

        if let Some(full_name) = update.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if update.last_name.is_some() {
            user.last_name = update.last_name;
        }
        if update.first_name.is_some() {
            user.first_name = update.first_name;
        }
        if update.middle_name.is_some() {
            user.middle_name = update.middle_name;
        }
        if update.email.is_some() {
            user.email = update.email;
        }
        if update.phone.is_some() {
            user.phone = update.phone;
        }
        if let Some(interests) = update.interests {
            user.interests = interests;
        }
        if let (Some(city), Some(home)) = (update.city, new_home) {
            if user.city.as_deref() != Some(city.as_str()) {
                tracing::debug!("User {} moved to {}", user_id, city);
                user.home_coordinate = home;
            }
            user.city = Some(city);
        }

        Ok(user.clone())
    }

    /// Users who declared the given interest
    pub fn users_by_interest(&self, interest: &str) -> Vec<UserProfile> {
        self.users
            .iter()
            .filter(|u| u.is_interested_in(interest))
            .cloned()
            .collect()
    }

    /// Email and phone must not belong to another user
    fn check_unique_contacts(
        &self,
        user_id: Option<&str>,
        email: Option<&String>,
        phone: Option<&String>,
    ) -> Result<(), StoreError> {
        let others = || self.users.iter().filter(move |u| Some(u.id.as_str()) != user_id);

        if let Some(email) = email {
            if others().any(|u| u.email.as_ref() == Some(email)) {
                return Err(StoreError::DuplicateUser { field: "email" });
            }
        }

        if let Some(phone) = phone {
            if others().any(|u| u.phone.as_ref() == Some(phone)) {
                return Err(StoreError::DuplicateUser { field: "phone" });
            }
        }

        Ok(())
    }

    pub fn get_event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    /// Store a resolved home coordinate on the user
    pub fn set_home_coordinate(
        &mut self,
        user_id: &str,
        coordinate: Coordinate,
    ) -> Result<(), StoreError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        user.home_coordinate = Some(coordinate);
        Ok(())
    }

    /// Create an event; the organizer becomes its first volunteer
    pub fn create_event(&mut self, new_event: NewEvent, creator_id: &str) -> Result<Event, StoreError> {
        if new_event.max_volunteers == 0 {
            return Err(StoreError::InvalidInput("maxVolunteers must be positive".into()));
        }

        let creator_name = self
            .get_user(creator_id)
            .map(|creator| creator.full_name.clone())
            .ok_or_else(|| StoreError::UserNotFound(creator_id.to_string()))?;

        if self
            .events
            .iter()
            .any(|e| e.title == new_event.title && e.date == new_event.date)
        {
            return Err(StoreError::DuplicateEvent {
                title: new_event.title,
                date: new_event.date,
            });
        }

        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: new_event.title,
            description: new_event.description,
            date: new_event.date,
            time: new_event.time,
            location: new_event.location,
            max_volunteers: new_event.max_volunteers,
            current_volunteers: 1,
            tags: new_event.tags,
            creator_id: creator_id.to_string(),
            creator_name: Some(creator_name),
            volunteers: vec![creator_id.to_string()],
            created_at: Some(chrono::Utc::now()),
        };

        self.registrations.push(Registration::new(&event.id, creator_id));
        self.events.push(event.clone());
        if let Some(creator) = self.users.iter_mut().find(|u| u.id == creator_id) {
            creator.created_events.push(event.id.clone());
        }

        tracing::info!("Event {} created by {}", event.id, creator_id);
        Ok(event)
    }

    /// Delete an event together with its registrations (organizer only)
    pub fn delete_event(&mut self, event_id: &str, user_id: &str) -> Result<Event, StoreError> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))?;

        if self.events[index].creator_id != user_id {
            return Err(StoreError::NotCreator);
        }

        self.registrations.retain(|reg| reg.event_id != event_id);
        let event = self.events.remove(index);

        tracing::info!("Event {} deleted by {}", event_id, user_id);
        Ok(event)
    }

    /// Join an event after the eligibility check passes
    ///
    /// Returns the new registration and the advisory distance warning, if any.
    pub fn join_event(
        &mut self,
        event_id: &str,
        user_id: &str,
        now: NaiveDateTime,
    ) -> Result<(Registration, Option<String>), StoreError> {
        let user = self
            .get_user(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        let index = self
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))?;

        let eligibility = can_join(&self.events[index], user, &self.registrations, now);
        if let Some(reason) = eligibility.reason {
            return Err(StoreError::Ineligible(reason));
        }

        let registration = Registration::new(event_id, user_id);
        self.registrations.push(registration.clone());

        let event = &mut self.events[index];
        event.current_volunteers += 1;
        event.volunteers.push(user_id.to_string());

        tracing::info!(
            "User {} joined event {} ({}/{})",
            user_id,
            event_id,
            event.current_volunteers,
            event.max_volunteers
        );
        Ok((registration, eligibility.warning))
    }

    /// Leave an event; the organizer cannot leave
    pub fn leave_event(&mut self, event_id: &str, user_id: &str) -> Result<(), StoreError> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))?;

        if self.events[index].creator_id == user_id {
            return Err(StoreError::CreatorCannotLeave);
        }

        let position = self
            .registrations
            .iter()
            .position(|reg| reg.event_id == event_id && reg.user_id == user_id)
            .ok_or_else(|| StoreError::NotRegistered {
                event_id: event_id.to_string(),
                user_id: user_id.to_string(),
            })?;
        self.registrations.remove(position);

        let event = &mut self.events[index];
        event.current_volunteers = event.current_volunteers.saturating_sub(1);
        event.volunteers.retain(|id| id != user_id);

        tracing::info!("User {} left event {}", user_id, event_id);
        Ok(())
    }

    /// Users registered for an event, in registration order
    pub fn participants(&self, event_id: &str) -> Result<Vec<UserProfile>, StoreError> {
        if self.get_event(event_id).is_none() {
            return Err(StoreError::EventNotFound(event_id.to_string()));
        }

        Ok(self
            .registrations
            .iter()
            .filter(|reg| reg.event_id == event_id)
            .filter_map(|reg| self.get_user(&reg.user_id).cloned())
            .collect())
    }

    /// Roster file of an event: header, then one line per registration
    ///
    /// The organizer comes first since they are registered on creation.
    pub fn roster_file(&self, event_id: &str) -> Result<RosterFile, StoreError> {
        let event = self
            .get_event(event_id)
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))?;

        let mut content = format!("{}\n", ROSTER_HEADER);
        let mut participants_count = 0;

        for reg in self.registrations.iter().filter(|reg| reg.event_id == event_id) {
            let Some(user) = self.get_user(&reg.user_id) else {
                continue;
            };
            let (last, first, middle) = user.name_parts();
            content.push_str(&format!(
                "{}, {}, {}, {}, {}, {}\n",
                last,
                first,
                middle,
                user.phone.as_deref().unwrap_or_default(),
                user.email.as_deref().unwrap_or_default(),
                reg.registered_at.with_timezone(&chrono::Local).format("%d.%m.%Y")
            ));
            participants_count += 1;
        }

        Ok(RosterFile {
            file_name: roster_file_name(event),
            content,
            participants_count,
        })
    }

    pub fn events_by_tag(&self, tag: &str) -> Vec<Event> {
        self.events.iter().filter(|e| e.has_tag(tag)).cloned().collect()
    }

    pub fn user_stats(&self, user_id: &str, now: NaiveDateTime) -> Result<UserStats, StoreError> {
        let user = self
            .get_user(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;

        let joined: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| is_registered(&e.id, user_id, &self.registrations))
            .collect();
        let upcoming = joined.iter().filter(|e| e.day_start() > now).count();

        Ok(UserStats {
            total_participations: self
                .registrations
                .iter()
                .filter(|reg| reg.user_id == user_id)
                .count(),
            upcoming_events: upcoming,
            completed_events: joined.len() - upcoming,
            created_events: user.created_events.len(),
            favorite_interests: user.interests.clone(),
        })
    }

    pub fn system_stats(&self, now: NaiveDateTime) -> SystemStats {
        let cities = top_counts(self.users.iter().filter_map(|u| u.city.as_deref()));
        let tags = top_counts(self.events.iter().flat_map(|e| e.tags.iter().map(String::as_str)));

        SystemStats {
            total_users: self.users.len(),
            total_curators: self
                .users
                .iter()
                .filter(|u| u.account_type == AccountType::Curator)
                .count(),
            total_participants: self
                .users
                .iter()
                .filter(|u| u.account_type == AccountType::Participant)
                .count(),
            total_events: self.events.len(),
            active_events: self.events.iter().filter(|e| e.day_start() >= now).count(),
            total_registrations: self.registrations.len(),
            popular_cities: cities,
            popular_tags: tags,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_default_cities()
    }
}

impl EventStore for InMemoryStore {
    fn list_events(&self) -> Vec<Event> {
        self.events.clone()
    }

    fn list_registrations(&self, user_id: &str) -> Vec<Registration> {
        self.registrations
            .iter()
            .filter(|reg| reg.user_id == user_id)
            .cloned()
            .collect()
    }

    fn get_home_coordinate(&self, city: &str) -> Option<Coordinate> {
        self.cities.get(city).copied()
    }
}

/// `event_<id>_<title>.txt` with every non-ASCII-alphanumeric title char replaced by `_`
fn roster_file_name(event: &Event) -> String {
    let title: String = event
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("event_{}_{}.txt", event.id, title)
}

/// Count occurrences, most frequent first; ties keep first-seen order
fn top_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(name, _)| name == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_RANKING_SIZE);
    counts
}

const DEFAULT_CITIES: &[(&str, f64, f64)] = &[
    ("Москва", 55.7558, 37.6173),
    ("Санкт-Петербург", 59.9343, 30.3351),
    ("Новосибирск", 55.0084, 82.9357),
    ("Екатеринбург", 56.8389, 60.6057),
    ("Казань", 55.7961, 49.1064),
    ("Нижний Новгород", 56.3269, 44.0075),
    ("Челябинск", 55.1644, 61.4368),
    ("Самара", 53.1959, 50.1002),
    ("Омск", 54.9893, 73.3682),
    ("Ростов-на-Дону", 47.2357, 39.7015),
];
