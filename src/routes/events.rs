use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use validator::Validate;

use crate::core::{build_recommendations, can_join, find_nearest};
use crate::models::{
    CreateEventRequest, ErrorResponse, Event, EventsResponse, HealthResponse, InterestQuery,
    JoinResponse, LoginRequest, ParticipantsResponse, RegisterUserRequest, Registration,
    UpdateUserRequest, UserActionRequest, UserProfile, UserQuery,
};
use crate::services::{
    EventStore, GeocodeError, InMemoryStore, LocationResolver, NewEvent, NewUser, PlaceQuery,
    StoreError, UserUpdate,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub locations: Arc<LocationResolver>,
}

impl AppState {
    fn read_store(&self) -> RwLockReadGuard<'_, InMemoryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, InMemoryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configure all event-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/events", web::get().to(list_events))
        .route("/events", web::post().to(create_event))
        .route("/events/nearest", web::post().to(nearest_event))
        .route("/events/{id}", web::delete().to(delete_event))
        .route("/events/{id}/participants", web::get().to(get_participants))
        .route("/events/{id}/participants/file", web::get().to(get_roster_file))
        .route("/events/{id}/eligibility", web::post().to(check_eligibility))
        .route("/events/{id}/join", web::post().to(join_event))
        .route("/events/{id}/leave", web::post().to(leave_event))
        .route("/recommendations", web::post().to(recommendations))
        .route("/auth/login", web::post().to(login))
        .route("/users", web::post().to(register_user))
        .route("/users", web::get().to(users_by_interest))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::patch().to(update_user))
        .route("/users/{id}/stats", web::get().to(user_stats))
        .route("/locations/resolve", web::post().to(resolve_location))
        .route("/stats", web::get().to(system_stats));
}

/// Local wall-clock time, the reference point for every date comparison
fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Validation failed",
        errors.to_string(),
    )
}

fn store_error(err: StoreError) -> HttpResponse {
    use actix_web::http::StatusCode;

    let (status, error) = match &err {
        StoreError::UserNotFound(_) => (StatusCode::NOT_FOUND, "User not found"),
        StoreError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
        StoreError::EventNotFound(_) => (StatusCode::NOT_FOUND, "Event not found"),
        StoreError::DuplicateUser { .. } => (StatusCode::CONFLICT, "Duplicate user"),
        StoreError::DuplicateEvent { .. } => (StatusCode::CONFLICT, "Duplicate event"),
        StoreError::Ineligible(_) => (StatusCode::CONFLICT, "Cannot join event"),
        StoreError::NotRegistered { .. } => (StatusCode::CONFLICT, "Not registered"),
        StoreError::CreatorCannotLeave | StoreError::NotCreator => {
            (StatusCode::FORBIDDEN, "Forbidden")
        }
        StoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
    };

    error_response(status, error, err.to_string())
}

/// Fresh snapshot of everything the matching core needs for one user
///
/// Resolves the user's home city first so the snapshot carries a coordinate
/// whenever one can be found.
async fn user_snapshot(
    state: &AppState,
    user_id: &str,
) -> Result<(Vec<Event>, UserProfile, Vec<Registration>), HttpResponse> {
    state.locations.ensure_home_coordinate(&state.store, user_id).await;

    let store = state.read_store();
    let user = store
        .get_user(user_id)
        .cloned()
        .ok_or_else(|| store_error(StoreError::UserNotFound(user_id.to_string())))?;

    Ok((store.list_events(), user, store.list_registrations(user_id)))
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
struct EventFilter {
    tag: Option<String>,
}

/// List events
///
/// GET /api/v1/events?tag={tag}
async fn list_events(state: web::Data<AppState>, query: web::Query<EventFilter>) -> impl Responder {
    let store = state.read_store();
    let events = match &query.tag {
        Some(tag) => store.events_by_tag(tag),
        None => store.list_events(),
    };

    HttpResponse::Ok().json(EventsResponse {
        total_results: events.len(),
        events,
    })
}

/// Create event endpoint
///
/// POST /api/v1/events
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "title": "string",
///   "date": "2024-06-01",
///   "time": "10:00:00",
///   "location": { "lat": 55.75, "lng": 37.61 },
///   "maxVolunteers": 20,
///   "tags": ["мусор"]
/// }
/// ```
async fn create_event(
    state: web::Data<AppState>,
    req: web::Json<CreateEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let req = req.into_inner();
    let new_event = NewEvent {
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        location: req.location,
        max_volunteers: req.max_volunteers,
        tags: req.tags,
    };

    match state.write_store().create_event(new_event, &req.user_id) {
        Ok(event) => HttpResponse::Created().json(event),
        Err(e) => {
            tracing::info!("Event creation by {} rejected: {}", req.user_id, e);
            store_error(e)
        }
    }
}

/// Delete event endpoint
///
/// DELETE /api/v1/events/{id}?userId={userId}
async fn delete_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state.write_store().delete_event(&path, &query.user_id) {
        Ok(event) => HttpResponse::Ok().json(event),
        Err(e) => store_error(e),
    }
}

/// Event roster
///
/// GET /api/v1/events/{id}/participants
async fn get_participants(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let event_id = path.into_inner();
    match state.read_store().participants(&event_id) {
        Ok(participants) => HttpResponse::Ok().json(ParticipantsResponse {
            count: participants.len(),
            event_id,
            participants,
        }),
        Err(e) => store_error(e),
    }
}

/// Roster file download
///
/// GET /api/v1/events/{id}/participants/file
async fn get_roster_file(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.read_store().roster_file(&path) {
        Ok(roster) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .insert_header((
                actix_web::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", roster.file_name),
            ))
            .body(roster.content),
        Err(e) => store_error(e),
    }
}

/// Check whether a user may join an event without joining it
///
/// POST /api/v1/events/{id}/eligibility
async fn check_eligibility(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let (events, user, registrations) = match user_snapshot(&state, &req.user_id).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    match events.iter().find(|e| e.id == *path) {
        Some(event) => HttpResponse::Ok().json(can_join(event, &user, &registrations, now())),
        None => store_error(StoreError::EventNotFound(path.into_inner())),
    }
}

/// Join event endpoint
///
/// POST /api/v1/events/{id}/join
async fn join_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    state
        .locations
        .ensure_home_coordinate(&state.store, &req.user_id)
        .await;

    let result = state.write_store().join_event(&path, &req.user_id, now());
    match result {
        Ok((registration, warning)) => {
            if let Some(warning) = &warning {
                tracing::debug!("Join warning for {}: {}", req.user_id, warning);
            }
            HttpResponse::Ok().json(JoinResponse { registration, warning })
        }
        Err(e) => store_error(e),
    }
}

/// Leave event endpoint
///
/// POST /api/v1/events/{id}/leave
async fn leave_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.write_store().leave_event(&path, &req.user_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => store_error(e),
    }
}

/// Quick join: find the nearest eligible event
///
/// POST /api/v1/events/nearest
///
/// Responds with `null` when no event is eligible.
async fn nearest_event(
    state: web::Data<AppState>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let (events, user, registrations) = match user_snapshot(&state, &req.user_id).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let nearest = find_nearest(&events, &user, &registrations, now());
    if nearest.is_none() {
        tracing::info!("No eligible events for quick join by {}", req.user_id);
    }

    HttpResponse::Ok().json(nearest)
}

/// Recommendation bundle endpoint
///
/// POST /api/v1/recommendations
async fn recommendations(
    state: web::Data<AppState>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let (events, user, registrations) = match user_snapshot(&state, &req.user_id).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    tracing::info!("Building recommendations for {} over {} events", user.id, events.len());

    HttpResponse::Ok().json(build_recommendations(&events, &user, &registrations, now()))
}

/// Register user endpoint
///
/// POST /api/v1/users
async fn register_user(
    state: web::Data<AppState>,
    req: web::Json<RegisterUserRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let req = req.into_inner();
    let new_user = NewUser {
        full_name: req.full_name,
        last_name: req.last_name,
        first_name: req.first_name,
        middle_name: req.middle_name,
        password: req.password,
        email: req.email,
        phone: req.phone,
        city: req.city,
        interests: req.interests,
        account_type: req.account_type,
    };

    let result = state.write_store().register_user(new_user);
    match result {
        Ok(user) => {
            let user_id = user.id.clone();
            let home = state
                .locations
                .ensure_home_coordinate(&state.store, &user_id)
                .await;
            HttpResponse::Created().json(UserProfile {
                home_coordinate: home,
                ..user
            })
        }
        Err(e) => store_error(e),
    }
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let result = state.read_store().login(&req.email, &req.password);
    match result {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => {
            tracing::info!("Login rejected for {}: {}", req.email, e);
            store_error(e)
        }
    }
}

/// Users sharing an interest
///
/// GET /api/v1/users?interest={tag}
async fn users_by_interest(state: web::Data<AppState>, query: web::Query<InterestQuery>) -> impl Responder {
    HttpResponse::Ok().json(state.read_store().users_by_interest(&query.interest))
}

/// GET /api/v1/users/{id}
async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.read_store().get_user(&path) {
        Some(user) => HttpResponse::Ok().json(user),
        None => store_error(StoreError::UserNotFound(path.into_inner())),
    }
}

/// Update a profile; a new city is resolved right away
///
/// PATCH /api/v1/users/{id}
async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateUserRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let user_id = path.into_inner();
    let req = req.into_inner();
    let update = UserUpdate {
        full_name: req.full_name,
        last_name: req.last_name,
        first_name: req.first_name,
        middle_name: req.middle_name,
        email: req.email,
        phone: req.phone,
        city: req.city,
        interests: req.interests,
    };

    let result = state.write_store().update_user(&user_id, update);
    match result {
        Ok(user) => {
            let home = state
                .locations
                .ensure_home_coordinate(&state.store, &user_id)
                .await;
            HttpResponse::Ok().json(UserProfile {
                home_coordinate: home,
                ..user
            })
        }
        Err(e) => store_error(e),
    }
}

/// Participation summary for one user
///
/// GET /api/v1/users/{id}/stats
async fn user_stats(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.read_store().user_stats(&path, now()) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => store_error(e),
    }
}

/// Platform-wide counters
///
/// GET /api/v1/stats
async fn system_stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.read_store().system_stats(now()))
}

/// Resolve a place name or map click to a coordinate
///
/// POST /api/v1/locations/resolve
async fn resolve_location(
    state: web::Data<AppState>,
    req: web::Json<PlaceQuery>,
) -> impl Responder {
    match state.locations.resolve_place(&req).await {
        Ok(coordinate) => HttpResponse::Ok().json(coordinate),
        Err(GeocodeError::NotFound { query }) => error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Location not found",
            format!("No coordinates found for '{}'", query),
        ),
        Err(e) => {
            tracing::error!("Geocoding failed: {}", e);
            error_response(
                actix_web::http::StatusCode::BAD_GATEWAY,
                "Geocoding failed",
                e.to_string(),
            )
        }
    }
}
