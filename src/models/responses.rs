use serde::{Deserialize, Serialize};
use crate::models::domain::{Event, Registration, UserProfile};

/// Response for the event listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub total_results: usize,
}

/// Response after joining an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub registration: Registration,
    pub warning: Option<String>,
}

/// Roster of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub participants: Vec<UserProfile>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
