// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AccountType, Coordinate, Eligibility, Event, IneligibleReason, NearestEvent, Recommendations,
    Registration, RosterFile, ScoredEvent, SystemStats, UserProfile, UserStats,
};
pub use requests::{
    CreateEventRequest, InterestQuery, LoginRequest, RegisterUserRequest, UpdateUserRequest,
    UserActionRequest, UserQuery,
};
pub use responses::{ErrorResponse, EventsResponse, HealthResponse, JoinResponse, ParticipantsResponse};
