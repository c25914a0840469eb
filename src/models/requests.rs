use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{AccountType, Coordinate};

/// Request carrying only the acting user, used by join/leave/nearest/recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request to create a new event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[validate(range(min = 1))]
    #[serde(alias = "max_volunteers", rename = "maxVolunteers")]
    pub max_volunteers: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to register a user profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[serde(default, alias = "full_name", rename = "fullName")]
    pub full_name: String,
    #[serde(default, alias = "last_name", rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(default, alias = "first_name", rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "middle_name", rename = "middleName")]
    pub middle_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, alias = "account_type", rename = "accountType")]
    pub account_type: AccountType,
}

/// Query string carrying the acting user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Email and password login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Partial profile update, absent fields stay as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    #[serde(default, alias = "full_name", rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(default, alias = "last_name", rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(default, alias = "first_name", rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "middle_name", rename = "middleName")]
    pub middle_name: Option<String>,
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

/// Query string for the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestQuery {
    pub interest: String,
}
