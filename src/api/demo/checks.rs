use axum::{
    Json,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::api::{ApiError, ApiResponse, JsonBody, MessageResponse};

fn employee_email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.\-]+@[\w.\-]+\.\w+$").expect("Invalid regex"))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl Employee {
    fn validate(&self) -> Result<(), ApiError> {
        if !(3..=50).contains(&self.name.chars().count()) {
            return Err(ApiError::validation(
                "name must be between 3 and 50 characters",
            ));
        }
        if !(18..=65).contains(&self.age) {
            return Err(ApiError::validation("age must be between 18 and 65"));
        }
        if !employee_email_regex().is_match(&self.email) {
            return Err(ApiError::validation("email is not a valid address"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl Event {
    fn validate(&self) -> Result<(), ApiError> {
        let parse = |field: &str, value: &str| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| ApiError::validation(format!("{field} must be a YYYY-MM-DD date")))
        };

        let start = parse("start_date", &self.start_date)?;
        let end = parse("end_date", &self.end_date)?;
        if end < start {
            return Err(ApiError::validation("end_date must be after start_date"));
        }
        Ok(())
    }
}

/// `price` is a strict integer: `"100"` and `100.5` are both rejected by
/// the JSON extractor before the handler runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: i64,
}

/// POST /demo/employees
pub async fn create_employee(
    JsonBody(employee): JsonBody<Employee>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    employee.validate()?;
    Ok(Json(ApiResponse::success(employee)))
}

/// POST /demo/events
pub async fn create_event(
    JsonBody(event): JsonBody<Event>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    event.validate()?;
    Ok(Json(ApiResponse::success(event)))
}

/// POST /demo/products
pub async fn create_product(JsonBody(product): JsonBody<Product>) -> Json<ApiResponse<Product>> {
    Json(ApiResponse::success(product))
}

// ============================================================================
// Extractor-based injection
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserParams {
    name: String,
    gender: String,
}

/// Resolved from the `name` and `gender` query parameters, both required.
pub struct RequestUser {
    pub name: String,
    pub gender: String,
}

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<UserParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;

        Ok(Self {
            name: params.name,
            gender: params.gender,
        })
    }
}

/// Same inputs as [`RequestUser`], rejected when the name is blank.
pub struct CheckedUser(pub RequestUser);

impl<S> FromRequestParts<S> for CheckedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = RequestUser::from_request_parts(parts, state).await?;
        if user.name.trim().is_empty() {
            return Err(ApiError::validation("Name is required"));
        }
        Ok(Self(user))
    }
}

#[derive(Debug, Serialize)]
pub struct UserValidity {
    pub name: String,
    pub valid: bool,
}

/// GET /demo/user
pub async fn user(user: RequestUser) -> Json<ApiResponse<UserValidity>> {
    tracing::debug!(gender = %user.gender, "Resolved request user");
    Json(ApiResponse::success(UserValidity {
        name: user.name,
        valid: true,
    }))
}

/// GET /demo/user/check
pub async fn check_user(CheckedUser(user): CheckedUser) -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::success(MessageResponse::new(format!(
        "User {} passed the check",
        user.name
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, age: i64, email: &str) -> Employee {
        Employee {
            name: name.to_string(),
            age,
            email: email.to_string(),
        }
    }

    #[test]
    fn test_employee_rules() {
        assert!(employee("John Doe", 30, "john@example.com").validate().is_ok());
        assert!(employee("Jo", 30, "john@example.com").validate().is_err());
        assert!(employee("John Doe", 17, "john@example.com").validate().is_err());
        assert!(employee("John Doe", 66, "john@example.com").validate().is_err());
        assert!(employee("John Doe", 30, "john.example.com").validate().is_err());
    }

    #[test]
    fn test_event_dates() {
        let event = |start: &str, end: &str| Event {
            name: "launch".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
        };

        assert!(event("2025-03-01", "2025-03-01").validate().is_ok());
        assert!(event("2025-03-01", "2025-03-05").validate().is_ok());
        assert!(event("2025-03-05", "2025-03-01").validate().is_err());
        assert!(event("March 1st", "2025-03-01").validate().is_err());
    }
}
