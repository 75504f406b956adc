//! Field-level validation shared by the HTTP handlers, the CLI and the
//! service layer.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::limits;
use crate::models::user::{NewUser, UserChanges};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("Invalid regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len < min {
        return Err(FieldError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(FieldError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    check_length(
        "username",
        username,
        limits::USERNAME_MIN,
        limits::USERNAME_MAX,
    )?;

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(FieldError::new(
            "username",
            "can only contain letters, numbers, dots, hyphens, and underscores",
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if !email_regex().is_match(email) {
        return Err(FieldError::new("email", "is not a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    check_length(
        "password",
        password,
        limits::PASSWORD_MIN,
        limits::PASSWORD_MAX,
    )
}

pub fn validate_full_name(full_name: &str) -> Result<(), FieldError> {
    check_length("full_name", full_name, 0, limits::FULL_NAME_MAX)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims and lowercases in place, then validates every field.
pub fn prepare_new_user(user: &mut NewUser) -> Result<(), FieldError> {
    user.username = user.username.trim().to_string();
    user.email = normalize_email(&user.email);
    user.full_name = user
        .full_name
        .take()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    validate_username(&user.username)?;
    validate_email(&user.email)?;
    validate_password(&user.password)?;
    if let Some(name) = &user.full_name {
        validate_full_name(name)?;
    }
    Ok(())
}

/// Same as [`prepare_new_user`] for the fields present in a partial update.
pub fn prepare_changes(changes: &mut UserChanges) -> Result<(), FieldError> {
    if let Some(username) = changes.username.as_mut() {
        *username = username.trim().to_string();
        validate_username(username)?;
    }
    if let Some(email) = changes.email.as_mut() {
        *email = normalize_email(email);
        validate_email(email)?;
    }
    if let Some(password) = &changes.password {
        validate_password(password)?;
    }
    if let Some(name) = changes.full_name.as_mut() {
        *name = name.trim().to_string();
        validate_full_name(name)?;
    }
    Ok(())
}
