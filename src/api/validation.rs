use super::ApiError;
use crate::constants::limits::{MAX_PAGE_SIZE, MAX_SKIP};

pub fn validate_user_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Offsets are bound as signed 64-bit integers by the database driver.
pub fn validate_skip(skip: u64) -> Result<u64, ApiError> {
    if skip > MAX_SKIP {
        return Err(ApiError::validation(format!(
            "Invalid skip: {skip}. Skip must be at most {MAX_SKIP}"
        )));
    }
    Ok(skip)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(limit)
}

/// Blank search terms mean "no filter".
pub fn validate_search_query(query: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(query) = query else {
        return Ok(None);
    };

    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation(
            "Search query must be 100 characters or less",
        ));
    }
    Ok(Some(trimmed.to_string()))
}
