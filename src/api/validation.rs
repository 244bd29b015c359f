use super::ApiError;

pub fn validate_user_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_post_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid post ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

/// A missing `q` and a blank one are the same error. A usable query is
/// returned untouched, surrounding whitespace included.
pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    match query {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ApiError::validation("Missing search query")),
    }
}
