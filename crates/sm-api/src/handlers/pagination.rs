use crate::error::ApiError;

const MAX_OFFSET: usize = 10_000;

/// Offsets past this bound are rejected rather than silently returning
/// an empty page.
pub fn validate_offset(offset: usize) -> Result<usize, ApiError> {
    if offset > MAX_OFFSET {
        return Err(ApiError::BadRequest(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }
    Ok(offset)
}
