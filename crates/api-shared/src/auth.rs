/// Failure to authorise an admin request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing x-api-key header")]
    Missing,
    #[error("invalid API key")]
    Invalid,
}

/// Name of the header carrying the admin API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validates the provided API key against the configured admin key.
///
/// When no key is configured the endpoint is open and every request passes.
pub fn validate_api_key(expected: Option<&str>, provided: Option<&str>) -> Result<(), AuthError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match provided {
        None => Err(AuthError::Missing),
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(AuthError::Invalid),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
