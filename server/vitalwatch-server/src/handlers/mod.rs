pub mod admin;
pub mod analysis;
pub mod auth;
pub mod devices;
pub mod health;
pub mod records;
pub mod users;
pub mod vitals;

use crate::error::ApiError;
use uuid::Uuid;

/// Parse a user id taken from the URL path
pub(crate) fn parse_path_id(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::field(field, format!("'{raw}' is not a valid id")))
}
