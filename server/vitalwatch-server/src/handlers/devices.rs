//! Bedside device ingestion
//!
//! ESP32 firmware posts one measurement class per request using its own
//! snake_case field names. The payload is turned into a [`DeviceReading`]
//! here, then merged onto the target user's latest sample.

use crate::error::{api_success, ApiError, ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;
use auth_identity::Role;
use axum::{extract::State, http::StatusCode, Json};
use database_layer::{merge_sample, DeviceReading, VitalSample};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Raw device payload
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DevicePayload {
    pub device_id: Option<String>,
    /// `temperature` or `vitals`
    pub data_type: Option<String>,
    pub temperature: Option<f64>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<f64>,
    pub max_spo2_percent: Option<f64>,
    pub heart_rate: Option<f64>,
    pub max_heart_rate_bpm: Option<f64>,
}

/// Validated ingestion request
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSubmission {
    pub device_id: String,
    pub reading: DeviceReading,
}

/// Round a sensor value to a whole number within `[min, max]`
fn whole_reading(value: f64, field: &str, min: i32, max: i32) -> Result<i32, ApiError> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < f64::from(min) || rounded > f64::from(max) {
        return Err(ApiError::field(
            field,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = rounded as i32;
    Ok(whole)
}

impl TryFrom<DevicePayload> for DeviceSubmission {
    type Error = ApiError;

    fn try_from(payload: DevicePayload) -> Result<Self, Self::Error> {
        let device_id = payload
            .device_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::field("device_id", "device_id is required"))?;

        let data_type = payload
            .data_type
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::field("data_type", "data_type is required"))?;

        let reading = match data_type.as_str() {
            "temperature" => {
                let celsius = payload
                    .temperature
                    .or(payload.temperature_c)
                    .ok_or_else(|| ApiError::field("temperature", "temperature is required"))?;
                if !celsius.is_finite() || !(20.0..=45.0).contains(&celsius) {
                    return Err(ApiError::field(
                        "temperature",
                        "temperature must be between 20 and 45 °C",
                    ));
                }
                DeviceReading::Temperature { celsius }
            }
            "vitals" => {
                let spo2 = payload
                    .spo2
                    .or(payload.max_spo2_percent)
                    .map(|v| whole_reading(v, "spo2", 0, 100))
                    .transpose()?;
                let heart_rate = payload
                    .heart_rate
                    .or(payload.max_heart_rate_bpm)
                    .map(|v| whole_reading(v, "heart_rate", 0, 300))
                    .transpose()?;
                if spo2.is_none() && heart_rate.is_none() {
                    return Err(ApiError::validation(
                        "vitals readings need spo2 or heart_rate",
                    ));
                }
                DeviceReading::Vitals { spo2, heart_rate }
            }
            other => {
                return Err(ApiError::field(
                    "data_type",
                    format!("unsupported data_type '{other}'"),
                ))
            }
        };

        Ok(DeviceSubmission { device_id, reading })
    }
}

/// Resolve which user a device reports for
async fn resolve_target_user(state: &AppState, device_id: &str) -> ApiResult<Uuid> {
    if let Some(binding) = state.store.get_device_binding(device_id).await? {
        return Ok(binding.user_id);
    }

    let users = state.store.list_users().await?;
    let fallback = users
        .iter()
        .find(|u| u.role == Role::Patient)
        .or_else(|| users.first())
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::warn!(
        device_id = %device_id,
        user_id = %fallback.id,
        "Unbound device; falling back to the first registered patient"
    );
    Ok(fallback.id)
}

/// Ingest a device reading (no authentication)
#[utoipa::path(
    post,
    path = "/api/vitals",
    tag = "devices",
    request_body = DevicePayload,
    responses(
        (status = 201, description = "Merged sample stored", body = ApiResponse<VitalSample>),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No user to attribute the reading to", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn ingest_reading(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DevicePayload>,
) -> ApiResult<(StatusCode, Json<ApiResponse<VitalSample>>)> {
    let submission = DeviceSubmission::try_from(payload)?;
    let user_id = resolve_target_user(&state, &submission.device_id).await?;

    let previous = state.store.get_latest_vital_sample(user_id).await?;
    let next = merge_sample(previous.as_ref(), &submission.reading, user_id);
    let sample = state.store.create_vital_sample(next).await?;

    tracing::info!(
        device_id = %submission.device_id,
        user_id = %user_id,
        sample_id = %sample.id,
        "Device reading ingested"
    );

    Ok((StatusCode::CREATED, Json(api_success(sample))))
}
