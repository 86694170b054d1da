use crate::error::{ApiError, ApiJson, ApiResult};
use crate::middleware::AdminContext;
use crate::server::AppState;
use crate::validation::RequestValidation;
use crate::validate_required;
use axum::{extract::State, http::StatusCode, Json};
use database_layer::{DeviceBinding, PatientRecord, UserProfile, VitalSample};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Bind a device to the user it reports for
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindDeviceRequest {
    pub device_id: String,
    pub user_id: Uuid,
}

impl RequestValidation for BindDeviceRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.device_id, "deviceId", "deviceId is required");
        Ok(())
    }
}

/// All users in registration order
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users", body = [UserProfile]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(_admin: AdminContext, State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// Every vital sample, newest first
#[utoipa::path(
    get,
    path = "/api/admin/ecg-data",
    tag = "admin",
    responses(
        (status = 200, description = "All samples", body = [VitalSample]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_vital_samples(
    _admin: AdminContext,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VitalSample>>> {
    Ok(Json(state.store.list_all_vital_samples().await?))
}

/// Every patient record, newest first
#[utoipa::path(
    get,
    path = "/api/admin/records",
    tag = "admin",
    responses(
        (status = 200, description = "All records", body = [PatientRecord]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_records(
    _admin: AdminContext,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PatientRecord>>> {
    Ok(Json(state.store.list_all_records().await?))
}

/// Current device bindings
#[utoipa::path(
    get,
    path = "/api/admin/devices",
    tag = "admin",
    responses(
        (status = 200, description = "Device bindings", body = [DeviceBinding]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_devices(
    _admin: AdminContext,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DeviceBinding>>> {
    Ok(Json(state.store.list_device_bindings().await?))
}

/// Bind a device to a user, replacing any previous binding
#[utoipa::path(
    post,
    path = "/api/admin/devices",
    tag = "admin",
    request_body = BindDeviceRequest,
    responses(
        (status = 201, description = "Device bound", body = DeviceBinding),
        (status = 400, description = "Invalid body", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No such user", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn bind_device(
    AdminContext(admin): AdminContext,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BindDeviceRequest>,
) -> ApiResult<(StatusCode, Json<DeviceBinding>)> {
    request.validate()?;

    if state.store.get_user_by_id(request.user_id).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let binding = state
        .store
        .bind_device(request.device_id.trim(), request.user_id)
        .await?;

    tracing::info!(
        device_id = %binding.device_id,
        user_id = %binding.user_id,
        admin_id = %admin.user_id(),
        "Device bound"
    );

    Ok((StatusCode::CREATED, Json(binding)))
}
