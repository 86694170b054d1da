use crate::error::{ApiError, ApiJson, ApiResult};
use crate::handlers::parse_path_id;
use crate::middleware::{AdminContext, AuthContext};
use crate::server::AppState;
use crate::validation::RequestValidation;
use crate::validate_required;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use database_layer::{NewPatientRecord, PatientRecord};
use serde::Deserialize;
use utoipa::ToSchema;

/// Clinical note written by an admin
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub notes: String,
    /// Required; absent and blank are rejected alike
    #[serde(default)]
    pub diagnosis: String,
    /// Defaults to the time of creation
    #[serde(default)]
    pub record_date: Option<DateTime<Utc>>,
}

impl RequestValidation for CreateRecordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.diagnosis, "diagnosis", "Diagnosis is required");
        Ok(())
    }
}

/// List a patient's records, newest first
#[utoipa::path(
    get,
    path = "/api/patients/{user_id}/records",
    tag = "records",
    params(("user_id" = String, Path, description = "Patient user id")),
    responses(
        (status = 200, description = "Records, newest first", body = [PatientRecord]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_patient_records(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<PatientRecord>>> {
    let user_id = parse_path_id(&user_id, "userId")?;
    ctx.require_self_or_admin(user_id)?;

    Ok(Json(state.store.list_records_by_user(user_id).await?))
}

/// Add a record for a patient (admin only)
#[utoipa::path(
    post,
    path = "/api/patients/{user_id}/records",
    tag = "records",
    params(("user_id" = String, Path, description = "Patient user id")),
    request_body = CreateRecordRequest,
    responses(
        (status = 201, description = "Record created", body = PatientRecord),
        (status = 400, description = "Invalid body or unknown user", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_patient_record(
    AdminContext(admin): AdminContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<CreateRecordRequest>,
) -> ApiResult<(StatusCode, Json<PatientRecord>)> {
    let user_id = parse_path_id(&user_id, "userId")?;
    request.validate()?;

    let record = state
        .store
        .create_patient_record(NewPatientRecord {
            user_id,
            record_date: request.record_date,
            notes: request.notes,
            diagnosis: request.diagnosis.trim().to_string(),
        })
        .await?;

    tracing::info!(
        record_id = %record.id,
        user_id = %user_id,
        admin_id = %admin.user_id(),
        "Patient record created"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> CreateRecordRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn missing_or_blank_diagnosis_is_a_field_error() {
        for body in [json!({ "notes": "follow up" }), json!({ "diagnosis": "   " })] {
            match parse(body).validate() {
                Err(ApiError::Validation { field_errors, .. }) => {
                    assert!(field_errors.unwrap().contains_key("diagnosis"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn notes_and_date_are_optional() {
        let request = parse(json!({ "diagnosis": "stable" }));
        assert!(request.validate().is_ok());
        assert!(request.notes.is_empty());
        assert!(request.record_date.is_none());
    }
}
