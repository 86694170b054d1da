use crate::error::{ApiError, ApiJson, ApiResult};
use crate::handlers::parse_path_id;
use crate::middleware::AuthContext;
use crate::server::AppState;
use crate::validate_range;
use crate::validation::RequestValidation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use database_layer::{FilterPeriod, NewVitalSample, VitalSample};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Manually submitted vital sample. Any client `timestamp` is ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVitalSampleRequest {
    /// Defaults to the caller
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub record_id: Option<Uuid>,
    pub heart_rate: i32,
    pub spo2: i32,
    pub systolic: i32,
    pub diastolic: i32,
    pub temperature: f64,
    #[serde(default)]
    pub respiratory_rate: Option<i32>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub pleth_waveform: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub spo2_waveform: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub respiratory_waveform: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub cvp_arterial_waveform: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub ecg_waveform: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub etco2_waveform: Option<Value>,
}

impl RequestValidation for CreateVitalSampleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_range!(self.heart_rate, "heartRate", 0, 300, "heartRate must be between 0 and 300");
        validate_range!(self.spo2, "spo2", 0, 100, "spo2 must be between 0 and 100");
        validate_range!(self.systolic, "systolic", 0, 300, "systolic must be between 0 and 300");
        validate_range!(self.diastolic, "diastolic", 0, 300, "diastolic must be between 0 and 300");
        validate_range!(
            self.temperature,
            "temperature",
            20.0,
            45.0,
            "temperature must be between 20 and 45 °C"
        );
        if let Some(rate) = self.respiratory_rate {
            validate_range!(rate, "respiratoryRate", 0, 100, "respiratoryRate must be between 0 and 100");
        }
        Ok(())
    }
}

/// Waveforms are opaque; strings are kept as-is, anything else as its JSON text
fn waveform_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl CreateVitalSampleRequest {
    fn into_new_sample(self, user_id: Uuid) -> NewVitalSample {
        NewVitalSample {
            user_id,
            record_id: self.record_id,
            heart_rate: self.heart_rate,
            spo2: self.spo2,
            systolic: self.systolic,
            diastolic: self.diastolic,
            temperature: self.temperature,
            respiratory_rate: self.respiratory_rate,
            pleth_waveform: waveform_text(self.pleth_waveform),
            spo2_waveform: waveform_text(self.spo2_waveform),
            respiratory_waveform: waveform_text(self.respiratory_waveform),
            cvp_arterial_waveform: waveform_text(self.cvp_arterial_waveform),
            ecg_waveform: waveform_text(self.ecg_waveform),
            etco2_waveform: waveform_text(self.etco2_waveform),
        }
    }
}

/// Latest sample of one user
#[utoipa::path(
    get,
    path = "/api/ecg-data/latest/{user_id}",
    tag = "vitals",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Most recent sample", body = VitalSample),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No samples", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn latest_for_user(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<VitalSample>> {
    let user_id = parse_path_id(&user_id, "userId")?;
    ctx.require_self_or_admin(user_id)?;

    state
        .store
        .get_latest_vital_sample(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Vital sample"))
}

/// Full history of one user, newest first
#[utoipa::path(
    get,
    path = "/api/ecg-data/{user_id}",
    tag = "vitals",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Samples, newest first", body = [VitalSample]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn history(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<VitalSample>>> {
    samples_for(ctx, &state, &user_id, None).await
}

/// History restricted to the current `day`, `month` or `year`
///
/// Any other period value returns the full history.
#[utoipa::path(
    get,
    path = "/api/ecg-data/{user_id}/{period}",
    tag = "vitals",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("period" = String, Path, description = "day, month or year")
    ),
    responses(
        (status = 200, description = "Samples, newest first", body = [VitalSample]),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn history_for_period(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path((user_id, period)): Path<(String, String)>,
) -> ApiResult<Json<Vec<VitalSample>>> {
    samples_for(ctx, &state, &user_id, FilterPeriod::parse(&period)).await
}

async fn samples_for(
    ctx: AuthContext,
    state: &AppState,
    user_id: &str,
    period: Option<FilterPeriod>,
) -> ApiResult<Json<Vec<VitalSample>>> {
    let user_id = parse_path_id(user_id, "userId")?;
    ctx.require_self_or_admin(user_id)?;

    Ok(Json(state.store.list_vital_samples_by_user(user_id, period).await?))
}

/// Store a manually entered sample (self or admin)
#[utoipa::path(
    post,
    path = "/api/ecg-data",
    tag = "vitals",
    request_body = CreateVitalSampleRequest,
    responses(
        (status = 201, description = "Sample stored", body = VitalSample),
        (status = 400, description = "Invalid sample or record reference", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_vital_sample(
    ctx: AuthContext,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVitalSampleRequest>,
) -> ApiResult<(StatusCode, Json<VitalSample>)> {
    let user_id = request.user_id.unwrap_or_else(|| ctx.user_id());
    ctx.require_self_or_admin(user_id)?;
    request.validate()?;

    if let Some(record_id) = request.record_id {
        let owned = state
            .store
            .get_patient_record(record_id)
            .await?
            .is_some_and(|record| record.user_id == user_id);
        if !owned {
            return Err(ApiError::field(
                "recordId",
                "recordId must reference a record of the same user",
            ));
        }
    }

    let sample = state
        .store
        .create_vital_sample(request.into_new_sample(user_id))
        .await?;

    tracing::info!(sample_id = %sample.id, user_id = %user_id, "Vital sample stored");
    Ok((StatusCode::CREATED, Json(sample)))
}

/// Most recent sample visible to the caller
///
/// Admins get the newest sample system-wide. Other callers get it only when
/// it is their own; otherwise their own latest sample is returned.
#[utoipa::path(
    get,
    path = "/api/vitals/latest",
    tag = "vitals",
    responses(
        (status = 200, description = "Most recent visible sample", body = VitalSample),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No samples", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn latest_any(ctx: AuthContext, State(state): State<AppState>) -> ApiResult<Json<VitalSample>> {
    let newest = state.store.get_latest_vital_sample_any().await?;

    let visible = match newest {
        Some(sample) if ctx.is_admin() || sample.user_id == ctx.user_id() => Some(sample),
        Some(_) => state.store.get_latest_vital_sample(ctx.user_id()).await?,
        None => None,
    };

    visible.map(Json).ok_or_else(|| ApiError::not_found("Vital sample"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn waveforms_are_stored_verbatim() {
        assert_eq!(waveform_text(Some(json!("1,2,3"))).as_deref(), Some("1,2,3"));
        assert_eq!(waveform_text(Some(json!([1, 2, 3]))).as_deref(), Some("[1,2,3]"));
        assert_eq!(waveform_text(None), None);
    }

    #[test]
    fn client_timestamp_is_ignored() {
        let request: CreateVitalSampleRequest = serde_json::from_value(json!({
            "heartRate": 72, "spo2": 98, "systolic": 120, "diastolic": 80,
            "temperature": 36.7, "timestamp": "1999-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        let sample = request.into_new_sample(Uuid::nil());
        assert_eq!(sample.heart_rate, 72);
        assert_eq!(sample.record_id, None);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let request: CreateVitalSampleRequest = serde_json::from_value(json!({
            "heartRate": 72, "spo2": 140, "systolic": 120, "diastolic": 80, "temperature": 36.7
        }))
        .unwrap();
        assert!(matches!(request.validate(), Err(ApiError::Validation { .. })));
    }
}
