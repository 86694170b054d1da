use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthContext;
use crate::server::AppState;
use axum::{body::Bytes, extract::State, Json};
use database_layer::VitalSample;
use insight_service::build_prompt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Optional analysis target; an empty body analyses the caller
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Generated text, relayed verbatim
    pub report: String,
    /// The sample the report was generated from
    pub sensor_data: VitalSample,
}

fn parse_request(body: &[u8]) -> Result<AnalysisRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AnalysisRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("Invalid JSON body: {e}")))
}

/// Generate a health summary from the latest sample
#[utoipa::path(
    post,
    path = "/api/ai-analysis",
    tag = "analysis",
    request_body(content = AnalysisRequest, description = "Optional; defaults to the caller"),
    responses(
        (status = 200, description = "Generated summary", body = AnalysisResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No user or no samples", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Generation unavailable", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn analyze(
    ctx: AuthContext,
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AnalysisResponse>> {
    let request = parse_request(&body)?;
    let user_id = request.user_id.unwrap_or_else(|| ctx.user_id());
    ctx.require_self_or_admin(user_id)?;

    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    let sample = state
        .store
        .get_latest_vital_sample(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vital sample"))?;

    let generator = state
        .insight
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("AI analysis is not configured"))?;

    let prompt = build_prompt(&user.profile(), &sample);
    let report = generator.generate(&prompt).await?;

    tracing::info!(
        user_id = %user_id,
        provider = generator.name(),
        "Health summary generated"
    );

    Ok(Json(AnalysisResponse {
        report,
        sensor_data: sample,
    }))
}
