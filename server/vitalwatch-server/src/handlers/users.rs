use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_path_id;
use crate::middleware::AuthContext;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::UserProfile;

/// Fetch a user profile (self or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 401, description = "Not authenticated", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Not permitted", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No such user", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user_id = parse_path_id(&id, "id")?;
    ctx.require_self_or_admin(user_id)?;

    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user.profile()))
}
