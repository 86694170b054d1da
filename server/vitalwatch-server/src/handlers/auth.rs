use crate::error::{ApiError, ApiJson, ApiResult};
use crate::server::AppState;
use crate::validation::{is_valid_phone, normalize_email, RequestValidation};
use crate::{validate_email, validate_field, validate_required};
use auth_identity::{validate_password_strength, Role};
use axum::{extract::State, http::StatusCode, Json};
use database_layer::{BloodGroup, NewUser, NewVitalSample, UserProfile};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Registration request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "email": "asha@example.com",
    "phone": "9876543210",
    "password": "Str0ng!pass",
    "name": "Asha",
    "bloodGroup": "O+",
    "gender": "female"
}))]
pub struct RegisterRequest {
    pub email: String,
    /// Exactly ten digits
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    /// Required when `bloodGroup` is `Others`
    #[serde(default)]
    pub custom_blood_group: Option<String>,
    #[serde(default)]
    pub gender: String,
    /// Defaults to `patient`
    #[serde(default)]
    pub role: Option<Role>,
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "email", "Email is required");
        validate_email!(self.email.trim(), "email", "Invalid email format");
        validate_field!(
            "phone",
            is_valid_phone(&self.phone),
            "Phone number must be exactly 10 digits"
        );
        validate_password_strength(&self.password)?;
        if self.blood_group == BloodGroup::Others {
            validate_field!(
                "customBloodGroup",
                self.custom_blood_group
                    .as_deref()
                    .is_some_and(|g| !g.trim().is_empty()),
                "customBloodGroup is required when bloodGroup is Others"
            );
        }
        Ok(())
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// When supplied it must match the account's role
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
    pub user: UserProfile,
}

/// Synthetic resting vitals stored for a new patient
fn baseline_sample(user_id: Uuid) -> NewVitalSample {
    let mut rng = rand::thread_rng();
    NewVitalSample {
        user_id,
        heart_rate: rng.gen_range(60..80),
        spo2: rng.gen_range(95..100),
        systolic: rng.gen_range(110..130),
        diastolic: rng.gen_range(70..85),
        temperature: f64::from(rng.gen_range(365..=380)) / 10.0,
        respiratory_rate: Some(rng.gen_range(16..24)),
        ..Default::default()
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Validation failure or duplicate email", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    request.validate()?;

    let email = normalize_email(&request.email);
    if state.store.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = state.passwords.hash(&request.password).await?;
    let custom_blood_group = match request.blood_group {
        BloodGroup::Others => request.custom_blood_group.map(|g| g.trim().to_string()),
        _ => None,
    };

    let user = state
        .store
        .create_user(NewUser {
            email,
            phone: request.phone,
            password_hash,
            name: request.name.filter(|n| !n.trim().is_empty()),
            blood_group: request.blood_group,
            custom_blood_group,
            gender: request.gender.trim().to_string(),
            role: request.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    if user.role == Role::Patient {
        if let Err(e) = state.store.create_vital_sample(baseline_sample(user.id)).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to seed baseline vital sample");
        }
    }

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Malformed request", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&request.email);

    let Some(user) = state.store.get_user_by_email(&email).await? else {
        state.passwords.verify_dummy(&request.password).await;
        return Err(ApiError::InvalidCredentials);
    };

    let password_ok = state.passwords.verify(&request.password, &user.password_hash).await;
    let role_ok = !matches!(request.role, Some(role) if role != user.role);
    if !password_ok || !role_ok {
        tracing::info!(user_id = %user.id, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;
    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        role: user.role,
        user: user.profile(),
    }))
}
