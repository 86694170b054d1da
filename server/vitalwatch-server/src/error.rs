use auth_identity::{AccessDenied, IdentityError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use database_layer::DatabaseError;
use error_common::codes;
use insight_service::InsightError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Show internal error detail in response bodies (development only)
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::Relaxed);
}

const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type
    pub error_type: String,
    /// Stable machine-readable code
    pub code: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("{message}")]
    ServiceUnavailable { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Validation error tied to a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::DuplicateEmail => "duplicate_email",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthenticated { .. } => "unauthenticated",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::NotFound { .. } => "not_found",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::DuplicateEmail => codes::validation::DUPLICATE_EMAIL,
            ApiError::InvalidCredentials => codes::authentication::INVALID_CREDENTIALS,
            ApiError::Unauthenticated { .. } => codes::authentication::MISSING_TOKEN,
            ApiError::InvalidToken => codes::authentication::TOKEN_INVALID,
            ApiError::Forbidden { .. } => codes::authorization::ACCESS_DENIED,
            ApiError::NotFound { .. } => codes::resource::NOT_FOUND,
            ApiError::ServiceUnavailable { .. } => codes::system::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => codes::system::INTERNAL,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Internal { .. } if !EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) => {
                GENERIC_INTERNAL_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = self.error_type(),
                status_code = status_code.as_u16(),
                error = %logger_redacted::redact(&self.to_string()),
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = self.error_type(),
                status_code = status_code.as_u16(),
                error = %logger_redacted::redact(&self.to_string()),
                "Request rejected"
            );
        }

        let message = self.public_message();
        let error_response = ApiErrorResponse {
            message,
            error_id,
            error_type: self.error_type().to_string(),
            code: self.code().to_string(),
            timestamp: chrono::Utc::now(),
            field_errors: match self {
                ApiError::Validation { field_errors, .. } => field_errors,
                _ => None,
            },
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateEmail(_) => ApiError::DuplicateEmail,
            DatabaseError::MissingReference(what) => {
                ApiError::validation(format!("Referenced {what} does not exist"))
            }
            DatabaseError::ConnectionFailed(msg) => {
                ApiError::service_unavailable(format!("Data store unavailable: {msg}"))
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken => ApiError::InvalidToken,
            IdentityError::WeakPassword(reason) => ApiError::field("password", reason),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        ApiError::forbidden(format!("Access denied: {}", err.reason))
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        if err.is_timeout() {
            ApiError::service_unavailable("AI analysis timed out")
        } else {
            tracing::debug!(error = %err, "Insight provider failure");
            ApiError::service_unavailable("AI analysis service is unavailable")
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejections render as [`ApiError::Validation`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
