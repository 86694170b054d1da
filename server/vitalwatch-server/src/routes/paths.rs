//! Centralized API route path constants
//!
//! Runtime route definitions use these constants. utoipa `#[utoipa::path]`
//! attributes need string literals in OpenAPI form (`{id}` instead of
//! `:id`) and must be kept in sync by hand.

/// Liveness and readiness probes
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const READY: &str = "/ready";
}

/// Registration and login
pub mod auth {
    pub const REGISTER: &str = "/api/auth/register";
    pub const LOGIN: &str = "/api/auth/login";
}

pub mod users {
    pub const USER_BY_ID: &str = "/api/users/:id";
}

/// Clinical notes per patient
pub mod records {
    pub const PATIENT_RECORDS: &str = "/api/patients/:user_id/records";
}

/// Vital-sign samples
pub mod vitals {
    pub const ECG_DATA: &str = "/api/ecg-data";
    pub const ECG_LATEST: &str = "/api/ecg-data/latest/:user_id";
    pub const ECG_HISTORY: &str = "/api/ecg-data/:user_id";
    pub const ECG_HISTORY_PERIOD: &str = "/api/ecg-data/:user_id/:period";
    pub const DEVICE_INGEST: &str = "/api/vitals";
    pub const LATEST: &str = "/api/vitals/latest";
}

pub mod admin {
    pub const USERS: &str = "/api/admin/users";
    pub const ECG_DATA: &str = "/api/admin/ecg-data";
    pub const RECORDS: &str = "/api/admin/records";
    pub const DEVICES: &str = "/api/admin/devices";
}

pub mod analysis {
    pub const AI_ANALYSIS: &str = "/api/ai-analysis";
}

/// OpenAPI document and UI
pub mod docs {
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
    pub const SWAGGER_UI: &str = "/swagger-ui";
}
