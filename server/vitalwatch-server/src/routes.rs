pub mod paths;

use crate::{
    handlers::{admin, analysis, auth, devices, health, records, users, vitals},
    openapi,
    server::AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Liveness and readiness probes (no authentication)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::READY, get(health::readiness_check))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::LOGIN, post(auth::login))
}

/// User profiles and patient records
pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route(paths::users::USER_BY_ID, get(users::get_user))
        .route(
            paths::records::PATIENT_RECORDS,
            get(records::list_patient_records).post(records::create_patient_record),
        )
}

/// Vital-sign history, manual submission and device ingestion
pub fn vitals_routes() -> Router<AppState> {
    Router::new()
        .route(paths::vitals::ECG_DATA, post(vitals::create_vital_sample))
        .route(paths::vitals::ECG_LATEST, get(vitals::latest_for_user))
        .route(paths::vitals::ECG_HISTORY, get(vitals::history))
        .route(paths::vitals::ECG_HISTORY_PERIOD, get(vitals::history_for_period))
        .route(paths::vitals::DEVICE_INGEST, post(devices::ingest_reading))
        .route(paths::vitals::LATEST, get(vitals::latest_any))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(paths::admin::USERS, get(admin::list_users))
        .route(paths::admin::ECG_DATA, get(admin::list_vital_samples))
        .route(paths::admin::RECORDS, get(admin::list_records))
        .route(
            paths::admin::DEVICES,
            get(admin::list_devices).post(admin::bind_device),
        )
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route(paths::analysis::AI_ANALYSIS, post(analysis::analyze))
}

/// Create all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(openapi::create_docs_routes())
        .merge(auth_routes())
        .merge(patient_routes())
        .merge(vitals_routes())
        .merge(admin_routes())
        .merge(analysis_routes())
}
