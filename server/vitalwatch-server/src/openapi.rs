use crate::routes::paths;
use crate::server::AppState;
use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the bearer token scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::readiness_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::users::get_user,
        crate::handlers::records::list_patient_records,
        crate::handlers::records::create_patient_record,
        crate::handlers::vitals::latest_for_user,
        crate::handlers::vitals::history,
        crate::handlers::vitals::history_for_period,
        crate::handlers::vitals::create_vital_sample,
        crate::handlers::vitals::latest_any,
        crate::handlers::devices::ingest_reading,
        crate::handlers::admin::list_users,
        crate::handlers::admin::list_vital_samples,
        crate::handlers::admin::list_records,
        crate::handlers::admin::list_devices,
        crate::handlers::admin::bind_device,
        crate::handlers::analysis::analyze,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ReadinessResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::records::CreateRecordRequest,
            crate::handlers::vitals::CreateVitalSampleRequest,
            crate::handlers::devices::DevicePayload,
            crate::handlers::admin::BindDeviceRequest,
            crate::handlers::analysis::AnalysisRequest,
            crate::handlers::analysis::AnalysisResponse,
            database_layer::UserProfile,
            database_layer::PatientRecord,
            database_layer::VitalSample,
            database_layer::DeviceBinding,
            database_layer::BloodGroup,
            auth_identity::Role,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "authentication", description = "Registration and login"),
        (name = "users", description = "User profiles"),
        (name = "records", description = "Patient records"),
        (name = "vitals", description = "Vital-sign samples and history"),
        (name = "devices", description = "Bedside device ingestion"),
        (name = "admin", description = "Administrative listings and device bindings"),
        (name = "analysis", description = "AI-generated health summaries"),
    ),
    info(
        title = "VitalWatch API",
        description = "Patient vital-sign monitoring API: accounts, records, device ingestion and health summaries.",
        license(name = "AGPL-3.0-only")
    )
)]
pub struct ApiDoc;

/// Swagger UI plus the raw OpenAPI document
pub fn create_docs_routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new(paths::docs::SWAGGER_UI).url(paths::docs::OPENAPI_JSON, ApiDoc::openapi()))
}
