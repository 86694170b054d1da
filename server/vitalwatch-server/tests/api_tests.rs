//! End-to-end API tests against the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use auth_identity::Role;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use database_layer::{Clock, HealthStore, InMemoryStore, ManualClock};
use insight_service::{InsightError, InsightResult, SummaryGenerator};
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use vitalwatch_server::{create_app, AppState, ServerConfig};

mock! {
    pub Generator {}

    #[async_trait]
    impl SummaryGenerator for Generator {
        fn name(&self) -> &'static str;
        async fn generate(&self, prompt: &str) -> InsightResult<String>;
    }
}

const PASSWORD: &str = "Str0ng!pass";

/// Test fixture: router over an in-memory store with a controllable clock
struct TestApp {
    app: Router,
    state: AppState,
    clock: Arc<ManualClock>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_generator(None)
    }

    fn with_generator(generator: Option<Arc<dyn SummaryGenerator>>) -> Self {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()));
        let store_clock: Arc<dyn Clock> = clock.clone();
        let store: Arc<dyn HealthStore> = Arc::new(InMemoryStore::new(store_clock));
        let config = ServerConfig {
            bcrypt_cost: 4,
            ..Default::default()
        };
        let state = AppState::new(config, store, generator);
        let app = create_app(state.clone());
        Self { app, state, clock }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("POST", uri, token, Some(body))).await
    }

    /// Register and return the new user's id
    async fn register(&self, email: &str, role: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "email": email,
                    "phone": "9876543210",
                    "password": PASSWORD,
                    "name": "Test User",
                    "bloodGroup": "O+",
                    "gender": "female",
                    "role": role
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post("/api/auth/login", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn patient(&self, email: &str) -> (Uuid, String) {
        let id = self.register(email, "patient").await;
        (id, self.login(email).await)
    }

    async fn admin(&self) -> (Uuid, String) {
        let id = self.register("admin@example.com", "admin").await;
        (id, self.login("admin@example.com").await)
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn manual_sample(user_id: Uuid, heart_rate: i32) -> Value {
    json!({
        "userId": user_id,
        "heartRate": heart_rate,
        "spo2": 97,
        "systolic": 118,
        "diastolic": 79,
        "temperature": 36.8,
        "respiratoryRate": 18,
        "ecgWaveform": [0.1, 0.4, 0.2]
    })
}

#[tokio::test]
async fn test_health_and_readiness() {
    let t = TestApp::new();

    let (status, body) = t.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = t.get("/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = t.get("/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/vitals"].is_object());
}

#[tokio::test]
async fn test_registration_hides_password_and_seeds_patient_baseline() {
    let t = TestApp::new();
    let (status, body) = t
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "  Asha@Example.com ",
                "phone": "9876543210",
                "password": PASSWORD,
                "bloodGroup": "Others",
                "customBloodGroup": "Bombay",
                "gender": "female"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["email"], "asha@example.com");
    assert_eq!(body["role"], "patient");
    assert_eq!(body["customBloodGroup"], "Bombay");
    let text = body.to_string();
    assert!(!text.contains("password"));
    assert!(!text.contains(PASSWORD));

    let user_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = t.state.store.get_user_by_id(user_id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, PASSWORD);

    let seeded = t.state.store.list_vital_samples_by_user(user_id, None).await.unwrap();
    assert_eq!(seeded.len(), 1);
    let s = &seeded[0];
    assert!((60..80).contains(&s.heart_rate));
    assert!((95..100).contains(&s.spo2));
    assert!((36.5..=38.0).contains(&s.temperature));
}

#[tokio::test]
async fn test_admin_registration_is_not_seeded() {
    let t = TestApp::new();
    let (admin_id, _) = t.admin().await;
    let samples = t.state.store.list_vital_samples_by_user(admin_id, None).await.unwrap();
    assert!(samples.is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let t = TestApp::new();
    let first = t.register("asha@example.com", "patient").await;

    let (status, body) = t
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "ASHA@example.com",
                "phone": "1234567890",
                "password": "An0ther!pass",
                "bloodGroup": "A+",
                "gender": "male",
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_1004");

    let kept = t.state.store.get_user_by_id(first).await.unwrap().unwrap();
    assert_eq!(kept.phone, "9876543210");
    assert_eq!(kept.role, Role::Patient);
    assert_eq!(t.state.store.list_users().await.unwrap().len(), 1);
    t.login("asha@example.com").await;
}

#[tokio::test]
async fn test_registration_validation() {
    let t = TestApp::new();
    let base = json!({
        "email": "asha@example.com",
        "phone": "9876543210",
        "password": PASSWORD,
        "bloodGroup": "O+",
        "gender": "female"
    });

    let cases = [
        ("email", json!("not-an-email")),
        ("phone", json!("98765")),
        ("password", json!("weakpass")),
        ("bloodGroup", json!("Others")),
        ("bloodGroup", json!("Z+")),
    ];

    for (field, value) in cases {
        let mut body = base.clone();
        body[field] = value.clone();
        let (status, response) = t.post("/api/auth/register", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}={value}: {response}");
        assert!(response["message"].is_string());
    }

    assert!(t.state.store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let t = TestApp::new();
    t.register("asha@example.com", "patient").await;

    let wrong_password = t
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "asha@example.com", "password": "Wr0ng!pass" }),
        )
        .await;
    let wrong_role = t
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "asha@example.com", "password": PASSWORD, "role": "admin" }),
        )
        .await;
    let unknown = t
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        )
        .await;

    for (status, body) in [&wrong_password, &wrong_role, &unknown] {
        assert_eq!(*status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTH_2001");
        assert_eq!(body["message"], wrong_password.1["message"]);
    }
}

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let t = TestApp::new();
    let id = t.register("asha@example.com", "patient").await;

    let (status, body) = t
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "asha@example.com", "password": PASSWORD, "role": "patient" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id.to_string());
    assert_eq!(body["role"], "patient");
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let identity = t.state.tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(identity.user_id, id);
}

#[tokio::test]
async fn test_authentication_failures_have_no_side_effects() {
    let t = TestApp::new();
    let (a, _) = t.patient("a@example.com").await;
    let before = t.state.store.list_all_vital_samples().await.unwrap().len();

    let (status, body) = t.post("/api/ecg-data", None, manual_sample(a, 90)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_2003");

    let mut malformed = request("POST", "/api/ecg-data", None, Some(manual_sample(a, 90)));
    malformed
        .headers_mut()
        .insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
    let (status, _) = t.send(malformed).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .post("/api/ecg-data", Some("not.a.jwt"), manual_sample(a, 90))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "AUTH_2002");

    let stale = t
        .state
        .tokens
        .issue_at(a, Role::Patient, Utc::now() - Duration::days(8))
        .unwrap();
    let (status, _) = t.post("/api/ecg-data", Some(&stale), manual_sample(a, 90)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(t.state.store.list_all_vital_samples().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_patient_is_confined_to_own_resources() {
    let t = TestApp::new();
    let (a, token_a) = t.patient("a@example.com").await;
    let (b, _) = t.patient("b@example.com").await;

    for uri in [
        format!("/api/users/{b}"),
        format!("/api/patients/{b}/records"),
        format!("/api/ecg-data/latest/{b}"),
        format!("/api/ecg-data/{b}"),
        format!("/api/ecg-data/{b}/day"),
    ] {
        let (status, body) = t.get(&uri, Some(&token_a)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["code"], "AUTHZ_3001");
    }

    for uri in [
        format!("/api/users/{a}"),
        format!("/api/patients/{a}/records"),
        format!("/api/ecg-data/latest/{a}"),
        format!("/api/ecg-data/{a}"),
        format!("/api/ecg-data/{a}/day"),
    ] {
        let (status, _) = t.get(&uri, Some(&token_a)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }

    let (status, _) = t.post("/api/ecg-data", Some(&token_a), manual_sample(b, 90)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for uri in ["/api/admin/users", "/api/admin/ecg-data", "/api/admin/records", "/api/admin/devices"] {
        let (status, _) = t.get(uri, Some(&token_a)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }

    let (status, _) = t
        .post(
            &format!("/api/patients/{a}/records"),
            Some(&token_a),
            json!({ "notes": "self-diagnosed", "diagnosis": "fine" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reaches_every_route() {
    let t = TestApp::new();
    let (a, _) = t.patient("a@example.com").await;
    let (_, admin) = t.admin().await;

    for uri in [
        format!("/api/users/{a}"),
        format!("/api/patients/{a}/records"),
        format!("/api/ecg-data/latest/{a}"),
        format!("/api/ecg-data/{a}"),
        format!("/api/ecg-data/{a}/month"),
        "/api/admin/users".to_string(),
        "/api/admin/ecg-data".to_string(),
        "/api/admin/records".to_string(),
        "/api/admin/devices".to_string(),
        "/api/vitals/latest".to_string(),
    ] {
        let (status, body) = t.get(&uri, Some(&admin)).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
    }

    let (status, record) = t
        .post(
            &format!("/api/patients/{a}/records"),
            Some(&admin),
            json!({ "notes": "routine check", "diagnosis": "healthy" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["userId"], a.to_string());

    let (status, sample) = t.post("/api/ecg-data", Some(&admin), manual_sample(a, 88)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sample["userId"], a.to_string());

    let (_, users) = t.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(!users.to_string().contains("passwordHash"));
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (status, _) = t.get("/api/users/42", Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = Uuid::new_v4();
    let (status, _) = t.get(&format!("/api/users/{missing}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_day_filter_uses_server_clock() {
    let t = TestApp::new();
    // Baseline sample lands on 2024-01-10
    let (a, token) = t.patient("a@example.com").await;

    t.clock.set(Utc.with_ymd_and_hms(2024, 1, 12, 12, 0, 0).unwrap());
    let (status, posted) = t
        .post(
            "/api/ecg-data",
            Some(&token),
            json!({
                "heartRate": 91, "spo2": 97, "systolic": 118, "diastolic": 79,
                "temperature": 36.8, "timestamp": "2020-01-01T00:00:00Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(posted["timestamp"].as_str().unwrap().starts_with("2024-01-12"));

    let (_, today) = t.get(&format!("/api/ecg-data/{a}/day"), Some(&token)).await;
    let today = today.as_array().unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0]["heartRate"], 91);

    let (_, month) = t.get(&format!("/api/ecg-data/{a}/month"), Some(&token)).await;
    assert_eq!(month.as_array().unwrap().len(), 2);

    let (_, unfiltered) = t.get(&format!("/api/ecg-data/{a}/fortnight"), Some(&token)).await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 2);

    let (_, all) = t.get(&format!("/api/ecg-data/{a}"), Some(&token)).await;
    let all = all.as_array().unwrap();
    assert_eq!(all[0]["heartRate"], 91, "newest first");
}

#[tokio::test]
async fn test_temperature_ingestion_carries_forward() {
    let t = TestApp::new();
    let (a, token) = t.patient("a@example.com").await;

    t.clock.advance(Duration::minutes(1));
    let (status, previous) = t.post("/api/ecg-data", Some(&token), manual_sample(a, 77)).await;
    assert_eq!(status, StatusCode::CREATED);

    t.clock.advance(Duration::minutes(1));
    let (status, body) = t
        .post(
            "/api/vitals",
            None,
            json!({ "device_id": "esp32-01", "data_type": "temperature", "temperature": 38.2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);

    let merged = &body["data"];
    assert_eq!(merged["userId"], a.to_string());
    assert_eq!(merged["temperature"], 38.2);
    for field in ["heartRate", "spo2", "systolic", "diastolic", "respiratoryRate", "ecgWaveform"] {
        assert_eq!(merged[field], previous[field], "{field}");
    }
    assert_ne!(merged["id"], previous["id"]);
}

#[tokio::test]
async fn test_vitals_ingestion_updates_reported_fields_only() {
    let t = TestApp::new();
    let (a, _) = t.patient("a@example.com").await;
    let baseline = t.state.store.get_latest_vital_sample(a).await.unwrap().unwrap();

    t.clock.advance(Duration::minutes(1));
    let (status, body) = t
        .post(
            "/api/vitals",
            None,
            json!({ "device_id": "esp32-01", "data_type": "vitals", "max_heart_rate_bpm": 101.4 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["heartRate"], 101);
    assert_eq!(body["data"]["spo2"], baseline.spo2);
    assert_eq!(body["data"]["temperature"], baseline.temperature);
}

#[tokio::test]
async fn test_device_ingestion_rejections() {
    let t = TestApp::new();

    let (status, _) = t
        .post("/api/vitals", None, json!({ "data_type": "temperature", "temperature": 37.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .post("/api/vitals", None, json!({ "device_id": "esp32-01", "data_type": "co2", "value": 3 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .post(
            "/api/vitals",
            None,
            json!({ "device_id": "esp32-01", "data_type": "temperature", "temperature": 37.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "no users yet: {body}");
}

#[tokio::test]
async fn test_device_bindings_route_readings() {
    let t = TestApp::new();
    let (first, _) = t.patient("first@example.com").await;
    let (second, token_second) = t.patient("second@example.com").await;
    let (_, admin) = t.admin().await;

    let (status, _) = t
        .post(
            "/api/admin/devices",
            Some(&token_second),
            json!({ "deviceId": "bed-2", "userId": second }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .post(
            "/api/admin/devices",
            Some(&admin),
            json!({ "deviceId": "bed-2", "userId": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, binding) = t
        .post(
            "/api/admin/devices",
            Some(&admin),
            json!({ "deviceId": "bed-2", "userId": second }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(binding["deviceId"], "bed-2");

    let reading = |device: &str| json!({ "device_id": device, "data_type": "vitals", "spo2": 95 });

    let (_, bound) = t.post("/api/vitals", None, reading("bed-2")).await;
    assert_eq!(bound["data"]["userId"], second.to_string());

    let (_, unbound) = t.post("/api/vitals", None, reading("bed-9")).await;
    assert_eq!(unbound["data"]["userId"], first.to_string());

    let (_, bindings) = t.get("/api/admin/devices", Some(&admin)).await;
    assert_eq!(bindings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_latest_vitals_falls_back_to_own_sample() {
    let t = TestApp::new();
    let (a, token_a) = t.patient("a@example.com").await;
    let (b, token_b) = t.patient("b@example.com").await;
    let (_, admin) = t.admin().await;

    t.clock.advance(Duration::minutes(5));
    let (status, newest) = t.post("/api/ecg-data", Some(&token_b), manual_sample(b, 99)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, mine) = t.get("/api/vitals/latest", Some(&token_a)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["userId"], a.to_string());

    let (_, theirs) = t.get("/api/vitals/latest", Some(&token_b)).await;
    assert_eq!(theirs["id"], newest["id"]);

    let (_, system_wide) = t.get("/api/vitals/latest", Some(&admin)).await;
    assert_eq!(system_wide["id"], newest["id"]);

    let (status, _) = t.get("/api/vitals/latest", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_latest_vitals_not_found_without_own_samples() {
    let t = TestApp::new();
    t.patient("a@example.com").await;
    let (_, admin) = t.admin().await;

    // The admin has no samples but sees the system-wide newest one
    let (status, _) = t.get("/api/vitals/latest", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let empty = TestApp::new();
    let (_, admin) = empty.admin().await;
    let (status, _) = empty.get("/api/vitals/latest", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_reference_must_belong_to_same_user() {
    let t = TestApp::new();
    let (a, token_a) = t.patient("a@example.com").await;
    let (b, token_b) = t.patient("b@example.com").await;
    let (_, admin) = t.admin().await;

    let (_, record) = t
        .post(
            &format!("/api/patients/{a}/records"),
            Some(&admin),
            json!({ "notes": "follow up", "diagnosis": "arrhythmia", "recordDate": "2024-01-09T08:00:00Z" }),
        )
        .await;
    let record_id = record["id"].as_str().unwrap().to_string();
    assert!(record["recordDate"].as_str().unwrap().starts_with("2024-01-09"));

    let mut foreign = manual_sample(b, 80);
    foreign["recordId"] = json!(record_id);
    let (status, _) = t.post("/api/ecg-data", Some(&token_b), foreign).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown = manual_sample(a, 80);
    unknown["recordId"] = json!(Uuid::new_v4());
    let (status, _) = t.post("/api/ecg-data", Some(&token_a), unknown).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut own = manual_sample(a, 80);
    own["recordId"] = json!(record_id);
    let (status, sample) = t.post("/api/ecg-data", Some(&token_a), own).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sample["recordId"], json!(record_id));

    let (_, records) = t.get(&format!("/api/patients/{a}/records"), Some(&token_a)).await;
    assert_eq!(records.as_array().unwrap().len(), 1);

    let (status, _) = t
        .post(
            &format!("/api/patients/{}/records", Uuid::new_v4()),
            Some(&admin),
            json!({ "notes": "", "diagnosis": "ghost" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_manual_sample_validation() {
    let t = TestApp::new();
    let (a, token) = t.patient("a@example.com").await;

    let mut body = manual_sample(a, 80);
    body["spo2"] = json!(130);
    let (status, response) = t.post("/api/ecg-data", Some(&token), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["fieldErrors"]["spo2"].is_array());

    let (status, _) = t
        .post("/api/ecg-data", Some(&token), json!({ "heartRate": "fast" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ai_analysis_unavailable_without_generator() {
    let t = TestApp::new();
    let (_, token) = t.patient("a@example.com").await;

    let (status, body) = t.post("/api/ai-analysis", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SYSTEM_5001");
}

#[tokio::test]
async fn test_ai_analysis_relays_report_verbatim() {
    let mut generator = MockGenerator::new();
    generator.expect_name().return_const("mock");
    generator
        .expect_generate()
        .withf(|prompt: &str| prompt.contains("never estimate") && !prompt.contains("@example.com"))
        .times(1)
        .returning(|_| Ok("  Readings look stable.\n".to_string()));

    let t = TestApp::with_generator(Some(Arc::new(generator)));
    let (a, token) = t.patient("a@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/ai-analysis")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = t.send(request).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["report"], "  Readings look stable.\n");
    assert_eq!(body["sensorData"]["userId"], a.to_string());
}

#[tokio::test]
async fn test_ai_analysis_access_and_failures() {
    let mut generator = MockGenerator::new();
    generator.expect_name().return_const("mock");
    generator
        .expect_generate()
        .returning(|_| Err(InsightError::Upstream { status: 503, body: "overloaded".into() }));

    let t = TestApp::with_generator(Some(Arc::new(generator)));
    let (_, token_a) = t.patient("a@example.com").await;
    let (b, _) = t.patient("b@example.com").await;
    let (admin_id, admin) = t.admin().await;

    let (status, _) = t.post("/api/ai-analysis", Some(&token_a), json!({ "userId": b })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t.post("/api/ai-analysis", Some(&admin), json!({ "userId": admin_id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "admin has no samples");

    let (status, body) = t.post("/api/ai-analysis", Some(&admin), json!({ "userId": b })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SYSTEM_5001");
    assert!(!body["message"].as_str().unwrap().contains("overloaded"));

    let mut malformed = request("POST", "/api/ai-analysis", Some(&token_a), None);
    *malformed.body_mut() = Body::from("{not json");
    let (status, _) = t.send(malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
