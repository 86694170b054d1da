//! PostgreSQL-backed health store
//!
//! Email uniqueness and every foreign reference are enforced by the schema.
//! Each table carries a `seq` column so that equal timestamps still list
//! most-recently-inserted first.

use crate::clock::Clock;
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{
    BloodGroup, DeviceBinding, NewPatientRecord, NewUser, NewVitalSample, PatientRecord, User, VitalSample,
};
use crate::period::FilterPeriod;
use crate::store::HealthStore;
use async_trait::async_trait;
use auth_identity::Role;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        name TEXT,
        blood_group TEXT NOT NULL,
        custom_blood_group TEXT,
        gender TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('patient', 'admin')),
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS patient_records (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        record_date TIMESTAMPTZ NOT NULL,
        notes TEXT NOT NULL,
        diagnosis TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vital_samples (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        record_id UUID REFERENCES patient_records(id),
        timestamp TIMESTAMPTZ NOT NULL,
        heart_rate INTEGER NOT NULL,
        spo2 INTEGER NOT NULL,
        systolic INTEGER NOT NULL,
        diastolic INTEGER NOT NULL,
        temperature DOUBLE PRECISION NOT NULL,
        respiratory_rate INTEGER,
        pleth_waveform TEXT,
        spo2_waveform TEXT,
        respiratory_waveform TEXT,
        cvp_arterial_waveform TEXT,
        ecg_waveform TEXT,
        etco2_waveform TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_vital_samples_user_time ON vital_samples (user_id, timestamp DESC, seq DESC)",
    "CREATE INDEX IF NOT EXISTS idx_vital_samples_time ON vital_samples (timestamp DESC, seq DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS device_bindings (
        device_id TEXT PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

pub struct PostgresStore {
    db: DatabasePool,
    clock: Arc<dyn Clock>,
}

impl PostgresStore {
    pub fn new(db: DatabasePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Create tables and indexes that do not exist yet
    pub async fn migrate(&self) -> DatabaseResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(self.db.pool())
                .await
                .map_err(|e| DatabaseError::QueryFailed(format!("Failed to apply schema: {}", e)))?;
        }
        info!("Database schema is up to date");
        Ok(())
    }
}

fn map_write_error(e: sqlx::Error, context: &str) -> DatabaseError {
    let code = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => DatabaseError::DuplicateEmail(context.to_string()),
        Some(FOREIGN_KEY_VIOLATION) => DatabaseError::MissingReference(context.to_string()),
        _ => DatabaseError::SqlxError(e),
    }
}

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role")?;
    let blood_group: String = row.try_get("blood_group")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        blood_group: blood_group.parse::<BloodGroup>().map_err(DatabaseError::InvalidData)?,
        custom_blood_group: row.try_get("custom_blood_group")?,
        gender: row.try_get("gender")?,
        role: role.parse::<Role>().map_err(DatabaseError::InvalidData)?,
        created_at: row.try_get("created_at")?,
    })
}

fn record_from_row(row: &PgRow) -> DatabaseResult<PatientRecord> {
    Ok(PatientRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        record_date: row.try_get("record_date")?,
        notes: row.try_get("notes")?,
        diagnosis: row.try_get("diagnosis")?,
    })
}

fn sample_from_row(row: &PgRow) -> DatabaseResult<VitalSample> {
    Ok(VitalSample {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        record_id: row.try_get("record_id")?,
        timestamp: row.try_get("timestamp")?,
        heart_rate: row.try_get("heart_rate")?,
        spo2: row.try_get("spo2")?,
        systolic: row.try_get("systolic")?,
        diastolic: row.try_get("diastolic")?,
        temperature: row.try_get("temperature")?,
        respiratory_rate: row.try_get("respiratory_rate")?,
        pleth_waveform: row.try_get("pleth_waveform")?,
        spo2_waveform: row.try_get("spo2_waveform")?,
        respiratory_waveform: row.try_get("respiratory_waveform")?,
        cvp_arterial_waveform: row.try_get("cvp_arterial_waveform")?,
        ecg_waveform: row.try_get("ecg_waveform")?,
        etco2_waveform: row.try_get("etco2_waveform")?,
    })
}

fn binding_from_row(row: &PgRow) -> DatabaseResult<DeviceBinding> {
    Ok(DeviceBinding {
        device_id: row.try_get("device_id")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HealthStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> DatabaseResult<User> {
        debug!("Inserting user");

        let row = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, phone, password_hash, name,
                blood_group, custom_blood_group, gender, role, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.blood_group.as_str())
        .bind(&user.custom_blood_group)
        .bind(&user.gender)
        .bind(user.role.as_str())
        .bind(self.clock.now())
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        user_from_row(&row)
    }

    async fn get_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn get_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn list_users(&self) -> DatabaseResult<Vec<User>> {
        sqlx::query("SELECT * FROM users ORDER BY seq ASC")
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn create_patient_record(&self, record: NewPatientRecord) -> DatabaseResult<PatientRecord> {
        let record_date = record.record_date.unwrap_or_else(|| self.clock.now());

        let row = sqlx::query(
            r#"
            INSERT INTO patient_records (id, user_id, record_date, notes, diagnosis)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(record_date)
        .bind(&record.notes)
        .bind(&record.diagnosis)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| map_write_error(e, &format!("user {}", record.user_id)))?;

        record_from_row(&row)
    }

    async fn get_patient_record(&self, id: Uuid) -> DatabaseResult<Option<PatientRecord>> {
        sqlx::query("SELECT * FROM patient_records WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(record_from_row)
            .transpose()
    }

    async fn list_records_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PatientRecord>> {
        sqlx::query("SELECT * FROM patient_records WHERE user_id = $1 ORDER BY record_date DESC, seq DESC")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(record_from_row)
            .collect()
    }

    async fn list_all_records(&self) -> DatabaseResult<Vec<PatientRecord>> {
        sqlx::query("SELECT * FROM patient_records ORDER BY record_date DESC, seq DESC")
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(record_from_row)
            .collect()
    }

    async fn create_vital_sample(&self, sample: NewVitalSample) -> DatabaseResult<VitalSample> {
        let row = sqlx::query(
            r#"
            INSERT INTO vital_samples (
                id, user_id, record_id, timestamp,
                heart_rate, spo2, systolic, diastolic, temperature, respiratory_rate,
                pleth_waveform, spo2_waveform, respiratory_waveform,
                cvp_arterial_waveform, ecg_waveform, etco2_waveform
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sample.user_id)
        .bind(sample.record_id)
        .bind(self.clock.now())
        .bind(sample.heart_rate)
        .bind(sample.spo2)
        .bind(sample.systolic)
        .bind(sample.diastolic)
        .bind(sample.temperature)
        .bind(sample.respiratory_rate)
        .bind(&sample.pleth_waveform)
        .bind(&sample.spo2_waveform)
        .bind(&sample.respiratory_waveform)
        .bind(&sample.cvp_arterial_waveform)
        .bind(&sample.ecg_waveform)
        .bind(&sample.etco2_waveform)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| map_write_error(e, &format!("user {}", sample.user_id)))?;

        sample_from_row(&row)
    }

    async fn get_latest_vital_sample(&self, user_id: Uuid) -> DatabaseResult<Option<VitalSample>> {
        sqlx::query("SELECT * FROM vital_samples WHERE user_id = $1 ORDER BY timestamp DESC, seq DESC LIMIT 1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(sample_from_row)
            .transpose()
    }

    async fn get_latest_vital_sample_any(&self) -> DatabaseResult<Option<VitalSample>> {
        sqlx::query("SELECT * FROM vital_samples ORDER BY timestamp DESC, seq DESC LIMIT 1")
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(sample_from_row)
            .transpose()
    }

    async fn list_vital_samples_by_user(
        &self,
        user_id: Uuid,
        period: Option<FilterPeriod>,
    ) -> DatabaseResult<Vec<VitalSample>> {
        let samples = sqlx::query("SELECT * FROM vital_samples WHERE user_id = $1 ORDER BY timestamp DESC, seq DESC")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(sample_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        // Windows are calendar periods in the server's zone, not the database's
        let Some(period) = period else {
            return Ok(samples);
        };
        let now = self.clock.now();
        Ok(samples
            .into_iter()
            .filter(|s| period.matches(s.timestamp, now))
            .collect())
    }

    async fn list_all_vital_samples(&self) -> DatabaseResult<Vec<VitalSample>> {
        sqlx::query("SELECT * FROM vital_samples ORDER BY timestamp DESC, seq DESC")
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(sample_from_row)
            .collect()
    }

    async fn bind_device(&self, device_id: &str, user_id: Uuid) -> DatabaseResult<DeviceBinding> {
        let row = sqlx::query(
            r#"
            INSERT INTO device_bindings (device_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (device_id) DO UPDATE
                SET user_id = EXCLUDED.user_id, created_at = EXCLUDED.created_at
            RETURNING *
            "#,
        )
        .bind(device_id)
        .bind(user_id)
        .bind(self.clock.now())
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| map_write_error(e, &format!("user {user_id}")))?;

        binding_from_row(&row)
    }

    async fn get_device_binding(&self, device_id: &str) -> DatabaseResult<Option<DeviceBinding>> {
        sqlx::query("SELECT * FROM device_bindings WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(self.db.pool())
            .await?
            .as_ref()
            .map(binding_from_row)
            .transpose()
    }

    async fn list_device_bindings(&self) -> DatabaseResult<Vec<DeviceBinding>> {
        sqlx::query("SELECT * FROM device_bindings ORDER BY device_id ASC")
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(binding_from_row)
            .collect()
    }

    async fn ping(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(self.db.pool())
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
    }
}
