use crate::error::DatabaseResult;
use crate::models::{DeviceBinding, NewPatientRecord, NewUser, NewVitalSample, PatientRecord, User, VitalSample};
use crate::period::FilterPeriod;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence contract for users, patient records, vital samples and
/// device bindings.
///
/// Listings of records and samples are newest first. Equal timestamps are
/// ordered most-recently-inserted first.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken
    async fn create_user(&self, user: NewUser) -> DatabaseResult<User>;

    async fn get_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn get_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// All users in creation order
    async fn list_users(&self) -> DatabaseResult<Vec<User>>;

    /// Fails with `MissingReference` when the user does not exist
    async fn create_patient_record(&self, record: NewPatientRecord) -> DatabaseResult<PatientRecord>;

    async fn get_patient_record(&self, id: Uuid) -> DatabaseResult<Option<PatientRecord>>;

    async fn list_records_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PatientRecord>>;

    async fn list_all_records(&self) -> DatabaseResult<Vec<PatientRecord>>;

    /// Assigns id and timestamp. Fails with `MissingReference` when the
    /// user does not exist.
    async fn create_vital_sample(&self, sample: NewVitalSample) -> DatabaseResult<VitalSample>;

    async fn get_latest_vital_sample(&self, user_id: Uuid) -> DatabaseResult<Option<VitalSample>>;

    /// Newest sample across every user
    async fn get_latest_vital_sample_any(&self) -> DatabaseResult<Option<VitalSample>>;

    /// `None` returns the full history
    async fn list_vital_samples_by_user(
        &self,
        user_id: Uuid,
        period: Option<FilterPeriod>,
    ) -> DatabaseResult<Vec<VitalSample>>;

    async fn list_all_vital_samples(&self) -> DatabaseResult<Vec<VitalSample>>;

    /// Binds `device_id` to `user_id`, replacing any previous binding
    async fn bind_device(&self, device_id: &str, user_id: Uuid) -> DatabaseResult<DeviceBinding>;

    async fn get_device_binding(&self, device_id: &str) -> DatabaseResult<Option<DeviceBinding>>;

    async fn list_device_bindings(&self) -> DatabaseResult<Vec<DeviceBinding>>;

    /// Readiness probe
    async fn ping(&self) -> DatabaseResult<()>;
}
