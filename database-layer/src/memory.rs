// In-process store for development and tests
use crate::clock::Clock;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{DeviceBinding, NewPatientRecord, NewUser, NewVitalSample, PatientRecord, User, VitalSample};
use crate::period::FilterPeriod;
use crate::store::HealthStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Concurrent in-memory implementation of [`HealthStore`].
///
/// Each table is a vector in insertion order, so newest-first listings can
/// break timestamp ties by position. Email uniqueness is decided under the
/// email index entry lock.
pub struct InMemoryStore {
    clock: Arc<dyn Clock>,
    emails: DashMap<String, Uuid>,
    users: RwLock<Vec<User>>,
    records: RwLock<Vec<PatientRecord>>,
    samples: RwLock<Vec<VitalSample>>,
    devices: DashMap<String, DeviceBinding>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            emails: DashMap::new(),
            users: RwLock::new(Vec::new()),
            records: RwLock::new(Vec::new()),
            samples: RwLock::new(Vec::new()),
            devices: DashMap::new(),
        }
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.read().iter().any(|u| u.id == id)
    }
}

/// Newest first; ties keep most-recently-inserted first
fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.reverse();
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl HealthStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> DatabaseResult<User> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DatabaseError::DuplicateEmail(user.email)),
            Entry::Vacant(slot) => {
                let created = User {
                    id: Uuid::new_v4(),
                    email: user.email,
                    phone: user.phone,
                    password_hash: user.password_hash,
                    name: user.name,
                    blood_group: user.blood_group,
                    custom_blood_group: user.custom_blood_group,
                    gender: user.gender,
                    role: user.role,
                    created_at: self.clock.now(),
                };
                self.users.write().push(created.clone());
                slot.insert(created.id);
                Ok(created)
            }
        }
    }

    async fn get_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.get_user_by_id(id).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> DatabaseResult<Vec<User>> {
        Ok(self.users.read().clone())
    }

    async fn create_patient_record(&self, record: NewPatientRecord) -> DatabaseResult<PatientRecord> {
        if !self.user_exists(record.user_id) {
            return Err(DatabaseError::MissingReference(format!("user {}", record.user_id)));
        }

        let created = PatientRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            record_date: record.record_date.unwrap_or_else(|| self.clock.now()),
            notes: record.notes,
            diagnosis: record.diagnosis,
        };
        self.records.write().push(created.clone());
        Ok(created)
    }

    async fn get_patient_record(&self, id: Uuid) -> DatabaseResult<Option<PatientRecord>> {
        Ok(self.records.read().iter().find(|r| r.id == id).cloned())
    }

    async fn list_records_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PatientRecord>> {
        let records: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(records, |r| r.record_date))
    }

    async fn list_all_records(&self) -> DatabaseResult<Vec<PatientRecord>> {
        let records = self.records.read().clone();
        Ok(newest_first(records, |r| r.record_date))
    }

    async fn create_vital_sample(&self, sample: NewVitalSample) -> DatabaseResult<VitalSample> {
        if !self.user_exists(sample.user_id) {
            return Err(DatabaseError::MissingReference(format!("user {}", sample.user_id)));
        }

        let created = sample.into_sample(Uuid::new_v4(), self.clock.now());
        self.samples.write().push(created.clone());
        Ok(created)
    }

    async fn get_latest_vital_sample(&self, user_id: Uuid) -> DatabaseResult<Option<VitalSample>> {
        // max_by_key keeps the last maximum, i.e. the latest insert on ties
        Ok(self
            .samples
            .read()
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.timestamp)
            .cloned())
    }

    async fn get_latest_vital_sample_any(&self) -> DatabaseResult<Option<VitalSample>> {
        Ok(self.samples.read().iter().max_by_key(|s| s.timestamp).cloned())
    }

    async fn list_vital_samples_by_user(
        &self,
        user_id: Uuid,
        period: Option<FilterPeriod>,
    ) -> DatabaseResult<Vec<VitalSample>> {
        let now = self.clock.now();
        let samples: Vec<_> = self
            .samples
            .read()
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| period.map_or(true, |p| p.matches(s.timestamp, now)))
            .cloned()
            .collect();
        Ok(newest_first(samples, |s| s.timestamp))
    }

    async fn list_all_vital_samples(&self) -> DatabaseResult<Vec<VitalSample>> {
        let samples = self.samples.read().clone();
        Ok(newest_first(samples, |s| s.timestamp))
    }

    async fn bind_device(&self, device_id: &str, user_id: Uuid) -> DatabaseResult<DeviceBinding> {
        if !self.user_exists(user_id) {
            return Err(DatabaseError::MissingReference(format!("user {user_id}")));
        }

        let binding = DeviceBinding {
            device_id: device_id.to_string(),
            user_id,
            created_at: self.clock.now(),
        };
        self.devices.insert(binding.device_id.clone(), binding.clone());
        Ok(binding)
    }

    async fn get_device_binding(&self, device_id: &str) -> DatabaseResult<Option<DeviceBinding>> {
        Ok(self.devices.get(device_id).map(|entry| entry.value().clone()))
    }

    async fn list_device_bindings(&self) -> DatabaseResult<Vec<DeviceBinding>> {
        let mut bindings: Vec<_> = self.devices.iter().map(|entry| entry.value().clone()).collect();
        bindings.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        Ok(bindings)
    }

    async fn ping(&self) -> DatabaseResult<()> {
        Ok(())
    }
}
