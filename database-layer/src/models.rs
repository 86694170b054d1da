// Domain models owned by the health store
use auth_identity::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    Others,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::Others => "Others",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodGroup::APositive),
            "A-" => Ok(BloodGroup::ANegative),
            "B+" => Ok(BloodGroup::BPositive),
            "B-" => Ok(BloodGroup::BNegative),
            "AB+" => Ok(BloodGroup::AbPositive),
            "AB-" => Ok(BloodGroup::AbNegative),
            "O+" => Ok(BloodGroup::OPositive),
            "O-" => Ok(BloodGroup::ONegative),
            "Others" => Ok(BloodGroup::Others),
            other => Err(format!("unknown blood group '{other}'")),
        }
    }
}

/// Stored user. Deliberately not `Serialize`: responses go through
/// [`UserProfile`], which has no password field.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub custom_blood_group: Option<String>,
    pub gender: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub custom_blood_group: Option<String>,
    pub gender: String,
    pub role: Role,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub custom_blood_group: Option<String>,
    pub gender: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone: user.phone.clone(),
            name: user.name.clone(),
            blood_group: user.blood_group,
            custom_blood_group: user.custom_blood_group.clone(),
            gender: user.gender.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_date: DateTime<Utc>,
    pub notes: String,
    pub diagnosis: String,
}

#[derive(Debug, Clone)]
pub struct NewPatientRecord {
    pub user_id: Uuid,
    /// Creation time is used when absent
    pub record_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub diagnosis: String,
}

/// One timestamped snapshot of a patient's vital signs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalSample {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub heart_rate: i32,
    pub spo2: i32,
    pub systolic: i32,
    pub diastolic: i32,
    pub temperature: f64,
    pub respiratory_rate: Option<i32>,
    pub pleth_waveform: Option<String>,
    pub spo2_waveform: Option<String>,
    pub respiratory_waveform: Option<String>,
    pub cvp_arterial_waveform: Option<String>,
    pub ecg_waveform: Option<String>,
    pub etco2_waveform: Option<String>,
}

/// Sample contents before the store assigns id and timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVitalSample {
    pub user_id: Uuid,
    pub record_id: Option<Uuid>,
    pub heart_rate: i32,
    pub spo2: i32,
    pub systolic: i32,
    pub diastolic: i32,
    pub temperature: f64,
    pub respiratory_rate: Option<i32>,
    pub pleth_waveform: Option<String>,
    pub spo2_waveform: Option<String>,
    pub respiratory_waveform: Option<String>,
    pub cvp_arterial_waveform: Option<String>,
    pub ecg_waveform: Option<String>,
    pub etco2_waveform: Option<String>,
}

impl NewVitalSample {
    pub(crate) fn into_sample(self, id: Uuid, timestamp: DateTime<Utc>) -> VitalSample {
        VitalSample {
            id,
            user_id: self.user_id,
            record_id: self.record_id,
            timestamp,
            heart_rate: self.heart_rate,
            spo2: self.spo2,
            systolic: self.systolic,
            diastolic: self.diastolic,
            temperature: self.temperature,
            respiratory_rate: self.respiratory_rate,
            pleth_waveform: self.pleth_waveform,
            spo2_waveform: self.spo2_waveform,
            respiratory_waveform: self.respiratory_waveform,
            cvp_arterial_waveform: self.cvp_arterial_waveform,
            ecg_waveform: self.ecg_waveform,
            etco2_waveform: self.etco2_waveform,
        }
    }
}

/// Association of a bedside device with the user it reports for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBinding {
    pub device_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
