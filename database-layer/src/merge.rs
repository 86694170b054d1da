//! Carry-forward merge of partial device readings.
//!
//! Devices report one measurement class at a time. Every reading becomes a
//! new sample: the reported fields come from the reading, everything else
//! is copied from the user's previous latest sample, or from the resting
//! defaults below when the user has no samples yet.

use crate::models::{NewVitalSample, VitalSample};
use uuid::Uuid;

pub const DEFAULT_HEART_RATE: i32 = 70;
pub const DEFAULT_SPO2: i32 = 98;
pub const DEFAULT_SYSTOLIC: i32 = 120;
pub const DEFAULT_DIASTOLIC: i32 = 80;
pub const DEFAULT_RESPIRATORY_RATE: i32 = 20;
pub const DEFAULT_TEMPERATURE: f64 = 36.6;

/// A validated device reading
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceReading {
    Temperature { celsius: f64 },
    /// At least one field is present
    Vitals {
        spo2: Option<i32>,
        heart_rate: Option<i32>,
    },
}

pub fn merge_sample(previous: Option<&VitalSample>, reading: &DeviceReading, user_id: Uuid) -> NewVitalSample {
    let mut next = match previous {
        Some(prev) => NewVitalSample {
            user_id,
            record_id: None,
            heart_rate: prev.heart_rate,
            spo2: prev.spo2,
            systolic: prev.systolic,
            diastolic: prev.diastolic,
            temperature: prev.temperature,
            respiratory_rate: prev.respiratory_rate.or(Some(DEFAULT_RESPIRATORY_RATE)),
            pleth_waveform: prev.pleth_waveform.clone(),
            spo2_waveform: prev.spo2_waveform.clone(),
            respiratory_waveform: prev.respiratory_waveform.clone(),
            cvp_arterial_waveform: prev.cvp_arterial_waveform.clone(),
            ecg_waveform: prev.ecg_waveform.clone(),
            etco2_waveform: prev.etco2_waveform.clone(),
        },
        None => NewVitalSample {
            user_id,
            heart_rate: DEFAULT_HEART_RATE,
            spo2: DEFAULT_SPO2,
            systolic: DEFAULT_SYSTOLIC,
            diastolic: DEFAULT_DIASTOLIC,
            temperature: DEFAULT_TEMPERATURE,
            respiratory_rate: Some(DEFAULT_RESPIRATORY_RATE),
            ..Default::default()
        },
    };

    match reading {
        DeviceReading::Temperature { celsius } => next.temperature = *celsius,
        DeviceReading::Vitals { spo2, heart_rate } => {
            if let Some(spo2) = spo2 {
                next.spo2 = *spo2;
            }
            if let Some(hr) = heart_rate {
                next.heart_rate = *hr;
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn previous(user_id: Uuid) -> VitalSample {
        NewVitalSample {
            user_id,
            record_id: Some(Uuid::new_v4()),
            heart_rate: 88,
            spo2: 93,
            systolic: 135,
            diastolic: 91,
            temperature: 37.2,
            respiratory_rate: Some(18),
            ecg_waveform: Some("[0.1,0.4,0.2]".into()),
            ..Default::default()
        }
        .into_sample(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn temperature_carries_forward_everything_else() {
        let user = Uuid::new_v4();
        let prev = previous(user);

        let merged = merge_sample(Some(&prev), &DeviceReading::Temperature { celsius: 38.4 }, user);

        assert_eq!(merged.temperature, 38.4);
        assert_eq!(merged.heart_rate, 88);
        assert_eq!(merged.spo2, 93);
        assert_eq!((merged.systolic, merged.diastolic), (135, 91));
        assert_eq!(merged.respiratory_rate, Some(18));
        assert_eq!(merged.ecg_waveform.as_deref(), Some("[0.1,0.4,0.2]"));
        assert_eq!(merged.record_id, None);
    }

    #[test]
    fn defaults_without_previous_sample() {
        let user = Uuid::new_v4();
        let merged = merge_sample(None, &DeviceReading::Temperature { celsius: 36.9 }, user);

        assert_eq!(merged.user_id, user);
        assert_eq!(merged.heart_rate, DEFAULT_HEART_RATE);
        assert_eq!(merged.spo2, DEFAULT_SPO2);
        assert_eq!((merged.systolic, merged.diastolic), (120, 80));
        assert_eq!(merged.respiratory_rate, Some(DEFAULT_RESPIRATORY_RATE));
        assert_eq!(merged.temperature, 36.9);
    }

    #[test]
    fn partial_vitals_only_override_present_fields() {
        let user = Uuid::new_v4();
        let prev = previous(user);

        let merged = merge_sample(
            Some(&prev),
            &DeviceReading::Vitals {
                spo2: None,
                heart_rate: Some(101),
            },
            user,
        );

        assert_eq!(merged.heart_rate, 101);
        assert_eq!(merged.spo2, 93);
        assert_eq!(merged.temperature, 37.2);
    }

    proptest! {
        #[test]
        fn vitals_never_touch_blood_pressure_or_temperature(
            spo2 in proptest::option::of(50i32..100),
            hr in proptest::option::of(30i32..220),
        ) {
            let user = Uuid::new_v4();
            let prev = previous(user);
            let merged = merge_sample(Some(&prev), &DeviceReading::Vitals { spo2, heart_rate: hr }, user);

            prop_assert_eq!(merged.systolic, prev.systolic);
            prop_assert_eq!(merged.diastolic, prev.diastolic);
            prop_assert_eq!(merged.temperature, prev.temperature);
            prop_assert_eq!(merged.spo2, spo2.unwrap_or(prev.spo2));
            prop_assert_eq!(merged.heart_rate, hr.unwrap_or(prev.heart_rate));
        }
    }
}
