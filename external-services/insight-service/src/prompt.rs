// Fixed prompt template sent to the text-generation provider
use database_layer::{BloodGroup, UserProfile, VitalSample};
use std::fmt::Write as _;

const NOT_RECORDED: &str = "not recorded";

const INSTRUCTIONS: &str = "You are assisting a clinician reviewing remote patient monitoring data. \
Write a short health summary of the readings below in plain language: overall status, any values \
outside typical adult resting ranges, and general wellness suggestions. \
Only use the values provided. If a value is marked \"not recorded\", say that it is unavailable; \
never estimate, invent or assume a value for it. Do not state a diagnosis.";

fn or_not_recorded<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_RECORDED.to_string(), |v| v.to_string())
}

fn waveform_status(waveform: &Option<String>) -> &'static str {
    match waveform.as_deref() {
        Some(w) if !w.trim().is_empty() => "captured",
        _ => NOT_RECORDED,
    }
}

/// Render the prompt for one patient and their latest sample
pub fn build_prompt(profile: &UserProfile, sample: &VitalSample) -> String {
    let blood_group = match (profile.blood_group, profile.custom_blood_group.as_deref()) {
        (BloodGroup::Others, Some(custom)) if !custom.trim().is_empty() => custom.to_string(),
        (BloodGroup::Others, _) => NOT_RECORDED.to_string(),
        (group, _) => group.to_string(),
    };
    let gender = Some(profile.gender.as_str()).filter(|g| !g.trim().is_empty());

    let mut prompt = String::with_capacity(1024);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nPatient profile:\n");
    let _ = writeln!(prompt, "- Name: {}", or_not_recorded(profile.name.as_deref()));
    let _ = writeln!(prompt, "- Gender: {}", or_not_recorded(gender));
    let _ = writeln!(prompt, "- Blood group: {blood_group}");

    prompt.push_str("\nLatest vital signs:\n");
    let _ = writeln!(prompt, "- Recorded at: {}", sample.timestamp.to_rfc3339());
    let _ = writeln!(prompt, "- Heart rate: {} bpm", sample.heart_rate);
    let _ = writeln!(prompt, "- SpO2: {} %", sample.spo2);
    let _ = writeln!(prompt, "- Blood pressure: {}/{} mmHg", sample.systolic, sample.diastolic);
    let _ = writeln!(prompt, "- Temperature: {:.1} °C", sample.temperature);
    let _ = writeln!(
        prompt,
        "- Respiratory rate: {}",
        sample
            .respiratory_rate
            .map_or_else(|| NOT_RECORDED.to_string(), |r| format!("{r} breaths/min"))
    );
    let _ = writeln!(prompt, "- ECG waveform: {}", waveform_status(&sample.ecg_waveform));
    let _ = writeln!(prompt, "- Pleth waveform: {}", waveform_status(&sample.pleth_waveform));
    let _ = writeln!(prompt, "- EtCO2 waveform: {}", waveform_status(&sample.etco2_waveform));

    prompt
}
