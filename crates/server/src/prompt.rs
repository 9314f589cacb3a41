//! Prompt construction for lifestyle advice.

use std::fmt::Write;

use diagnosis::Category;
use records::{Profile, Reading};

const DEFAULT_NAME: &str = "User";
const DEFAULT_AGE: u32 = 30;
const DEFAULT_GENDER: &str = "Not specified";

/// The profile fields the prompt mentions, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

impl PatientSummary {
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        let name = profile
            .and_then(|p| p.full_name.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_NAME);
        let age = profile
            .and_then(|p| p.age)
            .filter(|age| *age > 0)
            .unwrap_or(DEFAULT_AGE);
        let gender = profile
            .and_then(|p| p.gender.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_GENDER);

        Self {
            name: name.to_string(),
            age,
            gender: gender.to_string(),
        }
    }
}

impl Default for PatientSummary {
    fn default() -> Self {
        Self::from_profile(None)
    }
}

/// Requested sections and the lists each one carries. The keys are the
/// field names `LifestyleAdvice` deserializes.
const SECTIONS: [(&str, &str, &[&str]); 5] = [
    (
        "diet",
        "Diet (specific foods to eat and avoid)",
        &["recommendations", "foods_to_eat", "foods_to_avoid"],
    ),
    (
        "exercise",
        "Exercise (appropriate physical activities)",
        &["recommendations", "suggested_activities"],
    ),
    (
        "stress_management",
        "Stress Management (techniques to reduce stress)",
        &["recommendations", "techniques"],
    ),
    (
        "sleep_hydration",
        "Sleep & Hydration (optimal patterns and intake)",
        &["sleep_recommendations", "hydration_tips"],
    ),
    (
        "medical_advice",
        "Medical Advice (when to see a doctor)",
        &["recommendations", "warning_signs"],
    ),
];

/// Build the generation prompt for one reading.
pub fn build_prompt(systolic: i32, diastolic: i32, diagnosis: Category, patient: &PatientSummary) -> String {
    let mut prompt = String::with_capacity(2048);

    // Writing into a String cannot fail
    let _ = writeln!(prompt, "You are a medical assistant specializing in cardiovascular health.");
    prompt.push('\n');
    let _ = writeln!(prompt, "Patient information:");
    let _ = writeln!(prompt, "- Name: {}", patient.name);
    let _ = writeln!(prompt, "- Age: {}", patient.age);
    let _ = writeln!(prompt, "- Gender: {}", patient.gender);
    let _ = writeln!(prompt, "- Blood pressure reading: {}/{} mmHg", systolic, diastolic);
    let _ = writeln!(prompt, "- Diagnosis: {}", diagnosis.label());
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "Based on this information, give personalized lifestyle recommendations in these categories:"
    );
    for (i, (_, title, _)) in SECTIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, title);
    }
    prompt.push('\n');
    let _ = writeln!(prompt, "Respond with JSON using exactly this structure:");
    prompt.push_str(&json_skeleton());
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "Keep the recommendations evidence-based, personalized to the patient, and appropriate for their blood pressure level."
    );

    prompt
}

/// Prompt for a stored reading.
pub fn prompt_for_reading(reading: &Reading, patient: &PatientSummary) -> String {
    build_prompt(reading.systolic, reading.diastolic, reading.diagnosis, patient)
}

fn json_skeleton() -> String {
    let mut out = String::from("{\n");
    for (si, (key, _, lists)) in SECTIONS.iter().enumerate() {
        let _ = writeln!(out, "  \"{}\": {{", key);
        for (li, list) in lists.iter().enumerate() {
            let comma = if li + 1 < lists.len() { "," } else { "" };
            let _ = writeln!(out, "    \"{}\": [\"item 1\", \"item 2\", ...]{}", list, comma);
        }
        let comma = if si + 1 < SECTIONS.len() { "," } else { "" };
        let _ = writeln!(out, "  }}{}", comma);
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_defaults_without_profile() {
        let patient = PatientSummary::from_profile(None);
        assert_eq!(patient.name, "User");
        assert_eq!(patient.age, 30);
        assert_eq!(patient.gender, "Not specified");
    }

    #[test]
    fn test_partial_profile_fills_gaps() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.full_name = Some("Ada Lovelace".to_string());
        profile.age = Some(0);
        profile.gender = Some("  ".to_string());

        let patient = PatientSummary::from_profile(Some(&profile));
        assert_eq!(patient.name, "Ada Lovelace");
        assert_eq!(patient.age, 30);
        assert_eq!(patient.gender, "Not specified");
    }

    #[test]
    fn test_prompt_mentions_reading_and_patient() {
        let patient = PatientSummary {
            name: "Sam".to_string(),
            age: 58,
            gender: "Male".to_string(),
        };
        let prompt = build_prompt(142, 91, Category::HypertensionStage2, &patient);

        assert!(prompt.contains("- Name: Sam"));
        assert!(prompt.contains("- Age: 58"));
        assert!(prompt.contains("- Gender: Male"));
        assert!(prompt.contains("142/91 mmHg"));
        assert!(prompt.contains("Diagnosis: Hypertension Stage 2"));
    }

    #[test]
    fn test_prompt_requests_every_section() {
        let prompt = build_prompt(118, 76, Category::Normal, &PatientSummary::default());
        for key in [
            "\"diet\"",
            "\"foods_to_eat\"",
            "\"foods_to_avoid\"",
            "\"suggested_activities\"",
            "\"stress_management\"",
            "\"techniques\"",
            "\"sleep_recommendations\"",
            "\"hydration_tips\"",
            "\"medical_advice\"",
            "\"warning_signs\"",
        ] {
            assert!(prompt.contains(key), "prompt is missing {}", key);
        }
        assert!(prompt.contains("5. Medical Advice"));
    }
}
