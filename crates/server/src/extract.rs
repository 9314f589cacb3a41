//! Pulling the advice object out of free-form model output.
//!
//! Models tend to wrap JSON in a fenced block or surround it with prose. The
//! lookup order is a ```json fence, then any fence whose body is an object,
//! then the span from the first `{` to the last `}`.

use records::LifestyleAdvice;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Response contains no JSON object")]
    NoJsonObject,

    #[error("Response JSON does not match the advice structure: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response contains no recommendations")]
    Empty,
}

/// Locate the JSON object text inside `text`.
pub fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(body) = fenced_block(text, "```json") {
        return Some(body);
    }
    if let Some(body) = fenced_block(text, "```").filter(|b| b.starts_with('{')) {
        return Some(body);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extract and deserialize advice. Advice with no items at all is rejected.
pub fn parse_advice(text: &str) -> Result<LifestyleAdvice, ExtractError> {
    let block = extract_json_block(text).ok_or(ExtractError::NoJsonObject)?;
    let advice: LifestyleAdvice = serde_json::from_str(block)?;
    if advice.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(advice)
}

fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let open = lowered.find(opener)?;
    let body_start = open + opener.len();
    let close = lowered[body_start..].find("```")? + body_start;
    Some(text[body_start..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADVICE: &str = r#"{
        "diet": {"recommendations": ["Cut sodium"], "foods_to_eat": ["Oats"], "foods_to_avoid": ["Chips"]},
        "exercise": {"recommendations": ["Walk daily"], "suggested_activities": ["Cycling"]},
        "stress_management": {"recommendations": ["Rest"], "techniques": ["Box breathing"]},
        "sleep_hydration": {"sleep_recommendations": ["7-9 hours"], "hydration_tips": ["Water over soda"]},
        "medical_advice": {"recommendations": ["Recheck in a month"], "warning_signs": ["Chest pain"]}
    }"#;

    #[test]
    fn test_json_fence() {
        let text = format!("Here you go:\n```json\n{}\n```\nStay well.", ADVICE);
        let advice = parse_advice(&text).unwrap();
        assert_eq!(advice.diet.foods_to_eat, vec!["Oats"]);
        assert_eq!(advice.medical_advice.warning_signs, vec!["Chest pain"]);
    }

    #[test]
    fn test_uppercase_fence_and_plain_fence() {
        let upper = format!("```JSON\n{}\n```", ADVICE);
        assert!(parse_advice(&upper).is_ok());

        let plain = format!("```\n{}\n```", ADVICE);
        assert!(parse_advice(&plain).is_ok());
    }

    #[test]
    fn test_bare_and_prose_wrapped() {
        assert!(parse_advice(ADVICE).is_ok());

        let wrapped = format!("Sure! {} Let me know if you need more.", ADVICE);
        let advice = parse_advice(&wrapped).unwrap();
        assert_eq!(advice.exercise.suggested_activities, vec!["Cycling"]);
    }

    #[test]
    fn test_partial_sections_default_to_empty() {
        let advice = parse_advice(r#"{"diet": {"recommendations": ["Less salt"]}}"#).unwrap();
        assert_eq!(advice.item_count(), 1);
        assert!(advice.sleep_hydration.hydration_tips.is_empty());
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            parse_advice("I cannot help with that."),
            Err(ExtractError::NoJsonObject)
        ));
        assert!(matches!(
            parse_advice("} backwards {"),
            Err(ExtractError::NoJsonObject)
        ));
        assert!(matches!(
            parse_advice(r#"{"diet": {"recommendations": "not a list"}}"#),
            Err(ExtractError::Malformed(_))
        ));
        assert!(matches!(parse_advice("{}"), Err(ExtractError::Empty)));
    }

    #[test]
    fn test_extract_prefers_json_fence() {
        let text = "{\"ignored\": true}\n```json\n{\"diet\": {}}\n```";
        assert_eq!(extract_json_block(text), Some("{\"diet\": {}}"));
    }
}
