//! The blood-pressure decision table.
//!
//! Rules are evaluated top to bottom and the first match wins. Order is
//! significant: 125/85 satisfies both the Stage 1 diastolic band and the
//! Elevated systolic band, and must land in Stage 1.

use crate::category::Category;

/// A single row of the decision table.
struct Rule {
    category: Category,
    matches: fn(i32, i32) -> bool,
}

/// Rows in evaluation order. Anything that falls through is `Normal`.
const RULES: [Rule; 4] = [
    Rule {
        category: Category::HypertensiveCrisis,
        matches: |systolic, diastolic| systolic > 180 || diastolic > 120,
    },
    Rule {
        category: Category::HypertensionStage2,
        matches: |systolic, diastolic| systolic >= 140 || diastolic >= 90,
    },
    Rule {
        category: Category::HypertensionStage1,
        matches: |systolic, diastolic| {
            (130..=139).contains(&systolic) || (80..=89).contains(&diastolic)
        },
    },
    Rule {
        category: Category::Elevated,
        matches: |systolic, diastolic| (120..=129).contains(&systolic) && diastolic < 80,
    },
];

/// Classify a reading.
///
/// Total and deterministic for every `i32` pair; no plausibility checks
/// happen here.
pub fn classify(systolic: i32, diastolic: i32) -> Category {
    RULES
        .iter()
        .find(|rule| (rule.matches)(systolic, diastolic))
        .map(|rule| rule.category)
        .unwrap_or(Category::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_on_either_value() {
        assert_eq!(classify(181, 80), Category::HypertensiveCrisis);
        assert_eq!(classify(121, 121), Category::HypertensiveCrisis);
        assert_eq!(classify(90, 130), Category::HypertensiveCrisis);
    }

    #[test]
    fn test_stage_two_boundaries() {
        assert_eq!(classify(140, 70), Category::HypertensionStage2);
        assert_eq!(classify(110, 90), Category::HypertensionStage2);
        // 180 is not above 180, but it is well above 140
        assert_eq!(classify(180, 80), Category::HypertensionStage2);
        // diastolic 120 is not above 120, but it is at least 90
        assert_eq!(classify(121, 120), Category::HypertensionStage2);
    }

    #[test]
    fn test_stage_one_bands() {
        assert_eq!(classify(139, 70), Category::HypertensionStage1);
        assert_eq!(classify(130, 60), Category::HypertensionStage1);
        assert_eq!(classify(110, 80), Category::HypertensionStage1);
        assert_eq!(classify(110, 89), Category::HypertensionStage1);
    }

    #[test]
    fn test_diastolic_band_beats_elevated_band() {
        assert_eq!(classify(125, 85), Category::HypertensionStage1);
    }

    #[test]
    fn test_elevated_and_normal() {
        assert_eq!(classify(125, 75), Category::Elevated);
        assert_eq!(classify(120, 79), Category::Elevated);
        assert_eq!(classify(129, 0), Category::Elevated);
        assert_eq!(classify(119, 75), Category::Normal);
        assert_eq!(classify(100, 60), Category::Normal);
    }

    #[test]
    fn test_total_over_extreme_inputs() {
        assert_eq!(classify(i32::MIN, i32::MIN), Category::Normal);
        assert_eq!(classify(i32::MAX, i32::MIN), Category::HypertensiveCrisis);
        assert_eq!(classify(-5, 85), Category::HypertensionStage1);
        assert_eq!(classify(0, 0), Category::Normal);
    }
}
