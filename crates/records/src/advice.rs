//! Structured content of a recommendation.
//!
//! Field names match the JSON object the text-generation service is asked
//! to produce. Every section and list defaults to empty so a partially
//! filled answer still deserializes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleAdvice {
    pub diet: DietAdvice,
    pub exercise: ExerciseAdvice,
    pub stress_management: StressAdvice,
    pub sleep_hydration: SleepHydrationAdvice,
    pub medical_advice: MedicalAdvice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietAdvice {
    pub recommendations: Vec<String>,
    pub foods_to_eat: Vec<String>,
    pub foods_to_avoid: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseAdvice {
    pub recommendations: Vec<String>,
    pub suggested_activities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressAdvice {
    pub recommendations: Vec<String>,
    pub techniques: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepHydrationAdvice {
    pub sleep_recommendations: Vec<String>,
    pub hydration_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalAdvice {
    pub recommendations: Vec<String>,
    pub warning_signs: Vec<String>,
}

impl LifestyleAdvice {
    /// Sections in display order, each as (title, [(list name, items)]).
    pub fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, &[String])>)> {
        vec![
            (
                "Diet",
                vec![
                    ("Recommendations", self.diet.recommendations.as_slice()),
                    ("Foods to eat", self.diet.foods_to_eat.as_slice()),
                    ("Foods to avoid", self.diet.foods_to_avoid.as_slice()),
                ],
            ),
            (
                "Exercise",
                vec![
                    ("Recommendations", self.exercise.recommendations.as_slice()),
                    ("Suggested activities", self.exercise.suggested_activities.as_slice()),
                ],
            ),
            (
                "Stress Management",
                vec![
                    ("Recommendations", self.stress_management.recommendations.as_slice()),
                    ("Techniques", self.stress_management.techniques.as_slice()),
                ],
            ),
            (
                "Sleep & Hydration",
                vec![
                    ("Sleep", self.sleep_hydration.sleep_recommendations.as_slice()),
                    ("Hydration", self.sleep_hydration.hydration_tips.as_slice()),
                ],
            ),
            (
                "Medical Advice",
                vec![
                    ("Recommendations", self.medical_advice.recommendations.as_slice()),
                    ("Warning signs", self.medical_advice.warning_signs.as_slice()),
                ],
            ),
        ]
    }

    /// Total number of items across every list.
    pub fn item_count(&self) -> usize {
        self.sections()
            .iter()
            .flat_map(|(_, lists)| lists.iter())
            .map(|(_, items)| items.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}
