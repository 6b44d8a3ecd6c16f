//! Condition predictor contract.
//!
//! The session does not know how a condition is predicted. It builds a [`FeatureVector`] from
//! the answers and asks whatever [`ConditionPredictor`] it was given. A missing predictor, a
//! `None` answer and an error all end the same way: no predicted condition.

use crate::answers::AnswerStore;
use crate::constants::{
    AGE_ID, BLOOD_PRESSURE_ID, CHOLESTEROL_ID, COUGH_ID, DEFAULT_AGE, DIFFICULTY_BREATHING_ID,
    FATIGUE_ID, FEVER_ID, GENDER_ID,
};

/// Number of features in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 8;

/// Feature names in [`FeatureVector::to_array`] order, matching the dataset column headers.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Fever",
    "Cough",
    "Fatigue",
    "Difficulty Breathing",
    "Age",
    "Gender",
    "Blood Pressure",
    "Cholesterol Level",
];

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("prediction failed: {0}")]
    Failed(String),
}

/// Something that can guess a condition from a patient profile and symptoms.
///
/// Implementations must be deterministic for a given feature vector within one process.
pub trait ConditionPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<Option<String>, PredictorError>;
}

/// Fixed-shape encoding of the profile and symptom answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "Fever")]
    pub fever: u8,
    #[serde(rename = "Cough")]
    pub cough: u8,
    #[serde(rename = "Fatigue")]
    pub fatigue: u8,
    #[serde(rename = "Difficulty Breathing")]
    pub difficulty_breathing: u8,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Gender")]
    pub gender: u8,
    #[serde(rename = "Blood Pressure")]
    pub blood_pressure: u8,
    #[serde(rename = "Cholesterol Level")]
    pub cholesterol_level: u8,
}

impl FeatureVector {
    /// Builds the feature vector from a session's answers.
    ///
    /// Unanswered symptoms encode as 0, a missing age as 30, a missing or unrecognised level
    /// as 1 (normal), and gender as 1 only for `male`.
    pub fn from_answers(answers: &AnswerStore) -> Self {
        let flag = |id: &str| u8::from(answers.get(id).is_some_and(|a| a.is_affirmative()));
        let text = |id: &str| answers.get(id).and_then(|a| a.as_text()).unwrap_or_default();

        Self {
            fever: flag(FEVER_ID),
            cough: flag(COUGH_ID),
            fatigue: flag(FATIGUE_ID),
            difficulty_breathing: flag(DIFFICULTY_BREATHING_ID),
            age: answers
                .get(AGE_ID)
                .and_then(|a| a.as_number())
                .unwrap_or(DEFAULT_AGE),
            gender: u8::from(text(GENDER_ID).eq_ignore_ascii_case("male")),
            blood_pressure: encode_level(text(BLOOD_PRESSURE_ID)),
            cholesterol_level: encode_level(text(CHOLESTEROL_ID)),
        }
    }

    /// Numeric features in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.fever),
            f64::from(self.cough),
            f64::from(self.fatigue),
            f64::from(self.difficulty_breathing),
            self.age as f64,
            f64::from(self.gender),
            f64::from(self.blood_pressure),
            f64::from(self.cholesterol_level),
        ]
    }
}

/// `low` → 0, `normal` → 1, `high` → 2, anything else → 1.
pub fn encode_level(value: &str) -> u8 {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" => 0,
        "normal" => 1,
        "high" => 2,
        _ => 1,
    }
}

/// Asks `predictor` for a condition, treating every failure as "no prediction".
///
/// Empty labels are discarded. Errors are logged at warn and never propagated.
pub fn predict_condition(
    predictor: Option<&dyn ConditionPredictor>,
    features: &FeatureVector,
) -> Option<String> {
    let predictor = predictor?;
    match predictor.predict(features) {
        Ok(Some(label)) if !label.trim().is_empty() => Some(label),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("condition prediction unavailable: {}", e);
            None
        }
    }
}
