//! Rule-based severity aggregation.

use crate::answers::AnswerStore;
use crate::catalog::SymptomCatalog;
use intake_types::SeverityTier;

/// Severity and reported symptoms derived from a session's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub severity: SeverityTier,
    /// Display names, in answer order.
    pub reported_symptoms: Vec<String>,
}

/// Folds the answers into a severity tier and the list of reported symptoms.
///
/// A symptom is reported when its id is in `symptoms` and its stored answer is a boolean
/// `yes`. The severity is the highest tier among reported symptoms, `low` when none are.
/// Pure: the same store always aggregates to the same result.
pub fn aggregate(answers: &AnswerStore, symptoms: &SymptomCatalog) -> Aggregation {
    let mut severity = SeverityTier::Low;
    let mut reported_symptoms = Vec::new();

    for (id, answer) in answers.iter() {
        let Some(symptom) = symptoms.get(id.as_str()) else {
            continue;
        };
        if !answer.is_affirmative() {
            continue;
        }
        reported_symptoms.push(symptom.display_name.clone());
        severity = severity.max(symptom.severity);
    }

    Aggregation {
        severity,
        reported_symptoms,
    }
}
