//! The intake session state machine.
//!
//! An [`IntakeSession`] walks the catalog: profile questions first, then each top-level symptom
//! question, expanding an affirmed symptom's follow-ups immediately after it. The next question
//! is always the head of a pending queue, so the phase is a function of what remains to be
//! asked rather than of any external event.
//!
//! ```text
//! AwaitingInitialProfile → AwaitingTopLevelSymptoms ⇄ AwaitingFollowUps(symptom)
//!                        → Aggregating → Done (CompletedSession)
//! ```
//!
//! Follow-ups are expanded depth-first: a follow-up that is itself a catalog symptom and is
//! answered `yes` has its own follow-ups asked next. A question already answered is never asked
//! again, so follow-ups shared by several symptoms are asked once per session.

use crate::aggregation::{aggregate, Aggregation};
use crate::answers::{AnswerStore, Exchange, SessionRecord};
use crate::catalog::{IntakeCatalog, QuestionDefinition, QuestionGroup};
use crate::predictor::{predict_condition, ConditionPredictor, FeatureVector};
use crate::{IntakeError, IntakeResult};
use chrono::{DateTime, Local};
use intake_types::{AnswerValue, CatalogId, SeverityTier};
use std::collections::VecDeque;
use uuid::Uuid;

/// Where the session is in the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    AwaitingInitialProfile,
    AwaitingTopLevelSymptoms,
    /// Asking the follow-ups of the named symptom.
    AwaitingFollowUps { symptom: &'a str },
    /// Every question is answered; [`IntakeSession::finish`] is the only step left.
    Aggregating,
}

#[derive(Debug, Clone)]
enum Stage {
    Profile,
    Symptom,
    FollowUp { trigger: CatalogId },
}

#[derive(Debug, Clone)]
struct PendingQuestion {
    id: CatalogId,
    stage: Stage,
}

/// Final outcome of a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Assessment {
    pub severity: SeverityTier,
    pub reported_symptoms: Vec<String>,
    pub predicted_condition: Option<String>,
}

/// One user's questionnaire, from the first profile question to the last follow-up.
#[derive(Debug)]
pub struct IntakeSession<'c> {
    catalog: &'c IntakeCatalog,
    session_id: Uuid,
    started_at: DateTime<Local>,
    pending: VecDeque<PendingQuestion>,
    answers: AnswerStore,
    record: SessionRecord,
}

impl<'c> IntakeSession<'c> {
    /// Starts a session over `catalog` with every profile and top-level symptom question
    /// queued in catalog order.
    pub fn new(catalog: &'c IntakeCatalog) -> Self {
        Self::with_start_time(catalog, Local::now())
    }

    /// Starts a session with an explicit start time, which becomes the report timestamp.
    pub fn with_start_time(catalog: &'c IntakeCatalog, started_at: DateTime<Local>) -> Self {
        let questions = catalog.questions();
        let profile = questions
            .group(QuestionGroup::Profile)
            .iter()
            .map(|q| PendingQuestion {
                id: q.id.clone(),
                stage: Stage::Profile,
            });
        let symptoms = questions
            .group(QuestionGroup::Symptom)
            .iter()
            .map(|q| PendingQuestion {
                id: q.id.clone(),
                stage: Stage::Symptom,
            });

        let session = Self {
            catalog,
            session_id: Uuid::new_v4(),
            started_at,
            pending: profile.chain(symptoms).collect(),
            answers: AnswerStore::new(),
            record: SessionRecord::new(),
        };
        tracing::info!(
            session_id = %session.session_id,
            "intake session started with {} queued questions",
            session.pending.len()
        );
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn catalog(&self) -> &'c IntakeCatalog {
        self.catalog
    }

    /// The question to ask next, or `None` once every question has been answered.
    pub fn current_question(&self) -> Option<&'c QuestionDefinition> {
        self.pending
            .front()
            .map(|p| self.catalog.questions().question(p.id.as_str()))
    }

    pub fn phase(&self) -> Phase<'_> {
        match self.pending.front().map(|p| &p.stage) {
            None => Phase::Aggregating,
            Some(Stage::Profile) => Phase::AwaitingInitialProfile,
            Some(Stage::Symptom) => Phase::AwaitingTopLevelSymptoms,
            Some(Stage::FollowUp { trigger }) => Phase::AwaitingFollowUps {
                symptom: trigger.as_str(),
            },
        }
    }

    /// Number of questions still queued. Follow-ups join the queue only once triggered.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Validates `raw` as the answer to the current question and advances the session.
    ///
    /// On a validation failure nothing changes and the same question stays current, so the
    /// caller can show the error and ask again as many times as it takes.
    ///
    /// # Errors
    ///
    /// - `IntakeError::Validation` if `raw` is not an acceptable answer,
    /// - `IntakeError::NoPendingQuestion` if every question has already been answered.
    pub fn answer(&mut self, raw: &str) -> IntakeResult<AnswerValue> {
        let Some(question) = self.current_question() else {
            return Err(IntakeError::NoPendingQuestion);
        };
        let value = question.answer_type.validate(raw)?;

        let Some(pending) = self.pending.pop_front() else {
            return Err(IntakeError::NoPendingQuestion);
        };
        self.answers.insert(pending.id.clone(), value.clone())?;
        self.record.push(Exchange {
            question_id: pending.id.clone(),
            prompt: question.prompt.clone(),
            answer: value.clone(),
        });
        tracing::debug!(
            session_id = %self.session_id,
            question = %pending.id,
            "answered {}",
            value
        );

        if value.is_affirmative() {
            self.queue_follow_ups(&pending.id);
        }
        self.skip_answered();

        Ok(value)
    }

    /// Puts the follow-ups of `symptom` at the front of the queue, in catalog order.
    fn queue_follow_ups(&mut self, symptom: &CatalogId) {
        let follow_ups = self.catalog.follow_ups_of(symptom.as_str());
        for id in follow_ups.iter().rev() {
            if self.answers.contains(id.as_str()) {
                continue;
            }
            self.pending.push_front(PendingQuestion {
                id: id.clone(),
                stage: Stage::FollowUp {
                    trigger: symptom.clone(),
                },
            });
        }
    }

    /// Drops queued questions that were already answered through another symptom.
    fn skip_answered(&mut self) {
        while let Some(next) = self.pending.front() {
            if !self.answers.contains(next.id.as_str()) {
                break;
            }
            tracing::debug!(
                session_id = %self.session_id,
                question = %next.id,
                "skipping question answered earlier in the session"
            );
            self.pending.pop_front();
        }
    }

    /// Aggregates the answers and, when symptoms were reported, asks `predictor` for a
    /// condition.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Incomplete` if questions are still pending. The session is
    /// consumed either way, so check [`is_complete`](Self::is_complete) first.
    pub fn finish(
        self,
        predictor: Option<&dyn ConditionPredictor>,
    ) -> IntakeResult<CompletedSession> {
        if !self.pending.is_empty() {
            return Err(IntakeError::Incomplete {
                remaining: self.pending.len(),
            });
        }

        let Aggregation {
            severity,
            reported_symptoms,
        } = aggregate(&self.answers, self.catalog.symptoms());

        let predicted_condition = if reported_symptoms.is_empty() {
            None
        } else {
            predict_condition(predictor, &FeatureVector::from_answers(&self.answers))
        };

        tracing::info!(
            session_id = %self.session_id,
            severity = %severity,
            reported = reported_symptoms.len(),
            predicted = predicted_condition.is_some(),
            "intake session assessed"
        );

        Ok(CompletedSession {
            session_id: self.session_id,
            started_at: self.started_at,
            answers: self.answers,
            record: self.record,
            assessment: Assessment {
                severity,
                reported_symptoms,
                predicted_condition,
            },
        })
    }
}

/// A finished session: the `Done` state.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Local>,
    pub answers: AnswerStore,
    pub record: SessionRecord,
    pub assessment: Assessment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::PredictorError;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    const PROFILE: [&str; 4] = ["35", "f", "normal", "h"];

    struct CountingPredictor {
        calls: Cell<usize>,
        outcome: Result<Option<&'static str>, ()>,
    }

    impl CountingPredictor {
        fn returning(outcome: Result<Option<&'static str>, ()>) -> Self {
            Self {
                calls: Cell::new(0),
                outcome,
            }
        }
    }

    impl ConditionPredictor for CountingPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<Option<String>, PredictorError> {
            self.calls.set(self.calls.get() + 1);
            match self.outcome {
                Ok(label) => Ok(label.map(str::to_string)),
                Err(()) => Err(PredictorError::Failed("boom".into())),
            }
        }
    }

    /// Answers the profile, then feeds `answers` in order.
    fn run<'c>(catalog: &'c IntakeCatalog, answers: &[&str]) -> IntakeSession<'c> {
        let mut session = IntakeSession::new(catalog);
        for raw in PROFILE.iter().chain(answers) {
            session.answer(raw).expect("scripted answer should be valid");
        }
        session
    }

    fn asked(session: &IntakeSession<'_>) -> Vec<String> {
        session.record().question_ids().map(str::to_string).collect()
    }

    #[test]
    fn test_profile_is_asked_first_in_order() {
        let catalog = IntakeCatalog::builtin();
        let mut session = IntakeSession::new(&catalog);

        assert_eq!(session.phase(), Phase::AwaitingInitialProfile);
        assert_eq!(session.current_question().unwrap().prompt, "What is your age?");
        for raw in PROFILE {
            assert_eq!(session.phase(), Phase::AwaitingInitialProfile);
            session.answer(raw).unwrap();
        }
        assert_eq!(session.phase(), Phase::AwaitingTopLevelSymptoms);
        assert_eq!(session.current_question().unwrap().id.as_str(), "fever");

        assert_eq!(session.answers().get("age"), Some(&AnswerValue::Number(35)));
        assert_eq!(
            session.answers().get("gender"),
            Some(&AnswerValue::Text("female".into()))
        );
        assert_eq!(
            session.answers().get("cholesterol"),
            Some(&AnswerValue::Text("high".into()))
        );
    }

    #[test]
    fn test_invalid_answer_does_not_advance() {
        let catalog = IntakeCatalog::builtin();
        let mut session = IntakeSession::new(&catalog);

        for bad in ["150", "-1", "abc", ""] {
            let err = session.answer(bad).expect_err("should reject");
            assert!(matches!(err, IntakeError::Validation(_)));
        }
        assert_eq!(session.current_question().unwrap().id.as_str(), "age");
        assert!(session.record().is_empty());

        session.answer("120").unwrap();
        assert_eq!(session.current_question().unwrap().id.as_str(), "gender");
    }

    #[test]
    fn test_no_symptoms_is_low_and_predictor_not_called() {
        let catalog = IntakeCatalog::builtin();
        let session = run(&catalog, &["no", "no", "no"]);
        assert_eq!(session.phase(), Phase::Aggregating);
        assert_eq!(
            asked(&session),
            ["age", "gender", "blood_pressure", "cholesterol", "fever", "cough", "headache"]
        );

        let predictor = CountingPredictor::returning(Ok(Some("Common Cold")));
        let done = session.finish(Some(&predictor)).unwrap();
        assert_eq!(done.assessment.severity, SeverityTier::Low);
        assert!(done.assessment.reported_symptoms.is_empty());
        assert_eq!(done.assessment.predicted_condition, None);
        assert_eq!(predictor.calls.get(), 0);
    }

    #[test]
    fn test_headache_follow_ups_follow_immediately() {
        let catalog = IntakeCatalog::builtin();
        let mut session = run(&catalog, &["no", "no", "yes"]);

        // Not complete yet: the three headache follow-ups are queued.
        assert_eq!(session.phase(), Phase::AwaitingFollowUps { symptom: "headache" });
        assert_eq!(session.remaining(), 3);
        for raw in ["no", "no", "no"] {
            session.answer(raw).unwrap();
        }

        let ids = asked(&session);
        let at = ids.iter().position(|i| i == "headache").unwrap();
        assert_eq!(
            ids[at + 1..],
            ["vision_changes", "nausea", "sensitivity_to_light"]
        );

        let done = session.finish(None).unwrap();
        assert_eq!(done.assessment.severity, SeverityTier::Medium);
        assert_eq!(done.assessment.reported_symptoms, ["Headache"]);
    }

    #[test]
    fn test_negative_symptom_skips_follow_ups() {
        let catalog = IntakeCatalog::builtin();
        let session = run(&catalog, &["yes", "no", "no", "no", "no", "no"]);
        let ids = asked(&session);

        assert_eq!(&ids[4..8], ["fever", "chills", "body_aches", "fatigue"]);
        for follow_up in catalog.follow_ups_of("cough") {
            assert!(!ids.contains(&follow_up.to_string()));
        }
        for follow_up in catalog.follow_ups_of("headache") {
            assert!(!ids.contains(&follow_up.to_string()));
        }
        assert!(session.is_complete());
    }

    #[test]
    fn test_chest_pain_expands_depth_first_and_dedupes() {
        let catalog = IntakeCatalog::builtin();
        let mut session = IntakeSession::new(&catalog);
        for raw in PROFILE {
            session.answer(raw).unwrap();
        }
        session.answer("no").unwrap(); // fever
        session.answer("yes").unwrap(); // cough
        assert_eq!(session.phase(), Phase::AwaitingFollowUps { symptom: "cough" });
        session.answer("yes").unwrap(); // chest_pain
        assert_eq!(
            session.phase(),
            Phase::AwaitingFollowUps {
                symptom: "chest_pain"
            }
        );
        while session.phase() != Phase::AwaitingTopLevelSymptoms {
            session.answer("no").unwrap();
        }
        session.answer("no").unwrap(); // headache

        let ids = asked(&session);
        assert_eq!(
            ids[4..],
            [
                "fever",
                "cough",
                "chest_pain",
                "shortness_of_breath",
                "sweating",
                "radiating_pain",
                "sputum",
                "headache"
            ]
        );
        assert_eq!(
            ids.iter().filter(|i| *i == "shortness_of_breath").count(),
            1
        );

        let predictor = CountingPredictor::returning(Ok(Some("Bronchitis")));
        let done = session.finish(Some(&predictor)).unwrap();
        assert_eq!(done.assessment.severity, SeverityTier::High);
        assert_eq!(done.assessment.reported_symptoms, ["Cough", "Chest Pain"]);
        assert_eq!(
            done.assessment.predicted_condition.as_deref(),
            Some("Bronchitis")
        );
        assert_eq!(predictor.calls.get(), 1);
    }

    #[test]
    fn test_every_affirmed_follow_up_asked_exactly_once() {
        let catalog = IntakeCatalog::builtin();
        let mut session = IntakeSession::new(&catalog);
        for raw in PROFILE {
            session.answer(raw).unwrap();
        }
        while !session.is_complete() {
            session.answer("y").unwrap();
        }

        let ids = asked(&session);
        for symptom in ["fever", "cough", "headache", "chest_pain"] {
            for follow_up in catalog.follow_ups_of(symptom) {
                let count = ids.iter().filter(|i| *i == follow_up.as_str()).count();
                assert_eq!(count, 1, "{} asked {} times", follow_up, count);
            }
        }
        assert_eq!(ids.len(), catalog.questions().len());
    }

    #[test]
    fn test_predictor_failure_does_not_change_assessment() {
        let catalog = IntakeCatalog::builtin();
        let script = ["yes", "no", "no", "no", "no", "no"];

        let ok = CountingPredictor::returning(Ok(Some("Influenza")));
        let failing = CountingPredictor::returning(Err(()));
        let silent = CountingPredictor::returning(Ok(None));

        let with_label = run(&catalog, &script).finish(Some(&ok)).unwrap();
        let with_error = run(&catalog, &script).finish(Some(&failing)).unwrap();
        let with_none = run(&catalog, &script).finish(Some(&silent)).unwrap();
        let without = run(&catalog, &script).finish(None).unwrap();

        assert_eq!(with_label.assessment.predicted_condition.as_deref(), Some("Influenza"));
        for done in [&with_error, &with_none, &without] {
            assert_eq!(done.assessment.severity, with_label.assessment.severity);
            assert_eq!(
                done.assessment.reported_symptoms,
                with_label.assessment.reported_symptoms
            );
            assert_eq!(done.assessment.predicted_condition, None);
        }
        assert_eq!(failing.calls.get(), 1);
    }

    #[test]
    fn test_finish_early_is_incomplete() {
        let catalog = IntakeCatalog::builtin();
        let mut session = IntakeSession::new(&catalog);
        session.answer("40").unwrap();

        let err = session.finish(None).expect_err("should be incomplete");
        assert!(matches!(err, IntakeError::Incomplete { remaining: 6 }));
    }

    #[test]
    fn test_answer_after_completion_is_rejected() {
        let catalog = IntakeCatalog::builtin();
        let mut session = run(&catalog, &["no", "no", "no"]);
        assert!(session.current_question().is_none());
        assert!(matches!(
            session.answer("yes"),
            Err(IntakeError::NoPendingQuestion)
        ));
    }

    proptest! {
        #[test]
        fn prop_follow_ups_track_symptom_answers(
            script in proptest::collection::vec(any::<bool>(), 1..24),
        ) {
            let catalog = IntakeCatalog::builtin();
            let mut session = IntakeSession::new(&catalog);
            for raw in PROFILE {
                session.answer(raw).unwrap();
            }
            let mut flags = script.iter().cycle();
            while let Some(&yes) = flags.next() {
                if session.is_complete() {
                    break;
                }
                session.answer(if yes { "yes" } else { "no" }).unwrap();
            }
            prop_assert!(session.is_complete());

            let ids = asked(&session);
            let unique: HashSet<&str> = ids.iter().map(String::as_str).collect();
            prop_assert_eq!(unique.len(), ids.len());

            for symptom in catalog.symptoms().iter() {
                let Some(at) = ids.iter().position(|i| i == symptom.id.as_str()) else {
                    continue;
                };
                let affirmed = session
                    .answers()
                    .get(symptom.id.as_str())
                    .is_some_and(|a| a.is_affirmative());
                let top_level =
                    catalog.questions().group_of(symptom.id.as_str()) == Some(QuestionGroup::Symptom);

                for follow_up in &symptom.follow_up_ids {
                    let pos = ids.iter().position(|i| i == follow_up.as_str());
                    if affirmed {
                        prop_assert!(pos.is_some_and(|p| p > at), "{} after {}", follow_up, symptom.id);
                    } else if top_level {
                        prop_assert!(pos.is_none(), "{} asked after negated {}", follow_up, symptom.id);
                    }
                }
            }
        }
    }
}
