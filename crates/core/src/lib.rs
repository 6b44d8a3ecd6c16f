//! # Intake Core
//!
//! Core logic of the symptom-intake questionnaire.
//!
//! This crate contains the questionnaire itself and nothing that depends on how it is run:
//! - The intake catalog: question bank, symptom catalog and severity advisories
//! - Input validation for number, yes/no and enumerated answers
//! - The [`IntakeSession`] state machine with follow-up branching
//! - Rule-based severity aggregation
//! - The [`ConditionPredictor`] contract and its feature vector
//! - Session reports and a line-oriented console driver
//!
//! **No training concerns**: how a condition predictor is built belongs in `intake-predictor`,
//! and argument parsing or logging setup belongs in `intake-cli`.

pub mod aggregation;
pub mod answers;
pub mod catalog;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod predictor;
pub mod report;
pub mod session;
pub mod validation;

pub use aggregation::{aggregate, Aggregation};
pub use answers::{AnswerStore, Exchange, SessionRecord};
pub use catalog::{
    CatalogDocument, CatalogError, IntakeCatalog, QuestionBank, QuestionDefinition,
    QuestionGroup, SeverityTable, SymptomCatalog, SymptomDefinition,
};
pub use config::{resolve_dataset_path, IntakeConfig};
pub use console::{run_intake, Console};
pub use error::{IntakeError, IntakeResult};
pub use predictor::{
    predict_condition, ConditionPredictor, FeatureVector, PredictorError, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use report::{ConversationEntry, IntakeReport, ReportStore};
pub use session::{Assessment, CompletedSession, IntakeSession, Phase};
pub use validation::{AnswerType, Choice, ValidationError};

pub use intake_types::{AnswerValue, CatalogId, SeverityTier};
