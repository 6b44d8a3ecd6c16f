//! # Intake Predictor
//!
//! Dataset-trained implementation of [`intake_core::ConditionPredictor`].
//!
//! Loads the patient-profile CSV dataset, encodes it the same way a session's answers are
//! encoded, trains a few simple classifiers on a seeded split and answers predictions with the
//! most accurate one. Nothing here is required to run a questionnaire: callers that fail to
//! build a predictor simply run without one.

pub mod constants;
pub mod dataset;
pub mod error;
pub mod models;
pub mod scaler;
pub mod training;

pub use dataset::{Dataset, Sample};
pub use error::{DatasetError, DatasetResult};
pub use training::{train_test_split, DatasetPredictor, ModelScore};
