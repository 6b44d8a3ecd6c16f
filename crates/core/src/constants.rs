//! Constants used throughout the intake core crate.
//!
//! Question identifiers that the feature vector reads, default locations and the report file
//! naming live here so the catalog, predictor adapter and report store stay consistent.

/// Default directory for saved session reports when no explicit directory is configured.
pub const DEFAULT_REPORT_DIR: &str = "chats";

/// Default location of the patient-profile dataset used to train the predictor.
pub const DEFAULT_DATASET_PATH: &str = "data/Disease_symptom_and_patient_profile_dataset.csv";

/// Filename prefix for saved session reports.
pub const REPORT_FILE_PREFIX: &str = "medical_chat_";

/// Filename extension for saved session reports.
pub const REPORT_FILE_EXTENSION: &str = "json";

/// `chrono` format of the report timestamp, also used in the report filename.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Number of filenames tried before giving up when a report name is already taken.
pub const REPORT_NAME_ATTEMPTS: usize = 5;

/// Question id of the patient's age.
pub const AGE_ID: &str = "age";

/// Question id of the patient's gender.
pub const GENDER_ID: &str = "gender";

/// Question id of the blood pressure level.
pub const BLOOD_PRESSURE_ID: &str = "blood_pressure";

/// Question id of the cholesterol level.
pub const CHOLESTEROL_ID: &str = "cholesterol";

/// Question id of the fever symptom.
pub const FEVER_ID: &str = "fever";

/// Question id of the cough symptom.
pub const COUGH_ID: &str = "cough";

/// Question id of the fatigue follow-up.
pub const FATIGUE_ID: &str = "fatigue";

/// Question id feeding the "Difficulty Breathing" feature.
pub const DIFFICULTY_BREATHING_ID: &str = "shortness_of_breath";

/// Age used in the feature vector when the age question was never answered.
pub const DEFAULT_AGE: i64 = 30;
