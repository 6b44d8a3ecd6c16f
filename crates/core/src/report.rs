//! Session reports.
//!
//! A finished session is written as one pretty-printed JSON document per session:
//!
//! ```text
//! chats/
//!   medical_chat_20261018_141503.json
//!   medical_chat_20261018_141503_1.json   # second session within the same second
//! ```
//!
//! The document keeps the conversation in asking order and the final assessment:
//!
//! ```json
//! {
//!   "timestamp": "20261018_141503",
//!   "conversation": [{ "question": "What is your age?", "response": 35 }],
//!   "final_assessment": {
//!     "severity": "medium",
//!     "reported_symptoms": ["Fever"],
//!     "predicted_condition": null
//!   }
//! }
//! ```

use crate::constants::{
    REPORT_FILE_EXTENSION, REPORT_FILE_PREFIX, REPORT_NAME_ATTEMPTS, REPORT_TIMESTAMP_FORMAT,
};
use crate::session::{Assessment, CompletedSession};
use crate::{IntakeError, IntakeResult};
use intake_types::AnswerValue;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub response: AnswerValue,
}

/// The persisted form of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntakeReport {
    pub timestamp: String,
    pub conversation: Vec<ConversationEntry>,
    pub final_assessment: Assessment,
}

impl IntakeReport {
    pub fn from_session(session: &CompletedSession) -> Self {
        Self {
            timestamp: session
                .started_at
                .format(REPORT_TIMESTAMP_FORMAT)
                .to_string(),
            conversation: session
                .record
                .exchanges()
                .iter()
                .map(|e| ConversationEntry {
                    question: e.prompt.clone(),
                    response: e.answer.clone(),
                })
                .collect(),
            final_assessment: session.assessment.clone(),
        }
    }

    pub fn to_json(&self) -> IntakeResult<String> {
        serde_json::to_string_pretty(self).map_err(IntakeError::Serialization)
    }

    pub fn from_json(json: &str) -> IntakeResult<Self> {
        serde_json::from_str(json).map_err(IntakeError::Deserialization)
    }
}

/// Writes reports into one directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `report` and returns the path written.
    ///
    /// The report directory is created if missing. The file is named after the report
    /// timestamp; if that name is taken, `_1`, `_2`, … suffixes are tried. Existing files are
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if:
    /// - the report directory cannot be created (`ReportDirCreation`),
    /// - serialisation fails,
    /// - no free filename is found after a few attempts, or writing fails (`ReportWrite`).
    pub fn save(&self, report: &IntakeReport) -> IntakeResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(IntakeError::ReportDirCreation)?;
        let json = report.to_json()?;

        for attempt in 0..REPORT_NAME_ATTEMPTS {
            let candidate = self.dir.join(report_file_name(&report.timestamp, attempt));

            let file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(IntakeError::ReportWrite(e)),
            };

            write_or_discard(file, &candidate, json.as_bytes())?;
            tracing::info!("saved intake report to {}", candidate.display());
            return Ok(candidate);
        }

        Err(IntakeError::ReportWrite(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "failed to allocate a unique report filename after {} attempts",
                REPORT_NAME_ATTEMPTS
            ),
        )))
    }

    pub fn load(&self, path: &Path) -> IntakeResult<IntakeReport> {
        let json = fs::read_to_string(path).map_err(IntakeError::ReportRead)?;
        IntakeReport::from_json(&json)
    }
}

/// Writes `bytes` into a freshly created report file. On failure the partial file is removed
/// so no truncated report is left behind and its name is free again.
fn write_or_discard(mut file: impl Write, path: &Path, bytes: &[u8]) -> IntakeResult<()> {
    let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) else {
        return Ok(());
    };

    drop(file);
    if let Err(cleanup) = fs::remove_file(path) {
        tracing::warn!(
            "failed to remove partial report {}: {}",
            path.display(),
            cleanup
        );
    }
    Err(IntakeError::ReportWrite(e))
}

fn report_file_name(timestamp: &str, attempt: usize) -> String {
    if attempt == 0 {
        format!("{}{}.{}", REPORT_FILE_PREFIX, timestamp, REPORT_FILE_EXTENSION)
    } else {
        format!(
            "{}{}_{}.{}",
            REPORT_FILE_PREFIX, timestamp, attempt, REPORT_FILE_EXTENSION
        )
    }
}
