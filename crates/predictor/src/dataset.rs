//! Patient-profile dataset loading.
//!
//! The dataset is a CSV file with one patient per row. Only the label column and the eight
//! feature columns are read; any other column is ignored.
//!
//! ```text
//! Disease,Fever,Cough,Fatigue,Difficulty Breathing,Age,Gender,Blood Pressure,Cholesterol Level,Outcome Variable
//! Influenza,Yes,No,Yes,Yes,19,Female,Low,Normal,Positive
//! ```
//!
//! Rows are encoded exactly like a session's answers (see [`FeatureVector`]) so that a model
//! trained here sees the same numbers at prediction time.

use crate::error::{DatasetError, DatasetResult};
use intake_core::predictor::{FeatureVector, FEATURE_COUNT};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub type Sample = [f64; FEATURE_COUNT];

#[derive(Debug, serde::Deserialize)]
struct DatasetRow {
    #[serde(rename = "Disease")]
    disease: String,
    #[serde(rename = "Fever")]
    fever: String,
    #[serde(rename = "Cough")]
    cough: String,
    #[serde(rename = "Fatigue")]
    fatigue: String,
    #[serde(rename = "Difficulty Breathing")]
    difficulty_breathing: String,
    #[serde(rename = "Age")]
    age: i64,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Blood Pressure")]
    blood_pressure: String,
    #[serde(rename = "Cholesterol Level")]
    cholesterol_level: String,
}

impl DatasetRow {
    fn encode(&self, row: usize) -> DatasetResult<FeatureVector> {
        Ok(FeatureVector {
            fever: yes_no(row, "Fever", &self.fever)?,
            cough: yes_no(row, "Cough", &self.cough)?,
            fatigue: yes_no(row, "Fatigue", &self.fatigue)?,
            difficulty_breathing: yes_no(row, "Difficulty Breathing", &self.difficulty_breathing)?,
            age: self.age,
            gender: gender(row, &self.gender)?,
            blood_pressure: level(row, "Blood Pressure", &self.blood_pressure)?,
            cholesterol_level: level(row, "Cholesterol Level", &self.cholesterol_level)?,
        })
    }
}

fn unknown(row: usize, column: &'static str, value: &str) -> DatasetError {
    DatasetError::UnknownCategory {
        row,
        column,
        value: value.to_string(),
    }
}

fn yes_no(row: usize, column: &'static str, value: &str) -> DatasetResult<u8> {
    match value.to_ascii_lowercase().as_str() {
        "yes" => Ok(1),
        "no" => Ok(0),
        _ => Err(unknown(row, column, value)),
    }
}

fn gender(row: usize, value: &str) -> DatasetResult<u8> {
    match value.to_ascii_lowercase().as_str() {
        "male" => Ok(1),
        "female" => Ok(0),
        _ => Err(unknown(row, "Gender", value)),
    }
}

fn level(row: usize, column: &'static str, value: &str) -> DatasetResult<u8> {
    match value.to_ascii_lowercase().as_str() {
        "low" => Ok(0),
        "normal" => Ok(1),
        "high" => Ok(2),
        _ => Err(unknown(row, column, value)),
    }
}

/// Encoded samples with their labels as indices into a sorted class list.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    targets: Vec<usize>,
    classes: Vec<String>,
}

impl Dataset {
    /// Load a dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Open` if the file cannot be opened, and otherwise the same errors
    /// as [`Dataset::from_reader`].
    pub fn from_path(path: &Path) -> DatasetResult<Self> {
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            "loaded {} patient rows ({} conditions) from {}",
            dataset.len(),
            dataset.classes.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse a dataset from CSV text with a header row.
    ///
    /// # Errors
    ///
    /// - `DatasetError::Csv` if a required column is missing or a field cannot be parsed,
    /// - `DatasetError::UnknownCategory` for a categorical value outside its vocabulary,
    /// - `DatasetError::Empty` if there are no data rows.
    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for (index, record) in csv.deserialize::<DatasetRow>().enumerate() {
            let row = record?;
            // Header is line 1.
            let features = row.encode(index + 2)?;
            samples.push(features.to_array());
            labels.push(row.disease);
        }

        if samples.is_empty() {
            return Err(DatasetError::Empty);
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let targets = labels
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();

        Ok(Self {
            samples,
            targets,
            classes,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Disease,Fever,Cough,Fatigue,Difficulty Breathing,Age,Gender,Blood Pressure,Cholesterol Level,Outcome Variable\n";

    #[test]
    fn test_encodes_rows_and_sorts_classes() {
        let csv = format!(
            "{HEADER}Influenza,Yes,No,Yes,Yes,19,Female,Low,Normal,Positive\n\
             Asthma,No,Yes,No,Yes,25,Male,High,High,Negative\n\
             Influenza, yes , no ,no,no,40,male,normal,low,Positive\n"
        );
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.classes(), ["Asthma", "Influenza"]);
        assert_eq!(dataset.targets(), [1, 0, 1]);
        assert_eq!(
            dataset.samples()[0],
            [1.0, 0.0, 1.0, 1.0, 19.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(
            dataset.samples()[1],
            [0.0, 1.0, 0.0, 1.0, 25.0, 1.0, 2.0, 2.0]
        );
        assert_eq!(
            dataset.samples()[2],
            [1.0, 0.0, 0.0, 0.0, 40.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_unknown_category_names_row_and_column() {
        let csv = format!(
            "{HEADER}Influenza,Yes,No,Yes,Yes,19,Female,Low,Normal,Positive\n\
             Asthma,No,Yes,No,Yes,25,Male,Very High,High,Negative\n"
        );
        let err = Dataset::from_reader(csv.as_bytes()).expect_err("unknown level");
        match err {
            DatasetError::UnknownCategory { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "Blood Pressure");
                assert_eq!(value, "Very High");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let csv = "Disease,Fever,Cough\nInfluenza,Yes,No\n";
        let err = Dataset::from_reader(csv.as_bytes()).expect_err("missing columns");
        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = Dataset::from_reader(HEADER.as_bytes()).expect_err("no rows");
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("patients.csv");
        std::fs::write(
            &path,
            format!("{HEADER}Influenza,Yes,No,Yes,Yes,19,Female,Low,Normal,Positive\n"),
        )
        .unwrap();

        assert_eq!(Dataset::from_path(&path).unwrap().len(), 1);

        let err = Dataset::from_path(&temp.path().join("missing.csv")).expect_err("missing");
        assert!(matches!(err, DatasetError::Open { .. }));
    }
}
