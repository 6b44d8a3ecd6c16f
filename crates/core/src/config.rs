//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the session, predictor and
//! report store. Nothing in this crate reads environment variables; the binary decides where
//! values come from.

use crate::catalog::IntakeCatalog;
use crate::constants::DEFAULT_DATASET_PATH;
use crate::report::ReportStore;
use crate::{IntakeError, IntakeResult};
use std::path::{Path, PathBuf};

/// Intake configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    report_dir: PathBuf,
    dataset_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    save_reports: bool,
}

impl IntakeConfig {
    /// Create a new `IntakeConfig`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidInput` if `report_dir` is empty.
    pub fn new(
        report_dir: PathBuf,
        dataset_path: Option<PathBuf>,
        catalog_path: Option<PathBuf>,
        save_reports: bool,
    ) -> IntakeResult<Self> {
        if report_dir.as_os_str().is_empty() {
            return Err(IntakeError::InvalidInput(
                "report directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            report_dir,
            dataset_path,
            catalog_path,
            save_reports,
        })
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        self.dataset_path.as_deref()
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog_path.as_deref()
    }

    pub fn save_reports(&self) -> bool {
        self.save_reports
    }

    pub fn report_store(&self) -> ReportStore {
        ReportStore::new(self.report_dir.clone())
    }

    /// Loads the configured catalog file, or the built-in catalog when none is configured.
    pub fn load_catalog(&self) -> IntakeResult<IntakeCatalog> {
        match &self.catalog_path {
            Some(path) => IntakeCatalog::from_yaml_file(path),
            None => Ok(IntakeCatalog::builtin()),
        }
    }
}

/// Resolve the dataset path.
///
/// An explicit `override_path` is returned as given, even if it does not exist, so the
/// predictor can report the missing file. Otherwise the default
/// `data/Disease_symptom_and_patient_profile_dataset.csv` is used when present relative to the
/// working directory, and `None` means prediction is disabled.
pub fn resolve_dataset_path(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    let default = PathBuf::from(DEFAULT_DATASET_PATH);
    if default.is_file() {
        Some(default)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_rejects_empty_report_dir() {
        let err = IntakeConfig::new(PathBuf::new(), None, None, true).expect_err("empty dir");
        assert!(matches!(err, IntakeError::InvalidInput(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn test_getters() {
        let cfg = IntakeConfig::new(
            PathBuf::from("out"),
            Some(PathBuf::from("data.csv")),
            None,
            false,
        )
        .unwrap();
        assert_eq!(cfg.report_dir(), Path::new("out"));
        assert_eq!(cfg.dataset_path(), Some(Path::new("data.csv")));
        assert_eq!(cfg.catalog_path(), None);
        assert!(!cfg.save_reports());
        assert_eq!(cfg.report_store().dir(), Path::new("out"));
    }

    #[test]
    fn test_load_catalog_defaults_to_builtin() {
        let cfg = IntakeConfig::new(PathBuf::from("out"), None, None, true).unwrap();
        let catalog = cfg.load_catalog().unwrap();
        assert!(catalog.symptoms().contains("chest_pain"));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.yaml");
        let yaml = IntakeCatalog::builtin()
            .to_yaml()
            .unwrap()
            .replace("display_name: Fever", "display_name: Pyrexia");
        std::fs::write(&path, yaml).unwrap();

        let cfg = IntakeConfig::new(temp.path().to_path_buf(), None, Some(path), true).unwrap();
        let catalog = cfg.load_catalog().unwrap();
        assert_eq!(catalog.symptoms().symptom("fever").display_name, "Pyrexia");
    }

    #[test]
    fn test_resolve_dataset_path_prefers_override() {
        let explicit = PathBuf::from("/nonexistent/data.csv");
        assert_eq!(resolve_dataset_path(Some(explicit.clone())), Some(explicit));
    }
}
