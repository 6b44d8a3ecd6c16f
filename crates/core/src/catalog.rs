//! Intake catalog: question bank, symptom catalog and severity table.
//!
//! The catalog is immutable configuration, built once at startup and handed to each
//! [`IntakeSession`](crate::IntakeSession) by reference. It is plain data: it can be loaded from
//! and written to YAML ([`IntakeCatalog::from_yaml`], [`IntakeCatalog::to_yaml`]) and the
//! built-in catalog is itself a YAML document compiled into the crate.
//!
//! Construction validates the whole document, so lookups of ids the catalog references cannot
//! miss at runtime. Looking up an id that was never in the catalog is a programming error and
//! panics.

use crate::validation::AnswerType;
use crate::{IntakeError, IntakeResult};
use intake_types::{CatalogId, SeverityTier};
use std::collections::{BTreeMap, HashMap, HashSet};

const BUILTIN_CATALOG_YAML: &str = include_str!("../catalog/builtin.yaml");

/// Problems found while validating a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("question '{0}' is defined more than once")]
    DuplicateQuestion(String),
    #[error("symptom '{0}' is defined more than once")]
    DuplicateSymptom(String),
    #[error("symptom '{symptom}' references unknown follow-up question '{follow_up}'")]
    UnknownFollowUp { symptom: String, follow_up: String },
    #[error("question '{0}' decides a symptom and must be boolean")]
    NotBoolean(String),
    #[error("question '{id}' has an empty number range ({min} > {max})")]
    InvalidRange { id: String, min: i64, max: i64 },
    #[error("question '{0}' has no choices")]
    NoChoices(String),
    #[error("{0} cannot be empty")]
    EmptyText(String),
    #[error("no advisory message for severity '{0}'")]
    MissingAdvisory(SeverityTier),
}

/// Which part of the questionnaire a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionGroup {
    /// Always asked, in order, before any symptom.
    Profile,
    /// Top-level symptom questions, asked in order after the profile.
    Symptom,
    /// Only asked when a triggering symptom is affirmed.
    FollowUp,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionDefinition {
    pub id: CatalogId,
    pub prompt: String,
    pub answer_type: AnswerType,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SymptomDefinition {
    pub id: CatalogId,
    pub display_name: String,
    pub severity: SeverityTier,
    /// Follow-up question ids, asked in this order.
    #[serde(default)]
    pub follow_up_ids: Vec<CatalogId>,
}

/// Serialisable shape of a catalog, as found in YAML.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogDocument {
    pub profile: Vec<QuestionDefinition>,
    pub symptoms: Vec<QuestionDefinition>,
    #[serde(default)]
    pub follow_ups: Vec<QuestionDefinition>,
    pub symptom_catalog: Vec<SymptomDefinition>,
    pub advisories: BTreeMap<SeverityTier, String>,
}

/// Question id → prompt text and answer type, grouped by questionnaire stage.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    profile: Vec<QuestionDefinition>,
    symptoms: Vec<QuestionDefinition>,
    follow_ups: Vec<QuestionDefinition>,
    index: HashMap<CatalogId, (QuestionGroup, usize)>,
}

impl QuestionBank {
    fn new(
        profile: Vec<QuestionDefinition>,
        symptoms: Vec<QuestionDefinition>,
        follow_ups: Vec<QuestionDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();
        let groups = [
            (QuestionGroup::Profile, &profile),
            (QuestionGroup::Symptom, &symptoms),
            (QuestionGroup::FollowUp, &follow_ups),
        ];

        for (group, questions) in groups {
            for (pos, question) in questions.iter().enumerate() {
                validate_question(question)?;
                if index.insert(question.id.clone(), (group, pos)).is_some() {
                    return Err(CatalogError::DuplicateQuestion(question.id.to_string()));
                }
            }
        }

        Ok(Self {
            profile,
            symptoms,
            follow_ups,
            index,
        })
    }

    pub fn get(&self, id: &str) -> Option<&QuestionDefinition> {
        let (group, pos) = self.index.get(id)?;
        self.group(*group).get(*pos)
    }

    /// Returns the question with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the bank. Every id the catalog itself references is checked
    /// during construction, so a miss means the caller invented an id.
    pub fn question(&self, id: &str) -> &QuestionDefinition {
        match self.get(id) {
            Some(question) => question,
            None => panic!("question '{}' is not in the question bank", id),
        }
    }

    pub fn group_of(&self, id: &str) -> Option<QuestionGroup> {
        self.index.get(id).map(|(group, _)| *group)
    }

    /// Questions of one group in asking order.
    pub fn group(&self, group: QuestionGroup) -> &[QuestionDefinition] {
        match group {
            QuestionGroup::Profile => &self.profile,
            QuestionGroup::Symptom => &self.symptoms,
            QuestionGroup::FollowUp => &self.follow_ups,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate_question(question: &QuestionDefinition) -> Result<(), CatalogError> {
    if question.prompt.trim().is_empty() {
        return Err(CatalogError::EmptyText(format!(
            "prompt of question '{}'",
            question.id
        )));
    }

    match &question.answer_type {
        AnswerType::Number { min, max, .. } if min > max => Err(CatalogError::InvalidRange {
            id: question.id.to_string(),
            min: *min,
            max: *max,
        }),
        AnswerType::EnumeratedText { choices } if choices.is_empty() => {
            Err(CatalogError::NoChoices(question.id.to_string()))
        }
        _ => Ok(()),
    }
}

/// Symptom id → display name, severity tier and follow-up ids.
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<SymptomDefinition>,
    index: HashMap<CatalogId, usize>,
}

impl SymptomCatalog {
    fn new(symptoms: Vec<SymptomDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();
        for (pos, symptom) in symptoms.iter().enumerate() {
            if symptom.display_name.trim().is_empty() {
                return Err(CatalogError::EmptyText(format!(
                    "display name of symptom '{}'",
                    symptom.id
                )));
            }
            if index.insert(symptom.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateSymptom(symptom.id.to_string()));
            }
        }
        Ok(Self { symptoms, index })
    }

    pub fn get(&self, id: &str) -> Option<&SymptomDefinition> {
        self.index.get(id).map(|pos| &self.symptoms[*pos])
    }

    /// Returns the symptom with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a catalog symptom.
    pub fn symptom(&self, id: &str) -> &SymptomDefinition {
        match self.get(id) {
            Some(symptom) => symptom,
            None => panic!("symptom '{}' is not in the symptom catalog", id),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomDefinition> {
        self.symptoms.iter()
    }
}

/// Severity tier → advisory message shown in the final report.
#[derive(Debug, Clone)]
pub struct SeverityTable {
    advisories: BTreeMap<SeverityTier, String>,
}

impl SeverityTable {
    fn new(advisories: BTreeMap<SeverityTier, String>) -> Result<Self, CatalogError> {
        for tier in SeverityTier::ALL {
            match advisories.get(&tier) {
                None => return Err(CatalogError::MissingAdvisory(tier)),
                Some(text) if text.trim().is_empty() => {
                    return Err(CatalogError::EmptyText(format!("advisory for '{}'", tier)))
                }
                Some(_) => {}
            }
        }
        Ok(Self { advisories })
    }

    pub fn advisory(&self, tier: SeverityTier) -> &str {
        // Every tier is present after construction.
        self.advisories.get(&tier).map(String::as_str).unwrap_or_default()
    }
}

/// The complete, validated intake catalog.
#[derive(Debug, Clone)]
pub struct IntakeCatalog {
    questions: QuestionBank,
    symptoms: SymptomCatalog,
    severity: SeverityTable,
}

impl IntakeCatalog {
    /// Validates a catalog document and builds the lookup tables.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if:
    /// - a question or symptom id is defined twice,
    /// - a follow-up id does not name a question,
    /// - a symptom-group question, or any question deciding a catalog symptom, is not boolean,
    /// - a number range is empty or an enumerated question has no choices,
    /// - a prompt, display name or advisory is empty, or a tier has no advisory.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let questions =
            QuestionBank::new(document.profile, document.symptoms, document.follow_ups)?;
        let symptoms = SymptomCatalog::new(document.symptom_catalog)?;
        let severity = SeverityTable::new(document.advisories)?;

        for question in questions.group(QuestionGroup::Symptom) {
            if question.answer_type != AnswerType::Boolean {
                return Err(CatalogError::NotBoolean(question.id.to_string()));
            }
        }

        for symptom in symptoms.iter() {
            if let Some(question) = questions.get(symptom.id.as_str()) {
                if question.answer_type != AnswerType::Boolean {
                    return Err(CatalogError::NotBoolean(question.id.to_string()));
                }
            }
            for follow_up in &symptom.follow_up_ids {
                if questions.get(follow_up.as_str()).is_none() {
                    return Err(CatalogError::UnknownFollowUp {
                        symptom: symptom.id.to_string(),
                        follow_up: follow_up.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            questions,
            symptoms,
            severity,
        })
    }

    /// The catalog shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails validation; the unit tests load it on every run.
    pub fn builtin() -> Self {
        match Self::from_yaml(BUILTIN_CATALOG_YAML) {
            Ok(catalog) => catalog,
            Err(e) => panic!("built-in intake catalog is invalid: {}", e),
        }
    }

    /// Parses and validates a YAML catalog document.
    pub fn from_yaml(yaml: &str) -> IntakeResult<Self> {
        let document: CatalogDocument =
            serde_yaml::from_str(yaml).map_err(IntakeError::YamlDeserialization)?;
        Ok(Self::from_document(document)?)
    }

    /// Reads and validates a YAML catalog file.
    pub fn from_yaml_file(path: &std::path::Path) -> IntakeResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(IntakeError::CatalogRead)?;
        let catalog = Self::from_yaml(&yaml)?;
        tracing::info!(
            "loaded intake catalog from {} ({} questions)",
            path.display(),
            catalog.questions.len()
        );
        Ok(catalog)
    }

    /// Rebuilds the serialisable document.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            profile: self.questions.profile.clone(),
            symptoms: self.questions.symptoms.clone(),
            follow_ups: self.questions.follow_ups.clone(),
            symptom_catalog: self.symptoms.symptoms.clone(),
            advisories: self.severity.advisories.clone(),
        }
    }

    pub fn to_yaml(&self) -> IntakeResult<String> {
        serde_yaml::to_string(&self.to_document()).map_err(IntakeError::YamlSerialization)
    }

    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }

    pub fn symptoms(&self) -> &SymptomCatalog {
        &self.symptoms
    }

    pub fn severity(&self) -> &SeverityTable {
        &self.severity
    }

    /// Follow-up ids of `id` if it is a catalog symptom, otherwise an empty slice.
    pub fn follow_ups_of(&self, id: &str) -> &[CatalogId] {
        self.symptoms
            .get(id)
            .map(|s| s.follow_up_ids.as_slice())
            .unwrap_or_default()
    }

    /// Ids of every question that can ever be asked, deduplicated, for diagnostics.
    pub fn reachable_question_ids(&self) -> HashSet<&str> {
        let mut reachable: HashSet<&str> = self
            .questions
            .group(QuestionGroup::Profile)
            .iter()
            .chain(self.questions.group(QuestionGroup::Symptom))
            .map(|q| q.id.as_str())
            .collect();

        let mut frontier: Vec<&str> = reachable.iter().copied().collect();
        while let Some(id) = frontier.pop() {
            for follow_up in self.follow_ups_of(id) {
                if reachable.insert(follow_up.as_str()) {
                    frontier.push(follow_up.as_str());
                }
            }
        }
        reachable
    }
}
