//! Shared value types for the intake workspace.
//!
//! These types sit below the catalog and the session so that the catalog document, the answer
//! store and the predictor all agree on what an identifier, a severity tier and an answer look
//! like.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated intake types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// The identifier was empty or contained only whitespace
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    /// The identifier contained characters outside `[a-z0-9_]`
    #[error("identifier '{0}' contains invalid characters (only 'a'-'z', '0'-'9', '_' allowed)")]
    InvalidIdentifier(String),
    /// The severity name is not one of `low`, `medium`, `high`
    #[error("unknown severity tier '{0}' (expected low, medium or high)")]
    UnknownSeverity(String),
}

/// Identifier of a question or symptom in the intake catalog.
///
/// Identifiers are lowercase ASCII snake case (`shortness_of_breath`). The input is trimmed
/// during construction; anything outside `[a-z0-9_]` is rejected rather than normalised, so a
/// catalog typo surfaces when the catalog is loaded instead of as a silent lookup miss later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogId(String);

impl CatalogId {
    /// Creates a new `CatalogId` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::EmptyIdentifier` for empty or whitespace-only input and
    /// `TypesError::InvalidIdentifier` when any character is outside `[a-z0-9_]`.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyIdentifier);
        }

        let ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'));
        if !ok {
            return Err(TypesError::InvalidIdentifier(trimmed.to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CatalogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CatalogId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for CatalogId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for CatalogId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for CatalogId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CatalogId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Ordered severity tier attached to each symptom.
///
/// The derived ordering is the aggregation order: `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    #[default]
    Low,
    Medium,
    High,
}

impl SeverityTier {
    /// All tiers, lowest first.
    pub const ALL: [SeverityTier; 3] = [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High];

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityTier {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SeverityTier::Low),
            "medium" => Ok(SeverityTier::Medium),
            "high" => Ok(SeverityTier::High),
            _ => Err(TypesError::UnknownSeverity(s.to_owned())),
        }
    }
}

/// A validated answer to one question.
///
/// Serialised untagged so a stored answer reads naturally in a report: `45`, `true`, `"male"`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Boolean(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True only for a boolean `yes` answer.
    pub fn is_affirmative(&self) -> bool {
        self.as_bool().unwrap_or(false)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Boolean(true) => f.write_str("yes"),
            AnswerValue::Boolean(false) => f.write_str("no"),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}
