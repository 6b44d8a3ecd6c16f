//! Input validation.
//!
//! Every question carries an [`AnswerType`]; [`AnswerType::validate`] turns the raw line a
//! user typed into a typed [`AnswerValue`] or a [`ValidationError`] whose message is shown
//! back to the user as the corrective prompt. Validation is pure: re-prompting is the console
//! driver's job.

use intake_types::AnswerValue;

const YES_TOKENS: [&str; 2] = ["yes", "y"];
const NO_TOKENS: [&str; 2] = ["no", "n"];

/// Expected shape of an answer.
///
/// A closed enumeration so the catalog stays plain data that can be loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerType {
    /// Integer within `min..=max`. `label` names the value in the rejection message.
    Number {
        min: i64,
        max: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `yes`/`y` or `no`/`n`.
    Boolean,
    /// One of a closed set of tokens.
    EnumeratedText { choices: Vec<Choice> },
}

/// One accepted token of an enumerated question.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Choice {
    /// Canonical value stored in the answer store.
    pub value: String,
    /// Alternative spellings, usually a single letter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            value: value.into(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    fn matches(&self, token: &str) -> bool {
        self.value.eq_ignore_ascii_case(token)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(token))
    }
}

/// Rejection of one raw input line. The display text is the corrective prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid number.")]
    NotANumber,
    #[error("Please enter a valid {label} between {min} and {max}.")]
    OutOfRange { label: String, min: i64, max: i64 },
    #[error("Please answer with yes/no or y/n.")]
    NotYesNo,
    #[error("Please enter {expected}.")]
    NotAChoice { expected: String },
}

impl AnswerType {
    /// Converts a raw input line into a typed answer.
    ///
    /// Input is trimmed and matched case-insensitively. Enumerated answers are stored as the
    /// matching choice's canonical value, so `M` and `male` both become `"male"`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing what the user should type instead.
    pub fn validate(&self, raw: &str) -> Result<AnswerValue, ValidationError> {
        let input = raw.trim().to_ascii_lowercase();

        match self {
            AnswerType::Number { min, max, label } => {
                let value: i64 = input.parse().map_err(|_| ValidationError::NotANumber)?;
                if (*min..=*max).contains(&value) {
                    Ok(AnswerValue::Number(value))
                } else {
                    Err(ValidationError::OutOfRange {
                        label: label.clone().unwrap_or_else(|| "value".to_string()),
                        min: *min,
                        max: *max,
                    })
                }
            }
            AnswerType::Boolean => {
                if YES_TOKENS.contains(&input.as_str()) {
                    Ok(AnswerValue::Boolean(true))
                } else if NO_TOKENS.contains(&input.as_str()) {
                    Ok(AnswerValue::Boolean(false))
                } else {
                    Err(ValidationError::NotYesNo)
                }
            }
            AnswerType::EnumeratedText { choices } => choices
                .iter()
                .find(|c| c.matches(&input))
                .map(|c| AnswerValue::Text(c.value.clone()))
                .ok_or_else(|| ValidationError::NotAChoice {
                    expected: describe_choices(choices),
                }),
        }
    }
}

/// Renders choices as `'low', 'normal', or 'high' (or 'l'/'n'/'h')`.
fn describe_choices(choices: &[Choice]) -> String {
    let values: Vec<String> = choices.iter().map(|c| format!("'{}'", c.value)).collect();
    let listed = match values.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [a, b] => format!("{} or {}", a, b),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    };

    let aliases: Vec<String> = choices
        .iter()
        .flat_map(|c| c.aliases.iter())
        .map(|a| format!("'{}'", a))
        .collect();
    if aliases.is_empty() {
        listed
    } else {
        format!("{} (or {})", listed, aliases.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age() -> AnswerType {
        AnswerType::Number {
            min: 0,
            max: 120,
            label: None,
        }
    }

    fn gender() -> AnswerType {
        AnswerType::EnumeratedText {
            choices: vec![Choice::new("male", &["m"]), Choice::new("female", &["f"])],
        }
    }

    fn level() -> AnswerType {
        AnswerType::EnumeratedText {
            choices: vec![
                Choice::new("low", &["l"]),
                Choice::new("normal", &["n"]),
                Choice::new("high", &["h"]),
            ],
        }
    }

    #[test]
    fn test_number_accepts_boundaries() {
        assert_eq!(age().validate("0"), Ok(AnswerValue::Number(0)));
        assert_eq!(age().validate("120"), Ok(AnswerValue::Number(120)));
        assert_eq!(age().validate("  42 \n"), Ok(AnswerValue::Number(42)));
    }

    #[test]
    fn test_number_rejects_out_of_range() {
        let expected = Err(ValidationError::OutOfRange {
            label: "value".into(),
            min: 0,
            max: 120,
        });
        assert_eq!(age().validate("150"), expected);
        assert_eq!(age().validate("-1"), expected);
        assert_eq!(age().validate("121"), expected);
    }

    #[test]
    fn test_number_label_names_the_value() {
        let labelled = AnswerType::Number {
            min: 0,
            max: 120,
            label: Some("age".into()),
        };
        let err = labelled.validate("150").expect_err("out of range");
        assert_eq!(err.to_string(), "Please enter a valid age between 0 and 120.");

        let err = age().validate("150").expect_err("out of range");
        assert_eq!(err.to_string(), "Please enter a valid value between 0 and 120.");

        let parsed: AnswerType =
            serde_yaml::from_str("kind: number\nmin: 0\nmax: 120\nlabel: age\n").unwrap();
        assert_eq!(parsed, labelled);
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        assert_eq!(age().validate("forty"), Err(ValidationError::NotANumber));
        assert_eq!(age().validate(""), Err(ValidationError::NotANumber));
        assert_eq!(age().validate("4.5"), Err(ValidationError::NotANumber));
    }

    #[test]
    fn test_boolean_tokens() {
        for yes in ["yes", "Y", " YES "] {
            assert_eq!(AnswerType::Boolean.validate(yes), Ok(AnswerValue::Boolean(true)));
        }
        for no in ["no", "N", "No"] {
            assert_eq!(AnswerType::Boolean.validate(no), Ok(AnswerValue::Boolean(false)));
        }
        assert_eq!(
            AnswerType::Boolean.validate("maybe"),
            Err(ValidationError::NotYesNo)
        );
        assert_eq!(AnswerType::Boolean.validate(""), Err(ValidationError::NotYesNo));
    }

    #[test]
    fn test_enumerated_stores_canonical_value() {
        assert_eq!(gender().validate("M"), Ok(AnswerValue::Text("male".into())));
        assert_eq!(gender().validate("Female"), Ok(AnswerValue::Text("female".into())));
        assert_eq!(level().validate("n"), Ok(AnswerValue::Text("normal".into())));
        assert_eq!(level().validate("HIGH"), Ok(AnswerValue::Text("high".into())));
    }

    #[test]
    fn test_enumerated_rejection_lists_choices() {
        let err = gender().validate("x").expect_err("should reject");
        assert_eq!(
            err.to_string(),
            "Please enter 'male' or 'female' (or 'm'/'f')."
        );

        let err = level().validate("medium").expect_err("should reject");
        assert_eq!(
            err.to_string(),
            "Please enter 'low', 'normal', or 'high' (or 'l'/'n'/'h')."
        );
    }

    #[test]
    fn test_answer_type_yaml_shape() {
        let parsed: AnswerType =
            serde_yaml::from_str("kind: number\nmin: 0\nmax: 120\n").expect("parse number");
        assert_eq!(parsed, age());

        let parsed: AnswerType = serde_yaml::from_str(
            "kind: enumerated_text\nchoices:\n  - value: male\n    aliases: [m]\n  - value: female\n",
        )
        .expect("parse enumerated");
        assert_eq!(
            parsed,
            AnswerType::EnumeratedText {
                choices: vec![Choice::new("male", &["m"]), Choice::new("female", &[])],
            }
        );
    }
}
