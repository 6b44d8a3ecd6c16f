//! Line-oriented console driver.
//!
//! [`Console`] runs an [`IntakeSession`] over any `BufRead`/`Write` pair: it prints each
//! prompt, blocks for a line of input, and on a rejected answer prints the corrective message
//! and asks again. There is no attempt limit and no timeout; the only way out of a question is
//! a valid answer or the end of input.

use crate::catalog::IntakeCatalog;
use crate::predictor::ConditionPredictor;
use crate::report::{IntakeReport, ReportStore};
use crate::session::{CompletedSession, IntakeSession};
use crate::{IntakeError, IntakeResult};
use std::io::{BufRead, Write};
use std::path::Path;

const GREETING: &str = "Hello! I'm your virtual health assistant. I'll ask you some questions to assess your health condition.";
const DISCLAIMER: &str = "Please note: This is not a substitute for professional medical advice. If you're experiencing severe symptoms, please seek immediate medical attention.";
const INPUT_MARKER: &str = "> ";
const PREDICTION_CAUTION: &str =
    "Note: This is a preliminary assessment and should be verified by a healthcare professional.";
const FAREWELL: &str = "Thank you for using the medical chatbot. Take care!";

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: &str) -> IntakeResult<()> {
        writeln!(self.output, "{}", text).map_err(IntakeError::ConsoleIo)
    }

    pub fn welcome(&mut self) -> IntakeResult<()> {
        self.say(GREETING)?;
        self.say(DISCLAIMER)
    }

    /// Asks every question of `session` until none remain.
    ///
    /// # Errors
    ///
    /// - `IntakeError::InputClosed` if input ends before the session is complete,
    /// - `IntakeError::ConsoleIo` if reading or writing fails.
    pub fn ask_all(&mut self, session: &mut IntakeSession<'_>) -> IntakeResult<()> {
        while let Some(question) = session.current_question() {
            self.say(&question.prompt)?;

            loop {
                let line = self.read_answer()?;
                match session.answer(&line) {
                    Ok(_) => break,
                    Err(IntakeError::Validation(e)) => {
                        tracing::debug!(question = %question.id, "rejected answer: {}", e);
                        self.say(&e.to_string())?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    fn read_answer(&mut self) -> IntakeResult<String> {
        write!(self.output, "{}", INPUT_MARKER).map_err(IntakeError::ConsoleIo)?;
        self.output.flush().map_err(IntakeError::ConsoleIo)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(IntakeError::ConsoleIo)?;
        if read == 0 {
            return Err(IntakeError::InputClosed);
        }
        Ok(line)
    }

    /// Prints the final assessment and the advisory for its severity.
    pub fn summary(
        &mut self,
        completed: &CompletedSession,
        catalog: &IntakeCatalog,
    ) -> IntakeResult<()> {
        let assessment = &completed.assessment;

        self.say("")?;
        self.say("Based on your responses:")?;
        if assessment.reported_symptoms.is_empty() {
            self.say("You haven't reported any major symptoms.")?;
        } else {
            self.say(&format!(
                "You reported the following symptoms: {}",
                assessment.reported_symptoms.join(", ")
            ))?;
            if let Some(condition) = &assessment.predicted_condition {
                self.say("")?;
                self.say(&format!(
                    "Based on your symptoms and profile, you may have: {}",
                    condition
                ))?;
                self.say(PREDICTION_CAUTION)?;
            }
        }

        self.say("")?;
        self.say(&format!(
            "Recommendation: {}",
            catalog.severity().advisory(assessment.severity)
        ))
    }

    pub fn saved(&mut self, path: &Path) -> IntakeResult<()> {
        self.say(&format!("Conversation saved to {}", path.display()))
    }

    pub fn farewell(&mut self) -> IntakeResult<()> {
        self.say("")?;
        self.say(FAREWELL)
    }
}

/// Runs a whole questionnaire: greeting, questions, assessment, summary and, when a store is
/// given, the saved report.
pub fn run_intake<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    catalog: &IntakeCatalog,
    predictor: Option<&dyn ConditionPredictor>,
    reports: Option<&ReportStore>,
) -> IntakeResult<CompletedSession> {
    let mut session = IntakeSession::new(catalog);
    let span = tracing::info_span!("intake", session_id = %session.session_id());
    let _guard = span.enter();

    console.welcome()?;
    console.ask_all(&mut session)?;

    let completed = session.finish(predictor)?;
    console.summary(&completed, catalog)?;

    if let Some(store) = reports {
        let report = IntakeReport::from_session(&completed);
        let path = store.save(&report)?;
        console.saved(&path)?;
    }

    console.farewell()?;
    Ok(completed)
}
