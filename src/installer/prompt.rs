//! Interactive destination prompt
//!
//! Asks a single multiple-choice question on the terminal. The question is
//! written to stderr so stdout stays free for script output.

use std::io::Write;

use async_trait::async_trait;
use nu_ansi_term::Color;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{Result, TabtabError};

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Text shown to the user
    pub label: String,
    /// Value returned when selected
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub message: String,
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            choices: Vec::new(),
        }
    }

    /// Append a choice, ignoring values already offered
    pub fn push(&mut self, choice: Choice) {
        if !self.choices.iter().any(|c| c.value == choice.value) {
            self.choices.push(choice);
        }
    }

    /// Resolve a typed answer: a 1-based number, a value or a label
    pub fn resolve(&self, answer: &str) -> Option<&Choice> {
        let answer = answer.trim();
        if let Ok(n) = answer.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.choices.get(i));
        }
        self.choices
            .iter()
            .find(|c| c.value == answer || c.label == answer)
    }
}

/// Asks the user a question
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Value of the chosen answer, `None` when the user aborted
    async fn ask(&self, question: &Question) -> Result<Option<String>>;
}

/// [`Prompter`] reading answers from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn print_question(question: &Question) -> Result<()> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "{} {}", Color::Green.bold().paint("?"), Color::White.bold().paint(&question.message))?;
        for (i, choice) in question.choices.iter().enumerate() {
            writeln!(err, "  {} {}", Color::Cyan.paint(format!("{})", i + 1)), choice.label)?;
        }
        write!(err, "Answer (1-{}, empty to abort): ", question.choices.len())?;
        err.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn ask(&self, question: &Question) -> Result<Option<String>> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            Self::print_question(question)?;

            let line = lines
                .next_line()
                .await
                .map_err(|e| TabtabError::Prompt(format!("Failed to read input: {e}")))?;

            let answer = match line {
                Some(line) if !line.trim().is_empty() => line,
                _ => return Ok(None),
            };

            match question.resolve(&answer) {
                Some(choice) => return Ok(Some(choice.value.clone())),
                None => eprintln!("{}", Color::Red.paint(format!("Invalid choice: {}", answer.trim()))),
            }
        }
    }
}
