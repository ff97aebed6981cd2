//! A small line-oriented prompt engine.
//!
//! Prompts are plain data ([`Step`]s) walked by any [`PromptEngine`]. The
//! [`Prompter`] reads one line per prompt from any [`BufRead`] and writes
//! prompts to any [`Write`]; the terminal engine lives in
//! [`super::terminal`]. Input is never validated or re-prompted.

use std::io::{self, BufRead, Write};

use crate::configuration::ConfigDocument;

/// Answers that enable a yes/no section. Matched exactly (case-sensitive).
pub const AFFIRMATIVE_ANSWERS: [&str; 2] = ["y", "yes"];

pub type FieldSetter = fn(&mut ConfigDocument, String);
pub type FlagSetter = fn(&mut ConfigDocument, bool);
pub type Normalizer = fn(&str) -> String;


/// A single free-text field.
#[derive(Clone)]
pub struct FieldPrompt {
    pub label: &'static str,

    /// Used when the answer is empty. `None` leaves the field empty and shows no hint.
    pub default: Option<&'static str>,

    /// Applied to the final value (answer or default) before it is stored.
    pub normalize: Option<Normalizer>,

    /// Whether the prompt text mentions the default.
    pub show_default: bool,

    pub apply: FieldSetter,
}

impl FieldPrompt {
    pub fn new(label: &'static str, apply: FieldSetter) -> Self {
        Self {
            label,
            default: None,
            normalize: None,
            show_default: true,
            apply,
        }
    }

    pub fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn normalized_with(mut self, normalize: Normalizer) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// Keeps the default but leaves it out of the prompt text.
    pub fn with_hidden_default(mut self) -> Self {
        self.show_default = false;
        self
    }

    pub(super) fn prompt_text(&self) -> String {
        if !self.show_default {
            return self.label.to_string();
        }

        match self.default {
            Some("") => format!("{} (default '')", self.label),
            Some(default) => format!("{} (default {})", self.label, default),
            None => self.label.to_string(),
        }
    }

    fn value_for(&self, answer: String) -> String {
        let value = if answer.is_empty() {
            self.default.unwrap_or_default().to_string()
        } else {
            answer
        };

        match self.normalize {
            Some(normalize) => normalize(&value),
            None => value,
        }
    }
}


/// A yes/no question that toggles a flag and gates its nested steps.
#[derive(Clone)]
pub struct SectionPrompt {
    pub question: &'static str,
    pub apply: FlagSetter,
    pub steps: Vec<Step>,
}

impl SectionPrompt {
    pub fn new(question: &'static str, apply: FlagSetter) -> Self {
        Self {
            question,
            apply,
            steps: Vec::new(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }
}


#[derive(Clone)]
pub enum Step {
    Field(FieldPrompt),
    Section(SectionPrompt),
}

impl From<FieldPrompt> for Step {
    fn from(field: FieldPrompt) -> Self {
        Step::Field(field)
    }
}

impl From<SectionPrompt> for Step {
    fn from(section: SectionPrompt) -> Self {
        Step::Section(section)
    }
}


pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE_ANSWERS.contains(&answer)
}


/// Something that can ask one free-text question at a time.
pub trait PromptEngine {
    /// Shows ` > {text}: ` and returns the trimmed answer. End of input reads as empty.
    fn ask(&mut self, text: &str) -> io::Result<String>;

    /// Shows a line that is not a prompt.
    fn say(&mut self, text: &str) -> io::Result<()>;

    fn run_steps(&mut self, steps: &[Step], document: &mut ConfigDocument) -> io::Result<()> {
        for step in steps {
            match step {
                Step::Field(field) => {
                    let answer = self.ask(&field.prompt_text())?;
                    (field.apply)(document, field.value_for(answer));
                }
                Step::Section(section) => {
                    let answer = self.ask(&format!("{} (y/n, default n)", section.question))?;
                    let enabled = is_affirmative(&answer);

                    (section.apply)(document, enabled);
                    if enabled {
                        self.run_steps(&section.steps, document)?;
                    }
                }
            }
        }

        Ok(())
    }
}


/// Prompt engine over arbitrary streams; used for piped or scripted input.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> PromptEngine for Prompter<R, W> {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        write!(self.writer, " > {text}: ")?;
        self.writer.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;

        Ok(line.trim().to_string())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{text}")
    }
}
