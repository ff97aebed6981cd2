use std::io;

use dialoguer::{console::Term, Input};

use super::prompt::PromptEngine;


/// Prompt engine for an interactive terminal, with line editing.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl PromptEngine for TerminalPrompter {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        let answer: String = Input::new()
            .with_prompt(format!(" > {text}"))
            .allow_empty(true)
            .report(false)
            .interact_text_on(&self.term)
            .map_err(|dialoguer::Error::IO(e)| e)?;

        Ok(answer.trim().to_string())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        self.term.write_line(text)
    }
}
