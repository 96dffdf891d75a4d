use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::annotation::PageNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Save,
    Discard,
}

impl SaveDecision {
    pub fn id(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Discard => "discard",
        }
    }
}

impl FromStr for SaveDecision {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "save" | "s" | "y" | "yes" => Ok(Self::Save),
            "discard" | "d" | "n" | "no" => Ok(Self::Discard),
            other => Err(format!("expected save or discard, got {other:?}")),
        }
    }
}

/// Asked when unsaved annotations would be lost by leaving a page.
pub trait SavePrompt {
    fn decide(&mut self, page: PageNumber) -> SaveDecision;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub SaveDecision);

impl SavePrompt for FixedDecision {
    fn decide(&mut self, _page: PageNumber) -> SaveDecision {
        self.0
    }
}

/// Replays a fixed list of answers, then falls back to `Save`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<SaveDecision>,
    asked: Vec<PageNumber>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = SaveDecision>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Pages the prompt was consulted for, in order.
    pub fn asked(&self) -> &[PageNumber] {
        &self.asked
    }
}

impl SavePrompt for ScriptedPrompt {
    fn decide(&mut self, page: PageNumber) -> SaveDecision {
        self.asked.push(page);
        self.answers.pop_front().unwrap_or(SaveDecision::Save)
    }
}

/// Interactive prompt on the controlling terminal. Unreadable input keeps the
/// strokes and saves.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl SavePrompt for StdinPrompt {
    fn decide(&mut self, page: PageNumber) -> SaveDecision {
        let mut stderr = io::stderr();
        loop {
            let _ = write!(
                stderr,
                "page {page} has unsaved annotations. save before leaving? [S]ave/[d]iscard: "
            );
            let _ = stderr.flush();

            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => return SaveDecision::Save,
                Ok(_) if line.trim().is_empty() => return SaveDecision::Save,
                Ok(_) => match line.parse::<SaveDecision>() {
                    Ok(decision) => return decision,
                    Err(message) => {
                        let _ = writeln!(stderr, "{message}");
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SaveDecision, SavePrompt, ScriptedPrompt};
    use crate::annotation::PageNumber;

    #[test]
    fn decision_parses_short_and_long_forms() {
        assert_eq!("Save".parse::<SaveDecision>(), Ok(SaveDecision::Save));
        assert_eq!(" n ".parse::<SaveDecision>(), Ok(SaveDecision::Discard));
        assert!("maybe".parse::<SaveDecision>().is_err());
    }

    #[test]
    fn scripted_prompt_records_pages_and_defaults_to_save() {
        let mut prompt = ScriptedPrompt::new([SaveDecision::Discard]);
        assert_eq!(prompt.decide(PageNumber(2)), SaveDecision::Discard);
        assert_eq!(prompt.decide(PageNumber(5)), SaveDecision::Save);
        assert_eq!(prompt.asked(), [PageNumber(2), PageNumber(5)]);
    }
}
