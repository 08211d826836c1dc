//! Decides whether a finished command string needs the terminal.
//!
//! Classification runs on the command *after* variable substitution. Raw templates may still
//! contain `${...}` placeholders, which would make `${editor} notes.txt` look harmless.

use crate::command::CommandMode;
use anyhow::{Context, Result};
use regex::Regex;
use tracing::error;

/// Built-in interactive patterns, checked in order. `(description, regex)`.
pub const INTERACTIVE_PATTERNS: &[(&str, &str)] = &[
    ("supabase login", r"\bsupabase\s+login\b"),
    ("supabase link", r"\bsupabase\s+link\b"),
    ("supabase projects list", r"\bsupabase\s+projects\s+list\b"),
    ("git commit", r"\bgit\s+commit\b"),
    ("npm login", r"\bnpm\s+login\b"),
    ("sudo", r"\bsudo\s+"),
    ("passwd", r"\bpasswd\b"),
    // a bare `ssh host`; options such as `-o BatchMode=yes` keep it non-interactive
    ("ssh session", r"\bssh\s+[^-\s]"),
    ("mysql password prompt", r"\bmysql\s+.*-p(?:\s|$)"),
    ("psql password prompt", r"\bpsql\s+.*-W"),
    ("nano", r"\bnano\s+"),
    ("vim", r"\bvim\s+"),
    ("emacs", r"\bemacs\s+"),
    ("less", r"\bless\s+"),
    ("more", r"\bmore\s+"),
    ("shell read", r"\bread\s+"),
    ("python repl", r"\bpython3?\s*$"),
    ("node repl", r"\bnode\s*$"),
    ("irb repl", r"\birb\s*$"),
];

#[derive(Debug, Clone)]
struct Pattern {
    description: String,
    regex: Regex,
}

/// Ordered table of regexes that mark a command as [`CommandMode::Interactive`].
#[derive(Debug, Clone)]
pub struct Classifier {
    patterns: Vec<Pattern>,
}

impl Classifier {
    /// A classifier with no patterns; everything is plain.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Build a classifier from `(description, regex)` pairs.
    pub fn from_table<'a>(table: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        table
            .into_iter()
            .try_fold(Self::empty(), |acc, (description, pattern)| {
                acc.with_pattern(description, pattern)
            })
    }

    /// Append one more interactive pattern.
    pub fn with_pattern(mut self, description: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("invalid interactive pattern `{}`", pattern))?;
        self.patterns.push(Pattern {
            description: description.to_string(),
            regex,
        });
        Ok(self)
    }

    pub fn classify(&self, command: &str) -> CommandMode {
        match self.matching_pattern(command) {
            Some(_) => CommandMode::Interactive,
            None => CommandMode::Plain,
        }
    }

    /// Description of the first pattern `command` matches, if any.
    pub fn matching_pattern(&self, command: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(command))
            .map(|p| p.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let patterns = INTERACTIVE_PATTERNS
            .iter()
            .filter_map(|(description, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some(Pattern {
                    description: description.to_string(),
                    regex,
                }),
                Err(e) => {
                    error!(pattern, "skipping invalid built-in pattern: {e}");
                    None
                }
            })
            .collect();
        Self { patterns }
    }
}

/// Classify with the built-in pattern table.
pub fn classify(command: &str) -> CommandMode {
    Classifier::default().classify(command)
}
