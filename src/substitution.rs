//! `${name}` placeholders in command templates.
//!
//! A template is split into literal text and placeholders. Every distinct name is resolved once,
//! in first-seen order, and the value is used for all of its occurrences. If any name gets no value
//! the whole template is abandoned.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// A piece of a command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Text copied to the command as-is.
    Literal(String),
    /// A `${...}` placeholder. Contains the text inside the curly braces.
    Placeholder(String),
}

#[derive(Debug, Error)]
pub enum SubstitutionError {
    /// The resolver supplied no value, so nothing is run.
    #[error("no value provided for variable `{variable}`")]
    Cancelled { variable: String },

    /// The resolver itself failed (for example the input stream broke).
    #[error(transparent)]
    Input(#[from] anyhow::Error),
}

/// Supplies a value for a placeholder name.
///
/// `Ok(None)` means the operator gave no value; substitution then stops with
/// [`SubstitutionError::Cancelled`].
pub trait VariableResolver {
    fn resolve(&mut self, name: &str) -> anyhow::Result<Option<String>>;
}

impl<F> VariableResolver for F
where
    F: FnMut(&str) -> anyhow::Result<Option<String>>,
{
    fn resolve(&mut self, name: &str) -> anyhow::Result<Option<String>> {
        self(name)
    }
}

/// Fixed values; names that are not in the map cancel the substitution.
impl VariableResolver for HashMap<String, String> {
    fn resolve(&mut self, name: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(name).cloned())
    }
}

/// Split a template into literal text and placeholders.
///
/// `${` without a closing `}` and the empty `${}` stay literal text.
pub fn parse_template(template: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        let after_open = &rest[start + 2..];
        match after_open.find('}') {
            Some(0) => {
                literal.push_str(&rest[..start + 3]);
                rest = &after_open[1..];
            }
            Some(end) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(TemplatePart::Placeholder(after_open[..end].to_string()));
                rest = &after_open[end + 1..];
            }
            None => break,
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    parts
}

/// Distinct placeholder names of `template`, in first-seen order.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for part in parse_template(template) {
        if let TemplatePart::Placeholder(name) = part {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Resolve every placeholder of `template` and return the finished command.
///
/// A template without placeholders is returned unchanged and the resolver is never called.
pub fn substitute<R>(template: &str, resolver: &mut R) -> Result<String, SubstitutionError>
where
    R: VariableResolver + ?Sized,
{
    let parts = parse_template(template);
    let mut values: HashMap<String, String> = HashMap::new();

    for part in &parts {
        let TemplatePart::Placeholder(name) = part else {
            continue;
        };
        if values.contains_key(name) {
            continue;
        }
        match resolver.resolve(name)? {
            Some(value) => {
                debug!(variable = %name, "resolved variable");
                values.insert(name.clone(), value);
            }
            None => {
                return Err(SubstitutionError::Cancelled {
                    variable: name.clone(),
                });
            }
        }
    }

    let mut command = String::with_capacity(template.len());
    for part in parts {
        match part {
            TemplatePart::Literal(text) => command.push_str(&text),
            TemplatePart::Placeholder(name) => command.push_str(&values[&name]),
        }
    }
    Ok(command)
}
