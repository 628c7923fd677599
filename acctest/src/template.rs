//! Templated configuration rendering
//!
//! Templates carry `%{name}` placeholders which are replaced by the string
//! form of the matching context value. Anything else, including Terraform's
//! own `${...}` interpolation and `%{ if ... }` directives, passes through
//! untouched.

use crate::context::Context;
use crate::error::{AcctestError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Template is an immutable configuration text with named placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Distinct placeholder names in order of first occurrence
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in placeholder_pattern().captures_iter(&self.text) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholder names with no value in `context`
    pub fn missing_keys(&self, context: &Context) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| !context.contains_key(name))
            .map(str::to_string)
            .collect()
    }

    pub fn render(&self, context: &Context) -> Result<String> {
        render(&self.text, context)
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Substitutes every `%{name}` in `template` with its value from `context`.
///
/// Fails with `MissingKey` on the first placeholder, in document order,
/// whose name is absent. Substituted values are never rescanned.
pub fn render(template: &str, context: &Context) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = context
            .get(name.as_str())
            .ok_or_else(|| AcctestError::MissingKey(name.as_str().to_string()))?;

        out.push_str(&template[last..whole.start()]);
        out.push_str(&value.to_string());
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}
