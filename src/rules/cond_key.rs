//! Conditional keys: `key`, `key|regex` or `key|regex|value-template`.

use regex::Regex;

use super::error::{Error, Result};
use super::template::Template;
use super::value::PropertyBag;

/// Value tested by a condition when the key does not name one
pub const DEFAULT_CONDITION_VALUE: &str = "{file_name}";

#[derive(Debug, Clone)]
struct Condition {
    pattern: String,
    regex: Regex,
    value: Template,
}

/// A destination key with an optional gate.
///
/// Without a regex the key always matches. With one, the value template is
/// resolved and the regex must match at the start of the result.
#[derive(Debug, Clone)]
pub struct CondKey {
    key: String,
    condition: Option<Condition>,
}

impl CondKey {
    pub fn parse(expr: &str) -> Result<Self> {
        let mut parts = expr.splitn(3, '|');
        let key = parts.next().unwrap_or_default().trim();
        if key.is_empty() {
            return Err(Error::InvalidConfig(format!("empty key in '{expr}'")));
        }

        let condition = match parts.next() {
            None => None,
            Some(pattern) => {
                let value = parts.next().unwrap_or(DEFAULT_CONDITION_VALUE);
                Some(Condition {
                    pattern: pattern.to_string(),
                    regex: compile_anchored(pattern)?,
                    value: Template::parse(value)?,
                })
            }
        };

        Ok(Self {
            key: key.to_string(),
            condition,
        })
    }

    /// Destination field or image slot
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matches(&self, bag: &PropertyBag) -> Result<bool> {
        let Some(cond) = &self.condition else {
            return Ok(true);
        };
        let value = cond
            .value
            .resolve_to_string(bag)
            .map_err(|e| Error::ConditionEval {
                key: self.key.clone(),
                source: Box::new(e),
            })?;
        let matched = cond.regex.is_match(&value);
        if !matched {
            log::debug!("{}: '{}' does not match '{}'", self.key, value, cond.pattern);
        }
        Ok(matched)
    }
}

/// Compile `pattern` so it only matches at the start of the input
pub fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| Error::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}
