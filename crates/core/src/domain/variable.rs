use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

const ENTRY_SEPARATOR: char = ';';
const PAIR_SEPARATOR: char = '=';

/// A single `NAME=VALUE` pair passed to the preview environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse a `;`-separated list of `KEY=VALUE` entries.
///
/// Only the first `=` splits an entry, so values may contain `=` themselves.
/// Order is preserved and repeated names are kept as-is. An empty input is
/// an empty list; any entry without `=` or with an empty key is rejected
/// verbatim.
pub fn parse_variables(raw: &str) -> Result<Vec<Variable>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(ENTRY_SEPARATOR)
        .map(|entry| match entry.split_once(PAIR_SEPARATOR) {
            Some((name, value)) if !name.is_empty() => Ok(Variable::new(name, value)),
            _ => Err(CoreError::InvalidVariableFormat(entry.to_string())),
        })
        .collect()
}
