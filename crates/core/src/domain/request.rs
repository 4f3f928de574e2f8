use serde::{Deserialize, Serialize};

use super::variable::Variable;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreviewScope {
    #[default]
    Global,
    Personal,
}

impl PreviewScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Personal => "personal",
        }
    }

    /// Parse a scope name, case-insensitively. An empty string is the default scope.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "personal" => Ok(Self::Personal),
            _ => Err(CoreError::InvalidScope(s.to_string())),
        }
    }
}

impl std::fmt::Display for PreviewScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved "deploy preview" request. Built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub name: String,
    pub scope: PreviewScope,
    pub repository: String,
    pub branch: String,
    pub source_url: Option<String>,
    pub filename: Option<String>,
    pub variables: Vec<Variable>,
}

impl DeployRequest {
    pub fn new(
        name: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: PreviewScope::default(),
            repository: repository.into(),
            branch: branch.into(),
            source_url: None,
            filename: None,
            variables: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: PreviewScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_source_url(mut self, source_url: Option<String>) -> Self {
        self.source_url = source_url.filter(|s| !s.is_empty());
        self
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename.filter(|s| !s.is_empty());
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }
}
