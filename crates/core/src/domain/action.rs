use serde::{Deserialize, Serialize};

/// Identifies the asynchronous job that deploys a preview environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHandle {
    pub action_name: String,
    pub environment: String,
    /// Opaque action id, when the API returns one.
    pub action_id: Option<String>,
    /// Opaque preview id, when the API returns one.
    pub preview_id: Option<String>,
}

impl ActionHandle {
    pub fn new(action_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            environment: environment.into(),
            action_id: None,
            preview_id: None,
        }
    }

    pub fn with_action_id(mut self, id: Option<String>) -> Self {
        self.action_id = id;
        self
    }

    pub fn with_preview_id(mut self, id: Option<String>) -> Self {
        self.preview_id = id;
        self
    }
}

/// Remote state of an action. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown(String),
}

impl ActionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for ActionState {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" => Self::Pending,
            "progressing" | "running" | "in_progress" => Self::Running,
            "end" | "success" | "succeeded" | "completed" => Self::Succeeded,
            "error" | "failed" | "failure" => Self::Failed,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
