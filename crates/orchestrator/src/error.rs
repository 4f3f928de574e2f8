use std::collections::BTreeSet;
use std::time::Duration;

use okteto::OktetoError;
use preview_core::CoreError;
use thiserror::Error;
use vcs::VcsError;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("failed to resolve repository URL")]
    RepositoryResolutionFailed(#[source] VcsError),

    #[error("failed to resolve branch")]
    BranchResolutionFailed(#[source] VcsError),

    #[error(transparent)]
    InvalidVariableFormat(CoreError),

    #[error("failed to deploy preview environment '{name}'")]
    Submission {
        name: String,
        #[source]
        source: OktetoError,
    },

    #[error("action '{action}' did not finish after {elapsed:?}")]
    ActionTimeout { action: String, elapsed: Duration },

    #[error("action '{action}' failed, preview environment '{environment}' was not deployed")]
    ActionFailed { action: String, environment: String },

    #[error("failed to get status of action '{action}'")]
    ActionQueryError {
        action: String,
        #[source]
        source: OktetoError,
    },

    #[error("failed to get resource statuses of preview environment '{environment}'")]
    StatusQueryError {
        environment: String,
        #[source]
        source: OktetoError,
    },

    #[error("preview environment '{environment}' deployed with resource errors")]
    ResourceError {
        environment: String,
        resources: BTreeSet<String>,
    },

    #[error("preview environment '{environment}' resources not running after {timeout:?}")]
    ResourceTimeout {
        environment: String,
        timeout: Duration,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl PreviewError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_)
            | Self::Config(_)
            | Self::RepositoryResolutionFailed(_)
            | Self::BranchResolutionFailed(_)
            | Self::InvalidVariableFormat(_) => 2,
            _ => 1,
        }
    }
}

impl From<CoreError> for PreviewError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidVariableFormat(_) => Self::InvalidVariableFormat(err),
            other => Self::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PreviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_names_only_environment() {
        let err = PreviewError::ResourceError {
            environment: "pr-42".to_string(),
            resources: ["deployment/api".to_string()].into_iter().collect(),
        };

        assert_eq!(
            err.to_string(),
            "preview environment 'pr-42' deployed with resource errors"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PreviewError::Usage("missing".to_string()).exit_code(), 2);
        assert_eq!(
            PreviewError::from(CoreError::InvalidVariableFormat("X".to_string())).exit_code(),
            2
        );
        assert_eq!(PreviewError::Cancelled.exit_code(), 1);
        assert_eq!(
            PreviewError::ActionFailed {
                action: "a".to_string(),
                environment: "e".to_string(),
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_variable_error_keeps_message() {
        let err = PreviewError::from(CoreError::InvalidVariableFormat("BROKEN".to_string()));
        assert_eq!(
            err.to_string(),
            "invalid variable value 'BROKEN': must follow KEY=VALUE format"
        );
    }

    #[test]
    fn test_invalid_scope_is_config_error() {
        let err = PreviewError::from(CoreError::InvalidScope("team".to_string()));
        assert!(matches!(err, PreviewError::Config(_)));
    }
}
