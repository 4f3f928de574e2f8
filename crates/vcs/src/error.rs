use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Not a git repository: {0}")]
    NotInitialized(String),

    #[error("No remote 'origin' configured in {0}")]
    MissingRemote(String),

    #[error("HEAD is detached in {0}, no current branch")]
    DetachedHead(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;
