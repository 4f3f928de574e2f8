use thiserror::Error;

#[derive(Debug, Error)]
pub enum OktetoError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("{0}")]
    GraphQl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl OktetoError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Api {
                status_code: Some(code),
                ..
            } => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, OktetoError>;
