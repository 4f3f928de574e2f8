use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid variable value '{0}': must follow KEY=VALUE format")]
    InvalidVariableFormat(String),

    #[error("invalid preview scope '{0}': must be 'global' or 'personal'")]
    InvalidScope(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::InvalidVariableFormat("FOO".to_string());
        assert_eq!(
            error.to_string(),
            "invalid variable value 'FOO': must follow KEY=VALUE format"
        );
    }
}
