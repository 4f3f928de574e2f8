use crate::error::{OktetoError, Result};

/// Connection details for one Okteto instance.
///
/// Constructed once by the caller and passed by reference to everything that
/// talks to the API.
#[derive(Clone)]
pub struct OktetoContext {
    url: String,
    token: String,
}

impl OktetoContext {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let token = token.into().trim().to_string();

        if url.is_empty() {
            return Err(OktetoError::Config("Okteto URL is not set".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(OktetoError::Config(format!(
                "Okteto URL must start with http:// or https://: {}",
                url
            )));
        }
        if token.is_empty() {
            return Err(OktetoError::Config("Okteto token is not set".to_string()));
        }

        Ok(Self { url, token })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.url)
    }

    /// Link to the preview in the Okteto UI.
    pub fn preview_url(&self, name: &str) -> String {
        format!("{}/#/previews/{}", self.url, name)
    }
}

impl std::fmt::Debug for OktetoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OktetoContext")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}
