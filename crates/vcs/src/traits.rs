use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Read-only access to the metadata of a local working copy.
#[async_trait]
pub trait RepositoryMetadata: Send + Sync {
    /// Get the name of the VCS backend
    fn name(&self) -> &'static str;

    /// URL of the repository the working copy at `path` was cloned from
    async fn repository_url(&self, path: &Path) -> Result<String>;

    /// Branch currently checked out at `path`
    async fn current_branch(&self, path: &Path) -> Result<String>;
}
