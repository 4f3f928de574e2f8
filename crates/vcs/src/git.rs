use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VcsError};
use crate::traits::RepositoryMetadata;

const DEFAULT_REMOTE: &str = "origin";

pub struct GitVcs {
    remote: String,
}

impl GitVcs {
    pub fn new() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    async fn run_git(&self, args: &[&str], cwd: &Path) -> Result<Output> {
        debug!("Running git {:?} in {:?}", args, cwd);

        Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => VcsError::CommandNotFound("git".to_string()),
                _ => VcsError::Io(e),
            })
    }

    fn failure(args: &[&str], cwd: &Path, output: &Output) -> VcsError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            return VcsError::NotInitialized(cwd.display().to_string());
        }
        VcsError::CommandFailed(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        ))
    }
}

impl Default for GitVcs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryMetadata for GitVcs {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn repository_url(&self, path: &Path) -> Result<String> {
        let key = format!("remote.{}.url", self.remote);
        let args = ["config", "--get", key.as_str()];
        let output = self.run_git(&args, path).await?;

        // `git config --get` exits 1 when the key is unset
        if output.status.code() == Some(1) {
            // Outside a work tree the key is unset too, so tell the two apart
            let probe = self
                .run_git(&["rev-parse", "--is-inside-work-tree"], path)
                .await?;
            if !probe.status.success() {
                return Err(VcsError::NotInitialized(path.display().to_string()));
            }
            return Err(VcsError::MissingRemote(path.display().to_string()));
        }
        if !output.status.success() {
            return Err(Self::failure(&args, path, &output));
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            return Err(VcsError::MissingRemote(path.display().to_string()));
        }
        Ok(url)
    }

    async fn current_branch(&self, path: &Path) -> Result<String> {
        let args = ["symbolic-ref", "--short", "-q", "HEAD"];
        let output = self.run_git(&args, path).await?;

        // `symbolic-ref -q` exits 1 quietly when HEAD is detached
        if output.status.code() == Some(1) {
            return Err(VcsError::DetachedHead(path.display().to_string()));
        }
        if !output.status.success() {
            return Err(Self::failure(&args, path, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
