use std::path::Path;
use tracing::{debug, info};

use okteto::PreviewApi;
use preview_core::{parse_variables, ActionHandle, DeployRequest, PreviewScope};
use vcs::RepositoryMetadata;

use crate::error::{PreviewError, Result};

/// Raw inputs for one preview deployment, before any resolution.
#[derive(Debug, Clone, Default)]
pub struct DeployInputs {
    pub name: String,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub scope: Option<String>,
    pub source_url: Option<String>,
    pub filename: Option<String>,
    /// `;`-separated `KEY=VALUE` list
    pub variables: String,
}

impl DeployInputs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

pub struct DeployRequester<'a> {
    api: &'a dyn PreviewApi,
    vcs: &'a dyn RepositoryMetadata,
}

impl<'a> DeployRequester<'a> {
    pub fn new(api: &'a dyn PreviewApi, vcs: &'a dyn RepositoryMetadata) -> Self {
        Self { api, vcs }
    }

    /// Build the request, filling the repository and branch from the working
    /// copy at `cwd` when they are not given.
    pub async fn resolve(&self, inputs: &DeployInputs, cwd: &Path) -> Result<DeployRequest> {
        let name = inputs.name.trim();
        if name.is_empty() {
            return Err(PreviewError::Usage("Preview name is needed".to_string()));
        }

        let repository = match non_empty(&inputs.repository) {
            Some(repository) => repository.to_string(),
            None => {
                let url = self
                    .vcs
                    .repository_url(cwd)
                    .await
                    .map_err(PreviewError::RepositoryResolutionFailed)?;
                debug!(repository = %url, backend = self.vcs.name(), "Detected repository");
                url
            }
        };

        let branch = match non_empty(&inputs.branch) {
            Some(branch) => branch.to_string(),
            None => {
                let branch = self
                    .vcs
                    .current_branch(cwd)
                    .await
                    .map_err(PreviewError::BranchResolutionFailed)?;
                debug!(branch = %branch, backend = self.vcs.name(), "Detected branch");
                branch
            }
        };

        let scope = PreviewScope::parse(inputs.scope.as_deref().unwrap_or_default())?;
        let variables = parse_variables(&inputs.variables)?;

        Ok(DeployRequest::new(name, repository, branch)
            .with_scope(scope)
            .with_source_url(inputs.source_url.clone())
            .with_filename(inputs.filename.clone())
            .with_variables(variables))
    }

    /// Issue the deploy call. Failures are not retried.
    pub async fn submit(&self, request: &DeployRequest) -> Result<ActionHandle> {
        info!(
            preview = %request.name,
            repository = %request.repository,
            branch = %request.branch,
            "Deploying preview environment"
        );

        self.api
            .deploy_preview(request)
            .await
            .map_err(|source| PreviewError::Submission {
                name: request.name.clone(),
                source,
            })
    }
}

/// Human-readable summary printed before the deploy call.
pub fn render_summary(request: &DeployRequest, raw_variables: &str) -> String {
    format!(
        "  Name: {}\n  Repo: {} @ {}\n  Scope: {}\n  Variables: {}",
        request.name, request.repository, request.branch, request.scope, raw_variables
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
