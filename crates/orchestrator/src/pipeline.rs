use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

use okteto::{OktetoContext, PreviewApi};
use preview_core::ActionHandle;
use vcs::RepositoryMetadata;

use crate::action_waiter::{ActionWaitConfig, ActionWaiter};
use crate::deployer::{render_summary, DeployInputs, DeployRequester};
use crate::error::{PreviewError, Result};
use crate::resource_poller::{ResourcePollConfig, ResourcePoller};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub action: ActionWaitConfig,
    pub resources: ResourcePollConfig,
}

impl PipelineConfig {
    pub fn with_action(mut self, action: ActionWaitConfig) -> Self {
        self.action = action;
        self
    }

    pub fn with_resources(mut self, resources: ResourcePollConfig) -> Self {
        self.resources = resources;
        self
    }
}

/// A preview environment whose resources all reported running.
#[derive(Debug, Clone)]
pub struct PreviewDeployment {
    pub handle: ActionHandle,
    pub preview_url: String,
    pub polls: u32,
}

/// Deploys one preview environment and follows it until it is ready.
pub struct PreviewPipeline<'a> {
    context: &'a OktetoContext,
    api: &'a dyn PreviewApi,
    vcs: &'a dyn RepositoryMetadata,
    config: PipelineConfig,
}

impl<'a> PreviewPipeline<'a> {
    pub fn new(
        context: &'a OktetoContext,
        api: &'a dyn PreviewApi,
        vcs: &'a dyn RepositoryMetadata,
    ) -> Self {
        Self {
            context,
            api,
            vcs,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn run(
        &self,
        inputs: &DeployInputs,
        cwd: &Path,
        cancel: &CancellationToken,
    ) -> Result<PreviewDeployment> {
        let requester = DeployRequester::new(self.api, self.vcs);
        let request = requester.resolve(inputs, cwd).await?;

        println!("{}", render_summary(&request, &inputs.variables));

        let handle = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PreviewError::Cancelled),
            handle = requester.submit(&request) => handle?,
        };

        ActionWaiter::new(self.api, self.config.action.clone())
            .wait(&handle, cancel)
            .await?;

        let preview_url = self.context.preview_url(&request.name);
        println!("Preview URL: {}", preview_url);

        let polls = ResourcePoller::new(self.api, self.config.resources.clone())
            .wait_until_running(&handle.environment, cancel)
            .await?;

        info!(
            preview = %request.name,
            url = %preview_url,
            "Preview environment is ready"
        );

        Ok(PreviewDeployment {
            handle,
            preview_url,
            polls,
        })
    }
}
