use async_trait::async_trait;
use preview_core::{ActionHandle, ActionState, DeployRequest, ResourceStatuses};

use crate::error::Result;

/// Remote operations needed to deploy a preview and follow it to readiness.
#[async_trait]
pub trait PreviewApi: Send + Sync {
    /// Submit the deploy request and return the action it triggered
    async fn deploy_preview(&self, request: &DeployRequest) -> Result<ActionHandle>;

    /// Current state of a previously triggered action
    async fn get_action_status(&self, handle: &ActionHandle) -> Result<ActionState>;

    /// Status of every resource in the preview environment, freshly queried
    async fn get_resource_statuses(&self, environment: &str) -> Result<ResourceStatuses>;
}
