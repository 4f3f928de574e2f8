use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use preview_core::{ActionHandle, ActionState, DeployRequest, ResourceStatuses};

use crate::context::OktetoContext;
use crate::error::{OktetoError, Result};
use crate::traits::PreviewApi;
use crate::types::{
    ActionData, ActionVariables, DeployPreviewData, DeployPreviewVariables, GraphQlRequest,
    GraphQlResponse, PreviewResourcesData, PreviewResourcesVariables,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEPLOY_PREVIEW_MUTATION: &str = r#"mutation DeployPreview($name: String!, $scope: PreviewScope!, $repository: String!, $branch: String!, $sourceUrl: String, $filename: String, $variables: [InputVariable]) {
  deployPreview(name: $name, scope: $scope, repository: $repository, branch: $branch, sourceUrl: $sourceUrl, filename: $filename, variables: $variables) {
    id
    action { id name status }
  }
}"#;

const GET_ACTION_QUERY: &str = r#"query GetAction($name: String!, $space: String!) {
  action(name: $name, space: $space) { id name status }
}"#;

const GET_PREVIEW_RESOURCES_QUERY: &str = r#"query GetPreviewResources($id: String!) {
  preview(id: $id) {
    deployments { name status }
    statefulsets { name status }
    jobs { name status }
    cronjobs { name status }
  }
}"#;

pub struct OktetoClient {
    context: OktetoContext,
    client: Client,
}

impl OktetoClient {
    pub fn new(context: &OktetoContext) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("deploy-preview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(context, client))
    }

    pub fn with_client(context: &OktetoContext, client: Client) -> Self {
        Self {
            context: context.clone(),
            client,
        }
    }

    pub fn context(&self) -> &OktetoContext {
        &self.context
    }

    async fn graphql<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        debug!(operation = operation, "Sending GraphQL request");

        let response = self
            .client
            .post(self.context.graphql_url())
            .bearer_auth(self.context.token())
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        self.handle_response(operation, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(OktetoError::Unauthorized(format!(
                "{} rejected with status {}, check your token",
                operation, status
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OktetoError::Api {
                message: format!("{} failed with status {}: {}", operation, status, body),
                status_code: Some(status.as_u16()),
            });
        }

        let body: GraphQlResponse<T> = response.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(OktetoError::GraphQl(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| OktetoError::InvalidResponse(format!("{} returned no data", operation)))
    }
}

#[async_trait]
impl PreviewApi for OktetoClient {
    async fn deploy_preview(&self, request: &DeployRequest) -> Result<ActionHandle> {
        let variables = DeployPreviewVariables {
            name: &request.name,
            scope: request.scope.as_str(),
            repository: &request.repository,
            branch: &request.branch,
            source_url: request.source_url.as_deref(),
            filename: request.filename.as_deref(),
            variables: &request.variables,
        };

        let data: DeployPreviewData = self
            .graphql("deployPreview", DEPLOY_PREVIEW_MUTATION, variables)
            .await?;
        let preview = data.deploy_preview;

        debug!(
            preview = %request.name,
            action = %preview.action.name,
            status = %preview.action.status,
            "Preview deployment submitted"
        );

        Ok(ActionHandle::new(preview.action.name, &request.name)
            .with_action_id(preview.action.id)
            .with_preview_id(preview.id))
    }

    async fn get_action_status(&self, handle: &ActionHandle) -> Result<ActionState> {
        let variables = ActionVariables {
            name: &handle.action_name,
            space: &handle.environment,
        };

        let data: ActionData = self.graphql("action", GET_ACTION_QUERY, variables).await?;
        let action = data.action.ok_or_else(|| {
            OktetoError::InvalidResponse(format!("action '{}' not found", handle.action_name))
        })?;

        Ok(ActionState::from(action.status.as_str()))
    }

    async fn get_resource_statuses(&self, environment: &str) -> Result<ResourceStatuses> {
        let variables = PreviewResourcesVariables { id: environment };

        let data: PreviewResourcesData = self
            .graphql("preview", GET_PREVIEW_RESOURCES_QUERY, variables)
            .await?;
        let preview = data.preview.ok_or_else(|| {
            OktetoError::InvalidResponse(format!("preview '{}' not found", environment))
        })?;

        Ok(preview.into_entries().collect())
    }
}
