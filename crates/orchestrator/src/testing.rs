//! Scripted `PreviewApi` used by the waiter, poller and pipeline tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use okteto::{OktetoError, PreviewApi};
use preview_core::{ActionHandle, ActionState, DeployRequest, ResourceStatuses};

#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// A retryable failure (HTTP 503)
    Transient,
    /// A non-retryable failure
    Fatal,
}

impl<T> Reply<T> {
    fn into_result(self) -> okteto::Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Transient => Err(OktetoError::Api {
                message: "service unavailable".to_string(),
                status_code: Some(503),
            }),
            Reply::Fatal => Err(OktetoError::GraphQl("preview not found".to_string())),
        }
    }
}

pub fn statuses(entries: &[(&str, &str)]) -> ResourceStatuses {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>()
}

/// Replies are consumed in order; the last one repeats forever.
pub struct FakeApi {
    deploy: Reply<ActionHandle>,
    actions: Vec<Reply<ActionState>>,
    resources: Vec<Reply<ResourceStatuses>>,
    deploy_calls: AtomicUsize,
    action_calls: AtomicUsize,
    resource_calls: AtomicUsize,
    submitted: Mutex<Option<DeployRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            deploy: Reply::Ok(ActionHandle::new("deploy-preview", "preview")),
            actions: vec![Reply::Ok(ActionState::Succeeded)],
            resources: vec![Reply::Ok(ResourceStatuses::new())],
            deploy_calls: AtomicUsize::new(0),
            action_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            submitted: Mutex::new(None),
        }
    }

    pub fn with_deploy(mut self, reply: Reply<ActionHandle>) -> Self {
        self.deploy = reply;
        self
    }

    pub fn with_actions(mut self, replies: Vec<Reply<ActionState>>) -> Self {
        self.actions = replies;
        self
    }

    pub fn with_resources(mut self, replies: Vec<Reply<ResourceStatuses>>) -> Self {
        self.resources = replies;
        self
    }

    pub fn deploy_calls(&self) -> usize {
        self.deploy_calls.load(Ordering::SeqCst)
    }

    pub fn action_calls(&self) -> usize {
        self.action_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Option<DeployRequest> {
        self.submitted.lock().unwrap().clone()
    }

    fn next<T: Clone>(replies: &[Reply<T>], counter: &AtomicUsize) -> Reply<T> {
        let index = counter.fetch_add(1, Ordering::SeqCst);
        replies
            .get(index)
            .or_else(|| replies.last())
            .cloned()
            .unwrap_or(Reply::Fatal)
    }
}

#[async_trait]
impl PreviewApi for FakeApi {
    async fn deploy_preview(&self, request: &DeployRequest) -> okteto::Result<ActionHandle> {
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        *self.submitted.lock().unwrap() = Some(request.clone());
        self.deploy.clone().into_result()
    }

    async fn get_action_status(&self, _handle: &ActionHandle) -> okteto::Result<ActionState> {
        Self::next(&self.actions, &self.action_calls).into_result()
    }

    async fn get_resource_statuses(&self, _environment: &str) -> okteto::Result<ResourceStatuses> {
        Self::next(&self.resources, &self.resource_calls).into_result()
    }
}
