use serde::{Deserialize, Serialize};

use preview_core::Variable;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPreviewVariables<'a> {
    pub name: &'a str,
    pub scope: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<&'a str>,
    pub variables: &'a [Variable],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPreviewData {
    pub deploy_preview: PreviewBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewBody {
    pub id: Option<String>,
    pub action: ActionBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionBody {
    pub id: Option<String>,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionVariables<'a> {
    pub name: &'a str,
    pub space: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionData {
    pub action: Option<ActionBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResourcesVariables<'a> {
    pub id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewResourcesData {
    pub preview: Option<PreviewResources>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewResources {
    #[serde(default)]
    pub deployments: Vec<ResourceBody>,
    #[serde(default)]
    pub statefulsets: Vec<ResourceBody>,
    #[serde(default)]
    pub jobs: Vec<ResourceBody>,
    #[serde(default)]
    pub cronjobs: Vec<ResourceBody>,
}

impl PreviewResources {
    /// Flatten every resource kind into `kind/name` entries.
    pub fn into_entries(self) -> impl Iterator<Item = (String, String)> {
        let kinds = [
            ("deployment", self.deployments),
            ("statefulset", self.statefulsets),
            ("job", self.jobs),
            ("cronjob", self.cronjobs),
        ];
        kinds.into_iter().flat_map(|(kind, resources)| {
            resources
                .into_iter()
                .map(move |r| (format!("{}/{}", kind, r.name), r.status.to_lowercase()))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceBody {
    pub name: String,
    pub status: String,
}
