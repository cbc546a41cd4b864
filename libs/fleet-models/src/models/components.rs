use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scope filter for `ListComponents`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentScope {
    Private,
    Public,
}

impl ComponentScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentScope::Private => "PRIVATE",
            ComponentScope::Public => "PUBLIC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLatestVersion {
    #[serde(default)]
    pub arn: Option<String>,

    #[serde(default)]
    pub component_version: Option<String>,

    #[serde(default)]
    pub creation_timestamp: Option<f64>,

    #[serde(default)]
    pub publisher: Option<String>,
}

/// Entry of a `ListComponents` page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub arn: String,
    pub component_name: String,

    #[serde(default)]
    pub latest_version: Option<ComponentLatestVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComponentsResponse {
    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentVersionListItem {
    pub component_name: String,
    pub component_version: String,

    #[serde(default)]
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComponentVersionsResponse {
    #[serde(default)]
    pub component_versions: Vec<ComponentVersionListItem>,

    #[serde(default)]
    pub next_token: Option<String>,
}

/// Body of `CreateComponentVersion`; `inline_recipe` is base64 encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentVersionRequest {
    pub inline_recipe: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudComponentStatus {
    #[serde(default)]
    pub component_state: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl CloudComponentStatus {
    /// The registry reports failures either as an error map or a FAILED state
    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty() || self.component_state.as_deref() == Some("FAILED")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentVersionResponse {
    #[serde(default)]
    pub arn: Option<String>,

    pub component_name: String,
    pub component_version: String,

    #[serde(default)]
    pub creation_timestamp: Option<f64>,

    pub status: CloudComponentStatus,
}
