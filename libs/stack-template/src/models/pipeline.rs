use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

/// A pipeline action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Action {
    pub name: String,
    pub action_type_id: ActionTypeId,
    pub configuration: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_artifacts: Vec<Artifact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_artifacts: Vec<Artifact>,

    pub run_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionTypeId {
    pub category: ActionCategory,
    pub owner: String,
    pub provider: String,
    pub version: String,
}

impl ActionTypeId {
    pub fn aws(category: ActionCategory, provider: &str) -> Self {
        Self {
            category,
            owner: "AWS".to_string(),
            provider: provider.to_string(),
            version: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCategory {
    Source,
    Build,
    Deploy,
    Test,
    Approval,
    Invoke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Artifact {
    pub name: String,
}

impl Artifact {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
