//! Typed entities decoded from Dust API responses.
//!
//! Nested structures (a conversation's owning workspace, an assistant's
//! model) are decoded by their own `Deserialize` impls, so once an entity
//! exists its nested fields are always the typed value. A payload whose
//! nested value has the wrong shape fails with [`ApiError::Decode`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, Result};

/// Conversion between raw JSON and a typed entity.
pub trait Entity: Serialize + DeserializeOwned {
    /// Name used in decode errors.
    const NAME: &'static str;

    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            entity: Self::NAME,
            source,
        })
    }

    /// JSON projection of every field, nested entities expanded.
    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Remove `field` from a response object and return its value.
pub fn take_field(mut value: Value, field: &'static str) -> Result<Value> {
    value
        .as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or(ApiError::MissingField(field))
}

macro_rules! pretty_display {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $entity {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.to_pretty_json())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Admin,
    Builder,
    User,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: i64,
    #[serde(rename = "sId")]
    pub s_id: String,
    pub name: String,
    pub role: WorkspaceRole,
    #[serde(default)]
    pub segmentation: Option<String>,
    #[serde(default)]
    pub white_listed_providers: Option<Vec<String>>,
    #[serde(default)]
    pub default_embedding_provider: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub sso_enforced: Option<bool>,
}

impl Entity for Workspace {
    const NAME: &'static str = "Workspace";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Unlisted,
    Workspace,
    Deleted,
    Test,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    /// Creation time in milliseconds since the epoch.
    pub created: i64,
    #[serde(rename = "sId")]
    pub s_id: String,
    pub owner: Workspace,
    #[serde(default)]
    pub title: Option<String>,
    pub visibility: Visibility,
    /// Message records, kept opaque.
    #[serde(default)]
    pub content: Vec<Value>,
}

impl Conversation {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created)
    }
}

impl Entity for Conversation {
    const NAME: &'static str = "Conversation";
}

/// The model an assistant runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub provider_id: String,
    pub model_id: String,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
}

impl Entity for Model {
    const NAME: &'static str = "Model";
}

/// An assistant as returned by the agent configuration endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfiguration {
    pub id: i64,
    #[serde(rename = "sId")]
    pub s_id: String,
    pub version: u32,
    #[serde(default)]
    pub version_created_at: Option<String>,
    #[serde(default)]
    pub version_author_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub picture_url: String,
    /// `active`, `archived`, `draft`, or one of the `disabled_*` global states.
    pub status: String,
    #[serde(default)]
    pub user_list_status: Option<String>,
    /// `global`, `workspace`, `published` or `private`.
    pub scope: String,
    pub model: Model,
    #[serde(default)]
    pub actions: Vec<Value>,
    #[serde(default)]
    pub max_steps_per_run: u32,
    #[serde(default)]
    pub visualization_enabled: bool,
    #[serde(default)]
    pub template_id: Option<String>,
}

impl AgentConfiguration {
    /// One-line description used when picking an assistant.
    pub fn summary(&self) -> String {
        if self.description.is_empty() {
            format!("{} ({})", self.name, self.s_id)
        } else {
            format!("{} ({}): {}", self.name, self.s_id, self.description)
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl Entity for AgentConfiguration {
    const NAME: &'static str = "AgentConfiguration";
}

pretty_display!(Workspace, Conversation, Model, AgentConfiguration);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace_json() -> Value {
        json!({
            "id": 42,
            "sId": "w0rksp4ce",
            "name": "Acme",
            "role": "builder",
            "segmentation": null,
            "whiteListedProviders": ["openai", "anthropic"],
            "defaultEmbeddingProvider": "openai",
            "flags": ["labs_features"],
            "ssoEnforced": false
        })
    }

    fn conversation_json() -> Value {
        json!({
            "id": 7,
            "created": 1_700_000_000_000_i64,
            "sId": "c0nv",
            "owner": workspace_json(),
            "title": null,
            "visibility": "workspace",
            "content": [[{"type": "user_message", "sId": "m1"}]]
        })
    }

    fn assistant_json(s_id: &str, model_id: &str) -> Value {
        json!({
            "id": 1,
            "sId": s_id,
            "version": 3,
            "versionCreatedAt": null,
            "versionAuthorId": null,
            "name": s_id,
            "description": "Helps",
            "instructions": "Be nice",
            "pictureUrl": "https://example.com/p.png",
            "status": "active",
            "userListStatus": "in-list",
            "scope": "global",
            "model": {"providerId": "openai", "modelId": model_id, "temperature": 0.7},
            "actions": [],
            "maxStepsPerRun": 3,
            "visualizationEnabled": false,
            "templateId": null
        })
    }

    #[test]
    fn conversation_owner_is_decoded_as_workspace() {
        let conversation = Conversation::from_value(conversation_json()).unwrap();
        let expected = Workspace::from_value(workspace_json()).unwrap();

        assert_eq!(conversation.owner, expected);
        assert_eq!(conversation.owner.role, WorkspaceRole::Builder);
        assert_eq!(conversation.owner.s_id, "w0rksp4ce");
        assert_eq!(conversation.visibility, Visibility::Workspace);
        assert_eq!(conversation.content.len(), 1);
    }

    #[test]
    fn remapping_a_projection_is_idempotent() {
        let conversation = Conversation::from_value(conversation_json()).unwrap();
        let again = Conversation::from_value(conversation.to_value()).unwrap();
        assert_eq!(again, conversation);

        let assistant = AgentConfiguration::from_value(assistant_json("helper", "gpt-4")).unwrap();
        let again = AgentConfiguration::from_value(assistant.to_value()).unwrap();
        assert_eq!(again, assistant);
    }

    #[test]
    fn assistant_model_is_decoded() {
        let assistant = AgentConfiguration::from_value(assistant_json("dust", "gpt-4o")).unwrap();
        assert_eq!(assistant.model.provider_id, "openai");
        assert_eq!(assistant.model.model_id, "gpt-4o");
        assert!((assistant.model.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(assistant.summary(), "dust (dust): Helps");
        assert!(assistant.is_active());
    }

    #[test]
    fn malformed_nested_value_fails_loudly() {
        let mut raw = conversation_json();
        raw["owner"] = json!("not a workspace");

        match Conversation::from_value(raw) {
            Err(ApiError::Decode { entity, .. }) => assert_eq!(entity, "Conversation"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn optional_workspace_fields_default() {
        let workspace = Workspace::from_value(json!({
            "id": 1,
            "sId": "w",
            "name": "W",
            "role": "none"
        }))
        .unwrap();

        assert_eq!(workspace.role, WorkspaceRole::None);
        assert!(workspace.flags.is_empty());
        assert!(workspace.white_listed_providers.is_none());
        assert!(workspace.sso_enforced.is_none());
    }

    #[test]
    fn display_is_pretty_json_with_nested_entities() {
        let conversation = Conversation::from_value(conversation_json()).unwrap();
        let rendered = conversation.to_string();

        assert!(rendered.starts_with("{\n  \"id\": 7,"));
        assert!(rendered.contains("\"owner\": {\n    \"id\": 42,"));
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(reparsed["owner"]["name"], "Acme");
    }

    #[test]
    fn created_at_converts_milliseconds() {
        let conversation = Conversation::from_value(conversation_json()).unwrap();
        let created = conversation.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_700_000_000);
    }

    #[test]
    fn take_field_unwraps_envelopes() {
        let inner = take_field(json!({"conversation": {"sId": "c"}}), "conversation").unwrap();
        assert_eq!(inner["sId"], "c");

        assert!(matches!(
            take_field(json!({"other": 1}), "conversation"),
            Err(ApiError::MissingField("conversation"))
        ));
        assert!(matches!(
            take_field(json!([1, 2]), "conversation"),
            Err(ApiError::MissingField("conversation"))
        ));
    }
}
