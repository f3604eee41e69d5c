//! Dust API request/response layer.
//!
//! - [`client`] builds authenticated requests and classifies responses.
//! - [`models`] holds the typed entities decoded from responses.
//! - [`operations`] composes the two into the endpoint calls the CLI uses.
//! - [`stream`] consumes long-lived event streams line by line and feeds
//!   them to [`hooks`]; [`events`] parses the lines into typed events.

pub mod client;
pub mod error;
pub mod events;
pub mod hooks;
pub mod models;
pub mod operations;
pub mod stream;


use serde::Serialize;
use serde_json::Value;

use crate::api::models::Visibility;
use crate::utils::timezone::local_timezone;

pub use client::{Credentials, DustClient, Method, RawResponse};
pub use error::{ApiError, Result};
pub use models::{AgentConfiguration, Conversation, Entity, Model, Workspace};

/// Origin tag attached to every message this client posts.
pub const MESSAGE_ORIGIN: &str = "api";

/// Who is speaking, attached to each posted message.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    pub timezone: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub profile_picture_url: String,
    pub origin: String,
}

impl MessageContext {
    pub fn for_user(username: &str) -> Self {
        Self::with_timezone(username, local_timezone())
    }

    pub fn with_timezone(username: &str, timezone: String) -> Self {
        Self {
            timezone,
            username: username.to_string(),
            full_name: String::new(),
            email: String::new(),
            profile_picture_url: String::new(),
            origin: MESSAGE_ORIGIN.to_string(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    #[serde(rename = "configurationId")]
    pub configuration_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageRequest {
    pub content: String,
    pub context: MessageContext,
    pub mentions: Vec<Mention>,
}

impl MessageRequest {
    /// A message addressed to a single assistant.
    pub fn to_assistant(content: &str, context: MessageContext, assistant: &str) -> Self {
        Self {
            content: content.to_string(),
            context,
            mentions: vec![Mention {
                configuration_id: assistant.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub title: Option<String>,
    pub visibility: Visibility,
    pub message: Option<MessageRequest>,
    pub content_fragments: Vec<Value>,
}

impl CreateConversationRequest {
    pub fn new(message: Option<MessageRequest>) -> Self {
        Self {
            title: None,
            visibility: Visibility::Workspace,
            message,
            content_fragments: Vec::new(),
        }
    }
}
