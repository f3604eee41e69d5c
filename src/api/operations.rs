//! Endpoint operations.
//!
//! Each operation builds its body, makes one call through
//! [`DustClient::execute`], and maps the JSON it gets back.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::client::{Credentials, DustClient, Method};
use crate::api::error::Result;
use crate::api::hooks::StreamHook;
use crate::api::models::{take_field, AgentConfiguration, Conversation, Entity};
use crate::api::stream::{stream, StreamEnd};
use crate::api::{CreateConversationRequest, MessageContext, MessageRequest};

/// Assistant mentioned by `create_conversation_with_message` unless told otherwise.
pub const DEFAULT_CONVERSATION_ASSISTANT: &str = "helper";

/// Assistant mentioned by `create_message` unless told otherwise.
pub const DEFAULT_MESSAGE_ASSISTANT: &str = "dust";

const CONVERSATIONS_ENDPOINT: &str = "assistant/conversations";
const AGENT_CONFIGURATIONS_ENDPOINT: &str = "assistant/agent_configurations";

pub fn conversation_endpoint(conversation: &str) -> String {
    format!("{CONVERSATIONS_ENDPOINT}/{conversation}")
}

pub fn messages_endpoint(conversation: &str) -> String {
    format!("{CONVERSATIONS_ENDPOINT}/{conversation}/messages")
}

pub fn message_events_endpoint(conversation: &str, message: &str) -> String {
    format!("{CONVERSATIONS_ENDPOINT}/{conversation}/messages/{message}/events")
}

fn to_body<T: serde::Serialize>(body: &T) -> Result<Value> {
    Ok(serde_json::to_value(body)?)
}

/// Create an empty conversation.
pub async fn create_conversation(
    client: &DustClient,
    credentials: &Credentials,
) -> Result<Conversation> {
    let body = to_body(&CreateConversationRequest::new(None))?;
    let response = client
        .execute(Method::Post, CONVERSATIONS_ENDPOINT, credentials, Some(&body))
        .await?;
    Conversation::from_value(take_field(response.json()?, "conversation")?)
}

/// Create a conversation whose first message mentions `assistant`.
///
/// Unlike [`create_conversation`], the top-level response object is decoded
/// directly.
pub async fn create_conversation_with_message(
    client: &DustClient,
    credentials: &Credentials,
    message: &str,
    user: &str,
    assistant: &str,
) -> Result<Conversation> {
    let request = CreateConversationRequest::new(Some(MessageRequest::to_assistant(
        message,
        MessageContext::for_user(user),
        assistant,
    )));
    let body = to_body(&request)?;
    let response = client
        .execute(Method::Post, CONVERSATIONS_ENDPOINT, credentials, Some(&body))
        .await?;
    Conversation::from_value(response.json()?)
}

/// Post a message to an existing conversation; the response is returned as-is.
pub async fn create_message(
    client: &DustClient,
    credentials: &Credentials,
    message: &str,
    user: &str,
    conversation: &str,
    assistant: &str,
) -> Result<Value> {
    let request = MessageRequest::to_assistant(message, MessageContext::for_user(user), assistant);
    let body = to_body(&request)?;
    let response = client
        .execute(
            Method::Post,
            &messages_endpoint(conversation),
            credentials,
            Some(&body),
        )
        .await?;
    response.json()
}

pub async fn get_conversation(
    client: &DustClient,
    credentials: &Credentials,
    conversation: &str,
) -> Result<Conversation> {
    let response = client
        .execute(
            Method::Get,
            &conversation_endpoint(conversation),
            credentials,
            None,
        )
        .await?;
    Conversation::from_value(take_field(response.json()?, "conversation")?)
}

/// List the assistants available in the workspace, in server order.
pub async fn list_assistants(
    client: &DustClient,
    credentials: &Credentials,
) -> Result<Vec<AgentConfiguration>> {
    let response = client
        .execute(Method::Get, AGENT_CONFIGURATIONS_ENDPOINT, credentials, None)
        .await?;
    let configurations: Vec<Value> =
        serde_json::from_value(take_field(response.json()?, "agentConfigurations")?)?;
    configurations
        .into_iter()
        .map(AgentConfiguration::from_value)
        .collect()
}

/// sIds of the agent messages in a `create_message` response.
pub fn agent_message_ids(response: &Value) -> Vec<String> {
    response
        .get("agentMessages")
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(|message| message.get("sId").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Stream the events of one agent message into `hooks`.
pub async fn stream_agent_message_events(
    client: &DustClient,
    credentials: &Credentials,
    conversation: &str,
    message: &str,
    hooks: &mut [&mut dyn StreamHook],
    cancel: &CancellationToken,
) -> Result<StreamEnd> {
    let endpoint = message_events_endpoint(conversation, message);
    stream(client, &endpoint, credentials, hooks, cancel).await
}
