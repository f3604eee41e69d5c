//! One-shot conversation commands; each prints the API result as pretty JSON.

use std::error::Error;

use crate::api::operations::{self, DEFAULT_CONVERSATION_ASSISTANT, DEFAULT_MESSAGE_ASSISTANT};
use crate::cli::Session;

pub async fn create_conversation(
    session: &Session,
    message: &str,
    user: &str,
    assistant: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let assistant = session.assistant_or(assistant, DEFAULT_CONVERSATION_ASSISTANT);
    let conversation = operations::create_conversation_with_message(
        &session.client,
        &session.credentials,
        message,
        user,
        &assistant,
    )
    .await?;
    println!("{conversation}");
    Ok(())
}

pub async fn create_message(
    session: &Session,
    message: &str,
    user: &str,
    conversation: &str,
    assistant: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let assistant = session.assistant_or(assistant, DEFAULT_MESSAGE_ASSISTANT);
    let response = operations::create_message(
        &session.client,
        &session.credentials,
        message,
        user,
        conversation,
        &assistant,
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn get_conversation(session: &Session, conversation: &str) -> Result<(), Box<dyn Error>> {
    let conversation =
        operations::get_conversation(&session.client, &session.credentials, conversation).await?;
    println!("{conversation}");
    Ok(())
}
