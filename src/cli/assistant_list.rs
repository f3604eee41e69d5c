//! Assistant listing

use std::error::Error;

use crate::api::models::AgentConfiguration;
use crate::api::operations;
use crate::cli::Session;

/// The lines printed for one assistant.
pub fn describe_assistant(assistant: &AgentConfiguration) -> Vec<String> {
    let mut lines = vec![format!("  • {}", assistant.summary())];
    lines.push(format!(
        "    Model: {}/{}",
        assistant.model.provider_id, assistant.model.model_id
    ));
    lines.push(format!("    Scope: {}", assistant.scope));
    if !assistant.is_active() {
        lines.push(format!("    Status: {}", assistant.status));
    }
    lines
}

pub async fn list_assistants(session: &Session) -> Result<(), Box<dyn Error>> {
    let assistants = operations::list_assistants(&session.client, &session.credentials).await?;

    println!(
        "🤖 Assistants in workspace {}",
        session.credentials.workspace_id
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if assistants.is_empty() {
        println!("No assistants found in this workspace.");
        return Ok(());
    }

    println!("Found {} assistants:", assistants.len());
    println!();
    for assistant in &assistants {
        for line in describe_assistant(assistant) {
            println!("{line}");
        }
        println!();
    }

    Ok(())
}
