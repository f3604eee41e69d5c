//! Interactive chat REPL.

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::hooks::{log_raw_line, EventPrinter, StreamHook, TranscriptHook};
use crate::api::models::AgentConfiguration;
use crate::api::operations::{
    agent_message_ids, create_conversation, create_message, list_assistants,
    stream_agent_message_events,
};
use crate::api::stream::StreamEnd;
use crate::cli::Session;
use crate::utils::logging::TranscriptLog;

const PROMPT: &str = " >> ";
const EXIT_COMMAND: &str = "exit";

/// Parse a 1-based menu choice.
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Some(choice - 1),
        _ => None,
    }
}

async fn read_line<R>(lines: &mut Lines<R>, prompt: &str) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    print!("{prompt}");
    io::stdout().flush()?;
    lines.next_line().await
}

/// Print the assistants as a numbered list and ask until a valid index is given.
pub async fn select_assistant<R>(
    assistants: &[AgentConfiguration],
    lines: &mut Lines<R>,
) -> Result<String, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
{
    if assistants.is_empty() {
        return Err("No assistants available in this workspace".into());
    }

    println!("Found {} assistants:", assistants.len());
    for (index, assistant) in assistants.iter().enumerate() {
        println!("  - [{}] {}", index + 1, assistant.summary());
    }

    loop {
        let Some(input) = read_line(
            lines,
            "Please enter the index associated with the agent you wish to select: ",
        )
        .await?
        else {
            return Err("No assistant selected".into());
        };

        match parse_selection(&input, assistants.len()) {
            Some(index) => {
                let selected = &assistants[index];
                println!("Selected {}.\n", selected.name);
                return Ok(selected.s_id.clone());
            }
            None => println!("Enter a number between 1 and {}.", assistants.len()),
        }
    }
}

/// Cancel `token` when Ctrl-C arrives.
fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

/// Drive `work` to completion unless `cancel` fires first.
async fn until_cancelled<F: Future>(work: F, cancel: &CancellationToken) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = work => Some(output),
    }
}

/// Run `work` with Ctrl-C wired to abandon it; `None` means it was abandoned.
async fn interruptible<F: Future>(work: F) -> Option<F::Output> {
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());
    let output = until_cancelled(work, &cancel).await;
    watcher.abort();
    if output.is_none() {
        println!();
    }
    output
}

async fn stream_reply(
    session: &Session,
    conversation: &str,
    message: &str,
    transcript: Option<&TranscriptLog>,
    cancel: &CancellationToken,
) -> crate::api::Result<StreamEnd> {
    let mut printer = EventPrinter::new(io::stdout());
    let mut raw = log_raw_line;
    let mut transcript_hook = transcript.map(TranscriptHook::new);

    let result = {
        let mut hooks: Vec<&mut dyn StreamHook> = Vec::new();
        hooks.push(&mut printer);
        if let Some(hook) = transcript_hook.as_mut() {
            hooks.push(hook);
        }
        hooks.push(&mut raw);
        stream_agent_message_events(
            &session.client,
            &session.credentials,
            conversation,
            message,
            &mut hooks,
            cancel,
        )
        .await
    };

    let end = result?;
    match end {
        StreamEnd::Cancelled => {
            println!();
            info!("Reply cancelled");
        }
        StreamEnd::Interrupted if !printer.finished() => {
            println!();
            warn!("Connection lost before the reply finished");
        }
        _ => {}
    }
    Ok(end)
}

async fn exchange(
    session: &Session,
    conversation: &str,
    input: &str,
    user: &str,
    assistant: &str,
    transcript: Option<&TranscriptLog>,
    cancel: &CancellationToken,
) -> crate::api::Result<()> {
    let response = create_message(
        &session.client,
        &session.credentials,
        input,
        user,
        conversation,
        assistant,
    )
    .await?;

    let message_ids = agent_message_ids(&response);
    if message_ids.is_empty() {
        warn!("No assistant replied to the message");
    }
    for message_id in message_ids {
        debug!(message_id = %message_id, "Streaming agent message");
        if stream_reply(session, conversation, &message_id, transcript, cancel).await?
            == StreamEnd::Cancelled
        {
            break;
        }
    }
    Ok(())
}

pub async fn run_chat(
    session: &Session,
    assistant: Option<String>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let transcript = log.map(TranscriptLog::new).transpose()?;
    if let Some(log) = &transcript {
        info!(path = %log.path().display(), "Writing transcript");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let assistant = match assistant.or_else(|| session.default_assistant.clone()) {
        Some(assistant) => assistant,
        None => {
            let Some(assistants) =
                interruptible(list_assistants(&session.client, &session.credentials)).await
            else {
                return Ok(());
            };
            select_assistant(&assistants?, &mut lines).await?
        }
    };

    let Some(conversation) =
        interruptible(create_conversation(&session.client, &session.credentials)).await
    else {
        return Ok(());
    };
    let conversation = conversation?;
    let user = conversation.owner.name.clone();
    debug!(conversation = %conversation.s_id, "New conversation created");
    println!("Ask a question or get some @help. Type '{EXIT_COMMAND}' to quit.");

    loop {
        let line = tokio::select! {
            line = read_line(&mut lines, PROMPT) => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                None
            }
        };
        let Some(line) = line else { break };
        let input = line.trim();
        if input == EXIT_COMMAND {
            break;
        }
        if input.is_empty() {
            continue;
        }

        if let Some(log) = &transcript {
            if let Err(err) = log.log_user_message(&user, input) {
                warn!(error = %err, "Failed to write transcript");
            }
        }

        // Ctrl-C abandons the whole turn, including a pending create_message.
        let cancel = CancellationToken::new();
        let watcher = cancel_on_ctrl_c(cancel.clone());
        let turn = until_cancelled(
            exchange(
                session,
                &conversation.s_id,
                input,
                &user,
                &assistant,
                transcript.as_ref(),
                &cancel,
            ),
            &cancel,
        )
        .await;
        watcher.abort();

        match turn {
            None => {
                println!();
                info!("Turn cancelled");
            }
            Some(Ok(())) => {}
            Some(Err(err)) if err.is_auth_error() => return Err(err.into()),
            Some(Err(err)) => eprintln!("❌ {err}"),
        }
    }

    Ok(())
}
