//! Hooks invoked for every line of an event stream.
//!
//! A hook receives the raw line and does its own parsing. Hooks never fail:
//! anything they cannot make sense of is logged and skipped.

use std::io::Write;

use tracing::{debug, error, warn};

use crate::api::events::{parse_event_line, ConversationEvent};
use crate::utils::logging::TranscriptLog;

pub trait StreamHook {
    fn on_line(&mut self, line: &str);
}

impl<F> StreamHook for F
where
    F: FnMut(&str),
{
    fn on_line(&mut self, line: &str) {
        self(line)
    }
}

/// Debug-log every raw line.
pub fn log_raw_line(line: &str) {
    debug!(line, "Event stream line");
}

/// Renders assistant replies as they stream in.
///
/// Only `tokens` are written; chain-of-thought and delimiter tokens are
/// dropped.
pub struct EventPrinter<W: Write> {
    out: W,
    finished: bool,
}

impl<W: Write> EventPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            finished: false,
        }
    }

    /// Whether a terminal event for the message has been seen.
    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn handle(&mut self, event: &ConversationEvent) -> std::io::Result<()> {
        match event {
            ConversationEvent::GenerationTokens {
                text,
                classification,
                ..
            } if classification == "tokens" => {
                write!(self.out, "{text}")?;
                self.out.flush()?;
            }
            ConversationEvent::AgentMessageSuccess { .. } => {
                writeln!(self.out)?;
                self.out.flush()?;
            }
            ConversationEvent::AgentError { error: err, .. }
            | ConversationEvent::UserMessageError { error: err } => {
                writeln!(self.out)?;
                error!(code = %err.code, "Assistant error: {}", err.message);
            }
            ConversationEvent::AgentGenerationCancelled { .. } => {
                writeln!(self.out)?;
                warn!("Generation cancelled");
            }
            ConversationEvent::ConversationTitle { title } => {
                debug!(title = %title, "Conversation title updated");
            }
            _ => {}
        }
        if event.is_terminal() {
            self.finished = true;
        }
        Ok(())
    }
}

impl<W: Write> StreamHook for EventPrinter<W> {
    fn on_line(&mut self, line: &str) {
        let parsed = parse_event_line(line);
        for envelope in &parsed.envelopes {
            if let Err(err) = self.handle(&envelope.data) {
                debug!(error = %err, "Failed to render event");
            }
        }
        if let Some(err) = parsed.error {
            debug!(error = %err, line, "Unparseable event line");
        }
    }
}

/// Accumulates the assistant reply and appends it to a transcript when the
/// message completes.
pub struct TranscriptHook<'a> {
    log: &'a TranscriptLog,
    reply: String,
}

impl<'a> TranscriptHook<'a> {
    pub fn new(log: &'a TranscriptLog) -> Self {
        Self {
            log,
            reply: String::new(),
        }
    }

    fn flush_reply(&mut self) {
        if self.reply.is_empty() {
            return;
        }
        if let Err(err) = self.log.log_message(&self.reply) {
            warn!(path = %self.log.path().display(), error = %err, "Failed to write transcript");
        }
        self.reply.clear();
    }
}

impl StreamHook for TranscriptHook<'_> {
    fn on_line(&mut self, line: &str) {
        for envelope in parse_event_line(line).envelopes {
            match envelope.data {
                ConversationEvent::GenerationTokens {
                    text,
                    classification,
                    ..
                } if classification == "tokens" => self.reply.push_str(&text),
                event if event.is_terminal() => self.flush_reply(),
                _ => {}
            }
        }
    }
}
