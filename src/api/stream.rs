//! Line-oriented consumer for long-lived event streams.

use std::borrow::Cow;
use std::fmt::Display;

use futures_util::stream::{Stream, StreamExt};
use memchr::memchr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::client::{Credentials, DustClient};
use crate::api::error::Result;
use crate::api::hooks::StreamHook;

/// Longest partial line kept while waiting for its newline.
pub const MAX_LINE_LEN: usize = 4 * 1024 * 1024;

/// How a stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server closed the stream.
    Completed,
    /// The transport failed mid-stream.
    Interrupted,
    /// The caller cancelled the wait.
    Cancelled,
}

fn dispatch_line(raw: &[u8], hooks: &mut [&mut dyn StreamHook]) {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line: Cow<'_, str> = String::from_utf8_lossy(raw);
    if line.trim().is_empty() {
        return;
    }
    for hook in hooks.iter_mut() {
        hook.on_line(&line);
    }
}

/// Split a byte stream into lines and hand every non-blank line to each hook
/// in order.
///
/// Transport errors and cancellation end the stream quietly; a partial line
/// left in the buffer is only delivered when the stream completes normally.
/// A line growing past [`MAX_LINE_LEN`] ends the stream as interrupted.
pub async fn consume_lines<S, B, E>(
    stream: S,
    hooks: &mut [&mut dyn StreamHook],
    cancel: &CancellationToken,
) -> StreamEnd
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    consume_lines_bounded(stream, hooks, cancel, MAX_LINE_LEN).await
}

async fn consume_lines_bounded<S, B, E>(
    stream: S,
    hooks: &mut [&mut dyn StreamHook],
    cancel: &CancellationToken,
    max_line_len: usize,
) -> StreamEnd
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Event stream cancelled");
                return StreamEnd::Cancelled;
            }
            chunk = stream.next() => chunk,
        };

        match next {
            Some(Ok(chunk)) => {
                buffer.extend_from_slice(chunk.as_ref());
                while let Some(newline_pos) = memchr(b'\n', &buffer) {
                    dispatch_line(&buffer[..newline_pos], hooks);
                    buffer.drain(..=newline_pos);
                }
                if buffer.len() > max_line_len {
                    debug!(
                        buffered = buffer.len(),
                        max_line_len, "Event stream line too long; dropping stream"
                    );
                    return StreamEnd::Interrupted;
                }
            }
            Some(Err(err)) => {
                debug!(error = %err, "Event stream interrupted");
                return StreamEnd::Interrupted;
            }
            None => break,
        }
    }

    if !buffer.is_empty() {
        dispatch_line(&buffer, hooks);
    }
    StreamEnd::Completed
}

/// Open a streamed GET on `endpoint` and feed its lines to `hooks`.
///
/// Blocks until the server closes the stream, the connection breaks, or
/// `cancel` fires. Only a failure to open the stream is an error.
pub async fn stream(
    client: &DustClient,
    endpoint: &str,
    credentials: &Credentials,
    hooks: &mut [&mut dyn StreamHook],
    cancel: &CancellationToken,
) -> Result<StreamEnd> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
        response = client.open_stream(endpoint, credentials) => response?,
    };

    let end = consume_lines(response.bytes_stream(), hooks, cancel).await;
    debug!(endpoint, ?end, "Event stream finished");
    Ok(end)
}
