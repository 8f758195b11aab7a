//! Server-Sent Events plumbing shared by every streaming provider.
//!
//! Vendors deliver `data:` payloads separated by blank lines. Network chunks
//! can split a line (or a multi-byte character) anywhere, so the decoder
//! buffers raw bytes and only decodes complete lines.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use super::LlmError;

/// What a provider makes of one `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseStep {
    /// A text delta to forward. May be empty.
    Piece(String),
    /// Bookkeeping event with no text (ping, message_start, ...).
    Skip,
    /// The vendor signalled the end of the response.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns every event payload completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            self.feed_line(&line, &mut events);
        }
        events
    }

    /// Flushes an unterminated trailing line and any pending payload.
    pub fn finish(mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            let line = line.trim_end_matches('\r').to_string();
            self.feed_line(&line, &mut events);
        }
        if let Some(data) = self.data.take() {
            events.push(data);
        }
        events
    }

    fn feed_line(&mut self, line: &str, events: &mut Vec<String>) {
        if line.is_empty() {
            if let Some(data) = self.data.take() {
                events.push(data);
            }
            return;
        }

        // `event:`, `id:`, `retry:` and `:` comments carry nothing we need;
        // every vendor repeats the event type inside the JSON payload.
        if let Some(rest) = line.strip_prefix("data:") {
            let fragment = rest.strip_prefix(' ').unwrap_or(rest);
            match &mut self.data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(fragment);
                }
                None => self.data = Some(fragment.to_string()),
            }
        }
    }
}

/// Reads an SSE response to the end, forwarding every piece `parse` extracts
/// into `sink`. Returns early when `parse` reports `Done` or the receiver of
/// `sink` has gone away.
pub async fn forward_sse<F>(
    response: reqwest::Response,
    sink: &mpsc::Sender<String>,
    mut parse: F,
) -> Result<(), LlmError>
where
    F: FnMut(&str) -> Result<SseStep, LlmError>,
{
    let mut decoder = SseDecoder::new();
    let mut stream = response.bytes_stream();

    while let Some(item) = stream.next().await {
        let bytes = item?;
        for data in decoder.push(&bytes) {
            if !dispatch(&data, sink, &mut parse).await? {
                return Ok(());
            }
        }
    }

    for data in decoder.finish() {
        if !dispatch(&data, sink, &mut parse).await? {
            return Ok(());
        }
    }

    Ok(())
}

/// Returns `false` when streaming should stop.
async fn dispatch<F>(data: &str, sink: &mpsc::Sender<String>, parse: &mut F) -> Result<bool, LlmError>
where
    F: FnMut(&str) -> Result<SseStep, LlmError>,
{
    match parse(data)? {
        SseStep::Piece(piece) => {
            if piece.is_empty() {
                return Ok(true);
            }
            if sink.send(piece).await.is_err() {
                debug!("Stream receiver dropped, stopping provider read");
                return Ok(false);
            }
            Ok(true)
        }
        SseStep::Skip => Ok(true),
        SseStep::Done => Ok(false),
    }
}
