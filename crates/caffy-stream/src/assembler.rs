use futures_util::{Stream, StreamExt};
use tracing::{debug, trace};

use crate::decode::Utf8Carry;
use crate::error::StreamError;
use crate::frame::{classify_line, find_last_session_id, LineKind};
use crate::observer::TurnObserver;

/// How a turn's stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// The server sent `data: [DONE]`.
    Done,
    /// The byte source ran out without a termination frame.
    EndOfStream,
}

/// Final state of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledTurn {
    pub message: String,
    pub session_id: Option<String>,
    pub end: TurnEnd,
}

/// Per-turn state machine from raw bytes to a growing assistant message.
///
/// Feed chunks with [`push_chunk`](Self::push_chunk) in arrival order, then
/// call [`finish`](Self::finish) once the source is exhausted. One assembler
/// serves exactly one turn.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    decoder: Utf8Carry,
    /// Decoded text after the last newline.
    line_buf: String,
    /// Every byte received, kept for the end-of-stream session rescan.
    raw: Vec<u8>,
    message: String,
    session_id: Option<String>,
    done: bool,
}

enum Flow {
    Continue,
    Stop,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Whether `data: [DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process one chunk: decode, split into lines, classify each complete
    /// line. The trailing partial line is kept for the next chunk.
    pub fn push_chunk<O>(&mut self, chunk: &[u8], observer: &mut O)
    where
        O: TurnObserver + ?Sized,
    {
        self.raw.extend_from_slice(chunk);
        if self.done {
            // content is closed; bytes only matter to the final rescan
            return;
        }

        let text = self.decoder.decode(chunk);
        self.line_buf.push_str(&text);

        let Some(last_newline) = self.line_buf.rfind('\n') else {
            return;
        };
        let remainder = self.line_buf.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.line_buf, remainder);

        for line in complete.split('\n') {
            if let Flow::Stop = self.process_line(line, observer) {
                self.done = true;
                self.line_buf.clear();
                return;
            }
        }
    }

    /// End of stream: classify any unterminated last line, then rescan the
    /// whole raw input for the session marker in case an announcement was
    /// missed or superseded.
    pub fn finish<O>(mut self, observer: &mut O) -> AssembledTurn
    where
        O: TurnObserver + ?Sized,
    {
        if !self.done {
            let tail = self.decoder.flush();
            self.line_buf.push_str(&tail);
            let last = std::mem::take(&mut self.line_buf);
            if let Flow::Stop = self.process_line(&last, observer) {
                self.done = true;
            }
        }

        let raw = String::from_utf8_lossy(&self.raw);
        if let Some(found) = find_last_session_id(&raw) {
            if self.session_id.as_deref() != Some(found) {
                debug!(
                    previous = ?self.session_id,
                    session_id = found,
                    "session id reconciled from full stream"
                );
                self.session_id = Some(found.to_string());
                observer.on_session_id(found);
            }
        }

        debug!(
            len = self.message.len(),
            bytes = self.raw.len(),
            done = self.done,
            "chat turn assembled"
        );

        AssembledTurn {
            message: self.message,
            session_id: self.session_id,
            end: if self.done {
                TurnEnd::Done
            } else {
                TurnEnd::EndOfStream
            },
        }
    }

    fn process_line<O>(&mut self, line: &str, observer: &mut O) -> Flow
    where
        O: TurnObserver + ?Sized,
    {
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::Done => {
                debug!("termination frame received");
                return Flow::Stop;
            }
            LineKind::Content(text) => self.append(&text, observer),
            LineKind::RawData(payload) => {
                trace!(payload, "data frame is not a content record, keeping as text");
                self.append(payload, observer);
            }
            LineKind::SessionId(id) => {
                if self.session_id.is_none() {
                    debug!(session_id = id, "session id announced");
                    self.session_id = Some(id.to_string());
                    observer.on_session_id(id);
                }
            }
            LineKind::Plain(text) => {
                trace!(line = text, "non-frame line, keeping as text");
                self.message.push_str(text);
                self.message.push(' ');
                observer.on_message(&self.message);
            }
        }
        Flow::Continue
    }

    fn append<O>(&mut self, text: &str, observer: &mut O)
    where
        O: TurnObserver + ?Sized,
    {
        if text.is_empty() {
            return;
        }
        self.message.push_str(text);
        observer.on_message(&self.message);
    }
}

/// Drive a byte stream through a fresh [`StreamAssembler`].
///
/// Chunks are processed to completion one at a time. A source error ends the
/// turn with [`StreamError::Transport`]; everything else is absorbed.
pub async fn assemble<S, B, E, O>(body: S, observer: &mut O) -> Result<AssembledTurn, StreamError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    O: TurnObserver + ?Sized,
{
    let mut body = std::pin::pin!(body);
    let mut assembler = StreamAssembler::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => assembler.push_chunk(bytes.as_ref(), observer),
            Err(e) => {
                let source = e.into();
                debug!(err = %source, "chat stream failed mid-turn");
                return Err(StreamError::Transport {
                    partial: assembler.message,
                    source,
                });
            }
        }
    }

    Ok(assembler.finish(observer))
}
