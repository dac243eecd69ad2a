use tokio::sync::mpsc;

/// Receives progress from a [`StreamAssembler`](crate::StreamAssembler).
///
/// Both callbacks run synchronously inside chunk processing, so they must
/// return promptly (typically a redraw).
pub trait TurnObserver {
    /// The message grew. `full_message` is the whole text so far, not a delta,
    /// so rendering it is idempotent.
    fn on_message(&mut self, full_message: &str);

    /// A session id was discovered. May fire a second time with a corrected
    /// value after the end-of-stream rescan; treat it as "latest value wins".
    fn on_session_id(&mut self, _session_id: &str) {}
}

/// Adapts a pair of closures to [`TurnObserver`].
pub struct FnObserver<M, S> {
    on_message: M,
    on_session_id: S,
}

impl<M, S> FnObserver<M, S>
where
    M: FnMut(&str),
    S: FnMut(&str),
{
    pub fn new(on_message: M, on_session_id: S) -> Self {
        Self {
            on_message,
            on_session_id,
        }
    }
}

impl<M> FnObserver<M, fn(&str)>
where
    M: FnMut(&str),
{
    /// Observer for callers that do not track sessions.
    pub fn message_only(on_message: M) -> Self {
        Self {
            on_message,
            on_session_id: |_| {},
        }
    }
}

impl<M, S> TurnObserver for FnObserver<M, S>
where
    M: FnMut(&str),
    S: FnMut(&str),
{
    fn on_message(&mut self, full_message: &str) {
        (self.on_message)(full_message)
    }

    fn on_session_id(&mut self, session_id: &str) {
        (self.on_session_id)(session_id)
    }
}

/// Observer notifications as values, for callers that consume them on
/// another task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// Full message text after growth.
    Message { text: String },
    /// Latest session id.
    SessionId { id: String },
}

impl TurnObserver for mpsc::UnboundedSender<TurnEvent> {
    fn on_message(&mut self, full_message: &str) {
        // receiver dropped: the caller stopped listening, nothing to do
        let _ = self.send(TurnEvent::Message {
            text: full_message.to_string(),
        });
    }

    fn on_session_id(&mut self, session_id: &str) {
        let _ = self.send(TurnEvent::SessionId {
            id: session_id.to_string(),
        });
    }
}
