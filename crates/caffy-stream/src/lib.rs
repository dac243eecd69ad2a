//! Incremental assembly of streamed chat answers.
//!
//! The backend answers a chat turn with newline-delimited, SSE-like frames:
//!
//! ```text
//! data: {"content": "Rates are "}
//! data: {"content": "set by the FOMC."}
//! SESSION_ID: 1234abcd-56ef-78ab-90cd-1234567890ab
//! data: [DONE]
//! ```
//!
//! [`StreamAssembler`] turns those bytes, split at arbitrary chunk boundaries,
//! into a growing message plus the session id that links follow-up turns.

pub mod assembler;
pub mod decode;
pub mod error;
pub mod frame;
pub mod observer;

pub use assembler::{assemble, AssembledTurn, StreamAssembler, TurnEnd};
pub use decode::Utf8Carry;
pub use error::StreamError;
pub use frame::{classify_line, find_last_session_id, find_session_id, LineKind, DONE_TOKEN};
pub use observer::{FnObserver, TurnEvent, TurnObserver};
