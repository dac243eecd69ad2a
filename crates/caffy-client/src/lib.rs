//! Access to the CAFFY backend: profile, level, calendar and streamed chat.
//!
//! Every call goes through [`BackendClient`], which is built once with a
//! [`RuntimeMode`]. In [`RuntimeMode::Dummy`] the client answers from canned
//! fixtures and never opens a connection.

pub mod auth;
pub mod client;
pub mod dummy;
pub mod error;
pub mod mode;
pub mod requests;

pub use auth::{StaticToken, TokenSource};
pub use client::BackendClient;
pub use error::{ClientError, Result};
pub use mode::RuntimeMode;
pub use requests::{ChatRequest, ExplainRequest, RecommendRequest, DEFAULT_QUESTIONS};
