use caffy_stream::StreamError;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("not signed in: no bearer token available")]
    NotAuthenticated,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ClientError {
    /// Statuses worth retrying from the caller's side. The client itself
    /// never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            ClientError::Stream(_) => true,
            ClientError::NotAuthenticated | ClientError::Parse(_) | ClientError::InvalidUrl(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Turn a non-success response into [`ClientError::Api`].
///
/// The backend reports failures as `{"detail": ...}`; when the body has no
/// usable detail the message falls back to `HTTP <status>`.
pub(crate) async fn api_error(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    warn!(status, body = %body, "CAFFY API error");
    ClientError::Api {
        status,
        detail: detail_from_body(&body).unwrap_or_else(|| format!("HTTP {status}")),
    }
}

fn detail_from_body(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        // validation errors arrive as a list of objects
        other => Some(other.to_string()),
    }
}
