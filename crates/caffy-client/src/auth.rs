use async_trait::async_trait;

/// Supplies the bearer token for backend calls.
///
/// Signing in with the identity provider happens elsewhere; implementations
/// only hand over the current ID token (refreshing it if they can).
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when nobody is signed in.
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, e.g. from config or an env var.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// No user signed in.
    pub fn none() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticToken {
    fn from(token: Option<String>) -> Self {
        // blank values from env/config mean "not signed in"
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
