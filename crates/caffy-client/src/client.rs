use std::sync::Arc;
use std::time::Duration;

use caffy_core::calendar::format_date;
use caffy_core::config::{CaffyConfig, ChatConfig, DEFAULT_TIMEOUT_SECS};
use caffy_core::types::{
    CalendarEvent, CurrentUser, DeleteUserResponse, EventSubscription, IdentityLookup,
    LevelEvent, LevelUpdateResponse, RecommendedQuestions, UserLevelInfo,
};
use caffy_stream::{assemble, AssembledTurn, TurnObserver};
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::auth::{StaticToken, TokenSource};
use crate::dummy;
use crate::error::{api_error, ClientError, Result};
use crate::mode::RuntimeMode;
use crate::requests::{ChatRequest, ExplainRequest, RecommendRequest};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Handle to the CAFFY backend (or its dummy stand-in).
///
/// Cheap to clone; clones share the connection pool and token source.
#[derive(Clone)]
pub struct BackendClient {
    mode: RuntimeMode,
    tokens: Arc<dyn TokenSource>,
    http: reqwest::Client,
    chat: ChatConfig,
    request_timeout: Duration,
}

impl BackendClient {
    pub fn new(mode: RuntimeMode, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        Self::with_timeout(mode, tokens, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `timeout` bounds connecting for every call and the whole exchange for
    /// non-streamed calls.
    pub fn with_timeout(mode: RuntimeMode, tokens: Arc<dyn TokenSource>, timeout: Duration) -> Result<Self> {
        // Only the connect phase is bounded on the client; a total timeout
        // would cut long chat streams short.
        let http = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            mode,
            tokens,
            http,
            chat: ChatConfig::default(),
            request_timeout: timeout,
        })
    }

    /// Mode, token, timeouts and chat flags straight from config.
    pub fn from_config(config: &CaffyConfig) -> Result<Self> {
        let tokens = Arc::new(StaticToken::from(config.backend.token.clone()));
        let timeout = Duration::from_secs(config.backend.timeout_secs);
        Ok(Self::with_timeout(RuntimeMode::from_config(&config.backend), tokens, timeout)?
            .with_chat_config(config.chat.clone()))
    }

    pub fn with_chat_config(mut self, chat: ChatConfig) -> Self {
        self.chat = chat;
        self
    }

    pub fn mode(&self) -> &RuntimeMode {
        &self.mode
    }

    pub fn chat_config(&self) -> &ChatConfig {
        &self.chat
    }

    pub fn timeout(&self) -> Duration {
        self.request_timeout
    }

    // ---- users ----

    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<CurrentUser> {
        if self.mode.is_dummy() {
            return Ok(dummy::current_user());
        }
        let req = self.request(Method::GET, &["users", "me"]).await?;
        self.send_json(req).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self) -> Result<DeleteUserResponse> {
        if self.mode.is_dummy() {
            return Ok(dummy::delete_user());
        }
        let req = self.request(Method::DELETE, &["users", "me"]).await?;
        self.send_json(req).await
    }

    #[instrument(skip(self))]
    pub async fn user_by_uid(&self, uid: &str) -> Result<IdentityLookup> {
        if self.mode.is_dummy() {
            return Ok(dummy::identity(uid));
        }
        let req = self.request(Method::GET, &["auth", "user", uid]).await?;
        self.send_json(req).await
    }

    #[instrument(skip(self))]
    pub async fn level_info(&self) -> Result<UserLevelInfo> {
        if self.mode.is_dummy() {
            return Ok(dummy::level_info());
        }
        let req = self.request(Method::GET, &["users", "level", "info"]).await?;
        self.send_json(req).await
    }

    /// Report one experience event; the backend decides whether it levels up.
    #[instrument(skip(self))]
    pub async fn update_level(&self, event: LevelEvent) -> Result<LevelUpdateResponse> {
        if self.mode.is_dummy() {
            return Ok(dummy::level_update(event));
        }
        let req = self
            .request(Method::PUT, &["users", "level", "update"])
            .await?
            .json(&json!({ "event_type": event }));
        self.send_json(req).await
    }

    // ---- calendar ----

    /// Events visible at the user's level, dated in `[start, end]`.
    #[instrument(skip(self))]
    pub async fn calendar_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEvent>> {
        if self.mode.is_dummy() {
            return Ok(dummy::calendar_events(start, end));
        }
        let req = self
            .request(Method::GET, &["calendar", "events", "by-level"])
            .await?
            .query(&[("start_date", format_date(start)), ("end_date", format_date(end))]);
        let events: Vec<CalendarEvent> = self.send_json(req).await?;
        debug!(count = events.len(), "calendar events fetched");
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn create_subscription(&self, event_id: i64) -> Result<EventSubscription> {
        if self.mode.is_dummy() {
            return Ok(dummy::create_subscription(event_id));
        }
        let req = self
            .request(Method::POST, &["calendar", "subscriptions"])
            .await?
            .json(&json!({ "event_id": event_id }));
        self.send_json(req).await
    }

    #[instrument(skip(self))]
    pub async fn subscriptions(&self) -> Result<Vec<EventSubscription>> {
        if self.mode.is_dummy() {
            return Ok(dummy::subscriptions());
        }
        let req = self.request(Method::GET, &["calendar", "subscriptions"]).await?;
        self.send_json(req).await
    }

    // ---- chatbot ----

    #[instrument(skip(self, req), fields(session = ?req.session_id))]
    pub async fn recommend_questions(&self, req: &RecommendRequest) -> Result<RecommendedQuestions> {
        if self.mode.is_dummy() {
            return Ok(dummy::recommended_questions());
        }
        let builder = self.request(Method::POST, &["chatbot", "recommend"]).await?.json(req);
        self.send_json(builder).await
    }

    /// Run one chat turn, reporting growth to `observer` as chunks arrive.
    ///
    /// On a mid-stream failure the error carries the partial message.
    #[instrument(skip(self, req, observer), fields(session = ?req.session_id))]
    pub async fn chat<O>(&self, req: &ChatRequest, observer: &mut O) -> Result<AssembledTurn>
    where
        O: TurnObserver + ?Sized,
    {
        if let RuntimeMode::Dummy { stream_delay } = self.mode {
            return Ok(assemble(dummy::replay(dummy::CHAT_CHUNKS, stream_delay), observer).await?);
        }

        let flags = &self.chat;
        let builder = self
            .request(Method::POST, &["chatbot", "conversation"])
            .await?
            .query(&[
                ("use_filter", flags.use_filter.to_string()),
                ("use_level_chain", flags.use_level_chain.to_string()),
                ("is_mem0_api", flags.is_mem0_api.to_string()),
                ("chunk_size", flags.chunk_size.to_string()),
            ])
            .json(req);
        self.stream_turn(builder, observer).await
    }

    /// Streamed beginner-friendly explanation of one calendar event.
    #[instrument(skip(self, observer))]
    pub async fn explain_event<O>(&self, req: &ExplainRequest, observer: &mut O) -> Result<AssembledTurn>
    where
        O: TurnObserver + ?Sized,
    {
        if let RuntimeMode::Dummy { stream_delay } = self.mode {
            return Ok(assemble(dummy::replay(dummy::EXPLAIN_CHUNKS, stream_delay), observer).await?);
        }
        let builder = self.request(Method::POST, &["chatbot", "event", "explain"]).await?.json(req);
        self.stream_turn(builder, observer).await
    }

    // ---- plumbing ----

    /// Authorized builder for `segments` under the API prefix. Each segment
    /// is percent-encoded, so caller-supplied ids cannot alter the path or
    /// add a query.
    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let RuntimeMode::Live { base_url } = &self.mode else {
            return Err(ClientError::InvalidUrl("dummy mode has no HTTP endpoint".into()));
        };
        let mut url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(format!("{base_url}: not a base URL")))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);

        let token = self
            .tokens
            .bearer_token()
            .await
            .ok_or(ClientError::NotAuthenticated)?;
        debug!(%method, %url, "CAFFY API request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = builder.timeout(self.request_timeout).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        resp.json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn stream_turn<O>(&self, builder: RequestBuilder, observer: &mut O) -> Result<AssembledTurn>
    where
        O: TurnObserver + ?Sized,
    {
        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let turn = assemble(resp.bytes_stream(), observer).await?;
        debug!(
            chars = turn.message.len(),
            session = ?turn.session_id,
            end = ?turn.end,
            "chat turn assembled"
        );
        Ok(turn)
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("mode", &self.mode)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
