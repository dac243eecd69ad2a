use caffy_core::calendar::{format_date, DDay};
use caffy_core::config::ChatConfig;
use caffy_core::types::{CalendarEvent, ChatMessage, SafetyLevel};
use chrono::NaiveDate;
use serde::Serialize;

/// Body of `POST /api/v1/chatbot/conversation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    pub history: Vec<ChatMessage>,
    /// Session from a previous turn; `None` starts a new conversation.
    pub session_id: Option<String>,
    pub use_memory: bool,
    pub safety_level: SafetyLevel,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            history: Vec::new(),
            session_id: None,
            use_memory: true,
            safety_level: SafetyLevel::default(),
        }
    }

    /// Start from the configured memory/safety defaults.
    pub fn from_config(question: impl Into<String>, config: &ChatConfig) -> Self {
        Self {
            use_memory: config.use_memory,
            safety_level: config.safety_level,
            ..Self::new(question)
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Body of `POST /api/v1/chatbot/event/explain`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRequest {
    pub id: i64,
    pub safety_level: SafetyLevel,
}

/// Suggestions shown when the backend has none to offer.
pub const DEFAULT_QUESTIONS: [&str; 3] = [
    "Why do rate cuts matter?",
    "What is the FOMC?",
    "What is the Fed?",
];

/// Body of `POST /api/v1/chatbot/recommend`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
    pub event_description: String,
    pub question_count: u32,
    /// Upper bound on characters per suggested question.
    pub string_length: u32,
    pub session_id: Option<String>,
}

impl RecommendRequest {
    pub const DEFAULT_QUESTION_COUNT: u32 = 3;
    pub const DEFAULT_STRING_LENGTH: u32 = 30;

    /// Describe `event` relative to `today` and ask for follow-up questions.
    pub fn for_event(event: &CalendarEvent, today: NaiveDate, session_id: Option<String>) -> Self {
        let dday = DDay::between(event.date, today);
        let when = if dday.is_today() {
            "today".to_string()
        } else {
            format!("at {dday}")
        };
        let event_description = format!(
            "Today is {today}, and '{title}' is scheduled {when}.\n\n\
             Event title: {title}\n\
             Event description: {summary}\n\
             Scheduled date: {date}\n\n\
             Generate questions a user would likely ask about this event.",
            today = format_date(today),
            title = event.title,
            summary = event.summary(),
            date = format_date(event.date),
        );

        Self {
            event_description,
            question_count: Self::DEFAULT_QUESTION_COUNT,
            string_length: Self::DEFAULT_STRING_LENGTH,
            session_id,
        }
    }
}
