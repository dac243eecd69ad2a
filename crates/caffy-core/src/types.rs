use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CaffyError;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation history sent with each turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Content-filter strictness requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Strict,
    #[default]
    Moderate,
    Permissive,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Strict => "strict",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Permissive => "permissive",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SafetyLevel {
    type Err = CaffyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "strict" => Ok(SafetyLevel::Strict),
            "moderate" => Ok(SafetyLevel::Moderate),
            "permissive" => Ok(SafetyLevel::Permissive),
            other => Err(CaffyError::UnknownVariant {
                kind: "safety level",
                value: other.to_string(),
            }),
        }
    }
}

/// An economic-release event on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub release_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_ko: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub popularity: i32,
    #[serde(default)]
    pub level_category: Option<String>,
}

impl CalendarEvent {
    /// Best available human description: localized first, then English.
    pub fn summary(&self) -> &str {
        self.description_ko
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("Economic indicator release")
    }
}

/// A saved ("subscribed") calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSubscription {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub subscribed_at: String,
    /// Present when the backend joins the event row into the response.
    #[serde(default)]
    pub event: Option<CalendarEvent>,
}

/// Experience counters the backend keys level progress on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelEvent {
    ServiceVisits,
    ChatbotConversations,
    CalendarViews,
}

impl LevelEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelEvent::ServiceVisits => "service_visits",
            LevelEvent::ChatbotConversations => "chatbot_conversations",
            LevelEvent::CalendarViews => "calendar_views",
        }
    }
}

impl fmt::Display for LevelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user's profile as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub level: String,
    #[serde(default)]
    pub investment_profile: Option<String>,
    #[serde(default)]
    pub exp: BTreeMap<String, u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Identity-provider record for a uid, as relayed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityLookup {
    pub success: bool,
    pub user: Option<IdentityRecord>,
}

/// Progress of one experience counter toward the next level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpFieldInfo {
    pub display_name: String,
    pub current_value: u32,
    pub required_for_next_level: u32,
}

/// Level snapshot returned by the backend. Displayed as-is; the rules that
/// produce it live server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLevelInfo {
    pub current_level: String,
    #[serde(default)]
    pub level_display_name: Option<String>,
    #[serde(default)]
    pub exp: BTreeMap<String, u32>,
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(default)]
    pub next_level_conditions: BTreeMap<String, u32>,
    #[serde(default)]
    pub can_level_up: bool,
    #[serde(default)]
    pub exp_field_info: BTreeMap<String, ExpFieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUpdateResponse {
    pub success: bool,
    pub level_up: bool,
    pub current_level: String,
    #[serde(default)]
    pub exp: BTreeMap<String, u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub next_level_conditions: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Questions the backend suggests for an upcoming event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedQuestions {
    pub questions: Vec<String>,
    #[serde(default)]
    pub user_level: Option<String>,
    #[serde(default)]
    pub total_count: Option<u32>,
}
