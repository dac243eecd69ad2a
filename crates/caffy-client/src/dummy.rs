//! Canned backend answers for [`RuntimeMode::Dummy`](crate::RuntimeMode).
//!
//! Shapes match the live API so callers cannot tell the modes apart.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use caffy_core::calendar::{parse_date, within_range};
use caffy_core::types::{
    CalendarEvent, CurrentUser, DeleteUserResponse, EventSubscription, ExpFieldInfo,
    IdentityLookup, IdentityRecord, LevelEvent, LevelUpdateResponse, RecommendedQuestions,
    UserLevelInfo,
};
use chrono::NaiveDate;
use futures_util::Stream;

use crate::requests::DEFAULT_QUESTIONS;

pub const CHAT_CHUNKS: &[&str] = &[
    "data: {\"content\": \"Hello! \"}\n\n",
    "data: {\"content\": \"Thanks for your question. \"}\n\n",
    "data: {\"content\": \"This answer comes from dummy mode.\"}\n\n",
    "data: [DONE]\n\n",
];

pub const EXPLAIN_CHUNKS: &[&str] = &[
    "data: {\"content\": \"This event \"}\n\n",
    "data: {\"content\": \"is an economic data release \"}\n\n",
    "data: {\"content\": \"that can move markets.\"}\n\n",
    "data: [DONE]\n\n",
];

/// Replay `chunks` as a byte stream, pausing `delay` before each one after
/// the first.
pub fn replay(
    chunks: &'static [&'static str],
    delay: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            yield Ok(Bytes::from_static(chunk.as_bytes()));
        }
    }
}

fn exp(service_visits: u32, chatbot_conversations: u32, calendar_views: u32) -> BTreeMap<String, u32> {
    BTreeMap::from([
        (LevelEvent::ServiceVisits.to_string(), service_visits),
        (LevelEvent::ChatbotConversations.to_string(), chatbot_conversations),
        (LevelEvent::CalendarViews.to_string(), calendar_views),
    ])
}

pub fn current_user() -> CurrentUser {
    CurrentUser {
        id: 1,
        uid: "dummy_user_123".into(),
        name: Some("Test User".into()),
        email: Some("test@example.com".into()),
        level: "ADVANCED".into(),
        investment_profile: Some("Stock enthusiast".into()),
        exp: exp(15, 12, 25),
        created_at: Some("2024-01-01T00:00:00".into()),
        updated_at: Some("2024-01-15T00:00:00".into()),
    }
}

pub fn identity(uid: &str) -> IdentityLookup {
    IdentityLookup {
        success: true,
        user: Some(IdentityRecord {
            uid: uid.to_string(),
            email: Some("test@example.com".into()),
            email_verified: true,
            name: Some("Test User".into()),
            picture: Some("https://via.placeholder.com/150".into()),
        }),
    }
}

pub fn delete_user() -> DeleteUserResponse {
    DeleteUserResponse {
        success: true,
        message: Some("Account deleted.".into()),
    }
}

pub fn level_info() -> UserLevelInfo {
    let field = |name: &str, required: u32| ExpFieldInfo {
        display_name: name.to_string(),
        current_value: 1,
        required_for_next_level: required,
    };
    UserLevelInfo {
        current_level: "BEGINNER".into(),
        level_display_name: Some("Newcomer".into()),
        exp: exp(1, 1, 1),
        next_level: None,
        next_level_conditions: BTreeMap::new(),
        can_level_up: false,
        exp_field_info: BTreeMap::from([
            (LevelEvent::ServiceVisits.to_string(), field("Service visits", 10)),
            (LevelEvent::ChatbotConversations.to_string(), field("Chatbot conversations", 8)),
            (LevelEvent::CalendarViews.to_string(), field("Calendar views", 15)),
        ]),
    }
}

/// Fixed snapshot with the reported counter bumped by one.
pub fn level_update(event: LevelEvent) -> LevelUpdateResponse {
    let mut counters = exp(16, 12, 25);
    if let Some(value) = counters.get_mut(event.as_str()) {
        *value += 1;
    }
    LevelUpdateResponse {
        success: true,
        level_up: false,
        current_level: "INTERMEDIATE".into(),
        exp: counters,
        message: None,
        next_level_conditions: exp(30, 20, 40),
    }
}

pub fn subscriptions() -> Vec<EventSubscription> {
    vec![EventSubscription {
        id: 1,
        user_id: 1,
        event_id: 1,
        subscribed_at: "2024-01-10T00:00:00".into(),
        event: None,
    }]
}

pub fn create_subscription(event_id: i64) -> EventSubscription {
    EventSubscription {
        id: 2,
        user_id: 1,
        event_id,
        subscribed_at: "2024-01-15T00:00:00".into(),
        event: None,
    }
}

pub fn recommended_questions() -> RecommendedQuestions {
    RecommendedQuestions {
        questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        user_level: Some("BEGINNER".into()),
        total_count: Some(3),
    }
}

/// Fixture events dated in `[start, end]`.
pub fn calendar_events(start: NaiveDate, end: NaiveDate) -> Vec<CalendarEvent> {
    within_range(&all_events(), start, end)
}

struct Fixture {
    id: i64,
    release_id: &'static str,
    title: &'static str,
    description: &'static str,
    date: &'static str,
    impact: &'static str,
    level: &'static str,
    source: &'static str,
    popularity: i32,
    category: &'static str,
}

const FIXTURES: &[Fixture] = &[
    Fixture { id: 1, release_id: "FOMC_2025_06", title: "FOMC rate decision", description: "Federal Open Market Committee regular meeting results announcement", date: "2025-06-18", impact: "HIGH", level: "BEGINNER", source: "FED", popularity: 9, category: "MONETARY_POLICY" },
    Fixture { id: 2, release_id: "NONFARM_2025_06", title: "US employment report", description: "US Non-farm Payrolls Report", date: "2025-06-06", impact: "HIGH", level: "INTERMEDIATE", source: "BLS", popularity: 8, category: "EMPLOYMENT" },
    Fixture { id: 3, release_id: "CPI_2025_06", title: "Consumer price index", description: "Consumer Price Index (CPI) Release", date: "2025-06-12", impact: "MEDIUM", level: "BEGINNER", source: "BLS", popularity: 7, category: "INFLATION" },
    Fixture { id: 4, release_id: "ISM_2025_06", title: "ISM manufacturing index", description: "Institute for Supply Management Manufacturing Index", date: "2025-06-02", impact: "MEDIUM", level: "ADVANCED", source: "ISM", popularity: 6, category: "MANUFACTURING" },
    Fixture { id: 5, release_id: "FOMC_2025_07", title: "FOMC rate decision", description: "Federal Open Market Committee regular meeting results announcement", date: "2025-07-15", impact: "HIGH", level: "BEGINNER", source: "FED", popularity: 9, category: "MONETARY_POLICY" },
    Fixture { id: 6, release_id: "NONFARM_2025_07", title: "US employment report", description: "US Non-farm Payrolls Report", date: "2025-07-08", impact: "HIGH", level: "INTERMEDIATE", source: "BLS", popularity: 8, category: "EMPLOYMENT" },
    Fixture { id: 7, release_id: "CPI_2025_07", title: "Consumer price index", description: "Consumer Price Index (CPI) Release", date: "2025-07-22", impact: "MEDIUM", level: "BEGINNER", source: "BLS", popularity: 7, category: "INFLATION" },
    Fixture { id: 8, release_id: "GDP_2025_Q2", title: "GDP growth rate", description: "Gross Domestic Product Growth Rate", date: "2025-07-30", impact: "HIGH", level: "ADVANCED", source: "BEA", popularity: 6, category: "ECONOMIC_GROWTH" },
    Fixture { id: 9, release_id: "RETAIL_2025_07", title: "Retail sales", description: "Retail Sales Report", date: "2025-07-03", impact: "MEDIUM", level: "INTERMEDIATE", source: "CENSUS", popularity: 5, category: "CONSUMER_SPENDING" },
    Fixture { id: 10, release_id: "PPI_2025_07", title: "Producer price index", description: "Producer Price Index (PPI) Release", date: "2025-07-12", impact: "LOW", level: "ADVANCED", source: "BLS", popularity: 4, category: "INFLATION" },
    Fixture { id: 11, release_id: "JACKSON_HOLE_2025", title: "Jackson Hole symposium", description: "Federal Reserve Economic Symposium", date: "2025-08-22", impact: "HIGH", level: "ADVANCED", source: "FED", popularity: 9, category: "MONETARY_POLICY" },
    Fixture { id: 12, release_id: "NONFARM_2025_08", title: "US employment report", description: "US Non-farm Payrolls Report", date: "2025-08-01", impact: "HIGH", level: "INTERMEDIATE", source: "BLS", popularity: 8, category: "EMPLOYMENT" },
    Fixture { id: 13, release_id: "CPI_2025_08", title: "Consumer price index", description: "Consumer Price Index (CPI) Release", date: "2025-08-13", impact: "MEDIUM", level: "BEGINNER", source: "BLS", popularity: 7, category: "INFLATION" },
    Fixture { id: 14, release_id: "RETAIL_2025_08", title: "Retail sales", description: "Retail Sales Report", date: "2025-08-15", impact: "MEDIUM", level: "INTERMEDIATE", source: "CENSUS", popularity: 6, category: "CONSUMER_SPENDING" },
    Fixture { id: 15, release_id: "HOUSING_2025_08", title: "Housing starts", description: "Housing Starts Report", date: "2025-08-20", impact: "LOW", level: "BEGINNER", source: "CENSUS", popularity: 5, category: "HOUSING" },
];

fn all_events() -> Vec<CalendarEvent> {
    FIXTURES
        .iter()
        .filter_map(|f| {
            // fixture dates are literals; a typo drops the row instead of panicking
            let date = parse_date(f.date).ok()?;
            Some(CalendarEvent {
                id: f.id,
                release_id: f.release_id.into(),
                title: f.title.into(),
                description: Some(f.description.into()),
                description_ko: None,
                date,
                impact: Some(f.impact.into()),
                level: Some(f.level.into()),
                source: Some(f.source.into()),
                popularity: f.popularity,
                level_category: Some(f.category.into()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use caffy_stream::{assemble, FnObserver, TurnEnd};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    #[test]
    fn every_fixture_date_parses() {
        assert_eq!(all_events().len(), FIXTURES.len());
    }

    #[test]
    fn calendar_filters_by_range() {
        let july = calendar_events(date("2025-07-01"), date("2025-07-31"));
        let ids: Vec<i64> = july.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 6, 7, 8, 9, 10]);
        assert!(calendar_events(date("2030-01-01"), date("2030-01-07")).is_empty());
    }

    #[test]
    fn level_update_bumps_only_the_reported_counter() {
        let resp = level_update(LevelEvent::CalendarViews);
        assert_eq!(resp.exp["calendar_views"], 26);
        assert_eq!(resp.exp["service_visits"], 16);
        assert_eq!(resp.exp["chatbot_conversations"], 12);
    }

    #[test]
    fn subscription_echoes_event_id() {
        assert_eq!(create_subscription(42).event_id, 42);
    }

    #[tokio::test]
    async fn replayed_chat_assembles_to_fixed_answer() {
        let mut seen = 0;
        let mut observer = FnObserver::message_only(|_: &str| seen += 1);
        let turn = assemble(replay(CHAT_CHUNKS, Duration::ZERO), &mut observer)
            .await
            .expect("dummy stream cannot fail");
        drop(observer);

        assert_eq!(
            turn.message,
            "Hello! Thanks for your question. This answer comes from dummy mode."
        );
        assert_eq!(turn.end, TurnEnd::Done);
        assert_eq!(seen, 3);
    }
}
