//! Ordering and countdown helpers for calendar events.
//!
//! Dates are calendar days with no time zone attached; "today" is always
//! supplied by the caller so the helpers stay deterministic.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::error::{CaffyError, Result};
use crate::types::CalendarEvent;

/// Wire format used by the backend for `start_date` / `end_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| CaffyError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Earliest first. Stable, so same-day events keep their backend order.
pub fn sort_by_date(events: &mut [CalendarEvent]) {
    events.sort_by_key(|e| e.date);
}

/// Most popular first; equal popularity falls back to the earlier date.
pub fn sort_by_popularity(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| b.popularity.cmp(&a.popularity).then(a.date.cmp(&b.date)));
}

/// The earliest event, without reordering the input.
pub fn next_event(events: &[CalendarEvent]) -> Option<&CalendarEvent> {
    events.iter().min_by_key(|e| e.date)
}

/// Events whose date lies in `[start, end]`, in input order.
pub fn within_range(events: &[CalendarEvent], start: NaiveDate, end: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .cloned()
        .collect()
}

/// `[today, today + days]`, the window the upcoming-events view asks for.
pub fn lookahead_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    (today, end)
}

/// Whole calendar days from `today` until `event_date`. Negative once the
/// event has passed.
pub fn days_until(event_date: NaiveDate, today: NaiveDate) -> i64 {
    event_date.signed_duration_since(today).num_days()
}

/// Countdown label for an event: `Today`, `D-3`, or `D+2` for past events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DDay(pub i64);

impl DDay {
    pub fn between(event_date: NaiveDate, today: NaiveDate) -> Self {
        Self(days_until(event_date, today))
    }

    pub fn is_today(&self) -> bool {
        self.0 == 0
    }

    pub fn is_past(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for DDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("Today"),
            n if n > 0 => write!(f, "D-{}", n),
            n => write!(f, "D+{}", n.unsigned_abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    fn event(id: i64, on: &str, popularity: i32) -> CalendarEvent {
        CalendarEvent {
            id,
            release_id: format!("EV_{id}"),
            title: format!("event {id}"),
            description: None,
            description_ko: None,
            date: date(on),
            impact: None,
            level: None,
            source: None,
            popularity,
            level_category: None,
        }
    }

    #[test]
    fn sort_by_date_is_ascending_and_stable() {
        let mut events = vec![
            event(1, "2025-07-15", 9),
            event(2, "2025-07-03", 5),
            event(3, "2025-07-15", 1),
        ];
        sort_by_date(&mut events);
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn sort_by_popularity_breaks_ties_by_date() {
        let mut events = vec![
            event(1, "2025-07-22", 7),
            event(2, "2025-07-08", 8),
            event(3, "2025-07-12", 7),
        ];
        sort_by_popularity(&mut events);
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn next_event_picks_earliest() {
        let events = vec![event(1, "2025-08-22", 9), event(2, "2025-08-01", 8)];
        assert_eq!(next_event(&events).map(|e| e.id), Some(2));
        assert!(next_event(&[]).is_none());
    }

    #[test]
    fn within_range_is_inclusive() {
        let events = vec![
            event(1, "2025-06-01", 0),
            event(2, "2025-06-02", 0),
            event(3, "2025-06-09", 0),
            event(4, "2025-06-10", 0),
        ];
        let picked = within_range(&events, date("2025-06-02"), date("2025-06-09"));
        let ids: Vec<i64> = picked.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn lookahead_window_spans_requested_days() {
        let (start, end) = lookahead_window(date("2025-06-28"), 7);
        assert_eq!(format_date(start), "2025-06-28");
        assert_eq!(format_date(end), "2025-07-05");
    }

    #[test]
    fn dday_labels() {
        let today = date("2025-06-10");
        assert_eq!(DDay::between(date("2025-06-10"), today).to_string(), "Today");
        assert_eq!(DDay::between(date("2025-06-13"), today).to_string(), "D-3");
        assert_eq!(DDay::between(date("2025-06-08"), today).to_string(), "D+2");
        assert!(DDay::between(date("2025-06-08"), today).is_past());
    }

    #[test]
    fn days_until_crosses_month_boundary() {
        assert_eq!(days_until(date("2025-08-01"), date("2025-07-30")), 2);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(matches!(
            parse_date("2025/06/10"),
            Err(CaffyError::InvalidDate { .. })
        ));
    }
}
