use std::fmt;
use std::io::Write;

use caffy_core::calendar::DDay;
use caffy_core::types::CalendarEvent;
use caffy_stream::TurnObserver;
use chrono::NaiveDate;

/// Shown when a turn cannot be completed.
pub const FALLBACK_MESSAGE: &str = "Sorry, something went wrong while answering. Please try again.";

/// Writes a growing message to a terminal, printing only what is new.
///
/// Growth notifications carry the full text, so the printed length is
/// tracked and only the suffix beyond it is written.
pub struct TerminalObserver<W: Write> {
    out: W,
    printed: usize,
    session_id: Option<String>,
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            session_id: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TurnObserver for TerminalObserver<W> {
    fn on_message(&mut self, full_message: &str) {
        let Some(suffix) = full_message.get(self.printed..) else {
            return;
        };
        if suffix.is_empty() {
            return;
        }
        // a closed stdout (e.g. `| head`) just stops the echo
        let _ = self.out.write_all(suffix.as_bytes());
        let _ = self.out.flush();
        self.printed = full_message.len();
    }

    fn on_session_id(&mut self, session_id: &str) {
        tracing::debug!(session_id, "session discovered");
        self.session_id = Some(session_id.to_string());
    }
}

/// Write one line. Like the streamed echo, a closed pipe is not an error.
pub fn put(out: &mut impl Write, line: impl fmt::Display) {
    let _ = writeln!(out, "{line}");
}

/// One listing row: countdown, date, title and impact.
pub fn event_line(event: &CalendarEvent, today: NaiveDate) -> String {
    let dday = DDay::between(event.date, today);
    let mut line = format!("{:>6}  {}  #{:<4} {}", dday.to_string(), event.date, event.id, event.title);
    if let Some(impact) = &event.impact {
        line.push_str(&format!("  [{impact}]"));
    }
    line
}
