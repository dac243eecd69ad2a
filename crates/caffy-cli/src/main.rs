use std::io::Write;

use anyhow::Context;
use caffy_client::{
    BackendClient, ChatRequest, ExplainRequest, RecommendRequest, DEFAULT_QUESTIONS,
};
use caffy_core::calendar::{lookahead_window, next_event, sort_by_date, sort_by_popularity, DDay};
use caffy_core::config::{BackendMode, CaffyConfig};
use caffy_core::types::{LevelEvent, RecommendedQuestions};
use caffy_stream::AssembledTurn;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

mod render;

use render::{event_line, put, TerminalObserver, FALLBACK_MESSAGE};

/// Terminal client for the CAFFY economic-calendar assistant.
#[derive(Parser, Debug)]
#[command(name = "caffy", version, about)]
struct Cli {
    /// Config file (defaults to ~/.caffy/caffy.toml)
    #[arg(long, global = true, env = "CAFFY_CONFIG", value_name = "FILE")]
    config: Option<String>,

    /// Answer from canned fixtures instead of the backend
    #[arg(long, global = true)]
    dummy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the chatbot a question and stream the answer
    Chat {
        question: String,
        /// Continue an earlier conversation
        #[arg(long)]
        session: Option<String>,
    },
    /// Stream an explanation of one calendar event
    Explain { event_id: i64 },
    /// List upcoming events with their countdown
    Events {
        /// Days ahead of today to include
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, value_enum, default_value_t = SortOrder::Date)]
        sort: SortOrder,
    },
    /// Show the nearest upcoming event and suggested questions about it
    Next,
    /// Show the signed-in user's level progress
    Profile,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortOrder {
    Date,
    Popularity,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caffy=warn,caffy_client=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = CaffyConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        CaffyConfig::default()
    });
    if cli.dummy {
        config.backend.mode = BackendMode::Dummy;
    }
    info!(mode = ?config.backend.mode, base_url = %config.backend.base_url, "caffy starting");

    let client = BackendClient::from_config(&config).context("building backend client")?;
    let today = chrono::Local::now().date_naive();
    let mut out = std::io::stdout();
    let mut diag = std::io::stderr();

    match cli.command {
        Command::Chat { question, session } => {
            let req = ChatRequest::from_config(question, client.chat_config()).with_session(session);
            let mut echo = TerminalObserver::new(std::io::stdout());
            let result = client.chat(&req, &mut echo).await;
            finish_turn(&mut out, &mut diag, result, echo.session_id())?;
            report_activity(&mut out, &client, LevelEvent::ChatbotConversations).await;
        }
        Command::Explain { event_id } => {
            let req = ExplainRequest {
                id: event_id,
                safety_level: config.chat.safety_level,
            };
            let mut echo = TerminalObserver::new(std::io::stdout());
            let result = client.explain_event(&req, &mut echo).await;
            finish_turn(&mut out, &mut diag, result, None)?;
        }
        Command::Events { days, sort } => {
            let days = days.unwrap_or(config.calendar.lookahead_days);
            let (start, end) = lookahead_window(today, days);
            let mut events = client.calendar_events(start, end).await?;
            match sort {
                SortOrder::Date => sort_by_date(&mut events),
                SortOrder::Popularity => sort_by_popularity(&mut events),
            }
            if events.is_empty() {
                put(&mut out, format_args!("No events between {start} and {end}."));
            }
            for event in &events {
                put(&mut out, event_line(event, today));
            }
            report_activity(&mut out, &client, LevelEvent::CalendarViews).await;
        }
        Command::Next => {
            let (start, end) = lookahead_window(today, config.calendar.lookahead_days);
            let events = client.calendar_events(start, end).await?;
            let upcoming: Vec<_> = events
                .into_iter()
                .filter(|e| !DDay::between(e.date, today).is_past())
                .collect();
            let Some(event) = next_event(&upcoming) else {
                put(
                    &mut out,
                    format_args!("No upcoming events in the next {} days.", config.calendar.lookahead_days),
                );
                return Ok(());
            };
            put(&mut out, event_line(event, today));
            put(&mut out, format_args!("  {}", event.summary()));

            let suggested = client
                .recommend_questions(&RecommendRequest::for_event(event, today, None))
                .await;
            for q in suggested_questions(suggested) {
                put(&mut out, format_args!("  ? {q}"));
            }
        }
        Command::Profile => {
            let user = client.current_user().await?;
            let level = client.level_info().await?;
            put(
                &mut out,
                format_args!(
                    "{} ({})",
                    user.name.as_deref().unwrap_or(&user.uid),
                    level.level_display_name.as_deref().unwrap_or(&level.current_level)
                ),
            );
            for (key, value) in &level.exp {
                match level.exp_field_info.get(key) {
                    Some(field) => put(
                        &mut out,
                        format_args!("  {:<24} {}/{}", field.display_name, value, field.required_for_next_level),
                    ),
                    None => put(&mut out, format_args!("  {:<24} {}", key, value)),
                }
            }
            if let Some(next) = &level.next_level {
                let ready = if level.can_level_up { " (ready)" } else { "" };
                put(&mut out, format_args!("  next level: {next}{ready}"));
            }
        }
    }

    Ok(())
}

/// Close the streamed answer. On failure the fallback text goes to `out`
/// and the error is returned so the process exits non-zero.
fn finish_turn(
    out: &mut impl Write,
    diag: &mut impl Write,
    result: caffy_client::Result<AssembledTurn>,
    observed_session: Option<&str>,
) -> anyhow::Result<()> {
    match result {
        Ok(turn) => {
            put(out, "");
            // the assembled turn holds the reconciled id, which wins
            if let Some(id) = turn.session_id.as_deref().or(observed_session) {
                put(diag, format_args!("session: {id}"));
            }
            Ok(())
        }
        Err(e) => {
            // anything already streamed stays on screen; close the line first
            put(out, "");
            put(out, FALLBACK_MESSAGE);
            Err(e).context("chat turn failed")
        }
    }
}

/// Level counters are best-effort; a failed report never fails the command.
async fn report_activity(out: &mut impl Write, client: &BackendClient, event: LevelEvent) {
    match client.update_level(event).await {
        Ok(resp) if resp.level_up => {
            put(out, format_args!("Level up! You are now {}.", resp.current_level));
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, %event, "could not record activity"),
    }
}

/// Backend suggestions, or the built-in ones when the call fails or
/// returns nothing.
fn suggested_questions(result: caffy_client::Result<RecommendedQuestions>) -> Vec<String> {
    match result {
        Ok(rec) if !rec.questions.is_empty() => rec.questions,
        Ok(_) => DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        Err(e) => {
            warn!(error = %e, "question suggestions unavailable, using defaults");
            DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
        }
    }
}
