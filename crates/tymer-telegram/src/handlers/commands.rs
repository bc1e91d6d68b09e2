use std::sync::Arc;

use teloxide::prelude::*;

use tymer_core::{
    chart::render_daily_chart,
    domain::{ChatId, IntervalKind},
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn welcome_text(state: &AppState) -> String {
    format!(
        "Hi! I'm a Pomodoro time-tracking bot.\n\n\
         Available commands:\n\
         /work - start a work interval ({} min)\n\
         /break - start a break ({} min)\n\
         /stop - stop the current timer\n\
         /report - weekly summary with a chart",
        state.cfg.minutes(IntervalKind::Work),
        state.cfg.minutes(IntervalKind::Break)
    )
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (cmd, _args) = parse_command(msg.text().unwrap_or(""));
    let chat = ChatId(msg.chat.id.0);

    match cmd.as_str() {
        "start" | "help" => {
            let _ = bot.send_message(msg.chat.id, welcome_text(&state)).await;
        }
        "work" => start_interval(&bot, &msg, &state, IntervalKind::Work).await,
        "break" => start_interval(&bot, &msg, &state, IntervalKind::Break).await,
        "stop" => {
            let stopped = state.registry.stop_interval(chat).await;
            let reply = if stopped {
                "Timer stopped."
            } else {
                "No timer is running."
            };
            let _ = bot.send_message(msg.chat.id, reply).await;
        }
        "report" => send_report(&bot, &msg, &state).await,
        _ => {
            let _ = bot
                .send_message(msg.chat.id, "Unknown command. Try /help.")
                .await;
        }
    }

    Ok(())
}

async fn start_interval(bot: &Bot, msg: &Message, state: &AppState, kind: IntervalKind) {
    let chat = ChatId(msg.chat.id.0);
    if let Err(e) = state.registry.start_interval(chat, kind).await {
        eprintln!("[TIMER] Failed to start {} for chat {}: {e}", kind.as_str(), chat.0);
        let _ = bot
            .send_message(msg.chat.id, "❌ Could not start the timer, try again.")
            .await;
    }
}

async fn send_report(bot: &Bot, msg: &Message, state: &AppState) {
    let chat = ChatId(msg.chat.id.0);

    let report = match state
        .reports
        .build_report(chat, state.cfg.report_window_days)
        .await
    {
        Ok(v) => v,
        Err(e) => {
            eprintln!("[REPORT] Failed to build report for chat {}: {e}", chat.0);
            let _ = bot
                .send_message(msg.chat.id, "❌ Could not read the session sheet.")
                .await;
            return;
        }
    };

    if report.is_empty() {
        let _ = state
            .messenger
            .send_html(chat, "No data for the last week.")
            .await;
        return;
    }

    let svg = render_daily_chart(&report.daily);
    if let Err(e) = state
        .messenger
        .send_document(chat, "report.svg", svg.into_bytes(), &report.summary_caption())
        .await
    {
        eprintln!("[REPORT] Failed to send chart for chat {}: {e}", chat.0);
        // Chart delivery failed; the totals are still worth sending.
        let _ = state.messenger.send_html(chat, &report.summary_caption()).await;
    }
}
