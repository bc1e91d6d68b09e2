use std::sync::Arc;

use teloxide::prelude::*;

use tymer_core::{
    domain::{ChatId, IntervalKind},
    messaging::types::{CB_START_BREAK, CB_START_WORK, CB_STOP},
};

use crate::router::AppState;

/// Timer control buttons: start work / start break / stop. Mirrors the
/// command handlers; the buttons are just a faster path to the same core
/// operations.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();
    let chat_id = q.message.as_ref().map(|m| m.chat.id);

    let Some(chat_id) = chat_id else {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    };
    let chat = ChatId(chat_id.0);

    match data.as_str() {
        CB_START_WORK => {
            let _ = bot.answer_callback_query(cb_id).await;
            start_from_button(&bot, chat_id, &state, IntervalKind::Work).await;
        }
        CB_START_BREAK => {
            let _ = bot.answer_callback_query(cb_id).await;
            start_from_button(&bot, chat_id, &state, IntervalKind::Break).await;
        }
        CB_STOP => {
            let stopped = state.registry.stop_interval(chat).await;
            let note = if stopped {
                "Timer stopped"
            } else {
                "No timer is running"
            };
            let _ = bot
                .answer_callback_query(cb_id)
                .text(note.to_string())
                .await;
        }
        _ => {
            let _ = bot.answer_callback_query(cb_id).await;
        }
    }

    Ok(())
}

async fn start_from_button(
    bot: &Bot,
    chat_id: teloxide::types::ChatId,
    state: &AppState,
    kind: IntervalKind,
) {
    let chat = ChatId(chat_id.0);
    if let Err(e) = state.registry.start_interval(chat, kind).await {
        eprintln!(
            "[TIMER] Failed to start {} for chat {}: {e}",
            kind.as_str(),
            chat.0
        );
        let _ = bot
            .send_message(chat_id, "❌ Could not start the timer, try again.")
            .await;
    }
}
