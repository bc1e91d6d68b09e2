//! Telegram update handlers.
//!
//! Each handler validates the update, maps it onto a core operation
//! (start/stop/report), and replies best-effort. Timer correctness lives in
//! the core registry; handlers never touch timer state directly.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
    }

    let _ = bot
        .send_message(msg.chat.id, "Use /work, /break, /stop or /report.")
        .await;

    Ok(())
}
