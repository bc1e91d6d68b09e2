use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tymer_core::{
    config::Config, messaging::port::MessagingPort, recorder::SessionRecorder,
    registry::TimerRegistry, report::ReportEngine, store::SessionStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: TimerRegistry,
    pub reports: ReportEngine,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("tymer started: @{}", me.username());
    }
    println!(
        "Intervals: work {} min, break {} min",
        cfg.minutes(tymer_core::domain::IntervalKind::Work),
        cfg.minutes(tymer_core::domain::IntervalKind::Break)
    );
    println!("Sheet file: {}", cfg.sheet_file.display());

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let registry = TimerRegistry::new(
        cfg.clone(),
        SessionRecorder::new(store.clone()),
        messenger.clone(),
    );
    let reports = ReportEngine::new(store);

    let state = Arc::new(AppState {
        cfg,
        registry,
        reports,
        messenger,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
