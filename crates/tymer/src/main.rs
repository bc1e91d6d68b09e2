use std::sync::Arc;

use tymer_core::{config::Config, store::SessionStore};
use tymer_sheet::CsvSheet;

#[tokio::main]
async fn main() -> Result<(), tymer_core::Error> {
    tymer_core::logging::init("tymer")?;

    let cfg = Arc::new(Config::load()?);
    let store: Arc<dyn SessionStore> = Arc::new(CsvSheet::open(&cfg.sheet_file)?);

    tymer_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| tymer_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
