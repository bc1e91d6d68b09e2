use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::IntervalKind, errors::Error, Result};

/// Typed configuration, built once at startup and passed to components.
///
/// Interval durations are fixed constants (Work = 25 min, Break = 5 min by
/// default), overridable via env for testing and deployment, never per-user.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Path of the CSV sheet the session records are appended to.
    pub sheet_file: PathBuf,

    pub work_duration: Duration,
    pub break_duration: Duration,

    /// Trailing window of the `/report` summary, in days.
    pub report_window_days: i64,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let sheet_file = PathBuf::from(
            env_str("SHEET_FILE").unwrap_or("/tmp/tymer-sessions.csv".to_string()),
        );

        let work_minutes = env_u64("WORK_MINUTES").unwrap_or(25).max(1);
        let break_minutes = env_u64("BREAK_MINUTES").unwrap_or(5).max(1);
        let report_window_days = env_u64("REPORT_WINDOW_DAYS").unwrap_or(7).max(1) as i64;

        Ok(Self {
            telegram_bot_token,
            sheet_file,
            work_duration: Duration::from_secs(work_minutes * 60),
            break_duration: Duration::from_secs(break_minutes * 60),
            report_window_days,
        })
    }

    pub fn duration(&self, kind: IntervalKind) -> Duration {
        match kind {
            IntervalKind::Work => self.work_duration,
            IntervalKind::Break => self.break_duration,
        }
    }

    /// Interval length in whole minutes, for user-facing messages.
    pub fn minutes(&self, kind: IntervalKind) -> u64 {
        self.duration(kind).as_secs() / 60
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
