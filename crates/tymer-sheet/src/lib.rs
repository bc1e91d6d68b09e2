//! Spreadsheet adapter: CSV-file-backed session store.
//!
//! Implements the `tymer-core` SessionStore port over an append-only CSV
//! file with the sheet's column layout:
//!
//! `chat_id,start_time,end_time,type,duration`
//!
//! Timestamps use `%Y-%m-%d %H:%M:%S` local time. Rows are immutable once
//! appended; malformed rows are skipped with a warning rather than failing
//! the whole read.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use tymer_core::{
    domain::{ChatId, IntervalKind, SessionRecord},
    store::SessionStore,
    Error, Result,
};

const HEADER: &str = "chat_id,start_time,end_time,type,duration";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvSheet {
    path: PathBuf,
    // Serializes appends so interleaved writers cannot tear rows.
    write_lock: Mutex<()>,
}

impl CsvSheet {
    /// Open (creating if necessary) the sheet at `path`, writing the header
    /// row when the file is new or empty.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = match fs::metadata(path) {
            Ok(md) => md.len() == 0,
            Err(_) => true,
        };

        if needs_header {
            let mut f = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(f, "{HEADER}")?;
        }

        println!("[SHEET] Using sheet file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn format_row(record: &SessionRecord) -> String {
        format!(
            "{},{},{},{},{}",
            record.chat.0,
            record.started_at.format(TIME_FORMAT),
            record.ended_at.format(TIME_FORMAT),
            record.kind.as_str(),
            record.duration_minutes
        )
    }

    fn parse_row(line: &str) -> Option<SessionRecord> {
        let mut fields = line.split(',');
        let chat = fields.next()?.trim().parse::<i64>().ok()?;
        let started_at =
            NaiveDateTime::parse_from_str(fields.next()?.trim(), TIME_FORMAT).ok()?;
        let ended_at = NaiveDateTime::parse_from_str(fields.next()?.trim(), TIME_FORMAT).ok()?;
        let kind = IntervalKind::parse(fields.next()?)?;
        let duration_minutes = fields.next()?.trim().parse::<f64>().ok()?;

        Some(SessionRecord {
            chat: ChatId(chat),
            started_at,
            ended_at,
            kind,
            duration_minutes,
        })
    }
}

#[async_trait]
impl SessionStore for CsvSheet {
    async fn append(&self, record: &SessionRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Persistence(format!("open {}: {e}", self.path.display())))?;
        writeln!(f, "{}", Self::format_row(record))
            .map_err(|e| Error::Persistence(format!("append {}: {e}", self.path.display())))?;

        Ok(())
    }

    async fn query_by_chat_since(
        &self,
        chat: ChatId,
        since: NaiveDateTime,
    ) -> Result<Vec<SessionRecord>> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(format!("read {}: {e}", self.path.display())))?;

        let mut out = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line == HEADER {
                continue;
            }
            let Some(record) = Self::parse_row(line) else {
                eprintln!(
                    "[SHEET] Skipping malformed row {} in {}",
                    idx + 1,
                    self.path.display()
                );
                continue;
            };
            if record.chat == chat && record.started_at >= since {
                out.push(record);
            }
        }

        Ok(out)
    }
}
