//! Weekly productivity summary over persisted session records.
//!
//! Downstream consumer of the session store; reads a trailing window of
//! records, sums durations by kind, and groups by calendar date for the
//! chart. An empty window is a valid "no data" state, not an error.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Duration, Local, NaiveDate};

use crate::{
    domain::{ChatId, IntervalKind, SessionRecord},
    store::SessionStore,
    Result,
};

/// Minutes per kind for one calendar date.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DayTotals {
    pub work_minutes: f64,
    pub break_minutes: f64,
}

impl DayTotals {
    pub fn total(&self) -> f64 {
        self.work_minutes + self.break_minutes
    }
}

#[derive(Clone, Debug, Default)]
pub struct WeeklyReport {
    pub work_minutes: f64,
    pub break_minutes: f64,
    pub session_count: usize,
    /// Date-sorted series for the chart.
    pub daily: BTreeMap<NaiveDate, DayTotals>,
}

impl WeeklyReport {
    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }

    pub fn summary_caption(&self) -> String {
        format!(
            "📊 Weekly report:\n\n🕒 Work minutes: {:.1}\n☕ Break minutes: {:.1}\n🔢 Sessions: {}",
            self.work_minutes, self.break_minutes, self.session_count
        )
    }
}

#[derive(Clone)]
pub struct ReportEngine {
    store: Arc<dyn SessionStore>,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Aggregate all of the chat's records started within the trailing
    /// `window_days`.
    pub async fn build_report(&self, chat: ChatId, window_days: i64) -> Result<WeeklyReport> {
        let since = Local::now().naive_local() - Duration::days(window_days);
        let records = self.store.query_by_chat_since(chat, since).await?;
        Ok(aggregate(&records))
    }
}

fn aggregate(records: &[SessionRecord]) -> WeeklyReport {
    let mut report = WeeklyReport::default();

    for record in records {
        let day = report.daily.entry(record.started_at.date()).or_default();
        match record.kind {
            IntervalKind::Work => {
                report.work_minutes += record.duration_minutes;
                day.work_minutes += record.duration_minutes;
            }
            IntervalKind::Break => {
                report.break_minutes += record.duration_minutes;
                day.break_minutes += record.duration_minutes;
            }
        }
        report.session_count += 1;
    }

    report
}
