//! Stacked-bar SVG chart for the weekly report.
//!
//! Pure presentation over the daily series: one stacked bar per calendar
//! date, work below break, matching the colors of the original report chart.
//! Self-contained string building; no drawing dependency.

use std::{collections::BTreeMap, fmt::Write};

use chrono::NaiveDate;

use crate::report::DayTotals;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 48.0;

const WORK_COLOR: &str = "#4CAF50";
const BREAK_COLOR: &str = "#FF9800";

/// Render the daily series as an SVG document. Callers handle the empty
/// series separately ("no data"); an empty input still yields a valid chart
/// frame.
pub fn render_daily_chart(daily: &BTreeMap<NaiveDate, DayTotals>) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max_minutes = daily.values().map(DayTotals::total).fold(0.0, f64::max);
    let scale_max = if max_minutes > 0.0 { max_minutes } else { 1.0 };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16">Weekly productivity</text>"#,
        x = WIDTH / 2.0
    );

    // Horizontal gridlines with y-axis labels, quarter steps of the maximum.
    for step in 0..=4 {
        let value = scale_max * f64::from(step) / 4.0;
        let y = MARGIN_TOP + plot_h - plot_h * f64::from(step) / 4.0;
        let _ = write!(
            svg,
            r##"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#ddd" stroke-dasharray="4 3"/>"##,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT
        );
        let _ = write!(
            svg,
            r##"<text x="{x}" y="{ty:.1}" text-anchor="end" font-family="sans-serif" font-size="11" fill="#555">{value:.0}</text>"##,
            x = MARGIN_LEFT - 8.0,
            ty = y + 4.0
        );
    }

    // One stacked bar per day, work segment below, break on top.
    let n = daily.len().max(1) as f64;
    let slot_w = plot_w / n;
    let bar_w = slot_w * 0.6;
    let baseline = MARGIN_TOP + plot_h;

    for (i, (date, totals)) in daily.iter().enumerate() {
        let x = MARGIN_LEFT + slot_w * i as f64 + (slot_w - bar_w) / 2.0;

        let work_h = plot_h * totals.work_minutes / scale_max;
        let break_h = plot_h * totals.break_minutes / scale_max;

        if work_h > 0.0 {
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_w:.1}" height="{work_h:.1}" fill="{WORK_COLOR}"/>"#,
                y = baseline - work_h
            );
        }
        if break_h > 0.0 {
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_w:.1}" height="{break_h:.1}" fill="{BREAK_COLOR}"/>"#,
                y = baseline - work_h - break_h
            );
        }

        let _ = write!(
            svg,
            r##"<text x="{tx:.1}" y="{ty:.1}" text-anchor="middle" font-family="sans-serif" font-size="11" fill="#333">{label}</text>"##,
            tx = x + bar_w / 2.0,
            ty = baseline + 16.0,
            label = date.format("%m-%d")
        );
    }

    // Axis line + legend.
    let _ = write!(
        svg,
        r##"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#333"/>"##,
        x1 = MARGIN_LEFT,
        x2 = WIDTH - MARGIN_RIGHT,
        y = baseline
    );
    let legend_x = MARGIN_LEFT;
    let legend_y = HEIGHT - 12.0;
    let _ = write!(
        svg,
        r#"<rect x="{legend_x}" y="{y:.1}" width="12" height="12" fill="{WORK_COLOR}"/><text x="{tx}" y="{ty:.1}" font-family="sans-serif" font-size="12">Work</text>"#,
        y = legend_y - 10.0,
        tx = legend_x + 18.0,
        ty = legend_y
    );
    let _ = write!(
        svg,
        r#"<rect x="{x}" y="{y:.1}" width="12" height="12" fill="{BREAK_COLOR}"/><text x="{tx}" y="{ty:.1}" font-family="sans-serif" font-size="12">Break</text>"#,
        x = legend_x + 80.0,
        y = legend_y - 10.0,
        tx = legend_x + 98.0,
        ty = legend_y
    );

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn renders_one_stacked_bar_per_day() {
        let mut daily = BTreeMap::new();
        daily.insert(
            day(24),
            DayTotals {
                work_minutes: 50.0,
                break_minutes: 10.0,
            },
        );
        daily.insert(
            day(25),
            DayTotals {
                work_minutes: 25.0,
                break_minutes: 0.0,
            },
        );

        let svg = render_daily_chart(&daily);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));

        // Two work bars plus one break bar plus the legend swatches.
        assert_eq!(svg.matches(WORK_COLOR).count(), 3);
        assert_eq!(svg.matches(BREAK_COLOR).count(), 2);
        assert!(svg.contains("08-24"));
        assert!(svg.contains("08-25"));
    }

    #[test]
    fn empty_series_still_yields_a_valid_frame() {
        let svg = render_daily_chart(&BTreeMap::new());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Weekly productivity"));
        assert!(svg.ends_with("</svg>"));
    }
}
