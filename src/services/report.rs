//! Weekly reports
//!
//! Pure aggregation over elimination diary entries plus a printable HTML
//! rendering. Two reports: the diary summary (counts per type, capture
//! rate, locations) and the signal summary (which pre-elimination signals
//! were observed, and how often they preceded a catch).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{CaptureStatus, EliminationEntry, EliminationType};

/// Weekly elimination diary summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_entries: usize,
    pub pee_count: usize,
    pub poo_count: usize,
    pub captured: usize,
    pub missed: usize,
    /// Captured / total, 0 when there are no entries
    pub capture_rate_percent: f64,
    /// Entries per location, ordered by name
    pub locations: BTreeMap<String, usize>,
}

/// Weekly signal observation summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_entries: usize,
    pub entries_with_signals: usize,
    /// Per signal: how often observed, and how many of those were caught
    pub signals: BTreeMap<String, SignalCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalCount {
    pub observed: usize,
    pub captured: usize,
}

/// Build the diary summary for a week of entries
pub fn diary_report(
    entries: &[EliminationEntry],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DiaryReport {
    let mut report = DiaryReport {
        from,
        to,
        total_entries: entries.len(),
        pee_count: 0,
        poo_count: 0,
        captured: 0,
        missed: 0,
        capture_rate_percent: 0.0,
        locations: BTreeMap::new(),
    };

    for entry in entries {
        match entry.elimination_type {
            EliminationType::Pee => report.pee_count += 1,
            EliminationType::Poo => report.poo_count += 1,
            EliminationType::Both => {
                report.pee_count += 1;
                report.poo_count += 1;
            }
        }
        match entry.capture_status {
            CaptureStatus::Captured => report.captured += 1,
            CaptureStatus::Missed => report.missed += 1,
        }
        *report.locations.entry(entry.location.clone()).or_default() += 1;
    }

    if !entries.is_empty() {
        report.capture_rate_percent =
            (report.captured as f64 / entries.len() as f64) * 100.0;
    }
    report
}

/// Build the signal summary for a week of entries
pub fn signal_report(
    entries: &[EliminationEntry],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> SignalReport {
    let mut report = SignalReport {
        from,
        to,
        total_entries: entries.len(),
        entries_with_signals: 0,
        signals: BTreeMap::new(),
    };

    for entry in entries {
        if entry.signals.is_empty() {
            continue;
        }
        report.entries_with_signals += 1;
        for signal in &entry.signals {
            let count = report.signals.entry(signal.clone()).or_default();
            count.observed += 1;
            if entry.capture_status == CaptureStatus::Captured {
                count.captured += 1;
            }
        }
    }
    report
}

/// Render the diary report as a printable HTML page
pub fn render_diary_html(report: &DiaryReport) -> String {
    let mut rows = String::new();
    for (location, count) in &report.locations {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(location),
            count
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="sv">
<head><meta charset="utf-8"><title>Veckorapport: blöjfri dagbok</title>
<style>body{{font-family:sans-serif;margin:2rem}}table{{border-collapse:collapse}}td,th{{border:1px solid #ccc;padding:0.4rem 0.8rem}}</style>
</head>
<body>
<h1>Blöjfri dagbok</h1>
<p>{from} – {to}</p>
<ul>
<li>Registreringar: {total}</li>
<li>Kiss: {pee}, bajs: {poo}</li>
<li>Fångade: {captured}, missade: {missed} ({rate:.0}% fångade)</li>
</ul>
<h2>Platser</h2>
<table><tr><th>Plats</th><th>Antal</th></tr>
{rows}</table>
</body>
</html>
"#,
        from = report.from.format("%Y-%m-%d"),
        to = report.to.format("%Y-%m-%d"),
        total = report.total_entries,
        pee = report.pee_count,
        poo = report.poo_count,
        captured = report.captured,
        missed = report.missed,
        rate = report.capture_rate_percent,
        rows = rows,
    )
}

/// Render the signal report as a printable HTML page
pub fn render_signal_html(report: &SignalReport) -> String {
    let mut rows = String::new();
    for (signal, count) in &report.signals {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(signal),
            count.observed,
            count.captured
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="sv">
<head><meta charset="utf-8"><title>Veckorapport: signaler</title>
<style>body{{font-family:sans-serif;margin:2rem}}table{{border-collapse:collapse}}td,th{{border:1px solid #ccc;padding:0.4rem 0.8rem}}</style>
</head>
<body>
<h1>Observerade signaler</h1>
<p>{from} – {to}</p>
<p>{with_signals} av {total} registreringar hade signaler.</p>
<table><tr><th>Signal</th><th>Observerad</th><th>Ledde till fångst</th></tr>
{rows}</table>
</body>
</html>
"#,
        from = report.from.format("%Y-%m-%d"),
        to = report.to.format("%Y-%m-%d"),
        with_signals = report.entries_with_signals,
        total = report.total_entries,
        rows = rows,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(
        elimination_type: EliminationType,
        capture_status: CaptureStatus,
        location: &str,
        signals: &[&str],
    ) -> EliminationEntry {
        EliminationEntry {
            id: 0,
            user_id: 1,
            occurred_at: Utc::now(),
            elimination_type,
            location: location.to_string(),
            capture_status,
            signals: signals.iter().map(|s| s.to_string()).collect(),
            notes: None,
        }
    }

    fn week() -> (DateTime<Utc>, DateTime<Utc>) {
        let to = Utc::now();
        (to - Duration::days(7), to)
    }

    #[test]
    fn test_diary_counts_and_capture_rate() {
        let (from, to) = week();
        let entries = vec![
            entry(EliminationType::Pee, CaptureStatus::Captured, "potty", &[]),
            entry(EliminationType::Poo, CaptureStatus::Missed, "diaper", &[]),
            entry(EliminationType::Both, CaptureStatus::Captured, "potty", &[]),
            entry(EliminationType::Pee, CaptureStatus::Captured, "sink", &[]),
        ];

        let report = diary_report(&entries, from, to);
        assert_eq!(report.total_entries, 4);
        assert_eq!(report.pee_count, 3);
        assert_eq!(report.poo_count, 2);
        assert_eq!(report.captured, 3);
        assert_eq!(report.missed, 1);
        assert_eq!(report.capture_rate_percent, 75.0);
        assert_eq!(report.locations["potty"], 2);
    }

    #[test]
    fn test_empty_week() {
        let (from, to) = week();
        let report = diary_report(&[], from, to);
        assert_eq!(report.total_entries, 0);
        assert_eq!(report.capture_rate_percent, 0.0);
    }

    #[test]
    fn test_signal_summary() {
        let (from, to) = week();
        let entries = vec![
            entry(EliminationType::Pee, CaptureStatus::Captured, "potty", &["squirming"]),
            entry(
                EliminationType::Pee,
                CaptureStatus::Missed,
                "diaper",
                &["squirming", "fussing"],
            ),
            entry(EliminationType::Poo, CaptureStatus::Captured, "potty", &[]),
        ];

        let report = signal_report(&entries, from, to);
        assert_eq!(report.entries_with_signals, 2);
        assert_eq!(report.signals["squirming"].observed, 2);
        assert_eq!(report.signals["squirming"].captured, 1);
        assert_eq!(report.signals["fussing"].observed, 1);
        assert_eq!(report.signals["fussing"].captured, 0);
    }

    #[test]
    fn test_html_rendering_escapes_content() {
        let (from, to) = week();
        let entries = vec![entry(
            EliminationType::Pee,
            CaptureStatus::Captured,
            "<script>",
            &[],
        )];

        let html = render_diary_html(&diary_report(&entries, from, to));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Registreringar: 1"));
    }
}
