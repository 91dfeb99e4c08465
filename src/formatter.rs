//! Report output formats.

use std::io::Write;

use crate::runner::Report;

pub trait Formatter {
    fn format_to(&self, report: &Report, out: &mut dyn Write);

    fn print(&self, report: &Report) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.format_to(report, &mut lock);
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format {
        "json" => Box::new(JsonFormatter),
        "quiet" => Box::new(QuietFormatter),
        // "text" and any unknown value
        _ => Box::new(TextFormatter),
    }
}

/// One line per candidate plus a summary line.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_to(&self, report: &Report, out: &mut dyn Write) {
        for verdict in &report.verdicts {
            let outcome = match (&verdict.error, verdict.matched) {
                (Some(reason), _) => format!("error: {reason}"),
                (None, true) => "match".to_string(),
                (None, false) => "mismatch".to_string(),
            };
            let _ = writeln!(out, "{}: {outcome}", verdict.path);
        }
        let _ = writeln!(
            out,
            "{} candidate(s): {} matched, {} mismatched, {} error(s)",
            report.verdicts.len(),
            report.matched_count(),
            report.mismatch_count(),
            report.error_count(),
        );
    }
}

/// The whole report as a JSON document.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_to(&self, report: &Report, out: &mut dyn Write) {
        let _ = serde_json::to_writer_pretty(&mut *out, report);
        let _ = writeln!(out);
    }
}

/// Only mismatches and errors, no summary.
pub struct QuietFormatter;

impl Formatter for QuietFormatter {
    fn format_to(&self, report: &Report, out: &mut dyn Write) {
        for verdict in &report.verdicts {
            match (&verdict.error, verdict.matched) {
                (Some(reason), _) => {
                    let _ = writeln!(out, "{}: error: {reason}", verdict.path);
                }
                (None, false) => {
                    let _ = writeln!(out, "{}: mismatch", verdict.path);
                }
                (None, true) => {}
            }
        }
    }
}
