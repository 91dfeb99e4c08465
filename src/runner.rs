//! Candidate evaluation over files.
//!
//! Loads candidate JSON documents, evaluates each against a compiled
//! pattern in parallel, and collects per-file verdicts into a [`Report`].
//! Unreadable or non-JSON candidates become error verdicts rather than
//! aborting the whole run.

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::pattern::Pattern;
use crate::registry::Registry;

/// The result of checking one candidate document.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub path: String,
    pub matched: bool,
    /// Present when the candidate could not be read or parsed as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub verdicts: Vec<Verdict>,
}

impl Report {
    pub fn matched_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.matched).count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| !v.matched && v.error.is_none())
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.error.is_some()).count()
    }

    /// Exit code: 0 = every candidate matched, 1 = at least one mismatch,
    /// 2 = at least one candidate could not be read or parsed.
    pub fn exit_code(&self) -> i32 {
        if self.error_count() > 0 {
            2
        } else if self.mismatch_count() > 0 {
            1
        } else {
            0
        }
    }
}

/// Evaluate every file against the pattern in parallel. Verdict order
/// follows the input path order regardless of scheduling.
pub fn evaluate_files(registry: &Registry, pattern: &Pattern, paths: &[PathBuf]) -> Report {
    let verdicts = paths
        .par_iter()
        .map(|path| evaluate_file(registry, pattern, path))
        .collect();
    Report { verdicts }
}

fn evaluate_file(registry: &Registry, pattern: &Pattern, path: &PathBuf) -> Verdict {
    let display = path.display().to_string();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return error_verdict(display, format!("read error: {e}")),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => evaluate_value(registry, pattern, display, &value),
        Err(e) => error_verdict(display, format!("invalid JSON: {e}")),
    }
}

/// Evaluate an already-parsed candidate under a display name.
pub fn evaluate_value(
    registry: &Registry,
    pattern: &Pattern,
    name: String,
    value: &Value,
) -> Verdict {
    Verdict {
        path: name,
        matched: registry.matches(pattern, value),
        error: None,
    }
}

fn error_verdict(path: String, reason: String) -> Verdict {
    Verdict {
        path,
        matched: false,
        error: Some(reason),
    }
}
