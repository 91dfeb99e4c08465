//! Structural pattern matching for JSON.
//!
//! A small DSL for asserting the *shape* of a JSON value: partial matches,
//! optional fields, logical alternation, type assertions, ranges, and custom
//! predicates.
//!
//! ```
//! use serde_json::json;
//!
//! let verdict = json_pattern::matches(
//!     r#"{"id": Number, "name": "test", ...}"#,
//!     &json!({"id": 5, "name": "test", "extra": 1}),
//! ).unwrap();
//! assert!(verdict);
//! ```
//!
//! Patterns can also be built natively from JSON values (closed, exact
//! matches) with embedded predicate closures:
//!
//! ```
//! use json_pattern::Pattern;
//! use serde_json::json;
//!
//! let pattern = Pattern::from_json(&json!({"id": 5}));
//! assert!(json_pattern::matches_value(&pattern, &json!({"id": 5})));
//! ```
//!
//! Custom validators are registered on a [`Registry`] before parsing:
//!
//! ```
//! use json_pattern::Registry;
//! use serde_json::json;
//!
//! let mut registry = Registry::default();
//! registry.register("even", 0, |v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
//! assert!(registry.matches_text(r#"{"n": even()}"#, &json!({"n": 4})).unwrap());
//! ```

pub mod cli;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod registry;
pub mod runner;

use std::io::Read;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use serde_json::Value;

pub use error::{LexError, PatternError, SyntaxError};
pub use pattern::{Entry, JsonType, Pattern, Scalar};
pub use registry::Registry;

use cli::Args;
use formatter::create_formatter;
use runner::Report;

static DEFAULT_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::default);

/// Compile pattern text using the built-in validators.
pub fn compile(text: &str) -> Result<Pattern, PatternError> {
    DEFAULT_REGISTRY.compile(text)
}

/// Compile pattern text and evaluate it against a candidate value.
///
/// Compilation failures surface before the value is examined; a shape
/// mismatch is the `Ok(false)` outcome, never an error.
pub fn matches(pattern_text: &str, value: &Value) -> Result<bool, PatternError> {
    DEFAULT_REGISTRY.matches_text(pattern_text, value)
}

/// Evaluate an already-compiled pattern using the built-in validators.
pub fn matches_value(pattern: &Pattern, value: &Value) -> bool {
    DEFAULT_REGISTRY.matches(pattern, value)
}

/// Run the CLI. Returns the exit code: 0 = all candidates matched,
/// 1 = at least one mismatch, 2 = a candidate was unreadable or not JSON.
pub fn run(args: Args) -> Result<i32> {
    let registry = Registry::default();

    if args.list_validators {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(0);
    }

    let pattern_text = match (&args.pattern, &args.pattern_file) {
        (Some(text), None) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pattern file {}", path.display()))?,
        (None, None) => bail!("either --pattern or --pattern-file is required"),
        (Some(_), Some(_)) => unreachable!("clap rejects the combination"),
    };

    let pattern = registry
        .compile(&pattern_text)
        .context("invalid pattern")?;

    if args.debug {
        eprintln!("debug: compiled pattern: {pattern}");
    }

    let report = if args.paths.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        let value: Value = serde_json::from_str(&input).context("stdin is not valid JSON")?;
        Report {
            verdicts: vec![runner::evaluate_value(
                &registry,
                &pattern,
                "<stdin>".to_string(),
                &value,
            )],
        }
    } else {
        runner::evaluate_files(&registry, &pattern, &args.paths)
    };

    let formatter = create_formatter(&args.format);
    formatter.print(&report);

    Ok(report.exit_code())
}
