//! Validator registry.
//!
//! Maps validator names to predicates. Pre-populated with the built-in type
//! checks (`String`, `Number`, `Boolean`) and the parametrized validators
//! `uuid(version)` and `range(min, max)`. Callers can register additional
//! validators before parsing; the parser consults the registry so an unknown
//! name or wrong argument count fails at compile time, not at match time.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::error::PatternError;
use crate::lexer::Lexer;
use crate::matcher;
use crate::parser::Parser;
use crate::pattern::{Pattern, Scalar};

type CheckFn = Arc<dyn Fn(&Value, &[Scalar]) -> bool + Send + Sync>;

/// A named validator: fixed argument arity plus the predicate itself.
#[derive(Clone)]
pub struct Validator {
    pub arity: usize,
    check: CheckFn,
}

impl Validator {
    pub fn check(&self, value: &Value, args: &[Scalar]) -> bool {
        (self.check)(value, args)
    }
}

/// The validator table consulted by the parser and the matcher.
#[derive(Clone)]
pub struct Registry {
    validators: HashMap<String, Validator>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry {
            validators: HashMap::new(),
        };
        registry.register("String", 0, |value, _| value.is_string());
        registry.register("Number", 0, |value, _| value.is_number());
        registry.register("Boolean", 0, |value, _| value.is_boolean());
        registry.register("uuid", 1, |value, args| check_uuid(value, args));
        registry.register("range", 2, |value, args| check_range(value, args));
        registry
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named validator with a fixed argument count.
    ///
    /// Replaces any existing validator of the same name. Must happen before
    /// parsing; patterns referencing `name` earlier have already failed.
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        check: impl Fn(&Value, &[Scalar]) -> bool + Send + Sync + 'static,
    ) {
        self.validators.insert(
            name.to_string(),
            Validator {
                arity,
                check: Arc::new(check),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.validators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// All registered validator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluate a registered validator. Unknown names are a failed match;
    /// the parser guarantees they cannot appear in compiled patterns.
    pub fn check(&self, name: &str, value: &Value, args: &[Scalar]) -> bool {
        self.get(name).is_some_and(|v| v.check(value, args))
    }

    /// Compile pattern text against this registry.
    pub fn compile(&self, text: &str) -> Result<Pattern, PatternError> {
        let tokens = Lexer::new(text).tokenize()?;
        let pattern = Parser::new(tokens, self).parse()?;
        Ok(pattern)
    }

    /// Evaluate a compiled pattern against a candidate value.
    pub fn matches(&self, pattern: &Pattern, value: &Value) -> bool {
        matcher::matches(self, pattern, value)
    }

    /// Compile and evaluate in one step.
    pub fn matches_text(&self, text: &str, value: &Value) -> Result<bool, PatternError> {
        let pattern = self.compile(text)?;
        Ok(self.matches(&pattern, value))
    }
}

/// Canonical 8-4-4-4-12 hyphenated hex layout. Version and variant nibbles
/// are checked separately against the requested version.
static UUID_LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
    .unwrap()
});

/// `uuid(version)`: hyphenated hex layout with the version nibble equal to
/// the argument and the variant nibble in the RFC 4122 set (8, 9, a, b).
fn check_uuid(value: &Value, args: &[Scalar]) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let Some(&Scalar::Num(version)) = args.first() else {
        return false;
    };
    if !UUID_LAYOUT.is_match(s) {
        return false;
    }
    let bytes = s.as_bytes();
    let version_nibble = (bytes[14] as char).to_digit(16);
    let variant_nibble = (bytes[19] as char).to_digit(16);
    version_nibble == Some(version as u32) && version == (version as u32) as f64
        && matches!(variant_nibble, Some(0x8..=0xb))
}

/// `range(min, max)`: numeric candidate within the inclusive bounds.
fn check_range(value: &Value, args: &[Scalar]) -> bool {
    let Some(n) = value.as_f64() else {
        return false;
    };
    let (Some(&Scalar::Num(min)), Some(&Scalar::Num(max))) = (args.first(), args.get(1)) else {
        return false;
    };
    min <= n && n <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uuid_matches(registry: &Registry, version: f64, candidate: &str) -> bool {
        registry.check("uuid", &json!(candidate), &[Scalar::Num(version)])
    }

    #[test]
    fn builtin_type_checks() {
        let registry = Registry::default();
        assert!(registry.check("String", &json!("x"), &[]));
        assert!(!registry.check("String", &json!(1), &[]));
        assert!(registry.check("Number", &json!(1.5), &[]));
        assert!(!registry.check("Number", &json!("1.5"), &[]));
        assert!(registry.check("Boolean", &json!(false), &[]));
        assert!(!registry.check("Boolean", &json!(null), &[]));
    }

    #[test]
    fn uuid_version_4_accepts_canonical() {
        let registry = Registry::default();
        // The variant nibble here is `b` (RFC 4122 allowed set).
        assert!(uuid_matches(
            &registry,
            4.0,
            "017d716b-262b-4c03-b703-e2955f674bac"
        ));
    }

    #[test]
    fn uuid_rejects_wrong_version() {
        let registry = Registry::default();
        assert!(!uuid_matches(
            &registry,
            1.0,
            "017d716b-262b-4c03-b703-e2955f674bac"
        ));
    }

    #[test]
    fn uuid_rejects_bad_variant() {
        let registry = Registry::default();
        // Variant nibble `7` is outside 8/9/a/b.
        assert!(!uuid_matches(
            &registry,
            4.0,
            "017d716b-262b-4c03-7703-e2955f674bac"
        ));
    }

    #[test]
    fn uuid_rejects_bad_layout() {
        let registry = Registry::default();
        assert!(!uuid_matches(&registry, 4.0, "017d716b262b4c03b703e2955f674bac"));
        assert!(!uuid_matches(&registry, 4.0, "not-a-uuid"));
        assert!(!registry.check("uuid", &json!(42), &[Scalar::Num(4.0)]));
    }

    #[test]
    fn uuid_accepts_uppercase_hex() {
        let registry = Registry::default();
        assert!(uuid_matches(
            &registry,
            4.0,
            "017D716B-262B-4C03-B703-E2955F674BAC"
        ));
    }

    #[test]
    fn range_is_inclusive_at_both_ends() {
        let registry = Registry::default();
        let args = [Scalar::Num(2.0), Scalar::Num(3.0)];
        assert!(registry.check("range", &json!(2), &args));
        assert!(registry.check("range", &json!(3), &args));
        assert!(registry.check("range", &json!(2.5), &args));
        assert!(!registry.check("range", &json!(1.999), &args));
        assert!(!registry.check("range", &json!(3.001), &args));
        assert!(!registry.check("range", &json!("2.5"), &args));
    }

    #[test]
    fn custom_validator_registration() {
        let mut registry = Registry::default();
        registry.register("even", 0, |value, _| {
            value.as_i64().is_some_and(|n| n % 2 == 0)
        });
        assert!(registry.contains("even"));
        assert!(registry.check("even", &json!(4), &[]));
        assert!(!registry.check("even", &json!(3), &[]));
    }

    #[test]
    fn unknown_validator_is_failed_match() {
        let registry = Registry::default();
        assert!(!registry.check("nope", &json!(1), &[]));
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::default();
        assert_eq!(
            registry.names(),
            vec!["Boolean", "Number", "String", "range", "uuid"]
        );
    }
}
