//! Recursive structural matcher.
//!
//! Evaluates a compiled [`Pattern`] against a `serde_json::Value`. Pure and
//! side-effect-free: shape or value mismatches of any kind are the normal
//! `false` outcome, never errors. Only malformed pattern *text* fails, and it
//! fails at compile time; by the time a pattern reaches this module it is
//! structurally valid.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::pattern::{Pattern, Scalar};
use crate::registry::Registry;

/// Evaluate `pattern` against `value`.
///
/// Recursion depth is bounded by the combined nesting of the pattern and the
/// candidate, and no node is ever mutated, so concurrent calls over a shared
/// pattern need no coordination.
pub fn matches(registry: &Registry, pattern: &Pattern, value: &Value) -> bool {
    match pattern {
        Pattern::Literal(scalar) => matches_literal(scalar, value),

        Pattern::Object { entries, open } => {
            let Value::Object(map) = value else {
                return false;
            };
            // Every listed entry must be satisfied: present-and-matching, or
            // absent-and-optional.
            for entry in entries {
                match map.get(&entry.key) {
                    Some(v) => {
                        if !matches(registry, &entry.pattern, v) {
                            return false;
                        }
                    }
                    None => {
                        if !entry.optional {
                            return false;
                        }
                    }
                }
            }
            // Closed objects reject keys the pattern does not list.
            if !open {
                for key in map.keys() {
                    if !entries.iter().any(|e| e.key == *key) {
                        return false;
                    }
                }
            }
            true
        }

        Pattern::Array { elements, open } => {
            let Value::Array(items) = value else {
                return false;
            };
            if *open {
                if items.len() < elements.len() {
                    return false;
                }
            } else if items.len() != elements.len() {
                return false;
            }
            // Positional: the first len(elements) items are checked pairwise;
            // an open pattern leaves the rest unconstrained.
            elements
                .iter()
                .zip(items.iter())
                .all(|(p, v)| matches(registry, p, v))
        }

        Pattern::Alternation(branches) => {
            branches.iter().any(|b| matches(registry, b, value))
        }

        Pattern::Conjunction(branches) => {
            branches.iter().all(|b| matches(registry, b, value))
        }

        Pattern::Type(ty) => registry.check(ty.name(), value, &[]),

        Pattern::Validator { name, args } => registry.check(name, value, args),

        Pattern::Predicate(f) => {
            // A panicking caller predicate is a failed match, not a crash.
            panic::catch_unwind(AssertUnwindSafe(|| f(value))).unwrap_or(false)
        }
    }
}

/// Scalars compare by kind and content; numbers by numeric value, not
/// textual form.
fn matches_literal(scalar: &Scalar, value: &Value) -> bool {
    match scalar {
        Scalar::Null => value.is_null(),
        Scalar::Bool(b) => value.as_bool() == Some(*b),
        Scalar::Num(n) => value.as_f64() == Some(*n),
        Scalar::Str(s) => value.as_str() == Some(s.as_str()),
    }
}
