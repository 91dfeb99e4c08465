//! The compiled pattern AST.
//!
//! A [`Pattern`] is an immutable tree built once per invocation, either by
//! the parser from pattern text or directly by the caller as a native
//! structural literal. It is never mutated during matching, so a compiled
//! pattern can be shared read-only across threads.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A scalar literal inside a pattern: the leaf values of JSON plus validator
/// arguments. Numbers are kept as `f64` and compared by numeric value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Num(n) => write!(f, "{n}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Built-in runtime kind assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Number,
    Boolean,
}

impl JsonType {
    pub fn name(&self) -> &'static str {
        match self {
            JsonType::String => "String",
            JsonType::Number => "Number",
            JsonType::Boolean => "Boolean",
        }
    }

    pub fn from_name(name: &str) -> Option<JsonType> {
        match name {
            "String" => Some(JsonType::String),
            "Number" => Some(JsonType::Number),
            "Boolean" => Some(JsonType::Boolean),
            _ => None,
        }
    }
}

/// One object pattern entry: `"key": subpattern` or `"key"?: subpattern`.
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: String,
    pub pattern: Pattern,
    /// Optional entries match whether or not the key is present in the
    /// candidate; when present, the value must still match.
    pub optional: bool,
}

/// A caller-supplied one-argument predicate used as a leaf pattern node.
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A compiled pattern node.
///
/// `Alternation` and `Conjunction` require at least one branch; the parser
/// cannot produce an empty branch list (`OR`/`AND` are infix), and hand-built
/// trees must uphold the same invariant; use [`Pattern::any_of`] and
/// [`Pattern::all_of`].
#[derive(Clone)]
pub enum Pattern {
    /// Exact scalar match.
    Literal(Scalar),
    /// `{"a": P, "b"?: Q}`; `open` tolerates unlisted keys.
    Object { entries: Vec<Entry>, open: bool },
    /// `[P, Q]`, positional; `open` tolerates extra trailing items.
    Array { elements: Vec<Pattern>, open: bool },
    /// `P OR Q OR R`; any branch matches.
    Alternation(Vec<Pattern>),
    /// `P AND Q`; every branch matches.
    Conjunction(Vec<Pattern>),
    /// `String` / `Number` / `Boolean` runtime kind assertion.
    Type(JsonType),
    /// `uuid(4)`, `range(2, 3)`, or a caller-registered validator.
    Validator { name: String, args: Vec<Scalar> },
    /// Caller-supplied predicate; only constructible natively.
    Predicate(PredicateFn),
}

impl Pattern {
    /// Wrap a closure as a leaf pattern node. A panic inside the closure is
    /// treated as a failed match, never propagated.
    pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Pattern {
        Pattern::Predicate(Arc::new(f))
    }

    pub fn literal(scalar: Scalar) -> Pattern {
        Pattern::Literal(scalar)
    }

    /// Logical OR over the given branches. The branch list must be non-empty.
    pub fn any_of(branches: Vec<Pattern>) -> Pattern {
        debug_assert!(!branches.is_empty(), "alternation requires at least one branch");
        Pattern::Alternation(branches)
    }

    /// Logical AND over the given branches. The branch list must be non-empty.
    pub fn all_of(branches: Vec<Pattern>) -> Pattern {
        debug_assert!(!branches.is_empty(), "conjunction requires at least one branch");
        Pattern::Conjunction(branches)
    }

    /// Build a pattern from a native JSON value.
    ///
    /// Objects and arrays become *closed* patterns with no optional keys;
    /// scalars become exact literals. The result matches exactly the values
    /// an equivalent parsed pattern would match.
    pub fn from_json(value: &Value) -> Pattern {
        match value {
            Value::Null => Pattern::Literal(Scalar::Null),
            Value::Bool(b) => Pattern::Literal(Scalar::Bool(*b)),
            Value::Number(n) => Pattern::Literal(Scalar::Num(n.as_f64().unwrap_or(f64::NAN))),
            Value::String(s) => Pattern::Literal(Scalar::Str(s.clone())),
            Value::Array(items) => Pattern::Array {
                elements: items.iter().map(Pattern::from_json).collect(),
                open: false,
            },
            Value::Object(map) => Pattern::Object {
                entries: map
                    .iter()
                    .map(|(key, v)| Entry {
                        key: key.clone(),
                        pattern: Pattern::from_json(v),
                        optional: false,
                    })
                    .collect(),
                open: false,
            },
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Pattern::Object { entries, open } => f
                .debug_struct("Object")
                .field("entries", entries)
                .field("open", open)
                .finish(),
            Pattern::Array { elements, open } => f
                .debug_struct("Array")
                .field("elements", elements)
                .field("open", open)
                .finish(),
            Pattern::Alternation(branches) => f.debug_tuple("Alternation").field(branches).finish(),
            Pattern::Conjunction(branches) => f.debug_tuple("Conjunction").field(branches).finish(),
            Pattern::Type(t) => f.debug_tuple("Type").field(t).finish(),
            Pattern::Validator { name, args } => f
                .debug_struct("Validator")
                .field("name", name)
                .field("args", args)
                .finish(),
            Pattern::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

/// Render a pattern back to DSL-like text for debugging and error output.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(s) => write!(f, "{s}"),
            Pattern::Object { entries, open } => {
                write!(f, "{{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let marker = if entry.optional { "?" } else { "" };
                    write!(f, "{:?}{marker}: {}", entry.key, entry.pattern)?;
                }
                if *open {
                    if entries.is_empty() {
                        write!(f, "...")?;
                    } else {
                        write!(f, ", ...")?;
                    }
                }
                write!(f, "}}")
            }
            Pattern::Array { elements, open } => {
                write!(f, "[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                if *open {
                    if elements.is_empty() {
                        write!(f, "...")?;
                    } else {
                        write!(f, ", ...")?;
                    }
                }
                write!(f, "]")
            }
            Pattern::Alternation(branches) => {
                let rendered: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
                write!(f, "({})", rendered.join(" OR "))
            }
            Pattern::Conjunction(branches) => {
                let rendered: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
                write!(f, "({})", rendered.join(" AND "))
            }
            Pattern::Type(t) => write!(f, "{}", t.name()),
            Pattern::Validator { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", rendered.join(", "))
            }
            Pattern::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}
