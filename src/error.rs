//! Pattern compilation errors.
//!
//! Compilation failures come in two flavors: lexical (bad characters,
//! unterminated strings) and syntactic (well-formed tokens in an order the
//! grammar rejects, or validator misuse). Both carry byte offsets into the
//! pattern source. Shape mismatches at match time are never errors; the
//! matcher reports them as a plain `false`.

use thiserror::Error;

/// Tokenizer failure. Offsets are byte positions into the pattern source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence `\\{ch}` at offset {offset}")]
    InvalidEscape { ch: char, offset: usize },

    #[error("malformed number `{text}` at offset {offset}")]
    MalformedNumber { text: String, offset: usize },
}

/// Parser failure. `expected` names the construct the grammar wanted;
/// `found` describes the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found} at offset {offset}")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of pattern, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("duplicate object key {key:?} at offset {offset}")]
    DuplicateKey { key: String, offset: usize },

    #[error("unknown validator `{name}` at offset {offset}")]
    UnknownValidator { name: String, offset: usize },

    #[error("validator `{name}` takes {expected} argument(s), got {got} at offset {offset}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
        offset: usize,
    },
}

/// Any failure to compile pattern text into a [`Pattern`](crate::Pattern).
///
/// Raised before any candidate value is examined; an invalid pattern never
/// produces a partial match.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display_includes_offset() {
        let err = LexError::UnexpectedChar { ch: '@', offset: 7 };
        assert_eq!(err.to_string(), "unexpected character `@` at offset 7");
    }

    #[test]
    fn syntax_error_display_names_expected_construct() {
        let err = SyntaxError::Unexpected {
            expected: "`:` after object key",
            found: "`,`".to_string(),
            offset: 12,
        };
        assert_eq!(
            err.to_string(),
            "expected `:` after object key, found `,` at offset 12"
        );
    }

    #[test]
    fn pattern_error_is_transparent() {
        let lex: PatternError = LexError::UnterminatedString { offset: 3 }.into();
        assert_eq!(
            lex.to_string(),
            "unterminated string literal starting at offset 3"
        );
        let syn: PatternError = SyntaxError::UnexpectedEnd { expected: "a value" }.into();
        assert_eq!(syn.to_string(), "unexpected end of pattern, expected a value");
    }
}
