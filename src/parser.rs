//! Pattern DSL parser.
//!
//! Single-pass recursive descent with one token of lookahead, no
//! backtracking. Produces exactly one root [`Pattern`] from the token stream
//! or fails with a [`SyntaxError`] naming the expected construct.
//!
//! Grammar:
//!
//! ```text
//! pattern      := valueExpr
//! valueExpr    := orExpr
//! orExpr       := andExpr ( "OR" andExpr )*
//! andExpr      := atom ( "AND" atom )*
//! atom         := "(" valueExpr ")" | object | array | literal | typeName | call
//! object       := "{" ( entry ( "," entry )* )? ( "," )? ( "..." ( "," )? )? "}"
//! entry        := STRING "?"? ":" valueExpr
//! array        := "[" ( valueExpr ( "," valueExpr )* )? ( "," )? ( "..." ( "," )? )? "]"
//! call         := IDENT "(" ( literal ( "," literal )* )? ")"
//! ```
//!
//! `OR` binds looser than `AND`; parentheses override. A trailing bare `...`
//! marks the enclosing object or array open. Trailing commas are tolerated.
//! Validator names are resolved against the registry here, so a typo fails
//! at compile time rather than silently never matching.

use crate::error::SyntaxError;
use crate::lexer::{Spanned, Token};
use crate::pattern::{Entry, JsonType, Pattern, Scalar};
use crate::registry::Registry;

pub struct Parser<'r> {
    tokens: Vec<Spanned>,
    pos: usize,
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Spanned>, registry: &'r Registry) -> Self {
        Self {
            tokens,
            pos: 0,
            registry,
        }
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    /// Consume the next token if it equals `expected`.
    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().map(|s| &s.token) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next token, requiring it to equal `expected`.
    fn expect(&mut self, expected: &Token, what: &'static str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(spanned) if &spanned.token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(spanned) => Err(SyntaxError::Unexpected {
                expected: what,
                found: spanned.token.describe(),
                offset: spanned.offset,
            }),
            None => Err(SyntaxError::UnexpectedEnd { expected: what }),
        }
    }

    /// Parse the whole token stream into a single root pattern.
    pub fn parse(mut self) -> Result<Pattern, SyntaxError> {
        let pattern = self.parse_value_expr()?;
        if let Some(extra) = self.peek() {
            return Err(SyntaxError::Unexpected {
                expected: "end of pattern",
                found: extra.token.describe(),
                offset: extra.offset,
            });
        }
        Ok(pattern)
    }

    /// valueExpr := orExpr
    fn parse_value_expr(&mut self) -> Result<Pattern, SyntaxError> {
        self.parse_or_expr()
    }

    /// orExpr := andExpr ( "OR" andExpr )*
    fn parse_or_expr(&mut self) -> Result<Pattern, SyntaxError> {
        let first = self.parse_and_expr()?;
        if self.peek().map(|s| &s.token) != Some(&Token::Or) {
            return Ok(first);
        }
        let mut branches = vec![first];
        while self.eat(&Token::Or) {
            branches.push(self.parse_and_expr()?);
        }
        Ok(Pattern::Alternation(branches))
    }

    /// andExpr := atom ( "AND" atom )*
    fn parse_and_expr(&mut self) -> Result<Pattern, SyntaxError> {
        let first = self.parse_atom()?;
        if self.peek().map(|s| &s.token) != Some(&Token::And) {
            return Ok(first);
        }
        let mut branches = vec![first];
        while self.eat(&Token::And) {
            branches.push(self.parse_atom()?);
        }
        Ok(Pattern::Conjunction(branches))
    }

    /// atom := "(" valueExpr ")" | object | array | literal | typeName | call
    fn parse_atom(&mut self) -> Result<Pattern, SyntaxError> {
        let Some(spanned) = self.peek() else {
            return Err(SyntaxError::UnexpectedEnd { expected: "a value" });
        };
        let offset = spanned.offset;

        match spanned.token.clone() {
            Token::LParen => {
                self.advance();
                let inner = self.parse_value_expr()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Token::LBrace => self.parse_object(),
            Token::LBracket => self.parse_array(),
            Token::Str(s) => {
                self.advance();
                Ok(Pattern::Literal(Scalar::Str(s)))
            }
            Token::Num(n) => {
                self.advance();
                Ok(Pattern::Literal(Scalar::Num(n)))
            }
            Token::True => {
                self.advance();
                Ok(Pattern::Literal(Scalar::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Pattern::Literal(Scalar::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Pattern::Literal(Scalar::Null))
            }
            Token::Ident(name) => {
                self.advance();
                self.parse_ident(name, offset)
            }
            other => Err(SyntaxError::Unexpected {
                expected: "a value",
                found: other.describe(),
                offset,
            }),
        }
    }

    /// A bare identifier is one of the built-in type names; anything else
    /// must be a validator call with parenthesized literal arguments.
    fn parse_ident(&mut self, name: String, offset: usize) -> Result<Pattern, SyntaxError> {
        let called = self.peek().map(|s| &s.token) == Some(&Token::LParen);

        if !called {
            if let Some(ty) = JsonType::from_name(&name) {
                return Ok(Pattern::Type(ty));
            }
            if self.registry.contains(&name) {
                return Err(SyntaxError::Unexpected {
                    expected: "`(` after validator name",
                    found: self
                        .peek()
                        .map_or_else(|| "end of pattern".to_string(), |s| s.token.describe()),
                    offset: self.peek().map_or(offset, |s| s.offset),
                });
            }
            return Err(SyntaxError::UnknownValidator { name, offset });
        }

        let Some(validator) = self.registry.get(&name) else {
            return Err(SyntaxError::UnknownValidator { name, offset });
        };
        let expected_arity = validator.arity;

        self.expect(&Token::LParen, "`(`")?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_literal_arg()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen, "`)` or `,` in validator arguments")?;
                break;
            }
        }

        if args.len() != expected_arity {
            return Err(SyntaxError::WrongArity {
                name,
                expected: expected_arity,
                got: args.len(),
                offset,
            });
        }

        Ok(Pattern::Validator { name, args })
    }

    /// Validator arguments are scalar literals only.
    fn parse_literal_arg(&mut self) -> Result<Scalar, SyntaxError> {
        let Some(spanned) = self.peek() else {
            return Err(SyntaxError::UnexpectedEnd {
                expected: "a literal argument",
            });
        };
        let offset = spanned.offset;
        let scalar = match &spanned.token {
            Token::Str(s) => Scalar::Str(s.clone()),
            Token::Num(n) => Scalar::Num(*n),
            Token::True => Scalar::Bool(true),
            Token::False => Scalar::Bool(false),
            Token::Null => Scalar::Null,
            other => {
                return Err(SyntaxError::Unexpected {
                    expected: "a literal argument",
                    found: other.describe(),
                    offset,
                });
            }
        };
        self.advance();
        Ok(scalar)
    }

    /// object := "{" ( entry ( "," entry )* )? ( "," )? ( "..." ( "," )? )? "}"
    fn parse_object(&mut self) -> Result<Pattern, SyntaxError> {
        self.expect(&Token::LBrace, "`{`")?;
        let mut entries: Vec<Entry> = Vec::new();
        let mut open = false;

        loop {
            if self.eat(&Token::RBrace) {
                break;
            }
            if self.eat(&Token::Ellipsis) {
                // `...` must be the last element of the body.
                open = true;
                self.eat(&Token::Comma);
                self.expect(&Token::RBrace, "`}` after `...`")?;
                break;
            }

            let (key, key_offset) = match self.peek() {
                Some(Spanned {
                    token: Token::Str(s),
                    offset,
                }) => {
                    let pair = (s.clone(), *offset);
                    self.advance();
                    pair
                }
                Some(spanned) => {
                    return Err(SyntaxError::Unexpected {
                        expected: "a quoted object key or `...`",
                        found: spanned.token.describe(),
                        offset: spanned.offset,
                    });
                }
                None => {
                    return Err(SyntaxError::UnexpectedEnd {
                        expected: "a quoted object key or `}`",
                    });
                }
            };

            if entries.iter().any(|e| e.key == key) {
                return Err(SyntaxError::DuplicateKey {
                    key,
                    offset: key_offset,
                });
            }

            let optional = self.eat(&Token::Question);
            self.expect(&Token::Colon, "`:` after object key")?;
            let pattern = self.parse_value_expr()?;
            entries.push(Entry {
                key,
                pattern,
                optional,
            });

            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBrace, "`}` or `,` after object entry")?;
            break;
        }

        Ok(Pattern::Object { entries, open })
    }

    /// array := "[" ( valueExpr ( "," valueExpr )* )? ( "," )? ( "..." ( "," )? )? "]"
    fn parse_array(&mut self) -> Result<Pattern, SyntaxError> {
        self.expect(&Token::LBracket, "`[`")?;
        let mut elements: Vec<Pattern> = Vec::new();
        let mut open = false;

        loop {
            if self.eat(&Token::RBracket) {
                break;
            }
            if self.eat(&Token::Ellipsis) {
                open = true;
                self.eat(&Token::Comma);
                self.expect(&Token::RBracket, "`]` after `...`")?;
                break;
            }

            elements.push(self.parse_value_expr()?);

            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBracket, "`]` or `,` after array element")?;
            break;
        }

        Ok(Pattern::Array { elements, open })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxError;
    use crate::lexer::Lexer;

    fn parse(text: &str) -> Result<Pattern, SyntaxError> {
        let registry = Registry::default();
        let tokens = Lexer::new(text).tokenize().expect("lex failure");
        Parser::new(tokens, &registry).parse()
    }

    fn parse_ok(text: &str) -> Pattern {
        parse(text).expect("parse failure")
    }

    #[test]
    fn test_parse_scalar_literals() {
        assert!(matches!(parse_ok("5"), Pattern::Literal(Scalar::Num(n)) if n == 5.0));
        assert!(matches!(parse_ok("true"), Pattern::Literal(Scalar::Bool(true))));
        assert!(matches!(parse_ok("null"), Pattern::Literal(Scalar::Null)));
        assert!(matches!(parse_ok(r#""x""#), Pattern::Literal(Scalar::Str(s)) if s == "x"));
    }

    #[test]
    fn test_parse_type_names() {
        assert!(matches!(parse_ok("String"), Pattern::Type(JsonType::String)));
        assert!(matches!(parse_ok("Number"), Pattern::Type(JsonType::Number)));
        assert!(matches!(parse_ok("Boolean"), Pattern::Type(JsonType::Boolean)));
    }

    #[test]
    fn test_parse_closed_object() {
        let Pattern::Object { entries, open } = parse_ok(r#"{"id": Number, "name": "test"}"#)
        else {
            panic!("expected object pattern");
        };
        assert!(!open);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "id");
        assert!(!entries[0].optional);
        assert!(matches!(entries[0].pattern, Pattern::Type(JsonType::Number)));
        assert_eq!(entries[1].key, "name");
    }

    #[test]
    fn test_parse_open_object() {
        let Pattern::Object { entries, open } = parse_ok(r#"{"id": Number, ...}"#) else {
            panic!("expected object pattern");
        };
        assert!(open);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_optional_key() {
        let Pattern::Object { entries, .. } = parse_ok(r#"{"name"?: "x"}"#) else {
            panic!("expected object pattern");
        };
        assert!(entries[0].optional);
    }

    #[test]
    fn test_parse_empty_and_open_empty_containers() {
        assert!(matches!(
            parse_ok("{}"),
            Pattern::Object { ref entries, open: false } if entries.is_empty()
        ));
        assert!(matches!(
            parse_ok("{...}"),
            Pattern::Object { ref entries, open: true } if entries.is_empty()
        ));
        assert!(matches!(
            parse_ok("[]"),
            Pattern::Array { ref elements, open: false } if elements.is_empty()
        ));
        assert!(matches!(
            parse_ok("[...]"),
            Pattern::Array { ref elements, open: true } if elements.is_empty()
        ));
    }

    #[test]
    fn test_parse_trailing_commas() {
        assert!(parse(r#"{"a": 1,}"#).is_ok());
        assert!(parse(r#"[1, 2,]"#).is_ok());
        assert!(parse(r#"{"a": 1, ...,}"#).is_ok());
        assert!(parse(r#"[1, ...,]"#).is_ok());
    }

    #[test]
    fn test_parse_open_array() {
        let Pattern::Array { elements, open } = parse_ok(r#"["a", "b", ...]"#) else {
            panic!("expected array pattern");
        };
        assert!(open);
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_parse_or_chain() {
        let Pattern::Alternation(branches) = parse_ok(r#""a" OR "b" OR "c""#) else {
            panic!("expected alternation");
        };
        assert_eq!(branches.len(), 3);
    }

    #[test]
    fn test_parse_and_binds_tighter_than_or() {
        // a OR b AND c  ==  a OR (b AND c)
        let Pattern::Alternation(branches) = parse_ok("1 OR 2 AND 3") else {
            panic!("expected alternation at the root");
        };
        assert_eq!(branches.len(), 2);
        assert!(matches!(branches[0], Pattern::Literal(Scalar::Num(n)) if n == 1.0));
        let Pattern::Conjunction(inner) = &branches[1] else {
            panic!("expected conjunction as the second branch");
        };
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_parse_parens_override_precedence() {
        // (a OR b) AND c: parens force the alternation inside.
        let Pattern::Conjunction(branches) = parse_ok("(1 OR 2) AND 3") else {
            panic!("expected conjunction at the root");
        };
        assert_eq!(branches.len(), 2);
        assert!(matches!(branches[0], Pattern::Alternation(_)));
    }

    #[test]
    fn test_parse_type_and_range_combination() {
        let Pattern::Conjunction(branches) = parse_ok("Number AND ( range(2, 3) OR range(5, 6) )")
        else {
            panic!("expected conjunction");
        };
        assert!(matches!(branches[0], Pattern::Type(JsonType::Number)));
        let Pattern::Alternation(ranges) = &branches[1] else {
            panic!("expected alternation of ranges");
        };
        assert!(matches!(
            &ranges[0],
            Pattern::Validator { name, args } if name == "range" && args.len() == 2
        ));
    }

    #[test]
    fn test_parse_validator_call() {
        let Pattern::Validator { name, args } = parse_ok("uuid(4)") else {
            panic!("expected validator");
        };
        assert_eq!(name, "uuid");
        assert_eq!(args, vec![Scalar::Num(4.0)]);
    }

    #[test]
    fn test_parse_nested_objects_and_arrays() {
        let pattern = parse_ok(
            r#"{
                "booking": {
                    "bookingdates": {
                        "checkin": String,
                        "checkout": String,
                    },
                    ...
                },
                "rooms": [{"id": Number, ...}, ...]
            }"#,
        );
        let Pattern::Object { entries, open } = pattern else {
            panic!("expected object pattern");
        };
        assert!(!open);
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].pattern, Pattern::Object { open: true, .. }));
        assert!(matches!(entries[1].pattern, Pattern::Array { open: true, .. }));
    }

    #[test]
    fn test_parse_unknown_validator() {
        let err = parse("bogus(1)").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnknownValidator {
                name: "bogus".to_string(),
                offset: 0
            }
        );
    }

    #[test]
    fn test_parse_bare_unknown_word() {
        let err = parse("bogus").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownValidator { .. }));
    }

    #[test]
    fn test_parse_wrong_arity() {
        let err = parse("range(1)").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::WrongArity {
                name: "range".to_string(),
                expected: 2,
                got: 1,
                offset: 0
            }
        );
        assert!(matches!(
            parse("uuid()").unwrap_err(),
            SyntaxError::WrongArity { got: 0, .. }
        ));
    }

    #[test]
    fn test_parse_validator_requires_parens() {
        let err = parse("uuid").unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { expected, .. }
            if expected == "`(` after validator name"));
    }

    #[test]
    fn test_parse_validator_args_must_be_literals() {
        let err = parse("range(Number, 3)").unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { expected, .. }
            if expected == "a literal argument"));
    }

    #[test]
    fn test_parse_duplicate_key() {
        let err = parse(r#"{"a": 1, "a": 2}"#).unwrap_err();
        assert_eq!(
            err,
            SyntaxError::DuplicateKey {
                key: "a".to_string(),
                offset: 9
            }
        );
    }

    #[test]
    fn test_parse_ellipsis_must_be_last() {
        assert!(parse(r#"{..., "a": 1}"#).is_err());
        assert!(parse(r#"[..., 1]"#).is_err());
    }

    #[test]
    fn test_parse_missing_colon() {
        let err = parse(r#"{"a" 1}"#).unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { expected, .. }
            if expected == "`:` after object key"));
    }

    #[test]
    fn test_parse_unexpected_end() {
        assert!(matches!(
            parse(r#"{"a":"#).unwrap_err(),
            SyntaxError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            parse("1 OR").unwrap_err(),
            SyntaxError::UnexpectedEnd { .. }
        ));
        assert!(matches!(parse("").unwrap_err(), SyntaxError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_parse_trailing_garbage() {
        let err = parse("1 2").unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { expected, .. }
            if expected == "end of pattern"));
    }

    #[test]
    fn test_parse_custom_validator_call() {
        let mut registry = Registry::default();
        registry.register("startsWith", 1, |_, _| true);
        let tokens = Lexer::new(r#"startsWith("ab")"#).tokenize().unwrap();
        let pattern = Parser::new(tokens, &registry).parse().unwrap();
        assert!(matches!(
            pattern,
            Pattern::Validator { ref name, ref args }
                if name == "startsWith" && args == &[Scalar::Str("ab".to_string())]
        ));
    }

    #[test]
    fn test_parse_question_outside_key_rejected() {
        assert!(parse(r#"{"a": 1?}"#).is_err());
        assert!(parse("?").is_err());
    }
}
