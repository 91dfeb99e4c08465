//! Pattern DSL lexer.
//!
//! Tokenizes pattern strings like `{"id": Number, "tags": ["a", ...]}` into a
//! flat token stream. Each token carries the byte offset where it started so
//! the parser can report precise positions.

use crate::error::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    LParen,   // (
    RParen,   // )
    Colon,    // :
    Comma,    // ,
    Question, // ? after a quoted object key
    Ellipsis, // ...
    Or,       // OR
    And,      // AND
    Str(String),
    Num(f64),
    True,
    False,
    Null,
    /// Bare word: a type name (`String`, `Number`, `Boolean`) or a validator
    /// name (`uuid`, `range`, caller-registered).
    Ident(String),
}

impl Token {
    /// Short description used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Question => "`?`".to_string(),
            Token::Ellipsis => "`...`".to_string(),
            Token::Or => "`OR`".to_string(),
            Token::And => "`AND`".to_string(),
            Token::Str(s) => format!("string {s:?}"),
            Token::Num(n) => format!("number {n}"),
            Token::True => "`true`".to_string(),
            Token::False => "`false`".to_string(),
            Token::Null => "`null`".to_string(),
            Token::Ident(name) => format!("`{name}`"),
        }
    }
}

/// A token plus the byte offset of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.pos < self.input.len() && pred(self.input[self.pos]) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn is_ident_char(ch: u8) -> bool {
        ch.is_ascii_alphanumeric() || ch == b'_'
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(ch) = self.peek() else { break };

            let token = match ch {
                b'{' => {
                    self.advance();
                    Token::LBrace
                }
                b'}' => {
                    self.advance();
                    Token::RBrace
                }
                b'[' => {
                    self.advance();
                    Token::LBracket
                }
                b']' => {
                    self.advance();
                    Token::RBracket
                }
                b'(' => {
                    self.advance();
                    Token::LParen
                }
                b')' => {
                    self.advance();
                    Token::RParen
                }
                b':' => {
                    self.advance();
                    Token::Colon
                }
                b',' => {
                    self.advance();
                    Token::Comma
                }
                b'?' => {
                    self.advance();
                    Token::Question
                }
                b'.' => {
                    if self.input[self.pos..].starts_with(b"...") {
                        self.pos += 3;
                        Token::Ellipsis
                    } else {
                        return Err(LexError::UnexpectedChar {
                            ch: '.',
                            offset: start,
                        });
                    }
                }
                b'"' => self.read_string(start)?,
                _ if ch.is_ascii_digit() || ch == b'-' => self.read_number(start)?,
                _ if ch.is_ascii_alphabetic() => {
                    let word = self.read_while(Self::is_ident_char);
                    match word.as_str() {
                        "true" => Token::True,
                        "false" => Token::False,
                        "null" => Token::Null,
                        "OR" => Token::Or,
                        "AND" => Token::And,
                        _ => Token::Ident(word),
                    }
                }
                _ => {
                    // Resolve the full char for the error message; the input
                    // is valid UTF-8 so this always finds one.
                    let rest = std::str::from_utf8(&self.input[self.pos..]).unwrap_or("");
                    let ch = rest.chars().next().unwrap_or('\u{fffd}');
                    return Err(LexError::UnexpectedChar { ch, offset: start });
                }
            };

            tokens.push(Spanned {
                token,
                offset: start,
            });
        }

        Ok(tokens)
    }

    /// Read a double-quoted string literal with standard JSON escapes.
    fn read_string(&mut self, start: usize) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut out: Vec<u8> = Vec::new();

        loop {
            let Some(ch) = self.advance() else {
                return Err(LexError::UnterminatedString { offset: start });
            };
            match ch {
                b'"' => return Ok(Token::Str(String::from_utf8_lossy(&out).into_owned())),
                b'\\' => {
                    let esc_offset = self.pos - 1;
                    let Some(esc) = self.advance() else {
                        return Err(LexError::UnterminatedString { offset: start });
                    };
                    let decoded = match esc {
                        b'"' => '"',
                        b'\\' => '\\',
                        b'/' => '/',
                        b'b' => '\u{0008}',
                        b'f' => '\u{000C}',
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        b'u' => self.read_unicode_escape(esc_offset)?,
                        other => {
                            return Err(LexError::InvalidEscape {
                                ch: other as char,
                                offset: esc_offset,
                            });
                        }
                    };
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                }
                // Raw bytes pass through unchanged; multi-byte UTF-8
                // sequences never contain `"` or `\`.
                _ => out.push(ch),
            }
        }
    }

    /// Read the `XXXX` of a `\uXXXX` escape (surrogate pairs supported).
    fn read_unicode_escape(&mut self, esc_offset: usize) -> Result<char, LexError> {
        let code = self.read_hex4(esc_offset)?;

        // High surrogate: expect a following \uXXXX low surrogate.
        if (0xD800..0xDC00).contains(&code) {
            if self.advance() != Some(b'\\') || self.advance() != Some(b'u') {
                return Err(LexError::InvalidEscape {
                    ch: 'u',
                    offset: esc_offset,
                });
            }
            let low = self.read_hex4(esc_offset)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(LexError::InvalidEscape {
                    ch: 'u',
                    offset: esc_offset,
                });
            }
            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).ok_or(LexError::InvalidEscape {
                ch: 'u',
                offset: esc_offset,
            });
        }

        char::from_u32(code).ok_or(LexError::InvalidEscape {
            ch: 'u',
            offset: esc_offset,
        })
    }

    fn read_hex4(&mut self, esc_offset: usize) -> Result<u32, LexError> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let Some(d) = self.advance() else {
                return Err(LexError::InvalidEscape {
                    ch: 'u',
                    offset: esc_offset,
                });
            };
            let digit = (d as char).to_digit(16).ok_or(LexError::InvalidEscape {
                ch: 'u',
                offset: esc_offset,
            })?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Read an integer or decimal literal (optional leading `-`, optional
    /// fraction and exponent).
    fn read_number(&mut self, start: usize) -> Result<Token, LexError> {
        let text = self.read_while(|c| {
            c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' || c == b'e' || c == b'E'
        });
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Num(n)),
            _ => Err(LexError::MalformedNumber {
                text,
                offset: start,
            }),
        }
    }
}
