//! Token definitions for wire documents

use logos::Logos;
use std::fmt;
use std::str::Chars;
use thiserror::Error;

/// Why a slice of input could not become a token
#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexError {
    #[default]
    #[error("unexpected input")]
    UnexpectedInput,
    #[error("integer literal out of range")]
    IntegerOutOfRange,
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
}

fn int_literal(slice: &str) -> Result<i64, LexError> {
    slice.parse().map_err(|_| LexError::IntegerOutOfRange)
}

/// Strip the quotes and decode escapes, JSON ones included
fn unescape(quoted: &str) -> Result<String, LexError> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let decoded = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            Some(c @ ('\\' | '"' | '\'' | '/')) => c,
            Some('u') => unicode_escape(&mut chars)?,
            Some(other) => return Err(LexError::InvalidEscape(format!("\\{other}"))),
            None => return Err(LexError::InvalidEscape("\\".to_string())),
        };
        result.push(decoded);
    }
    Ok(result)
}

fn hex4(chars: &mut Chars<'_>) -> Result<u32, LexError> {
    let mut code = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| LexError::InvalidEscape("\\u needs four hex digits".to_string()))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

/// `\uXXXX`, with UTF-16 surrogate pairs joined
fn unicode_escape(chars: &mut Chars<'_>) -> Result<char, LexError> {
    let high = hex4(chars)?;
    let code = if (0xD800..0xDC00).contains(&high) {
        if chars.next() != Some('\\') || chars.next() != Some('u') {
            return Err(LexError::InvalidEscape(format!("unpaired surrogate \\u{high:04x}")));
        }
        let low = hex4(chars)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(LexError::InvalidEscape(format!("unpaired surrogate \\u{high:04x}")));
        }
        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
    } else {
        high
    };
    char::from_u32(code)
        .ok_or_else(|| LexError::InvalidEscape(format!("unpaired surrogate \\u{code:04x}")))
}

/// Wire document token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[regex(r"-?[0-9]+", |lex| int_literal(lex.slice()))]
    IntLit(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    StringLit(String),

    /// Unquoted word: an object key or a bare value such as `exprstmt`
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => write!(f, "{s:?}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
        }
    }
}
