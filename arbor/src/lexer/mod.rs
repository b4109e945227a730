//! Lexer implementation using logos

mod token;

pub use token::{LexError, Token};

use crate::ast::Span;
use crate::error::{Error, Result};
use logos::Logos;

/// Tokenize a wire document
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(e) => {
                return Err(Error::lexer(format!("{e}: {}", lexer.slice()), span));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty() {
        let tokens = tokenize("").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenize_integer_literal() {
        let tokens = tokenize("42").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0].0, Token::IntLit(n) if *n == 42));
    }

    #[test]
    fn test_tokenize_string_literals() {
        let tokens = tokenize(r#""fibrec" 'fib'"#).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::StringLit("fibrec".to_string()),
                Token::StringLit("fib".to_string())
            ]
        );
    }

    #[test]
    fn test_tokenize_punctuation() {
        let tokens = tokenize("{ } [ ] : , ;").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::Colon,
                Token::Comma,
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_tokenize_bare_words() {
        let tokens = tokenize("type: exprstmt").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[0].0, Token::Ident(s) if s == "type"));
        assert!(matches!(&tokens[2].0, Token::Ident(s) if s == "exprstmt"));
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("{ op: cond }").unwrap();
        assert_eq!(tokens[1].1, Span::new(2, 4));
        assert_eq!(tokens[3].1, Span::new(6, 10));
    }

    #[test]
    fn test_tokenize_skips_comments() {
        let tokens = tokenize("[ // statements\n]").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].0, Token::LBracket);
        assert_eq!(tokens[1].0, Token::RBracket);
    }

    #[test]
    fn test_tokenize_operator_string() {
        let tokens = tokenize(r#"op: "<=""#).unwrap();
        assert!(matches!(&tokens[2].0, Token::StringLit(s) if s == "<="));
    }

    #[test]
    fn test_tokenize_error() {
        let result = tokenize("{ op: + }");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.span(), Some(Span::new(6, 7)));
        assert_eq!(err.message(), "unexpected input: +");
    }

    #[test]
    fn test_tokenize_integer_out_of_range() {
        let err = tokenize("[1, 9223372036854775808]").unwrap_err();
        assert_eq!(err.span(), Some(Span::new(4, 23)));
        assert_eq!(err.message(), "integer literal out of range: 9223372036854775808");
    }

    #[test]
    fn test_tokenize_invalid_escape() {
        let err = tokenize(r#"{ string: "\x41" }"#).unwrap_err();
        assert_eq!(err.span(), Some(Span::new(10, 16)));
        assert!(err.message().starts_with("invalid escape sequence: \\x"));
    }
}
