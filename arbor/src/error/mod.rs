//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure between reading a wire document and finishing its evaluation
#[derive(Debug, Error)]
pub enum Error {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Reader error at {span}: {message}")]
    Reader { message: String, span: Span },

    /// Decode and evaluation errors, including `MalformedNode`
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Config error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn reader(message: impl Into<String>, span: Span) -> Self {
        Self::Reader {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } => Some(*span),
            Self::Reader { span, .. } => Some(*span),
            Self::Runtime(err) => err.span,
            Self::Io { .. } | Self::Config { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } => message,
            Self::Reader { message, .. } => message,
            Self::Runtime(err) => &err.message,
            Self::Io { message } => message,
            Self::Config { message } => message,
        }
    }

    /// Short category label used as the report headline
    pub fn category(&self) -> String {
        match self {
            Self::Lexer { .. } => "Lexer".to_string(),
            Self::Reader { .. } => "Reader".to_string(),
            Self::Runtime(err) => format!("{:?}", err.kind),
            Self::Io { .. } => "IO".to_string(),
            Self::Config { .. } => "Config".to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &Error) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = error.category();

    if let Some(span) = error.span() {
        let range: std::ops::Range<usize> = span.into();
        Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, range))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
    } else {
        // Errors without span (IO, Config, evaluation errors with no node)
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    #[test]
    fn test_lexer_error_span() {
        let err = Error::lexer("unexpected input", Span::new(3, 4));
        assert_eq!(err.span(), Some(Span::new(3, 4)));
        assert_eq!(err.message(), "unexpected input");
        assert_eq!(err.to_string(), "Lexer error at 3..4: unexpected input");
    }

    #[test]
    fn test_runtime_error_is_transparent() {
        let err: Error = RuntimeError::unbound_name("fib").into();
        assert_eq!(err.to_string(), "Runtime error: unbound name: fib");
        assert_eq!(err.category(), "UnboundName");
        assert_eq!(err.span(), None);
    }

    #[test]
    fn test_malformed_node_keeps_span() {
        let err: Error = RuntimeError::malformed_node("missing field `alt`")
            .with_span(Span::new(10, 20))
            .into();
        assert_eq!(err.span(), Some(Span::new(10, 20)));
        assert!(matches!(err, Error::Runtime(ref e) if e.kind == ErrorKind::MalformedNode));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.span(), None);
        assert!(err.message().contains("no such file"));
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config_error("max_depth must be positive");
        assert_eq!(err.to_string(), "Config error: max_depth must be positive");
    }
}
