// Declare modules publicly so they are part of the library interface
pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod printer;
pub mod repl;
pub mod source;
pub mod types;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::{RuntimeError, RuntimeErrorKind, evaluate};
pub use lexer::{LexerError, LexerErrorKind, Scanned, Token, TokenKind, scan, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser, parse_str};
pub use printer::render;
pub use source::Span;
pub use types::Value;

/// Exit status for a source unit that failed to lex or parse.
pub const EXIT_SYNTAX: u8 = 65;
/// Exit status for a source unit that failed while evaluating.
pub const EXIT_RUNTIME: u8 = 70;

/// Which stage a failure belongs to, as seen by a driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax, // Lexical errors included
    Runtime,
}

/// Any failure of the scan → parse → evaluate pipeline for one source unit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{}", join_lines(.0))]
    Lexical(Vec<LexerError>),
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn join_lines(errors: &[LexerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<Vec<LexerError>> for Error {
    fn from(errors: Vec<LexerError>) -> Self {
        Error::Lexical(errors)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lexical(_) | Error::Syntax(_) => ErrorKind::Syntax,
            Error::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// Source line of the (first) offending token.
    pub fn line(&self) -> usize {
        match self {
            Error::Lexical(errors) => errors.first().map_or(1, |e| e.line),
            Error::Syntax(e) => e.line(),
            Error::Runtime(e) => e.line(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Syntax => EXIT_SYNTAX,
            ErrorKind::Runtime => EXIT_RUNTIME,
        }
    }
}

/// Runs one source unit through the whole pipeline. The value's `Display`
/// is its printable form.
pub fn run(source: &str) -> Result<Value, Error> {
    let expr = parse_str(source)?;
    Ok(evaluate(&expr)?)
}
