use crate::{Error, LexerError, LexerErrorKind, ParseError, ParseErrorKind, RuntimeError, Span};
use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use std::io;
use std::ops::Range;

type SourceSpan<'a> = (&'a str, Range<usize>);

// Spans are byte offsets; an empty span (end of input) still gets one column to point at.
fn label_span(name: &str, span: Span) -> SourceSpan<'_> {
    (name, span.start..span.end.max(span.start + 1))
}

fn report_config() -> Config {
    Config::default().with_index_type(IndexType::Byte)
}

fn emit(report: Report<'_, SourceSpan<'_>>, name: &str, input: &str) -> io::Result<()> {
    report.eprint((name, Source::from(input)))
}

impl LexerError {
    /// Writes a source-annotated report of this error to stderr.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        let span = label_span(name, self.span);
        let label = match self.kind {
            LexerErrorKind::UnexpectedCharacter => format!(
                "'{}' is not part of the language",
                input.get(self.span.to_range()).unwrap_or_default()
            ),
            LexerErrorKind::UnterminatedString => "This string is never closed".to_string(),
        };
        let report = Report::build(ReportKind::Error, span.clone())
            .with_config(report_config())
            .with_message(format!("[line {}] {}", self.line, self.kind))
            .with_label(Label::new(span).with_message(label))
            .finish();
        emit(report, name, input)
    }
}

impl ParseError {
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        let span = label_span(name, self.token.span);
        let label = match self.kind {
            ParseErrorKind::ExpectExpression => "Expected a number, string, literal or '('",
            ParseErrorKind::UnclosedGrouping => "Expected ')' here",
            ParseErrorKind::TrailingInput => "Nothing may follow the expression",
            ParseErrorKind::TooDeep => "Nesting limit reached here",
        };
        let report = Report::build(ReportKind::Error, span.clone())
            .with_config(report_config())
            .with_message(format!(
                "[line {}] Error {}: {}",
                self.line(),
                self.location(),
                self.kind
            ))
            .with_label(Label::new(span).with_message(label))
            .finish();
        emit(report, name, input)
    }
}

impl RuntimeError {
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        let span = label_span(name, self.token.span);
        let report = Report::build(ReportKind::Error, span.clone())
            .with_config(report_config())
            .with_message(format!("[line {}] {}", self.line(), self.kind))
            .with_label(
                Label::new(span)
                    .with_message(format!("Operator '{}' failed here", self.token.lexeme)),
            )
            .finish();
        emit(report, name, input)
    }
}

impl Error {
    /// Reports every diagnostic this error carries. `name` identifies the
    /// source (a file path, or `REPL`).
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        match self {
            Error::Lexical(errors) => errors
                .iter()
                .try_for_each(|error| error.pretty_print(name, input)),
            Error::Syntax(error) => error.pretty_print(name, input),
            Error::Runtime(error) => error.pretty_print(name, input),
        }
    }
}
