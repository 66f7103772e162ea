use std::borrow::Cow;
use std::env;

use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{EditMode, Helper, Highlighter, Hinter, Validator};

use crate::lexer::{KEYWORDS, LexerErrorKind, TokenKind, scan};
use crate::{Span, parse_str, render, run};

const SOURCE_NAME: &str = "REPL";

/// Line-editor settings, read from `MOVA_EDIT_MODE` and `MOVA_HISTORY`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub edit_mode: EditMode,
    pub history_file: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            edit_mode: EditMode::Emacs,
            history_file: "mova_history.txt".to_string(),
        }
    }
}

impl ReplConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("MOVA_EDIT_MODE").ok().as_deref(),
            env::var("MOVA_HISTORY").ok(),
        )
    }

    fn from_vars(edit_mode: Option<&str>, history_file: Option<String>) -> Self {
        let defaults = ReplConfig::default();
        ReplConfig {
            edit_mode: match edit_mode.map(str::trim) {
                Some(mode) if mode.eq_ignore_ascii_case("vi") => EditMode::Vi,
                _ => defaults.edit_mode,
            },
            history_file: history_file
                .filter(|path| !path.is_empty())
                .unwrap_or(defaults.history_file),
        }
    }
}

struct MovaCompleter;

impl rustyline::completion::Completer for MovaCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok((pos, keyword_completions(&line[..pos])))
    }
}

// Suffixes that turn the word under the cursor into a keyword.
fn keyword_completions(before_cursor: &str) -> Vec<String> {
    let scanned = scan(before_cursor);
    let prefix = scanned
        .tokens
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Eof)
        .filter(|t| t.span.end == before_cursor.len())
        .filter(|t| t.kind == TokenKind::Identifier || t.kind.is_keyword())
        .map(|t| t.lexeme.as_str());

    match prefix {
        Some(prefix) => KEYWORDS
            .iter()
            .filter(|word| word.starts_with(prefix) && word.len() > prefix.len())
            .map(|word| word[prefix.len()..].to_string())
            .collect(),
        None => vec![],
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: MovaValidator,
    #[rustyline(Highlighter)]
    highlighter: MovaHighlighter,
    #[rustyline(Completer)]
    completer: MovaCompleter,
}

struct MovaValidator;

impl Validator for MovaValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(check_balance(ctx.input()))
    }
}

// Keeps the editor reading while a string or a '(' is still open.
fn check_balance(input: &str) -> ValidationResult {
    let scanned = scan(input);
    if scanned
        .errors
        .iter()
        .any(|e| e.kind == LexerErrorKind::UnterminatedString)
    {
        return ValidationResult::Incomplete;
    }

    let mut depth: usize = 0;
    for token in &scanned.tokens {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                if depth == 0 {
                    return ValidationResult::Invalid(Some(format!(
                        "  - Unmatched ')' at position {}",
                        token.span.start
                    )));
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth > 0 {
        ValidationResult::Incomplete
    } else {
        ValidationResult::Valid(None)
    }
}

struct MovaHighlighter;

impl Highlighter for MovaHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(colorize(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

// ANSI colours: keywords blue, numbers yellow, strings green, errors red.
fn colorize(line: &str) -> String {
    let scanned = scan(line);
    let mut spans: Vec<(Span, &str)> = scanned
        .tokens
        .iter()
        .filter_map(|token| {
            let color = match token.kind {
                TokenKind::String(_) => "32",
                TokenKind::Number(_) => "33",
                ref kind if kind.is_keyword() => "34",
                _ => return None,
            };
            Some((token.span, color))
        })
        .chain(scanned.errors.iter().map(|error| (error.span, "31")))
        .collect();
    spans.sort_by_key(|(span, _)| span.start);

    let mut highlighted = String::with_capacity(line.len());
    let mut cursor = 0;
    for (span, color) in spans {
        highlighted.push_str(&line[cursor..span.start]);
        highlighted.push_str(&format!("\x1b[{}m{}\x1b[0m", color, &line[span.to_range()]));
        cursor = span.end;
    }
    highlighted.push_str(&line[cursor..]);
    highlighted
}

/// What the REPL does with one complete input.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Tokens(&'a str),
    Ast(&'a str),
    Evaluate(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    if let Some(rest) = input.strip_prefix(":tokens") {
        Command::Tokens(rest.trim_start())
    } else if let Some(rest) = input.strip_prefix(":ast") {
        Command::Ast(rest.trim_start())
    } else {
        Command::Evaluate(input)
    }
}

fn execute(input: &str) {
    match parse_command(input) {
        Command::Tokens(source) => {
            let scanned = scan(source);
            for token in &scanned.tokens {
                println!("{}", token);
            }
            for error in &scanned.errors {
                report(error.pretty_print(SOURCE_NAME, source), error);
            }
        }
        Command::Ast(source) => match parse_str(source) {
            Ok(expr) => println!("{}", render(&expr)),
            Err(error) => report(error.pretty_print(SOURCE_NAME, source), &error),
        },
        Command::Evaluate(source) => match run(source) {
            Ok(value) => println!("{}", value),
            Err(error) => report(error.pretty_print(SOURCE_NAME, source), &error),
        },
    }
}

// Falls back to the plain message when the annotated report cannot be written.
fn report(printed: std::io::Result<()>, error: &dyn std::fmt::Display) {
    if printed.is_err() {
        eprintln!("{}", error);
    }
}

/// Runs the interactive loop until `exit` or end of input. Every line is a
/// separate source unit: an error on one line never affects the next.
pub fn start(config: ReplConfig) -> rustyline::Result<()> {
    println!("Mova REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit. ':tokens <src>' and ':ast <src>' inspect input.");

    let helper = InputHelper {
        highlighter: MovaHighlighter,
        validator: MovaValidator,
        completer: MovaCompleter,
    };
    let editor_config = rustyline::config::Config::builder()
        .edit_mode(config.edit_mode)
        .build();
    let mut rl = Editor::with_config(editor_config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(&config.history_file).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }
                execute(trimmed_input);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(&config.history_file)
}
