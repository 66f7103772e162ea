use logos::{Lexer, Logos};
use std::fmt;

use crate::source::Span;
use crate::types::Value;

/// Reserved words, in the order of their token kinds.
pub const KEYWORDS: [&str; 13] = [
    "і",
    "інакше",
    "хиба",
    "для",
    "функція",
    "якщо",
    "ніщо",
    "або",
    "вивести",
    "повернути",
    "істина",
    "змінна",
    "поки",
];

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace, lines are recovered from byte offsets
#[logos(skip r"//[^\n]*")] // Skip line comments
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    // Single-character tokens
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(";")]
    Semicolon,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,

    // One or two character tokens
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,

    // Literals
    #[regex(r"[a-zA-Z_А-яҐґІіЇїЄє][a-zA-Z0-9_А-яҐґІіЇїЄє]*")]
    Identifier,
    // No escape processing: the literal is the raw text between the quotes
    #[regex(r#""[^"]*"?"#, |lex| {
        let slice = lex.slice();
        let len = slice.len();
        // make sure string was terminated
        if len == 1 || !slice.ends_with('"') {
            return Err(LexerErrorKind::UnterminatedString);
        }
        Ok(slice[1..len - 1].to_string())
    })]
    String(String),
    #[regex(r"[0-9]+", number)]
    Number(f64),

    // Keywords
    #[token("і")]
    And,
    #[token("інакше")]
    Else,
    #[token("хиба")]
    False,
    #[token("для")]
    For,
    #[token("функція")]
    Fun,
    #[token("якщо")]
    If,
    #[token("ніщо")]
    Nil,
    #[token("або")]
    Or,
    #[token("вивести")]
    Print,
    #[token("повернути")]
    Return,
    #[token("істина")]
    True,
    #[token("змінна")]
    Var,
    #[token("поки")]
    While,

    // Appended by `scan`, never produced by the logos lexer itself
    Eof,
}

impl TokenKind {
    /// Canonical upper-snake name of the kind, as used in token dumps.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Slash => "SLASH",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String(_) => "STRING",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::And => "AND",
            TokenKind::Else => "ELSE",
            TokenKind::False => "FALSE",
            TokenKind::For => "FOR",
            TokenKind::Fun => "FUN",
            TokenKind::If => "IF",
            TokenKind::Nil => "NIL",
            TokenKind::Or => "OR",
            TokenKind::Print => "PRINT",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::Var => "VAR",
            TokenKind::While => "WHILE",
            TokenKind::Eof => "EOF",
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Else
                | TokenKind::False
                | TokenKind::For
                | TokenKind::Fun
                | TokenKind::If
                | TokenKind::Nil
                | TokenKind::Or
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::True
                | TokenKind::Var
                | TokenKind::While
        )
    }
}

// The fractional dot is only taken when a digit follows it, otherwise it is
// left for the next token.
fn number(lex: &mut Lexer<TokenKind>) -> Option<f64> {
    let rest = lex.remainder();
    if rest.starts_with('.') {
        let fraction = rest[1..].bytes().take_while(u8::is_ascii_digit).count();
        if fraction > 0 {
            lex.bump(1 + fraction);
        }
    }
    lex.slice().parse::<f64>().ok()
}

/// A classified piece of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String, // Exact source text, empty for EOF
    pub span: Span,
    pub line: usize, // 1-based line of the first character
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            span,
            line,
        }
    }

    /// The decoded literal of NUMBER and STRING tokens.
    pub fn literal(&self) -> Option<Value> {
        match &self.kind {
            TokenKind::Number(n) => Some(Value::Number(*n)),
            TokenKind::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }
}

// Implement Display for easy printing
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::Equal => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::String(s) => write!(f, "\"{}\"", s), // Display with quotes for clarity
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Eof => write!(f, "end of input"),
            keyword => {
                let index = keyword_index(keyword).unwrap_or_default();
                write!(f, "{}", KEYWORDS[index])
            }
        }
    }
}

fn keyword_index(kind: &TokenKind) -> Option<usize> {
    let index = match kind {
        TokenKind::And => 0,
        TokenKind::Else => 1,
        TokenKind::False => 2,
        TokenKind::For => 3,
        TokenKind::Fun => 4,
        TokenKind::If => 5,
        TokenKind::Nil => 6,
        TokenKind::Or => 7,
        TokenKind::Print => 8,
        TokenKind::Return => 9,
        TokenKind::True => 10,
        TokenKind::Var => 11,
        TokenKind::While => 12,
        _ => return None,
    };
    Some(index)
}

// Token dump format: `KIND lexeme literal`
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal() {
            Some(literal) => write!(f, "{} {} {}", self.kind.name(), self.lexeme, literal),
            None => write!(f, "{} {} null", self.kind.name(), self.lexeme),
        }
    }
}

#[derive(thiserror::Error, Default, Debug, Clone, PartialEq)]
pub enum LexerErrorKind {
    #[default]
    #[error("Unexpected character.")]
    UnexpectedCharacter,
    #[error("Unterminated string.")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub span: Span,
    pub line: usize, // Line the offending lexeme starts on
}

/// Output of a full scan: every token recognised plus every lexical error met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub tokens: Vec<Token>, // Always ends with exactly one EOF token
    pub errors: Vec<LexerError>,
}

/// Maps byte offsets to 1-based line numbers, walking forward only.
struct LineCounter<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(source: &'a str) -> Self {
        LineCounter {
            source,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.offset {
            self.line += self.source.as_bytes()[self.offset..offset]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.offset = offset;
        }
        self.line
    }
}

/// Scans the whole input. Never fails: lexical errors are collected and the
/// offending text skipped.
pub fn scan(input: &str) -> Scanned {
    let mut lines = LineCounter::new(input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, range) in TokenKind::lexer(input).spanned() {
        let line = lines.line_at(range.start);
        let lexeme = input.get(range.clone()).unwrap_or_default();
        let span = Span::from(range);
        match result {
            Ok(kind) => tokens.push(Token::new(kind, lexeme, span, line)),
            Err(kind) => errors.push(LexerError { kind, span, line }),
        }
    }

    let end = input.len();
    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        Span::new(end, end),
        lines.line_at(end),
    ));
    Scanned { tokens, errors }
}

// Helper function to tokenize a string directly (useful for tests and parser)
pub fn tokenize(input: &str) -> Result<Vec<Token>, Vec<LexerError>> {
    let Scanned { tokens, errors } = scan(input);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to simplify testing token sequences, EOF excluded
    fn assert_tokens(input: &str, expected: Vec<TokenKind>) {
        match tokenize(input) {
            Ok(tokens) => {
                let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
                let (last, rest) = kinds.split_last().expect("EOF is always present");
                assert_eq!(*last, TokenKind::Eof, "Input: '{}'", input);
                assert_eq!(rest, &expected[..], "Input: '{}'", input);
            }
            Err(e) => panic!("Lexing failed for input '{}': {:?}", input, e),
        }
    }

    // Helper to simplify testing for lexer errors
    fn assert_lexer_errors(input: &str, expected: Vec<(LexerErrorKind, usize)>) {
        let scanned = scan(input);
        let found: Vec<(LexerErrorKind, usize)> = scanned
            .errors
            .into_iter()
            .map(|e| (e.kind, e.line))
            .collect();
        assert_eq!(found, expected, "Input: '{}'", input);
    }

    fn identifier() -> TokenKind {
        TokenKind::Identifier
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("").expect("empty input lexes");
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", Span::new(0, 0), 1)]);
    }

    #[test]
    fn test_single_character_punctuation() {
        let cases = [
            ("(", TokenKind::LeftParen),
            (")", TokenKind::RightParen),
            ("{", TokenKind::LeftBrace),
            ("}", TokenKind::RightBrace),
            (",", TokenKind::Comma),
            (".", TokenKind::Dot),
            ("-", TokenKind::Minus),
            ("+", TokenKind::Plus),
            (";", TokenKind::Semicolon),
            ("*", TokenKind::Star),
            ("/", TokenKind::Slash),
        ];
        for (input, kind) in cases {
            let tokens = tokenize(input).expect("punctuation lexes");
            assert_eq!(tokens.len(), 2, "Input: '{}'", input);
            assert_eq!(tokens[0].kind, kind);
            assert_eq!(tokens[0].lexeme, input);
            assert_eq!(tokens[0].line, 1);
        }
    }

    #[test]
    fn test_one_or_two_character_operators() {
        assert_tokens("!=", vec![TokenKind::BangEqual]);
        assert_tokens("==", vec![TokenKind::EqualEqual]);
        assert_tokens("<=", vec![TokenKind::LessEqual]);
        assert_tokens(">=", vec![TokenKind::GreaterEqual]);
        assert_tokens("!", vec![TokenKind::Bang]);
        assert_tokens("=", vec![TokenKind::Equal]);
        assert_tokens("<", vec![TokenKind::Less]);
        assert_tokens(">", vec![TokenKind::Greater]);
        assert_tokens("! =", vec![TokenKind::Bang, TokenKind::Equal]);
        assert_tokens("===", vec![TokenKind::EqualEqual, TokenKind::Equal]);
        assert_tokens("!!=", vec![TokenKind::Bang, TokenKind::BangEqual]);
    }

    #[test]
    fn test_numbers() {
        assert_tokens("123", vec![TokenKind::Number(123.0)]);
        assert_tokens("6.78", vec![TokenKind::Number(6.78)]);
        assert_tokens("0", vec![TokenKind::Number(0.0)]);
        // A sign is a separate operator
        assert_tokens("-45", vec![TokenKind::Minus, TokenKind::Number(45.0)]);
    }

    #[test]
    fn test_number_dot_needs_trailing_digit() {
        assert_tokens("1.", vec![TokenKind::Number(1.0), TokenKind::Dot]);
        assert_tokens(".5", vec![TokenKind::Dot, TokenKind::Number(5.0)]);
        assert_tokens(
            "1.2.3",
            vec![TokenKind::Number(1.2), TokenKind::Dot, TokenKind::Number(3.0)],
        );
        assert_tokens(
            "12.abc",
            vec![TokenKind::Number(12.0), TokenKind::Dot, identifier()],
        );
    }

    #[test]
    fn test_number_literal_value() {
        let tokens = tokenize("3.25").expect("number lexes");
        assert_eq!(tokens[0].literal(), Some(Value::Number(3.25)));
        assert_eq!(tokens[0].lexeme, "3.25");
    }

    #[test]
    fn test_strings() {
        assert_tokens(r#""hello""#, vec![TokenKind::String("hello".to_string())]);
        assert_tokens(r#""""#, vec![TokenKind::String(String::new())]);
        assert_tokens(
            r#""привіт, світе""#,
            vec![TokenKind::String("привіт, світе".to_string())],
        );
        // No escape processing
        assert_tokens(r#""a\n""#, vec![TokenKind::String("a\\n".to_string())]);
    }

    #[test]
    fn test_string_lexeme_keeps_quotes() {
        let tokens = tokenize(r#""abc""#).expect("string lexes");
        assert_eq!(tokens[0].lexeme, "\"abc\"");
        assert_eq!(tokens[0].literal(), Some(Value::from("abc")));
    }

    #[test]
    fn test_multiline_string_lines() {
        let tokens = tokenize("\"a\nb\" 1").expect("string lexes");
        assert_eq!(tokens[0].kind, TokenKind::String("a\nb".to_string()));
        assert_eq!(tokens[0].line, 1); // Line the literal starts on
        assert_eq!(tokens[1].kind, TokenKind::Number(1.0));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_unterminated_string() {
        assert_lexer_errors(r#""abc"#, vec![(LexerErrorKind::UnterminatedString, 1)]);
        assert_lexer_errors(r#"""#, vec![(LexerErrorKind::UnterminatedString, 1)]);
        assert_lexer_errors(
            "1\n\"abc\ndef",
            vec![(LexerErrorKind::UnterminatedString, 2)],
        );
        let scanned = scan(r#"1 "abc"#);
        let kinds: Vec<&TokenKind> = scanned.tokens.iter().map(|t| &t.kind).collect();
        assert_eq!(kinds, vec![&TokenKind::Number(1.0), &TokenKind::Eof]);
    }

    #[test]
    fn test_keywords() {
        assert_tokens(
            "і інакше хиба для функція якщо ніщо або вивести повернути істина змінна поки",
            vec![
                TokenKind::And,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
            ],
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_tokens("істинах", vec![identifier()]);
        assert_tokens("із", vec![identifier()]);
        assert_tokens("ніщо1", vec![identifier()]);
        assert_tokens("Істина", vec![identifier()]); // Case-sensitive
        assert_tokens("якщо_", vec![identifier()]);
    }

    #[test]
    fn test_identifiers() {
        assert_tokens("foo", vec![identifier()]);
        assert_tokens("_x1", vec![identifier()]);
        assert_tokens("змінна_2", vec![identifier()]);
        assert_tokens("Ґанок їжак", vec![identifier(), identifier()]);
        let tokens = tokenize("лічильник").expect("identifier lexes");
        assert_eq!(tokens[0].lexeme, "лічильник");
        assert_eq!(tokens[0].literal(), None);
    }

    #[test]
    fn test_comments() {
        assert_tokens("// only comment", vec![]);
        assert_tokens("1 // then comment", vec![TokenKind::Number(1.0)]);
        assert_tokens("1 / 2", vec![
            TokenKind::Number(1.0),
            TokenKind::Slash,
            TokenKind::Number(2.0),
        ]);
    }

    #[test]
    fn test_comment_line_numbers() {
        let tokens = tokenize("// comment\n1\n// another\n\n2").expect("lexes");
        let lines: Vec<(TokenKind, usize)> =
            tokens.into_iter().map(|t| (t.kind, t.line)).collect();
        assert_eq!(
            lines,
            vec![
                (TokenKind::Number(1.0), 2),
                (TokenKind::Number(2.0), 5),
                (TokenKind::Eof, 5),
            ]
        );
    }

    #[test]
    fn test_unexpected_character_is_skipped() {
        let scanned = scan("1 @ 2\n#");
        let kinds: Vec<TokenKind> = scanned.tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
        );
        assert_eq!(
            scanned.errors,
            vec![
                LexerError {
                    kind: LexerErrorKind::UnexpectedCharacter,
                    span: Span::new(2, 3),
                    line: 1,
                },
                LexerError {
                    kind: LexerErrorKind::UnexpectedCharacter,
                    span: Span::new(6, 7),
                    line: 2,
                },
            ]
        );
    }

    #[test]
    fn test_tokenize_fails_on_any_error() {
        let errors = tokenize("1 + $").expect_err("'$' is not part of the language");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character.");
    }

    #[test]
    fn test_lines_are_monotonic() {
        let tokens = tokenize("(1\n+\r\n2)\n\n* 3").expect("lexes");
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 1, 2, 3, 3, 5, 5, 5]);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("(+ 1)").expect("Should tokenize successfully");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].span, Span { start: 0, end: 1 });
        assert_eq!(tokens[1].span, Span { start: 1, end: 2 });
        assert_eq!(tokens[2].span, Span { start: 3, end: 4 });
        assert_eq!(tokens[3].span, Span { start: 4, end: 5 });
        assert_eq!(tokens[4].span, Span { start: 5, end: 5 });
    }

    #[test]
    fn test_token_dump() {
        let tokens = tokenize("змінна x = 2.5 + \"a\"").expect("lexes");
        let dump: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            dump,
            vec![
                "VAR змінна null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 2.5 2.5",
                "PLUS + null",
                "STRING \"a\" a",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_keyword_display_matches_table() {
        assert_eq!(TokenKind::And.to_string(), "і");
        assert_eq!(TokenKind::While.to_string(), "поки");
        assert!(TokenKind::Nil.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        for word in KEYWORDS {
            let tokens = tokenize(word).expect("keyword lexes");
            assert!(tokens[0].kind.is_keyword(), "Keyword: '{}'", word);
            assert_eq!(tokens[0].kind.to_string(), word);
        }
    }
}
