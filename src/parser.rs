use crate::Error;
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::{Token, TokenKind};
use crate::source::Span;
use crate::types::Value;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter; // To iterate over Vec<Token>

/// Deepest nesting of unary operators and groupings along one path of the
/// tree. Every level costs about a dozen parser frames, so this is sized to
/// stay well inside a 2 MiB thread stack in unoptimised builds. Flat operator
/// chains are folded in loops and do not count.
pub const MAX_DEPTH: usize = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Expect expression.")]
    ExpectExpression,
    #[error("Expect ')' after expression.")]
    UnclosedGrouping,
    #[error("Expect end of expression.")]
    TrailingInput,
    #[error("Too much nesting.")]
    TooDeep,
}

/// A syntax error, anchored at the token where parsing gave up.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub token: Token,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: Token) -> Self {
        ParseError { kind, token }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }

    /// `at end` for the end-of-input marker, `at '<lexeme>'` otherwise.
    pub fn location(&self) -> String {
        location(&self.token)
    }
}

fn location(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "at end".to_string(),
        _ => format!("at '{}'", token.lexeme),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error {}: {}",
            self.token.line,
            self.location(),
            self.kind
        )
    }
}

// Allow ParseError to be treated as a standard Error
impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: Peekable<IntoIter<Token>>,
    // Handed out once the stream is exhausted
    eof: Token,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let eof = match tokens.last() {
            Some(last) if last.kind == TokenKind::Eof => last.clone(),
            last => {
                let (end, line) = last.map_or((0, 1), |t| (t.span.end, t.line));
                let eof = Token::new(TokenKind::Eof, "", Span::new(end, end), line);
                tokens.push(eof.clone());
                eof
            }
        };
        Parser {
            tokens: tokens.into_iter().peekable(),
            eof,
            depth: 0,
        }
    }

    /// Parses exactly one expression; anything but the end of input after it is an error.
    pub fn parse(mut self) -> ParseResult<Expr> {
        let expr = self.expression()?;

        let found = self.next_token();
        if found.kind == TokenKind::Eof {
            Ok(expr)
        } else {
            Err(ParseError::new(ParseErrorKind::TrailingInput, found))
        }
    }

    // Consumes the next token; past the end this keeps returning EOF.
    fn next_token(&mut self) -> Token {
        self.tokens.next().unwrap_or_else(|| self.eof.clone())
    }

    // Peeks at the next token without consuming.
    fn peek_token(&mut self) -> &Token {
        self.tokens.peek().unwrap_or(&self.eof)
    }

    // Consumes the next token only if its kind is one of `kinds`.
    fn next_if_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        self.tokens.next_if(|token| kinds.contains(&token.kind))
    }

    // Consumes the next token if `classify` maps it to an operator.
    fn next_operator<Op>(
        &mut self,
        classify: fn(&TokenKind) -> Option<Op>,
    ) -> Option<(Op, Token)> {
        let op = classify(&self.peek_token().kind)?;
        Some((op, self.next_token()))
    }

    fn expect(&mut self, kind: TokenKind, error: ParseErrorKind) -> ParseResult<Token> {
        match self.next_if_any(&[kind]) {
            Some(token) => Ok(token),
            None => Err(ParseError::new(error, self.peek_token().clone())),
        }
    }

    fn enter(&mut self, token: &Token) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(ParseErrorKind::TooDeep, token.clone()));
        }
        Ok(())
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_associative(equality_operator, Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_associative(comparison_operator, Self::term)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_associative(term_operator, Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_associative(factor_operator, Self::unary)
    }

    /// Parses `operand ( operator operand )*`, folding to the left.
    fn left_associative(
        &mut self,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while let Some((op, token)) = self.next_operator(operator) {
            let right = operand(self)?;
            expr = Expr::binary(expr, op, token, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        match self.next_operator(UnaryOp::from_token_kind) {
            Some((op, token)) => {
                self.enter(&token)?;
                let right = self.unary()?;
                self.depth -= 1;
                Ok(Expr::unary(op, token, right))
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.next_token();
        match &token.kind {
            TokenKind::False => Ok(Expr::literal(false)),
            TokenKind::True => Ok(Expr::literal(true)),
            TokenKind::Nil => Ok(Expr::Literal(Value::Nil)),
            TokenKind::Number(n) => Ok(Expr::literal(*n)),
            TokenKind::String(s) => Ok(Expr::literal(s.as_str())),
            TokenKind::LeftParen => {
                self.enter(&token)?;
                let inner = self.expression()?;
                self.expect(TokenKind::RightParen, ParseErrorKind::UnclosedGrouping)?;
                self.depth -= 1;
                Ok(Expr::grouping(inner))
            }
            _ => Err(ParseError::new(ParseErrorKind::ExpectExpression, token)),
        }
    }
}

fn equality_operator(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::BangEqual | TokenKind::EqualEqual => BinaryOp::from_token_kind(kind),
        _ => None,
    }
}

fn comparison_operator(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
            BinaryOp::from_token_kind(kind)
        }
        _ => None,
    }
}

fn term_operator(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Minus | TokenKind::Plus => BinaryOp::from_token_kind(kind),
        _ => None,
    }
}

fn factor_operator(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Slash | TokenKind::Star => BinaryOp::from_token_kind(kind),
        _ => None,
    }
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> Result<Expr, Error> {
    let tokens = crate::lexer::tokenize(input)?;
    Ok(Parser::new(tokens).parse()?)
}
