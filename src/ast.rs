use crate::lexer::{Token, TokenKind};
use crate::types::Value;
use std::fmt;
use std::mem;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
}

impl BinaryOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Subtract),
            TokenKind::Star => Some(BinaryOp::Multiply),
            TokenKind::Slash => Some(BinaryOp::Divide),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEqual => Some(BinaryOp::LessEqual),
            TokenKind::EqualEqual => Some(BinaryOp::Equal),
            TokenKind::BangEqual => Some(BinaryOp::NotEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An expression tree. Every node owns its children.
///
/// Operator nodes keep the source token next to the closed operator so
/// runtime errors can point at the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Grouping(Box<Expr>),
    Unary {
        op: UnaryOp,
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        operator: Token,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn grouping(inner: Expr) -> Self {
        Expr::Grouping(Box::new(inner))
    }

    pub fn unary(op: UnaryOp, operator: Token, right: Expr) -> Self {
        Expr::Unary {
            op,
            operator,
            right: Box::new(right),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, operator: Token, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            operator,
            right: Box::new(right),
        }
    }

    /// Splits a left-nested chain of binary nodes into its leftmost operand
    /// and the `(op, operator, right)` steps from the outermost node inwards.
    pub fn binary_spine(&self) -> (&Expr, Vec<(BinaryOp, &Token, &Expr)>) {
        let mut spine = Vec::new();
        let mut leftmost = self;
        while let Expr::Binary {
            left,
            op,
            operator,
            right,
        } = leftmost
        {
            spine.push((*op, operator, right.as_ref()));
            leftmost = left.as_ref();
        }
        (leftmost, spine)
    }

    // Moves the children out, leaving cheap literals behind.
    fn take_children(&mut self, into: &mut Vec<Expr>) {
        let placeholder = || Expr::Literal(Value::Nil);
        match self {
            Expr::Literal(_) => {}
            Expr::Grouping(inner) | Expr::Unary { right: inner, .. } => {
                into.push(mem::replace(inner.as_mut(), placeholder()));
            }
            Expr::Binary { left, right, .. } => {
                into.push(mem::replace(left.as_mut(), placeholder()));
                into.push(mem::replace(right.as_mut(), placeholder()));
            }
        }
    }
}

// Long operator chains nest arbitrarily deep on their left spine, so the
// tree is torn down with an explicit stack instead of recursive drops.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut child) = pending.pop() {
            child.take_children(&mut pending);
        }
    }
}
