use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::Token;
use crate::types::Value;
use std::fmt;

// --- Evaluation Error ---
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
}

/// A type error raised while evaluating, carrying the operator that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub token: Token,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, token: &Token) -> Self {
        RuntimeError {
            kind,
            token: token.clone(),
        }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n[line {}]", self.kind, self.token.line)
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// Result type alias for convenience
pub type EvalResult<T = Value> = Result<T, RuntimeError>;

// --- Evaluate Function ---

/// Evaluates an expression tree to a value. The first runtime error aborts
/// the whole evaluation.
pub fn evaluate(expr: &Expr) -> EvalResult {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Grouping(inner) => evaluate(inner),
        Expr::Unary {
            op,
            operator,
            right,
        } => {
            let right = evaluate(right)?;
            evaluate_unary(*op, operator, right)
        }
        Expr::Binary { .. } => evaluate_chain(expr),
    }
}

// A left-nested chain such as `1 + 2 + 3` is folded in a loop, so its
// length costs no stack.
fn evaluate_chain(expr: &Expr) -> EvalResult {
    let (leftmost, spine) = expr.binary_spine();
    // Left operand is always evaluated first
    let mut value = evaluate(leftmost)?;
    for (op, operator, right) in spine.into_iter().rev() {
        let right = evaluate(right)?;
        value = evaluate_binary(op, operator, value, right)?;
    }
    Ok(value)
}

fn evaluate_unary(op: UnaryOp, operator: &Token, right: Value) -> EvalResult {
    match op {
        UnaryOp::Negate => match right {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::OperandMustBeNumber,
                operator,
            )),
        },
        UnaryOp::Not => Ok(Value::Boolean(!right.is_truthy())),
    }
}

fn evaluate_binary(op: BinaryOp, operator: &Token, left: Value, right: Value) -> EvalResult {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::OperandsMustBeNumbersOrStrings,
                operator,
            )),
        },
        // Division by zero follows IEEE-754 and yields an infinity or NaN
        BinaryOp::Subtract => arithmetic(operator, left, right, |l, r| l - r),
        BinaryOp::Multiply => arithmetic(operator, left, right, |l, r| l * r),
        BinaryOp::Divide => arithmetic(operator, left, right, |l, r| l / r),
        BinaryOp::Greater => ordering(operator, left, right, |l, r| l > r),
        BinaryOp::GreaterEqual => ordering(operator, left, right, |l, r| l >= r),
        BinaryOp::Less => ordering(operator, left, right, |l, r| l < r),
        BinaryOp::LessEqual => ordering(operator, left, right, |l, r| l <= r),
        BinaryOp::Equal => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEqual => Ok(Value::Boolean(left != right)),
    }
}

fn number_operands(operator: &Token, left: Value, right: Value) -> EvalResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(RuntimeError::new(
            RuntimeErrorKind::OperandsMustBeNumbers,
            operator,
        )),
    }
}

fn arithmetic<F: Fn(f64, f64) -> f64>(
    operator: &Token,
    left: Value,
    right: Value,
    func: F,
) -> EvalResult {
    let (l, r) = number_operands(operator, left, right)?;
    Ok(Value::Number(func(l, r)))
}

fn ordering<F: Fn(f64, f64) -> bool>(
    operator: &Token,
    left: Value,
    right: Value,
    compare: F,
) -> EvalResult {
    let (l, r) = number_operands(operator, left, right)?;
    Ok(Value::Boolean(compare(l, r)))
}
