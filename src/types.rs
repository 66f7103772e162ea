use std::fmt; // For custom display formatting

pub const NIL_TEXT: &str = "ніщо";
pub const TRUE_TEXT: &str = "істина";
pub const FALSE_TEXT: &str = "хиба";

/// A runtime value produced by evaluating an expression.
///
/// The derived `PartialEq` is the language's `==`: values of different
/// variants are never equal, numbers compare with IEEE-754 semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// `ніщо` and `хиба` are falsy, everything else (including `0` and `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

// Printable form handed back to the driver
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "{}", NIL_TEXT),
            Value::Boolean(b) => write!(f, "{}", if *b { TRUE_TEXT } else { FALSE_TEXT }),
            // f64's Display already drops the trailing ".0" of integral values
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}
