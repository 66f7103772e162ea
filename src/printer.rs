use crate::ast::Expr;
use std::fmt;

/// Fully parenthesized prefix rendering of an expression, for debugging and
/// golden-output tests. Strings are shown without quotes.
pub fn render(expr: &Expr) -> String {
    expr.to_string()
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Grouping(inner) => write!(f, "(group {})", inner),
            Expr::Unary { op, right, .. } => write!(f, "({} {})", op, right),
            Expr::Binary { .. } => {
                // Chains are written from their spine to keep recursion off the left side
                let (leftmost, spine) = self.binary_spine();
                for (op, _, _) in &spine {
                    write!(f, "({} ", op)?;
                }
                write!(f, "{}", leftmost)?;
                for (_, _, right) in spine.iter().rev() {
                    write!(f, " {})", right)?;
                }
                Ok(())
            }
        }
    }
}
