//! Rendered expressions with their binding strength.

/// Binding strength of a rendered expression, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Binary operators: `a + b`, `a && b`
    Infix,
    /// Unary operators and casts: `-a`, `(int64_t)(a)`
    Prefix,
    /// Names, literals, calls, member access, indexing
    Postfix,
}

/// A rendered expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub text: String,
    pub prec: Precedence,
}

impl Expr {
    pub fn new(text: impl Into<String>, prec: Precedence) -> Self {
        Self {
            text: text.into(),
            prec,
        }
    }

    /// An expression that binds as tightly as a name.
    pub fn atom(text: impl Into<String>) -> Self {
        Self::new(text, Precedence::Postfix)
    }

    /// Text suitable for a context that needs at least `min` binding strength.
    pub fn at_least(self, min: Precedence) -> String {
        if self.prec < min {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn weaker_expressions_are_parenthesized() {
        let sum = Expr::new("a + b", Precedence::Infix);
        assert_eq!(sum.clone().at_least(Precedence::Infix), "a + b");
        assert_eq!(sum.at_least(Precedence::Prefix), "(a + b)");
        assert_eq!(Expr::atom("x").at_least(Precedence::Postfix), "x");
    }
}
