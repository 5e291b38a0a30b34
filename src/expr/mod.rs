//! Restricted boolean condition language used by the `filter` operation.
//!
//! A condition such as `revenue > 25 and not (region == 'north')` is tokenized, parsed into an
//! [`Expr`] tree, then resolved against a [`Schema`] into a [`Predicate`]. All validation
//! (syntax, unknown columns, non-boolean operands) happens in [`compile`], so evaluating the
//! predicate against rows cannot fail.
//!
//! ```rust
//! use tabular_analyze::expr::compile;
//! use tabular_analyze::types::{DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![Field::new("revenue", DataType::Int64)]);
//! let predicate = compile("revenue >= 30", &schema).unwrap();
//! assert!(predicate.matches(&[Value::Int64(40)]));
//! assert!(!predicate.matches(&[Value::Null]));
//! ```
//!
//! Supported:
//! - comparisons: `==`, `!=`, `<`, `<=`, `>`, `>=` (non-chaining)
//! - logical keywords: `and`, `or`, `not`
//! - literals: integers, floats, quoted strings, `true`/`false`
//! - column references, with backticks for names containing spaces

mod eval;
mod lexer;
mod parser;

use thiserror::Error;

use crate::types::Schema;

pub use eval::Predicate;
pub use parser::parse_expr;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// A literal written in a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Parsed condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a column by name.
    Column { name: String },
    /// Literal value.
    Literal { value: Literal },
    /// Binary comparison.
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    And { left: Box<Expr>, right: Box<Expr> },
    Or { left: Box<Expr>, right: Box<Expr> },
    Not { expr: Box<Expr> },
}

/// Errors from parsing or resolving a condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Parse(String),

    #[error("unknown column '{name}'. Available: [{}]", .available.join(", "))]
    UnknownColumn { name: String, available: Vec<String> },

    /// A non-boolean operand was used where a truth value is required.
    #[error("'{operand}' is not a boolean expression; compare it with an operator such as '=='")]
    NotBoolean { operand: String },

    /// A comparison operand is itself a boolean expression.
    #[error("comparison operands must be a column or a literal, found {found}")]
    InvalidOperand { found: String },
}

/// Parse `condition` and resolve it against `schema`.
pub fn compile(condition: &str, schema: &Schema) -> Result<Predicate, ExprError> {
    let expr = parse_expr(condition)?;
    Predicate::resolve(&expr, schema)
}
