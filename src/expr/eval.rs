//! Resolution of [`Expr`] trees into row predicates, and their evaluation.

use std::cmp::Ordering;

use crate::ingestion::infer::parse_datetime;
use crate::types::{DataSet, DataType, Schema, Value};

use super::{CompareOp, Expr, ExprError, Literal};

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Column(usize),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    /// A Bool column used directly as a condition.
    Truthy(usize),
    Const(bool),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

/// A condition bound to column positions of one [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    root: Node,
}

impl Predicate {
    /// Bind `expr` to `schema`, rejecting unknown columns and non-boolean conditions.
    pub fn resolve(expr: &Expr, schema: &Schema) -> Result<Self, ExprError> {
        Ok(Self {
            root: resolve_node(expr, schema)?,
        })
    }

    /// Evaluate against one row laid out in schema order.
    pub fn matches(&self, row: &[Value]) -> bool {
        eval_node(&self.root, row)
    }

    /// One flag per row of `dataset`, in row order.
    pub fn mask(&self, dataset: &DataSet) -> Vec<bool> {
        dataset.rows.iter().map(|row| self.matches(row)).collect()
    }
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Column { name } => format!("column '{name}'"),
        Expr::Literal { value } => format!("literal {value:?}"),
        Expr::Compare { op, .. } => format!("a '{}' comparison", op.symbol()),
        Expr::And { .. } => "an 'and' expression".into(),
        Expr::Or { .. } => "an 'or' expression".into(),
        Expr::Not { .. } => "a 'not' expression".into(),
    }
}

fn lookup_column(name: &str, schema: &Schema) -> Result<usize, ExprError> {
    schema.index_of(name).ok_or_else(|| ExprError::UnknownColumn {
        name: name.to_string(),
        available: schema.column_names(),
    })
}

fn resolve_node(expr: &Expr, schema: &Schema) -> Result<Node, ExprError> {
    match expr {
        Expr::And { left, right } => Ok(Node::And(
            Box::new(resolve_node(left, schema)?),
            Box::new(resolve_node(right, schema)?),
        )),
        Expr::Or { left, right } => Ok(Node::Or(
            Box::new(resolve_node(left, schema)?),
            Box::new(resolve_node(right, schema)?),
        )),
        Expr::Not { expr } => Ok(Node::Not(Box::new(resolve_node(expr, schema)?))),
        Expr::Compare { left, op, right } => {
            let left_type = operand_type(left, schema)?;
            let right_type = operand_type(right, schema)?;
            Ok(Node::Compare {
                left: resolve_operand(left, schema, right_type)?,
                op: *op,
                right: resolve_operand(right, schema, left_type)?,
            })
        }
        Expr::Column { name } => {
            let idx = lookup_column(name, schema)?;
            if schema.fields[idx].data_type == DataType::Bool {
                Ok(Node::Truthy(idx))
            } else {
                Err(ExprError::NotBoolean {
                    operand: name.clone(),
                })
            }
        }
        Expr::Literal {
            value: Literal::Bool(b),
        } => Ok(Node::Const(*b)),
        Expr::Literal { value } => Err(ExprError::NotBoolean {
            operand: format!("{value:?}"),
        }),
    }
}

/// Column type of an operand, if it is a column reference.
fn operand_type(expr: &Expr, schema: &Schema) -> Result<Option<DataType>, ExprError> {
    match expr {
        Expr::Column { name } => {
            let idx = lookup_column(name, schema)?;
            Ok(Some(schema.fields[idx].data_type))
        }
        Expr::Literal { .. } => Ok(None),
        other => Err(ExprError::InvalidOperand {
            found: describe(other),
        }),
    }
}

/// `other_side` is the type of the column on the opposite side of the comparison, used to read
/// string literals as date-times when compared with a DateTime column.
fn resolve_operand(
    expr: &Expr,
    schema: &Schema,
    other_side: Option<DataType>,
) -> Result<Operand, ExprError> {
    match expr {
        Expr::Column { name } => Ok(Operand::Column(lookup_column(name, schema)?)),
        Expr::Literal { value } => Ok(Operand::Literal(match value {
            Literal::Int(v) => Value::Int64(*v),
            Literal::Float(v) => Value::Float64(*v),
            Literal::Bool(v) => Value::Bool(*v),
            Literal::Str(s) if other_side == Some(DataType::DateTime) => parse_datetime(s)
                .map(Value::DateTime)
                .unwrap_or_else(|| Value::Utf8(s.clone())),
            Literal::Str(s) => Value::Utf8(s.clone()),
        })),
        other => Err(ExprError::InvalidOperand {
            found: describe(other),
        }),
    }
}

fn eval_node(node: &Node, row: &[Value]) -> bool {
    match node {
        Node::Compare { left, op, right } => {
            compare_values(operand_value(left, row), *op, operand_value(right, row))
        }
        Node::Truthy(idx) => matches!(row.get(*idx), Some(Value::Bool(true))),
        Node::Const(b) => *b,
        Node::And(l, r) => eval_node(l, row) && eval_node(r, row),
        Node::Or(l, r) => eval_node(l, row) || eval_node(r, row),
        Node::Not(inner) => !eval_node(inner, row),
    }
}

fn operand_value<'a>(operand: &'a Operand, row: &'a [Value]) -> &'a Value {
    match operand {
        Operand::Column(idx) => row.get(*idx).unwrap_or(&Value::Null),
        Operand::Literal(v) => v,
    }
}

/// Compare two cells under `op`.
///
/// A `Null` side satisfies only `!=`. Mismatched types satisfy nothing. A NaN side satisfies
/// only `!=`.
pub(crate) fn compare_values(left: &Value, op: CompareOp, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return op == CompareOp::Ne,
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Int64(_) | Value::Float64(_), Value::Int64(_) | Value::Float64(_)) => {
            match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            }
        }
        (Value::Utf8(a), Value::Utf8(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => return false,
    };
    let Some(ordering) = ordering else {
        return op == CompareOp::Ne;
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
    }
}
