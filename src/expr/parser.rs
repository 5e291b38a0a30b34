//! Recursive-descent parser for filter conditions.
//!
//! ```text
//! or         → and ( "or" and )*
//! and        → not ( "and" not )*
//! not        → "not" not | comparison
//! comparison → operand ( CMP operand )?
//! operand    → NUMBER | STRING | BOOL | IDENT | "(" or ")"
//! ```

use super::lexer::{tokenize, Token};
use super::{CompareOp, Expr, ExprError, Literal};

/// Parse a condition string into an [`Expr`] tree.
pub fn parse_expr(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Parse("empty condition".into()));
    }
    let mut pos = 0;
    let result = parse_or(&tokens, &mut pos)?;
    if pos < tokens.len() {
        return Err(ExprError::Parse(format!(
            "unexpected token at position {pos}: {:?}",
            tokens[pos]
        )));
    }
    Ok(result)
}

fn parse_or(tokens: &[Token], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut left = parse_and(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::Or) {
        *pos += 1;
        let right = parse_and(tokens, pos)?;
        left = Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_and(tokens: &[Token], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut left = parse_not(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::And) {
        *pos += 1;
        let right = parse_not(tokens, pos)?;
        left = Expr::And {
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_not(tokens: &[Token], pos: &mut usize) -> Result<Expr, ExprError> {
    if tokens.get(*pos) == Some(&Token::Not) {
        *pos += 1;
        let inner = parse_not(tokens, pos)?;
        return Ok(Expr::Not {
            expr: Box::new(inner),
        });
    }
    parse_comparison(tokens, pos)
}

fn comparison_op(token: Option<&Token>) -> Option<CompareOp> {
    match token? {
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::Ne),
        Token::Gt => Some(CompareOp::Gt),
        Token::Ge => Some(CompareOp::Ge),
        Token::Lt => Some(CompareOp::Lt),
        Token::Le => Some(CompareOp::Le),
        _ => None,
    }
}

fn parse_comparison(tokens: &[Token], pos: &mut usize) -> Result<Expr, ExprError> {
    let left = parse_operand(tokens, pos)?;
    let Some(op) = comparison_op(tokens.get(*pos)) else {
        return Ok(left);
    };
    *pos += 1;
    let right = parse_operand(tokens, pos)?;
    if comparison_op(tokens.get(*pos)).is_some() {
        return Err(ExprError::Parse(
            "chained comparisons are not supported; combine them with 'and'".into(),
        ));
    }
    Ok(Expr::Compare {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

fn parse_operand(tokens: &[Token], pos: &mut usize) -> Result<Expr, ExprError> {
    let Some(token) = tokens.get(*pos) else {
        return Err(ExprError::Parse("unexpected end of condition".into()));
    };
    *pos += 1;
    match token {
        Token::Ident(name) => Ok(Expr::Column { name: name.clone() }),
        Token::Int(v) => Ok(Expr::Literal {
            value: Literal::Int(*v),
        }),
        Token::Float(v) => Ok(Expr::Literal {
            value: Literal::Float(*v),
        }),
        Token::Str(s) => Ok(Expr::Literal {
            value: Literal::Str(s.clone()),
        }),
        Token::Bool(b) => Ok(Expr::Literal {
            value: Literal::Bool(*b),
        }),
        Token::LParen => {
            let inner = parse_or(tokens, pos)?;
            if tokens.get(*pos) != Some(&Token::RParen) {
                return Err(ExprError::Parse("expected closing parenthesis".into()));
            }
            *pos += 1;
            Ok(inner)
        }
        other => Err(ExprError::Parse(format!(
            "unexpected token at position {}: {other:?}",
            *pos - 1
        ))),
    }
}
