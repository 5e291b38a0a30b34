//! Tokenizer for filter conditions.

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    // Comparison
    EqEq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    // Grouping
    LParen,
    RParen,
    // Logical (keywords)
    And,
    Or,
    Not,
}

impl Token {
    /// Tokens after which a `-` starts a negative number rather than being an error.
    fn expects_operand_next(prev: Option<&Token>) -> bool {
        matches!(
            prev,
            None | Some(
                Token::LParen
                    | Token::EqEq
                    | Token::NotEq
                    | Token::Gt
                    | Token::Ge
                    | Token::Lt
                    | Token::Le
                    | Token::And
                    | Token::Or
                    | Token::Not
            )
        )
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    return Err(ExprError::Parse(
                        "expected '==' but found single '='".into(),
                    ));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    return Err(ExprError::Parse(
                        "expected '!=' but found single '!' (use 'not' for negation)".into(),
                    ));
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '\'' | '"' => {
                let (s, next) = read_quoted(&chars, i)?;
                tokens.push(Token::Str(s));
                i = next;
            }
            '`' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == '`')
                    .map(|off| start + off)
                    .ok_or_else(|| ExprError::Parse("unterminated backtick identifier".into()))?;
                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(ExprError::Parse("empty backtick identifier".into()));
                }
                tokens.push(Token::Ident(name));
                i = end + 1;
            }
            '-' if Token::expects_operand_next(tokens.last())
                && chars.get(i + 1).is_some_and(|ch| ch.is_ascii_digit() || *ch == '.') =>
            {
                let (tok, next) = read_number(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            _ if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let (tok, next) = read_number(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    "not" => tokens.push(Token::Not),
                    "true" | "True" => tokens.push(Token::Bool(true)),
                    "false" | "False" => tokens.push(Token::Bool(false)),
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            _ => {
                return Err(ExprError::Parse(format!("unexpected character: '{c}'")));
            }
        }
    }
    Ok(tokens)
}

/// Reads a quoted string starting at `chars[start]` (the quote). A backslash escapes the next
/// character. Returns the unescaped text and the index after the closing quote.
fn read_quoted(chars: &[char], start: usize) -> Result<(String, usize), ExprError> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                out.push(chars[i + 1]);
                i += 2;
            }
            ch if ch == quote => return Ok((out, i + 1)),
            ch => {
                out.push(ch);
                i += 1;
            }
        }
    }
    Err(ExprError::Parse("unterminated string literal".into()))
}

/// Reads `-?digits[.digits][e[+-]digits]` starting at `start`.
fn read_number(chars: &[char], start: usize) -> Result<(Token, usize), ExprError> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    if i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '_') {
        return Err(ExprError::Parse(format!(
            "invalid number literal near '{}'",
            chars[start..=i].iter().collect::<String>()
        )));
    }

    let num_str: String = chars[start..i].iter().collect();
    let is_float = num_str.contains(['.', 'e', 'E']);
    let tok = if is_float {
        Token::Float(
            num_str
                .parse::<f64>()
                .map_err(|_| ExprError::Parse(format!("invalid float: {num_str}")))?,
        )
    } else {
        Token::Int(
            num_str
                .parse::<i64>()
                .map_err(|_| ExprError::Parse(format!("invalid integer: {num_str}")))?,
        )
    };
    Ok((tok, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_comparison_and_keywords() {
        let toks = tokenize("price >= 10.5 and not active").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident("price".into()),
                Token::Ge,
                Token::Float(10.5),
                Token::And,
                Token::Not,
                Token::Ident("active".into()),
            ]
        );
    }

    #[test]
    fn negative_numbers_only_in_operand_position() {
        assert_eq!(
            tokenize("x > -3").unwrap(),
            vec![Token::Ident("x".into()), Token::Gt, Token::Int(-3)]
        );
        assert!(tokenize("x -3").is_err());
    }

    #[test]
    fn strings_support_both_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"name == 'O\'Brien'"#).unwrap()[2],
            Token::Str("O'Brien".into())
        );
        assert_eq!(tokenize(r#""a b""#).unwrap(), vec![Token::Str("a b".into())]);
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn backticks_quote_identifiers() {
        assert_eq!(
            tokenize("`unit price` < 3").unwrap()[0],
            Token::Ident("unit price".into())
        );
    }

    #[test]
    fn exponents_and_booleans() {
        assert_eq!(tokenize("1e3").unwrap(), vec![Token::Float(1000.0)]);
        assert_eq!(tokenize("True").unwrap(), vec![Token::Bool(true)]);
        assert_eq!(tokenize("false").unwrap(), vec![Token::Bool(false)]);
    }

    #[test]
    fn rejects_operators_outside_the_grammar() {
        for bad in ["a = 1", "a + 1", "a & b", "!a", "f(x)[0]", "12abc", "a.b"] {
            assert!(tokenize(bad).is_err(), "{bad}");
        }
    }
}
