//! Postfix expression evaluation.
//!
//! Numbers are pushed onto an operand stack; every other token must be one of
//! the operators in [`Operator::TABLE`] and pops exactly two operands (the
//! second-popped value is the left operand). There is no dynamic evaluation:
//! a token that is neither a numeric literal nor a known operator is rejected.

use std::fmt;
use std::str::FromStr;

use miette::SourceSpan;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::{EvalError, expression_source};

#[derive(Parser)]
#[grammar = "rpn.pest"]
struct RpnParser;

/// Result of a postfix evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RpnValue {
    Number(f64),
    Bool(bool),
}

impl RpnValue {
    /// Numeric view; booleans count as 0/1
    pub fn as_number(self) -> f64 {
        match self {
            RpnValue::Number(n) => n,
            RpnValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Truthiness: non-zero, non-NaN numbers and `true`
    pub fn is_truthy(self) -> bool {
        match self {
            RpnValue::Number(n) => n != 0.0 && !n.is_nan(),
            RpnValue::Bool(b) => b,
        }
    }
}

impl fmt::Display for RpnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpnValue::Number(n) => write!(f, "{}", crate::types::fmt_num(*n)),
            RpnValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// The closed set of binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl Operator {
    /// Symbol → operator dispatch table
    pub const TABLE: &'static [(&'static str, Operator)] = &[
        ("+", Operator::Add),
        ("-", Operator::Sub),
        ("*", Operator::Mul),
        ("/", Operator::Div),
        ("%", Operator::Rem),
        ("**", Operator::Pow),
        ("<", Operator::Lt),
        ("<=", Operator::Le),
        (">", Operator::Gt),
        (">=", Operator::Ge),
        ("==", Operator::Eq),
        ("!=", Operator::Ne),
        ("&&", Operator::And),
        ("||", Operator::Or),
    ];

    pub fn symbol(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(sym, _)| *sym)
            .unwrap_or("?")
    }

    /// Apply to a left and right operand.
    ///
    /// Arithmetic follows IEEE semantics, so division by zero yields an
    /// infinity (or NaN) rather than an error.
    pub fn apply(self, lhs: RpnValue, rhs: RpnValue) -> RpnValue {
        use RpnValue::{Bool, Number};
        let (l, r) = (lhs.as_number(), rhs.as_number());
        match self {
            Operator::Add => Number(l + r),
            Operator::Sub => Number(l - r),
            Operator::Mul => Number(l * r),
            Operator::Div => Number(l / r),
            Operator::Rem => Number(l % r),
            Operator::Pow => Number(l.powf(r)),
            Operator::Lt => Bool(l < r),
            Operator::Le => Bool(l <= r),
            Operator::Gt => Bool(l > r),
            Operator::Ge => Bool(l >= r),
            Operator::Eq => Bool(l == r),
            Operator::Ne => Bool(l != r),
            Operator::And => Bool(lhs.is_truthy() && rhs.is_truthy()),
            Operator::Or => Bool(lhs.is_truthy() || rhs.is_truthy()),
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .find(|(sym, _)| *sym == s)
            .map(|(_, op)| *op)
            .ok_or(())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A classified token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Op(Operator),
}

/// Whether `text` is a numeric literal of the expression language
pub fn is_number(text: &str) -> bool {
    RpnParser::parse(Rule::number_token, text).is_ok()
}

/// Value of a token accepted by [`is_number`]
fn number_value(text: &str) -> Option<f64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        // Wider than u64 still has a nearest f64
        return hex
            .chars()
            .try_fold(0.0, |acc, c| c.to_digit(16).map(|d| acc * 16.0 + f64::from(d)));
    }
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else {
        unsigned.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// A tokenized postfix expression, ready to evaluate any number of times
#[derive(Debug, Clone)]
pub struct Expression {
    src: String,
    tokens: Vec<(Token, SourceSpan)>,
}

impl Expression {
    /// Tokenize a whitespace-delimited source
    pub fn parse(src: &str) -> Result<Self, EvalError> {
        let pairs = RpnParser::parse(Rule::program, src).map_err(|_| EvalError::UnknownToken {
            token: src.to_string(),
            src: expression_source(src),
            span: (0, src.len()).into(),
        })?;

        let mut tokens = Vec::new();
        for pair in pairs.flatten().filter(|p| p.as_rule() == Rule::token) {
            let text = pair.as_str();
            let span: SourceSpan = (pair.as_span().start(), text.len()).into();
            let token = if is_number(text) {
                number_value(text).map(Token::Number)
            } else {
                text.parse::<Operator>().ok().map(Token::Op)
            };
            match token {
                Some(token) => tokens.push((token, span)),
                None => {
                    return Err(EvalError::UnknownToken {
                        token: text.to_string(),
                        src: expression_source(src),
                        span,
                    });
                }
            }
        }

        Ok(Expression {
            src: src.to_string(),
            tokens,
        })
    }

    /// Tokenize an already-split token sequence
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(&joined)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.tokens.iter().map(|(t, _)| *t)
    }

    /// Run the expression. An empty expression yields `None`.
    pub fn evaluate(&self) -> Result<Option<RpnValue>, EvalError> {
        let mut stack: Vec<(RpnValue, SourceSpan)> = Vec::with_capacity(self.tokens.len());

        for (token, span) in &self.tokens {
            match token {
                Token::Number(n) => stack.push((RpnValue::Number(*n), *span)),
                Token::Op(op) => {
                    let (Some((rhs, _)), Some((lhs, _))) = (stack.pop(), stack.pop()) else {
                        return Err(EvalError::InsufficientOperands {
                            operator: op.symbol().to_string(),
                            src: expression_source(&self.src),
                            span: *span,
                        });
                    };
                    stack.push((op.apply(lhs, rhs), *span));
                }
            }
        }

        if stack.len() > 1 {
            let (_, span) = stack[stack.len() - 2];
            return Err(EvalError::TooManyValues {
                remaining: stack.len(),
                src: expression_source(&self.src),
                span,
            });
        }

        Ok(stack.pop().map(|(value, _)| value))
    }
}

/// Evaluate a token sequence
pub fn evaluate<S: AsRef<str>>(tokens: &[S]) -> Result<Option<RpnValue>, EvalError> {
    Expression::from_tokens(tokens)?.evaluate()
}

/// Evaluate a whitespace-delimited source
pub fn evaluate_str(src: &str) -> Result<Option<RpnValue>, EvalError> {
    Expression::parse(src)?.evaluate()
}
