//! Boundary to the live data source.
//!
//! The communication layer that owns controller values implements
//! [`LiveAdapter`]. The binding engine only ever asks it to compile a binding
//! expression into an [`Evaluator`] and to look up a named variable; polling,
//! caching and subscriptions stay on the adapter's side.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::LiveError;
use crate::rpn::{self, Expression, RpnValue};

/// A value produced by the live data source
#[derive(Debug, Clone, PartialEq)]
pub enum LiveValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl LiveValue {
    /// Interpret a design-time constant: numeric literals become numbers,
    /// `true`/`false` become booleans, anything else stays text.
    pub fn from_literal(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(n) = parse_number(trimmed) {
            return LiveValue::Number(n);
        }
        match trimmed {
            "true" | "TRUE" => LiveValue::Bool(true),
            "false" | "FALSE" => LiveValue::Bool(false),
            _ => LiveValue::Text(text.to_string()),
        }
    }

    /// Numeric view. Text is trimmed and an empty string counts as 0, which
    /// is how the controller's string tags compare against numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiveValue::Number(n) => Some(*n),
            LiveValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            LiveValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() { Some(0.0) } else { parse_number(s) }
            }
        }
    }

    /// Numeric view without the blank-text rule: empty or whitespace-only
    /// text is not a number. Used where a missing value must not read as 0.
    pub fn as_strict_number(&self) -> Option<f64> {
        match self {
            LiveValue::Text(s) if s.trim().is_empty() => None,
            other => other.as_number(),
        }
    }

    /// Loose comparison against a design-time flag literal such as `"1"`.
    ///
    /// Text compares as text; numbers and booleans compare numerically.
    pub fn loosely_equals(&self, literal: &str) -> bool {
        match self {
            LiveValue::Text(s) => s == literal,
            other => match (other.as_number(), parse_number(literal.trim())) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Truthiness for boolean slots such as the alarm toggle
    pub fn is_truthy(&self) -> bool {
        match self {
            LiveValue::Bool(b) => *b,
            LiveValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiveValue::Text(s) => match self.as_number() {
                Some(n) => n != 0.0,
                None => !s.trim().eq_ignore_ascii_case("false"),
            },
        }
    }
}

impl fmt::Display for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveValue::Number(n) => f.write_str(&crate::types::fmt_num(*n)),
            LiveValue::Text(s) => f.write_str(s),
            LiveValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for LiveValue {
    fn from(n: f64) -> Self {
        LiveValue::Number(n)
    }
}

impl From<i64> for LiveValue {
    fn from(n: i64) -> Self {
        LiveValue::Number(n as f64)
    }
}

impl From<bool> for LiveValue {
    fn from(b: bool) -> Self {
        LiveValue::Bool(b)
    }
}

impl From<&str> for LiveValue {
    fn from(s: &str) -> Self {
        LiveValue::Text(s.to_string())
    }
}

impl From<String> for LiveValue {
    fn from(s: String) -> Self {
        LiveValue::Text(s)
    }
}

impl From<RpnValue> for LiveValue {
    fn from(v: RpnValue) -> Self {
        match v {
            RpnValue::Number(n) => LiveValue::Number(n),
            RpnValue::Bool(b) => LiveValue::Bool(b),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if !rpn::is_number(text) {
        return None;
    }
    match rpn::evaluate_str(text) {
        Ok(Some(v)) => Some(v.as_number()),
        _ => None,
    }
}

/// Zero-argument evaluator returning the current value of a binding
pub type Evaluator = Box<dyn Fn() -> Result<LiveValue, LiveError>>;

/// One term of a binding expression as the descriptor stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprTerm {
    /// A controller variable, e.g. `PLC_PRG.bAlarm`
    Var(String),
    /// A literal
    Const(String),
    /// A postfix operator token
    Op(String),
}

impl ExprTerm {
    /// Build a term from the descriptor's `(kind, value)` pair.
    /// Unknown kinds yield `None`.
    pub fn from_pair(kind: &str, value: &str) -> Option<Self> {
        match kind {
            "var" => Some(ExprTerm::Var(value.to_string())),
            "const" => Some(ExprTerm::Const(value.to_string())),
            "op" => Some(ExprTerm::Op(value.to_string())),
            _ => None,
        }
    }
}

/// The expression source attached to a binding slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingExpr {
    terms: Vec<ExprTerm>,
}

impl BindingExpr {
    pub fn new(terms: Vec<ExprTerm>) -> Self {
        Self { terms }
    }

    /// A binding that reads one variable directly
    pub fn var(name: impl Into<String>) -> Self {
        Self::new(vec![ExprTerm::Var(name.into())])
    }

    /// A binding with a constant value
    pub fn constant(text: impl Into<String>) -> Self {
        Self::new(vec![ExprTerm::Const(text.into())])
    }

    /// Postfix source where identifiers that are neither numbers nor
    /// operators are variables: `"PLC_PRG.iLevel 10 *"`.
    pub fn postfix(src: &str) -> Self {
        src.split_whitespace()
            .map(|tok| {
                if rpn::is_number(tok) {
                    ExprTerm::Const(tok.to_string())
                } else if tok.parse::<rpn::Operator>().is_ok() {
                    ExprTerm::Op(tok.to_string())
                } else {
                    ExprTerm::Var(tok.to_string())
                }
            })
            .collect()
    }

    /// From the descriptor's list of `(kind, value)` pairs, skipping
    /// unknown kinds
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .filter_map(|(kind, value)| ExprTerm::from_pair(kind, value))
            .collect()
    }

    pub fn terms(&self) -> &[ExprTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<ExprTerm> for BindingExpr {
    fn from_iter<T: IntoIterator<Item = ExprTerm>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// What the binding engine needs from the live data source
pub trait LiveAdapter {
    /// Turn a binding expression into an evaluator yielding its current value
    fn compile(&self, expr: &BindingExpr) -> Result<Evaluator, LiveError>;

    /// Current value of a named variable, `None` if unknown or stale
    fn current_value(&self, name: &str) -> Option<LiveValue>;
}

type Values = Rc<RefCell<HashMap<String, Option<LiveValue>>>>;

/// In-memory live adapter.
///
/// Holds the last known value of every variable; the host updates it with
/// [`TagTable::set`] whenever fresh data arrives. Cloning shares the table,
/// so evaluators compiled from it observe later updates.
#[derive(Clone, Default)]
pub struct TagTable {
    values: Values,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the current value of a variable
    pub fn set(&self, name: impl Into<String>, value: impl Into<LiveValue>) {
        self.values.borrow_mut().insert(name.into(), Some(value.into()));
    }

    /// Keep the variable known but drop its value, e.g. after a timeout
    pub fn mark_unavailable(&self, name: impl Into<String>) {
        self.values.borrow_mut().insert(name.into(), None);
    }

    pub fn remove(&self, name: &str) {
        self.values.borrow_mut().remove(name);
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl fmt::Debug for TagTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.borrow().iter()).finish()
    }
}

fn lookup(values: &Values, name: &str) -> Result<LiveValue, LiveError> {
    values
        .borrow()
        .get(name)
        .cloned()
        .flatten()
        .ok_or_else(|| LiveError::Unavailable {
            name: name.to_string(),
        })
}

/// Render a live number as a token of the postfix language
fn number_token(name: &str, value: &LiveValue) -> Result<String, LiveError> {
    let not_numeric = || LiveError::NotNumeric {
        name: name.to_string(),
        value: value.to_string(),
    };
    let n = value.as_number().ok_or_else(not_numeric)?;
    if n.is_nan() {
        Err(not_numeric())
    } else if n.is_infinite() {
        Ok(if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        Ok(format!("{}", n))
    }
}

impl LiveAdapter for TagTable {
    fn compile(&self, expr: &BindingExpr) -> Result<Evaluator, LiveError> {
        match expr.terms() {
            [] => Err(LiveError::EmptyExpression),
            [ExprTerm::Var(name)] => {
                let values = Rc::clone(&self.values);
                let name = name.clone();
                Ok(Box::new(move || lookup(&values, &name)))
            }
            [ExprTerm::Const(text)] => {
                let value = LiveValue::from_literal(text);
                Ok(Box::new(move || Ok(value.clone())))
            }
            terms => {
                // Reject malformed expressions up front: with every variable
                // standing in as 0 the shape of the stack is already known.
                let template = terms.iter().map(|t| match t {
                    ExprTerm::Var(_) => "0",
                    ExprTerm::Const(s) | ExprTerm::Op(s) => s.as_str(),
                });
                Expression::from_tokens(template)?.evaluate()?;

                let values = Rc::clone(&self.values);
                let terms = terms.to_vec();
                Ok(Box::new(move || {
                    let tokens = terms
                        .iter()
                        .map(|t| match t {
                            ExprTerm::Var(name) => number_token(name, &lookup(&values, name)?),
                            ExprTerm::Const(s) | ExprTerm::Op(s) => Ok(s.clone()),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    rpn::evaluate(tokens.as_slice())?
                        .map(LiveValue::from)
                        .ok_or(LiveError::NoValue)
                }))
            }
        }
    }

    fn current_value(&self, name: &str) -> Option<LiveValue> {
        self.values.borrow().get(name).cloned().flatten()
    }
}
