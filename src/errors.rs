//! Error types with rich diagnostics using miette
//!
//! Expression errors carry source spans so a screen author sees which token of
//! a binding is wrong.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Name given to expression sources in diagnostics
pub(crate) const EXPRESSION_SOURCE_NAME: &str = "<expression>";

pub(crate) fn expression_source(src: &str) -> NamedSource<String> {
    NamedSource::new(EXPRESSION_SOURCE_NAME, src.to_string())
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Errors raised by the postfix expression evaluator
#[derive(Error, Diagnostic, Debug)]
pub enum EvalError {
    #[error("insufficient values in expression: `{operator}` needs two operands")]
    #[diagnostic(
        code(visubind::rpn::insufficient_operands),
        help("every operator pops exactly two values; push both operands before it")
    )]
    InsufficientOperands {
        operator: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("operator applied here")]
        span: SourceSpan,
    },

    #[error("expression has too many values: {remaining} left on the stack")]
    #[diagnostic(
        code(visubind::rpn::too_many_values),
        help("a well-formed postfix expression leaves exactly one value")
    )]
    TooManyValues {
        remaining: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("unused value")]
        span: SourceSpan,
    },

    #[error("unknown token: {token}")]
    #[diagnostic(
        code(visubind::rpn::unknown_token),
        help("tokens must be numbers or one of: + - * / % ** < <= > >= == != && ||")
    )]
    UnknownToken {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a number or operator")]
        span: SourceSpan,
    },
}

// ============================================================================
// Live Binding Errors
// ============================================================================

/// Errors at the live-adapter boundary
#[derive(Error, Diagnostic, Debug)]
pub enum LiveError {
    /// The adapter holds no current value for this variable
    #[error("live value unavailable: {name}")]
    #[diagnostic(code(visubind::live::unavailable))]
    Unavailable { name: String },

    #[error("binding expression is empty")]
    #[diagnostic(code(visubind::live::empty_expression))]
    EmptyExpression,

    /// A variable used inside an arithmetic expression holds no number
    #[error("live value {name} is not numeric: {value:?}")]
    #[diagnostic(code(visubind::live::not_numeric))]
    NotNumeric { name: String, value: String },

    /// The expression evaluated but produced no value
    #[error("binding expression produced no value")]
    #[diagnostic(code(visubind::live::no_value))]
    NoValue,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}

// ============================================================================
// Descriptor Errors
// ============================================================================

/// Structural problems with a shape descriptor. These are fatal: the resolver
/// refuses to produce a half-formed baseline.
#[derive(Error, Diagnostic, Debug, PartialEq)]
pub enum DescriptorError {
    #[error("{kind} shape has an empty point list")]
    #[diagnostic(
        code(visubind::descriptor::empty_point_list),
        help("polygon, polyline and bezier shapes need at least one point")
    )]
    EmptyPointList { kind: &'static str },

    #[error("non-finite coordinate in {field}: {source}")]
    #[diagnostic(code(visubind::descriptor::non_finite_coordinate))]
    NonFiniteCoordinate {
        field: &'static str,
        source: NumericError,
    },

    #[error("invalid line width {value}: {source}")]
    #[diagnostic(code(visubind::descriptor::invalid_line_width))]
    InvalidLineWidth { value: f64, source: NumericError },
}

// ============================================================================
// Build Errors
// ============================================================================

/// Anything that stops a descriptor and its bindings from becoming a live
/// object
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Live(#[from] LiveError),
}
