//! Error types for expression evaluation.
//!
//! This submodule isolates derive-macro-affected code to scope lint
//! suppressions narrowly.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while evaluating a label expression.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum EvalError {
    /// The operator is not part of the supported subset.
    #[error("unsupported expression operator `{0}`")]
    #[diagnostic(
        code(diplomat::eval::unknown_operator),
        help("only the operators emitted by diplomat are evaluated")
    )]
    UnknownOperator(String),

    /// An array node does not start with an operator name.
    #[error("expression node does not start with an operator: {0}")]
    #[diagnostic(code(diplomat::eval::missing_operator))]
    MissingOperator(String),

    /// The operator received the wrong number of operands.
    #[error("`{operator}` expects {expected}")]
    #[diagnostic(code(diplomat::eval::arity))]
    Arity {
        /// Operator name.
        operator: String,
        /// Human-readable operand count.
        expected: &'static str,
    },

    /// An operand evaluated to the wrong type.
    #[error("`{operator}` expected {expected}, got {found}")]
    #[diagnostic(code(diplomat::eval::type_mismatch))]
    Type {
        /// Operator name.
        operator: String,
        /// Expected type.
        expected: &'static str,
        /// Debug rendering of the value found.
        found: String,
    },

    /// A `var` referenced a name no enclosing `let` binds.
    #[error("variable `{0}` is not bound")]
    #[diagnostic(code(diplomat::eval::unbound_variable))]
    UnboundVariable(String),

    /// A literal or property value cannot be represented.
    #[error("unsupported value: {0}")]
    #[diagnostic(
        code(diplomat::eval::unsupported_value),
        help("arrays, objects and non-integer numbers are not evaluated")
    )]
    UnsupportedValue(String),
}
