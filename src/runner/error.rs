//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others. Since `#[expect]` fails when the lint doesn't
// fire, and `unfulfilled_lint_expectations` cannot be expected, we must use
// `#[allow]` here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The style has no layer with the requested identifier.
    #[error("layer `{layer}` not found in {}", path.display())]
    #[diagnostic(
        code(diplomat::runner::layer_not_found),
        help("pass the `id` of one of the style's layers")
    )]
    LayerNotFound {
        /// Requested layer identifier.
        layer: String,
        /// Style document searched.
        path: PathBuf,
    },

    /// The layer exists but draws no label.
    #[error("layer `{layer}` has no text field")]
    #[diagnostic(code(diplomat::runner::missing_text_field))]
    MissingTextField {
        /// Layer identifier.
        layer: String,
    },

    /// The label evaluated to something that is not text.
    #[error("label of layer `{layer}` did not evaluate to text")]
    #[diagnostic(code(diplomat::runner::not_text))]
    NotText {
        /// Layer identifier.
        layer: String,
    },
}
