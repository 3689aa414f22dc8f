//! Error types for the flake reference bridge
//!
//! Every failure coming back from a resolver is tagged with the operation
//! that produced it. The resolver's own diagnostic text is kept verbatim.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Errors returned by the bridge operations
#[derive(Error, Debug, Diagnostic)]
pub enum BridgeError {
    /// The input could not be turned into a flake reference
    ///
    /// Raised for malformed input, for input rejected by the resolver and
    /// when the base directory cannot be determined.
    #[error("Failed to parse flake reference '{input}': {message}")]
    #[diagnostic(
        code(flakeref::bridge::parse),
        help("Flake references look like 'github:owner/repo', 'nixpkgs' or './path'")
    )]
    ReferenceParse {
        /// The input as given by the caller
        input: String,
        /// Diagnostic from validation or from the resolver
        message: String,
    },

    /// The resolver could not render a reference back to text
    #[error("Failed to render flake reference: {message}")]
    #[diagnostic(code(flakeref::bridge::render))]
    ReferenceRender {
        /// Diagnostic from validation or from the resolver
        message: String,
    },
}

impl BridgeError {
    /// Create a parse error
    #[must_use]
    pub fn reference_parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReferenceParse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a render error
    #[must_use]
    pub fn reference_render(message: impl Into<String>) -> Self {
        Self::ReferenceRender {
            message: message.into(),
        }
    }

    /// Whether this error came from parsing
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::ReferenceParse { .. })
    }

    /// Whether this error came from rendering
    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::ReferenceRender { .. })
    }

    /// The diagnostic text without the operation prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ReferenceParse { message, .. } | Self::ReferenceRender { message } => message,
        }
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
