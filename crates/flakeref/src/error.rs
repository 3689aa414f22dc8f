//! Error types for flake reference parsing

use thiserror::Error;

/// Errors produced while parsing a flake reference
///
/// The `Display` output is the diagnostic handed back to callers, so each
/// message names the offending input or attribute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlakeRefError {
    /// The scheme or shape of the input is not a known flake reference type
    #[error("input '{input}' is unsupported")]
    UnsupportedInput {
        /// The rejected input
        input: String,
    },

    /// The input looked like a URL but could not be parsed as one
    #[error("URL '{input}' is invalid: {reason}")]
    InvalidUrl {
        /// The rejected input
        input: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// A flake ID, owner, repository or ref name is malformed
    #[error("'{value}' is not a valid {what}")]
    InvalidIdentifier {
        /// What kind of identifier was expected
        what: &'static str,
        /// The rejected value
        value: String,
    },

    /// A revision is not a 40 or 64 digit hexadecimal commit hash
    #[error("'{value}' is not a commit hash")]
    InvalidRev {
        /// The rejected value
        value: String,
    },

    /// A fragment was present where a plain flake reference was expected
    #[error("unexpected fragment '{fragment}' in flake reference '{input}'")]
    UnexpectedFragment {
        /// The decoded fragment
        fragment: String,
        /// The full input
        input: String,
    },

    /// Two attributes that exclude each other were both given
    #[error("flake reference '{input}' specifies both {first} and {second}")]
    ConflictingAttributes {
        /// The full input
        input: String,
        /// Description of the first conflicting attribute
        first: &'static str,
        /// Description of the second conflicting attribute
        second: &'static str,
    },

    /// An attribute that the input type does not accept
    #[error("unsupported {input_type} attribute '{name}'")]
    UnsupportedAttribute {
        /// The input type, e.g. `github`
        input_type: &'static str,
        /// The attribute name
        name: String,
    },

    /// An accepted attribute with a malformed value
    #[error("attribute '{name}' has invalid value '{value}': {reason}")]
    InvalidAttribute {
        /// The attribute name
        name: String,
        /// The rejected value
        value: String,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// A path reference that cannot be represented
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path, lossily converted
        path: String,
        /// Why the path was rejected
        reason: &'static str,
    },
}

impl FlakeRefError {
    pub(crate) fn unsupported(input: &str) -> Self {
        Self::UnsupportedInput {
            input: input.to_string(),
        }
    }

    pub(crate) fn invalid_url(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_identifier(what: &'static str, value: &str) -> Self {
        Self::InvalidIdentifier {
            what,
            value: value.to_string(),
        }
    }

    pub(crate) fn conflicting(input: &str, first: &'static str, second: &'static str) -> Self {
        Self::ConflictingAttributes {
            input: input.to_string(),
            first,
            second,
        }
    }

    pub(crate) fn invalid_attribute(name: &str, value: &str, reason: &'static str) -> Self {
        Self::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }
}

/// Result type for flake reference operations
pub type Result<T> = std::result::Result<T, FlakeRefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = FlakeRefError::unsupported("foo:bar");
        assert_eq!(err.to_string(), "input 'foo:bar' is unsupported");
    }

    #[test]
    fn test_conflicting_message() {
        let err = FlakeRefError::conflicting("github:a/b/main?rev=x", "a branch or tag", "a commit hash");
        assert_eq!(
            err.to_string(),
            "flake reference 'github:a/b/main?rev=x' specifies both a branch or tag and a commit hash"
        );
    }

    #[test]
    fn test_invalid_attribute_message() {
        let err = FlakeRefError::invalid_attribute("shallow", "yes", "expected 0 or 1");
        assert_eq!(
            err.to_string(),
            "attribute 'shallow' has invalid value 'yes': expected 0 or 1"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlakeRefError>();
    }
}
