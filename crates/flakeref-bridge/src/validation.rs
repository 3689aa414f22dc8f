//! Input and output validation

use crate::error::{BridgeError as Error, Result};

/// Size limits applied around resolver calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input length in bytes
    pub max_input_length: usize,
    /// Maximum rendered length in bytes
    pub max_output_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_length: 4096,
            max_output_length: 64 * 1024,
        }
    }
}

/// Validate a flake reference string before handing it to a resolver
///
/// # Errors
///
/// Returns a parse error if the input is empty, whitespace only, too long,
/// or contains a NUL byte
pub fn validate_input(input: &str, limits: &Limits) -> Result<()> {
    if input.is_empty() {
        return Err(Error::reference_parse(input, "flake reference is empty"));
    }

    if input.trim().is_empty() {
        return Err(Error::reference_parse(
            input,
            "flake reference contains only whitespace",
        ));
    }

    if input.len() > limits.max_input_length {
        return Err(Error::reference_parse(
            input,
            format!(
                "flake reference exceeds maximum length of {} bytes",
                limits.max_input_length
            ),
        ));
    }

    // C and C++ resolvers see the string up to the first NUL only
    if input.contains('\0') {
        return Err(Error::reference_parse(
            input,
            "flake reference contains a NUL byte",
        ));
    }

    Ok(())
}

/// Validate the text a resolver rendered
///
/// # Errors
///
/// Returns a render error if the output is empty or exceeds the size limit
pub fn validate_output(output: &str, limits: &Limits) -> Result<()> {
    if output.is_empty() {
        return Err(Error::reference_render("resolver rendered an empty string"));
    }

    if output.len() > limits.max_output_length {
        return Err(Error::reference_render(format!(
            "rendered reference exceeds maximum size of {} bytes",
            limits.max_output_length
        )));
    }

    Ok(())
}
