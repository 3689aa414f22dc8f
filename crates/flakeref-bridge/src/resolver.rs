//! Resolver capability
//!
//! The bridge never interprets flake references itself. It hands the text
//! and a base directory to a [`FlakeRefResolver`] and carries back whatever
//! the resolver produced, including its diagnostics.

use flakeref::{FlakeRef, FlakeRefError};
use std::path::Path;

/// A library that can parse and render flake references
pub trait FlakeRefResolver {
    /// Resolver-owned reference object
    type Reference;

    /// Diagnostic produced when parsing or rendering fails
    type Error: std::error::Error;

    /// Short name used in log fields
    fn name(&self) -> &'static str;

    /// Parse `input`, resolving relative paths against `base_dir`
    ///
    /// # Errors
    ///
    /// Returns the resolver's diagnostic if `input` is not a valid reference
    fn parse(&self, input: &str, base_dir: &Path) -> Result<Self::Reference, Self::Error>;

    /// Render a reference to its canonical string, consuming it
    ///
    /// # Errors
    ///
    /// Returns the resolver's diagnostic if the reference cannot be rendered
    fn render(&self, reference: Self::Reference) -> Result<String, Self::Error>;
}

impl<T: FlakeRefResolver + ?Sized> FlakeRefResolver for &T {
    type Reference = T::Reference;
    type Error = T::Error;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parse(&self, input: &str, base_dir: &Path) -> Result<Self::Reference, Self::Error> {
        (**self).parse(input, base_dir)
    }

    fn render(&self, reference: Self::Reference) -> Result<String, Self::Error> {
        (**self).render(reference)
    }
}

/// Pure-Rust resolver backed by the `flakeref` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResolver;

impl FlakeRefResolver for NativeResolver {
    type Reference = FlakeRef;
    type Error = FlakeRefError;

    fn name(&self) -> &'static str {
        "native"
    }

    fn parse(&self, input: &str, base_dir: &Path) -> Result<FlakeRef, FlakeRefError> {
        FlakeRef::parse(input, base_dir)
    }

    fn render(&self, reference: FlakeRef) -> Result<String, FlakeRefError> {
        Ok(reference.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_parse_and_render() {
        let resolver = NativeResolver;
        let reference = resolver
            .parse("github:NixOS/nixpkgs", Path::new("/"))
            .unwrap();
        assert_eq!(resolver.render(reference).unwrap(), "github:NixOS/nixpkgs");
    }

    #[test]
    fn test_native_error_is_resolver_diagnostic() {
        let err = NativeResolver
            .parse("github:", Path::new("/"))
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_resolver_by_reference() {
        let resolver = NativeResolver;
        let by_ref = &resolver;
        assert_eq!(by_ref.name(), "native");
        let reference = by_ref.parse("nixpkgs", Path::new("/")).unwrap();
        assert_eq!(by_ref.render(reference).unwrap(), "flake:nixpkgs");
    }
}
