//! The bridge between callers and a flake reference resolver

use crate::builder::FlakeRefBridgeBuilder;
use crate::error::{BridgeError as Error, Result};
use crate::handle::ReferenceHandle;
use crate::resolver::{FlakeRefResolver, NativeResolver};
use crate::validation::{Limits, validate_input, validate_output};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Directory that relative path references are resolved against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaseDirectory {
    /// The process working directory at the time of each call
    #[default]
    CurrentDir,
    /// A fixed directory; relative values are joined onto the working directory
    Fixed(PathBuf),
}

impl BaseDirectory {
    /// Resolve to an absolute directory
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read
    pub fn resolve(&self) -> std::io::Result<PathBuf> {
        match self {
            Self::CurrentDir => std::env::current_dir(),
            Self::Fixed(path) if path.is_absolute() => Ok(path.clone()),
            Self::Fixed(path) => Ok(std::env::current_dir()?.join(path)),
        }
    }
}

/// Parses and renders flake references through a resolver
///
/// The bridge keeps no state between calls: every parse resolves the base
/// directory anew and every handle is independent.
#[derive(Debug, Clone)]
pub struct FlakeRefBridge<R = NativeResolver> {
    pub(crate) resolver: R,
    pub(crate) limits: Limits,
    pub(crate) base_dir: BaseDirectory,
}

impl Default for FlakeRefBridge<NativeResolver> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FlakeRefBridge<NativeResolver> {
    /// Create a builder for a bridge over the native resolver
    #[must_use]
    pub fn builder() -> FlakeRefBridgeBuilder<NativeResolver> {
        FlakeRefBridgeBuilder::new()
    }
}

impl<R: FlakeRefResolver> FlakeRefBridge<R> {
    /// Create a bridge over `resolver` with default limits
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            limits: Limits::default(),
            base_dir: BaseDirectory::default(),
        }
    }

    /// The resolver this bridge delegates to
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validation limits
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Where relative references are resolved from
    #[must_use]
    pub const fn base_directory(&self) -> &BaseDirectory {
        &self.base_dir
    }

    /// Parse a flake reference into an exclusively owned handle
    ///
    /// Relative path references are resolved against the base directory as
    /// it is at the time of this call.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ReferenceParse`](crate::BridgeError::ReferenceParse)
    /// if the input fails validation, the base directory cannot be
    /// determined, or the resolver rejects the input
    #[tracing::instrument(
        name = "parse_flake_reference",
        fields(
            resolver = self.resolver.name(),
            input = url,
            operation_id = %uuid::Uuid::new_v4(),
        ),
        level = "debug",
        skip_all
    )]
    pub fn parse_flake_reference(&self, url: &str) -> Result<ReferenceHandle<R::Reference>> {
        validate_input(url, &self.limits)?;
        self.parse_validated(url, url)
    }

    /// Parse a flake reference that may carry a `#fragment`
    ///
    /// The fragment (usually an attribute path such as
    /// `packages.x86_64-linux.hello`) is split off at the first `#` and
    /// percent-decoded. An empty fragment is `None`.
    ///
    /// # Errors
    ///
    /// Same as [`parse_flake_reference`](Self::parse_flake_reference)
    #[tracing::instrument(
        name = "parse_flake_reference_with_fragment",
        fields(
            resolver = self.resolver.name(),
            input = url,
            operation_id = %uuid::Uuid::new_v4(),
        ),
        level = "debug",
        skip_all
    )]
    pub fn parse_flake_reference_with_fragment(
        &self,
        url: &str,
    ) -> Result<(ReferenceHandle<R::Reference>, Option<String>)> {
        validate_input(url, &self.limits)?;

        let (body, fragment) = flakeref::split_fragment(url).map_err(|e| {
            tracing::warn!(error = %e, "Malformed flake reference fragment");
            Error::reference_parse(url, e.to_string())
        })?;
        if body.trim().is_empty() {
            return Err(Error::reference_parse(
                url,
                "flake reference has a fragment but no reference",
            ));
        }

        let handle = self.parse_validated(url, body)?;
        Ok((handle, fragment))
    }

    /// Render a handle to its canonical string, consuming the handle
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ReferenceRender`](crate::BridgeError::ReferenceRender)
    /// if the resolver fails to render or the rendering is empty or too large
    #[tracing::instrument(
        name = "flake_reference_to_string",
        fields(
            resolver = self.resolver.name(),
            operation_id = %uuid::Uuid::new_v4(),
        ),
        level = "debug",
        skip_all
    )]
    pub fn flake_reference_to_string(&self, handle: ReferenceHandle<R::Reference>) -> Result<String> {
        let start_time = Instant::now();

        let rendered = self
            .resolver
            .render(handle.into_reference())
            .map_err(|e| {
                let message = e.to_string();
                tracing::warn!(error = %message, "Resolver failed to render flake reference");
                Error::reference_render(message)
            })?;

        validate_output(&rendered, &self.limits)?;

        tracing::debug!(
            rendered = %rendered,
            duration_us = start_time.elapsed().as_micros(),
            "Rendered flake reference"
        );

        Ok(rendered)
    }

    fn parse_validated(&self, input: &str, body: &str) -> Result<ReferenceHandle<R::Reference>> {
        let start_time = Instant::now();

        let base_dir = self.base_dir.resolve().map_err(|e| {
            tracing::warn!(error = %e, "Cannot determine base directory");
            Error::reference_parse(input, format!("cannot determine base directory: {e}"))
        })?;

        let reference = self.delegate_parse(input, body, &base_dir)?;

        tracing::debug!(
            base_dir = %base_dir.display(),
            duration_us = start_time.elapsed().as_micros(),
            "Parsed flake reference"
        );

        Ok(ReferenceHandle::new(reference))
    }

    fn delegate_parse(&self, input: &str, body: &str, base_dir: &Path) -> Result<R::Reference> {
        self.resolver.parse(body, base_dir).map_err(|e| {
            let message = e.to_string();
            tracing::warn!(error = %message, "Resolver rejected flake reference");
            Error::reference_parse(input, message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_directory_current_dir() {
        let resolved = BaseDirectory::CurrentDir.resolve().unwrap();
        assert_eq!(resolved, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_base_directory_fixed_absolute() {
        let fixed = BaseDirectory::Fixed(PathBuf::from("/srv/flakes"));
        assert_eq!(fixed.resolve().unwrap(), PathBuf::from("/srv/flakes"));
    }

    #[test]
    fn test_base_directory_fixed_relative() {
        let fixed = BaseDirectory::Fixed(PathBuf::from("sub"));
        let expected = std::env::current_dir().unwrap().join("sub");
        assert_eq!(fixed.resolve().unwrap(), expected);
    }

    #[test]
    fn test_default_bridge_uses_native_resolver() {
        let bridge = FlakeRefBridge::default();
        assert_eq!(bridge.resolver().name(), "native");
        assert_eq!(bridge.limits(), &Limits::default());
        assert_eq!(bridge.base_directory(), &BaseDirectory::CurrentDir);
    }

    #[test]
    fn test_parse_and_render() {
        let bridge = FlakeRefBridge::default();
        let handle = bridge.parse_flake_reference("github:NixOS/nixpkgs").unwrap();
        assert_eq!(
            bridge.flake_reference_to_string(handle).unwrap(),
            "github:NixOS/nixpkgs"
        );
    }

    #[test]
    fn test_parse_error_keeps_input() {
        let bridge = FlakeRefBridge::default();
        let err = bridge.parse_flake_reference("github:").unwrap_err();
        assert!(err.is_parse());
        match err {
            Error::ReferenceParse { input, .. } => assert_eq!(input, "github:"),
            Error::ReferenceRender { .. } => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_fragment_without_reference() {
        let bridge = FlakeRefBridge::default();
        let err = bridge
            .parse_flake_reference_with_fragment("#hello")
            .unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("'#hello'"));
    }

    #[test]
    fn test_fixed_base_directory() {
        let bridge = FlakeRefBridge::builder()
            .base_directory("/srv/flakes")
            .build();
        let handle = bridge.parse_flake_reference("./app").unwrap();
        assert_eq!(
            bridge.flake_reference_to_string(handle).unwrap(),
            "path:/srv/flakes/app"
        );
    }
}
