//! Builder pattern for configuring a flake reference bridge

use crate::bridge::{BaseDirectory, FlakeRefBridge};
use crate::resolver::{FlakeRefResolver, NativeResolver};
use crate::validation::Limits;
use std::path::PathBuf;

/// Configuration builder for [`FlakeRefBridge`]
#[derive(Debug, Clone)]
pub struct FlakeRefBridgeBuilder<R = NativeResolver> {
    resolver: R,
    limits: Limits,
    base_dir: BaseDirectory,
}

impl Default for FlakeRefBridgeBuilder<NativeResolver> {
    fn default() -> Self {
        Self {
            resolver: NativeResolver,
            limits: Limits::default(),
            base_dir: BaseDirectory::CurrentDir,
        }
    }
}

impl FlakeRefBridgeBuilder<NativeResolver> {
    /// Creates a new builder with the native resolver and default limits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: FlakeRefResolver> FlakeRefBridgeBuilder<R> {
    /// Set maximum input length
    #[must_use]
    pub fn max_input_length(mut self, length: usize) -> Self {
        self.limits.max_input_length = length;
        self
    }

    /// Set maximum rendered length
    #[must_use]
    pub fn max_output_length(mut self, length: usize) -> Self {
        self.limits.max_output_length = length;
        self
    }

    /// Replace all limits at once
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve relative references against a fixed directory
    #[must_use]
    pub fn base_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = BaseDirectory::Fixed(dir.into());
        self
    }

    /// Resolve relative references against the working directory at call time
    #[must_use]
    pub fn current_dir(mut self) -> Self {
        self.base_dir = BaseDirectory::CurrentDir;
        self
    }

    /// Swap the resolver, keeping limits and base directory
    #[must_use]
    pub fn resolver<R2: FlakeRefResolver>(self, resolver: R2) -> FlakeRefBridgeBuilder<R2> {
        FlakeRefBridgeBuilder {
            resolver,
            limits: self.limits,
            base_dir: self.base_dir,
        }
    }

    /// Build the bridge
    #[must_use]
    pub fn build(self) -> FlakeRefBridge<R> {
        FlakeRefBridge {
            resolver: self.resolver,
            limits: self.limits,
            base_dir: self.base_dir,
        }
    }
}
