//! libnix backend
//!
//! Binds `nix::parseFlakeRef` and `nix::FlakeRef::to_string` through `cxx`.
//! C++ exceptions thrown by Nix arrive as [`cxx::Exception`] and their text
//! is passed on untouched.

use crate::resolver::FlakeRefResolver;
use cxx::UniquePtr;
use std::path::Path;
use thiserror::Error;

#[cxx::bridge(namespace = "flakeref_bridge")]
pub mod ffi {
    unsafe extern "C++" {
        include!("flakeref-bridge/include/nix_flakeref.h");

        /// Nix's own flake reference object
        type FlakeRef;

        /// Parse `url`, resolving relative paths against `base_dir`
        fn parse_flake_ref(url: &str, base_dir: &str) -> Result<UniquePtr<FlakeRef>>;

        /// Render and destroy a flake reference
        fn flake_ref_to_string(flake_ref: UniquePtr<FlakeRef>) -> Result<String>;
    }
}

/// Errors from the libnix backend
#[derive(Error, Debug)]
pub enum NixError {
    /// Nix threw an exception
    #[error("{0}")]
    Exception(#[from] cxx::Exception),

    /// libnix only accepts UTF-8 paths through this binding
    #[error("base directory '{0}' is not valid UTF-8")]
    NonUtf8BaseDir(String),

    /// The reference had already been released on the C++ side
    #[error("flake reference is null")]
    NullReference,
}

/// Resolver backed by the Nix C++ libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct NixResolver;

impl FlakeRefResolver for NixResolver {
    type Reference = UniquePtr<ffi::FlakeRef>;
    type Error = NixError;

    fn name(&self) -> &'static str {
        "nix"
    }

    fn parse(&self, input: &str, base_dir: &Path) -> Result<Self::Reference, NixError> {
        let Some(base_dir) = base_dir.to_str() else {
            return Err(NixError::NonUtf8BaseDir(base_dir.display().to_string()));
        };
        Ok(ffi::parse_flake_ref(input, base_dir)?)
    }

    fn render(&self, reference: Self::Reference) -> Result<String, NixError> {
        if reference.is_null() {
            return Err(NixError::NullReference);
        }
        Ok(ffi::flake_ref_to_string(reference)?)
    }
}
