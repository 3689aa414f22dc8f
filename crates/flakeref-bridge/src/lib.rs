//! Move-only flake reference handles over a pluggable resolver
//!
//! This crate exposes exactly two boundary operations:
//!
//! - [`parse_flake_reference`] turns text such as `github:NixOS/nixpkgs`
//!   into an exclusively owned [`ReferenceHandle`]
//! - [`flake_reference_to_string`] consumes a handle and returns the
//!   resolver's canonical rendering
//!
//! The actual grammar lives in a [`FlakeRefResolver`]. The free functions
//! use the pure-Rust [`NativeResolver`]; with the `nix` feature enabled,
//! `nix::NixResolver` binds Nix's own C++ implementation instead. Relative
//! references are resolved against the working directory as it is at the
//! time of each call.
//!
//! ```
//! let handle = flakeref_bridge::parse_flake_reference("github:NixOS/nixpkgs")?;
//! let rendered = flakeref_bridge::flake_reference_to_string(handle)?;
//! assert_eq!(rendered, "github:NixOS/nixpkgs");
//! # Ok::<(), flakeref_bridge::BridgeError>(())
//! ```

pub mod bridge;
pub mod builder;
pub mod error;
pub mod handle;
pub mod resolver;
pub mod validation;

#[cfg(feature = "nix")]
#[allow(unsafe_code)] // cxx bridge declarations
pub mod nix;

pub use bridge::{BaseDirectory, FlakeRefBridge};
pub use builder::FlakeRefBridgeBuilder;
pub use error::{BridgeError, Result};
pub use flakeref::FlakeRef;
pub use handle::ReferenceHandle;
pub use resolver::{FlakeRefResolver, NativeResolver};
pub use validation::Limits;

/// Parse a flake reference with the native resolver
///
/// Relative path references are resolved against the current working
/// directory.
///
/// # Errors
///
/// Returns [`BridgeError::ReferenceParse`] carrying the resolver's message
/// if `url` is not a valid flake reference
pub fn parse_flake_reference(url: &str) -> Result<ReferenceHandle<FlakeRef>> {
    FlakeRefBridge::default().parse_flake_reference(url)
}

/// Render a flake reference to its canonical string, consuming the handle
///
/// # Errors
///
/// Returns [`BridgeError::ReferenceRender`] if rendering fails
pub fn flake_reference_to_string(handle: ReferenceHandle<FlakeRef>) -> Result<String> {
    FlakeRefBridge::default().flake_reference_to_string(handle)
}
