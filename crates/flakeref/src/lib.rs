//! Native flake reference resolver
//!
//! Parses the URL-like flake reference syntax (`github:NixOS/nixpkgs`,
//! `nixpkgs/nixos-24.05`, `git+https://...`, `./my-flake`, ...) into a
//! [`FlakeRef`] and renders it back to a canonical string.
//!
//! Parsing is pure apart from joining relative paths onto a caller-supplied
//! base directory; nothing is fetched and the registry is not consulted.
//!
//! ```
//! use flakeref::FlakeRef;
//! use std::path::Path;
//!
//! let flake = FlakeRef::parse("nixpkgs", Path::new("/"))?;
//! assert_eq!(flake.to_string(), "flake:nixpkgs");
//! # Ok::<(), flakeref::FlakeRefError>(())
//! ```

pub mod attrs;
pub mod error;
pub mod path;

mod encode;
mod grammar;
mod model;

pub use attrs::{Rev, validate_ref};
pub use encode::{encode_fragment, split_fragment};
pub use error::{FlakeRefError, Result};
pub use model::{FlakeRef, FlakeRefKind, Forge};
