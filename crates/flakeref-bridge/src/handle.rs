//! Move-only reference handles

use std::fmt;

/// An opaque, exclusively owned flake reference
///
/// Produced by [`FlakeRefBridge::parse_flake_reference`] and consumed by
/// [`FlakeRefBridge::flake_reference_to_string`]. The handle is neither
/// `Clone` nor `Copy`, so rendering moves it and any later use fails to
/// compile:
///
/// ```compile_fail
/// let handle = flakeref_bridge::parse_flake_reference("nixpkgs").unwrap();
/// let _ = flakeref_bridge::flake_reference_to_string(handle);
/// let _ = flakeref_bridge::flake_reference_to_string(handle); // use after move
/// ```
///
/// [`FlakeRefBridge::parse_flake_reference`]: crate::FlakeRefBridge::parse_flake_reference
/// [`FlakeRefBridge::flake_reference_to_string`]: crate::FlakeRefBridge::flake_reference_to_string
#[must_use = "a parsed reference does nothing until it is rendered"]
pub struct ReferenceHandle<T> {
    reference: T,
}

impl<T> ReferenceHandle<T> {
    pub(crate) const fn new(reference: T) -> Self {
        Self { reference }
    }

    pub(crate) fn into_reference(self) -> T {
        self.reference
    }
}

impl<T> fmt::Debug for ReferenceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_opaque() {
        let handle = ReferenceHandle::new(String::from("secret-internals"));
        let debug = format!("{handle:?}");
        assert_eq!(debug, "ReferenceHandle { .. }");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_into_reference_moves_value() {
        let handle = ReferenceHandle::new(vec![1, 2, 3]);
        assert_eq!(handle.into_reference(), vec![1, 2, 3]);
    }

    #[test]
    fn test_handle_is_send_when_reference_is() {
        fn assert_send<T: Send>() {}
        assert_send::<ReferenceHandle<flakeref::FlakeRef>>();
    }
}
