//! End-to-end tests for the boundary functions over the native resolver

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flakeref_bridge::{
    BridgeError, FlakeRef, FlakeRefBridge, flake_reference_to_string, parse_flake_reference,
};
use std::path::Path;

fn roundtrip(input: &str) -> String {
    let handle = parse_flake_reference(input).unwrap();
    flake_reference_to_string(handle).unwrap()
}

#[test]
fn test_github_reference() {
    let rendered = roundtrip("github:owner/repo");
    assert!(rendered.starts_with("github:owner/repo"));
}

#[test]
fn test_github_nixpkgs() {
    assert_eq!(roundtrip("github:NixOS/nixpkgs"), "github:NixOS/nixpkgs");
}

#[test]
fn test_empty_input_is_parse_error() {
    let err = parse_flake_reference("").unwrap_err();
    assert!(matches!(err, BridgeError::ReferenceParse { .. }));
}

#[test]
fn test_whitespace_input_is_parse_error() {
    for input in ["   ", "\t", " \n "] {
        let err = parse_flake_reference(input).unwrap_err();
        assert!(err.is_parse(), "{input:?} should fail to parse");
    }
}

#[test]
fn test_unknown_scheme_is_parse_error() {
    let err = parse_flake_reference("not-a-scheme::!!").unwrap_err();
    assert!(err.is_parse());
    assert!(err.message().contains("is unsupported"));
}

#[test]
fn test_resolver_message_is_forwarded() {
    let err = parse_flake_reference("github:owner/repo/a/b").unwrap_err();
    match err {
        BridgeError::ReferenceParse { input, message } => {
            assert_eq!(input, "github:owner/repo/a/b");
            let native = FlakeRef::parse("github:owner/repo/a/b", Path::new("/")).unwrap_err();
            assert_eq!(message, native.to_string());
        }
        BridgeError::ReferenceRender { .. } => panic!("expected a parse error"),
    }
}

#[test]
fn test_valid_references_render_non_empty() {
    let inputs = [
        "nixpkgs",
        "flake:nixpkgs/nixos-24.05",
        "github:NixOS/nixpkgs/nixos-24.05",
        "gitlab:veloren/veloren",
        "sourcehut:~misterio/nix-colors",
        "git+https://example.org/repo.git?ref=main",
        "hg+https://example.org/repo",
        "https://example.org/archive.tar.gz",
        "path:/nix/store/abc-source",
        "/tmp/flake",
    ];
    for input in inputs {
        let rendered = roundtrip(input);
        assert!(!rendered.is_empty(), "{input} rendered empty");
    }
}

#[test]
fn test_parse_is_deterministic() {
    for input in ["github:owner/repo", "nixpkgs", ".", "./sub/dir"] {
        assert_eq!(roundtrip(input), roundtrip(input));
    }
}

#[test]
fn test_rendered_form_reparses_to_itself() {
    for input in ["nixpkgs/nixos-24.05", "github:NixOS/nixpkgs?dir=lib", "git://example.org/repo"] {
        let once = roundtrip(input);
        assert_eq!(roundtrip(&once), once);
    }
}

#[test]
fn test_handles_are_independent() {
    let first = parse_flake_reference("github:a/b").unwrap();
    let second = parse_flake_reference("github:c/d").unwrap();
    assert_eq!(flake_reference_to_string(second).unwrap(), "github:c/d");
    assert_eq!(flake_reference_to_string(first).unwrap(), "github:a/b");
}

#[test]
fn test_fragment_is_split_and_decoded() {
    let bridge = FlakeRefBridge::default();
    let (handle, fragment) = bridge
        .parse_flake_reference_with_fragment("github:NixOS/nixpkgs#packages.x86_64-linux.hello")
        .unwrap();
    assert_eq!(fragment.as_deref(), Some("packages.x86_64-linux.hello"));
    assert_eq!(
        bridge.flake_reference_to_string(handle).unwrap(),
        "github:NixOS/nixpkgs"
    );

    let (_, fragment) = bridge
        .parse_flake_reference_with_fragment("nixpkgs#foo%20bar")
        .unwrap();
    assert_eq!(fragment.as_deref(), Some("foo bar"));

    let (_, fragment) = bridge.parse_flake_reference_with_fragment("nixpkgs#").unwrap();
    assert_eq!(fragment, None);
}

#[test]
fn test_fragment_with_invalid_utf8_is_parse_error() {
    let err = FlakeRefBridge::default()
        .parse_flake_reference_with_fragment("nixpkgs#bad%FF")
        .unwrap_err();
    assert!(err.is_parse());
    assert!(err.message().contains("percent-encoding"));
}

#[test]
fn test_plain_parse_rejects_fragment() {
    let err = parse_flake_reference("github:NixOS/nixpkgs#hello").unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn test_input_limit() {
    let bridge = FlakeRefBridge::builder().max_input_length(10).build();
    let err = bridge.parse_flake_reference("github:NixOS/nixpkgs").unwrap_err();
    assert!(err.is_parse());
    assert!(bridge.parse_flake_reference("nixpkgs").is_ok());
}

#[test]
fn test_output_limit_is_render_error() {
    let bridge = FlakeRefBridge::builder().max_output_length(8).build();
    let handle = bridge.parse_flake_reference("github:NixOS/nixpkgs").unwrap();
    let err = bridge.flake_reference_to_string(handle).unwrap_err();
    assert!(err.is_render());
}

#[test]
fn test_handle_debug_is_opaque() {
    let handle = parse_flake_reference("github:NixOS/nixpkgs").unwrap();
    assert_eq!(format!("{handle:?}"), "ReferenceHandle { .. }");
}

#[test]
fn test_concurrent_use() {
    let threads: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let input = format!("github:owner/repo{i}");
                let handle = parse_flake_reference(&input).unwrap();
                flake_reference_to_string(handle).unwrap()
            })
        })
        .collect();

    for (i, thread) in threads.into_iter().enumerate() {
        assert_eq!(thread.join().unwrap(), format!("github:owner/repo{i}"));
    }
}
