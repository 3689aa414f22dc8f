//! Relative references follow the working directory at call time

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flakeref_bridge::{FlakeRefBridge, flake_reference_to_string, parse_flake_reference};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Switches the working directory and restores it on drop
struct CwdGuard {
    previous: PathBuf,
}

impl CwdGuard {
    fn enter(dir: &Path) -> Self {
        let previous = env::current_dir().expect("read cwd");
        env::set_current_dir(dir).expect("set cwd");
        Self { previous }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}

fn render(input: &str) -> String {
    flake_reference_to_string(parse_flake_reference(input).unwrap()).unwrap()
}

#[test]
#[serial]
fn test_dot_renders_absolute_current_dir() {
    let temp = TempDir::new().unwrap();
    let _guard = CwdGuard::enter(temp.path());
    let cwd = env::current_dir().unwrap();

    let rendered = render(".");
    assert_eq!(rendered, format!("path:{}", cwd.display()));
    assert!(Path::new(rendered.trim_start_matches("path:")).is_absolute());
}

#[test]
#[serial]
fn test_relative_reference_follows_cwd_changes() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let in_first = {
        let _guard = CwdGuard::enter(first.path());
        (render("./flake"), env::current_dir().unwrap())
    };
    let in_second = {
        let _guard = CwdGuard::enter(second.path());
        (render("./flake"), env::current_dir().unwrap())
    };

    assert_eq!(in_first.0, format!("path:{}", in_first.1.join("flake").display()));
    assert_eq!(in_second.0, format!("path:{}", in_second.1.join("flake").display()));
    assert_ne!(in_first.0, in_second.0);
}

#[test]
#[serial]
fn test_bridge_reads_cwd_per_call() {
    let temp = TempDir::new().unwrap();
    let bridge = FlakeRefBridge::default();

    let before = bridge
        .flake_reference_to_string(bridge.parse_flake_reference(".").unwrap())
        .unwrap();
    let after = {
        let _guard = CwdGuard::enter(temp.path());
        bridge
            .flake_reference_to_string(bridge.parse_flake_reference(".").unwrap())
            .unwrap()
    };

    assert_ne!(before, after);
}

#[test]
#[serial]
fn test_parent_segments_are_normalised() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("child")).unwrap();
    let _guard = CwdGuard::enter(&temp.path().join("child"));
    let parent = env::current_dir().unwrap().parent().unwrap().to_path_buf();

    assert_eq!(
        render("../sibling"),
        format!("path:{}", parent.join("sibling").display())
    );
}

#[test]
#[serial]
fn test_relative_fixed_base_joins_cwd() {
    let temp = TempDir::new().unwrap();
    let _guard = CwdGuard::enter(temp.path());
    let cwd = env::current_dir().unwrap();

    let bridge = FlakeRefBridge::builder().base_directory("nested").build();
    let handle = bridge.parse_flake_reference("./app").unwrap();
    assert_eq!(
        bridge.flake_reference_to_string(handle).unwrap(),
        format!("path:{}", cwd.join("nested/app").display())
    );
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_removed_cwd_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let doomed = temp.path().join("doomed");
    std::fs::create_dir(&doomed).unwrap();
    let _guard = CwdGuard::enter(&doomed);
    std::fs::remove_dir(&doomed).unwrap();

    let err = parse_flake_reference(".").unwrap_err();
    assert!(err.is_parse());
    assert!(err.message().contains("base directory"));
}
