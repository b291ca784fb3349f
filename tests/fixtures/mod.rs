//! Test fixtures for config.xml golden assertions
//!
//! Each fixture project is a directory holding a `config.xml`. Tests copy a
//! fixture into a temp directory so the original is never modified.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Platform line terminator, as written with the default settings
pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Path to a fixture project directory
pub fn fixture_project(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/projects")
        .join(name)
}

/// Copy a fixture project into a fresh temp directory
pub fn copy_project(name: &str) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let source = fixture_project(name).join("config.xml");
    fs::copy(&source, dir.path().join("config.xml")).expect("copy fixture config.xml");
    dir
}

/// Write `contents` as config.xml into a fresh temp directory
pub fn project_with(contents: &str) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join("config.xml"), contents).expect("write config.xml");
    dir
}

/// Read back a project's config.xml
pub fn read_config(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("config.xml")).expect("read config.xml")
}

/// Join lines with the platform terminator, including a trailing one
pub fn lines(lines: &[&str]) -> String {
    let mut out = lines.join(EOL);
    out.push_str(EOL);
    out
}
