//! Integration tests for the `resbuild` binary
//!
//! These tests create throwaway working directories and run the compiled
//! binary against them, checking exit codes, messages and generated files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

const LOCK_FILE: &str = "resource-builder.lock";

fn resbuild() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_resbuild"))
}

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(resbuild())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute resbuild")
}

/// Create a working directory with a manifest and the two-icon tree.
fn create_assets(patterns: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(dir.path().join("icons")).unwrap();
    fs::write(dir.path().join("icons/a.svg"), vec![b'a'; 10]).unwrap();
    fs::write(dir.path().join("icons/b.svg"), vec![b'b'; 20]).unwrap();
    fs::write(
        dir.path().join("resources.json"),
        format!(
            r#"{{"resources": [{}], "output": "build", "project_name": "badge"}}"#,
            patterns
        ),
    )
    .unwrap();
    dir
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_empty_selection_generates_files() {
    let dir = create_assets(r#""*.none""#);

    let output = run(&["build", "."], dir.path());
    assert!(output.status.success(), "Build failed: {}", combined(&output));

    let build = dir.path().join("build");
    let header = fs::read_to_string(build.join("include/badge/resources.h")).unwrap();
    assert!(header.contains("enum class ResId {\n};"));
    assert!(build.join("src/resources.cpp").exists());
    assert!(build.join("CMakeLists.txt").exists());
    assert!(!dir.path().join(LOCK_FILE).exists());
}

#[test]
fn test_default_command_is_build() {
    let dir = create_assets("");
    let output = run(&[], dir.path());
    assert!(output.status.success(), "Build failed: {}", combined(&output));
    assert!(dir.path().join("build/CMakeLists.txt").exists());
}

#[test]
fn test_missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["build"], dir.path());
    assert!(!output.status.success());
    assert!(combined(&output).contains("resources.json"));
}

#[test]
fn test_missing_work_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["build", "does-not-exist"], dir.path());
    assert!(!output.status.success());
    assert!(combined(&output).contains("does not exist"));
}

#[test]
fn test_stuck_lock_times_out() {
    let dir = create_assets(r#""*.svg""#);
    fs::write(dir.path().join(LOCK_FILE), "").unwrap();

    let output = run(&["build", ".", "--timeout", "0.3"], dir.path());
    assert!(!output.status.success());
    let text = combined(&output);
    assert!(text.contains(LOCK_FILE), "message should name the marker: {text}");
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_lock_released_by_other_instance() {
    let dir = create_assets(r#""*.svg""#);
    let marker = dir.path().join(LOCK_FILE);
    fs::write(&marker, "").unwrap();

    let remover = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        fs::remove_file(marker).unwrap();
    });

    let output = run(&["build", ".", "--timeout", "10"], dir.path());
    remover.join().unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    assert!(combined(&output).contains("another instance"));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_unlock_removes_marker() {
    let dir = create_assets(r#""*.svg""#);
    fs::write(dir.path().join(LOCK_FILE), "").unwrap();

    let output = run(&["unlock"], dir.path());
    assert!(output.status.success());
    assert!(!dir.path().join(LOCK_FILE).exists());
}

#[test]
fn test_list_shows_enumerators() {
    let dir = create_assets(r#""*.svg""#);
    let output = run(&["list"], dir.path());
    assert!(output.status.success(), "{}", combined(&output));

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("ICONS_A_SVG"));
    assert!(text.contains("icons/b.svg"));
    assert!(text.contains("20 B"));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_collision_is_a_configuration_error() {
    let dir = create_assets(r#""*.svg", "icons/a_svg""#);
    fs::write(dir.path().join("icons/a_svg"), "dup").unwrap();

    let output = run(&["build"], dir.path());
    assert!(!output.status.success());
    assert!(combined(&output).contains("ICONS_A_SVG"));
    assert!(!dir.path().join(LOCK_FILE).exists());
}

/// Full ELF build with the system objcopy, when one is available.
#[test]
#[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
fn test_elf_build_with_objcopy() {
    let has_objcopy = Command::new("objcopy")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !has_objcopy {
        eprintln!("Skipping test: objcopy not found");
        return;
    }

    let dir = create_assets(r#""*.svg""#);
    let output = run(&["build", "-v"], dir.path());
    assert!(output.status.success(), "Build failed: {}", combined(&output));

    let build = dir.path().join("build");
    let header = fs::read_to_string(build.join("include/badge/resources.h")).unwrap();
    assert!(header.contains("ICONS_A_SVG = 0"));
    assert!(header.contains("ICONS_B_SVG = 1"));
    assert!(build.join("objs/icons_a_svg.o").exists());
    assert!(build.join("objs/icons_b_svg.o").exists());

    link_and_check_sizes(dir.path(), &build);

    // second run with one resource gone prunes only its object
    fs::remove_file(dir.path().join("icons/b.svg")).unwrap();
    let output = run(&["build"], dir.path());
    assert!(output.status.success(), "Rebuild failed: {}", combined(&output));
    assert!(build.join("objs/icons_a_svg.o").exists());
    assert!(!build.join("objs/icons_b_svg.o").exists());
}

/// Compile a small program against the generated library and check the
/// embedded data from inside C++. Skipped when no C++ compiler is installed.
#[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
fn link_and_check_sizes(work_dir: &Path, build: &Path) {
    let has_cxx = Command::new("c++")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !has_cxx {
        eprintln!("Skipping link check: c++ not found");
        return;
    }

    let main_cpp = work_dir.join("main.cpp");
    fs::write(
        &main_cpp,
        r#"#include <badge/resources.h>
#include <iostream>

int main() {
    using namespace badge::resources;
    std::cout << get_resource_size(ResId::ICONS_A_SVG) << " "
              << get_resource_size(ResId::ICONS_B_SVG) << " "
              << get_resource_text(ResId::ICONS_A_SVG) << " "
              << get_resource_list().size() << std::endl;
    return 0;
}
"#,
    )
    .unwrap();

    let binary = work_dir.join("resource_check");
    let compiled = Command::new("c++")
        .arg("-std=c++11")
        .arg("-I")
        .arg(build.join("include"))
        .arg(&main_cpp)
        .arg(build.join("src/resources.cpp"))
        .arg(build.join("objs/icons_a_svg.o"))
        .arg(build.join("objs/icons_b_svg.o"))
        .arg("-o")
        .arg(&binary)
        .output()
        .expect("Failed to run c++");
    assert!(compiled.status.success(), "Link failed: {}", combined(&compiled));

    let output = Command::new(&binary).output().expect("Failed to run linked program");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("10 20 {} 2", "a".repeat(10))
    );
}
