use std::path::PathBuf;
use std::process::Command;

/// Expose the short git SHA as `TRIAGE_BUILD_SHA` for `triage --version`.
fn main() {
    let manifest_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let repo_root = manifest_dir.join("..");

    println!("cargo:rerun-if-changed={}", repo_root.join(".git/HEAD").display());

    let sha = Command::new("git")
        .arg("-C")
        .arg(&repo_root)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=TRIAGE_BUILD_SHA={sha}");
}
