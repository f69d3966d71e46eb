//! Embeds the revision, build date and profile logged by web-music-control at startup

use std::process::Command;

/// `git describe` of the working tree, `None` outside a repository
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!revision.is_empty()).then_some(revision)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    let built = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=WMC_GIT_REVISION={}", revision);
    println!("cargo:rustc-env=WMC_BUILD_DATE={}", built);
    println!("cargo:rustc-env=WMC_BUILD_PROFILE={}", profile);
}
