//! Build script for papilio-id
//!
//! Exposes build identification to the binaries as compile-time env vars:
//! `PAPILIO_GIT_HASH`, `PAPILIO_BUILD_TIMESTAMP`, `PAPILIO_BUILD_PROFILE`.

use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn main() {
    let git_hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());

    // RFC 3339 with local offset, seconds precision
    let timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=PAPILIO_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=PAPILIO_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=PAPILIO_BUILD_PROFILE={}", profile);
}
