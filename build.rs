//! Embeds a version string for `dotai version` and the log file header.
use std::process::Command;

fn main() {
    // Prefer DOTAI_VERSION if the release workflow sets it, otherwise fall
    // back to git describe for local builds.
    if let Ok(version) = std::env::var("DOTAI_VERSION") {
        println!("cargo:rustc-env=DOTAI_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=DOTAI_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DOTAI_VERSION");
}
