use std::process::Command;

/// Commit hash reported by the home endpoint. Container builds without a
/// .git directory pass it through WRAPPED_GIT_HASH.
fn git_hash() -> Option<String> {
    if let Ok(hash) = std::env::var("WRAPPED_GIT_HASH") {
        return Some(hash);
    }
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

fn main() {
    let hash = git_hash()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", hash);

    println!("cargo:rerun-if-env-changed=WRAPPED_GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
