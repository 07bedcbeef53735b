use std::process::Command;

const COMMIT_ENV: &str = "APP_VERSION_GIT_COMMIT";

/// `git describe` of the checkout, `-dirty` when the tree has changes.
fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--match=NeVeRmAtCh", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let commit = String::from_utf8(output.stdout).ok()?;
    let commit = commit.trim();
    (!commit.is_empty()).then(|| commit.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    vergen::EmitBuilder::builder()
        .build_timestamp()
        .all_git()
        .emit()?;

    // CI may pin the commit, e.g. when building from a source tarball.
    let commit = std::env::var(COMMIT_ENV)
        .ok()
        .filter(|commit| !commit.is_empty())
        .or_else(git_commit)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rerun-if-env-changed={COMMIT_ENV}");
    println!("cargo:rustc-env={COMMIT_ENV}={commit}");
    Ok(())
}
