use anyhow::{Context, Result};
use vergen::EmitBuilder;

/// Git metadata shown by `skydive-phases --version`
fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()
        .context("Failed to emit git metadata")
}
