//! `llvm-cov show` invocation

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Arguments passed after the configured llvm-cov command.
pub fn show_args(binary: &Path, profdata: &Path) -> Vec<String> {
    vec![
        "show".to_string(),
        "-show-line-counts-or-regions".to_string(),
        binary.display().to_string(),
        format!("-instr-profile={}", profdata.display()),
    ]
}

/// Run `llvm-cov show` in `work_dir` and capture the report text.
///
/// `command` is the program followed by any leading arguments, e.g.
/// `["xcrun", "llvm-cov"]`.
pub fn run_llvm_cov_show(
    command: &[String],
    binary: &Path,
    profdata: &Path,
    work_dir: &Path,
) -> Result<String> {
    let (program, leading) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("No llvm-cov command configured"))?;

    tracing::debug!("Running {} {}", command.join(" "), show_args(binary, profdata).join(" "));

    let output = Command::new(program)
        .args(leading)
        .args(show_args(binary, profdata))
        .current_dir(work_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to execute {}", command.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() && stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} show failed: {}", command.join(" "), stderr.trim());
    }

    Ok(stdout)
}
