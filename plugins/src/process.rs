//! Bounded subprocess invocation for collaborator CLIs.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use opsgate_core::api::ToolError;

pub fn normalize_exit(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(sig) = status.signal() {
            128 + sig
        } else {
            1
        }
    }
    #[cfg(windows)]
    {
        status.code().unwrap_or(1)
    }
}

const STDERR_TAIL: usize = 400;

/// Run `program args..`, returning stdout. The child is killed on timeout.
pub async fn run_captured(
    program: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ToolError> {
    let name = program.display().to_string();
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: name.clone(),
            source,
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(res) => res.map_err(|source| ToolError::Spawn {
            program: name.clone(),
            source,
        })?,
        Err(_) => {
            return Err(ToolError::Timeout {
                program: name,
                secs: timeout.as_secs(),
            })
        }
    };

    let code = normalize_exit(output.status);
    if code != 0 {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let tail_start = stderr
            .char_indices()
            .rev()
            .nth(STDERR_TAIL)
            .map(|(i, _)| i)
            .unwrap_or(0);
        return Err(ToolError::Failed {
            program: name,
            code,
            stderr: stderr[tail_start..].to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
