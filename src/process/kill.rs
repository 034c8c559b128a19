use super::ProcessError;

/// Forcefully terminates `pid`. A process that is already gone counts as killed.
pub fn kill(pid: u32) -> Result<(), ProcessError> {
    if pid == 0 {
        return Err(ProcessError::Kill {
            pid,
            reason: "refusing to signal pid 0".to_string(),
        });
    }
    kill_forcefully(pid)
}

#[cfg(unix)]
fn kill_forcefully(pid: u32) -> Result<(), ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| ProcessError::Kill {
        pid,
        reason: "pid is out of range".to_string(),
    })?;
    match kill(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(err) => Err(ProcessError::Kill {
            pid,
            reason: err.to_string(),
        }),
    }
}

#[cfg(windows)]
const TASKKILL_NOT_FOUND: i32 = 128;

#[cfg(windows)]
fn kill_forcefully(pid: u32) -> Result<(), ProcessError> {
    let output = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .output()
        .map_err(|err| ProcessError::Kill {
            pid,
            reason: format!("failed to run taskkill: {err}"),
        })?;
    if output.status.success() || output.status.code() == Some(TASKKILL_NOT_FOUND) {
        return Ok(());
    }
    Err(ProcessError::Kill {
        pid,
        reason: format!(
            "taskkill exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    })
}

#[cfg(not(any(unix, windows)))]
fn kill_forcefully(pid: u32) -> Result<(), ProcessError> {
    Err(ProcessError::Kill {
        pid,
        reason: format!("killing processes is not supported on {}", std::env::consts::OS),
    })
}
