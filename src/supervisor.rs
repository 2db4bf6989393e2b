//! Start-if-not-running supervision for the sync service executable.
//!
//! The packaged install ships a `SyncService` binary next to this one; a
//! successfully paired client may ask the host to make sure it is running.
//! This capability is deliberately separate from the pairing check itself.

use std::process::Command;

use sysinfo::{ProcessesToUpdate, System};
use tracing::info;

use crate::error::{Error, Result};

/// Base name of the packaged service executable, without platform suffix.
pub const SYNC_SERVICE_NAME: &str = "SyncService";

pub fn service_exe_name() -> String {
    format!("{}{}", SYNC_SERVICE_NAME, std::env::consts::EXE_SUFFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    AlreadyRunning(u32),
    Launched,
}

/// Pid of a running process whose name contains `name`, if any.
pub fn running_pid(name: &str) -> Option<u32> {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);
    sys.processes().iter().find_map(|(pid, process)| {
        process
            .name()
            .to_string_lossy()
            .contains(name)
            .then(|| pid.as_u32())
    })
}

/// Ensure the sync service is running: report an existing instance, or
/// locate the executable next to the current binary and launch it as an
/// independent child, non-blocking.
pub fn ensure_running() -> Result<LaunchStatus> {
    let exe_name = service_exe_name();

    if let Some(pid) = running_pid(&exe_name) {
        info!("[Pair] {exe_name} already running (pid {pid})");
        return Ok(LaunchStatus::AlreadyRunning(pid));
    }

    let base_dir = crate::config::exe_dir();
    let exe_path = base_dir.join(&exe_name);
    if !exe_path.exists() {
        return Err(Error::ExecutableNotFound(exe_name));
    }

    Command::new(&exe_path)
        .current_dir(&base_dir)
        .spawn()
        .map_err(|e| Error::LaunchFailed(e.to_string()))?;

    info!("[Pair] {exe_name} started");
    Ok(LaunchStatus::Launched)
}
