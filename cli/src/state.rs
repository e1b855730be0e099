//! Files a running bot shares with `status` and `stop` invocations.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sniper_core::api::CliError;

const STATE_FILE: &str = "sniper.state";
const STOP_FILE: &str = "sniper.stop";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotState {
    pub session_id: String,
    pub pid: u32,
    pub url: String,
    pub metrics_path: String,
    pub started_at: String,
}

/// `~/.sniper/run`, created on demand.
pub fn runtime_dir() -> Result<PathBuf, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Command("Cannot find home directory".to_string()))?;
    let dir = home.join(".sniper").join("run");
    fs::create_dir_all(&dir)
        .map_err(|e| CliError::Command(format!("Failed to create runtime directory: {e}")))?;
    Ok(dir)
}

pub fn state_file(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

pub fn stop_file(dir: &Path) -> PathBuf {
    dir.join(STOP_FILE)
}

pub fn write_state(dir: &Path, state: &BotState) -> Result<PathBuf, CliError> {
    let path = state_file(dir);
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| CliError::Command(format!("Failed to serialize state: {e}")))?;
    fs::write(&path, json)
        .map_err(|e| CliError::Command(format!("Failed to write state file: {e}")))?;
    tracing::info!(target: "sniper.cli", path = %path.display(), "state file written");
    Ok(path)
}

/// The state file's contents, whether or not its process is still alive.
pub fn read_state(dir: &Path) -> Result<Option<BotState>, CliError> {
    let path = state_file(dir);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    let state = serde_json::from_str(&raw)
        .map_err(|e| CliError::Command(format!("Corrupt state file {}: {e}", path.display())))?;
    Ok(Some(state))
}

/// Whether `pid` names a live process on this machine.
pub fn is_alive(pid: u32) -> bool {
    let mut sys = sysinfo::System::new();
    sys.refresh_processes();
    sys.process(sysinfo::Pid::from_u32(pid)).is_some()
}

/// The running bot's state. A state file left by a process that died
/// without shutting down is removed and reported as `None`.
pub fn read_live_state(dir: &Path) -> Result<Option<BotState>, CliError> {
    let Some(state) = read_state(dir)? else {
        return Ok(None);
    };
    if is_alive(state.pid) {
        return Ok(Some(state));
    }
    tracing::warn!(
        target: "sniper.cli",
        pid = state.pid,
        session = %state.session_id,
        "removing stale state file"
    );
    match fs::remove_file(state_file(dir)) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CliError::Command(format!(
                "Failed to remove stale state file: {e}"
            )))
        }
    }
    Ok(None)
}

pub fn request_stop(dir: &Path) -> Result<PathBuf, CliError> {
    let path = stop_file(dir);
    fs::write(&path, chrono::Local::now().to_rfc3339())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> BotState {
        BotState {
            session_id: "7d1c".into(),
            pid: 4242,
            url: "https://store.test/ship".into(),
            metrics_path: "checkout_metrics.json".into(),
            started_at: "2026-10-16T09:00:00+00:00".into(),
        }
    }

    #[test]
    fn no_state_file_means_not_running() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_state(dir.path()).unwrap(), None);
    }

    #[test]
    fn written_state_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = write_state(dir.path(), &sample()).unwrap();
        assert_eq!(path, state_file(dir.path()));
        assert_eq!(read_state(dir.path()).unwrap(), Some(sample()));
    }

    #[test]
    fn live_process_keeps_its_state() {
        let dir = TempDir::new().unwrap();
        let state = BotState {
            pid: std::process::id(),
            ..sample()
        };
        write_state(dir.path(), &state).unwrap();
        assert_eq!(read_live_state(dir.path()).unwrap(), Some(state));
    }

    #[test]
    fn dead_process_state_is_dropped() {
        let dir = TempDir::new().unwrap();
        let state = BotState {
            pid: u32::MAX - 7,
            ..sample()
        };
        write_state(dir.path(), &state).unwrap();
        assert!(!is_alive(state.pid));
        assert_eq!(read_live_state(dir.path()).unwrap(), None);
        assert!(!state_file(dir.path()).exists());
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(state_file(dir.path()), "{not json").unwrap();
        assert!(read_state(dir.path()).is_err());
    }

    #[test]
    fn stop_request_creates_the_stop_file() {
        let dir = TempDir::new().unwrap();
        let path = request_stop(dir.path()).unwrap();
        assert!(path.exists());
        assert_eq!(path, stop_file(dir.path()));
    }
}
