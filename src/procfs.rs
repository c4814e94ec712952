//! [`ProcessTable`] implementation backed by Linux `/proc`.

use crate::traits::ProcessTable;
use crate::types::ProcessId;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Errors from reading `/proc` or starting a process.
#[derive(Debug, thiserror::Error)]
#[error("procfs error: {0}")]
pub struct ProcFsError(String);

/// Process table read from a procfs mount (normally `/proc`).
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcFs {
    pub fn new() -> Self {
        Self::at("/proc")
    }

    /// Use a procfs mounted somewhere other than `/proc`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessTable for ProcFs {
    type Error = ProcFsError;

    fn process_ids(&self) -> Result<Vec<ProcessId>, Self::Error> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| ProcFsError(format!("read {}: {}", self.root.display(), e)))?;
        Ok(entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse::<ProcessId>().ok())
            .collect())
    }

    /// The basename of `/proc/<pid>/exe`, or `comm` when the link is not
    /// readable (kernel threads, other users' processes).
    fn process_name(&self, pid: ProcessId) -> Result<String, Self::Error> {
        let dir = self.root.join(pid.to_string());
        if let Ok(target) = std::fs::read_link(dir.join("exe")) {
            if let Some(name) = target.file_name().and_then(|n| n.to_str()) {
                // The link target of a replaced binary carries this suffix.
                return Ok(name.trim_end_matches(" (deleted)").to_string());
            }
        }
        std::fs::read_to_string(dir.join("comm"))
            .map(|comm| comm.trim_end().to_string())
            .map_err(|e| ProcFsError(format!("pid {}: {}", pid, e)))
    }

    /// `hidden` has no meaning for X11/Wayland clients and is ignored.
    fn spawn(&self, path: &str, hidden: bool) -> Result<ProcessId, Self::Error> {
        log::debug!("spawning {} (hidden={})", path, hidden);
        let child = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProcFsError(format!("{}: {}", path, e)))?;
        Ok(child.id())
    }
}
