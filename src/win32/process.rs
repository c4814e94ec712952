//! Process enumeration through a Toolhelp snapshot.

use super::Win32Error;
use crate::traits::ProcessTable;
use crate::types::ProcessId;
use std::os::windows::process::CommandExt;
use std::process::Command;
use windows::Win32::Foundation::{CloseHandle, FALSE, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, CREATE_NO_WINDOW, PROCESS_NAME_FORMAT,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::core::PWSTR;

/// Windows process table.
#[derive(Debug, Default)]
pub struct Win32Processes;

impl Win32Processes {
    pub fn new() -> Self {
        Self
    }
}

/// Closes the wrapped handle on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn utf16_until_nul(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

impl ProcessTable for Win32Processes {
    type Error = Win32Error;

    fn process_ids(&self) -> Result<Vec<ProcessId>, Self::Error> {
        let mut pids = Vec::new();
        unsafe {
            let snapshot = OwnedHandle(CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)?);
            let mut entry = PROCESSENTRY32W {
                dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };
            if Process32FirstW(snapshot.0, &mut entry).is_ok() {
                loop {
                    pids.push(entry.th32ProcessID);
                    if Process32NextW(snapshot.0, &mut entry).is_err() {
                        break;
                    }
                }
            }
        }
        Ok(pids)
    }

    fn process_name(&self, pid: ProcessId) -> Result<String, Self::Error> {
        if pid == 0 {
            return Err(Win32Error::new("pid 0 is the idle process"));
        }
        unsafe {
            let handle = OwnedHandle(OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid)?);
            let mut buf = [0u16; 260];
            let mut len = buf.len() as u32;
            QueryFullProcessImageNameW(
                handle.0,
                PROCESS_NAME_FORMAT(0),
                PWSTR(buf.as_mut_ptr()),
                &mut len,
            )?;
            let path = utf16_until_nul(&buf[..len as usize]);
            Ok(crate::profile::file_name(&path).to_string())
        }
    }

    fn spawn(&self, path: &str, hidden: bool) -> Result<ProcessId, Self::Error> {
        let mut command = Command::new(path);
        if hidden {
            command.creation_flags(CREATE_NO_WINDOW.0);
        }
        let child = command
            .spawn()
            .map_err(|e| Win32Error::new(format!("{}: {}", path, e)))?;
        Ok(child.id())
    }
}
