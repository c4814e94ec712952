//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Hyprland has no notion of a minimized window or a primary monitor, so
//! this backend maps them: minimizing moves the client to the
//! `special:minimized` workspace, and the monitor positioned at the layout
//! origin `(0, 0)` is reported as primary.

use crate::traits::WindowManager;
use crate::types::{MonitorDescriptor, ProcessId, Rect, WindowHandle};
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Workspace used to park minimized clients.
const MINIMIZED_WORKSPACE: &str = "special:minimized";

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
///
/// Each [`visible_windows`](WindowManager::visible_windows) call keeps the
/// client list it fetched; owner and title lookups on those handles are
/// answered from it, so one discovery pass costs a single `j/clients`
/// request.
pub struct HyprlandWm {
    snapshot: Mutex<Vec<ClientJson>>,
}

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self::new()
    }
}

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(Vec::new()),
        }
    }

    /// Whether a Hyprland instance is reachable from this environment.
    pub fn is_available() -> bool {
        std::env::var_os("HYPRLAND_INSTANCE_SIGNATURE").is_some()
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and parse the response.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json)
        .map_err(|e| HyprlandWmError(format!("parse {}: {}", data_command, e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("dispatch {}: {}", args, response.trim())))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct WorkspaceRef {
    id: i64,
    #[serde(default)]
    name: String,
}

/// Subset of the JSON objects returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default)]
    title: String,
    pid: i64,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    floating: bool,
    /// A bool on older Hyprland releases, a fullscreen mode number on newer.
    #[serde(default)]
    fullscreen: serde_json::Value,
    workspace: WorkspaceRef,
}

fn yes() -> bool {
    true
}

impl ClientJson {
    fn handle(&self) -> Option<WindowHandle> {
        parse_address(&self.address).map(WindowHandle)
    }

    /// Mapped clients on regular workspaces, plus those parked by
    /// `minimize` so a rerun can find them again.
    fn is_visible(&self) -> bool {
        let ws = &self.workspace.name;
        self.mapped && !self.hidden && (!ws.starts_with("special:") || ws == MINIMIZED_WORKSPACE)
    }

    fn is_fullscreen(&self) -> bool {
        match &self.fullscreen {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
            _ => false,
        }
    }
}

/// Parse a Hyprland client address such as `"0x55d4c3a1b2c0"`.
fn parse_address(address: &str) -> Option<u64> {
    let hex = address.trim().trim_start_matches("0x");
    u64::from_str_radix(hex, 16).ok()
}

/// Format a handle the way Hyprland dispatchers expect it.
fn address_selector(window: WindowHandle) -> String {
    format!("address:0x{:x}", window.0)
}

fn clients() -> Result<Vec<ClientJson>, HyprlandWmError> {
    ipc_json("clients")
}

fn client(window: WindowHandle) -> Result<ClientJson, HyprlandWmError> {
    clients()?
        .into_iter()
        .find(|c| c.handle() == Some(window))
        .ok_or_else(|| HyprlandWmError(format!("no client {}", window)))
}

impl HyprlandWm {
    fn snapshot(&self) -> MutexGuard<'_, Vec<ClientJson>> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remember(&self, clients: Vec<ClientJson>) {
        *self.snapshot() = clients;
    }

    /// Read `field` of `window` from the last listing, falling back to a
    /// fresh `j/clients` query for handles it does not contain.
    fn lookup<T>(
        &self,
        window: WindowHandle,
        field: impl Fn(&ClientJson) -> T,
    ) -> Result<T, HyprlandWmError> {
        if let Some(c) = self.snapshot().iter().find(|c| c.handle() == Some(window)) {
            return Ok(field(c));
        }
        Ok(field(&client(window)?))
    }
}

/// Build monitor descriptors from the `j/monitors` payload.
fn to_descriptors(monitors: Vec<MonitorJson>) -> Vec<MonitorDescriptor> {
    monitors
        .into_iter()
        .enumerate()
        .map(|(index, m)| MonitorDescriptor {
            index,
            origin_x: m.x,
            origin_y: m.y,
            width: m.width,
            height: m.height,
            is_primary: m.x == 0 && m.y == 0,
        })
        .collect()
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn visible_windows(&self) -> Result<Vec<WindowHandle>, Self::Error> {
        let all = clients()?;
        let visible = all
            .iter()
            .filter(|c| c.is_visible())
            .filter_map(ClientJson::handle)
            .collect();
        self.remember(all);
        Ok(visible)
    }

    fn window_pid(&self, window: WindowHandle) -> Result<ProcessId, Self::Error> {
        let pid = self.lookup(window, |c| c.pid)?;
        ProcessId::try_from(pid)
            .map_err(|_| HyprlandWmError(format!("client {} has no pid ({})", window, pid)))
    }

    fn window_title(&self, window: WindowHandle) -> Result<String, Self::Error> {
        self.lookup(window, |c| c.title.clone())
    }

    fn monitors(&self) -> Result<Vec<MonitorDescriptor>, Self::Error> {
        Ok(to_descriptors(ipc_json("monitors")?))
    }

    fn restore(&self, window: WindowHandle) -> Result<(), Self::Error> {
        let c = client(window)?;
        let target = address_selector(window);
        if c.workspace.name == MINIMIZED_WORKSPACE {
            let active: WorkspaceRef = ipc_json("activeworkspace")?;
            ipc_dispatch(&format!("movetoworkspacesilent {},{}", active.id, target))?;
        }
        if c.is_fullscreen() {
            // fullscreenstate acts on the focused window.
            ipc_dispatch(&format!("focuswindow {}", target))?;
            ipc_dispatch("fullscreenstate 0 0")?;
        }
        // Tiled clients ignore pixel moves.
        if !c.floating {
            ipc_dispatch(&format!("setfloating {}", target))?;
        }
        Ok(())
    }

    fn move_resize(&self, window: WindowHandle, rect: Rect) -> Result<(), Self::Error> {
        let target = address_selector(window);
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},{}",
            rect.width, rect.height, target
        ))?;
        ipc_dispatch(&format!("movewindowpixel exact {} {},{}", rect.x, rect.y, target))
    }

    fn maximize(&self, window: WindowHandle) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("focuswindow {}", address_selector(window)))?;
        ipc_dispatch("fullscreenstate 1 -1")
    }

    fn minimize(&self, window: WindowHandle) -> Result<(), Self::Error> {
        ipc_dispatch(&format!(
            "movetoworkspacesilent {},{}",
            MINIMIZED_WORKSPACE,
            address_selector(window)
        ))
    }
}
