//! In-memory process table, window manager and clock for unit tests.
//!
//! [`FakeSystem`] implements both [`ProcessTable`] and [`WindowManager`]
//! over a shared table and records every window operation so tests can
//! assert on the exact sequence issued for a handle.

use crate::profile::file_name;
use crate::traits::{Clock, ProcessTable, WindowManager};
use crate::types::{MonitorDescriptor, ProcessId, Rect, WindowHandle};
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A window operation recorded by [`FakeSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Restore,
    MoveResize(Rect),
    Maximize,
    Minimize,
}

#[derive(Debug, thiserror::Error)]
#[error("fake: {0}")]
pub struct FakeError(pub String);

#[derive(Debug, Clone)]
struct FakeProcess {
    pid: ProcessId,
    /// `None` models a process whose metadata is not readable.
    name: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeWindow {
    handle: WindowHandle,
    pid: ProcessId,
    title: String,
    /// Number of enumerations that must happen before the window shows up.
    hidden_for: usize,
}

/// What spawning an installed path does.
#[derive(Debug, Clone)]
struct Install {
    /// Image name of the process that ends up owning the window.
    owner: String,
    window_title: Option<String>,
    /// Enumerations before the window becomes visible.
    window_delay: usize,
}

#[derive(Debug, Default)]
struct State {
    processes: Vec<FakeProcess>,
    windows: Vec<FakeWindow>,
    monitors: Vec<MonitorDescriptor>,
    installed: HashMap<String, Install>,
    next_pid: ProcessId,
    next_handle: u64,
    ops: Vec<(WindowHandle, Op)>,
    spawned: Vec<(String, bool)>,
    failing: Option<&'static str>,
    list_failure: bool,
}

/// Shared fake OS.
#[derive(Debug)]
pub struct FakeSystem {
    state: Mutex<State>,
    spawn_gate: Mutex<Option<Arc<Gate>>>,
}

/// A latch that blocks waiters until released.
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }

    pub fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }
}

/// A single 1920×1080 primary monitor at the origin.
pub fn single_monitor() -> Vec<MonitorDescriptor> {
    vec![monitor(0, 0, 0, 1920, 1080, true)]
}

/// A 2560×1440 primary on the left and a 1920×1080 secondary on the right.
pub fn dual_monitors() -> Vec<MonitorDescriptor> {
    vec![
        monitor(0, 0, 0, 2560, 1440, true),
        monitor(1, 2560, 0, 1920, 1080, false),
    ]
}

pub fn monitor(
    index: usize,
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
    is_primary: bool,
) -> MonitorDescriptor {
    MonitorDescriptor {
        index,
        origin_x,
        origin_y,
        width,
        height,
        is_primary,
    }
}

impl FakeSystem {
    pub fn new() -> Self {
        Self::with_monitors(single_monitor())
    }

    pub fn with_monitors(monitors: Vec<MonitorDescriptor>) -> Self {
        Self {
            state: Mutex::new(State {
                monitors,
                next_pid: 100,
                next_handle: 0x1000,
                ..State::default()
            }),
            spawn_gate: Mutex::new(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Add a running process and return its id.
    pub fn add_process(&self, name: &str) -> ProcessId {
        let mut s = self.lock();
        push_process(&mut s, Some(name.to_string()))
    }

    /// Add a process whose image name cannot be read.
    pub fn add_unreadable_process(&self) -> ProcessId {
        let mut s = self.lock();
        push_process(&mut s, None)
    }

    /// Add a visible window owned by `pid`.
    pub fn add_window(&self, pid: ProcessId, title: &str) -> WindowHandle {
        let mut s = self.lock();
        push_window(&mut s, pid, title, 0)
    }

    /// Make `path` launchable; the new process opens a window titled
    /// `window_title`, if any.
    pub fn install(&self, path: &str, window_title: Option<&str>) {
        self.install_with(path, file_name(path), window_title, 0);
    }

    /// Make `path` launchable as a launcher that hands off to a process
    /// named `owner`, whose window appears after `window_delay` window
    /// enumerations.
    pub fn install_with(
        &self,
        path: &str,
        owner: &str,
        window_title: Option<&str>,
        window_delay: usize,
    ) {
        self.lock().installed.insert(
            path.to_string(),
            Install {
                owner: owner.to_string(),
                window_title: window_title.map(str::to_string),
                window_delay,
            },
        );
    }

    /// Make the named window operation (`"restore"`, `"move_resize"`,
    /// `"maximize"`, `"minimize"`) fail.
    pub fn fail_on(&self, op: &'static str) {
        self.lock().failing = Some(op);
    }

    /// Block every `spawn` until the returned gate is released.
    pub fn gate_spawns(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.spawn_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Make window enumeration itself fail.
    pub fn fail_window_listing(&self) {
        self.lock().list_failure = true;
    }

    /// Operations issued against `handle`, in order.
    pub fn ops_for(&self, handle: WindowHandle) -> Vec<Op> {
        self.lock()
            .ops
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, op)| *op)
            .collect()
    }

    /// Every window operation issued, in order.
    pub fn ops(&self) -> Vec<(WindowHandle, Op)> {
        self.lock().ops.clone()
    }

    /// Paths passed to `spawn`, with their `hidden` flag.
    pub fn spawned(&self) -> Vec<(String, bool)> {
        self.lock().spawned.clone()
    }

    fn record(&self, handle: WindowHandle, name: &'static str, op: Op) -> Result<(), FakeError> {
        let mut s = self.lock();
        if s.failing == Some(name) {
            return Err(FakeError(format!("{} refused", name)));
        }
        if !s.windows.iter().any(|w| w.handle == handle) {
            return Err(FakeError(format!("no window {}", handle)));
        }
        s.ops.push((handle, op));
        Ok(())
    }
}

fn push_process(s: &mut State, name: Option<String>) -> ProcessId {
    let pid = s.next_pid;
    s.next_pid += 1;
    s.processes.push(FakeProcess { pid, name });
    pid
}

fn push_window(s: &mut State, pid: ProcessId, title: &str, hidden_for: usize) -> WindowHandle {
    let handle = WindowHandle(s.next_handle);
    s.next_handle += 1;
    s.windows.push(FakeWindow {
        handle,
        pid,
        title: title.to_string(),
        hidden_for,
    });
    handle
}

impl ProcessTable for FakeSystem {
    type Error = FakeError;

    fn process_ids(&self) -> Result<Vec<ProcessId>, FakeError> {
        Ok(self.lock().processes.iter().map(|p| p.pid).collect())
    }

    fn process_name(&self, pid: ProcessId) -> Result<String, FakeError> {
        let s = self.lock();
        let proc = s
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .ok_or_else(|| FakeError(format!("no such process {}", pid)))?;
        proc.name
            .clone()
            .ok_or_else(|| FakeError(format!("access denied for {}", pid)))
    }

    fn spawn(&self, path: &str, hidden: bool) -> Result<ProcessId, FakeError> {
        let gate = self.spawn_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait();
        }
        let mut s = self.lock();
        s.spawned.push((path.to_string(), hidden));
        let install = s
            .installed
            .get(path)
            .cloned()
            .ok_or_else(|| FakeError(format!("{}: No such file or directory", path)))?;
        let launcher = push_process(&mut s, Some(file_name(path).to_string()));
        let owner = if install.owner == file_name(path) {
            launcher
        } else {
            push_process(&mut s, Some(install.owner.clone()))
        };
        if let Some(title) = &install.window_title {
            push_window(&mut s, owner, title, install.window_delay);
        }
        Ok(launcher)
    }
}

impl WindowManager for FakeSystem {
    type Error = FakeError;

    fn visible_windows(&self) -> Result<Vec<WindowHandle>, FakeError> {
        let mut s = self.lock();
        if s.list_failure {
            return Err(FakeError("window listing failed".into()));
        }
        let mut visible = Vec::new();
        for w in s.windows.iter_mut() {
            if w.hidden_for == 0 {
                visible.push(w.handle);
            } else {
                w.hidden_for -= 1;
            }
        }
        Ok(visible)
    }

    fn window_pid(&self, window: WindowHandle) -> Result<ProcessId, FakeError> {
        self.lock()
            .windows
            .iter()
            .find(|w| w.handle == window)
            .map(|w| w.pid)
            .ok_or_else(|| FakeError(format!("no window {}", window)))
    }

    fn window_title(&self, window: WindowHandle) -> Result<String, FakeError> {
        self.lock()
            .windows
            .iter()
            .find(|w| w.handle == window)
            .map(|w| w.title.clone())
            .ok_or_else(|| FakeError(format!("no window {}", window)))
    }

    fn monitors(&self) -> Result<Vec<MonitorDescriptor>, FakeError> {
        Ok(self.lock().monitors.clone())
    }

    fn restore(&self, window: WindowHandle) -> Result<(), FakeError> {
        self.record(window, "restore", Op::Restore)
    }

    fn move_resize(&self, window: WindowHandle, rect: Rect) -> Result<(), FakeError> {
        self.record(window, "move_resize", Op::MoveResize(rect))
    }

    fn maximize(&self, window: WindowHandle) -> Result<(), FakeError> {
        self.record(window, "maximize", Op::Maximize)
    }

    fn minimize(&self, window: WindowHandle) -> Result<(), FakeError> {
        self.record(window, "minimize", Op::Minimize)
    }
}

/// Clock whose time only moves when something sleeps on it.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Total virtual time slept so far.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }
}

/// Log records captured by [`capture_logs`], as `(level, message)`.
static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        CAPTURED
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;

/// Route `log` records into an in-memory buffer for the whole test binary.
/// Safe to call from every test; only the first call installs the logger.
pub fn capture_logs() {
    static INSTALL: std::sync::Once = std::sync::Once::new();
    INSTALL.call_once(|| {
        if log::set_logger(&CAPTURE_LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

/// Whether a record at `level` containing `needle` has been captured.
/// Tests run in parallel, so match on text unique to the test.
pub fn logged(level: log::Level, needle: &str) -> bool {
    CAPTURED
        .lock()
        .unwrap()
        .iter()
        .any(|(l, msg)| *l == level && msg.contains(needle))
}
