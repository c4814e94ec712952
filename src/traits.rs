//! Core traits that decouple winstage from any specific operating system.
//!
//! Every concrete backend (Win32, Hyprland + `/proc`, a test harness, …)
//! implements these traits.  The resolvers, the discovery engine and the
//! [`ProfileRunner`](crate::coordinator::ProfileRunner) only depend on these
//! abstractions.

use crate::types::{MonitorDescriptor, ProcessId, Rect, WindowHandle};
use std::time::{Duration, Instant};

/// Abstraction over the OS process table.
///
/// Lookups on a single process may fail because the process exited
/// between enumeration and inspection, or because its metadata is not
/// readable by the current user.  Callers treat such failures as "does not
/// match".
pub trait ProcessTable: Send + Sync {
    /// The error type produced by this process table.
    type Error: std::error::Error + Send + 'static;

    /// Return the ids of every process currently visible to the caller.
    fn process_ids(&self) -> Result<Vec<ProcessId>, Self::Error>;

    /// Return the image name of `pid` (e.g. `"notepad.exe"`).
    fn process_name(&self, pid: ProcessId) -> Result<String, Self::Error>;

    /// Start `path` as a new process and return its id.
    ///
    /// With `hidden` set the process is created without a console or
    /// initial window where the platform supports it.  Blocks only until
    /// the OS acknowledges process creation.
    fn spawn(&self, path: &str, hidden: bool) -> Result<ProcessId, Self::Error>;
}

/// Abstraction over a window manager that can enumerate, move and resize
/// top-level windows.
pub trait WindowManager: Send + Sync {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return the visible top-level windows in enumeration order.
    fn visible_windows(&self) -> Result<Vec<WindowHandle>, Self::Error>;

    /// Return the id of the process that owns `window`.
    fn window_pid(&self, window: WindowHandle) -> Result<ProcessId, Self::Error>;

    /// Return the title of `window`.
    fn window_title(&self, window: WindowHandle) -> Result<String, Self::Error>;

    /// Return the monitors in enumeration order.  Queried fresh on every
    /// call; monitors may be plugged in or removed at any time.
    fn monitors(&self) -> Result<Vec<MonitorDescriptor>, Self::Error>;

    /// Bring `window` back to its normal (not maximized, not minimized)
    /// state.
    fn restore(&self, window: WindowHandle) -> Result<(), Self::Error>;

    /// Move and resize `window` to `rect` without reordering it relative to
    /// other windows.
    fn move_resize(&self, window: WindowHandle, rect: Rect) -> Result<(), Self::Error>;

    /// Maximize `window` on the monitor it currently occupies.
    fn maximize(&self, window: WindowHandle) -> Result<(), Self::Error>;

    /// Minimize `window`.
    fn minimize(&self, window: WindowHandle) -> Result<(), Self::Error>;
}

/// Source of time for polling loops and settle delays.
///
/// Injected so tests can simulate elapsed time without sleeping.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
