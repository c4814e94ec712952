//! Types shared between the engine and its backends.
//!
//! [`WindowHandle`] and [`ProcessId`] identify OS objects opaquely,
//! [`MonitorDescriptor`] describes one physical display and [`Rect`] is an
//! absolute rectangle on the virtual desktop.

use std::fmt;

/// OS process identifier.
pub type ProcessId = u32;

/// Opaque reference to a top-level window.
///
/// On Win32 this is the `HWND` value, on Hyprland the client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// One physical display as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDescriptor {
    /// Position in the enumeration order (0-based).
    pub index: usize,
    /// X position on the virtual desktop (pixels).
    pub origin_x: i32,
    /// Y position on the virtual desktop (pixels).
    pub origin_y: i32,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Whether the OS considers this the primary display.
    pub is_primary: bool,
}

/// Absolute window rectangle on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{}) {}x{}", self.x, self.y, self.width, self.height)
    }
}
