//! Win32 implementations of [`ProcessTable`](crate::traits::ProcessTable)
//! and [`WindowManager`](crate::traits::WindowManager).
//!
//! Nothing outside this module should call the Win32 API directly.

pub mod process;
pub mod wm;

/// Error returned by every Win32 call made in this module.
#[derive(Debug, thiserror::Error)]
#[error("win32 error: {0}")]
pub struct Win32Error(String);

impl From<windows::core::Error> for Win32Error {
    fn from(e: windows::core::Error) -> Self {
        Win32Error(e.to_string())
    }
}

impl Win32Error {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Win32Error(msg.into())
    }
}
