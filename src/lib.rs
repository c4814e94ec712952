//! **winstage** — launch a profile of programs and put each window where
//! it belongs.
//!
//! A *profile* is a named list of programs.  Executing it launches every
//! program that is not already running, waits for each one's main window
//! to appear, and moves that window onto the configured monitor with the
//! configured size (or maximizes / minimizes it).  Every program is handled
//! on its own thread so one slow or broken program never holds up the rest.
//!
//! # Architecture
//!
//! The crate is organised around three core traits:
//!
//! * [`traits::ProcessTable`] — enumerates processes and starts new ones.
//! * [`traits::WindowManager`] — enumerates, moves and resizes top-level
//!   windows and reports the monitor layout.
//! * [`traits::Clock`] — the time source for polling and settle delays, so
//!   timeouts can be tested without sleeping.
//!
//! Everything above those traits ([`process`], [`discovery`], [`monitor`],
//! [`placement`] and the [`coordinator`] that chains them) is platform
//! independent.  Concrete backends live in `win32` (Windows), `hyprland`
//! (Hyprland IPC) and `procfs` (Linux `/proc`).

pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod hotkey;
pub mod monitor;
pub mod placement;
pub mod process;
pub mod profile;
pub mod store;
pub mod traits;
pub mod types;

#[cfg(unix)]
pub mod hyprland;
#[cfg(target_os = "linux")]
pub mod procfs;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod test_support;
