//! Hyprland-specific implementations.
//!
//! This module provides a concrete backend for the
//! [`WindowManager`](crate::traits::WindowManager) trait, powered by
//! Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod wm;
