//! Monitor selection and absolute geometry.
//!
//! Both functions are pure: the caller fetches the live monitor list from
//! the [`WindowManager`](crate::traits::WindowManager) right before placing
//! a window and passes it in.

use crate::profile::{MonitorSelector, WindowGeometry};
use crate::types::{MonitorDescriptor, Rect};
use log::warn;

/// Resolve `selector` to an index into `monitors`.
///
/// Always returns a valid index when `monitors` is non-empty; anything
/// that cannot be honoured falls back with a warning instead of failing.
/// Returns `0` for an empty list.
pub fn resolve_monitor_index(selector: MonitorSelector, monitors: &[MonitorDescriptor]) -> usize {
    match selector {
        MonitorSelector::ByIndex(i) if i < monitors.len() => i,
        MonitorSelector::ByIndex(i) => {
            warn!(
                "monitor {} not found ({} connected), using monitor 0",
                i,
                monitors.len()
            );
            0
        }
        MonitorSelector::Primary => match monitors.iter().position(|m| m.is_primary) {
            Some(i) => i,
            None => {
                warn!("no primary monitor reported, using monitor 0");
                0
            }
        },
        MonitorSelector::Secondary => {
            if let Some(i) = monitors.iter().position(|m| !m.is_primary) {
                i
            } else if monitors.len() > 1 {
                warn!("no non-primary monitor reported, using monitor 1");
                1
            } else {
                warn!("no secondary monitor connected, using monitor 0");
                0
            }
        }
    }
}

/// Absolute rectangle for `geometry` on `monitor`.
///
/// Offsets are added to the monitor origin; a missing or zero size takes
/// the monitor's full width/height.
pub fn resolve_geometry(monitor: &MonitorDescriptor, geometry: &WindowGeometry) -> Rect {
    let or_full = |v: Option<u32>, full: u32| v.filter(|v| *v > 0).unwrap_or(full);
    Rect {
        x: monitor.origin_x.saturating_add(geometry.x_offset),
        y: monitor.origin_y.saturating_add(geometry.y_offset),
        width: or_full(geometry.width, monitor.width),
        height: or_full(geometry.height, monitor.height),
    }
}
