//! Applies a computed placement to a discovered window.
//!
//! The operation order is fixed: restore, move/resize, then maximize or
//! minimize.  Geometry changes only take effect on a restored window.
//! Each step waits a short settle delay before the next one and is attempted
//! once.

use crate::traits::{Clock, WindowManager};
use crate::types::{Rect, WindowHandle};
use log::{debug, error, info};
use std::fmt;
use std::time::Duration;

/// One step of the placement sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStep {
    Restore,
    MoveResize,
    Maximize,
    Minimize,
}

impl fmt::Display for PlacementStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementStep::Restore => write!(f, "restore"),
            PlacementStep::MoveResize => write!(f, "move/resize"),
            PlacementStep::Maximize => write!(f, "maximize"),
            PlacementStep::Minimize => write!(f, "minimize"),
        }
    }
}

/// The window manager refused one step.
#[derive(Debug, thiserror::Error)]
#[error("{step} of window {handle} to {rect} failed: {reason}")]
pub struct PlacementError {
    pub step: PlacementStep,
    pub handle: WindowHandle,
    pub rect: Rect,
    pub reason: String,
}

/// End state requested for the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    pub maximize: bool,
    pub minimize: bool,
}

/// Restore `handle`, move it to `placement.rect`, then maximize or
/// minimize it.  Maximize wins when both are requested.
pub fn apply_placement<W, C>(
    wm: &W,
    clock: &C,
    handle: WindowHandle,
    placement: Placement,
    settle: Duration,
) -> Result<(), PlacementError>
where
    W: WindowManager + ?Sized,
    C: Clock + ?Sized,
{
    let rect = placement.rect;
    let step = |step: PlacementStep, result: Result<(), W::Error>| {
        result.map_err(|e| {
            let err = PlacementError {
                step,
                handle,
                rect,
                reason: e.to_string(),
            };
            error!("{}", err);
            err
        })
    };

    step(PlacementStep::Restore, wm.restore(handle))?;
    clock.sleep(settle);
    step(PlacementStep::MoveResize, wm.move_resize(handle, rect))?;
    debug!("window {} moved to {}", handle, rect);

    if placement.maximize {
        clock.sleep(settle);
        step(PlacementStep::Maximize, wm.maximize(handle))?;
        info!("window {} maximized at {}", handle, rect);
    } else if placement.minimize {
        clock.sleep(settle);
        step(PlacementStep::Minimize, wm.minimize(handle))?;
        info!("window {} minimized from {}", handle, rect);
    } else {
        info!("window {} placed at {}", handle, rect);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSystem, ManualClock, Op};

    const SETTLE: Duration = Duration::from_millis(50);

    fn rect() -> Rect {
        Rect {
            x: 100,
            y: 100,
            width: 800,
            height: 600,
        }
    }

    fn setup() -> (FakeSystem, ManualClock, WindowHandle) {
        let sys = FakeSystem::new();
        let pid = sys.add_process("app");
        let h = sys.add_window(pid, "App");
        (sys, ManualClock::new(), h)
    }

    fn place(maximize: bool, minimize: bool) -> Placement {
        Placement {
            rect: rect(),
            maximize,
            minimize,
        }
    }

    #[test]
    fn normal_placement_restores_then_moves() {
        let (sys, clock, h) = setup();
        apply_placement(&sys, &clock, h, place(false, false), SETTLE).unwrap();
        assert_eq!(sys.ops_for(h), vec![Op::Restore, Op::MoveResize(rect())]);
    }

    #[test]
    fn maximize_comes_after_move() {
        let (sys, clock, h) = setup();
        apply_placement(&sys, &clock, h, place(true, false), SETTLE).unwrap();
        assert_eq!(
            sys.ops_for(h),
            vec![Op::Restore, Op::MoveResize(rect()), Op::Maximize]
        );
    }

    #[test]
    fn minimize_comes_after_move() {
        let (sys, clock, h) = setup();
        apply_placement(&sys, &clock, h, place(false, true), SETTLE).unwrap();
        assert_eq!(
            sys.ops_for(h),
            vec![Op::Restore, Op::MoveResize(rect()), Op::Minimize]
        );
    }

    #[test]
    fn maximize_wins_over_minimize() {
        let (sys, clock, h) = setup();
        apply_placement(&sys, &clock, h, place(true, true), SETTLE).unwrap();
        assert_eq!(sys.ops_for(h).last(), Some(&Op::Maximize));
        assert!(!sys.ops_for(h).contains(&Op::Minimize));
    }

    #[test]
    fn steps_are_separated_by_settle_delay() {
        let (sys, clock, h) = setup();
        apply_placement(&sys, &clock, h, place(true, false), SETTLE).unwrap();
        assert_eq!(clock.elapsed(), SETTLE * 2);
    }

    #[test]
    fn refused_step_stops_the_sequence_without_retry() {
        let (sys, clock, h) = setup();
        sys.fail_on("move_resize");
        let err = apply_placement(&sys, &clock, h, place(true, false), SETTLE).unwrap_err();
        assert_eq!(err.step, PlacementStep::MoveResize);
        assert_eq!(err.handle, h);
        assert_eq!(err.rect, rect());
        assert_eq!(sys.ops_for(h), vec![Op::Restore]);
    }

    #[test]
    fn error_message_carries_context() {
        let (sys, clock, h) = setup();
        sys.fail_on("restore");
        let err = apply_placement(&sys, &clock, h, place(false, false), SETTLE).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("restore"), "{}", msg);
        assert!(msg.contains(&h.to_string()), "{}", msg);
        assert!(msg.contains("(100,100) 800x600"), "{}", msg);
    }
}
