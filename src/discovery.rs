//! Window discovery: find the top-level window a program owns.
//!
//! Two strategies are tried on every polling tick, in this order:
//!
//! 1. **Process identity** — the first visible window whose owning process
//!    is the target.  Authoritative, but only works when the process that
//!    was identified also owns the window.
//! 2. **Fuzzy title** — every visible window is scored against a title
//!    hint (see [`title_score`]) and the best candidate wins.  Covers
//!    launchers that hand the window off to a child process.
//!
//! [`WindowDiscovery::discover`] repeats the tick at a fixed interval until
//! a window turns up or the timeout elapses.

use crate::process::find_running_process;
use crate::traits::{Clock, ProcessTable, WindowManager};
use crate::types::{ProcessId, WindowHandle};
use log::{debug, info, trace, warn};
use std::time::Duration;

/// Errors from window discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// No window appeared within the configured budget.
    #[error("no window matching {hint:?} appeared within {timeout:?}")]
    Timeout { hint: String, timeout: Duration },

    /// The process table or window list could not be read at all.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A scored match produced while searching by title.  Lives only for the
/// duration of one discovery tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCandidate {
    pub handle: WindowHandle,
    pub title: String,
    pub match_score: usize,
    /// Whether the whole hint appeared in the title.
    pub exact: bool,
}

/// What to look for.
#[derive(Debug, Clone)]
pub struct DiscoveryTarget {
    /// Process known to own the window, if it was already identified.
    pub process_id: Option<ProcessId>,
    /// Image name used to identify the process when `process_id` is unknown.
    pub process_name: String,
    /// Text matched against window titles.
    pub title_hint: String,
}

/// Split a lower-cased hint into tokens on whitespace, `-`, `_` and `.`.
pub fn hint_tokens(hint: &str) -> Vec<String> {
    hint.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '.')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score `title` against `hint`.
///
/// If the whole hint is a substring of the title the score is the token
/// count and the match is exact.  Otherwise the score is the number of
/// tokens found in the title.  Returns `None` when nothing matches.
pub fn title_score(hint: &str, title: &str) -> Option<(usize, bool)> {
    let hint_lc = hint.trim().to_lowercase();
    if hint_lc.is_empty() {
        return None;
    }
    let title_lc = title.to_lowercase();
    let tokens = hint_tokens(&hint_lc);
    if title_lc.contains(&hint_lc) {
        return Some((tokens.len(), true));
    }
    let hits = tokens.iter().filter(|t| title_lc.contains(t.as_str())).count();
    (hits > 0).then_some((hits, false))
}

/// Ranks candidates by score, exact matches first among equal scores.
/// Enumeration order is kept among full ties.
pub fn rank_candidates(candidates: &mut [WindowCandidate]) {
    candidates.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| b.exact.cmp(&a.exact))
    });
}

/// Stateless discovery engine over a process table, a window manager and a
/// clock.
pub struct WindowDiscovery<'a, P: ?Sized, W: ?Sized, C: ?Sized> {
    processes: &'a P,
    wm: &'a W,
    clock: &'a C,
    poll_interval: Duration,
}

impl<'a, P, W, C> WindowDiscovery<'a, P, W, C>
where
    P: ProcessTable + ?Sized,
    W: WindowManager + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(processes: &'a P, wm: &'a W, clock: &'a C, poll_interval: Duration) -> Self {
        Self {
            processes,
            wm,
            clock,
            poll_interval,
        }
    }

    /// All visible windows owned by `pid`, in enumeration order.
    pub fn windows_by_process(&self, pid: ProcessId) -> Result<Vec<WindowHandle>, DiscoveryError> {
        let windows = self
            .wm
            .visible_windows()
            .map_err(|e| DiscoveryError::Backend(e.to_string()))?;
        Ok(windows
            .into_iter()
            .filter(|w| match self.wm.window_pid(*w) {
                Ok(owner) => owner == pid,
                Err(e) => {
                    trace!("skipping window {}: {}", w, e);
                    false
                }
            })
            .collect())
    }

    /// Visible windows matching `hint`, best first.
    pub fn windows_by_title(&self, hint: &str) -> Result<Vec<WindowCandidate>, DiscoveryError> {
        let windows = self
            .wm
            .visible_windows()
            .map_err(|e| DiscoveryError::Backend(e.to_string()))?;
        let mut candidates = Vec::new();
        for handle in windows {
            let title = match self.wm.window_title(handle) {
                Ok(t) => t,
                Err(e) => {
                    trace!("skipping window {}: {}", handle, e);
                    continue;
                }
            };
            if let Some((match_score, exact)) = title_score(hint, &title) {
                candidates.push(WindowCandidate {
                    handle,
                    title,
                    match_score,
                    exact,
                });
            }
        }
        rank_candidates(&mut candidates);
        Ok(candidates)
    }

    /// One polling tick.  `pid` is updated in place once the process has
    /// been identified.
    fn tick(
        &self,
        pid: &mut Option<ProcessId>,
        target: &DiscoveryTarget,
    ) -> Result<Option<WindowHandle>, DiscoveryError> {
        if pid.is_none() {
            *pid = find_running_process(self.processes, &target.process_name)
                .map_err(|e| DiscoveryError::Backend(e.to_string()))?;
            if let Some(found) = pid {
                debug!("identified {} as pid {}", target.process_name, found);
            }
        }
        if let Some(p) = *pid {
            if let Some(first) = self.windows_by_process(p)?.first() {
                debug!("found window {} by pid {}", first, p);
                return Ok(Some(*first));
            }
        }
        Ok(self.windows_by_title(&target.title_hint)?.first().map(|c| {
            debug!(
                "found window {} by title {:?} (score {})",
                c.handle, c.title, c.match_score
            );
            c.handle
        }))
    }

    /// Poll until a window for `target` appears or `timeout` elapses.
    ///
    /// Never sleeps past `timeout`: the last sleep is cut short so the
    /// final tick lands on the deadline.
    pub fn discover(
        &self,
        target: &DiscoveryTarget,
        timeout: Duration,
    ) -> Result<WindowHandle, DiscoveryError> {
        let start = self.clock.now();
        let mut pid = target.process_id;
        loop {
            if let Some(handle) = self.tick(&mut pid, target)? {
                info!("window {} found for {}", handle, target.process_name);
                return Ok(handle);
            }
            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed >= timeout {
                break;
            }
            self.clock.sleep(self.poll_interval.min(timeout - elapsed));
        }
        warn!(
            "no window for {} (hint {:?}) after {:?}",
            target.process_name, target.title_hint, timeout
        );
        Err(DiscoveryError::Timeout {
            hint: target.title_hint.clone(),
            timeout,
        })
    }
}
