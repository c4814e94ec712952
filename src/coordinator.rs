//! Runs every program of a profile concurrently and collects the results.
//!
//! [`ProfileRunner`] owns the backends and the timing settings.  Each call
//! to [`execute_profile`](ProfileRunner::execute_profile) starts one worker
//! thread per program and returns a [`ProfileExecution`] right away; the
//! workers report a [`PlacementOutcome`] over a channel as they finish.
//!
//! A worker runs the pipeline identity check → launch → discovery →
//! geometry → placement strictly in order.  Any failure is contained in
//! that worker's outcome and never affects the others.

use crate::config::Config;
use crate::discovery::{DiscoveryError, DiscoveryTarget, WindowDiscovery};
use crate::monitor::{resolve_geometry, resolve_monitor_index};
use crate::placement::{apply_placement, Placement, PlacementError};
use crate::process::find_running_process;
use crate::profile::{Profile, ProgramLaunchSpec};
use crate::traits::{Clock, ProcessTable, SystemClock, WindowManager};
use crate::types::WindowHandle;
use log::{debug, error, info, warn};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Why a single program could not be placed.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// The OS refused to start the executable.
    #[error("failed to launch {path}: {reason}")]
    Launch { path: String, reason: String },

    /// The process table could not be enumerated.
    #[error("process lookup failed: {0}")]
    ProcessTable(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The monitor list could not be read.
    #[error("monitor query failed: {0}")]
    Monitors(String),

    #[error("no monitors connected")]
    NoMonitors,

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Result of one program's end-to-end attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub program_name: String,
    pub succeeded: bool,
    /// Window that was placed, when placement was attempted.
    pub resolved_handle: Option<WindowHandle>,
    /// Failure reason, when `succeeded` is false.
    pub error: Option<String>,
}

impl PlacementOutcome {
    fn success(program_name: String, resolved_handle: Option<WindowHandle>) -> Self {
        Self {
            program_name,
            succeeded: true,
            resolved_handle,
            error: None,
        }
    }

    fn failure(program_name: String, error: String) -> Self {
        Self {
            program_name,
            succeeded: false,
            resolved_handle: None,
            error: Some(error),
        }
    }
}

/// Aggregate result of one profile execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSummary {
    pub profile_name: String,
    /// One outcome per program, in profile order.
    pub outcomes: Vec<PlacementOutcome>,
}

impl PlacementSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// `(program name, reason)` for every failed program.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter(|o| !o.succeeded).map(|o| {
            (
                o.program_name.as_str(),
                o.error.as_deref().unwrap_or("unknown error"),
            )
        })
    }
}

/// Timing knobs for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub discovery_timeout: Duration,
    pub poll_interval: Duration,
    pub settle: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RunnerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            discovery_timeout: config.discovery.timeout(),
            poll_interval: config.discovery.poll_interval(),
            settle: config.placement.settle(),
        }
    }
}

/// Executes profiles against a process table and a window manager.
///
/// The runner holds no mutable state; concurrent and overlapping
/// executions are independent of each other.
///
/// # Typical usage
///
/// ```ignore
/// let runner = ProfileRunner::new(Arc::new(ProcFs::new()), Arc::new(HyprlandWm::new()),
///                                 RunnerSettings::default());
/// let summary = runner.execute_profile(&profile).wait();
/// ```
pub struct ProfileRunner<P, W, C = SystemClock> {
    processes: Arc<P>,
    wm: Arc<W>,
    clock: Arc<C>,
    settings: RunnerSettings,
}

impl<P, W, C> Clone for ProfileRunner<P, W, C> {
    fn clone(&self) -> Self {
        Self {
            processes: Arc::clone(&self.processes),
            wm: Arc::clone(&self.wm),
            clock: Arc::clone(&self.clock),
            settings: self.settings,
        }
    }
}

impl<P, W> ProfileRunner<P, W, SystemClock>
where
    P: ProcessTable + 'static,
    W: WindowManager + 'static,
{
    /// Create a runner on the wall clock.
    pub fn new(processes: Arc<P>, wm: Arc<W>, settings: RunnerSettings) -> Self {
        Self::with_clock(processes, wm, Arc::new(SystemClock), settings)
    }
}

impl<P, W, C> ProfileRunner<P, W, C>
where
    P: ProcessTable + 'static,
    W: WindowManager + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(processes: Arc<P>, wm: Arc<W>, clock: Arc<C>, settings: RunnerSettings) -> Self {
        Self {
            processes,
            wm,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> RunnerSettings {
        self.settings
    }

    /// Start one worker per program and return immediately.
    pub fn execute_profile(&self, profile: &Profile) -> ProfileExecution {
        info!(
            "executing profile {:?} ({} programs)",
            profile.name,
            profile.programs.len()
        );
        let (tx, rx) = mpsc::channel();
        let mut names = Vec::with_capacity(profile.programs.len());

        for (index, spec) in profile.programs.iter().enumerate() {
            let name = spec.program_name();
            names.push(name.clone());

            let runner = self.clone();
            let spec = spec.clone();
            let worker_tx = tx.clone();
            // Program names come from the profile and may hold NUL bytes,
            // which thread names reject.
            let spawned = thread::Builder::new()
                .name(format!("place-{}", index))
                .spawn(move || {
                    let outcome = runner.run_program(&spec);
                    let _ = worker_tx.send((index, outcome));
                });
            if let Err(e) = spawned {
                error!("could not start worker for {}: {}", name, e);
                let _ = tx.send((
                    index,
                    PlacementOutcome::failure(name, format!("could not start worker: {}", e)),
                ));
            }
        }

        ProfileExecution {
            profile_name: profile.name.clone(),
            received: vec![None; names.len()],
            names,
            rx,
        }
    }

    /// Run the whole pipeline for one program on the calling thread.
    pub fn run_program(&self, spec: &ProgramLaunchSpec) -> PlacementOutcome {
        let name = spec.program_name();
        match self.place(spec) {
            Ok(handle) => {
                info!("{}: done", name);
                PlacementOutcome::success(name, handle)
            }
            Err(e) => {
                error!("{}: {}", name, e);
                PlacementOutcome::failure(name, e.to_string())
            }
        }
    }

    fn place(&self, spec: &ProgramLaunchSpec) -> Result<Option<WindowHandle>, UnitError> {
        let name = spec.program_name();
        let process_name = spec.process_name();

        let existing = if spec.avoid_duplicates {
            find_running_process(&*self.processes, &process_name)
                .map_err(|e| UnitError::ProcessTable(e.to_string()))?
        } else {
            None
        };

        match existing {
            Some(pid) => info!("{}: already running as pid {}, not launching", name, pid),
            None => {
                let pid = self
                    .processes
                    .spawn(&spec.executable_path, spec.start_minimized)
                    .map_err(|e| UnitError::Launch {
                        path: spec.executable_path.clone(),
                        reason: e.to_string(),
                    })?;
                info!("{}: launched {} as pid {}", name, spec.executable_path, pid);
            }
        }

        if spec.start_minimized {
            debug!("{}: start minimized, leaving the window alone", name);
            return Ok(None);
        }
        let Some(geometry) = &spec.window_geometry else {
            debug!("{}: no window geometry, nothing to place", name);
            return Ok(None);
        };

        let discovery = WindowDiscovery::new(
            &*self.processes,
            &*self.wm,
            &*self.clock,
            self.settings.poll_interval,
        );
        let target = DiscoveryTarget {
            process_id: existing,
            process_name,
            title_hint: spec.title_hint(),
        };
        let handle = discovery.discover(&target, self.settings.discovery_timeout)?;

        let monitors = self
            .wm
            .monitors()
            .map_err(|e| UnitError::Monitors(e.to_string()))?;
        if monitors.is_empty() {
            return Err(UnitError::NoMonitors);
        }
        let index = resolve_monitor_index(geometry.monitor_selector, &monitors);
        let rect = resolve_geometry(&monitors[index], geometry);
        debug!(
            "{}: monitor {} ({}) -> {}",
            name, index, geometry.monitor_selector, rect
        );

        apply_placement(
            &*self.wm,
            &*self.clock,
            handle,
            Placement {
                rect,
                maximize: geometry.maximized,
                minimize: geometry.minimized,
            },
            self.settings.settle,
        )?;
        Ok(Some(handle))
    }
}

/// Handle on a running profile execution.
///
/// Outcomes can be streamed with [`next_outcome`](Self::next_outcome) as
/// workers finish, or collected with [`wait`](Self::wait).
pub struct ProfileExecution {
    profile_name: String,
    names: Vec<String>,
    received: Vec<Option<PlacementOutcome>>,
    rx: mpsc::Receiver<(usize, PlacementOutcome)>,
}

impl ProfileExecution {
    /// Number of programs in the execution.
    pub fn total(&self) -> usize {
        self.names.len()
    }

    /// Number of outcomes received so far.
    pub fn completed(&self) -> usize {
        self.received.iter().filter(|o| o.is_some()).count()
    }

    /// Block until the next worker reports.  Returns `None` once every
    /// worker has reported or no worker is left to report.
    pub fn next_outcome(&mut self) -> Option<PlacementOutcome> {
        if self.completed() == self.total() {
            return None;
        }
        let (index, outcome) = self.rx.recv().ok()?;
        self.received[index] = Some(outcome.clone());
        Some(outcome)
    }

    /// Block until every worker has reported and summarize.
    ///
    /// A worker that dies without reporting counts as a failure, so the
    /// summary always holds exactly one outcome per program.
    pub fn wait(mut self) -> PlacementSummary {
        while self.next_outcome().is_some() {}

        let outcomes: Vec<PlacementOutcome> = self
            .received
            .into_iter()
            .zip(self.names)
            .map(|(outcome, name)| {
                outcome.unwrap_or_else(|| {
                    warn!("{}: worker exited without reporting", name);
                    PlacementOutcome::failure(name, "worker exited without reporting".into())
                })
            })
            .collect();

        let summary = PlacementSummary {
            profile_name: self.profile_name,
            outcomes,
        };
        info!(
            "profile {:?}: {}/{} programs placed",
            summary.profile_name,
            summary.succeeded(),
            summary.total()
        );
        summary
    }
}
