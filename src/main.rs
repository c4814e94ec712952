//! Entry point for the **winstage** command-line launcher.
//!
//! ```text
//! winstage [--config <path>] [--profiles <path>] <profile>
//! winstage [--config <path>] [--profiles <path>] --list
//! ```
//!
//! Exits with status 0 when every program was placed, 1 when at least one
//! failed, and 2 on usage or profile-store errors.

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use winstage::config::Config;
use winstage::coordinator::{PlacementSummary, ProfileRunner, RunnerSettings};
use winstage::profile::Profile;
use winstage::store::{JsonProfileStore, ProfileStore};
use winstage::traits::{ProcessTable, WindowManager};

#[derive(Parser, Debug)]
#[command(
    name = "winstage",
    about = "Launch a profile of programs and place each window on its monitor",
    version
)]
/// Command-line interface for the `winstage` binary.
struct Cli {
    /// Profile to execute
    #[arg(required_unless_present = "list", conflicts_with = "list")]
    profile: Option<String>,

    /// Print the names of all stored profiles
    #[arg(long)]
    list: bool,

    /// Read profiles from this file
    #[arg(long, value_name = "PATH")]
    profiles: Option<PathBuf>,

    /// Read settings from this file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/winstage`, or
/// `%APPDATA%\winstage` on Windows).
fn config_dir() -> PathBuf {
    if cfg!(windows) {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("winstage");
        }
    }
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("winstage")
}

/// Load the config from `path`, falling back to compiled-in defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if explicit => {
            warn!("{}, using defaults", e);
            Config::default()
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn print_summary(summary: &PlacementSummary) {
    for (program, reason) in summary.failures() {
        eprintln!("{}: {}", program, reason);
    }
    println!("{}/{} programs placed", summary.succeeded(), summary.total());
}

fn execute<P, W>(processes: P, wm: W, settings: RunnerSettings, profile: &Profile) -> PlacementSummary
where
    P: ProcessTable + 'static,
    W: WindowManager + 'static,
{
    let runner = ProfileRunner::new(Arc::new(processes), Arc::new(wm), settings);
    let mut execution = runner.execute_profile(profile);
    let total = execution.total();
    while let Some(outcome) = execution.next_outcome() {
        info!(
            "[{}/{}] {} {}",
            execution.completed(),
            total,
            outcome.program_name,
            if outcome.succeeded { "done" } else { "failed" }
        );
    }
    execution.wait()
}

#[cfg(windows)]
fn run_profile(settings: RunnerSettings, profile: &Profile) -> Result<PlacementSummary, String> {
    use winstage::win32::{process::Win32Processes, wm::Win32Wm};
    Ok(execute(Win32Processes::new(), Win32Wm::new(), settings, profile))
}

#[cfg(target_os = "linux")]
fn run_profile(settings: RunnerSettings, profile: &Profile) -> Result<PlacementSummary, String> {
    use winstage::hyprland::wm::HyprlandWm;
    use winstage::procfs::ProcFs;
    if !HyprlandWm::is_available() {
        return Err("no supported window manager found (is Hyprland running?)".into());
    }
    Ok(execute(ProcFs::new(), HyprlandWm::new(), settings, profile))
}

#[cfg(not(any(windows, target_os = "linux")))]
fn run_profile(_settings: RunnerSettings, _profile: &Profile) -> Result<PlacementSummary, String> {
    Err("this platform has no window placement backend".into())
}

fn main() -> ExitCode {
    env_logger::init();

    // Usage errors exit with status 2, `--help` with 0.
    let cli = Cli::parse();

    let config = load_config(cli.config);
    let store_path = cli
        .profiles
        .or_else(|| config.profiles_path.clone())
        .unwrap_or_else(|| config_dir().join("profiles.json"));
    let store = JsonProfileStore::new(&store_path);

    let Some(name) = cli.profile else {
        return match store.profile_names() {
            Ok(names) => {
                for name in names {
                    println!("{}", name);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("winstage: {}", e);
                ExitCode::from(2)
            }
        };
    };

    let profile = match store.load_profile(&name) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("winstage: {}", e);
            return ExitCode::from(2);
        }
    };
    match run_profile(RunnerSettings::from_config(&config), &profile) {
        Ok(summary) => {
            print_summary(&summary);
            if summary.failed() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("winstage: {}", e);
            ExitCode::from(2)
        }
    }
}
