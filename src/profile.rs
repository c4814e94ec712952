//! Profiles and the per-program launch specification.
//!
//! A [`Profile`] is an ordered list of [`ProgramLaunchSpec`]s.  The JSON
//! shape accepted here matches the profile file written by the profile
//! editor, so both the long field names and the editor's short ones
//! (`path`, `window_config`, `x`, `y`, `monitor`) deserialize.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "Notepad",
//!   "path": "C:\\Windows\\System32\\notepad.exe",
//!   "window_config": {
//!     "monitor": "secondary",
//!     "x": 100,
//!     "y": 100,
//!     "width": 800,
//!     "height": 600,
//!     "maximized": false
//!   },
//!   "start_minimized": false,
//!   "avoid_duplicates": true
//! }
//! ```

use log::warn;
use serde::de::{Error as DeError, IgnoredAny, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An ordered collection of programs executed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name.  Filled in by the store from the profile's key.
    #[serde(default)]
    pub name: String,
    /// Programs in the order they were added.
    #[serde(default)]
    pub programs: Vec<ProgramLaunchSpec>,
}

/// Which display a window should land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSelector {
    /// Position in the monitor enumeration order.
    ByIndex(usize),
    /// The display the OS marks as primary.
    Primary,
    /// The first display that is not primary.
    Secondary,
}

impl Default for MonitorSelector {
    fn default() -> Self {
        MonitorSelector::Primary
    }
}

impl fmt::Display for MonitorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorSelector::ByIndex(i) => write!(f, "{}", i),
            MonitorSelector::Primary => write!(f, "primary"),
            MonitorSelector::Secondary => write!(f, "secondary"),
        }
    }
}

impl Serialize for MonitorSelector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MonitorSelector::ByIndex(i) => serializer.serialize_u64(*i as u64),
            MonitorSelector::Primary => serializer.serialize_str("primary"),
            MonitorSelector::Secondary => serializer.serialize_str("secondary"),
        }
    }
}

/// Parse a symbolic or numeric selector string (case-insensitive).
fn parse_selector(s: &str) -> Option<MonitorSelector> {
    let normalized = s.trim().to_lowercase();
    match normalized.as_str() {
        "primary" => Some(MonitorSelector::Primary),
        "secondary" => Some(MonitorSelector::Secondary),
        other => other.parse().ok().map(MonitorSelector::ByIndex),
    }
}

/// Selector used when the configured value cannot be understood.
fn unrecognized(what: fmt::Arguments<'_>) -> MonitorSelector {
    warn!("unrecognized monitor selector {}, using monitor 0", what);
    MonitorSelector::ByIndex(0)
}

impl<'de> Deserialize<'de> for MonitorSelector {
    /// Never fails on a well-formed value: anything that is not a
    /// non-negative index or a known role falls back to monitor 0.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = MonitorSelector;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "monitor index or \"primary\" / \"secondary\"")
            }
            fn visit_u64<E>(self, n: u64) -> Result<MonitorSelector, E> {
                Ok(MonitorSelector::ByIndex(n as usize))
            }
            fn visit_i64<E>(self, n: i64) -> Result<MonitorSelector, E> {
                if n >= 0 {
                    Ok(MonitorSelector::ByIndex(n as usize))
                } else {
                    Ok(unrecognized(format_args!("{}", n)))
                }
            }
            fn visit_f64<E>(self, n: f64) -> Result<MonitorSelector, E> {
                Ok(unrecognized(format_args!("{}", n)))
            }
            fn visit_bool<E>(self, b: bool) -> Result<MonitorSelector, E> {
                Ok(unrecognized(format_args!("{}", b)))
            }
            fn visit_unit<E>(self) -> Result<MonitorSelector, E> {
                Ok(unrecognized(format_args!("null")))
            }
            fn visit_str<E>(self, s: &str) -> Result<MonitorSelector, E>
            where
                E: DeError,
            {
                Ok(parse_selector(s).unwrap_or_else(|| unrecognized(format_args!("{:?}", s))))
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<MonitorSelector, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(unrecognized(format_args!("(list)")))
            }
            fn visit_map<A>(self, mut map: A) -> Result<MonitorSelector, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(unrecognized(format_args!("(object)")))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Requested monitor, position, size and show-state for one window.
///
/// Offsets are relative to the selected monitor's origin.  A missing or
/// zero `width`/`height` means "the monitor's full width/height".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    #[serde(alias = "monitor")]
    pub monitor_selector: MonitorSelector,
    #[serde(alias = "x")]
    pub x_offset: i32,
    #[serde(alias = "y")]
    pub y_offset: i32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maximized: bool,
    pub minimized: bool,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            monitor_selector: MonitorSelector::Primary,
            x_offset: 0,
            y_offset: 0,
            width: None,
            height: None,
            maximized: false,
            minimized: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One program's desired runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramLaunchSpec {
    /// Display name.  Defaults to the executable's file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Absolute path of the binary to launch and identify.
    #[serde(alias = "path")]
    pub executable_path: String,

    /// Image name of the process that owns the window, when it differs
    /// from the executable (launchers that hand off to another binary).
    #[serde(
        default,
        alias = "real_process_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub process_name: Option<String>,

    /// Text for fuzzy title matching.  Defaults to the executable's file
    /// stem.
    #[serde(
        default,
        alias = "fallback_title",
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_title_hint: Option<String>,

    /// Skip launching when a matching process is already running.
    #[serde(default = "default_true")]
    pub avoid_duplicates: bool,

    /// Launch without a window and do not touch it afterwards.
    #[serde(default)]
    pub start_minimized: bool,

    #[serde(default, alias = "window_config")]
    pub window_geometry: Option<WindowGeometry>,
}

impl ProgramLaunchSpec {
    /// A spec for `executable_path` with every option at its default.
    pub fn new(executable_path: impl Into<String>) -> Self {
        Self {
            name: None,
            executable_path: executable_path.into(),
            process_name: None,
            fallback_title_hint: None,
            avoid_duplicates: true,
            start_minimized: false,
            window_geometry: None,
        }
    }

    /// Human-readable program name used in logs and outcomes.
    pub fn program_name(&self) -> String {
        match &self.name {
            Some(n) if !n.trim().is_empty() => n.clone(),
            _ => file_stem(&self.executable_path).to_string(),
        }
    }

    /// Image name the running process is identified by.
    pub fn process_name(&self) -> String {
        match &self.process_name {
            Some(n) if !n.trim().is_empty() => n.clone(),
            _ => file_name(&self.executable_path).to_string(),
        }
    }

    /// Text used for fuzzy window title matching.
    pub fn title_hint(&self) -> String {
        match &self.fallback_title_hint {
            Some(h) if !h.trim().is_empty() => h.clone(),
            _ => file_stem(&self.executable_path).to_string(),
        }
    }
}

/// Last path component, accepting both `/` and `\` separators so Windows
/// paths in a profile behave the same on every host.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// [`file_name`] without its final extension.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}
