//! Global hotkey capability.
//!
//! Binding a key combination to a profile is expressed through
//! [`HotkeyRegistry`].  No platform backend exists yet:
//! [`UnsupportedHotkeys`] remembers nothing and refuses every
//! registration, and no listener thread is started.

/// Callback fired when a registered combination is pressed.
pub type HotkeyCallback = Box<dyn Fn() + Send + 'static>;

/// Errors from hotkey registration.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("global hotkeys are not implemented on this platform")]
    NotImplemented,
    #[error("hotkey {0:?} is not registered")]
    NotRegistered(String),
}

/// Registers callbacks for global key combinations such as `"ctrl+alt+1"`.
pub trait HotkeyRegistry {
    fn register(&mut self, combo: &str, callback: HotkeyCallback) -> Result<(), HotkeyError>;

    fn unregister(&mut self, combo: &str) -> Result<(), HotkeyError>;
}

/// Registry used on every platform today.
#[derive(Debug, Default)]
pub struct UnsupportedHotkeys;

impl HotkeyRegistry for UnsupportedHotkeys {
    fn register(&mut self, combo: &str, _callback: HotkeyCallback) -> Result<(), HotkeyError> {
        log::debug!("hotkey {:?} requested, but hotkeys are not implemented", combo);
        Err(HotkeyError::NotImplemented)
    }

    fn unregister(&mut self, combo: &str) -> Result<(), HotkeyError> {
        Err(HotkeyError::NotRegistered(combo.to_string()))
    }
}
