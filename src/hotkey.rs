//! Global capture shortcut.
//!
//! global-hotkey delivers presses on its own channel; the UI polls it from a
//! timer on the main thread, so the callback always runs where the rest of
//! the app state lives.

use std::str::FromStr;

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use log::{info, warn};

use crate::error::HotkeyRegistrationError;

/// Parses a combination such as `ctrl+shift+KeyA`.
pub fn parse_hotkey(combo: &str) -> Result<HotKey, HotkeyRegistrationError> {
    HotKey::from_str(combo).map_err(|e| HotkeyRegistrationError::InvalidCombination {
        combo: combo.to_string(),
        reason: e.to_string(),
    })
}

/// A registered shortcut. Unregistered when dropped.
pub struct HotkeyBinding {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    combo: String,
}

impl HotkeyBinding {
    pub fn register(combo: &str) -> Result<Self, HotkeyRegistrationError> {
        let hotkey = parse_hotkey(combo)?;
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyRegistrationError::Manager(e.to_string()))?;

        manager.register(hotkey).map_err(|e| HotkeyRegistrationError::Register {
            combo: combo.to_string(),
            reason: e.to_string(),
        })?;

        info!("Registered global hotkey: {}", combo);
        Ok(Self { manager, hotkey, combo: combo.to_string() })
    }

    /// The combination as configured, e.g. `ctrl+shift+KeyA`.
    pub fn combo(&self) -> &str {
        &self.combo
    }

    /// Drains pending hotkey events. True if ours was pressed at least once.
    pub fn poll_pressed(&self) -> bool {
        let mut pressed = false;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.id == self.hotkey.id() && event.state == HotKeyState::Pressed {
                pressed = true;
            }
        }
        pressed
    }
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        match self.manager.unregister(self.hotkey) {
            Ok(()) => info!("Unregistered global hotkey: {}", self.combo),
            Err(e) => warn!("Failed to unregister hotkey {}: {}", self.combo, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_HOTKEY;

    #[test]
    fn default_hotkey_parses() {
        assert!(parse_hotkey(DEFAULT_HOTKEY).is_ok());
    }

    #[test]
    fn same_combo_gives_same_id() {
        let a = parse_hotkey("alt+shift+KeyS").unwrap();
        let b = parse_hotkey("shift+alt+KeyS").unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn garbage_combo_is_rejected() {
        let result = parse_hotkey("ctrl+notakey");
        assert!(matches!(
            result,
            Err(HotkeyRegistrationError::InvalidCombination { ref combo, .. }) if combo == "ctrl+notakey"
        ));
    }
}
