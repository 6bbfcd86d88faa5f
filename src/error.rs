//! Error types for the capture pipeline and its collaborators.
//!
//! None of these are fatal: the controller and the app shell recover from
//! every one of them and return to a usable state.

use crate::geometry::Rect;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate displays: {0}")]
    Enumeration(String),

    #[error("No displays attached")]
    NoDisplays,

    #[error("Region {rect} is not inside a single display")]
    OffDesktop { rect: Rect },

    #[error("Screen capture failed: {0}")]
    GrabFailed(String),

    #[error("Captured frame has {actual} bytes, expected {expected}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error(
        "Captured frame is {}x{}, expected {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HotkeyRegistrationError {
    #[error("Failed to create hotkey manager: {0}")]
    Manager(String),

    #[error("Invalid hotkey \"{combo}\": {reason}")]
    InvalidCombination { combo: String, reason: String },

    #[error("Failed to register hotkey \"{combo}\": {reason}")]
    Register { combo: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard rejected image: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
