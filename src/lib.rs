//! pinsnap: grab a region of the screen and pin it, annotated, on top of
//! everything else.
//!
//! The pipeline is plain Rust and UI-agnostic:
//! - display lookup and pixel grabbing (`display`, `capture`)
//! - the drag-to-select state machine (`selection`)
//! - strokes and compositing (`annotation`)
//! - pinned canvases and their owner (`canvas`, `registry`)
//! - orchestration (`controller`)
//!
//! `ui` wires it to druid windows, the global hotkey and the clipboard.

pub mod annotation;
pub mod canvas;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod display;
pub mod error;
pub mod geometry;
pub mod hotkey;
pub mod registry;
pub mod selection;
pub mod ui;

pub use error::{CaptureError, ClipboardError, ConfigError, HotkeyRegistrationError};
