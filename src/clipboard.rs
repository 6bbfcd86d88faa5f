//! Clipboard export of flattened captures.

use arboard::{Clipboard, ImageData};
use image::RgbaImage;

use crate::error::ClipboardError;

/// Anything that accepts a finished image.
pub trait ClipboardSink {
    fn set_image(&mut self, image: &RgbaImage) -> Result<(), ClipboardError>;
}

/// The system clipboard via arboard. Opened per copy, so a clipboard owned
/// by another process between copies is not a problem.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_image(&mut self, image: &RgbaImage) -> Result<(), ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        let image_data = ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: image.as_raw().into(),
        };
        clipboard
            .set_image(image_data)
            .map_err(|e| ClipboardError::Rejected(e.to_string()))
    }
}
