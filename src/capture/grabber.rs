//! Region grabbing and pixel-format normalization.

use std::time::Instant;

use image::RgbaImage;
use log::info;

use super::{PixelBuffer, PixelFormat, RawFrame, ScreenSource};
use crate::error::CaptureError;
use crate::geometry::Rect;

/// Reads a rect from a `ScreenSource` and hands back RGBA pixels.
pub struct FrameGrabber<'a, S: ScreenSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ScreenSource + ?Sized> FrameGrabber<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Synchronously grabs `rect`. The result is tagged with `rect` exactly.
    ///
    /// A zero-area rect yields an empty buffer without touching the screen.
    pub fn grab(&self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        if rect.is_empty() {
            return Ok(PixelBuffer::empty(rect));
        }

        let start = Instant::now();
        let frame = self.source.read_pixels(rect)?;
        let image = normalize(frame, rect)?;

        info!("Grabbed {} in {}ms", rect, start.elapsed().as_millis());

        Ok(PixelBuffer::new(rect, image))
    }
}

/// Validates frame geometry and converts it to RGBA byte order.
fn normalize(frame: RawFrame, rect: Rect) -> Result<RgbaImage, CaptureError> {
    if (frame.width, frame.height) != (rect.width, rect.height) {
        return Err(CaptureError::SizeMismatch {
            expected: (rect.width, rect.height),
            actual: (frame.width, frame.height),
        });
    }

    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.bytes.len() != expected {
        return Err(CaptureError::MalformedFrame { expected, actual: frame.bytes.len() });
    }

    let mut bytes = frame.bytes;
    if frame.format == PixelFormat::Bgra8 {
        for px in bytes.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }

    RgbaImage::from_raw(frame.width, frame.height, bytes)
        .ok_or(CaptureError::MalformedFrame { expected, actual: expected })
}
