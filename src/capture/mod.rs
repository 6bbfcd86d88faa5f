//! Screen capture domain.
//!
//! `ScreenSource` is the OS boundary (display list + raw pixel reads);
//! `FrameGrabber` turns raw frames into normalized, immutable `PixelBuffer`s.

mod grabber;
mod xcap_screen;

pub use grabber::FrameGrabber;
pub use xcap_screen::XcapScreen;

use std::fmt;
use std::sync::Arc;

use image::{imageops, RgbaImage};

use crate::display::DisplaySource;
use crate::error::CaptureError;
use crate::geometry::Rect;

/// Byte order of a raw frame as delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
}

/// Unnormalized pixels straight from the screen-grab primitive.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub bytes: Vec<u8>,
}

/// Displays plus the ability to read the pixels of a virtual-desktop rect.
pub trait ScreenSource: DisplaySource {
    /// Reads exactly `rect`. The returned frame must be `rect.width` by
    /// `rect.height` pixels.
    fn read_pixels(&self, rect: Rect) -> Result<RawFrame, CaptureError>;
}

/// Immutable RGBA pixels tagged with the rect they were captured from.
///
/// Cloning shares the pixels; nothing ever writes through a `PixelBuffer`.
#[derive(Clone)]
pub struct PixelBuffer {
    origin: Rect,
    image: Arc<RgbaImage>,
}

impl PixelBuffer {
    pub fn new(origin: Rect, image: RgbaImage) -> Self {
        Self { origin, image: Arc::new(image) }
    }

    pub(crate) fn empty(origin: Rect) -> Self {
        Self::new(origin, RgbaImage::new(origin.width, origin.height))
    }

    pub fn origin(&self) -> Rect {
        self.origin
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Copies out the pixels of `rect`, given in the same virtual-desktop
    /// space as [`origin`](Self::origin). Fails if `rect` reaches outside.
    pub fn crop(&self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        if !self.origin.contains_rect(&rect) {
            return Err(CaptureError::OffDesktop { rect });
        }
        let x = (rect.left as i64 - self.origin.left as i64) as u32;
        let y = (rect.top as i64 - self.origin.top as i64) as u32;
        let image = imageops::crop_imm(&*self.image, x, y, rect.width, rect.height).to_image();
        Ok(PixelBuffer::new(rect, image))
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("origin", &self.origin)
            .field("size", &self.image.dimensions())
            .finish()
    }
}
