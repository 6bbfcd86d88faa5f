//! Screen access through the `xcap` crate.
//!
//! This is the only file that talks to the OS for pixels. xcap reports
//! monitor geometry in logical units but captures physical pixels, so reads
//! on scaled monitors are resampled back to the logical size.

use image::imageops::{self, FilterType};
use log::{debug, warn};
use xcap::Monitor;

use super::{PixelFormat, RawFrame, ScreenSource};
use crate::display::{Display, DisplaySource};
use crate::error::CaptureError;
use crate::geometry::Rect;

/// Production `ScreenSource`. Stateless; every call hits xcap afresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreen;

impl XcapScreen {
    pub fn new() -> Self {
        XcapScreen
    }

    /// All monitors, primary first, each paired with its geometry.
    fn monitors() -> Result<Vec<(Monitor, Rect)>, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;

        let mut measured = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let rect = monitor_rect(&monitor)?;
            let primary = monitor.is_primary().unwrap_or(false);
            measured.push((primary, monitor, rect));
        }

        // Stable sort keeps OS order for the non-primary monitors.
        measured.sort_by_key(|(primary, _, _)| !primary);

        Ok(measured.into_iter().map(|(_, m, r)| (m, r)).collect())
    }
}

fn monitor_rect(monitor: &Monitor) -> Result<Rect, CaptureError> {
    let geometry = (|| -> xcap::XCapResult<Rect> {
        Ok(Rect::new(monitor.x()?, monitor.y()?, monitor.width()?, monitor.height()?))
    })();
    geometry.map_err(|e| CaptureError::Enumeration(e.to_string()))
}

impl DisplaySource for XcapScreen {
    fn displays(&self) -> Result<Vec<Display>, CaptureError> {
        let displays: Vec<Display> = Self::monitors()?
            .into_iter()
            .enumerate()
            .map(|(index, (_, rect))| Display { index, rect })
            .collect();

        debug!("Enumerated {} display(s): {:?}", displays.len(), displays);
        Ok(displays)
    }
}

impl ScreenSource for XcapScreen {
    fn read_pixels(&self, rect: Rect) -> Result<RawFrame, CaptureError> {
        let (monitor, monitor_rect) = Self::monitors()?
            .into_iter()
            .find(|(_, r)| r.contains_rect(&rect))
            .ok_or(CaptureError::OffDesktop { rect })?;

        let shot = monitor
            .capture_image()
            .map_err(|e| CaptureError::GrabFailed(e.to_string()))?;

        let scale_x = shot.width() as f64 / monitor_rect.width.max(1) as f64;
        let scale_y = shot.height() as f64 / monitor_rect.height.max(1) as f64;

        let x = (((rect.left - monitor_rect.left) as f64) * scale_x).round() as u32;
        let y = (((rect.top - monitor_rect.top) as f64) * scale_y).round() as u32;
        let x = x.min(shot.width());
        let y = y.min(shot.height());
        let w = ((rect.width as f64 * scale_x).round() as u32).min(shot.width() - x);
        let h = ((rect.height as f64 * scale_y).round() as u32).min(shot.height() - y);

        let mut region = imageops::crop_imm(&shot, x, y, w, h).to_image();
        if region.dimensions() != (rect.width, rect.height) {
            if (scale_x - 1.0).abs() < f64::EPSILON && (scale_y - 1.0).abs() < f64::EPSILON {
                warn!(
                    "Monitor returned {}x{} for {}, resampling",
                    region.width(),
                    region.height(),
                    rect
                );
            }
            region = imageops::resize(&region, rect.width, rect.height, FilterType::Triangle);
        }

        Ok(RawFrame {
            width: region.width(),
            height: region.height(),
            format: PixelFormat::Rgba8,
            bytes: region.into_raw(),
        })
    }
}
