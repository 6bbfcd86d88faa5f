//! Display enumeration and pointer-to-display resolution.

use log::debug;

use crate::error::CaptureError;
use crate::geometry::{Point, Rect};

/// One attached monitor, in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub index: usize,
    pub rect: Rect,
}

/// Anything that can list the currently attached displays.
///
/// Implementations must not cache: the layout can change between calls.
pub trait DisplaySource {
    fn displays(&self) -> Result<Vec<Display>, CaptureError>;
}

/// Maps a virtual-desktop point to the display that contains it.
pub struct DisplayResolver<'a, S: DisplaySource + ?Sized> {
    source: &'a S,
}

impl<'a, S: DisplaySource + ?Sized> DisplayResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Returns the display under `point`, or display 0 when the point lies
    /// outside every display (e.g. mid-reconfiguration).
    pub fn resolve(&self, point: Point) -> Result<Display, CaptureError> {
        let displays = self.source.displays()?;

        if let Some(display) = displays.iter().find(|d| d.rect.contains(point)) {
            return Ok(*display);
        }

        debug!(
            "Point {} is outside all {} display(s), falling back to primary",
            point,
            displays.len()
        );

        displays
            .iter()
            .find(|d| d.index == 0)
            .or_else(|| displays.first())
            .copied()
            .ok_or(CaptureError::NoDisplays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Layout {
        displays: Vec<Display>,
        queries: Cell<usize>,
    }

    impl DisplaySource for Layout {
        fn displays(&self) -> Result<Vec<Display>, CaptureError> {
            self.queries.set(self.queries.get() + 1);
            Ok(self.displays.clone())
        }
    }

    fn dual_layout() -> Layout {
        Layout {
            displays: vec![
                Display { index: 0, rect: Rect::new(0, 0, 1920, 1080) },
                Display { index: 1, rect: Rect::new(-1280, 0, 1280, 1024) },
            ],
            queries: Cell::new(0),
        }
    }

    #[test]
    fn resolves_display_under_point() {
        let layout = dual_layout();
        let resolver = DisplayResolver::new(&layout);
        assert_eq!(resolver.resolve(Point::new(-10, 500)).unwrap().index, 1);
        assert_eq!(resolver.resolve(Point::new(10, 500)).unwrap().index, 0);
    }

    #[test]
    fn falls_back_to_primary_outside_all_displays() {
        let layout = dual_layout();
        let resolver = DisplayResolver::new(&layout);
        assert_eq!(resolver.resolve(Point::new(5000, 5000)).unwrap().index, 0);
    }

    #[test]
    fn queries_layout_on_every_call() {
        let layout = dual_layout();
        let resolver = DisplayResolver::new(&layout);
        resolver.resolve(Point::ORIGIN).unwrap();
        resolver.resolve(Point::ORIGIN).unwrap();
        assert_eq!(layout.queries.get(), 2);
    }

    #[test]
    fn no_displays_is_an_error() {
        let layout = Layout { displays: Vec::new(), queries: Cell::new(0) };
        let resolver = DisplayResolver::new(&layout);
        assert!(matches!(resolver.resolve(Point::ORIGIN), Err(CaptureError::NoDisplays)));
    }
}
