//! Capture orchestration: pointer → display → preview → selection →
//! crop of the preview → pinned canvas.

use log::{info, warn};

use crate::canvas::FloatingCanvas;
use crate::capture::{FrameGrabber, PixelBuffer, ScreenSource};
use crate::display::{Display, DisplayResolver};
use crate::error::CaptureError;
use crate::geometry::Point;
use crate::registry::{CanvasId, CanvasRegistry};
use crate::selection::SelectionSession;

/// Result of asking for a new capture.
#[derive(Debug, Clone)]
pub enum CaptureStart {
    /// The overlay should open over `display`, painted with `preview`.
    Started { display: Display, preview: PixelBuffer },
    /// A selection is already running; the request was dropped.
    Busy,
}

#[derive(Debug)]
enum Phase {
    Ready,
    Selecting { session: SelectionSession, preview: PixelBuffer },
}

pub struct CaptureController<S: ScreenSource> {
    screen: S,
    registry: CanvasRegistry,
    phase: Phase,
    show_toolbar: bool,
}

impl<S: ScreenSource> CaptureController<S> {
    pub fn new(screen: S) -> Self {
        Self { screen, registry: CanvasRegistry::new(), phase: Phase::Ready, show_toolbar: true }
    }

    /// Initial toolbar visibility of canvases created from now on.
    pub fn with_toolbar(mut self, visible: bool) -> Self {
        self.show_toolbar = visible;
        self
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn registry(&self) -> &CanvasRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CanvasRegistry {
        &mut self.registry
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Selecting { .. })
    }

    pub fn selection(&self) -> Option<&SelectionSession> {
        match &self.phase {
            Phase::Selecting { session, .. } => Some(session),
            Phase::Ready => None,
        }
    }

    pub fn preview(&self) -> Option<&PixelBuffer> {
        match &self.phase {
            Phase::Selecting { preview, .. } => Some(preview),
            Phase::Ready => None,
        }
    }

    /// Opens a selection session on the display under `pointer`.
    ///
    /// Only one session runs at a time; further requests get `Busy`.
    /// On error the controller stays Ready.
    pub fn start_capture(&mut self, pointer: Point) -> Result<CaptureStart, CaptureError> {
        if self.is_selecting() {
            warn!("Capture requested while a selection is active, ignoring");
            return Ok(CaptureStart::Busy);
        }

        let display = DisplayResolver::new(&self.screen).resolve(pointer)?;
        info!("Starting capture on display {} at {}", display.index, display.rect);

        let preview = FrameGrabber::new(&self.screen).grab(display.rect)?;

        self.phase = Phase::Selecting {
            session: SelectionSession::new(display),
            preview: preview.clone(),
        };
        Ok(CaptureStart::Started { display, preview })
    }

    pub fn selection_pointer_down(&mut self, global: Point) {
        if let Phase::Selecting { session, .. } = &mut self.phase {
            session.pointer_down(global);
        }
    }

    /// Returns true when the overlay needs repainting.
    pub fn selection_pointer_move(&mut self, global: Point) -> bool {
        match &mut self.phase {
            Phase::Selecting { session, .. } => session.pointer_move(global),
            Phase::Ready => false,
        }
    }

    /// Finishes the drag. A non-empty selection is cut out of the preview
    /// and pinned; its id is returned. An empty one just ends the session.
    ///
    /// The screen is not read again: by now the overlay covers it.
    pub fn selection_pointer_up(&mut self, global: Point) -> Result<Option<CanvasId>, CaptureError> {
        let Phase::Selecting { session, preview } = &mut self.phase else {
            return Ok(None);
        };
        let Some(rect) = session.pointer_up(global) else {
            return Ok(None);
        };
        let preview = preview.clone();
        self.phase = Phase::Ready;

        if rect.is_empty() {
            info!("Empty selection, nothing to pin");
            return Ok(None);
        }

        let buffer = preview.crop(rect)?;
        let canvas = FloatingCanvas::new(buffer, rect.origin()).with_toolbar(self.show_toolbar);
        Ok(Some(self.registry.register(canvas)))
    }

    /// Abandons the running selection. Returns false if there was none.
    pub fn cancel_selection(&mut self) -> bool {
        match &mut self.phase {
            Phase::Selecting { session, .. } => {
                session.cancel();
                self.phase = Phase::Ready;
                true
            }
            Phase::Ready => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{PixelFormat, RawFrame};
    use crate::display::DisplaySource;
    use crate::geometry::Rect;
    use std::cell::Cell;

    /// Single 200x100 display; reads fail once `fail_after` reads have happened.
    /// Read `n` (from 0) fills every byte with `10 * (n + 1)`.
    struct FlakyScreen {
        reads: Cell<usize>,
        fail_after: usize,
    }

    impl FlakyScreen {
        fn new(fail_after: usize) -> Self {
            Self { reads: Cell::new(0), fail_after }
        }
    }

    impl DisplaySource for FlakyScreen {
        fn displays(&self) -> Result<Vec<Display>, CaptureError> {
            Ok(vec![Display { index: 0, rect: Rect::new(0, 0, 200, 100) }])
        }
    }

    impl ScreenSource for FlakyScreen {
        fn read_pixels(&self, rect: Rect) -> Result<RawFrame, CaptureError> {
            let n = self.reads.get();
            self.reads.set(n + 1);
            if n >= self.fail_after {
                return Err(CaptureError::GrabFailed("display went away".into()));
            }
            Ok(RawFrame {
                width: rect.width,
                height: rect.height,
                format: PixelFormat::Rgba8,
                bytes: vec![10 * (n as u8 + 1); rect.area() as usize * 4],
            })
        }
    }

    #[test]
    fn second_start_while_selecting_is_busy() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX));
        assert!(matches!(controller.start_capture(Point::new(5, 5)), Ok(CaptureStart::Started { .. })));
        assert!(matches!(controller.start_capture(Point::new(5, 5)), Ok(CaptureStart::Busy)));
        assert_eq!(controller.screen().reads.get(), 1);
    }

    #[test]
    fn preview_is_shared_with_the_caller() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX));
        let Ok(CaptureStart::Started { preview, display }) = controller.start_capture(Point::ORIGIN) else {
            panic!("capture did not start");
        };
        assert_eq!(preview.origin(), display.rect);
        assert!(std::ptr::eq(controller.preview().unwrap().image(), preview.image()));
    }

    #[test]
    fn failed_preview_leaves_controller_ready() {
        let mut controller = CaptureController::new(FlakyScreen::new(0));
        assert!(controller.start_capture(Point::ORIGIN).is_err());
        assert!(!controller.is_selecting());
    }

    #[test]
    fn pinned_pixels_are_cut_from_the_preview() {
        // A second read would fail, so pinning must not touch the screen.
        let mut controller = CaptureController::new(FlakyScreen::new(1));
        controller.start_capture(Point::ORIGIN).unwrap();
        controller.selection_pointer_down(Point::new(10, 10));
        let id = controller.selection_pointer_up(Point::new(50, 40)).unwrap().unwrap();

        assert_eq!(controller.screen().reads.get(), 1);
        let canvas = controller.registry().get(id).unwrap();
        assert_eq!(canvas.base().origin(), Rect::new(10, 10, 40, 30));
        assert!(canvas.base().image().pixels().all(|p| p.0 == [10; 4]));
        assert!(!controller.is_selecting());
    }

    #[test]
    fn release_past_the_display_edge_pins_the_clipped_rect() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX));
        controller.start_capture(Point::ORIGIN).unwrap();
        controller.selection_pointer_down(Point::new(150, 60));
        let id = controller.selection_pointer_up(Point::new(260, 130)).unwrap().unwrap();
        let canvas = controller.registry().get(id).unwrap();
        assert_eq!(canvas.base().origin(), Rect::new(150, 60, 50, 40));
    }

    #[test]
    fn empty_selection_pins_nothing() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX));
        controller.start_capture(Point::ORIGIN).unwrap();
        controller.selection_pointer_down(Point::new(10, 10));
        assert_eq!(controller.selection_pointer_up(Point::new(10, 60)).unwrap(), None);
        assert!(!controller.is_selecting());
        assert!(controller.registry().is_empty());
        assert_eq!(controller.screen().reads.get(), 1);
    }

    #[test]
    fn cancel_returns_to_ready() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX));
        controller.start_capture(Point::ORIGIN).unwrap();
        controller.selection_pointer_down(Point::new(10, 10));
        assert!(controller.cancel_selection());
        assert!(!controller.cancel_selection());
        assert_eq!(controller.selection_pointer_up(Point::new(50, 50)).unwrap(), None);
        assert!(controller.registry().is_empty());
    }

    #[test]
    fn new_canvases_take_toolbar_default() {
        let mut controller = CaptureController::new(FlakyScreen::new(usize::MAX)).with_toolbar(false);
        controller.start_capture(Point::ORIGIN).unwrap();
        controller.selection_pointer_down(Point::new(10, 10));
        let id = controller.selection_pointer_up(Point::new(20, 20)).unwrap().unwrap();
        assert!(!controller.registry().get(id).unwrap().toolbar_visible());
    }
}
