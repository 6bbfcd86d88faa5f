//! A pinned, annotatable capture.
//!
//! Pointer events arrive in virtual-desktop coordinates; the canvas turns
//! them into canvas-local ones for drawing, or into window displacement
//! when no drawing tool is active.

use image::RgbaImage;
use log::{debug, info};

use crate::annotation::{AnnotationLayer, Stroke, StrokeKind};
use crate::capture::PixelBuffer;
use crate::clipboard::ClipboardSink;
use crate::error::ClipboardError;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Dragging moves the window.
    #[default]
    Idle,
    Pencil,
    Rectangle,
}

impl Mode {
    fn stroke_kind(self) -> Option<StrokeKind> {
        match self {
            Mode::Idle => None,
            Mode::Pencil => Some(StrokeKind::Freehand),
            Mode::Rectangle => Some(StrokeKind::Rectangle),
        }
    }
}

/// What the window should do after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasResponse {
    None,
    /// Move the window so its top-left sits here.
    Moved(Point),
    Redraw,
}

#[derive(Debug)]
pub struct FloatingCanvas {
    base: PixelBuffer,
    layer: AnnotationLayer,
    position: Point,
    mode: Mode,
    toolbar_visible: bool,
    drag_anchor: Option<Point>,
    closed: bool,
}

impl FloatingCanvas {
    pub fn new(base: PixelBuffer, position: Point) -> Self {
        let layer = AnnotationLayer::new(base.width(), base.height());
        Self {
            base,
            layer,
            position,
            mode: Mode::Idle,
            toolbar_visible: true,
            drag_anchor: None,
            closed: false,
        }
    }

    pub fn with_toolbar(mut self, visible: bool) -> Self {
        self.toolbar_visible = visible;
        self
    }

    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    pub fn layer(&self) -> &AnnotationLayer {
        &self.layer
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.layer.strokes()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> (u32, u32) {
        (self.base.width(), self.base.height())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn enter_pencil_mode(&mut self) {
        self.switch_mode(Mode::Pencil);
    }

    pub fn enter_rectangle_mode(&mut self) {
        self.switch_mode(Mode::Rectangle);
    }

    pub fn exit_draw_mode(&mut self) {
        self.switch_mode(Mode::Idle);
    }

    /// Any half-drawn stroke or window drag is abandoned, never committed.
    fn switch_mode(&mut self, mode: Mode) {
        self.layer.discard_stroke();
        self.drag_anchor = None;
        if self.mode != mode {
            debug!("Canvas mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn toggle_toolbar(&mut self) -> bool {
        self.toolbar_visible = !self.toolbar_visible;
        self.toolbar_visible
    }

    fn to_local(&self, global: Point) -> Point {
        global - self.position
    }

    pub fn on_pointer_down(&mut self, global: Point) {
        if self.closed {
            return;
        }
        match self.mode.stroke_kind() {
            Some(kind) => self.layer.begin_stroke(kind, self.to_local(global)),
            None => self.drag_anchor = Some(global),
        }
    }

    pub fn on_pointer_move(&mut self, global: Point) -> CanvasResponse {
        if self.closed {
            return CanvasResponse::None;
        }
        if self.mode.stroke_kind().is_some() {
            if self.layer.in_progress().is_none() {
                return CanvasResponse::None;
            }
            self.layer.extend_stroke(self.to_local(global));
            return CanvasResponse::Redraw;
        }

        let Some(anchor) = self.drag_anchor else {
            return CanvasResponse::None;
        };
        let delta = global - anchor;
        if delta == Point::ORIGIN {
            return CanvasResponse::None;
        }
        self.position = self.position + delta;
        self.drag_anchor = Some(global);
        CanvasResponse::Moved(self.position)
    }

    pub fn on_pointer_up(&mut self, _global: Point) -> CanvasResponse {
        if self.mode.stroke_kind().is_some() {
            if self.layer.in_progress().is_none() {
                return CanvasResponse::None;
            }
            self.layer.commit_stroke();
            CanvasResponse::Redraw
        } else {
            self.drag_anchor = None;
            CanvasResponse::None
        }
    }

    /// What the window should show right now, partial stroke included.
    pub fn display_image(&self) -> RgbaImage {
        self.layer.render(self.base.image())
    }

    /// Base pixels with committed strokes baked in.
    pub fn export(&self) -> RgbaImage {
        self.layer.flatten(self.base.image())
    }

    pub fn copy_to(&self, sink: &mut dyn ClipboardSink) -> Result<(), ClipboardError> {
        let image = self.export();
        sink.set_image(&image)?;
        info!("Copied {}x{} capture to clipboard", image.width(), image.height());
        Ok(())
    }

    /// Returns true only for the call that actually closed the canvas.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.layer.discard_stroke();
        self.drag_anchor = None;
        self.closed = true;
        true
    }
}
