//! Drag-to-select state machine driven by the selection overlay.
//!
//! All positions are virtual-desktop coordinates. The overlay widget
//! converts its window-local mouse positions with [`SelectionSession::to_global`]
//! before feeding them in, so the finished rect can go straight to the grabber.

use log::debug;

use crate::display::Display;
use crate::geometry::{Point, Rect};

/// Alpha of the black scrim painted over the preview while selecting.
pub const SCRIM_ALPHA: u8 = 100;

/// Width of the outline drawn around the rect being dragged.
pub const OUTLINE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Dragging { anchor: Point, current: Point },
    Finalized(Rect),
    Cancelled,
}

/// One pass of the overlay, from "enter selection mode" to a result.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    display: Display,
    state: SelectionState,
}

impl SelectionSession {
    pub fn new(display: Display) -> Self {
        Self { display, state: SelectionState::Idle }
    }

    pub fn display(&self) -> Display {
        self.display
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SelectionState::Finalized(_) | SelectionState::Cancelled)
    }

    /// Overlay-window-local position to virtual-desktop coordinates.
    pub fn to_global(&self, local: Point) -> Point {
        self.display.rect.origin() + local
    }

    /// Positions past the display edge stick to it; the overlay keeps
    /// receiving moves and the release after the pointer leaves its window.
    fn clamp(&self, at: Point) -> Point {
        self.display.rect.clamp_point(at)
    }

    pub fn pointer_down(&mut self, at: Point) {
        let at = self.clamp(at);
        if self.state == SelectionState::Idle {
            self.state = SelectionState::Dragging { anchor: at, current: at };
        }
    }

    /// Returns true when the overlay needs repainting.
    pub fn pointer_move(&mut self, at: Point) -> bool {
        let at = self.clamp(at);
        match &mut self.state {
            SelectionState::Dragging { current, .. } if *current != at => {
                *current = at;
                true
            }
            _ => false,
        }
    }

    /// Finishes the drag. The rect may have zero area; callers decide
    /// whether that is worth capturing.
    pub fn pointer_up(&mut self, at: Point) -> Option<Rect> {
        let SelectionState::Dragging { anchor, .. } = self.state else {
            return None;
        };
        let rect = Rect::from_corners(anchor, self.clamp(at));
        debug!("Selection finalized: {}", rect);
        self.state = SelectionState::Finalized(rect);
        Some(rect)
    }

    pub fn cancel(&mut self) {
        if !self.is_finished() {
            debug!("Selection cancelled");
            self.state = SelectionState::Cancelled;
        }
    }

    /// The rect to outline, normalized.
    pub fn current_rect(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Dragging { anchor, current } => Some(Rect::from_corners(anchor, current)),
            SelectionState::Finalized(rect) => Some(rect),
            SelectionState::Idle | SelectionState::Cancelled => None,
        }
    }
}
