//! Owner of every live floating canvas.

use std::collections::BTreeMap;
use std::fmt;

use log::info;

use crate::canvas::FloatingCanvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanvasId(u64);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas#{}", self.0)
    }
}

/// A canvas is in here for exactly as long as its window is on screen.
#[derive(Debug, Default)]
pub struct CanvasRegistry {
    canvases: BTreeMap<CanvasId, FloatingCanvas>,
    next_id: u64,
}

impl CanvasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, canvas: FloatingCanvas) -> CanvasId {
        let id = CanvasId(self.next_id);
        self.next_id += 1;
        self.canvases.insert(id, canvas);
        info!("Registered {} ({} live)", id, self.canvases.len());
        id
    }

    /// Removes `id` if present. Removing twice is harmless.
    pub fn unregister(&mut self, id: CanvasId) -> Option<FloatingCanvas> {
        let removed = self.canvases.remove(&id);
        if removed.is_some() {
            info!("Unregistered {} ({} live)", id, self.canvases.len());
        }
        removed
    }

    /// Closes the canvas and drops it. Returns false if it was already gone.
    pub fn close(&mut self, id: CanvasId) -> bool {
        match self.unregister(id) {
            Some(mut canvas) => {
                canvas.close();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: CanvasId) -> Option<&FloatingCanvas> {
        self.canvases.get(&id)
    }

    pub fn get_mut(&mut self, id: CanvasId) -> Option<&mut FloatingCanvas> {
        self.canvases.get_mut(&id)
    }

    pub fn contains(&self, id: CanvasId) -> bool {
        self.canvases.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = CanvasId> + '_ {
        self.canvases.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PixelBuffer;
    use crate::geometry::{Point, Rect};
    use image::RgbaImage;

    fn canvas() -> FloatingCanvas {
        FloatingCanvas::new(PixelBuffer::new(Rect::new(0, 0, 2, 2), RgbaImage::new(2, 2)), Point::ORIGIN)
    }

    #[test]
    fn close_removes_immediately() {
        let mut registry = CanvasRegistry::new();
        let id = registry.register(canvas());
        assert!(registry.contains(id));
        assert!(registry.close(id));
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn double_close_and_unregister_are_noops() {
        let mut registry = CanvasRegistry::new();
        let keep = registry.register(canvas());
        let id = registry.register(canvas());
        assert!(registry.close(id));
        assert!(!registry.close(id));
        assert!(registry.unregister(id).is_none());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![keep]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = CanvasRegistry::new();
        let first = registry.register(canvas());
        registry.close(first);
        let second = registry.register(canvas());
        assert_ne!(first, second);
    }
}
