//! Annotation strokes and their compositing over a captured image.
//!
//! Strokes are rasterized with tiny-skia onto a transparent layer the size
//! of the base image, then blended over a copy of the base. The base is
//! never written to.

use image::RgbaImage;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke as Pen, Transform,
};

use crate::geometry::{Point, Rect};

/// Red, fully opaque.
pub const STROKE_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    Freehand,
    Rectangle,
}

/// A single annotation, in canvas-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stroke {
    Freehand { points: Vec<Point> },
    Rectangle { start: Point, end: Point },
}

impl Stroke {
    fn begin(kind: StrokeKind, at: Point) -> Self {
        match kind {
            StrokeKind::Freehand => Stroke::Freehand { points: vec![at] },
            StrokeKind::Rectangle => Stroke::Rectangle { start: at, end: at },
        }
    }

    pub fn kind(&self) -> StrokeKind {
        match self {
            Stroke::Freehand { .. } => StrokeKind::Freehand,
            Stroke::Rectangle { .. } => StrokeKind::Rectangle,
        }
    }

    /// The stroke with `at` folded in, as a new value.
    fn extended(self, at: Point) -> Self {
        match self {
            Stroke::Freehand { mut points } => {
                points.push(at);
                Stroke::Freehand { points }
            }
            Stroke::Rectangle { start, .. } => Stroke::Rectangle { start, end: at },
        }
    }

    /// Too little data to leave a mark worth keeping.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Stroke::Freehand { points } => points.is_empty(),
            Stroke::Rectangle { start, end } => Rect::from_corners(*start, *end).is_empty(),
        }
    }
}

/// Committed strokes plus at most one stroke being drawn.
#[derive(Debug, Clone)]
pub struct AnnotationLayer {
    width: u32,
    height: u32,
    committed: Vec<Stroke>,
    in_progress: Option<Stroke>,
}

impl AnnotationLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, committed: Vec::new(), in_progress: None }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.committed
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.in_progress.as_ref()
    }

    /// Starts a new stroke, dropping any unfinished one.
    pub fn begin_stroke(&mut self, kind: StrokeKind, at: Point) {
        self.in_progress = Some(Stroke::begin(kind, at));
    }

    pub fn extend_stroke(&mut self, at: Point) {
        self.in_progress = self.in_progress.take().map(|stroke| stroke.extended(at));
    }

    /// Returns whether a stroke made it into the committed list.
    pub fn commit_stroke(&mut self) -> bool {
        match self.in_progress.take() {
            Some(stroke) if !stroke.is_degenerate() => {
                self.committed.push(stroke);
                true
            }
            _ => false,
        }
    }

    pub fn discard_stroke(&mut self) {
        self.in_progress = None;
    }

    /// `base` with every committed stroke and then the in-progress one on top.
    pub fn render(&self, base: &RgbaImage) -> RgbaImage {
        self.composite(base, self.in_progress.as_ref())
    }

    /// `base` with committed strokes only.
    pub fn flatten(&self, base: &RgbaImage) -> RgbaImage {
        self.composite(base, None)
    }

    fn composite(&self, base: &RgbaImage, extra: Option<&Stroke>) -> RgbaImage {
        let mut out = base.clone();
        let strokes: Vec<&Stroke> = self.committed.iter().chain(extra).collect();
        if strokes.is_empty() {
            return out;
        }

        let Some(mut layer) = Pixmap::new(out.width(), out.height()) else {
            return out;
        };
        for stroke in strokes {
            draw_stroke(&mut layer, stroke);
        }

        for (dst, src) in out.chunks_exact_mut(4).zip(layer.data().chunks_exact(4)) {
            blend_over(dst, src);
        }
        out
    }
}

fn draw_stroke(layer: &mut Pixmap, stroke: &Stroke) {
    let [r, g, b, a] = STROKE_COLOR;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    match stroke {
        Stroke::Freehand { points } => match points.as_slice() {
            [] => {}
            [dot] => {
                if let Some(path) =
                    PathBuilder::from_circle(dot.x as f32, dot.y as f32, STROKE_WIDTH / 2.0)
                {
                    layer.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            [first, rest @ ..] => {
                let mut pb = PathBuilder::new();
                pb.move_to(first.x as f32, first.y as f32);
                for p in rest {
                    pb.line_to(p.x as f32, p.y as f32);
                }
                if let Some(path) = pb.finish() {
                    let pen = Pen {
                        width: STROKE_WIDTH,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Round,
                        ..Default::default()
                    };
                    layer.stroke_path(&path, &paint, &pen, Transform::identity(), None);
                }
            }
        },
        Stroke::Rectangle { start, end } => {
            let r = Rect::from_corners(*start, *end);
            if let Some(rect) = tiny_skia::Rect::from_xywh(
                r.left as f32,
                r.top as f32,
                r.width as f32,
                r.height as f32,
            ) {
                let path = PathBuilder::from_rect(rect);
                let pen = Pen { width: STROKE_WIDTH, ..Default::default() };
                layer.stroke_path(&path, &paint, &pen, Transform::identity(), None);
            }
        }
    }
}

/// Source-over of one premultiplied `src` pixel onto a straight-alpha `dst`.
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    let da = dst[3] as u32;
    let out_a = sa + (da * inv + 127) / 255;

    for c in 0..3 {
        let dst_p = (dst[c] as u32 * da + 127) / 255;
        let out_p = src[c] as u32 + (dst_p * inv + 127) / 255;
        dst[c] = ((out_p * 255 + out_a / 2) / out_a).min(255) as u8;
    }
    dst[3] = out_a.min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// Anti-aliasing may leave a fully covered pixel a hair short of pure red.
    fn is_red(px: &Rgba<u8>) -> bool {
        px.0[0] > 200 && px.0[1] < 40 && px.0[2] < 40
    }

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    #[test]
    fn freehand_collects_points_in_order() {
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Freehand, Point::new(10, 10));
        layer.extend_stroke(Point::new(20, 10));
        layer.extend_stroke(Point::new(20, 20));
        assert!(layer.commit_stroke());
        assert_eq!(
            layer.strokes(),
            &[Stroke::Freehand {
                points: vec![Point::new(10, 10), Point::new(20, 10), Point::new(20, 20)]
            }]
        );
        assert!(layer.in_progress().is_none());
    }

    #[test]
    fn rectangle_replaces_second_corner() {
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Rectangle, Point::new(5, 5));
        layer.extend_stroke(Point::new(30, 30));
        layer.extend_stroke(Point::new(15, 12));
        assert_eq!(
            layer.in_progress(),
            Some(&Stroke::Rectangle { start: Point::new(5, 5), end: Point::new(15, 12) })
        );
    }

    #[test]
    fn extend_without_stroke_is_noop() {
        let mut layer = AnnotationLayer::new(10, 10);
        layer.extend_stroke(Point::new(3, 3));
        assert!(layer.in_progress().is_none());
        assert!(!layer.commit_stroke());
        assert!(layer.strokes().is_empty());
    }

    #[test]
    fn zero_area_rectangles_are_not_committed() {
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Rectangle, Point::new(8, 8));
        assert!(!layer.commit_stroke());

        layer.begin_stroke(StrokeKind::Rectangle, Point::new(8, 8));
        layer.extend_stroke(Point::new(8, 30));
        assert!(!layer.commit_stroke());

        assert!(layer.strokes().is_empty());
    }

    #[test]
    fn begin_drops_unfinished_stroke() {
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Freehand, Point::new(1, 1));
        layer.extend_stroke(Point::new(2, 2));
        layer.begin_stroke(StrokeKind::Rectangle, Point::new(3, 3));
        assert_eq!(layer.in_progress().map(Stroke::kind), Some(StrokeKind::Rectangle));
        assert!(layer.strokes().is_empty());
    }

    #[test]
    fn render_is_pure_and_idempotent() {
        let base = white(40, 40);
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Rectangle, Point::new(5, 5));
        layer.extend_stroke(Point::new(25, 25));
        layer.commit_stroke();
        layer.begin_stroke(StrokeKind::Freehand, Point::new(0, 39));
        layer.extend_stroke(Point::new(39, 0));

        let first = layer.render(&base);
        let second = layer.render(&base);
        assert_eq!(first, second);
        assert_eq!(base, white(40, 40));
        assert_ne!(first, base);
    }

    #[test]
    fn rectangle_is_outlined_not_filled() {
        let mut layer = AnnotationLayer::new(40, 40);
        layer.begin_stroke(StrokeKind::Rectangle, Point::new(25, 22));
        layer.extend_stroke(Point::new(5, 5));
        layer.commit_stroke();

        let out = layer.flatten(&white(40, 40));
        assert!(is_red(out.get_pixel(15, 5)));
        assert!(is_red(out.get_pixel(15, 4)));
        assert!(is_red(out.get_pixel(5, 15)));
        assert!(is_red(out.get_pixel(25, 15)));
        assert!(is_red(out.get_pixel(15, 22)));
        assert_eq!(*out.get_pixel(15, 14), WHITE);
        assert_eq!(*out.get_pixel(35, 35), WHITE);
    }

    #[test]
    fn flatten_leaves_out_in_progress_stroke() {
        let base = white(20, 20);
        let mut layer = AnnotationLayer::new(20, 20);
        layer.begin_stroke(StrokeKind::Freehand, Point::new(2, 10));
        layer.extend_stroke(Point::new(18, 10));

        assert!(is_red(layer.render(&base).get_pixel(10, 10)));
        assert_eq!(layer.flatten(&base), base);
    }

    #[test]
    fn untouched_translucent_pixels_survive_exactly() {
        let base = RgbaImage::from_pixel(10, 10, Rgba([200, 100, 50, 100]));
        let mut layer = AnnotationLayer::new(10, 10);
        layer.begin_stroke(StrokeKind::Freehand, Point::new(1, 1));
        layer.extend_stroke(Point::new(1, 8));
        layer.commit_stroke();

        let out = layer.flatten(&base);
        assert_eq!(*out.get_pixel(8, 8), Rgba([200, 100, 50, 100]));
        assert!(out.get_pixel(1, 4).0[3] > 240);
    }

    #[test]
    fn single_point_freehand_leaves_a_dot() {
        let mut layer = AnnotationLayer::new(10, 10);
        layer.begin_stroke(StrokeKind::Freehand, Point::new(5, 5));
        assert!(layer.commit_stroke());
        let out = layer.flatten(&white(10, 10));
        assert_ne!(*out.get_pixel(5, 5), WHITE);
        assert_eq!(*out.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn blend_over_opaque_source_replaces_destination() {
        let mut dst = [10, 20, 30, 40];
        blend_over(&mut dst, &STROKE_COLOR);
        assert_eq!(dst, STROKE_COLOR);
    }
}
