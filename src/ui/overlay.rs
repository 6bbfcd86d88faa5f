//! Full-display selection overlay.

use druid::piet::{ImageFormat, InterpolationMode, PietImage};
use druid::{
    BoxConstraints, Color, Env, Event, EventCtx, KbKey, LayoutCtx, LifeCycle, LifeCycleCtx,
    PaintCtx, Rect, RenderContext, Size, UpdateCtx, Widget, WindowDesc,
};
use log::error;

use super::{report_error, to_point, AppState, CANVAS_PINNED};
use crate::capture::PixelBuffer;
use crate::display::Display;
use crate::selection::{OUTLINE_WIDTH, SCRIM_ALPHA};

pub(super) fn window(display: Display, preview: PixelBuffer) -> WindowDesc<AppState> {
    let r = display.rect;
    WindowDesc::new(SelectionOverlay { preview, cached_image: None })
        .title("截图")
        .show_titlebar(false)
        .resizable(false)
        .set_always_on_top(true)
        .set_position((r.left as f64, r.top as f64))
        .window_size((r.width as f64, r.height as f64))
}

struct SelectionOverlay {
    preview: PixelBuffer,
    cached_image: Option<PietImage>,
}

impl SelectionOverlay {
    /// Outline of the current selection in window-local coordinates.
    fn selection_rect(&self, data: &AppState) -> Option<Rect> {
        let controller = data.controller.borrow();
        let session = controller.selection()?;
        let rect = session.current_rect()?;
        let origin = session.display().rect.origin();
        let x0 = (rect.left - origin.x) as f64;
        let y0 = (rect.top - origin.y) as f64;
        Some(Rect::new(x0, y0, x0 + rect.width as f64, y0 + rect.height as f64))
    }

    fn finish(&self, ctx: &mut EventCtx, data: &mut AppState, pos: druid::Point) {
        let result = {
            let mut controller = data.controller.borrow_mut();
            let Some(session) = controller.selection() else {
                return;
            };
            let global = session.to_global(to_point(pos));
            controller.selection_pointer_up(global)
        };
        ctx.window().close();
        data.touch();

        match result {
            Ok(Some(id)) => ctx.submit_command(CANVAS_PINNED.with(id)),
            Ok(None) => {}
            Err(e) => {
                error!("Capture failed: {}", e);
                report_error("截图失败", &e);
            }
        }
    }
}

impl Widget<AppState> for SelectionOverlay {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::WindowConnected => ctx.request_focus(),

            Event::MouseDown(e) if e.button.is_left() => {
                let mut controller = data.controller.borrow_mut();
                let Some(session) = controller.selection() else {
                    return;
                };
                let global = session.to_global(to_point(e.pos));
                controller.selection_pointer_down(global);
                ctx.set_active(true);
                ctx.request_paint();
            }

            Event::MouseMove(e) if ctx.is_active() => {
                let mut controller = data.controller.borrow_mut();
                let Some(session) = controller.selection() else {
                    return;
                };
                let global = session.to_global(to_point(e.pos));
                if controller.selection_pointer_move(global) {
                    ctx.request_paint();
                }
            }

            Event::MouseUp(e) if e.button.is_left() && ctx.is_active() => {
                ctx.set_active(false);
                self.finish(ctx, data, e.pos);
            }

            Event::KeyDown(k) if k.key == KbKey::Escape => {
                data.controller.borrow_mut().cancel_selection();
                ctx.window().close();
                data.touch();
            }

            _ => {}
        }
    }

    fn lifecycle(&mut self, _ctx: &mut LifeCycleCtx, _event: &LifeCycle, _data: &AppState, _env: &Env) {}

    fn update(&mut self, _ctx: &mut UpdateCtx, _old: &AppState, _data: &AppState, _env: &Env) {}

    fn layout(&mut self, _ctx: &mut LayoutCtx, bc: &BoxConstraints, _data: &AppState, _env: &Env) -> Size {
        bc.constrain(Size::new(self.preview.width() as f64, self.preview.height() as f64))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        let full_rect = ctx.size().to_rect();

        if self.cached_image.is_none() && !self.preview.is_empty() {
            let image = self.preview.image();
            self.cached_image = ctx
                .make_image(
                    image.width() as usize,
                    image.height() as usize,
                    image.as_raw(),
                    ImageFormat::RgbaSeparate,
                )
                .ok();
        }
        if let Some(img) = &self.cached_image {
            ctx.draw_image(img, full_rect, InterpolationMode::NearestNeighbor);
        }

        // 选区外加遮罩，选区内保持原样
        let scrim = Color::rgba8(0, 0, 0, SCRIM_ALPHA);
        match self.selection_rect(data) {
            Some(r) => {
                ctx.fill(Rect::new(0.0, 0.0, full_rect.width(), r.y0), &scrim);
                ctx.fill(Rect::new(0.0, r.y1, full_rect.width(), full_rect.height()), &scrim);
                ctx.fill(Rect::new(0.0, r.y0, r.x0, r.y1), &scrim);
                ctx.fill(Rect::new(r.x1, r.y0, full_rect.width(), r.y1), &scrim);
                ctx.stroke(r, &Color::WHITE, OUTLINE_WIDTH);
            }
            None => ctx.fill(full_rect, &scrim),
        }
    }
}
