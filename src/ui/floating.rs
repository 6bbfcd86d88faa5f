//! Pinned capture windows.

use druid::menu::MenuEventCtx;
use druid::piet::{ImageFormat, InterpolationMode, PietImage};
use druid::widget::{Button, CrossAxisAlignment, Either, Flex, SizedBox};
use druid::{
    BoxConstraints, Color, Env, Event, EventCtx, LayoutCtx, LifeCycle, LifeCycleCtx, Menu,
    MenuItem, PaintCtx, RenderContext, Size, UpdateCtx, Widget, WidgetExt, WindowDesc, WindowId,
    WindowSizePolicy,
};
use log::error;

use super::{report_error, to_druid, to_point, AppState, CanvasAction, CANVAS_ACTION};
use crate::canvas::{CanvasResponse, FloatingCanvas};
use crate::clipboard::SystemClipboard;
use crate::registry::CanvasId;

const BORDER_WIDTH: f64 = 2.0;

pub(super) fn window(id: CanvasId, canvas: &FloatingCanvas) -> WindowDesc<AppState> {
    let root = Flex::column()
        .cross_axis_alignment(CrossAxisAlignment::Start)
        .with_child(CanvasView { id, cached_image: None, dirty: true })
        .with_child(Either::new(
            move |data: &AppState, _env| data.toolbar_visible(id),
            toolbar(),
            SizedBox::empty(),
        ));

    WindowDesc::new(root)
        .title("贴图")
        .show_titlebar(false)
        .resizable(false)
        .set_always_on_top(true)
        .window_size_policy(WindowSizePolicy::Content)
        .set_position(to_druid(canvas.position()))
}

fn toolbar() -> impl Widget<AppState> {
    [
        ("移动", CanvasAction::Move),
        ("画笔", CanvasAction::Pencil),
        ("矩形", CanvasAction::Rectangle),
        ("复制", CanvasAction::Copy),
        ("销毁图片", CanvasAction::Close),
    ]
    .into_iter()
    .fold(Flex::row(), |row, (label, action)| {
        row.with_child(Button::new(label).on_click(move |ctx, _data: &mut AppState, _env| {
            ctx.submit_command(CANVAS_ACTION.with(action).to(ctx.window_id()));
        }))
    })
    .padding(4.0)
}

fn context_menu(window: WindowId) -> Menu<AppState> {
    let item = |label: &'static str, action: CanvasAction| {
        MenuItem::new(label).on_activate(move |ctx: &mut MenuEventCtx, _data: &mut AppState, _env| {
            ctx.submit_command(CANVAS_ACTION.with(action).to(window));
        })
    };
    Menu::empty()
        .entry(item("移动", CanvasAction::Move))
        .entry(item("画笔", CanvasAction::Pencil))
        .entry(item("矩形", CanvasAction::Rectangle))
        .separator()
        .entry(item("显示/隐藏工具栏", CanvasAction::ToggleToolbar))
        .entry(item("复制", CanvasAction::Copy))
        .separator()
        .entry(item("销毁图片", CanvasAction::Close))
}

/// Shows one canvas and feeds it pointer input.
struct CanvasView {
    id: CanvasId,
    cached_image: Option<PietImage>,
    dirty: bool,
}

impl CanvasView {
    /// Runs `f` on this view's canvas, if it is still registered.
    fn with_canvas<R>(&self, data: &AppState, f: impl FnOnce(&mut FloatingCanvas) -> R) -> Option<R> {
        let mut controller = data.controller.borrow_mut();
        controller.registry_mut().get_mut(self.id).map(f)
    }

    /// Window-local mouse position to virtual-desktop coordinates.
    fn pointer(&self, data: &AppState, window_pos: druid::Point) -> Option<crate::geometry::Point> {
        self.with_canvas(data, |canvas| canvas.position() + to_point(window_pos))
    }

    fn respond(&mut self, ctx: &mut EventCtx, response: CanvasResponse) {
        match response {
            CanvasResponse::Moved(position) => ctx.window().set_position(to_druid(position)),
            CanvasResponse::Redraw => {
                self.dirty = true;
                ctx.request_paint();
            }
            CanvasResponse::None => {}
        }
    }

    fn apply(&mut self, ctx: &mut EventCtx, data: &mut AppState, action: CanvasAction) {
        match action {
            CanvasAction::Move => {
                self.with_canvas(data, FloatingCanvas::exit_draw_mode);
            }
            CanvasAction::Pencil => {
                self.with_canvas(data, FloatingCanvas::enter_pencil_mode);
            }
            CanvasAction::Rectangle => {
                self.with_canvas(data, FloatingCanvas::enter_rectangle_mode);
            }
            CanvasAction::ToggleToolbar => {
                self.with_canvas(data, FloatingCanvas::toggle_toolbar);
                data.touch();
            }
            CanvasAction::Copy => {
                let copied = self.with_canvas(data, |canvas| canvas.copy_to(&mut SystemClipboard));
                if let Some(Err(e)) = copied {
                    error!("Copy failed: {}", e);
                    report_error("复制失败", &e);
                }
            }
            CanvasAction::Close => {
                data.controller.borrow_mut().registry_mut().close(self.id);
                data.touch();
                ctx.window().close();
                return;
            }
        }
        // Mode switches may have dropped a partial stroke.
        self.dirty = true;
        ctx.request_paint();
    }
}

impl Widget<AppState> for CanvasView {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::MouseDown(e) if e.button.is_left() => {
                let Some(global) = self.pointer(data, e.window_pos) else {
                    return;
                };
                self.with_canvas(data, |canvas| canvas.on_pointer_down(global));
                ctx.set_active(true);
            }

            Event::MouseDown(e) if e.button.is_right() => {
                ctx.show_context_menu(context_menu(ctx.window_id()), e.window_pos);
            }

            Event::MouseMove(e) if ctx.is_active() => {
                let Some(global) = self.pointer(data, e.window_pos) else {
                    return;
                };
                if let Some(response) = self.with_canvas(data, |canvas| canvas.on_pointer_move(global)) {
                    self.respond(ctx, response);
                }
            }

            Event::MouseUp(e) if e.button.is_left() && ctx.is_active() => {
                ctx.set_active(false);
                let Some(global) = self.pointer(data, e.window_pos) else {
                    return;
                };
                if let Some(response) = self.with_canvas(data, |canvas| canvas.on_pointer_up(global)) {
                    self.respond(ctx, response);
                }
            }

            Event::Command(cmd) => {
                if let Some(action) = cmd.get(CANVAS_ACTION) {
                    ctx.set_handled();
                    self.apply(ctx, data, *action);
                }
            }

            _ => {}
        }
    }

    fn lifecycle(&mut self, _ctx: &mut LifeCycleCtx, _event: &LifeCycle, _data: &AppState, _env: &Env) {
        // 不处理生命周期事件
    }

    fn update(&mut self, _ctx: &mut UpdateCtx, _old: &AppState, _data: &AppState, _env: &Env) {}

    fn layout(&mut self, _ctx: &mut LayoutCtx, bc: &BoxConstraints, data: &AppState, _env: &Env) -> Size {
        let (w, h) = data
            .controller
            .borrow()
            .registry()
            .get(self.id)
            .map_or((0, 0), FloatingCanvas::size);
        bc.constrain(Size::new(w as f64, h as f64))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        if self.dirty {
            let image = data.controller.borrow().registry().get(self.id).map(FloatingCanvas::display_image);
            if let Some(image) = image {
                self.cached_image = ctx
                    .make_image(
                        image.width() as usize,
                        image.height() as usize,
                        image.as_raw(),
                        ImageFormat::RgbaSeparate,
                    )
                    .ok();
            }
            self.dirty = false;
        }

        let rect = ctx.size().to_rect();
        if let Some(img) = &self.cached_image {
            ctx.draw_image(img, rect, InterpolationMode::NearestNeighbor);
        }
        // 红色边框，区分贴图和桌面
        ctx.stroke(rect.inset(-BORDER_WIDTH / 2.0), &Color::RED, BORDER_WIDTH);
    }
}
