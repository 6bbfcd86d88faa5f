//! App-level command handling and window bookkeeping.

use std::collections::HashMap;

use druid::{AppDelegate, Command, DelegateCtx, Env, Handled, Target, WindowId};
use log::{error, info};

use super::{overlay, floating, report_error, AppState, CANVAS_PINNED, CAPTURE_FINISHED, START_CAPTURE};
use crate::controller::CaptureStart;
use crate::geometry::Point;
use crate::registry::CanvasId;

enum WindowRole {
    Overlay,
    Canvas(CanvasId),
}

pub(super) struct Delegate {
    launcher: WindowId,
    windows: HashMap<WindowId, WindowRole>,
    /// The overlay of the current selection session, if one is open.
    active_overlay: Option<WindowId>,
}

impl Delegate {
    pub(super) fn new(launcher: WindowId) -> Self {
        Self { launcher, windows: HashMap::new(), active_overlay: None }
    }

    fn start_capture(&mut self, ctx: &mut DelegateCtx, data: &mut AppState, pointer: Point) {
        let started = data.controller.borrow_mut().start_capture(pointer);
        match started {
            Ok(CaptureStart::Started { display, preview }) => {
                let desc = overlay::window(display, preview);
                self.windows.insert(desc.id, WindowRole::Overlay);
                self.active_overlay = Some(desc.id);
                ctx.new_window(desc);
                data.touch();
            }
            Ok(CaptureStart::Busy) => {}
            Err(e) => {
                error!("Capture failed: {}", e);
                report_error("截图失败", &e);
                ctx.submit_command(CAPTURE_FINISHED.to(self.launcher));
            }
        }
    }

    fn open_canvas(&mut self, ctx: &mut DelegateCtx, data: &mut AppState, id: CanvasId) {
        let desc = {
            let controller = data.controller.borrow();
            let Some(canvas) = controller.registry().get(id) else {
                return;
            };
            floating::window(id, canvas)
        };
        self.windows.insert(desc.id, WindowRole::Canvas(id));
        ctx.new_window(desc);
        data.touch();
    }
}

impl AppDelegate<AppState> for Delegate {
    fn command(
        &mut self,
        ctx: &mut DelegateCtx,
        _target: Target,
        cmd: &Command,
        data: &mut AppState,
        _env: &Env,
    ) -> Handled {
        if let Some(pointer) = cmd.get(START_CAPTURE) {
            self.start_capture(ctx, data, *pointer);
            return Handled::Yes;
        }
        if let Some(id) = cmd.get(CANVAS_PINNED) {
            self.open_canvas(ctx, data, *id);
            return Handled::Yes;
        }
        Handled::No
    }

    fn window_removed(&mut self, id: WindowId, data: &mut AppState, _env: &Env, ctx: &mut DelegateCtx) {
        match self.windows.remove(&id) {
            Some(WindowRole::Overlay) => {
                if self.active_overlay == Some(id) {
                    self.active_overlay = None;
                    if data.controller.borrow_mut().cancel_selection() {
                        info!("Overlay closed mid-selection, capture cancelled");
                    }
                    ctx.submit_command(CAPTURE_FINISHED.to(self.launcher));
                }
            }
            Some(WindowRole::Canvas(canvas)) => {
                data.controller.borrow_mut().registry_mut().close(canvas);
            }
            None => {}
        }
        data.touch();
    }
}
