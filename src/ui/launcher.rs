//! The small always-available window with the capture button.
//!
//! The launcher hides itself while a capture runs so it never shows up in
//! the preview, and comes back once the delegate reports the session over.

use std::time::Duration;

use druid::widget::{Button, Controller, Flex};
use druid::{Env, Event, EventCtx, Selector, TimerToken, Widget, WidgetExt, WindowDesc};
use log::{debug, info};

use super::{to_point, AppState, CAPTURE_FINISHED, START_CAPTURE};
use crate::cursor;
use crate::geometry::{Point, Rect};
use crate::hotkey::HotkeyBinding;

const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time given to the window system to take the hidden launcher off screen.
const HIDE_SETTLE: Duration = Duration::from_millis(150);

/// Hide the launcher, then capture at this point.
const BEGIN_CAPTURE: Selector<Point> = Selector::new("pinsnap.launcher.begin-capture");

pub(super) fn window(hotkey: Option<HotkeyBinding>) -> WindowDesc<AppState> {
    let capture = Button::new("截图").on_click(|ctx, _data: &mut AppState, _env| {
        // The click happened on the button, so its centre is on the right display.
        let window = ctx.window().get_position();
        let centre = ctx.window_origin() + ctx.size().to_vec2() / 2.0;
        let pointer = to_point(window + centre.to_vec2());
        ctx.submit_command(BEGIN_CAPTURE.with(pointer).to(ctx.window_id()));
    });

    let root = Flex::column()
        .with_child(capture)
        .padding(12.0)
        .controller(LauncherController::new(hotkey));

    WindowDesc::new(root)
        .title("截图工具")
        .window_size((200.0, 100.0))
        .resizable(false)
}

/// Launcher visibility across one capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Visibility {
    #[default]
    Shown,
    /// Hidden, waiting for the window to leave the screen before grabbing.
    Hiding { pointer: Point },
    /// Hidden while the selection runs.
    Hidden,
}

impl Visibility {
    /// A capture was asked for. True if the window has to be hidden now;
    /// requests while a capture is already under way are dropped.
    fn request(&mut self, pointer: Point) -> bool {
        match self {
            Visibility::Shown => {
                *self = Visibility::Hiding { pointer };
                true
            }
            Visibility::Hiding { .. } | Visibility::Hidden => false,
        }
    }

    /// The hide delay ran out. Yields the point to start the capture at.
    fn settled(&mut self) -> Option<Point> {
        match *self {
            Visibility::Hiding { pointer } => {
                *self = Visibility::Hidden;
                Some(pointer)
            }
            Visibility::Shown | Visibility::Hidden => None,
        }
    }

    /// The session ended. True if the window has to be shown again.
    fn finished(&mut self) -> bool {
        let was_hidden = *self != Visibility::Shown;
        *self = Visibility::Shown;
        was_hidden
    }
}

/// Where a hotkey capture looks for its display: the pointer when the
/// platform reports it, else the middle of the launcher.
fn hotkey_pointer(cursor: Option<Point>, launcher: Rect) -> Point {
    cursor.unwrap_or_else(|| {
        debug!("Pointer position unavailable, using the launcher's display");
        launcher.center()
    })
}

/// Owns the hotkey binding (unregistered when the launcher goes away),
/// polls it from a UI-thread timer, and hides/shows the launcher around
/// each capture.
struct LauncherController {
    binding: Option<HotkeyBinding>,
    poll_timer: TimerToken,
    settle_timer: TimerToken,
    visibility: Visibility,
}

impl LauncherController {
    fn new(binding: Option<HotkeyBinding>) -> Self {
        Self {
            binding,
            poll_timer: TimerToken::INVALID,
            settle_timer: TimerToken::INVALID,
            visibility: Visibility::default(),
        }
    }

    fn begin(&mut self, ctx: &mut EventCtx, pointer: Point) {
        if self.visibility.request(pointer) {
            ctx.window().hide();
            self.settle_timer = ctx.request_timer(HIDE_SETTLE);
        }
    }

    fn launcher_rect(ctx: &EventCtx) -> Rect {
        let pos = to_point(ctx.window().get_position());
        let size = ctx.window().get_size();
        Rect::new(pos.x, pos.y, size.width as u32, size.height as u32)
    }
}

impl<W: Widget<AppState>> Controller<AppState, W> for LauncherController {
    fn event(&mut self, child: &mut W, ctx: &mut EventCtx, event: &Event, data: &mut AppState, env: &Env) {
        match event {
            Event::WindowConnected if self.binding.is_some() => {
                self.poll_timer = ctx.request_timer(HOTKEY_POLL_INTERVAL);
            }
            Event::Timer(token) if *token == self.poll_timer => {
                if let Some(binding) = self.binding.as_ref().filter(|b| b.poll_pressed()) {
                    info!("Capture hotkey {} pressed", binding.combo());
                    let pointer = hotkey_pointer(cursor::position(), Self::launcher_rect(ctx));
                    self.begin(ctx, pointer);
                }
                self.poll_timer = ctx.request_timer(HOTKEY_POLL_INTERVAL);
                return;
            }
            Event::Timer(token) if *token == self.settle_timer => {
                if let Some(pointer) = self.visibility.settled() {
                    ctx.submit_command(START_CAPTURE.with(pointer));
                }
                return;
            }
            Event::Command(cmd) if cmd.is(BEGIN_CAPTURE) => {
                if let Some(pointer) = cmd.get(BEGIN_CAPTURE) {
                    self.begin(ctx, *pointer);
                }
                ctx.set_handled();
                return;
            }
            Event::Command(cmd) if cmd.is(CAPTURE_FINISHED) => {
                if self.visibility.finished() {
                    ctx.window().show();
                }
                ctx.set_handled();
                return;
            }
            _ => {}
        }
        child.event(ctx, event, data, env)
    }
}
