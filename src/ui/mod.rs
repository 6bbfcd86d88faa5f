//! druid shell around the capture pipeline.
//!
//! Every window shares one `AppState`. The controller inside it is only
//! touched from the UI thread, so `Rc<RefCell<_>>` is enough.

mod delegate;
mod floating;
mod launcher;
mod overlay;

use std::cell::RefCell;
use std::rc::Rc;

use druid::{AppLauncher, Data, Selector};
use log::{info, warn};
use rfd::MessageDialog;

use crate::capture::XcapScreen;
use crate::config::Config;
use crate::controller::CaptureController;
use crate::geometry::Point;
use crate::hotkey::HotkeyBinding;
use crate::registry::CanvasId;

pub type SharedController = Rc<RefCell<CaptureController<XcapScreen>>>;

/// Start a capture on the display under this virtual-desktop point.
pub(crate) const START_CAPTURE: Selector<Point> = Selector::new("pinsnap.start-capture");

/// A selection was pinned; open a window for it.
pub(crate) const CANVAS_PINNED: Selector<CanvasId> = Selector::new("pinsnap.canvas-pinned");

/// The capture session is over, however it ended; sent to the launcher.
pub(crate) const CAPTURE_FINISHED: Selector = Selector::new("pinsnap.capture-finished");

/// Toolbar and context-menu actions, targeted at a floating window.
pub(crate) const CANVAS_ACTION: Selector<CanvasAction> = Selector::new("pinsnap.canvas-action");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CanvasAction {
    Move,
    Pencil,
    Rectangle,
    ToggleToolbar,
    Copy,
    Close,
}

#[derive(Clone, Data)]
pub struct AppState {
    #[data(ignore)]
    controller: SharedController,
    /// Bumped whenever controller state that the widget tree reads changes.
    revision: u64,
}

impl AppState {
    fn new(controller: CaptureController<XcapScreen>) -> Self {
        Self { controller: Rc::new(RefCell::new(controller)), revision: 0 }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn toolbar_visible(&self, id: CanvasId) -> bool {
        self.controller
            .borrow()
            .registry()
            .get(id)
            .is_some_and(|canvas| canvas.toolbar_visible())
    }
}

fn to_point(p: druid::Point) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

fn to_druid(p: Point) -> druid::Point {
    druid::Point::new(p.x as f64, p.y as f64)
}

/// Shows a blocking error dialog. Never call with a controller borrow held.
fn report_error(title: &str, err: &dyn std::error::Error) {
    MessageDialog::new()
        .set_title(title)
        .set_description(err.to_string())
        .show();
}

/// Builds the controller, registers the hotkey, and runs the event loop.
pub fn run(config: Config) -> anyhow::Result<()> {
    let controller = CaptureController::new(XcapScreen::new()).with_toolbar(config.show_toolbar);

    let hotkey = config.hotkey().and_then(|combo| match HotkeyBinding::register(combo) {
        Ok(binding) => Some(binding),
        Err(e) => {
            warn!("{}; continuing without a global hotkey", e);
            None
        }
    });

    info!("pinsnap starting up");
    let launcher = launcher::window(hotkey);
    let delegate = delegate::Delegate::new(launcher.id);
    AppLauncher::with_window(launcher)
        .delegate(delegate)
        .launch(AppState::new(controller))?;
    Ok(())
}
