//! Global pointer position, for captures that don't start from a click.

use crate::geometry::Point;

/// Where the pointer is on the virtual desktop, if the platform can say.
#[cfg(target_os = "windows")]
pub fn position() -> Option<Point> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut pos = POINT::default();
    // SAFETY: `pos` is a live, writable POINT for the whole call.
    unsafe { GetCursorPos(&mut pos) }.ok()?;
    Some(Point::new(pos.x, pos.y))
}

#[cfg(not(target_os = "windows"))]
pub fn position() -> Option<Point> {
    None
}
