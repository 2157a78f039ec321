use crate::geometry::Rect;
use crate::world::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

pub fn world_to_screen_px(bounds: &Rect, viewport: &Viewport) -> ScreenRect {
    let pixels = bounds.to_pixels();
    ScreenRect {
        x: pixels.left - viewport.x,
        y: pixels.top - viewport.y,
        width: pixels.right - pixels.left,
        height: pixels.bottom - pixels.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_offset_by_viewport_origin() {
        let viewport = Viewport::new(100, 20, 320, 188);
        let rect = world_to_screen_px(&Rect::new(140.0, 60.0, 24.0, 42.0), &viewport);
        assert_eq!(
            rect,
            ScreenRect {
                x: 40,
                y: 40,
                width: 24,
                height: 42,
            }
        );
    }

    #[test]
    fn fractional_positions_floor() {
        let viewport = Viewport::new(0, 0, 320, 188);
        let rect = world_to_screen_px(&Rect::new(-0.5, 10.9, 16.0, 16.0), &viewport);
        assert_eq!(rect.x, -1);
        assert_eq!(rect.y, 10);
    }
}
