/// Axis-aligned boxes in world units.
///
/// Everything in the field is centred on its position (sprites are drawn
/// from their middle), so a `Rect` stores centre + size rather than a corner.
/// Collision is a plain interior-overlap test on insets of these boxes.

/// World size in units. The renderer scales this onto the terminal grid.
pub const WORLD_W: f32 = 900.0;
pub const WORLD_H: f32 = 500.0;

/// Static floor bar: centre y and thickness.
pub const FLOOR_Y: f32 = WORLD_H - 30.0;
pub const FLOOR_H: f32 = 18.0;

/// Top surface of the floor (what the cat stands on).
pub const FLOOR_TOP: f32 = FLOOR_Y - FLOOR_H / 2.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 { self.x - self.w / 2.0 }
    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w / 2.0 }
    #[inline]
    pub fn top(&self) -> f32 { self.y - self.h / 2.0 }
    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h / 2.0 }

    /// Shrink every side by `amount`. Size never goes below zero.
    pub fn inset(&self, amount: f32) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: (self.w - amount * 2.0).max(0.0),
            h: (self.h - amount * 2.0).max(0.0),
        }
    }

    /// Interiors intersect. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.w <= 0.0 || self.h <= 0.0 || other.w <= 0.0 || other.h <= 0.0 {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Inclusive point test (used for clicks on buttons).
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }
}
