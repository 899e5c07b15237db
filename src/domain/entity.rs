/// Entities: the cat (player), falling coins and rugs, and per-frame input.

use super::geometry::{Rect, FLOOR_TOP};

/// Cat sprite footprint in world units.
pub const CAT_W: f32 = 56.0;
pub const CAT_H: f32 = 56.0;
/// Where the cat is dropped in at the start of a run.
pub const CAT_START: (f32, f32) = (120.0, 420.0);

pub const COIN_SIZE: f32 = 40.0;
pub const RUG_W: f32 = 70.0;
pub const RUG_H: f32 = 40.0;

/// Falling items are culled once their centre passes this line.
pub const CULL_Y: f32 = 600.0;

/// Horizontal movement (held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Frame input: movement is continuous, jump is edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
    pub jump: bool,
}

/// Touch zones of the play area:
/// bottom 35% jumps, upper-left half walks left, upper-right half walks right.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerZone {
    Jump,
    Left,
    Right,
}

/// Classify a pointer press. `fx`, `fy` are fractions (0..1) of the play area.
pub fn pointer_zone(fx: f32, fy: f32) -> PointerZone {
    if fy > 0.65 {
        PointerZone::Jump
    } else if fx < 0.5 {
        PointerZone::Left
    } else {
        PointerZone::Right
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Resting on the floor or the bottom world bound.
    pub on_ground: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player { x, y, vx: 0.0, vy: 0.0, on_ground: false }
    }

    /// A cat standing on the floor at horizontal position `x`.
    pub fn standing_at(x: f32) -> Self {
        Player { on_ground: true, ..Player::new(x, FLOOR_TOP - CAT_H / 2.0) }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, CAT_W, CAT_H)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FallerKind {
    Coin,
    Rug,
}

/// A coin or rug. Ignores gravity and falls at a constant speed.
#[derive(Clone, Debug)]
pub struct Faller {
    pub kind: FallerKind,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl Faller {
    pub fn coin(x: f32, speed: f32) -> Self {
        Faller { kind: FallerKind::Coin, x, y: -30.0, speed }
    }

    pub fn rug(x: f32, speed: f32) -> Self {
        Faller { kind: FallerKind::Rug, x, y: -40.0, speed }
    }

    pub fn rect(&self) -> Rect {
        match self.kind {
            FallerKind::Coin => Rect::new(self.x, self.y, COIN_SIZE, COIN_SIZE),
            FallerKind::Rug => Rect::new(self.x, self.y, RUG_W, RUG_H),
        }
    }

    pub fn advance(&mut self, dt_s: f32) {
        self.y += self.speed * dt_s;
    }

    pub fn off_screen(&self) -> bool {
        self.y > CULL_Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_zones_split_the_field() {
        assert_eq!(pointer_zone(0.1, 0.9), PointerZone::Jump);
        assert_eq!(pointer_zone(0.9, 0.66), PointerZone::Jump);
        assert_eq!(pointer_zone(0.1, 0.65), PointerZone::Left);
        assert_eq!(pointer_zone(0.49, 0.2), PointerZone::Left);
        assert_eq!(pointer_zone(0.5, 0.2), PointerZone::Right);
    }

    #[test]
    fn standing_cat_rests_on_floor() {
        let p = Player::standing_at(300.0);
        assert!(p.on_ground);
        assert_eq!(p.rect().bottom(), FLOOR_TOP);
    }

    #[test]
    fn fallers_spawn_above_view_and_cull_below() {
        let mut c = Faller::coin(400.0, 260.0);
        assert!(c.rect().bottom() < 0.0);
        c.advance(1.0);
        assert_eq!(c.y, 230.0);
        assert!(!c.off_screen());
        c.advance(2.0);
        assert!(c.off_screen());

        let r = Faller::rug(400.0, 300.0);
        assert_eq!(r.y, -40.0);
        assert_eq!(r.kind, FallerKind::Rug);
    }
}
