/// Flavour-text banner with a fade envelope.
///
///   0 ───200ms─── fully visible ───1000ms─── fade out ───1200ms─── gone
///
/// `hold_ms` (the point where fade-out starts) comes from config; the fade
/// lengths are fixed.

pub const FADE_MS: u32 = 200;

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    age_ms: u32,
    hold_ms: u32,
}

impl Toast {
    pub fn new(text: &str, hold_ms: u32) -> Self {
        Toast { text: text.to_string(), age_ms: 0, hold_ms: hold_ms.max(FADE_MS) }
    }

    pub fn tick(&mut self, dt_ms: u32) {
        self.age_ms = self.age_ms.saturating_add(dt_ms);
    }

    /// Opacity in [0, 1].
    pub fn alpha(&self) -> f32 {
        let age = self.age_ms;
        if age < FADE_MS {
            age as f32 / FADE_MS as f32
        } else if age < self.hold_ms {
            1.0
        } else if age < self.hold_ms + FADE_MS {
            1.0 - (age - self.hold_ms) as f32 / FADE_MS as f32
        } else {
            0.0
        }
    }

    pub fn expired(&self) -> bool {
        self.age_ms >= self.hold_ms + FADE_MS
    }
}
