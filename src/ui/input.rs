/// Input state tracker: keyboard + pointer (mouse).
///
/// Keyboard:
///   - Continuous walking while a key is held
///   - Edge-triggered jump / confirm (only fires on initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// Pointer: left-button presses are collected as terminal cells for the
/// caller to map onto the field (see `Renderer::screen_to_field`). A release
/// of the left button ends any touch walk, as lifting a finger would.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::entity::PointerZone;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the latest drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C.
    raw_events: Vec<KeyEvent>,

    /// Left-button presses this frame as (column, row).
    pointer_presses: Vec<(u16, u16)>,
    pointer_released: bool,

    /// Only true when keyboard enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            pointer_presses: Vec::with_capacity(4),
            pointer_released: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.pointer_presses.clear();
        self.pointer_released = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.pointer_presses.push((m.column, m.row));
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        self.pointer_released = true;
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "terminal event read failed"),
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn pointer_presses(&self) -> &[(u16, u16)] {
        &self.pointer_presses
    }

    pub fn pointer_released(&self) -> bool {
        self.pointer_released
    }
}

/// Touch-style walking driven by the pointer.
///
/// A press in the left/right zone starts walking until the pointer is
/// released; a press in the jump zone is a one-shot jump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchState {
    pub left: bool,
    pub right: bool,
}

impl TouchState {
    /// Apply a press. Returns true if it was a jump.
    pub fn press(&mut self, zone: PointerZone) -> bool {
        match zone {
            PointerZone::Jump => return true,
            PointerZone::Left => self.left = true,
            PointerZone::Right => self.right = true,
        }
        false
    }

    pub fn release(&mut self) {
        self.left = false;
        self.right = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_walk_holds_until_release() {
        let mut t = TouchState::default();
        assert!(!t.press(PointerZone::Left));
        assert!(t.left && !t.right);
        assert!(!t.press(PointerZone::Right));
        assert!(t.left && t.right);
        t.release();
        assert_eq!(t, TouchState::default());
    }

    #[test]
    fn touch_jump_is_one_shot() {
        let mut t = TouchState::default();
        assert!(t.press(PointerZone::Jump));
        assert_eq!(t, TouchState::default());
    }

    #[test]
    fn fresh_state_has_nothing_pressed() {
        let input = InputState::new();
        assert!(!input.any_held(&[KeyCode::Left, KeyCode::Right]));
        assert!(!input.any_pressed(&[KeyCode::Enter]));
        assert!(input.pointer_presses().is_empty());
        assert!(!input.pointer_released());
        assert!(!input.ctrl_c_pressed());
    }
}
