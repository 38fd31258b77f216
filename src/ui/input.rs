/// Keyboard state tracker.
///
/// Movement is continuous while a key is held; pickup, drop, slot toggles,
/// use and talk fire once per press.
///
/// Terminals that report key release get exact hold tracking. Everywhere
/// else a key counts as released once no Press/Repeat has arrived for
/// `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Bindings ──

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_PICKUP: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
pub const KEYS_DROP: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
pub const KEYS_SLOT1: &[KeyCode] = &[KeyCode::Char('1')];
pub const KEYS_SLOT2: &[KeyCode] = &[KeyCode::Char('2')];
pub const KEYS_USE: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F'), KeyCode::Char(' ')];
pub const KEYS_TALK: &[KeyCode] = &[KeyCode::Char('t'), KeyCode::Char('T')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    ctrl_c: bool,
    /// Set once the terminal is known to send Release events.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Call once per
    /// frame before building the frame's input.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    /// Pressed this frame (edge trigger).
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn repeat_is_not_a_fresh_press() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.handle_key(press(KeyCode::Char('e')), t0);
        assert!(kb.any_pressed(KEYS_PICKUP));

        kb.begin_frame();
        kb.handle_key(press(KeyCode::Char('e')), t0 + Duration::from_millis(30));
        assert!(!kb.any_pressed(KEYS_PICKUP));
    }

    #[test]
    fn held_key_expires_without_release_events() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.handle_key(press(KeyCode::Left), t0);
        assert!(kb.is_held_at(KeyCode::Left, t0 + Duration::from_millis(100)));
        kb.expire(t0 + HOLD_TIMEOUT);
        assert!(!kb.is_held_at(KeyCode::Left, t0 + HOLD_TIMEOUT));
    }

    #[test]
    fn release_only_counts_when_trusted() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.handle_key(press(KeyCode::Up), t0);
        kb.handle_key(release(KeyCode::Up), t0);
        assert!(kb.is_held_at(KeyCode::Up, t0));

        kb.honor_release = true;
        kb.handle_key(release(KeyCode::Up), t0);
        assert!(!kb.is_held_at(KeyCode::Up, t0));
    }

    #[test]
    fn ctrl_c_is_caught_and_cleared_per_frame() {
        let mut kb = InputState::new();
        kb.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(kb.ctrl_c_pressed());
        assert!(!kb.any_pressed(&[KeyCode::Char('c')]));
        kb.begin_frame();
        assert!(!kb.ctrl_c_pressed());
    }
}
