/// Keyboard tracker for a turn-based game.
///
/// Every action here is edge-triggered: one physical press is one turn.
/// Terminals that never report Release would otherwise turn a held key
/// into a stream of auto-repeat Presses, so a key counts as held until
/// HOLD_TIMEOUT passes without hearing from it again.
///
/// Uses crossterm's keyboard enhancement for Release events when available.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::domain::position::Direction;

/// Silence after which a key is considered released (no-Release terminals only).
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key sets ──

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
pub const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('u'), KeyCode::Backspace];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r')];
pub const KEYS_SKIP: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Tab];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q')];

const DIRECTION_KEYS: [(Direction, &[KeyCode]); 4] = [
    (Direction::Up, KEYS_UP),
    (Direction::Down, KEYS_DOWN),
    (Direction::Left, KEYS_LEFT),
    (Direction::Right, KEYS_RIGHT),
];

pub struct InputState {
    /// Timestamp of the last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain, in arrival order.
    fresh_presses: Vec<KeyCode>,

    ctrl_c: bool,

    /// Only true once keyboard enhancement is confirmed working.
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

    /// Drain all pending terminal events. Call once per frame before stepping.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.ctrl_c = true;
                continue;
            }
            match key.kind {
                KeyEventKind::Release if self.honor_release => { self.last_active.remove(&normalize(key.code)); }
                KeyEventKind::Release => {}
                _ => self.record_press(key.code, Instant::now()),
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// The earliest fresh press this frame that names a direction.
    /// Later direction presses in the same frame are dropped.
    pub fn pressed_direction(&self) -> Option<Direction> {
        self.fresh_presses.iter().find_map(|code| {
            DIRECTION_KEYS.iter()
                .find(|(_, keys)| keys.contains(code))
                .map(|(dir, _)| *dir)
        })
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    // ── Internal ──

    fn record_press(&mut self, code: KeyCode, now: Instant) {
        let code = normalize(code);
        let was_held = self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false);
        self.last_active.insert(code, now);
        if !was_held { self.fresh_presses.push(code); }
    }
}

/// Shifted letters bind the same as lowercase.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_within_timeout_are_one_press() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record_press(KeyCode::Left, t0);
        input.record_press(KeyCode::Left, t0 + Duration::from_millis(30));
        assert_eq!(input.fresh_presses, vec![KeyCode::Left]);
    }

    #[test]
    fn press_after_timeout_is_fresh_again() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record_press(KeyCode::Char('z'), t0);
        input.record_press(KeyCode::Char('z'), t0 + HOLD_TIMEOUT + Duration::from_millis(1));
        assert_eq!(input.fresh_presses.len(), 2);
    }

    #[test]
    fn first_direction_wins() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record_press(KeyCode::Char('r'), t0);
        input.record_press(KeyCode::Char('D'), t0);
        input.record_press(KeyCode::Up, t0);
        assert_eq!(input.pressed_direction(), Some(Direction::Right));
        assert!(input.any_pressed(KEYS_RESTART));
        assert!(!input.any_pressed(KEYS_UNDO));
    }

    #[test]
    fn no_direction_without_presses() {
        assert_eq!(InputState::new().pressed_direction(), None);
    }
}
