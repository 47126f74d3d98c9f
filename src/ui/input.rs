/// Input state tracker.
///
/// Collects the key events that arrived since the last frame. Every Press
/// and Repeat is one intent, matching keydown auto-repeat: holding an arrow
/// walks the player one cell per repeat. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_BGM: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];

/// Arrow keys and WASD (either case).
pub fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

pub struct InputState {
    /// Press/Repeat events from the most recent `drain_events()`, in order.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before acting on input.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(key);
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Release {
            self.presses.push(key);
        }
    }

    /// Move intents this frame, in arrival order.
    pub fn moves(&self) -> impl Iterator<Item = Direction> + '_ {
        self.presses.iter().filter_map(|k| direction_for(k.code))
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(direction_for(KeyCode::Up), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Char('W')), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Char('s')), Some(Direction::Down));
        assert_eq!(direction_for(KeyCode::Char('a')), Some(Direction::Left));
        assert_eq!(direction_for(KeyCode::Right), Some(Direction::Right));
        assert_eq!(direction_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn repeats_count_releases_do_not() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Down, KeyEventKind::Press));
        input.push(key(KeyCode::Down, KeyEventKind::Repeat));
        input.push(key(KeyCode::Down, KeyEventKind::Release));
        input.push(key(KeyCode::Char('d'), KeyEventKind::Press));
        let moves: Vec<Direction> = input.moves().collect();
        assert_eq!(moves, vec![Direction::Down, Direction::Down, Direction::Right]);
    }

    #[test]
    fn ctrl_c_needs_modifier() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Char('c'), KeyEventKind::Press));
        assert!(!input.ctrl_c_pressed());
        input.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
    }

    #[test]
    fn quit_and_confirm_keys() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Enter, KeyEventKind::Press));
        assert!(input.any_pressed(KEYS_CONFIRM));
        assert!(!input.any_pressed(KEYS_QUIT));
    }
}
