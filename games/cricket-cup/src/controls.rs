//! Turns raw host input into match commands, one swing per press.

use std::collections::HashSet;

use crease_engine::InputEvent;
use crease_web::custom;

pub mod keys {
    pub const ENTER: u32 = 13;
    pub const SPACE: u32 = 32;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;
    pub const P: u32 = 80;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Swing the bat. `hint` steers the shot laterally, -1 (left) to 1 (right).
    AttemptHit { hint: f32 },
    Start,
    Restart,
    Pause,
    Resume,
    TogglePause,
}

#[derive(Debug, Default)]
pub struct Controls {
    held: HashSet<u32>,
    pointer_active: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one input event. Auto-repeat key presses and a second pointer
    /// press before release produce nothing.
    pub fn translate(&mut self, event: &InputEvent) -> Option<Command> {
        match *event {
            InputEvent::KeyDown { key_code } => {
                if !self.held.insert(key_code) {
                    return None;
                }
                match key_code {
                    keys::SPACE => Some(Command::AttemptHit { hint: 0.0 }),
                    keys::ARROW_LEFT => Some(Command::AttemptHit { hint: -1.0 }),
                    keys::ARROW_RIGHT => Some(Command::AttemptHit { hint: 1.0 }),
                    keys::ENTER => Some(Command::Start),
                    keys::P => Some(Command::TogglePause),
                    _ => None,
                }
            }
            InputEvent::KeyUp { key_code } => {
                self.held.remove(&key_code);
                None
            }
            InputEvent::PointerDown { .. } => {
                if self.pointer_active {
                    return None;
                }
                self.pointer_active = true;
                Some(Command::AttemptHit { hint: 0.0 })
            }
            InputEvent::PointerUp { .. } => {
                self.pointer_active = false;
                None
            }
            InputEvent::Visibility { visible } => {
                // Keys released while hidden never report a key-up.
                self.held.clear();
                self.pointer_active = false;
                Some(if visible { Command::Resume } else { Command::Pause })
            }
            InputEvent::Custom { kind, .. } => match kind {
                custom::START => Some(Command::Start),
                custom::RESTART => Some(Command::Restart),
                custom::PAUSE => Some(Command::Pause),
                custom::RESUME => Some(Command::Resume),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key_code: u32) -> InputEvent {
        InputEvent::KeyDown { key_code }
    }

    fn up(key_code: u32) -> InputEvent {
        InputEvent::KeyUp { key_code }
    }

    #[test]
    fn space_swings_once_per_press() {
        let mut controls = Controls::new();
        assert_eq!(
            controls.translate(&down(keys::SPACE)),
            Some(Command::AttemptHit { hint: 0.0 })
        );
        // auto-repeat
        assert_eq!(controls.translate(&down(keys::SPACE)), None);
        assert_eq!(controls.translate(&up(keys::SPACE)), None);
        assert!(controls.translate(&down(keys::SPACE)).is_some());
    }

    #[test]
    fn arrows_carry_direction() {
        let mut controls = Controls::new();
        assert_eq!(
            controls.translate(&down(keys::ARROW_LEFT)),
            Some(Command::AttemptHit { hint: -1.0 })
        );
        assert_eq!(
            controls.translate(&down(keys::ARROW_RIGHT)),
            Some(Command::AttemptHit { hint: 1.0 })
        );
    }

    #[test]
    fn pointer_debounces_until_release() {
        let mut controls = Controls::new();
        let press = InputEvent::PointerDown { x: 0.0, y: 0.0 };
        let release = InputEvent::PointerUp { x: 0.0, y: 0.0 };

        assert!(controls.translate(&press).is_some());
        assert_eq!(controls.translate(&press), None);
        controls.translate(&release);
        assert!(controls.translate(&press).is_some());
    }

    #[test]
    fn visibility_pauses_and_resumes() {
        let mut controls = Controls::new();
        controls.translate(&down(keys::SPACE));
        assert_eq!(
            controls.translate(&InputEvent::Visibility { visible: false }),
            Some(Command::Pause)
        );
        assert_eq!(
            controls.translate(&InputEvent::Visibility { visible: true }),
            Some(Command::Resume)
        );
        // held state was cleared while hidden
        assert!(controls.translate(&down(keys::SPACE)).is_some());
    }

    #[test]
    fn custom_events_map_to_commands() {
        let mut controls = Controls::new();
        let event = |kind| InputEvent::Custom { kind, a: 0.0, b: 0.0, c: 0.0 };
        assert_eq!(controls.translate(&event(custom::START)), Some(Command::Start));
        assert_eq!(controls.translate(&event(custom::RESTART)), Some(Command::Restart));
        assert_eq!(controls.translate(&event(custom::PAUSE)), Some(Command::Pause));
        assert_eq!(controls.translate(&event(custom::RESUME)), Some(Command::Resume));
        assert_eq!(controls.translate(&event(99)), None);
    }
}
