/// Gamepad input via gilrs.
///
/// Turn commands come from the config's `[gamepad]` table; movement is
/// the D-pad or the left stick. Everything is edge-triggered so that one
/// press is one turn. Without the "gamepad" feature the tracker never
/// reports anything.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::info;
use tracing::warn;

use crate::config::GamepadConfig;
use crate::domain::position::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.35;

/// Face, shoulder and menu buttons that can be bound to commands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Command bindings; an empty or unparsable list keeps the built-in default.
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    undo: Vec<Btn>,
    restart: Vec<Btn>,
    skip: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            undo: vec![Btn::B, Btn::L1],
            restart: vec![Btn::Y],
            skip: vec![Btn::Select],
            quit: vec![Btn::Start],
        }
    }
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(label: &str, names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter()
                .filter_map(|s| {
                    let b = Btn::from_name(s);
                    if b.is_none() { warn!("gamepad.{label}: unknown button {s:?}"); }
                    b
                })
                .collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            undo: parse_list("undo", &cfg.undo, d.undo),
            restart: parse_list("restart", &cfg.restart, d.restart),
            skip: parse_list("skip", &cfg.skip, d.skip),
            quit: parse_list("quit", &cfg.quit, d.quit),
        }
    }
}

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update`, indexed by `Btn as usize`.
    just_pressed: [bool; BTN_COUNT],

    /// Directions pressed since the last `update`, D-pad or stick.
    dir_pressed: [bool; 4],
    stick_held: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    actions: ActionMap,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                if let Some((_, pad)) = g.gamepads().next() { info!(name = pad.name(), "gamepad connected"); }
                Some(g)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            just_pressed: [false; BTN_COUNT],
            dir_pressed: [false; 4],
            stick_held: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::from_config(cfg),
        }
    }

    /// Poll pending events. Call once per frame before reading presses.
    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dir_pressed = [false; 4];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.press(btn),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_y = value,
                EventType::Connected => info!("gamepad connected"),
                EventType::Disconnected => {
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    info!("gamepad disconnected");
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let dir = match btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.dir_pressed[dir_index(dir)] = true;
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.just_pressed[b as usize] = true;
        }
    }

    /// Stick crossing the deadzone counts as a press; staying past it does not.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        let now = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for i in 0..4 {
            if now[i] && !self.stick_held[i] { self.dir_pressed[i] = true; }
        }
        self.stick_held = now;
    }

    // ── Queries ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn undo_pressed(&self) -> bool { self.any_pressed(&self.actions.undo) }
    pub fn restart_pressed(&self) -> bool { self.any_pressed(&self.actions.restart) }
    pub fn skip_pressed(&self) -> bool { self.any_pressed(&self.actions.skip) }
    pub fn quit_pressed(&self) -> bool { self.any_pressed(&self.actions.quit) }

    /// First pressed direction in Up, Down, Left, Right order.
    pub fn pressed_direction(&self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.dir_pressed[dir_index(*d)])
    }
}
