/// Gamepad input via gilrs.
///
/// Button names come from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick  →  Move
///   A / R1              →  Use selected item
///   X                   →  Pick up
///   Y                   →  Drop
///   B                   →  Talk
///   L1 / L2             →  Toggle slot 1 / 2
///   Select              →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, info};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

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

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action → buttons, resolved from config.
#[derive(Debug)]
struct ActionMap {
    use_item: Vec<Btn>,
    pickup: Vec<Btn>,
    drop: Vec<Btn>,
    talk: Vec<Btn>,
    slot1: Vec<Btn>,
    slot2: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    /// Unknown names are skipped; a list with nothing usable keeps the
    /// built-in default for that action.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
            let list: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if list.is_empty() { fallback.to_vec() } else { list }
        }
        ActionMap {
            use_item: parse(&cfg.use_item, &[Btn::A, Btn::R1]),
            pickup: parse(&cfg.pickup, &[Btn::X]),
            drop: parse(&cfg.drop, &[Btn::Y]),
            talk: parse(&cfg.talk, &[Btn::B]),
            slot1: parse(&cfg.slot1, &[Btn::L1]),
            slot2: parse(&cfg.slot2, &[Btn::L2]),
            quit: parse(&cfg.quit, &[Btn::Select]),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Direction {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: Direction,
    stick: Direction,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    actions: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                info!(connected = has_pad, "gamepad backend ready");
                (Some(g), has_pad)
            }
            Err(e) => {
                info!(error = %e, "gamepad backend unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Direction::default(),
            stick: Direction::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_y = value,
                EventType::Connected => {
                    debug!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    debug!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.stick.left.held = self.stick_x < -STICK_DEADZONE;
        self.stick.right.held = self.stick_x > STICK_DEADZONE;
        self.stick.up.held = self.stick_y > STICK_DEADZONE;
        self.stick.down.held = self.stick_y < -STICK_DEADZONE;
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let slot = match gilrs_btn {
            Button::DPadUp => &mut self.dpad.up,
            Button::DPadDown => &mut self.dpad.down,
            Button::DPadLeft => &mut self.dpad.left,
            Button::DPadRight => &mut self.dpad.right,
            other => match Btn::from_gilrs(other) {
                Some(btn) => &mut self.buttons[btn as usize],
                None => return,
            },
        };
        slot.held = held;
        if held {
            slot.just_pressed = true;
        }
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn use_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.use_item)
    }
    pub fn pickup_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.pickup)
    }
    pub fn drop_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.drop)
    }
    pub fn talk_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.talk)
    }
    pub fn slot1_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.slot1)
    }
    pub fn slot2_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.slot2)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.quit)
    }

    pub fn up_held(&self) -> bool {
        self.dpad.up.held || self.stick.up.held
    }
    pub fn down_held(&self) -> bool {
        self.dpad.down.held || self.stick.down.held
    }
    pub fn left_held(&self) -> bool {
        self.dpad.left.held || self.stick.left.held
    }
    pub fn right_held(&self) -> bool {
        self.dpad.right.held || self.stick.right.held
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }
        for d in [&mut self.dpad, &mut self.stick] {
            d.up.just_pressed = false;
            d.down.just_pressed = false;
            d.left.just_pressed = false;
            d.right.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = Direction::default();
        self.stick = Direction::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
