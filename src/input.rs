//! Joystick-style input and its bit encoding.
//!
//! Bits 0–2 carry a direction code, bit 4 the fire/confirm button:
//!
//! | code | direction |
//! |------|-----------|
//! | 0    | none      |
//! | 1    | left      |
//! | 2    | right     |
//! | 3    | down      |
//! | 4    | up        |
//!
//! Codes 5–7 are malformed and decode to nothing.

use crate::board::Direction;

const DIRECTION_MASK: u8 = 0b0000_0111;
const PRESSED_BIT: u8 = 1 << 4;

/// Raw sample from the input device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputBits(pub u8);

/// A well-formed input sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub direction: Direction,
    pub pressed: bool,
}

impl InputBits {
    pub const fn encode(direction: Direction, pressed: bool) -> Self {
        let code = match direction {
            Direction::None => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Down => 3,
            Direction::Up => 4,
        };
        Self(if pressed { code | PRESSED_BIT } else { code })
    }

    /// `None` for a malformed direction code.
    pub const fn decode(self) -> Option<Command> {
        let direction = match self.0 & DIRECTION_MASK {
            0 => Direction::None,
            1 => Direction::Left,
            2 => Direction::Right,
            3 => Direction::Down,
            4 => Direction::Up,
            _ => return None,
        };
        Some(Command {
            direction,
            pressed: self.0 & PRESSED_BIT != 0,
        })
    }
}

/// The player's controls.
pub trait InputDevice {
    /// Sample direction and fire button.
    fn poll_input(&mut self) -> InputBits;

    /// Whether the stop button is held.
    fn poll_stop_button(&mut self) -> bool;
}

impl<T: InputDevice + ?Sized> InputDevice for &mut T {
    fn poll_input(&mut self) -> InputBits {
        (**self).poll_input()
    }

    fn poll_stop_button(&mut self) -> bool {
        (**self).poll_stop_button()
    }
}
