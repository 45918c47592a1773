//! Badge buttons as the game's controls.
//!
//! The D-pad steers, A is fire/confirm, B is the stop button. All six are
//! active low with pull-ups.

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::ButtonResources;
use crate::board::Direction;
use crate::input::{
    InputBits,
    InputDevice,
};

/// The buttons the game uses, ready for polling or async edge detection.
pub struct Buttons {
    pub up: Input<'static>,
    pub down: Input<'static>,
    pub left: Input<'static>,
    pub right: Input<'static>,
    pub a: Input<'static>,
    pub b: Input<'static>,
}

const DEBOUNCE_MS: u64 = 20;

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            up: Input::new(res.up, pull_up),
            down: Input::new(res.down, pull_up),
            left: Input::new(res.left, pull_up),
            right: Input::new(res.right, pull_up),
            a: Input::new(res.a, pull_up),
            b: Input::new(res.b, pull_up),
        }
    }
}

impl Buttons {
    /// Held D-pad direction. With several held, the first of
    /// up, down, left, right wins.
    pub fn direction(&self) -> Direction {
        if self.up.is_low() {
            Direction::Up
        } else if self.down.is_low() {
            Direction::Down
        } else if self.left.is_low() {
            Direction::Left
        } else if self.right.is_low() {
            Direction::Right
        } else {
            Direction::None
        }
    }

    /// Wait for a debounced press (falling edge, active low).
    pub async fn debounce_press(button: &mut Input<'_>) {
        loop {
            button.wait_for_falling_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_low() {
                return;
            }
        }
    }

    /// Wait for a debounced release (rising edge).
    pub async fn debounce_release(button: &mut Input<'_>) {
        loop {
            button.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_high() {
                return;
            }
        }
    }

    /// Block until A is pressed and let go, so the press that confirms a
    /// screen does not also fire in the game.
    pub async fn wait_for_confirm(&mut self) {
        Self::debounce_press(&mut self.a).await;
        Self::debounce_release(&mut self.a).await;
    }
}

impl InputDevice for Buttons {
    fn poll_input(&mut self) -> InputBits {
        InputBits::encode(self.direction(), self.a.is_low())
    }

    fn poll_stop_button(&mut self) -> bool {
        self.b.is_low()
    }
}
