//! WS2812 LED strip as the score readout.
//!
//! The badge has 10 RGB LEDs. The low eight show the score in binary,
//! LED `i` lit when bit `i` is set.

extern crate alloc;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;


/// Number of WS2812 LEDs on the badge.
/// Index 0 is bottom right, 4 top right, 5 top left, 9 bottom left.
pub const LED_COUNT: usize = 10;

const SCORE_BITS: usize = 8;
const BIT_ON: Srgb<u8> = Srgb::new(0, 24, 6);
const OFF: Srgb<u8> = Srgb::new(0, 0, 0);

/// WS2812 LED strip driver.
///
/// Maintains an in-memory framebuffer that is flushed to hardware
/// with [`update`](Leds::update).
pub struct Leds<'a> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; LED_COUNT],
}

impl<'a> Leds<'a> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [OFF; LED_COUNT],
        }
    }

    /// Flush the framebuffer to the physical LEDs.
    pub async fn update(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return;
        };

        let pulses = self
            .framebuffer
            .iter()
            .flat_map(|c| {
                // WS2812 expects GRB byte order
                [
                    Self::byte_to_pulses(c.green),
                    Self::byte_to_pulses(c.red),
                    Self::byte_to_pulses(c.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("RMT transmit failed: {}", e);
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((err, ch)) => {
                error!("RMT transaction failed: {}", err);
                ch
            }
        });

        // WS2812 reset time
        Timer::after(Duration::from_micros(50)).await;
    }

    /// Fill all LEDs with one colour.
    pub fn fill(&mut self, color: Srgb<u8>) {
        self.framebuffer.fill(color);
    }

    /// Turn all LEDs off.
    pub fn clear(&mut self) {
        self.fill(OFF);
    }

    /// Lay out `value` in binary on the low eight LEDs.
    pub fn set_binary(&mut self, value: u8) {
        for (bit, led) in self.framebuffer[..SCORE_BITS].iter_mut().enumerate() {
            *led = if value & (1 << bit) != 0 { BIT_ON } else { OFF };
        }
    }

    /// Blink the whole strip, used for the end of a session.
    pub async fn blink(&mut self, color: Srgb<u8>, times: u8) {
        for _ in 0..times {
            self.fill(color);
            self.update().await;
            Timer::after(Duration::from_millis(250)).await;
            self.clear();
            self.update().await;
            Timer::after(Duration::from_millis(250)).await;
        }
    }

    // ── Internal helpers ────────────────────────────────────────────────

    /// WS2812 bit timing at 40 MHz RMT clock.
    const fn bit_to_pulse(bit: bool) -> PulseCode {
        if bit {
            // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
            PulseCode::new(Level::High, 32, Level::Low, 18)
        } else {
            // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
            PulseCode::new(Level::High, 16, Level::Low, 34)
        }
    }

    fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
        let mut pulses = [PulseCode::default(); 8];
        for (i, pulse) in pulses.iter_mut().enumerate() {
            *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
        }
        pulses
    }
}
