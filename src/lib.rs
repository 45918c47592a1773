//! # tank-minefield
//!
//! A tank crosses a walled board while four mine sets take turns arming and
//! exploding. Five stages hand tokens along single-slot edges:
//!
//! ```text
//! tank → collision → display        every refresh period
//! mine cycle → display → score → mine cycle    every full arming step
//! ```
//!
//! All of them share one [`GameState`] behind [`GameStore`]'s lock. The
//! score stage counts each completed arming step and speeds the mine cycle
//! up by 0.8; the display stage ends the session when the tank meets an
//! exploded mine.
//!
//! The game core is hardware-agnostic and tests on the host:
//!
//! ```bash
//! cargo test --lib --tests --target x86_64-unknown-linux-gnu
//! ```
//!
//! With the `badge` feature the crate also carries the Disobey 2026 badge
//! support layer used by the `minefield` firmware:
//! - **Display**: 320×170 ST7789 LCD over SPI with DMA
//! - **Buttons**: D-pad steers, A fires/confirms, B stops
//! - **LEDs**: score shown in binary on the WS2812 strip
//! - **Backlight**: display backlight control

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod board;
pub mod collision;
pub mod config;
pub mod handoff;
pub mod input;
pub mod mine_cycle;
pub mod mines;
pub mod render;
pub mod score;
pub mod state;
pub mod tank;

pub use board::{
    Cell,
    Direction,
    MAP,
    Map,
    Verdict,
};
pub use config::GameConfig;
pub use handoff::{
    Handoff,
    Pipeline,
    Token,
};
pub use input::{
    InputBits,
    InputDevice,
};
pub use mines::{
    MineSet,
    MineState,
};
pub use render::{
    Canvas,
    GraphicsCanvas,
    Layout,
};
pub use score::NumericReadout;
pub use state::{
    GameState,
    GameStore,
    TankState,
};

// ── Badge support ───────────────────────────────────────────────────────────

#[cfg(feature = "badge")]
mod backlight;
#[cfg(feature = "badge")]
mod buttons;
#[cfg(feature = "badge")]
mod display;
#[cfg(feature = "badge")]
mod leds;

#[cfg(feature = "badge")]
pub use backlight::Backlight;
#[cfg(feature = "badge")]
pub use buttons::Buttons;
#[cfg(feature = "badge")]
pub use display::{
    BadgeCanvas,
    Display,
};
#[cfg(feature = "badge")]
pub use leds::{
    LED_COUNT,
    Leds,
};
#[cfg(feature = "badge")]
pub use badge::*;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[cfg(feature = "badge")]
mod badge {
    use esp_hal::{
        Blocking,
        assign_resources,
        clock::{
            Clock,
            CpuClock,
        },
        gpio::{
            Level,
            Output,
            OutputConfig,
        },
        rmt::{
            Rmt,
            Tx,
            TxChannelConfig,
            TxChannelCreator as _,
        },
        rom,
        time::Rate,
    };

    use crate::leds::Leds;

    // ── Pin / peripheral assignments ────────────────────────────────────────

    assign_resources! {
        pub Resources<'d> {
            display: DisplayResources<'d> {
                dc: GPIO15,
                rst: GPIO7,
                sck: GPIO4,
                cs: GPIO6,
                miso: GPIO16,
                mosi: GPIO5,
                spi: SPI2,
                dma: DMA_CH0,
            },
            backlight: BacklightResources<'d> {
                led: GPIO19,
            },
            buttons: ButtonResources<'d> {
                up: GPIO11,
                down: GPIO1,
                left: GPIO21,
                right: GPIO2,
                a: GPIO13,
                b: GPIO38,
            },
            leds: LedResources<'d> {
                power: GPIO17,
                io: GPIO18,
                rmt: RMT,
            },
        }
    }

    // ── Board initialisation ────────────────────────────────────────────────

    /// Minimal CPU clock switcher for ESP32-S3.
    ///
    /// Steps through an intermediate frequency before reaching the target,
    /// which is required by the hardware.
    fn set_cpu_clock(cpu_clock_speed: CpuClock) {
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .sysclk_conf()
            .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .cpu_per_conf()
            .modify(|_, w| unsafe {
                let _ = w.pll_freq_sel().set_bit();
                w.cpuperiod_sel().bits(match cpu_clock_speed {
                    CpuClock::_80MHz => 0,
                    CpuClock::_160MHz => 1,
                    CpuClock::_240MHz => 2,
                    _ => panic!("Unsupported CPU clock speed"),
                })
            });

        rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
    }

    /// Bring up clocks and return the raw peripheral set.
    ///
    /// Call once at the top of `main`, then split with [`split_resources!`].
    #[must_use]
    pub fn init() -> esp_hal::peripherals::Peripherals {
        set_cpu_clock(CpuClock::_160MHz);
        let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
        esp_hal::init(config)
    }

    // ── Resource → peripheral conversions ───────────────────────────────────

    impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
        fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
            split_resources!(peripherals)
        }
    }

    impl<'a> From<LedResources<'a>> for esp_hal::rmt::Channel<'a, Blocking, Tx> {
        fn from(res: LedResources<'a>) -> Self {
            let _ws_power = Output::new(res.power, Level::High, OutputConfig::default());
            let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).unwrap();
            let tx_config = TxChannelConfig::default().with_clk_divider(1);
            rmt.channel0.configure_tx(res.io, tx_config).unwrap()
        }
    }

    impl<'a> From<LedResources<'a>> for Leds<'a> {
        fn from(res: LedResources<'a>) -> Self {
            Leds::new(res.into())
        }
    }
}
