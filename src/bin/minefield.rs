//! Tank Minefield firmware for the Disobey 2026 badge.
//!
//! Steer the tank across the board while four mine sets arm and explode in
//! turn. Every set that finishes its turn scores a point and shortens the
//! mine cycle. Touch an exploded mine and the game is over.
//!
//! Controls:
//! - D-pad: choose a direction
//! - A: start moving / confirm
//! - B: stop
//!
//! Build with `cargo run --release --features badge --bin minefield`.

#![no_std]
#![no_main]

use defmt::{
    info,
    warn,
};
use embassy_executor::Spawner;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
};
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use palette::Srgb;
use tank_minefield::{
    Backlight,
    BadgeCanvas,
    Buttons,
    Display,
    GameConfig,
    GameState,
    GameStore,
    Leds,
    MAP,
    NumericReadout,
    Pipeline,
    collision::run_collision,
    mine_cycle::run_mine_cycle,
    mk_static,
    render::{
        draw_board,
        draw_start_screen,
        run_display,
    },
    score::run_score,
    split_resources,
    tank::run_tank,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

const CONFIG: GameConfig = GameConfig::new();

static STORE: GameStore<CriticalSectionRawMutex> =
    GameStore::new(GameState::new(&CONFIG), CONFIG.lock_timeout);

static PIPELINE: Pipeline<CriticalSectionRawMutex> = Pipeline::new();

// ── LED events ──────────────────────────────────────────────────────────────
#[derive(Clone, Copy)]
enum LedEvent {
    Score(u8),
    GameOver,
}

static LED_CHANNEL: Channel<CriticalSectionRawMutex, LedEvent, 4> = Channel::new();

/// Score readout that forwards to the LED task, dropping the update when
/// the LED task is behind.
struct LedReadout;

impl NumericReadout for LedReadout {
    fn display_number(&mut self, value: u8) {
        if LED_CHANNEL.try_send(LedEvent::Score(value)).is_err() {
            warn!("LED queue full, score {} not shown", value);
        }
    }
}

// ── Tasks ───────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn led_task(leds: &'static mut Leds<'static>) {
    info!("LED task started");
    leds.clear();
    leds.update().await;

    loop {
        match LED_CHANNEL.receive().await {
            LedEvent::Score(value) => {
                leds.set_binary(value);
                leds.update().await;
            }
            LedEvent::GameOver => leds.blink(Srgb::new(20, 0, 0), 4).await,
        }
    }
}

#[embassy_executor::task]
async fn mine_cycle_task() {
    run_mine_cycle(&STORE, &PIPELINE.speed_up, &PIPELINE.stepped).await
}

#[embassy_executor::task]
async fn tank_task(buttons: &'static mut Buttons) {
    run_tank(
        &STORE,
        buttons,
        CONFIG.refresh_period,
        &PIPELINE.motion,
    )
    .await
}

#[embassy_executor::task]
async fn collision_task() {
    run_collision(&STORE, &MAP, &PIPELINE.motion, &PIPELINE.frame).await
}

#[embassy_executor::task]
async fn display_task(canvas: BadgeCanvas<'static>) {
    let score = run_display(
        &STORE,
        canvas,
        CONFIG.spawn,
        &PIPELINE.frame,
        &PIPELINE.stepped,
        &PIPELINE.score,
    )
    .await;
    // Nothing passes the token on from here, so the other stages stay parked.
    info!("Session over, score {}", score);
    LED_CHANNEL.send(LedEvent::GameOver).await;
}

#[embassy_executor::task]
async fn score_task() {
    run_score(
        &STORE,
        LedReadout,
        CONFIG.score_period,
        CONFIG.min_mine_period,
        &PIPELINE.score,
        &PIPELINE.speed_up,
    )
    .await
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = tank_minefield::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let display: Display<'static> = resources.display.into();
    let mut canvas: BadgeCanvas<'static> = display.into();
    let backlight = mk_static!(Backlight, resources.backlight.into());
    let buttons = mk_static!(Buttons, resources.buttons.into());
    let leds = mk_static!(Leds<'static>, resources.leds.into());

    draw_start_screen(&mut canvas);
    backlight.on();
    info!("Waiting for A");
    buttons.wait_for_confirm().await;

    {
        let state = STORE.lock().await;
        draw_board(&mut canvas, &MAP, &state);
    }

    spawner.must_spawn(led_task(leds));
    spawner.must_spawn(mine_cycle_task());
    spawner.must_spawn(tank_task(buttons));
    spawner.must_spawn(collision_task());
    spawner.must_spawn(display_task(canvas));
    spawner.must_spawn(score_task());

    if !PIPELINE.seed() {
        warn!("step ring was already seeded");
    }
    info!("Game started");

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
