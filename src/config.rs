//! Board geometry and game tuning.
//!
//! Layout values are compile-time constants. Timing lives in [`GameConfig`],
//! built with `const fn` setters so the firmware can keep it in a `static`.

use embassy_time::Duration;

use crate::board::Cell;

// ── Screen / board geometry ─────────────────────────────────────────────────

/// Screen width in pixels (ST7789, landscape).
pub const SCREEN_W: i32 = 320;

/// Screen height in pixels.
pub const SCREEN_H: i32 = 170;

/// Board columns.
pub const BOARD_W: i16 = 20;

/// Board rows.
pub const BOARD_H: i16 = 15;

/// Pixel size of one board cell.
pub const CELL_PX: i32 = 8;

/// Board origin on screen, centred horizontally, one text row below the top.
pub const BOARD_X: i32 = (SCREEN_W - BOARD_W as i32 * CELL_PX) / 2;
pub const BOARD_Y: i32 = 24;

// ── Timing defaults ─────────────────────────────────────────────────────────

const DEFAULT_REFRESH_MS: u64 = 100;
const DEFAULT_MINE_PERIOD_MS: u64 = 1500;
const DEFAULT_MIN_MINE_PERIOD_MS: u64 = 1;
const DEFAULT_SCORE_PERIOD_MS: u64 = 10;
// Long enough to mean "wait until available".
const DEFAULT_LOCK_TIMEOUT_S: u64 = 60;

/// Mine-period shrink per scoring tick, as `num / den` (0.8).
pub const SPEED_UP_NUM: u64 = 4;
pub const SPEED_UP_DEN: u64 = 5;

/// Runtime tuning for one game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// TankTask refresh period.
    pub refresh_period: Duration,
    /// Length of one mine sub-period at score 0.
    pub initial_mine_period: Duration,
    /// Lowest mine sub-period the speed-up may reach.
    pub min_mine_period: Duration,
    /// ScoreTask's own period boundary before it hands back to the mine cycle.
    pub score_period: Duration,
    /// Bound on a game-state lock wait. Expiry is fatal.
    pub lock_timeout: Duration,
    /// Where the tank starts.
    pub spawn: Cell,
}

impl GameConfig {
    pub const fn new() -> Self {
        Self {
            refresh_period: Duration::from_millis(DEFAULT_REFRESH_MS),
            initial_mine_period: Duration::from_millis(DEFAULT_MINE_PERIOD_MS),
            min_mine_period: Duration::from_millis(DEFAULT_MIN_MINE_PERIOD_MS),
            score_period: Duration::from_millis(DEFAULT_SCORE_PERIOD_MS),
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_S),
            spawn: Cell::new(1, 7),
        }
    }

    #[must_use]
    pub const fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }

    #[must_use]
    pub const fn with_initial_mine_period(mut self, period: Duration) -> Self {
        self.initial_mine_period = period;
        self
    }

    #[must_use]
    pub const fn with_min_mine_period(mut self, period: Duration) -> Self {
        self.min_mine_period = period;
        self
    }

    #[must_use]
    pub const fn with_score_period(mut self, period: Duration) -> Self {
        self.score_period = period;
        self
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_spawn(mut self, spawn: Cell) -> Self {
        self.spawn = spawn;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
