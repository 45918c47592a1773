//! The shared game record and the lock that guards it.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{
    Mutex,
    MutexGuard,
};
use embassy_time::{
    Duration,
    with_timeout,
};

use crate::board::{
    Cell,
    Direction,
};
use crate::config::GameConfig;
use crate::mines::{
    MINE_SET_COUNT,
    MineSet,
    initial_mines,
};

/// Tank intent and validated position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TankState {
    pub direction_current: Direction,
    pub direction_next: Direction,
    pub moving: bool,
    /// Always a validated, on-board, non-wall cell.
    pub position_current: Cell,
    /// Candidate for this tick. May be invalid until collision resolves it.
    pub position_next: Cell,
}

impl TankState {
    pub const fn spawn(at: Cell) -> Self {
        Self {
            direction_current: Direction::None,
            direction_next: Direction::None,
            moving: false,
            position_current: at,
            position_next: at,
        }
    }
}

/// Everything the five stages share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub tank: TankState,
    pub mines: [MineSet; MINE_SET_COUNT],
    pub score: u32,
    game_over: bool,
    pub mine_cycle_period: Duration,
}

impl GameState {
    /// Fresh session: tank at spawn, all mines invisible, score 0.
    pub const fn new(config: &GameConfig) -> Self {
        Self {
            tank: TankState::spawn(config.spawn),
            mines: initial_mines(),
            score: 0,
            game_over: false,
            mine_cycle_period: config.initial_mine_period,
        }
    }

    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// One-way latch.
    pub fn latch_game_over(&mut self) {
        self.game_over = true;
    }
}

/// Single-lock store around [`GameState`].
///
/// Every stage reads and writes through [`lock`](Self::lock) and keeps the
/// guard across its whole read-decide-write sequence. The guard releases on
/// drop, so early returns cannot leak the lock.
pub struct GameStore<M: RawMutex> {
    state: Mutex<M, GameState>,
    lock_timeout: Duration,
}

impl<M: RawMutex> GameStore<M> {
    pub const fn new(state: GameState, lock_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(state),
            lock_timeout,
        }
    }

    /// Acquire the state, waiting at most the configured timeout.
    ///
    /// # Panics
    ///
    /// When the wait expires. The pipeline holds the lock only for short
    /// synchronous sections, so expiry means the schedule is broken.
    pub async fn lock(&self) -> MutexGuard<'_, M, GameState> {
        match with_timeout(self.lock_timeout, self.state.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                error!("game state lock not acquired within {} ms", self.lock_timeout.as_millis());
                panic!("game state lock wait exceeded {} ms", self.lock_timeout.as_millis());
            }
        }
    }

    /// Non-blocking acquire.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, M, GameState>> {
        self.state.try_lock().ok()
    }
}
