//! Scoring and the difficulty ramp.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{
    Duration,
    Ticker,
};

use crate::config::{
    SPEED_UP_DEN,
    SPEED_UP_NUM,
};
use crate::handoff::Handoff;
use crate::state::{
    GameState,
    GameStore,
};

/// Numeric readout for the score.
///
/// Must not wait: an implementation that cannot take the value right now
/// drops it.
pub trait NumericReadout {
    fn display_number(&mut self, value: u8);
}

impl<T: NumericReadout + ?Sized> NumericReadout for &mut T {
    fn display_number(&mut self, value: u8) {
        (**self).display_number(value);
    }
}

/// Shrink a mine period by 0.8, never below `floor`.
pub fn sped_up(period: Duration, floor: Duration) -> Duration {
    let next = Duration::from_ticks(period.as_ticks() * SPEED_UP_NUM / SPEED_UP_DEN);
    next.max(floor)
}

/// One completed mine step: bump the score and speed up the mine cycle.
/// Returns the new score.
pub fn score_step(state: &mut GameState, floor: Duration) -> u32 {
    state.score = state.score.saturating_add(1);
    state.mine_cycle_period = sped_up(state.mine_cycle_period, floor);
    debug!("score {} mine period {} ms", state.score, state.mine_cycle_period.as_millis());
    state.score
}

/// What the readout can show, or `None` when the score has outgrown it.
pub fn readout_value(score: u32) -> Option<u8> {
    u8::try_from(score).ok()
}

/// Score stage: count the completed mine step, update the readout, wait for
/// its own period boundary, then release the mine cycle.
pub async fn run_score<M: RawMutex, R: NumericReadout>(
    store: &GameStore<M>,
    mut readout: R,
    score_period: Duration,
    min_mine_period: Duration,
    score: &Handoff<M>,
    speed_up: &Handoff<M>,
) -> ! {
    info!("Score task started");
    let mut ticker = Ticker::every(score_period);

    loop {
        score.take().await;

        let current = {
            let mut state = store.lock().await;
            score_step(&mut state, min_mine_period)
        };

        match readout_value(current) {
            Some(value) => readout.display_number(value),
            None => warn!("score {} does not fit the readout", current),
        }

        ticker.next().await;
        speed_up.pass().await;
    }
}
