//! Move validation and mine contact.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::board::{
    Map,
    Verdict,
};
use crate::handoff::Handoff;
use crate::state::{
    GameState,
    GameStore,
};

/// Resolve the tank's candidate cell, then check it against exploded mines.
///
/// A rejected move snaps the candidate back to the current cell and halts
/// the tank, keeping its direction. An accepted move becomes the current
/// cell. The mine check runs either way, so a stationary tank dies when the
/// set under it explodes.
pub fn collision_step(state: &mut GameState, map: &Map) -> Verdict {
    let tank = &mut state.tank;
    let verdict = map.check(tank.position_next);

    match verdict {
        Verdict::Accepted => tank.position_current = tank.position_next,
        Verdict::OutOfBounds | Verdict::Wall => {
            debug!("move to {} rejected: {}", tank.position_next, verdict);
            tank.position_next = tank.position_current;
            tank.moving = false;
        }
    }

    let at = tank.position_next;
    if state.mines.iter().any(|set| set.is_exploded() && set.contains(at)) {
        info!("tank hit a mine at {}", at);
        state.latch_game_over();
    }

    verdict
}

/// Collision stage.
pub async fn run_collision<M: RawMutex>(
    store: &GameStore<M>,
    map: &Map,
    motion: &Handoff<M>,
    frame: &Handoff<M>,
) -> ! {
    info!("Collision task started");

    loop {
        motion.take().await;

        {
            let mut state = store.lock().await;
            collision_step(&mut state, map);
        }

        frame.pass().await;
    }
}
