//! Tank control: read the player while idle, propose a step while moving.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{
    Duration,
    Ticker,
};

use crate::board::Direction;
use crate::handoff::Handoff;
use crate::input::InputDevice;
use crate::state::{
    GameStore,
    TankState,
};

/// One refresh period of tank control.
///
/// The stop button is consulted exactly once per call. When idle the input
/// device is sampled; a press with a direction starts the tank. When moving
/// the candidate cell is the current one advanced by one step.
pub fn tank_step(tank: &mut TankState, input: &mut impl InputDevice) {
    if input.poll_stop_button() && tank.moving {
        debug!("tank stopped at {}", tank.position_current);
        tank.moving = false;
        tank.position_next = tank.position_current;
        return;
    }

    if tank.moving {
        tank.position_next = tank.position_current.step(tank.direction_current);
        trace!("tank proposes {}", tank.position_next);
        return;
    }

    let Some(command) = input.poll_input().decode() else {
        // Malformed direction code: keep whatever was selected before.
        return;
    };

    tank.direction_next = command.direction;
    if command.pressed && command.direction != Direction::None {
        tank.direction_current = command.direction;
        tank.moving = true;
        debug!("tank starts moving {}", tank.direction_current);
    }
}

/// Tank stage: one control step per refresh period, whatever the mine
/// cycle is doing. Each step starts a frame down the collision chain.
pub async fn run_tank<M: RawMutex, I: InputDevice>(
    store: &GameStore<M>,
    mut input: I,
    refresh_period: Duration,
    motion: &Handoff<M>,
) -> ! {
    info!("Tank task started");
    let mut ticker = Ticker::every(refresh_period);

    loop {
        ticker.next().await;

        {
            let mut state = store.lock().await;
            tank_step(&mut state.tank, &mut input);
        }

        motion.pass().await;
    }
}
