//! Round-robin arming of the mine sets.
//!
//! Each set spends three equal sub-periods in the spotlight:
//!
//! 1. **Prime**: stage `Primed` on the active set.
//! 2. **Explode**: stage `Exploded` on the active set.
//! 3. **Clear**: stage `Invisible` on the active set, advance the index,
//!    stage `Primed` on the new active set.
//!
//! Only staging happens here; the display stage commits what it draws.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{
    Instant,
    Timer,
};

use crate::handoff::Handoff;
use crate::mines::{
    MINE_SET_COUNT,
    MineState,
    MineSet,
};
use crate::state::GameStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Prime,
    Explode,
    Clear,
}

/// Mine-cycle position: which set is active and what it does next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MineCycle {
    active: usize,
    phase: Phase,
}

impl MineCycle {
    pub const fn new() -> Self {
        Self {
            active: 0,
            phase: Phase::Prime,
        }
    }

    pub const fn active(&self) -> usize {
        self.active
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply one sub-period to the sets and move to the next phase.
    ///
    /// Returns `true` when this sub-period finished a full arming step, i.e.
    /// it cleared the active set and primed the next one.
    pub fn step(&mut self, mines: &mut [MineSet; MINE_SET_COUNT]) -> bool {
        let finished = self.phase == Phase::Clear;
        match self.phase {
            Phase::Prime => {
                mines[self.active].stage(MineState::Primed);
                self.phase = Phase::Explode;
            }
            Phase::Explode => {
                mines[self.active].stage(MineState::Exploded);
                self.phase = Phase::Clear;
            }
            Phase::Clear => {
                mines[self.active].stage(MineState::Invisible);
                self.active = (self.active + 1) % MINE_SET_COUNT;
                mines[self.active].stage(MineState::Primed);
                self.phase = Phase::Prime;
            }
        }
        debug!("mine set {} staged {}", self.active, mines[self.active].next_state);
        finished
    }
}

impl Default for MineCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Mine-cycle stage. Never returns; the score stage simply stops feeding it.
///
/// Per step: wait for the score stage's token, then run Prime, Explode and
/// Clear, each followed by its own deadline one mine period later, and tell
/// the display stage the step is complete.
pub async fn run_mine_cycle<M: RawMutex>(
    store: &GameStore<M>,
    speed_up: &Handoff<M>,
    stepped: &Handoff<M>,
) -> ! {
    info!("Mine cycle task started");
    let mut cycle = MineCycle::new();
    let mut deadline = Instant::now();

    loop {
        speed_up.take().await;

        loop {
            let (period, finished) = {
                let mut state = store.lock().await;
                let finished = cycle.step(&mut state.mines);
                (state.mine_cycle_period, finished)
            };

            // Resynchronise instead of bursting if a sub-period overran.
            let now = Instant::now();
            deadline = if deadline + period < now { now + period } else { deadline + period };
            Timer::at(deadline).await;

            if finished {
                break;
            }
        }

        stepped.pass().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mines::initial_mines;

    fn non_invisible(mines: &[MineSet; MINE_SET_COUNT]) -> usize {
        mines
            .iter()
            .filter(|m| m.next_state != MineState::Invisible)
            .count()
    }

    #[test]
    fn active_index_is_round_robin() {
        let mut mines = initial_mines();
        let mut cycle = MineCycle::new();
        let mut seen = Vec::new();
        for _ in 0..(3 * MINE_SET_COUNT * 5) {
            if cycle.phase() == Phase::Prime {
                seen.push(cycle.active());
            }
            cycle.step(&mut mines);
        }
        let expected: Vec<usize> = (0..seen.len()).map(|i| i % MINE_SET_COUNT).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn each_set_visits_every_state_once_per_turn() {
        let mut mines = initial_mines();
        let mut cycle = MineCycle::new();
        let mut trace: [Vec<MineState>; MINE_SET_COUNT] =
            core::array::from_fn(|_| vec![MineState::Invisible]);

        for _ in 0..(3 * MINE_SET_COUNT) {
            cycle.step(&mut mines);
            for (i, set) in mines.iter().enumerate() {
                if trace[i].last() != Some(&set.next_state) {
                    trace[i].push(set.next_state);
                }
            }
        }

        let full = [
            MineState::Invisible,
            MineState::Primed,
            MineState::Exploded,
            MineState::Invisible,
        ];
        for (i, states) in trace.iter().enumerate() {
            assert_eq!(&states[..4], &full, "set {i}");
        }
        // Set 3 clearing re-primes set 0.
        assert_eq!(trace[0].len(), 5);
        assert!(trace[1..].iter().all(|t| t.len() == 4));
    }

    #[test]
    fn only_the_active_set_is_armed_outside_handover() {
        let mut mines = initial_mines();
        let mut cycle = MineCycle::new();
        for _ in 0..60 {
            cycle.step(&mut mines);
            assert_eq!(non_invisible(&mines), 1);
            assert_ne!(mines[cycle.active()].next_state, MineState::Invisible);
        }
    }

    #[test]
    fn clear_hands_over_to_the_next_set() {
        let mut mines = initial_mines();
        let mut cycle = MineCycle::new();
        assert!(!cycle.step(&mut mines));
        assert!(!cycle.step(&mut mines));
        assert_eq!(mines[0].next_state, MineState::Exploded);

        assert!(cycle.step(&mut mines), "clear ends the step");
        assert_eq!(mines[0].next_state, MineState::Invisible);
        assert_eq!(mines[1].next_state, MineState::Primed);
        assert_eq!(cycle.active(), 1);
        assert_eq!(cycle.phase(), Phase::Prime);
    }
}
