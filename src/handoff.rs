//! Single-slot token hand-offs between pipeline stages.
//!
//! Each edge is a capacity-1 channel carrying a unit [`Token`]. Passing into
//! a full slot waits until the consumer takes the previous token, so a stage
//! can never run more than one token ahead of the next one.
//!
//! Two paths meet at the display stage. The frame chain runs once per tank
//! refresh; the step ring carries a single token once per full arming step
//! of the mine cycle:
//!
//! ```text
//! tank ──motion──▶ collision ──frame──▶ display ──score──▶ score
//!                                          ▲                 │
//!                                       stepped           speed_up
//!                                          │                 │
//!                                      mine cycle ◀──────────┘
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Permission for the downstream stage to run once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token;

/// One edge of the ring.
pub struct Handoff<M: RawMutex> {
    slot: Channel<M, Token, 1>,
}

impl<M: RawMutex> Handoff<M> {
    pub const fn new() -> Self {
        Self { slot: Channel::new() }
    }

    /// Hand the token downstream, waiting while the slot is occupied.
    pub async fn pass(&self) {
        self.slot.send(Token).await;
    }

    /// Hand the token downstream if the slot is free.
    ///
    /// Returns `false` and drops nothing when the slot already holds a token.
    pub fn try_pass(&self) -> bool {
        self.slot.try_send(Token).is_ok()
    }

    /// Wait for the upstream token.
    pub async fn take(&self) -> Token {
        self.slot.receive().await
    }

    pub fn try_take(&self) -> Option<Token> {
        self.slot.try_receive().ok()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.is_full()
    }
}

impl<M: RawMutex> Default for Handoff<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every edge between the five stages.
pub struct Pipeline<M: RawMutex> {
    /// Tank → collision, once per refresh period.
    pub motion: Handoff<M>,
    /// Collision → display.
    pub frame: Handoff<M>,
    /// Mine cycle → display, once per full arming step.
    pub stepped: Handoff<M>,
    /// Display → score.
    pub score: Handoff<M>,
    /// Score → mine cycle.
    pub speed_up: Handoff<M>,
}

impl<M: RawMutex> Pipeline<M> {
    pub const fn new() -> Self {
        Self {
            motion: Handoff::new(),
            frame: Handoff::new(),
            stepped: Handoff::new(),
            score: Handoff::new(),
            speed_up: Handoff::new(),
        }
    }

    /// Put the step ring's only token in front of the mine cycle.
    ///
    /// Returns `false` if it was already seeded.
    pub fn seed(&self) -> bool {
        self.speed_up.try_pass()
    }

    /// Tokens parked on the step ring. A running ring holds at most one.
    pub fn step_tokens(&self) -> usize {
        [&self.stepped, &self.score, &self.speed_up]
            .iter()
            .filter(|edge| edge.is_loaded())
            .count()
    }
}

impl<M: RawMutex> Default for Pipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::{
        block_on,
        select::{
            Either,
            select,
        },
    };
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::{
        Duration,
        Timer,
    };

    use super::*;

    #[test]
    fn slot_holds_exactly_one_token() {
        let edge: Handoff<NoopRawMutex> = Handoff::new();
        assert!(edge.try_pass());
        assert!(!edge.try_pass(), "second token must not fit");
        assert_eq!(edge.try_take(), Some(Token));
        assert_eq!(edge.try_take(), None);
    }

    #[test]
    fn take_consumes_what_pass_delivered() {
        let edge: Handoff<NoopRawMutex> = Handoff::new();
        block_on(async {
            edge.pass().await;
            assert!(edge.is_loaded());
            assert_eq!(edge.take().await, Token);
        });
        assert!(!edge.is_loaded());
    }

    #[test]
    fn pass_waits_while_the_slot_is_full() {
        let edge: Handoff<NoopRawMutex> = Handoff::new();
        assert!(edge.try_pass());

        let outcome = block_on(select(edge.pass(), Timer::after(Duration::from_millis(5))));
        assert!(matches!(outcome, Either::Second(())), "pass must not complete on a full slot");
        assert!(edge.is_loaded());

        // Draining the slot lets the next pass through.
        assert_eq!(edge.try_take(), Some(Token));
        block_on(edge.pass());
        assert_eq!(edge.try_take(), Some(Token));
        assert_eq!(edge.try_take(), None);
    }

    #[test]
    fn seeded_ring_carries_one_token() {
        let ring: Pipeline<NoopRawMutex> = Pipeline::new();
        assert_eq!(ring.step_tokens(), 0);
        assert!(ring.seed());
        assert!(!ring.seed());
        assert_eq!(ring.step_tokens(), 1);

        // Walk the token once round the step ring by hand.
        let edges = [&ring.speed_up, &ring.stepped, &ring.score];
        for (from, to) in edges.iter().zip(edges.iter().cycle().skip(1)) {
            assert!(from.try_take().is_some());
            assert!(to.try_pass());
            assert_eq!(ring.step_tokens(), 1);
        }
        assert!(ring.speed_up.is_loaded());
        assert!(!ring.motion.is_loaded());
        assert!(!ring.frame.is_loaded());
    }
}
