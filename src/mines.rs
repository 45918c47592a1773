//! Mine sets and their arming state.

use crate::board::Cell;

/// Number of mine sets on the board.
pub const MINE_SET_COUNT: usize = 4;

/// Arming state of one mine set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MineState {
    #[default]
    Invisible,
    Primed,
    Exploded,
}

/// A group of cells that arm and detonate together.
///
/// `next_state` is the logical state, written by the mine cycle and used for
/// lethality. `state` is what is on screen; only the display stage commits it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MineSet {
    cells: &'static [Cell],
    pub state: MineState,
    pub next_state: MineState,
}

impl MineSet {
    pub const fn new(cells: &'static [Cell]) -> Self {
        Self {
            cells,
            state: MineState::Invisible,
            next_state: MineState::Invisible,
        }
    }

    pub const fn cells(&self) -> &'static [Cell] {
        self.cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Lethal right now.
    pub fn is_exploded(&self) -> bool {
        self.next_state == MineState::Exploded
    }

    /// Staged state differs from what was last drawn.
    pub fn is_dirty(&self) -> bool {
        self.state != self.next_state
    }

    /// Stage a new logical state.
    pub fn stage(&mut self, state: MineState) {
        self.next_state = state;
    }

    /// Record that the staged state has been drawn.
    pub fn commit(&mut self) {
        self.state = self.next_state;
    }
}

// ── Mine layout ─────────────────────────────────────────────────────────────
// Four disjoint sets of distinct sizes, all on free cells away from the spawn.

const SET_0: [Cell; 5] = [
    Cell::new(6, 1),
    Cell::new(9, 2),
    Cell::new(16, 2),
    Cell::new(3, 4),
    Cell::new(10, 4),
];

const SET_1: [Cell; 6] = [
    Cell::new(2, 6),
    Cell::new(7, 6),
    Cell::new(12, 6),
    Cell::new(17, 6),
    Cell::new(5, 9),
    Cell::new(14, 9),
];

const SET_2: [Cell; 7] = [
    Cell::new(6, 8),
    Cell::new(13, 8),
    Cell::new(18, 8),
    Cell::new(1, 9),
    Cell::new(8, 11),
    Cell::new(11, 11),
    Cell::new(3, 12),
];

const SET_3: [Cell; 4] = [
    Cell::new(19, 11),
    Cell::new(9, 13),
    Cell::new(4, 14),
    Cell::new(15, 14),
];

/// All four sets, all invisible.
pub const fn initial_mines() -> [MineSet; MINE_SET_COUNT] {
    [
        MineSet::new(&SET_0),
        MineSet::new(&SET_1),
        MineSet::new(&SET_2),
        MineSet::new(&SET_3),
    ]
}
