//! Drawing: the canvas seam, the embedded-graphics backend, and the
//! display stage that reconciles the screen with the game state.

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::FONT_6X10,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Circle,
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Baseline,
        Text,
    },
};
use heapless::String;

use crate::board::{
    Cell,
    Direction,
    Map,
};
use crate::config::{
    BOARD_X,
    BOARD_Y,
    CELL_PX,
};
use crate::handoff::Handoff;
use crate::mines::MineState;
use crate::state::{
    GameState,
    GameStore,
};

// ── Palette ─────────────────────────────────────────────────────────────────

pub const BG_COLOR: Rgb565 = Rgb565::new(0, 0, 12);
pub const WALL_COLOR: Rgb565 = Rgb565::new(14, 28, 14);
pub const TANK_COLOR: Rgb565 = Rgb565::new(4, 50, 8);
pub const BARREL_COLOR: Rgb565 = Rgb565::new(2, 24, 4);
pub const PRIMED_COLOR: Rgb565 = Rgb565::new(31, 52, 0);
pub const EXPLODED_COLOR: Rgb565 = Rgb565::new(31, 8, 0);
pub const TEXT_COLOR: Rgb565 = Rgb565::WHITE;
pub const END_COLOR: Rgb565 = Rgb565::new(12, 0, 0);

/// Glyph colour for a mine state. Invisible mines are erased instead.
pub const fn mine_color(state: MineState) -> Option<Rgb565> {
    match state {
        MineState::Invisible => None,
        MineState::Primed => Some(PRIMED_COLOR),
        MineState::Exploded => Some(EXPLODED_COLOR),
    }
}

// ── Canvas ──────────────────────────────────────────────────────────────────

/// Pixel-drawing service. A pure sink; nothing is ever read back.
pub trait Canvas {
    fn draw_cell(&mut self, color: Rgb565, cell: Cell);
    fn erase_cell(&mut self, cell: Cell);
    fn draw_mine_glyph(&mut self, color: Rgb565, cell: Cell);
    /// `row`/`col` are character positions.
    fn draw_text(&mut self, row: u16, col: u16, text: &str);
    fn clear_screen(&mut self, color: Rgb565);

    /// The tank sprite. Defaults to a plain cell.
    fn draw_tank(&mut self, cell: Cell, _direction: Direction) {
        self.draw_cell(TANK_COLOR, cell);
    }
}

/// Where the board sits on the target and how big a cell is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub origin: Point,
    pub cell_px: u32,
}

impl Layout {
    /// The badge screen.
    pub const BADGE: Self = Self {
        origin: Point::new(BOARD_X, BOARD_Y),
        cell_px: CELL_PX as u32,
    };

    fn cell_rect(&self, cell: Cell) -> Rectangle {
        let px = self.cell_px as i32;
        Rectangle::new(
            self.origin + Point::new(i32::from(cell.x) * px, i32::from(cell.y) * px),
            Size::new(self.cell_px, self.cell_px),
        )
    }
}

const CHAR_W: i32 = 6;
const CHAR_H: i32 = 10;

/// [`Canvas`] over any `Rgb565` embedded-graphics target.
pub struct GraphicsCanvas<D> {
    target: D,
    layout: Layout,
}

impl<D: DrawTarget<Color = Rgb565>> GraphicsCanvas<D> {
    pub const fn new(target: D, layout: Layout) -> Self {
        Self { target, layout }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn fill(&mut self, rect: Rectangle, color: Rgb565) {
        if rect.into_styled(PrimitiveStyle::with_fill(color)).draw(&mut self.target).is_err() {
            warn!("fill failed");
        }
    }
}

impl<D: DrawTarget<Color = Rgb565>> Canvas for GraphicsCanvas<D> {
    fn draw_cell(&mut self, color: Rgb565, cell: Cell) {
        let rect = self.layout.cell_rect(cell);
        self.fill(rect, color);
    }

    fn erase_cell(&mut self, cell: Cell) {
        self.draw_cell(BG_COLOR, cell);
    }

    fn draw_mine_glyph(&mut self, color: Rgb565, cell: Cell) {
        let rect = self.layout.cell_rect(cell);
        let glyph = Circle::new(rect.top_left + Point::new(1, 1), self.layout.cell_px - 2)
            .into_styled(PrimitiveStyle::with_fill(color));
        if glyph.draw(&mut self.target).is_err() {
            warn!("mine glyph failed at {}", cell);
        }
    }

    fn draw_text(&mut self, row: u16, col: u16, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, TEXT_COLOR);
        let at = Point::new(i32::from(col) * CHAR_W, i32::from(row) * CHAR_H);
        if Text::with_baseline(text, at, style, Baseline::Top)
            .draw(&mut self.target)
            .is_err()
        {
            warn!("text failed at row {} col {}", row, col);
        }
    }

    fn clear_screen(&mut self, color: Rgb565) {
        if self.target.clear(color).is_err() {
            warn!("clear failed");
        }
    }

    /// Hull inset by one pixel plus a barrel pointing along `direction`.
    fn draw_tank(&mut self, cell: Cell, direction: Direction) {
        let rect = self.layout.cell_rect(cell);
        self.fill(rect, BG_COLOR);
        self.fill(rect.offset(-1), TANK_COLOR);

        let px = self.layout.cell_px;
        let half = (px / 2) as i32;
        let barrel = match direction {
            Direction::None => return,
            Direction::Up => Rectangle::new(Point::new(half - 1, 0), Size::new(2, px / 2)),
            Direction::Down => Rectangle::new(Point::new(half - 1, half), Size::new(2, px / 2)),
            Direction::Left => Rectangle::new(Point::new(0, half - 1), Size::new(px / 2, 2)),
            Direction::Right => Rectangle::new(Point::new(half, half - 1), Size::new(px / 2, 2)),
        };
        self.fill(barrel.translate(rect.top_left), BARREL_COLOR);
    }
}

// ── Screens ─────────────────────────────────────────────────────────────────

/// Title shown while waiting for the confirm button.
pub fn draw_start_screen(canvas: &mut impl Canvas) {
    canvas.clear_screen(BG_COLOR);
    canvas.draw_text(6, 19, "TANK MINEFIELD");
    canvas.draw_text(9, 18, "PRESS A TO START");
}

/// Walls, the tank at its spawn, and the header line.
pub fn draw_board(canvas: &mut impl Canvas, map: &Map, state: &GameState) {
    canvas.clear_screen(BG_COLOR);
    canvas.draw_text(0, 1, "MINEFIELD");
    for wall in map.walls() {
        canvas.draw_cell(WALL_COLOR, wall);
    }
    canvas.draw_tank(state.tank.position_current, state.tank.direction_current);
}

pub fn draw_end_screen(canvas: &mut impl Canvas, score: u32) {
    canvas.clear_screen(END_COLOR);
    canvas.draw_text(6, 21, "GAME OVER");

    let mut line: String<20> = String::new();
    let _ = write!(line, "SCORE {score}");
    canvas.draw_text(9, 21, &line);
}

// ── Reconciliation ──────────────────────────────────────────────────────────

/// What the display stage should do after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciled {
    Continue,
    Finished { score: u32 },
}

/// What is currently on screen for the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    tank_cell: Cell,
    tank_direction: Direction,
}

impl Frame {
    /// Matches what [`draw_board`] leaves on screen.
    pub const fn new(spawn: Cell) -> Self {
        Self {
            tank_cell: spawn,
            tank_direction: Direction::None,
        }
    }

    /// Bring the screen in line with `state`, drawing only what changed, and
    /// commit every staged mine state that got drawn.
    pub fn reconcile(&mut self, state: &mut GameState, canvas: &mut impl Canvas) -> Reconciled {
        if state.is_game_over() {
            draw_end_screen(canvas, state.score);
            return Reconciled::Finished { score: state.score };
        }

        let tank = state.tank;
        if tank.position_current != self.tank_cell || tank.direction_current != self.tank_direction {
            canvas.erase_cell(self.tank_cell);
            canvas.draw_tank(tank.position_current, tank.direction_current);
            self.tank_cell = tank.position_current;
            self.tank_direction = tank.direction_current;

            // The old tank cell may have covered a primed glyph.
            for set in state.mines.iter().filter(|s| !s.is_dirty()) {
                if set.next_state == MineState::Primed {
                    for cell in beside(self.tank_cell, set.cells()) {
                        canvas.draw_mine_glyph(PRIMED_COLOR, cell);
                    }
                }
            }
        }

        for set in state.mines.iter_mut().filter(|s| s.is_dirty()) {
            trace!("mine set {} -> {}", set.state, set.next_state);
            match mine_color(set.next_state) {
                Some(color) => {
                    for cell in beside(self.tank_cell, set.cells()) {
                        canvas.draw_mine_glyph(color, cell);
                    }
                }
                None => {
                    for cell in beside(self.tank_cell, set.cells()) {
                        canvas.erase_cell(cell);
                    }
                }
            }
            set.commit();
        }

        Reconciled::Continue
    }
}

/// Mine cells other than the one the tank sprite occupies.
fn beside(tank: Cell, cells: &[Cell]) -> impl Iterator<Item = Cell> + '_ {
    cells.iter().copied().filter(move |&c| c != tank)
}

/// Display stage: one reconciliation per frame from the collision stage.
///
/// A frame that follows a completed mine step releases the score stage once
/// it is drawn. Returns the final score after drawing the end screen; it
/// never passes another token, which parks every other stage for good.
pub async fn run_display<M: RawMutex, C: Canvas>(
    store: &GameStore<M>,
    mut canvas: C,
    spawn: Cell,
    frame: &Handoff<M>,
    stepped: &Handoff<M>,
    score: &Handoff<M>,
) -> u32 {
    info!("Display task started");
    let mut on_screen = Frame::new(spawn);

    loop {
        frame.take().await;
        // Taken before locking so this frame is guaranteed to show the step.
        let step_done = stepped.try_take().is_some();

        let outcome = {
            let mut state = store.lock().await;
            on_screen.reconcile(&mut state, &mut canvas)
        };

        match outcome {
            Reconciled::Continue if step_done => score.pass().await,
            Reconciled::Continue => {}
            Reconciled::Finished { score } => {
                info!("Game over, final score {}", score);
                return score;
            }
        }
    }
}
