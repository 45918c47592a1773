//! Whole-game behaviour: stages driven by hand, and the real stage loops.

use embassy_futures::{
    block_on,
    select::{
        Either,
        Either3,
        select,
        select3,
        select4,
    },
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{
    Duration,
    Timer,
};
use embedded_graphics::pixelcolor::Rgb565;
use tank_minefield::{
    Canvas,
    Cell,
    Direction,
    GameConfig,
    GameState,
    GameStore,
    InputBits,
    InputDevice,
    MAP,
    MineState,
    NumericReadout,
    Pipeline,
    collision::{
        collision_step,
        run_collision,
    },
    mine_cycle::{
        MineCycle,
        run_mine_cycle,
    },
    render::{
        Frame,
        Reconciled,
        run_display,
    },
    score::{
        run_score,
        score_step,
    },
    tank::{
        run_tank,
        tank_step,
    },
};

#[derive(Default)]
struct Joystick {
    bits: InputBits,
}

impl InputDevice for Joystick {
    fn poll_input(&mut self) -> InputBits {
        self.bits
    }

    fn poll_stop_button(&mut self) -> bool {
        false
    }
}

#[derive(Default)]
struct CountingCanvas {
    calls: usize,
}

impl Canvas for CountingCanvas {
    fn draw_cell(&mut self, _: Rgb565, _: Cell) {
        self.calls += 1;
    }

    fn erase_cell(&mut self, _: Cell) {
        self.calls += 1;
    }

    fn draw_mine_glyph(&mut self, _: Rgb565, _: Cell) {
        self.calls += 1;
    }

    fn draw_text(&mut self, _: u16, _: u16, _: &str) {
        self.calls += 1;
    }

    fn clear_screen(&mut self, _: Rgb565) {
        self.calls += 1;
    }
}

struct NullReadout;

impl NumericReadout for NullReadout {
    fn display_number(&mut self, _: u8) {}
}

/// Refresh frames per mine sub-period at the default 100 ms / 1500 ms.
const FRAMES_PER_SUB_PERIOD: usize = 15;

/// The stages driven by hand in the order the loops run them.
struct Game {
    state: GameState,
    cycle: MineCycle,
    frame: Frame,
    canvas: CountingCanvas,
    input: Joystick,
    floor: Duration,
}

impl Game {
    fn new(cfg: GameConfig) -> Self {
        Self {
            state: GameState::new(&cfg),
            cycle: MineCycle::new(),
            frame: Frame::new(cfg.spawn),
            canvas: CountingCanvas::default(),
            input: Joystick::default(),
            floor: cfg.min_mine_period,
        }
    }

    /// One tank refresh: tank, collision, display.
    fn refresh(&mut self) -> Reconciled {
        tank_step(&mut self.state.tank, &mut self.input);
        collision_step(&mut self.state, &MAP);
        self.frame.reconcile(&mut self.state, &mut self.canvas)
    }

    /// One mine sub-period with `frames` refreshes inside it. A sub-period
    /// that ends a full arming step hands over to the score stage.
    fn sub_period(&mut self, frames: usize) -> Reconciled {
        let finished = self.cycle.step(&mut self.state.mines);
        for _ in 0..frames {
            let outcome = self.refresh();
            if outcome != Reconciled::Continue {
                return outcome;
            }
        }
        if finished {
            score_step(&mut self.state, self.floor);
        }
        Reconciled::Continue
    }

    /// One full Prime, Explode, Clear step.
    fn mine_step(&mut self, frames: usize) -> Reconciled {
        for _ in 0..3 {
            let outcome = self.sub_period(frames);
            if outcome != Reconciled::Continue {
                return outcome;
            }
        }
        Reconciled::Continue
    }
}

#[test]
fn idle_tank_scores_one_point_per_mine_step() {
    let cfg = GameConfig::default();
    let mut game = Game::new(cfg);

    for _ in 0..3 {
        assert_eq!(game.mine_step(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
    }

    assert_eq!(game.state.score, 3);
    assert_eq!(game.state.tank.position_current, cfg.spawn);
    assert!(!game.state.is_game_over());
    // Sets 0 to 2 were primed and exploded on screen.
    assert!(game.canvas.calls > 0);
}

#[test]
fn sub_periods_alone_do_not_score() {
    let mut game = Game::new(GameConfig::default());
    assert_eq!(game.sub_period(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
    assert_eq!(game.sub_period(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
    assert_eq!(game.state.score, 0);

    assert_eq!(game.sub_period(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
    assert_eq!(game.state.score, 1);
}

#[test]
fn tank_halts_one_cell_short_of_a_wall() {
    // Spawn (1, 7); the wall is at (4, 7).
    let mut game = Game::new(GameConfig::default());
    game.input.bits = InputBits::encode(Direction::Right, true);

    for _ in 0..2 {
        assert_eq!(game.mine_step(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
        assert_ne!(game.state.tank.position_current, Cell::new(4, 7));
    }

    let tank = game.state.tank;
    assert_eq!(tank.position_current, Cell::new(3, 7));
    assert_eq!(tank.position_next, Cell::new(3, 7));
    assert_eq!(tank.direction_current, Direction::Right);
    assert!(!game.state.is_game_over());
    assert_eq!(game.state.score, 2);
}

#[test]
fn tank_moves_every_refresh_within_one_sub_period() {
    // Row 0 is open from (0, 0) to (19, 0).
    let cfg = GameConfig::default().with_spawn(Cell::new(0, 0));
    let mut game = Game::new(cfg);
    game.input.bits = InputBits::encode(Direction::Right, true);

    // One press frame, then one cell per frame.
    assert_eq!(game.sub_period(6), Reconciled::Continue);
    assert_eq!(game.state.tank.position_current, Cell::new(5, 0));
}

#[test]
fn stationary_tank_dies_when_its_set_explodes() {
    // (2, 6) belongs to set 1, primed by the first step and exploded in the
    // second sub-period of the next one.
    let cfg = GameConfig::default().with_spawn(Cell::new(2, 6));
    let mut game = Game::new(cfg);

    assert_eq!(game.mine_step(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);
    assert_eq!(game.state.mines[1].next_state, MineState::Primed);
    assert_eq!(game.sub_period(FRAMES_PER_SUB_PERIOD), Reconciled::Continue);

    assert_eq!(game.sub_period(FRAMES_PER_SUB_PERIOD), Reconciled::Finished { score: 1 });
    assert!(game.state.is_game_over());
    assert_eq!(game.state.tank.position_current, cfg.spawn);
}

#[test]
fn mine_period_tracks_the_score() {
    let cfg = GameConfig::default();
    let mut game = Game::new(cfg);
    for _ in 0..6 {
        game.mine_step(1);
    }
    assert_eq!(game.state.score, 6);
    let expected = cfg.initial_mine_period.as_ticks() as f64 * 0.8f64.powi(6);
    let actual = game.state.mine_cycle_period.as_ticks() as f64;
    assert!((expected - actual).abs() <= 6.0);
}

#[test]
fn tank_loop_runs_at_refresh_rate_not_mine_rate() {
    // Mine sub-periods of a second never end within the run.
    let cfg = GameConfig::default()
        .with_spawn(Cell::new(0, 0))
        .with_initial_mine_period(Duration::from_secs(1))
        .with_refresh_period(Duration::from_millis(1))
        .with_score_period(Duration::from_millis(1));

    let store: GameStore<NoopRawMutex> = GameStore::new(GameState::new(&cfg), cfg.lock_timeout);
    let ring: Pipeline<NoopRawMutex> = Pipeline::new();
    assert!(ring.seed());
    let joystick = Joystick {
        bits: InputBits::encode(Direction::Right, true),
    };

    block_on(async {
        let stages = select4(
            run_mine_cycle(&store, &ring.speed_up, &ring.stepped),
            run_tank(&store, joystick, cfg.refresh_period, &ring.motion),
            run_collision(&store, &MAP, &ring.motion, &ring.frame),
            run_score(
                &store,
                NullReadout,
                cfg.score_period,
                cfg.min_mine_period,
                &ring.score,
                &ring.speed_up,
            ),
        );
        let display = run_display(
            &store,
            CountingCanvas::default(),
            cfg.spawn,
            &ring.frame,
            &ring.stepped,
            &ring.score,
        );
        match select3(Timer::after(Duration::from_millis(100)), display, stages).await {
            Either3::First(()) => {}
            Either3::Second(score) => panic!("game ended early with score {score}"),
            Either3::Third(_) => unreachable!("stage loops never return"),
        }
    });

    let state = store.try_lock().expect("no stage holds the lock");
    // At least twenty refreshes ran: the tank crossed the whole open row.
    assert_eq!(state.tank.position_current, Cell::new(19, 0));
    assert_eq!(state.tank.direction_current, Direction::Right);
    assert_eq!(state.mines[0].next_state, MineState::Primed);
    assert_eq!(state.score, 0);
}

#[test]
fn stage_loops_run_until_game_over() {
    // (2, 6) belongs to set 1, which explodes during the second mine step.
    let cfg = GameConfig::default()
        .with_spawn(Cell::new(2, 6))
        .with_initial_mine_period(Duration::from_millis(4))
        .with_refresh_period(Duration::from_millis(1))
        .with_score_period(Duration::from_millis(1));

    let store: GameStore<NoopRawMutex> = GameStore::new(GameState::new(&cfg), cfg.lock_timeout);
    let ring: Pipeline<NoopRawMutex> = Pipeline::new();
    assert!(ring.seed());

    let score = block_on(async {
        let display = run_display(
            &store,
            CountingCanvas::default(),
            cfg.spawn,
            &ring.frame,
            &ring.stepped,
            &ring.score,
        );
        let others = select4(
            run_mine_cycle(&store, &ring.speed_up, &ring.stepped),
            run_tank(&store, Joystick::default(), cfg.refresh_period, &ring.motion),
            run_collision(&store, &MAP, &ring.motion, &ring.frame),
            run_score(
                &store,
                NullReadout,
                cfg.score_period,
                cfg.min_mine_period,
                &ring.score,
                &ring.speed_up,
            ),
        );
        match select(display, others).await {
            Either::First(score) => score,
            Either::Second(_) => unreachable!("only the display stage returns"),
        }
    });

    assert_eq!(score, 1);
    let state = store.try_lock().expect("no stage holds the lock after teardown");
    assert!(state.is_game_over());
    assert_eq!(ring.step_tokens(), 0, "the step ring stops with the display stage");
}
