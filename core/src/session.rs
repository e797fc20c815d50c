use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Playing -> Lost
/// - Playing -> Won
///
/// Both ends are terminal until the session is reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    Lost,
    Won,
}

impl GamePhase {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Accept flags before the first reveal. Off by default: the first action of a
    /// game has to be a reveal.
    pub allow_early_flags: bool,
}

/// One game from the first click to a win or a loss, plus the bookkeeping around
/// it: first-click safety, the flag counter and the timer.
///
/// The session never reads a clock; callers pass timestamps in with each action.
#[derive(Clone, Debug)]
pub struct GameSession<G = RandomMineGenerator> {
    generator: G,
    options: SessionOptions,
    engine: BoardEngine,
    phase: GamePhase,
    first_click_pending: bool,
    flags_placed: CellCount,
    started_at: Option<Millis>,
    elapsed_secs: u64,
}

impl GameSession<RandomMineGenerator> {
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, RandomMineGenerator::new(seed))
    }
}

impl<G: MineGenerator> GameSession<G> {
    pub fn new(config: GameConfig, generator: G) -> Self {
        Self::with_options(config, generator, SessionOptions::default())
    }

    pub fn with_options(config: GameConfig, mut generator: G, options: SessionOptions) -> Self {
        let engine = BoardEngine::generate(config, &mut generator);
        Self {
            generator,
            options,
            engine,
            phase: GamePhase::Playing,
            first_click_pending: true,
            flags_placed: 0,
            started_at: None,
            elapsed_secs: 0,
        }
    }

    /// Starts over with a freshly generated board, which may have a different size.
    pub fn reset(&mut self, config: GameConfig) {
        self.engine = BoardEngine::generate(config, &mut self.generator);
        self.phase = GamePhase::Playing;
        self.first_click_pending = true;
        self.flags_placed = 0;
        self.started_at = None;
        self.elapsed_secs = 0;
        let config = self.engine.config();
        log::debug!(
            "Game reset to {}x{} with {} mines",
            config.rows(),
            config.cols(),
            config.mines
        );
    }

    /// Reveals a cell. The first reveal of a game also starts the timer and, if the
    /// cell or any neighbor holds a mine, lays the mines out again away from it.
    pub fn handle_primary_action(&mut self, coords: Coord2, now: Millis) -> GamePhase {
        if !self.phase.is_playing() {
            return self.phase;
        }

        if self.first_click_pending {
            // out of bounds or flagged: nothing to reveal, the game has not started
            if self.engine.visibility_of(coords) != Some(Visibility::Hidden) {
                return self.phase;
            }

            self.started_at = Some(now);
            if self.engine.has_mine_near(coords) {
                log::debug!("First click at {:?} is next to a mine, regenerating", coords);
                self.engine
                    .regenerate(&mut self.generator, ExclusionZone::around(coords));
            }
            self.first_click_pending = false;
            log::debug!("Game started at {}ms", now);
        }

        match self.engine.reveal(coords) {
            RevealOutcome::HitMine => {
                self.engine.reveal_all_mines();
                self.finish(GamePhase::Lost, now);
            }
            RevealOutcome::Continue if self.engine.is_won() => {
                self.finish(GamePhase::Won, now);
            }
            RevealOutcome::Continue => {}
        }

        self.phase
    }

    /// Toggles a flag. Ignored once the game is over and, unless early flags are
    /// allowed, before the first reveal.
    pub fn handle_secondary_action(&mut self, coords: Coord2) -> MarkOutcome {
        if !self.phase.is_playing() {
            return MarkOutcome::NoChange;
        }
        if self.first_click_pending && !self.options.allow_early_flags {
            return MarkOutcome::NoChange;
        }

        let outcome = self.engine.toggle_flag(coords);
        self.flags_placed = self
            .flags_placed
            .saturating_add_signed(outcome.delta().into());
        outcome
    }

    /// Advances the timer while a started game is in progress.
    pub fn tick(&mut self, now: Millis) {
        if self.phase.is_playing() && !self.first_click_pending {
            self.update_elapsed(now);
        }
    }

    fn finish(&mut self, phase: GamePhase, now: Millis) {
        self.update_elapsed(now);
        self.phase = phase;
        log::debug!("Game {:?} after {}s", phase, self.elapsed_secs);
    }

    fn update_elapsed(&mut self, now: Millis) {
        if let Some(started_at) = self.started_at {
            self.elapsed_secs = now.saturating_sub(started_at) / 1000;
        }
    }
}

impl<G> GameSession<G> {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> GameConfig {
        self.engine.config()
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn size(&self) -> Coord2 {
        self.engine.size()
    }

    pub fn is_first_click(&self) -> bool {
        self.first_click_pending
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Configured mines minus placed flags; negative once flags outnumber mines.
    pub fn mines_remaining(&self) -> isize {
        (self.config().mines as isize) - (self.flags_placed as isize)
    }

    pub fn visibility_of(&self, coords: Coord2) -> Option<Visibility> {
        self.engine.visibility_of(coords)
    }

    pub fn value_of(&self, coords: Coord2) -> Option<CellValue> {
        self.engine.value_of(coords)
    }

    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        self.engine.cell_view(coords)
    }
}
