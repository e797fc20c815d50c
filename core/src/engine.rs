use alloc::vec::Vec;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::*;

/// Mine layout plus what the player can see of it. Knows nothing about turns or
/// phases: callers decide what a hit mine or a cleared board means.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineParts")]
pub struct BoardEngine {
    config: GameConfig,
    mine_layout: MineLayout,
    visibility: Array2<Visibility>,
}

#[derive(Deserialize)]
struct EngineParts {
    config: GameConfig,
    mine_layout: MineLayout,
    visibility: Array2<Visibility>,
}

impl TryFrom<EngineParts> for BoardEngine {
    type Error = GameError;

    fn try_from(parts: EngineParts) -> Result<Self> {
        let EngineParts {
            config,
            mine_layout,
            visibility,
        } = parts;
        if visibility.dim() != mine_layout.cells().dim() || config.size != mine_layout.size() {
            return Err(GameError::MismatchedShapes);
        }
        Ok(Self {
            config: GameConfig::new(config.size, config.mines),
            mine_layout,
            visibility,
        })
    }
}

impl BoardEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        Self::with_config(mine_layout.game_config(), mine_layout)
    }

    fn with_config(config: GameConfig, mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            config,
            mine_layout,
            visibility: Array2::default(size.to_nd_index()),
        }
    }

    /// Lays out a fresh board with no exclusion zone, every cell hidden. The
    /// config is clamped first, whichever way it was built.
    pub fn generate<G: MineGenerator + ?Sized>(config: GameConfig, generator: &mut G) -> Self {
        let config = GameConfig::new(config.size, config.mines);
        Self::with_config(config, generator.generate(config, ExclusionZone::EMPTY))
    }

    /// Replaces the whole mine layout, keeping the current visibility grid. The
    /// requested mine count is the one the board was created with.
    pub fn regenerate<G: MineGenerator + ?Sized>(
        &mut self,
        generator: &mut G,
        exclude: ExclusionZone,
    ) {
        self.mine_layout = generator.generate(self.config, exclude);
        log::debug!(
            "Regenerated {}x{} layout avoiding {:?}, {} mines",
            self.config.rows(),
            self.config.cols(),
            exclude.center(),
            self.mine_layout.mine_count()
        );
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    pub fn mine_layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn visibility(&self) -> &Array2<Visibility> {
        &self.visibility
    }

    pub fn visibility_of(&self, coords: Coord2) -> Option<Visibility> {
        self.visibility.get(coords.to_nd_index()).copied()
    }

    pub fn value_of(&self, coords: Coord2) -> Option<CellValue> {
        self.mine_layout.value_at(coords)
    }

    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        Some(CellView::new(
            self.visibility_of(coords)?,
            self.value_of(coords)?,
        ))
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> Option<u8> {
        self.mine_layout.adjacent_mine_count(coords)
    }

    pub fn has_mine_near(&self, coords: Coord2) -> bool {
        self.mine_layout.has_mine_near(coords)
    }

    /// Reveals a hidden cell, cascading through neighbors when it has no adjacent
    /// mines. Flagged, revealed, and out-of-bounds cells are left alone.
    ///
    /// The cascade is depth-first over an explicit stack; neighbors are pushed in
    /// row-major offset order, so the last one pushed is visited first.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        let Some(Visibility::Hidden) = self.visibility_of(coords) else {
            return RevealOutcome::Continue;
        };

        self.visibility[coords.to_nd_index()] = Visibility::Revealed;
        let adjacent_mines = match self.mine_layout[coords] {
            CellValue::Mine => {
                log::debug!("Revealed mine at {:?}", coords);
                return RevealOutcome::HitMine;
            }
            CellValue::Safe(count) => count,
        };
        log::trace!("Revealed {:?}, adjacent mines: {}", coords, adjacent_mines);

        if adjacent_mines == 0 {
            let mut to_visit: Vec<Coord2> = self.hidden_neighbors(coords).collect();

            while let Some(visit_coords) = to_visit.pop() {
                // may have been reached through another path since it was pushed
                if !self.visibility[visit_coords.to_nd_index()].is_hidden() {
                    continue;
                }

                self.visibility[visit_coords.to_nd_index()] = Visibility::Revealed;
                // neighbors of a zero cell are never mines
                if self.mine_layout[visit_coords] == CellValue::Safe(0) {
                    log::trace!("Cascading from {:?}", visit_coords);
                    to_visit.extend(self.hidden_neighbors(visit_coords));
                }
            }
        }

        RevealOutcome::Continue
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        use Visibility::*;

        let Some(cell) = self.visibility.get_mut(coords.to_nd_index()) else {
            return MarkOutcome::NoChange;
        };

        match *cell {
            Hidden => {
                *cell = Flagged;
                MarkOutcome::Flagged
            }
            Flagged => {
                *cell = Hidden;
                MarkOutcome::Unflagged
            }
            Revealed => MarkOutcome::NoChange,
        }
    }

    /// Every safe cell is revealed. Flags are not considered.
    pub fn is_won(&self) -> bool {
        Zip::from(&self.visibility)
            .and(self.mine_layout.cells())
            .all(|visibility, value| value.is_mine() || visibility.is_revealed())
    }

    /// Shows every mine, leaving safe cells as they are.
    pub fn reveal_all_mines(&mut self) {
        Zip::from(&mut self.visibility)
            .and(self.mine_layout.cells())
            .for_each(|visibility, value| {
                if value.is_mine() {
                    *visibility = Visibility::Revealed;
                }
            });
    }

    fn hidden_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<'_> {
        self.mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.visibility[pos.to_nd_index()].is_hidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> BoardEngine {
        BoardEngine::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    fn revealed_count(engine: &BoardEngine) -> usize {
        engine.visibility().iter().filter(|v| v.is_revealed()).count()
    }

    #[test]
    fn reveal_hits_mine() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((0, 0)), RevealOutcome::HitMine);
        assert_eq!(engine.visibility_of((0, 0)), Some(Visibility::Revealed));
        assert_eq!(revealed_count(&engine), 1);
    }

    #[test]
    fn reveal_numbered_cell_does_not_cascade() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 1)), RevealOutcome::Continue);
        assert_eq!(revealed_count(&engine), 1);
        assert!(!engine.is_won());
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = engine((3, 3), &[(2, 2)]);

        assert_eq!(engine.reveal((0, 0)), RevealOutcome::Continue);

        assert_eq!(engine.cell_view((0, 0)), Some(CellView::Open(0)));
        assert_eq!(engine.cell_view((1, 1)), Some(CellView::Open(1)));
        assert_eq!(engine.cell_view((2, 2)), Some(CellView::Hidden));
        assert!(engine.is_won());
    }

    #[test]
    fn cascade_stops_at_numbered_border() {
        // mines down column 2 split the board; the right side stays hidden
        let mut engine = engine((3, 5), &[(0, 2), (1, 2), (2, 2)]);

        engine.reveal((1, 0));

        for row in 0..3 {
            assert_eq!(engine.cell_view((row, 0)), Some(CellView::Open(0)));
            assert!(engine.cell_view((row, 1)).is_some_and(|view| !view.is_closed()));
            assert_eq!(engine.cell_view((row, 3)), Some(CellView::Hidden));
            assert_eq!(engine.cell_view((row, 4)), Some(CellView::Hidden));
        }
    }

    #[test]
    fn cascade_never_crosses_flags() {
        let mut engine = engine((1, 5), &[]);
        assert_eq!(engine.toggle_flag((0, 2)), MarkOutcome::Flagged);

        engine.reveal((0, 0));

        assert_eq!(engine.visibility_of((0, 1)), Some(Visibility::Revealed));
        assert_eq!(engine.visibility_of((0, 2)), Some(Visibility::Flagged));
        assert_eq!(engine.visibility_of((0, 3)), Some(Visibility::Hidden));
        assert_eq!(engine.visibility_of((0, 4)), Some(Visibility::Hidden));
    }

    #[test]
    fn reveal_ignores_flagged_and_out_of_bounds_cells() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.toggle_flag((0, 0));

        assert_eq!(engine.reveal((0, 0)), RevealOutcome::Continue);
        assert_eq!(engine.visibility_of((0, 0)), Some(Visibility::Flagged));
        assert_eq!(engine.reveal((2, 0)), RevealOutcome::Continue);
        assert_eq!(engine.reveal((0, 200)), RevealOutcome::Continue);
        assert_eq!(revealed_count(&engine), 0);
    }

    #[test]
    fn toggle_flag_round_trips() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        let first = engine.toggle_flag((1, 1));
        let second = engine.toggle_flag((1, 1));

        assert_eq!(first.delta() + second.delta(), 0);
        assert_eq!(engine.visibility_of((1, 1)), Some(Visibility::Hidden));
    }

    #[test]
    fn toggle_flag_ignores_revealed_and_out_of_bounds_cells() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((1, 1));

        assert_eq!(engine.toggle_flag((1, 1)), MarkOutcome::NoChange);
        assert_eq!(engine.toggle_flag((5, 5)), MarkOutcome::NoChange);
    }

    #[test]
    fn flags_do_not_decide_the_win() {
        let mut engine = engine((1, 3), &[(0, 0)]);

        engine.toggle_flag((0, 0));
        engine.toggle_flag((0, 2));
        engine.reveal((0, 1));
        assert!(!engine.is_won());

        engine.toggle_flag((0, 2));
        engine.reveal((0, 2));
        assert!(engine.is_won());
        assert_eq!(engine.visibility_of((0, 0)), Some(Visibility::Flagged));
    }

    #[test]
    fn reveal_all_mines_leaves_safe_cells() {
        let mut engine = engine((2, 3), &[(0, 0), (1, 2)]);
        engine.toggle_flag((0, 1));

        engine.reveal_all_mines();

        assert_eq!(engine.cell_view((0, 0)), Some(CellView::Mine));
        assert_eq!(engine.cell_view((1, 2)), Some(CellView::Mine));
        assert_eq!(engine.visibility_of((0, 1)), Some(Visibility::Flagged));
        assert_eq!(engine.visibility_of((1, 0)), Some(Visibility::Hidden));
    }

    #[test]
    fn single_empty_cell_is_won_after_reveal() {
        let mut engine = engine((1, 1), &[]);

        assert!(!engine.is_won());
        assert_eq!(engine.reveal((0, 0)), RevealOutcome::Continue);
        assert!(engine.is_won());
    }

    #[test]
    fn regenerate_keeps_visibility_and_mine_count() {
        let mut generator = RandomMineGenerator::new(1);
        let mut engine = BoardEngine::generate(GameConfig::new((6, 6), 20), &mut generator);
        engine.toggle_flag((5, 5));

        engine.regenerate(&mut generator, ExclusionZone::around((0, 0)));

        assert_eq!(engine.mine_count(), 20);
        assert!(!engine.has_mine_near((0, 0)));
        assert_eq!(engine.visibility_of((5, 5)), Some(Visibility::Flagged));
    }

    #[test]
    fn generate_clamps_configs_built_without_new() {
        let mut generator = RandomMineGenerator::new(1);

        let engine = BoardEngine::generate(GameConfig { size: (2, 2), mines: 4 }, &mut generator);

        assert_eq!(engine.mine_count(), 3);
        assert_eq!(engine.config(), GameConfig::new((2, 2), 3));
    }

    #[test]
    fn generate_clamps_deserialized_configs() {
        let config: GameConfig = serde_json::from_str(r#"{"size":[3,3],"mines":50}"#).unwrap();
        let mut generator = RandomMineGenerator::new(7);

        let mut engine = BoardEngine::generate(config, &mut generator);
        assert_eq!(engine.mine_count(), 8);

        engine.regenerate(&mut generator, ExclusionZone::EMPTY);
        assert_eq!(engine.mine_count(), 8);
        assert_eq!(engine.config().mines, 8);
    }

    #[test]
    fn deserialize_restores_a_saved_board() {
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.toggle_flag((2, 2));
        engine.reveal((0, 0));

        let json = serde_json::to_string(&engine).unwrap();
        let restored: BoardEngine = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, engine);
        assert!(restored.is_won());
    }

    #[test]
    fn deserialize_rejects_mismatched_visibility() {
        let mut value = serde_json::to_value(engine((3, 3), &[(2, 2)])).unwrap();
        value["visibility"] = serde_json::to_value(Array2::<Visibility>::default((2, 3))).unwrap();

        assert!(serde_json::from_value::<BoardEngine>(value).is_err());
    }

    #[test]
    fn deserialize_rejects_config_for_another_size() {
        let mut value = serde_json::to_value(engine((3, 3), &[(2, 2)])).unwrap();
        value["config"]["size"] = serde_json::to_value((4, 4)).unwrap();

        assert!(serde_json::from_value::<BoardEngine>(value).is_err());
    }

    #[test]
    fn deserialize_clamps_the_stored_config() {
        let mut value = serde_json::to_value(engine((3, 3), &[(2, 2)])).unwrap();
        value["config"]["mines"] = serde_json::Value::from(50);

        let engine: BoardEngine = serde_json::from_value(value).unwrap();

        assert_eq!(engine.config().mines, 8);
    }
}
