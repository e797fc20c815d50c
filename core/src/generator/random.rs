use rand::prelude::*;

use super::*;

/// Uniform rejection sampling with a bounded number of attempts, falling back to a
/// row-major fill when the attempts run out on dense boards.
///
/// One generator is meant to serve a whole session, so a regenerated layout keeps
/// drawing from the same seeded stream.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    seed: u64,
    rng: SmallRng,
}

impl RandomMineGenerator {
    /// Random attempts allowed per board cell before falling back.
    pub const ATTEMPTS_PER_CELL: u32 = 5;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, exclude: ExclusionZone) -> MineLayout {
        let (rows, cols) = config.size;
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let max_attempts = u32::from(config.total_cells()) * Self::ATTEMPTS_PER_CELL;

        let mut mines_placed: CellCount = 0;
        let mut attempts = 0;
        while mines_placed < config.mines && attempts < max_attempts {
            attempts += 1;
            let coords = (
                self.rng.random_range(0..rows),
                self.rng.random_range(0..cols),
            );
            if exclude.contains(coords) || mines[coords.to_nd_index()] {
                continue;
            }
            mines[coords.to_nd_index()] = true;
            mines_placed += 1;
        }

        if mines_placed < config.mines {
            log::debug!(
                "Placed {} of {} mines in {} attempts, filling the rest in row-major order",
                mines_placed,
                config.mines,
                attempts
            );
            for ((row, col), mine) in mines.indexed_iter_mut() {
                if mines_placed == config.mines {
                    break;
                }
                if *mine || exclude.contains((row as Coord, col as Coord)) {
                    continue;
                }
                *mine = true;
                mines_placed += 1;
            }
        }

        if mines_placed < config.mines {
            log::warn!(
                "Not enough room for mines outside the exclusion zone, requested {} but only fits {}",
                config.mines,
                mines_placed
            );
        }

        MineLayout::from_mine_mask_unchecked(&mines)
    }
}
