use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Uniform random placement: pick a random cell, retry when it already holds a
/// mine, until exactly the configured number of mines is placed.
#[derive(Clone, Debug)]
pub struct RandomLayoutGenerator {
    config: GameConfig,
    rng: SmallRng,
}

impl RandomLayoutGenerator {
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Self {
        Self::with_rng(config, SmallRng::from_os_rng())
    }

    fn with_rng(config: GameConfig, rng: SmallRng) -> Self {
        // re-clamp, the fields are public
        let config = GameConfig::new(config.size, config.mines);
        Self { config, rng }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(&mut self) -> MineLayout {
        let (rows, columns) = self.config.size;
        let mut mines: Array2<bool> = Array2::default(self.config.size.to_nd_index());

        let mut remaining = self.config.mines;
        while remaining > 0 {
            let coords = (
                self.rng.random_range(0..rows),
                self.rng.random_range(0..columns),
            );
            let cell = &mut mines[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                remaining -= 1;
            }
        }

        let layout = MineLayout::from_bounded_mask(mines);
        log::debug!(
            "Placed {} mines on a {}x{} board",
            layout.mine_count(),
            rows,
            columns
        );
        layout
    }
}
