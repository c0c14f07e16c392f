use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Init -> Playing (first primary press)
/// - Playing -> Won
/// - Playing -> Lost
/// - any -> Init (face press)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Init,
    Playing,
    Lost,
    Won,
}

impl PlayState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// The round has ended, no more moves are accepted.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for PlayState {
    fn default() -> Self {
        Self::Init
    }
}

/// Whole-board view published by the coordinator after each transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub cells: Array2<CellState>,
    pub play_state: PlayState,
    pub elapsed_secs: u64,
    pub mines: CellCount,
}

impl GameSnapshot {
    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn cell(&self, coords: Coord2) -> Option<&CellState> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn revealed_count(&self) -> CellCount {
        count(self.cells.iter().filter(|cell| cell.revealed))
    }

    pub fn flagged_count(&self) -> CellCount {
        count(self.cells.iter().filter(|cell| cell.flagged))
    }

    /// Mines minus flags, never negative.
    pub fn flags_remaining(&self) -> CellCount {
        self.mines.saturating_sub(self.flagged_count())
    }

    pub fn has_revealed_mine(&self) -> bool {
        self.cells.iter().any(CellState::is_revealed_mine)
    }
}

fn count<'a>(cells: impl Iterator<Item = &'a CellState>) -> CellCount {
    cells.count().try_into().unwrap_or(CellCount::MAX)
}
