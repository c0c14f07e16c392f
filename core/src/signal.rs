use serde::{Deserialize, Serialize};

use crate::*;

/// Which pointer button pressed a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickSide {
    Primary,
    Secondary,
}

/// Messages understood by a cell actor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellSignal {
    LeftClick,
    RightClick,
    NeighborReveal,
    NeighborFlagSet,
    NeighborFlagUnset,
    Stop,
}

impl From<ClickSide> for CellSignal {
    fn from(side: ClickSide) -> Self {
        match side {
            ClickSide::Primary => Self::LeftClick,
            ClickSide::Secondary => Self::RightClick,
        }
    }
}

/// Messages understood by the coordinator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GameSignal {
    TilePress { coords: Coord2, side: ClickSide },
    FacePress,
    StateChange { round: Round, state: CellState },
    ClockTick,
    Shutdown,
}

/// Whether an actor keeps servicing its mailbox after a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl Flow {
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}
