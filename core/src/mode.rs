use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed board presets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Beginner,
    Intermediate,
    Advanced,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub const fn rows(self) -> Coord {
        match self {
            Self::Beginner => 9,
            Self::Intermediate => 16,
            Self::Advanced => 16,
        }
    }

    pub const fn columns(self) -> Coord {
        match self {
            Self::Beginner => 9,
            Self::Intermediate => 16,
            Self::Advanced => 30,
        }
    }

    pub const fn mines(self) -> CellCount {
        match self {
            Self::Beginner => 10,
            Self::Intermediate => 40,
            Self::Advanced => 99,
        }
    }

    pub const fn size(self) -> Coord2 {
        (self.rows(), self.columns())
    }

    pub const fn non_mines(self) -> CellCount {
        mult(self.rows(), self.columns()) - self.mines()
    }

    pub const fn config(self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mines())
    }

    pub const fn contains(self, (row, col): Coord2) -> bool {
        row < self.rows() && col < self.columns()
    }

    /// Looks up a preset by name, falling back to the default preset when the
    /// name is not recognized.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            let fallback = Self::default();
            log::warn!("{}, using {}", err, fallback);
            fallback
        })
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Intermediate
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownMode(s.into()))
    }
}
