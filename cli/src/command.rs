use cellsweep_core::{ClickSide, Coord, Coord2, Mode};
use core::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  r <row> <col>   reveal a tile (chords on a satisfied number)
  f <row> <col>   toggle a flag (chords on a satisfied number)
  n               new game
  h               this help
  q               quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Press { coords: Coord2, side: ClickSide },
    NewGame,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, try h for help")]
    Unknown(String),
    #[error("expected <row> <col> after {0:?}")]
    MissingCoords(String),
    #[error("invalid coordinate {0:?}")]
    InvalidCoord(String),
    #[error("({row}, {col}) is outside the {rows}x{columns} board")]
    OutOfBounds {
        row: Coord,
        col: Coord,
        rows: Coord,
        columns: Coord,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };

        let side = match verb.to_ascii_lowercase().as_str() {
            "r" | "reveal" => ClickSide::Primary,
            "f" | "flag" => ClickSide::Secondary,
            "n" | "new" => return Ok(Self::NewGame),
            "h" | "help" | "?" => return Ok(Self::Help),
            "q" | "quit" | "exit" => return Ok(Self::Quit),
            _ => return Err(CommandError::Unknown(verb.into())),
        };

        let (Some(row), Some(col)) = (words.next(), words.next()) else {
            return Err(CommandError::MissingCoords(verb.into()));
        };
        let coords = (parse_coord(row)?, parse_coord(col)?);
        Ok(Self::Press { coords, side })
    }
}

fn parse_coord(word: &str) -> Result<Coord, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidCoord(word.into()))
}

impl Command {
    /// Rejects presses that fall outside the board of `mode`.
    pub fn check_bounds(self, mode: Mode) -> Result<Self, CommandError> {
        match self {
            Self::Press { coords, .. } if !mode.contains(coords) => {
                Err(CommandError::OutOfBounds {
                    row: coords.0,
                    col: coords.1,
                    rows: mode.rows(),
                    columns: mode.columns(),
                })
            }
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_presses() {
        assert_eq!(
            "r 3 4".parse::<Command>(),
            Ok(Command::Press {
                coords: (3, 4),
                side: ClickSide::Primary
            })
        );
        assert_eq!(
            "  FLAG 0 15 ".parse::<Command>(),
            Ok(Command::Press {
                coords: (0, 15),
                side: ClickSide::Secondary
            })
        );
    }

    #[test]
    fn parses_single_word_commands() {
        assert_eq!("n".parse::<Command>(), Ok(Command::NewGame));
        assert_eq!("help".parse::<Command>(), Ok(Command::Help));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "x 1 1".parse::<Command>(),
            Err(CommandError::Unknown("x".into()))
        );
        assert_eq!(
            "r 1".parse::<Command>(),
            Err(CommandError::MissingCoords("r".into()))
        );
        assert_eq!(
            "r 1 -2".parse::<Command>(),
            Err(CommandError::InvalidCoord("-2".into()))
        );
    }

    #[test]
    fn bounds_follow_the_mode() {
        let press = Command::Press {
            coords: (12, 20),
            side: ClickSide::Primary,
        };
        assert_eq!(press.check_bounds(Mode::Advanced), Ok(press));
        assert!(matches!(
            press.check_bounds(Mode::Intermediate),
            Err(CommandError::OutOfBounds { rows: 16, columns: 16, .. })
        ));
        assert_eq!(Command::Quit.check_bounds(Mode::Beginner), Ok(Command::Quit));
    }
}
