use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board of {rows}x{columns} cells is too large")]
    InvalidSize { rows: usize, columns: usize },
    #[error("Unknown mode {0:?}, expected beginner, intermediate or advanced")]
    UnknownMode(String),
    #[error("Mailbox closed, the receiving actor has stopped")]
    MailboxClosed,
}

pub type Result<T> = core::result::Result<T, GameError>;
