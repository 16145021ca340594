//! Rejections reported by the rules engine and the turn session.
//!
//! None of these are fatal: each one leaves the game state untouched and the
//! caller simply re-prompts the player.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// Empty cell, opponent's piece, or a piece that cannot capture while a
    /// capture is mandatory.
    #[error("no legal moves for the piece at ({row}, {col})")]
    InvalidSelection { row: usize, col: usize },

    #[error("illegal move from {from:?} to {to:?}")]
    IllegalMove { from: (usize, usize), to: (usize, usize) },

    #[error("no piece is selected")]
    NoSelection,

    #[error("game is already over")]
    GameOver,
}

pub type RulesResult<T> = Result<T, RulesError>;
