//! Turn-level flow on top of the rules engine.
//!
//! A [`Session`] is what a UI drives: pick a piece, pick a destination, keep
//! jumping with the same piece while captures remain, then hand the turn
//! over. Once a side has taken all twelve opposing pieces the session stays
//! in [`Phase::GameOver`] until [`Session::reset`] is called.

use log::{debug, info};
use serde::Serialize;

use crate::error::{RulesError, RulesResult};
use crate::moves::Move;
use crate::piece::Player;
use crate::rules::{self, GameState};

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "phase")]
pub enum Phase {
    SelectingPiece,
    PieceSelected { from: (usize, usize), moves: Vec<Move> },
    /// A capture just landed and the same piece can jump again.
    ContinueCapture { from: (usize, usize), moves: Vec<Move> },
    GameOver { winner: Player },
}

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub mv: Move,
    pub did_capture: bool,
    pub promoted: bool,
    /// The turn has not passed; the moved piece must jump again.
    pub continue_capture: bool,
    pub winner: Option<Player>,
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum ClickOutcome {
    Selected { from: (usize, usize), moves: Vec<Move> },
    Moved { outcome: TurnOutcome },
    /// Selection dropped after a click on nothing useful.
    Cleared,
    /// Nothing changed.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct Session {
    state: GameState,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::from_state(rules::initialize())
    }

    pub fn from_state(state: GameState) -> Self {
        let phase = match rules::check_game_end(&state) {
            Some(winner) => Phase::GameOver { winner },
            None => Phase::SelectingPiece,
        };
        Session { state, phase }
    }

    pub fn reset(&mut self) {
        *self = Session::new();
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        match &self.phase {
            Phase::PieceSelected { from, .. } | Phase::ContinueCapture { from, .. } => Some(*from),
            _ => None,
        }
    }

    /// Destinations to highlight for the current selection.
    pub fn highlighted(&self) -> &[Move] {
        match &self.phase {
            Phase::PieceSelected { moves, .. } | Phase::ContinueCapture { moves, .. } => moves,
            _ => &[],
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Moves the piece at `(row, col)` could make right now, taking a pending
    /// multi-jump into account.
    fn selection_moves(&self, row: usize, col: usize) -> Vec<Move> {
        match &self.phase {
            Phase::GameOver { .. } => Vec::new(),
            Phase::ContinueCapture { from, moves } if *from == (row, col) => moves.clone(),
            Phase::ContinueCapture { .. } => Vec::new(),
            _ => rules::legal_moves_from(&self.state, row, col),
        }
    }

    /// Select a piece and return its legal moves. An empty list means the
    /// selection was refused; outside a multi-jump that also drops the
    /// previous selection.
    pub fn select(&mut self, row: usize, col: usize) -> Vec<Move> {
        let moves = self.selection_moves(row, col);
        match self.phase {
            Phase::GameOver { .. } | Phase::ContinueCapture { .. } => {}
            _ if moves.is_empty() => self.phase = Phase::SelectingPiece,
            _ => {
                self.phase = Phase::PieceSelected {
                    from: (row, col),
                    moves: moves.clone(),
                }
            }
        }
        moves
    }

    /// Like [`Session::select`], but reports a refused selection as
    /// `InvalidSelection` for adapters that surface errors to the player.
    pub fn try_select(&mut self, row: usize, col: usize) -> RulesResult<Vec<Move>> {
        let moves = self.select(row, col);
        if moves.is_empty() {
            return Err(RulesError::InvalidSelection { row, col });
        }
        Ok(moves)
    }

    /// Move the selected piece to `(row, col)`.
    pub fn move_to(&mut self, row: usize, col: usize) -> RulesResult<TurnOutcome> {
        let (from, moves) = match &self.phase {
            Phase::GameOver { .. } => return Err(RulesError::GameOver),
            Phase::SelectingPiece => return Err(RulesError::NoSelection),
            Phase::PieceSelected { from, moves } | Phase::ContinueCapture { from, moves } => {
                (*from, moves)
            }
        };
        let mv = moves
            .iter()
            .find(|m| m.to == (row, col))
            .copied()
            .ok_or(RulesError::IllegalMove { from, to: (row, col) })?;

        let applied = rules::apply_move(&mut self.state, &mv)?;
        let mut outcome = TurnOutcome {
            mv,
            did_capture: applied.did_capture,
            promoted: applied.promoted,
            continue_capture: false,
            winner: None,
        };

        if applied.did_capture {
            let next = rules::generate_moves(&self.state, row, col, true);
            if !next.is_empty() {
                debug!("{} continues jumping from ({row}, {col})", self.state.turn.name());
                self.phase = Phase::ContinueCapture { from: (row, col), moves: next };
                outcome.continue_capture = true;
                return Ok(outcome);
            }
        }

        if let Some(winner) = rules::check_game_end(&self.state) {
            info!("{}", winner_label(winner));
            self.phase = Phase::GameOver { winner };
            outcome.winner = Some(winner);
            return Ok(outcome);
        }

        rules::advance_turn(&mut self.state);
        self.phase = Phase::SelectingPiece;
        debug!("turn passes to {}", self.state.turn.name());
        Ok(outcome)
    }

    /// One click on the board: select an own piece, move to a highlighted
    /// square, or clear the selection.
    pub fn click(&mut self, row: usize, col: usize) -> ClickOutcome {
        if self.winner().is_some() {
            return ClickOutcome::Ignored;
        }

        let own_piece = self
            .state
            .board
            .get(row, col)
            .map(|p| p.owner == self.state.turn)
            .unwrap_or(false);
        if own_piece {
            // A piece that can't move under mandatory capture is not selectable.
            if self.selection_moves(row, col).is_empty() {
                return ClickOutcome::Ignored;
            }
            let moves = self.select(row, col);
            return ClickOutcome::Selected { from: (row, col), moves };
        }

        if self.highlighted().iter().any(|m| m.to == (row, col)) {
            return match self.move_to(row, col) {
                Ok(outcome) => ClickOutcome::Moved { outcome },
                Err(_) => ClickOutcome::Ignored,
            };
        }

        match self.phase {
            Phase::ContinueCapture { .. } => ClickOutcome::Ignored,
            _ => {
                self.phase = Phase::SelectingPiece;
                ClickOutcome::Cleared
            }
        }
    }

    pub fn turn_label(&self) -> String {
        format!("{}'s Turn", self.state.turn.name())
    }
}

pub fn winner_label(winner: Player) -> String {
    format!("{} Wins", winner.name())
}
