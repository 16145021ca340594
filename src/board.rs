use serde::{Deserialize, Serialize};

use crate::piece::{Piece, Player};

pub const BOARD_SIZE: usize = 8;
/// Men per side at the start, and the number of captures that wins.
pub const PIECES_PER_SIDE: u8 = 12;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    pub squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Standard starting layout: every dark square of each side's three home
    /// rows holds a man.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for player in [Player::Yellow, Player::Red] {
            for r in player.home_rows() {
                for c in 0..BOARD_SIZE {
                    if Self::is_dark(r, c) {
                        board.squares[r][c] = Some(Piece::man(player));
                    }
                }
            }
        }
        board
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
    }

    pub fn is_dark(row: usize, col: usize) -> bool {
        (row + col) % 2 == 1
    }

    /// Piece at `(row, col)`; `None` for empty or off-board cells.
    pub fn get(&self, row: usize, col: usize) -> Option<Piece> {
        self.squares.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn set(&mut self, row: usize, col: usize, piece: Option<Piece>) {
        self.squares[row][col] = piece;
    }

    /// Iterate over every occupied cell as `(row, col, piece)`.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, usize, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, sq)| sq.map(|p| (r, c, p)))
        })
    }

    pub fn count(&self, player: Player) -> usize {
        self.pieces().filter(|(_, _, p)| p.owner == player).count()
    }
}
