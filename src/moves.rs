use serde::{Deserialize, Serialize};

use crate::board::{Board, BOARD_SIZE};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub is_capture: bool,
    /// Cell of the jumped piece; set only for captures.
    pub captured: Option<(usize, usize)>,
}

impl Move {
    pub fn step(from: (usize, usize), to: (usize, usize)) -> Self {
        Move { from, to, is_capture: false, captured: None }
    }

    pub fn jump(from: (usize, usize), over: (usize, usize), to: (usize, usize)) -> Self {
        Move { from, to, is_capture: true, captured: Some(over) }
    }

    /// Standard checkers notation, e.g. "22-18" or "22x15".
    pub fn to_notation(&self) -> String {
        let sep = if self.is_capture { 'x' } else { '-' };
        match (square_number(self.from.0, self.from.1), square_number(self.to.0, self.to.1)) {
            (Some(a), Some(b)) => format!("{a}{sep}{b}"),
            _ => format!("{:?}{sep}{:?}", self.from, self.to),
        }
    }

    /// Parse "a-b" or "axb". The captured cell of a jump is the midpoint.
    pub fn from_notation(s: &str) -> Option<Move> {
        let (is_capture, (a, b)) = match s.split_once('x') {
            Some(parts) => (true, parts),
            None => (false, s.split_once('-')?),
        };
        let from = square_coords(a.trim().parse().ok()?)?;
        let to = square_coords(b.trim().parse().ok()?)?;
        let dr = to.0 as i32 - from.0 as i32;
        let dc = to.1 as i32 - from.1 as i32;
        match (is_capture, dr.abs(), dc.abs()) {
            (false, 1, 1) => Some(Move::step(from, to)),
            (true, 2, 2) => {
                let over = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
                Some(Move::jump(from, over, to))
            }
            _ => None,
        }
    }
}

/// Number (1..=32) of a dark square, counting row-major from row 0.
pub fn square_number(row: usize, col: usize) -> Option<u8> {
    if row >= BOARD_SIZE || col >= BOARD_SIZE || !Board::is_dark(row, col) {
        return None;
    }
    Some((row * BOARD_SIZE / 2 + col / 2 + 1) as u8)
}

pub fn square_coords(n: u8) -> Option<(usize, usize)> {
    if !(1..=32).contains(&n) {
        return None;
    }
    let idx = (n - 1) as usize;
    let row = idx / (BOARD_SIZE / 2);
    let col = (idx % (BOARD_SIZE / 2)) * 2 + if row % 2 == 0 { 1 } else { 0 };
    Some((row, col))
}
