use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Red,
    Yellow,
}

impl Player {
    pub fn opposite(self) -> Player {
        match self {
            Player::Red => Player::Yellow,
            Player::Yellow => Player::Red,
        }
    }

    /// Row delta of a forward step. Red starts at the bottom (rows 5-7) and
    /// moves toward row 0.
    pub fn forward(self) -> i32 {
        match self {
            Player::Red => -1,
            Player::Yellow => 1,
        }
    }

    /// The opponent's back row, where this player's men are crowned.
    pub fn promotion_row(self) -> usize {
        match self {
            Player::Red => 0,
            Player::Yellow => 7,
        }
    }

    /// The three rows this player's men start on.
    pub fn home_rows(self) -> std::ops::RangeInclusive<usize> {
        match self {
            Player::Red => 5..=7,
            Player::Yellow => 0..=2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Red => "Red",
            Player::Yellow => "Yellow",
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Piece {
    pub owner: Player,
    pub is_king: bool,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Piece { owner, is_king: false }
    }

    pub fn king(owner: Player) -> Self {
        Piece { owner, is_king: true }
    }

    /// Diagonal directions this piece may move or capture along.
    pub fn directions(&self) -> &'static [(i32, i32)] {
        const ALL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        const UP: [(i32, i32); 2] = [(-1, -1), (-1, 1)];
        const DOWN: [(i32, i32); 2] = [(1, -1), (1, 1)];

        if self.is_king {
            &ALL
        } else if self.owner.forward() < 0 {
            &UP
        } else {
            &DOWN
        }
    }
}
