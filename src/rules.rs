// =============================================================================
// Checkers rules engine
//
// The whole game lives in an explicit GameState value that the caller owns and
// passes into every operation; nothing is kept inside the engine. Legality is
// decided in exactly one place, generate_moves(). apply_move() re-derives the
// legal set through it (honouring mandatory capture) before touching the
// board, so a rejected move never leaves a partial change behind.
//
// Coordinate system: row 0 is Yellow's back row, row 7 is Red's back row.
// =============================================================================

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::{Board, PIECES_PER_SIDE};
use crate::error::{RulesError, RulesResult};
use crate::moves::Move;
use crate::piece::Player;

// =============================================================================
// State
// =============================================================================

/// Opponent pieces removed by each player.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CaptureCounts {
    pub red: u8,
    pub yellow: u8,
}

impl CaptureCounts {
    pub fn get(&self, player: Player) -> u8 {
        match player {
            Player::Red => self.red,
            Player::Yellow => self.yellow,
        }
    }

    fn increment(&mut self, player: Player) {
        match player {
            Player::Red => self.red = self.red.saturating_add(1),
            Player::Yellow => self.yellow = self.yellow.saturating_add(1),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub turn: Player,
    pub capture_counts: CaptureCounts,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        initialize()
    }

    /// A state with no pieces and Red to move. Useful for setting up test positions.
    pub fn empty() -> Self {
        GameState {
            board: Board::empty(),
            turn: Player::Red,
            capture_counts: CaptureCounts::default(),
        }
    }
}

/// What apply_move() did, so the caller can decide whether the jump continues.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub did_capture: bool,
    pub promoted: bool,
}

// =============================================================================
// Engine operations
// =============================================================================

pub fn initialize() -> GameState {
    GameState {
        board: Board::new(),
        turn: Player::Red,
        capture_counts: CaptureCounts::default(),
    }
}

/// Moves available to the piece at `(row, col)`, ignoring whose turn it is.
/// Returns an empty list for an empty or off-board cell. With
/// `forced_capture_only` only jumps are returned.
pub fn generate_moves(
    state: &GameState,
    row: usize,
    col: usize,
    forced_capture_only: bool,
) -> Vec<Move> {
    let mut moves = Vec::new();
    let piece = match state.board.get(row, col) {
        Some(p) => p,
        None => return moves,
    };

    for &(dr, dc) in piece.directions() {
        let r1 = row as i32 + dr;
        let c1 = col as i32 + dc;
        if !Board::in_bounds(r1, c1) {
            continue;
        }
        let adjacent = (r1 as usize, c1 as usize);

        match state.board.get(adjacent.0, adjacent.1) {
            None => {
                if !forced_capture_only {
                    moves.push(Move::step((row, col), adjacent));
                }
            }
            Some(other) if other.owner != piece.owner => {
                let r2 = r1 + dr;
                let c2 = c1 + dc;
                if Board::in_bounds(r2, c2) && state.board.get(r2 as usize, c2 as usize).is_none() {
                    moves.push(Move::jump((row, col), adjacent, (r2 as usize, c2 as usize)));
                }
            }
            Some(_) => {}
        }
    }

    moves
}

/// True if any piece of `player` can jump. When it can, captures are the only
/// legal moves for that side, for every piece.
pub fn has_any_capture(state: &GameState, player: Player) -> bool {
    state
        .board
        .pieces()
        .filter(|(_, _, p)| p.owner == player)
        .any(|(r, c, _)| !generate_moves(state, r, c, true).is_empty())
}

/// Legal moves of the piece at `(row, col)` for the side to move, with
/// mandatory capture applied across the whole side. Empty for an empty cell,
/// an opponent's piece, or a piece that cannot capture while a capture is due.
pub fn legal_moves_from(state: &GameState, row: usize, col: usize) -> Vec<Move> {
    match state.board.get(row, col) {
        Some(p) if p.owner == state.turn => {
            generate_moves(state, row, col, has_any_capture(state, state.turn))
        }
        _ => Vec::new(),
    }
}

/// Every legal move for the side to move.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let forced = has_any_capture(state, state.turn);
    state
        .board
        .pieces()
        .filter(|(_, _, p)| p.owner == state.turn)
        .flat_map(|(r, c, _)| generate_moves(state, r, c, forced))
        .collect()
}

/// Pieces of the side to move that have at least one legal move.
pub fn movable_pieces(state: &GameState) -> Vec<(usize, usize)> {
    let forced = has_any_capture(state, state.turn);
    state
        .board
        .pieces()
        .filter(|(r, c, p)| {
            p.owner == state.turn && !generate_moves(state, *r, *c, forced).is_empty()
        })
        .map(|(r, c, _)| (r, c))
        .collect()
}

pub fn has_any_move(state: &GameState, player: Player) -> bool {
    state
        .board
        .pieces()
        .filter(|(_, _, p)| p.owner == player)
        .any(|(r, c, _)| !generate_moves(state, r, c, false).is_empty())
}

/// Apply a move for the side to move. The move must be one of
/// `legal_moves_from(state, from)`; anything else is rejected with
/// `IllegalMove` and the state is left as it was.
pub fn apply_move(state: &mut GameState, m: &Move) -> RulesResult<MoveOutcome> {
    let (fr, fc) = m.from;
    let (tr, tc) = m.to;

    if !legal_moves_from(state, fr, fc).contains(m) {
        warn!("rejected {} for {}", m.to_notation(), state.turn.name());
        return Err(RulesError::IllegalMove { from: m.from, to: m.to });
    }

    let mut piece = match state.board.get(fr, fc) {
        Some(p) => p,
        None => return Err(RulesError::IllegalMove { from: m.from, to: m.to }),
    };

    state.board.set(fr, fc, None);

    if let Some((cr, cc)) = m.captured {
        state.board.set(cr, cc, None);
        state.capture_counts.increment(piece.owner);
    }

    let promoted = !piece.is_king && tr == piece.owner.promotion_row();
    if promoted {
        piece.is_king = true;
        debug!("{} crowned at ({tr}, {tc})", piece.owner.name());
    }
    state.board.set(tr, tc, Some(piece));

    debug!("{} played {}", piece.owner.name(), m.to_notation());

    Ok(MoveOutcome {
        did_capture: m.is_capture,
        promoted,
    })
}

/// The winner, once one side has taken exactly all of the opponent's pieces.
/// A count past twelve only arises from a hand-built state and decides nothing.
pub fn check_game_end(state: &GameState) -> Option<Player> {
    [Player::Red, Player::Yellow]
        .into_iter()
        .find(|&p| state.capture_counts.get(p) == PIECES_PER_SIDE)
}

pub fn advance_turn(state: &mut GameState) {
    state.turn = state.turn.opposite();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BOARD_SIZE;
    use crate::piece::Piece;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn place(state: &mut GameState, row: usize, col: usize, piece: Piece) {
        state.board.set(row, col, Some(piece));
    }

    fn destinations(moves: &[Move]) -> Vec<(usize, usize)> {
        moves.iter().map(|m| m.to).collect()
    }

    #[test]
    fn initialize_sets_up_standard_game() {
        let state = initialize();
        assert_eq!(state.turn, Player::Red);
        assert_eq!(state.capture_counts, CaptureCounts::default());
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let cell = state.board.get(r, c);
                let expected = match r {
                    _ if !Board::is_dark(r, c) => None,
                    0..=2 => Some(Piece::man(Player::Yellow)),
                    5..=7 => Some(Piece::man(Player::Red)),
                    _ => None,
                };
                assert_eq!(cell, expected, "cell ({r},{c})");
            }
        }
        assert_eq!(state.board.count(Player::Yellow), 12);
        assert_eq!(state.board.count(Player::Red), 12);
        assert_eq!(check_game_end(&state), None);
    }

    #[test]
    fn empty_cell_has_no_moves() {
        let state = initialize();
        assert!(generate_moves(&state, 3, 2, false).is_empty());
        assert!(generate_moves(&state, 9, 9, false).is_empty());
    }

    #[test]
    fn opening_red_moves_are_steps_forward() {
        let state = initialize();
        let moves = generate_moves(&state, 5, 2, false);
        assert_eq!(destinations(&moves), vec![(4, 1), (4, 3)]);
        assert!(moves.iter().all(|m| !m.is_capture && m.captured.is_none()));
        // Back-row men are blocked by their own side.
        assert!(generate_moves(&state, 6, 1, false).is_empty());
        assert_eq!(legal_moves(&state).len(), 7);
    }

    #[test]
    fn capture_appears_and_is_forced() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));

        let all = generate_moves(&state, 5, 2, false);
        assert!(all.contains(&Move::step((5, 2), (4, 1))));
        assert!(all.contains(&Move::jump((5, 2), (4, 3), (3, 4))));

        let forced = generate_moves(&state, 5, 2, true);
        assert_eq!(forced, vec![Move::jump((5, 2), (4, 3), (3, 4))]);

        assert!(has_any_capture(&state, Player::Red));
        assert_eq!(legal_moves_from(&state, 5, 2), forced);
    }

    #[test]
    fn capture_needs_empty_landing_square() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));
        place(&mut state, 3, 4, Piece::man(Player::Yellow));
        assert!(generate_moves(&state, 5, 2, true).is_empty());

        // Landing would be off the board.
        let mut edge = GameState::empty();
        place(&mut edge, 2, 1, Piece::man(Player::Red));
        place(&mut edge, 1, 0, Piece::man(Player::Yellow));
        assert!(generate_moves(&edge, 2, 1, true).is_empty());
    }

    #[test]
    fn own_piece_is_never_jumped() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Red));
        assert_eq!(destinations(&generate_moves(&state, 5, 2, false)), vec![(4, 1)]);
    }

    #[test]
    fn mandatory_capture_is_global() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));
        place(&mut state, 6, 7, Piece::man(Player::Red));

        // The far piece has steps, but they are illegal while a capture exists.
        assert!(legal_moves_from(&state, 6, 7).is_empty());
        assert_eq!(movable_pieces(&state), vec![(5, 2)]);

        let before = state.clone();
        let err = apply_move(&mut state, &Move::step((6, 7), (5, 6))).unwrap_err();
        assert_eq!(err, RulesError::IllegalMove { from: (6, 7), to: (5, 6) });
        let err = apply_move(&mut state, &Move::step((5, 2), (4, 1))).unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn apply_move_rejects_out_of_turn_and_made_up_moves() {
        let mut state = initialize();
        let before = state.clone();
        assert!(apply_move(&mut state, &Move::step((2, 1), (3, 0))).is_err());
        assert!(apply_move(&mut state, &Move::step((5, 0), (3, 2))).is_err());
        assert!(apply_move(&mut state, &Move::jump((5, 2), (4, 3), (3, 4))).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn capture_removes_piece_and_counts() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));
        place(&mut state, 0, 1, Piece::man(Player::Yellow));

        let outcome = apply_move(&mut state, &Move::jump((5, 2), (4, 3), (3, 4))).unwrap();
        assert_eq!(outcome, MoveOutcome { did_capture: true, promoted: false });
        assert_eq!(state.board.get(4, 3), None);
        assert_eq!(state.board.get(5, 2), None);
        assert_eq!(state.board.get(3, 4), Some(Piece::man(Player::Red)));
        assert_eq!(state.capture_counts.get(Player::Red), 1);
        assert_eq!(state.capture_counts.get(Player::Yellow), 0);
        assert_eq!(state.board.count(Player::Yellow), 1);
        // apply_move never passes the turn itself.
        assert_eq!(state.turn, Player::Red);
    }

    #[test]
    fn multi_jump_is_available_from_landing_square() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));
        place(&mut state, 2, 5, Piece::man(Player::Yellow));

        apply_move(&mut state, &Move::jump((5, 2), (4, 3), (3, 4))).unwrap();
        let next = generate_moves(&state, 3, 4, true);
        assert_eq!(next, vec![Move::jump((3, 4), (2, 5), (1, 6))]);

        apply_move(&mut state, &next[0]).unwrap();
        assert!(generate_moves(&state, 1, 6, true).is_empty());
        assert_eq!(state.capture_counts.red, 2);
    }

    #[test]
    fn reaching_back_row_crowns_once() {
        let mut state = GameState::empty();
        place(&mut state, 1, 2, Piece::man(Player::Red));
        place(&mut state, 7, 0, Piece::man(Player::Yellow));

        let outcome = apply_move(&mut state, &Move::step((1, 2), (0, 1))).unwrap();
        assert!(outcome.promoted);
        assert_eq!(state.board.get(0, 1), Some(Piece::king(Player::Red)));

        // A king leaving and re-entering the back row is not promoted again.
        apply_move(&mut state, &Move::step((0, 1), (1, 2))).unwrap();
        let again = apply_move(&mut state, &Move::step((1, 2), (0, 3))).unwrap();
        assert!(!again.promoted);
        assert_eq!(state.board.get(0, 3), Some(Piece::king(Player::Red)));
    }

    #[test]
    fn yellow_promotes_on_row_seven() {
        let mut state = GameState::empty();
        state.turn = Player::Yellow;
        place(&mut state, 6, 3, Piece::man(Player::Yellow));
        let outcome = apply_move(&mut state, &Move::step((6, 3), (7, 4))).unwrap();
        assert!(outcome.promoted);
        assert!(state.board.get(7, 4).unwrap().is_king);
    }

    #[test]
    fn kings_move_in_all_directions() {
        let mut state = GameState::empty();
        place(&mut state, 3, 2, Piece::king(Player::Yellow));
        let mut dests = destinations(&generate_moves(&state, 3, 2, false));
        dests.sort();
        assert_eq!(dests, vec![(2, 1), (2, 3), (4, 1), (4, 3)]);

        // Kings may capture backwards.
        place(&mut state, 2, 3, Piece::man(Player::Red));
        assert_eq!(
            generate_moves(&state, 3, 2, true),
            vec![Move::jump((3, 2), (2, 3), (1, 4))]
        );
    }

    #[test]
    fn game_ends_exactly_at_twelve_captures() {
        let mut state = initialize();
        state.capture_counts.yellow = 11;
        assert_eq!(check_game_end(&state), None);
        state.capture_counts.yellow = 12;
        assert_eq!(check_game_end(&state), Some(Player::Yellow));
        state.capture_counts = CaptureCounts { red: 12, yellow: 3 };
        assert_eq!(check_game_end(&state), Some(Player::Red));
        state.capture_counts = CaptureCounts { red: 13, yellow: 0 };
        assert_eq!(check_game_end(&state), None);
    }

    #[test]
    fn capture_count_saturates_on_loaded_state() {
        let mut state = GameState::empty();
        place(&mut state, 5, 2, Piece::man(Player::Red));
        place(&mut state, 4, 3, Piece::man(Player::Yellow));
        state.capture_counts.red = u8::MAX;

        let outcome = apply_move(&mut state, &Move::jump((5, 2), (4, 3), (3, 4))).unwrap();
        assert!(outcome.did_capture);
        assert_eq!(state.capture_counts.red, u8::MAX);
        assert_eq!(state.board.get(4, 3), None);
    }

    #[test]
    fn advance_turn_keeps_counts() {
        let mut state = initialize();
        state.capture_counts.red = 4;
        advance_turn(&mut state);
        assert_eq!(state.turn, Player::Yellow);
        assert_eq!(state.capture_counts.red, 4);
        advance_turn(&mut state);
        assert_eq!(state.turn, Player::Red);
    }

    #[test]
    fn has_any_move_detects_blocked_side() {
        let mut state = GameState::empty();
        place(&mut state, 0, 1, Piece::man(Player::Yellow));
        place(&mut state, 1, 0, Piece::man(Player::Red));
        place(&mut state, 1, 2, Piece::man(Player::Red));
        place(&mut state, 2, 3, Piece::man(Player::Red));
        assert!(!has_any_move(&state, Player::Yellow));
        assert!(has_any_move(&state, Player::Red));
    }

    #[test]
    fn state_survives_json() {
        let mut state = initialize();
        apply_move(&mut state, &Move::step((5, 2), (4, 3))).unwrap();
        advance_turn(&mut state);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    /// Random games checking the engine's invariants after every move.
    #[test]
    fn random_playouts_hold_invariants() {
        for seed in 0..40u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = initialize();
            let mut jumping: Option<(usize, usize)> = None;

            for _ in 0..400 {
                for (r, c, _) in state.board.pieces() {
                    assert!(Board::is_dark(r, c));
                    for m in generate_moves(&state, r, c, false) {
                        let (tr, tc) = m.to;
                        assert!(tr < BOARD_SIZE && tc < BOARD_SIZE);
                        assert!(state.board.get(tr, tc).is_none());
                        assert!(Board::is_dark(tr, tc));
                    }
                }

                let turn = state.turn;
                if has_any_capture(&state, turn) {
                    for (r, c, p) in state.board.pieces() {
                        if p.owner != turn {
                            continue;
                        }
                        for m in generate_moves(&state, r, c, false).iter().filter(|m| !m.is_capture) {
                            let mut probe = state.clone();
                            assert!(apply_move(&mut probe, m).is_err());
                            assert_eq!(probe, state);
                        }
                    }
                }

                let choices = match jumping {
                    Some((r, c)) => generate_moves(&state, r, c, true),
                    None => legal_moves(&state),
                };
                let Some(m) = choices.choose(&mut rng).copied() else {
                    break;
                };

                let was_king = state.board.get(m.from.0, m.from.1).unwrap().is_king;
                let opp_before = state.board.count(turn.opposite());
                let caps_before = state.capture_counts.get(turn);

                let outcome = apply_move(&mut state, &m).unwrap();
                let landed = state.board.get(m.to.0, m.to.1).unwrap();

                if outcome.did_capture {
                    assert_eq!(state.board.count(turn.opposite()), opp_before - 1);
                    assert_eq!(state.capture_counts.get(turn), caps_before + 1);
                } else {
                    assert_eq!(state.board.count(turn.opposite()), opp_before);
                    assert_eq!(state.capture_counts.get(turn), caps_before);
                }
                assert_eq!(outcome.promoted, !was_king && m.to.0 == turn.promotion_row());
                assert_eq!(landed.is_king, was_king || m.to.0 == turn.promotion_row());
                assert_eq!(
                    state.capture_counts.get(turn.opposite()) as usize,
                    PIECES_PER_SIDE as usize - state.board.count(turn)
                );

                if outcome.did_capture && !generate_moves(&state, m.to.0, m.to.1, true).is_empty() {
                    jumping = Some(m.to);
                    continue;
                }
                jumping = None;

                let winner = check_game_end(&state);
                let someone_at_twelve = state.capture_counts.red == 12 || state.capture_counts.yellow == 12;
                assert_eq!(winner.is_some(), someone_at_twelve);
                if let Some(w) = winner {
                    assert_eq!(w, turn);
                    assert_eq!(state.board.count(turn.opposite()), 0);
                    break;
                }
                advance_turn(&mut state);
            }
        }
    }
}
