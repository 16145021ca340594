use crate::board::BOARD_SIZE;
use crate::moves::Move;
use crate::piece::Player;
use crate::rules;
use crate::session::{winner_label, ClickOutcome, Phase, Session, TurnOutcome};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    color: String,
    king: bool,
}

#[derive(Serialize)]
struct TargetJson {
    to: [usize; 2],
    capture: bool,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    turn_label: String,
    captured_by_red: u8,
    captured_by_yellow: u8,
    phase: String,
    selected: Option<[usize; 2]>,
    targets: Vec<TargetJson>,
    movable: Vec<[usize; 2]>,
    game_over: bool,
    winner: Option<String>,
    result: Option<String>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    outcome: Option<MoveJson>,
    error: Option<String>,
}

#[derive(Serialize)]
struct SelectResult {
    targets: Vec<TargetJson>,
    error: Option<String>,
}

#[derive(Serialize)]
struct MoveJson {
    from: [usize; 2],
    to: [usize; 2],
    captured: Option<[usize; 2]>,
    promoted: bool,
    continue_capture: bool,
    winner: Option<String>,
    notation: String,
}

fn color_to_string(p: Player) -> String {
    p.name().to_string()
}

fn phase_to_string(phase: &Phase) -> String {
    match phase {
        Phase::SelectingPiece => "SelectingPiece",
        Phase::PieceSelected { .. } => "PieceSelected",
        Phase::ContinueCapture { .. } => "ContinueCapture",
        Phase::GameOver { .. } => "GameOver",
    }
    .to_string()
}

fn targets_json(moves: &[Move]) -> Vec<TargetJson> {
    moves
        .iter()
        .map(|m| TargetJson {
            to: [m.to.0, m.to.1],
            capture: m.is_capture,
        })
        .collect()
}

fn move_json(outcome: &TurnOutcome) -> MoveJson {
    let m = outcome.mv;
    MoveJson {
        from: [m.from.0, m.from.1],
        to: [m.to.0, m.to.1],
        captured: m.captured.map(|(r, c)| [r, c]),
        promoted: outcome.promoted,
        continue_capture: outcome.continue_capture,
        winner: outcome.winner.map(color_to_string),
        notation: m.to_notation(),
    }
}

fn build_board_state(session: &Session) -> BoardState {
    let state = session.state();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..BOARD_SIZE)
        .map(|r| {
            (0..BOARD_SIZE)
                .map(|c| {
                    state.board.get(r, c).map(|p| SquarePiece {
                        color: color_to_string(p.owner),
                        king: p.is_king,
                    })
                })
                .collect()
        })
        .collect();

    let movable = match session.phase() {
        Phase::GameOver { .. } => Vec::new(),
        Phase::ContinueCapture { from, .. } => vec![[from.0, from.1]],
        _ => rules::movable_pieces(state)
            .into_iter()
            .map(|(r, c)| [r, c])
            .collect(),
    };

    BoardState {
        squares,
        current_turn: color_to_string(state.turn),
        turn_label: session.turn_label(),
        captured_by_red: state.capture_counts.red,
        captured_by_yellow: state.capture_counts.yellow,
        phase: phase_to_string(session.phase()),
        selected: session.selected().map(|(r, c)| [r, c]),
        targets: targets_json(session.highlighted()),
        movable,
        game_over: session.winner().is_some(),
        winner: session.winner().map(color_to_string),
        result: session.winner().map(winner_label),
    }
}

#[wasm_bindgen]
pub fn build_timestamp() -> String {
    env!("BUILD_TIMESTAMP").to_string()
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        // Only the first call installs the logger; later games reuse it.
        console_log::init_with_level(log::Level::Info).ok();
        Game {
            session: Session::new(),
        }
    }

    pub fn reset(&mut self) -> JsValue {
        self.session.reset();
        self.get_board_state()
    }

    pub fn get_board_state(&self) -> JsValue {
        let state = build_board_state(&self.session);
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    /// Legal destinations of the piece at (row, col), or an error when it can't be picked.
    pub fn select(&mut self, row: usize, col: usize) -> JsValue {
        let result = match self.session.try_select(row, col) {
            Ok(moves) => SelectResult {
                targets: targets_json(&moves),
                error: None,
            },
            Err(e) => SelectResult {
                targets: Vec::new(),
                error: Some(e.to_string()),
            },
        };
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn move_to(&mut self, row: usize, col: usize) -> JsValue {
        let result = match self.session.move_to(row, col) {
            Ok(outcome) => MoveResult {
                outcome: Some(move_json(&outcome)),
                error: None,
            },
            Err(e) => MoveResult {
                outcome: None,
                error: Some(e.to_string()),
            },
        };
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Route a board click; returns the refreshed board state.
    pub fn click(&mut self, row: usize, col: usize) -> JsValue {
        if let ClickOutcome::Moved { outcome } = self.session.click(row, col) {
            log::debug!("{}", outcome.mv.to_notation());
        }
        self.get_board_state()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
