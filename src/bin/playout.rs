//! Plays seeded random games through the session layer and prints a summary.
//!
//! Usage: playout [games] [max_plies] [seed]
//! Log output is controlled with RUST_LOG (e.g. RUST_LOG=checkers=debug).

use std::io::Write;

use checkers::piece::Player;
use checkers::rules;
use checkers::session::{Phase, Session};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize)]
struct PlayoutConfig {
    games: usize,
    max_plies: u32,
    seed: u64,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        PlayoutConfig {
            games: 100,
            max_plies: 400,
            seed: 1,
        }
    }
}

impl PlayoutConfig {
    fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut config = PlayoutConfig::default();
        let args: Vec<String> = args.collect();
        if let Some(a) = args.first() {
            config.games = a.parse().map_err(|_| format!("bad game count: {a}"))?;
        }
        if let Some(a) = args.get(1) {
            config.max_plies = a.parse().map_err(|_| format!("bad ply limit: {a}"))?;
        }
        if let Some(a) = args.get(2) {
            config.seed = a.parse().map_err(|_| format!("bad seed: {a}"))?;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameEnd {
    Won(Player),
    /// The side to move had no legal move.
    Blocked(Player),
    PlyLimit,
    /// The engine refused a move it had offered, or offered none for a
    /// selectable piece.
    Error,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    config: Option<PlayoutConfig>,
    red_wins: u32,
    yellow_wins: u32,
    red_blocked: u32,
    yellow_blocked: u32,
    unfinished: u32,
    errors: u32,
    total_plies: u64,
    multi_jumps: u64,
    promotions: u64,
}

fn play_game(rng: &mut StdRng, max_plies: u32, summary: &mut Summary) -> GameEnd {
    let mut session = Session::new();
    for _ in 0..max_plies {
        if let Some(winner) = session.winner() {
            return GameEnd::Won(winner);
        }
        let pieces = match session.phase() {
            Phase::ContinueCapture { from, .. } => vec![*from],
            _ => rules::movable_pieces(session.state()),
        };
        let Some(&(row, col)) = pieces.choose(rng) else {
            return GameEnd::Blocked(session.state().turn);
        };

        let moves = session.select(row, col);
        let Some(m) = moves.choose(rng).copied() else {
            tracing::error!("selectable piece at ({row}, {col}) offered no moves");
            return GameEnd::Error;
        };
        match session.move_to(m.to.0, m.to.1) {
            Ok(outcome) => {
                summary.total_plies += 1;
                if outcome.continue_capture {
                    summary.multi_jumps += 1;
                }
                if outcome.promoted {
                    summary.promotions += 1;
                }
            }
            Err(e) => {
                tracing::error!("legal move {} was rejected: {e}", m.to_notation());
                return GameEnd::Error;
            }
        }
    }
    match session.winner() {
        Some(winner) => GameEnd::Won(winner),
        None => GameEnd::PlyLimit,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match PlayoutConfig::from_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: playout [games] [max_plies] [seed]");
            std::process::exit(2);
        }
    };
    tracing::info!(?config, "starting playouts");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut summary = Summary::default();

    for game in 0..config.games {
        let end = play_game(&mut rng, config.max_plies, &mut summary);
        match end {
            GameEnd::Won(Player::Red) => summary.red_wins += 1,
            GameEnd::Won(Player::Yellow) => summary.yellow_wins += 1,
            GameEnd::Blocked(Player::Red) => summary.red_blocked += 1,
            GameEnd::Blocked(Player::Yellow) => summary.yellow_blocked += 1,
            GameEnd::PlyLimit => summary.unfinished += 1,
            GameEnd::Error => summary.errors += 1,
        }
        tracing::debug!(game, ?end, "game finished");
    }

    summary.config = Some(config);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize summary: {e}"),
    }
    std::io::stdout().flush().ok();
    if summary.errors > 0 {
        std::process::exit(1);
    }
}
