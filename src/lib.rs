pub mod board;
pub mod error;
pub mod moves;
pub mod piece;
pub mod rules;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
