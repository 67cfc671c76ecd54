//! Deterministic simulation module
//!
//! Shared machinery for every mini-game. This module must stay pure and
//! deterministic:
//! - Time only arrives as an explicit `now_ms` argument
//! - Seeded RNG only
//! - Stable iteration order (scan order of owned vectors)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod input;
pub mod scheduler;

pub use ai::{Board, Mark, best_move, winner};
pub use collision::{Aabb, BreakerArena, BreakerStep, MovingBody, StaticObstacle, resolve_ball};
pub use input::{Direction, InputEvent, InputFrame, InputRouter, IntentQueue};
pub use scheduler::{GameLoopScheduler, LoopHandle, LoopMode, TimerSet};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a mini-game; also the persistence scope of its scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameId {
    Snake,
    Shooter,
    Breaker,
    TicTacToe,
    Reaction,
    Memory,
    Idle,
}

impl GameId {
    pub const ALL: [GameId; 7] = [
        GameId::Snake,
        GameId::Shooter,
        GameId::Breaker,
        GameId::TicTacToe,
        GameId::Reaction,
        GameId::Memory,
        GameId::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Shooter => "shooter",
            GameId::Breaker => "breaker",
            GameId::TicTacToe => "tictactoe",
            GameId::Reaction => "reaction",
            GameId::Memory => "memory",
            GameId::Idle => "idle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameId::Snake),
            "shooter" => Some(GameId::Shooter),
            "breaker" | "bricks" => Some(GameId::Breaker),
            "tictactoe" | "tic-tac-toe" | "ttt" => Some(GameId::TicTacToe),
            "reaction" => Some(GameId::Reaction),
            "memory" => Some(GameId::Memory),
            "idle" | "clicker" => Some(GameId::Idle),
            _ => None,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Over,
    Won,
}

/// Session state machine: idle -> running -> ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Running,
    Ended(Outcome),
}

/// Result of a single simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Continue,
    Terminated(Outcome),
}

/// Discrete grid cell (snake and board games)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

impl GridCell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Neighbouring cell one step in `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        Self::new(self.row + dr, self.col + dc)
    }

    pub fn in_bounds(self, rows: i32, cols: i32) -> bool {
        self.row >= 0 && self.row < rows && self.col >= 0 && self.col < cols
    }
}

impl From<(i32, i32)> for GridCell {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}
