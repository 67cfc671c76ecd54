//! The mini-games
//!
//! Each game is plain owned state plus a `step` function. Nothing here
//! knows about timers, storage or rendering; `GameSession` wires those in.

pub mod breaker;
pub mod idle;
pub mod memory;
pub mod reaction;
pub mod shooter;
pub mod snake;
pub mod tictactoe;

pub use breaker::BreakerGame;
pub use idle::{GeneratorKind, IdleEconomy, IdleGame};
pub use memory::MemoryGame;
pub use reaction::ReactionGame;
pub use shooter::ShooterGame;
pub use snake::SnakeGame;
pub use tictactoe::TicTacToeGame;

use crate::error::StepFault;
use crate::settings::Settings;
use crate::sim::{Direction, GameId, InputFrame, LoopMode, StepStatus};

/// A self-contained simulation driven by a `GameSession`
pub trait Game {
    fn id(&self) -> GameId;

    fn loop_mode(&self) -> LoopMode;

    /// Discard all entity state and set up a fresh round
    fn reset(&mut self, seed: u64, now_ms: u64);

    /// Advance one step
    fn step(&mut self, frame: &InputFrame, now_ms: u64) -> Result<StepStatus, StepFault>;

    fn score(&self) -> u64;

    /// Never terminates on its own; scored when the session exits
    fn is_endless(&self) -> bool {
        false
    }

    /// Desired fixed interval after the latest step (fixed-interval games)
    fn tick_interval_ms(&self) -> Option<u64> {
        None
    }

    /// Current travel direction, for discarding reversing intents
    fn heading(&self) -> Option<Direction> {
        None
    }

    /// Serializable progress to keep across sessions
    fn save_state(&self) -> Option<serde_json::Value> {
        None
    }

    fn restore_state(&mut self, _state: serde_json::Value) {}

    /// Cancel any auxiliary timers; called when the session exits
    fn shutdown(&mut self) {}
}

impl<G: Game + ?Sized> Game for Box<G> {
    fn id(&self) -> GameId {
        (**self).id()
    }

    fn loop_mode(&self) -> LoopMode {
        (**self).loop_mode()
    }

    fn reset(&mut self, seed: u64, now_ms: u64) {
        (**self).reset(seed, now_ms)
    }

    fn step(&mut self, frame: &InputFrame, now_ms: u64) -> Result<StepStatus, StepFault> {
        (**self).step(frame, now_ms)
    }

    fn score(&self) -> u64 {
        (**self).score()
    }

    fn is_endless(&self) -> bool {
        (**self).is_endless()
    }

    fn tick_interval_ms(&self) -> Option<u64> {
        (**self).tick_interval_ms()
    }

    fn heading(&self) -> Option<Direction> {
        (**self).heading()
    }

    fn save_state(&self) -> Option<serde_json::Value> {
        (**self).save_state()
    }

    fn restore_state(&mut self, state: serde_json::Value) {
        (**self).restore_state(state)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

/// Build any game from settings
pub fn new_game(id: GameId, settings: &Settings) -> Box<dyn Game> {
    match id {
        GameId::Snake => Box::new(SnakeGame::new(settings.snake.clone())),
        GameId::Shooter => Box::new(ShooterGame::new(settings.shooter.clone())),
        GameId::Breaker => Box::new(BreakerGame::new(settings.breaker.clone())),
        GameId::TicTacToe => Box::new(TicTacToeGame::new()),
        GameId::Reaction => Box::new(ReactionGame::new(settings.reaction.clone())),
        GameId::Memory => Box::new(MemoryGame::new(settings.memory.clone())),
        GameId::Idle => Box::new(IdleGame::new(settings.idle.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_every_game() {
        let settings = Settings::default();
        for id in GameId::ALL {
            let mut game = new_game(id, &settings);
            assert_eq!(game.id(), id);
            game.reset(7, 0);
            assert_eq!(game.score(), 0);
        }
    }
}
