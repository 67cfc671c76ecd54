//! Pocket Arcade - deterministic mini-game simulation core
//!
//! Core modules:
//! - `sim`: Game loop scheduling, input routing, collision and AI (no rendering)
//! - `games`: The seven mini-games built on top of `sim`
//! - `session`: Composition root wiring a game to its loop, input and scores
//! - `persistence`: Best-effort key-value score/save-state store
//! - `highscores`: Best-score records and "new best" notifications
//! - `settings`: Tunable configuration, persisted as JSON
//! - `platform`: Browser/native glue (logging, storage, JS bridge)
//! - `attract`: Scripted players for headless demo runs

pub mod attract;
pub mod clock;
pub mod error;
pub mod games;
pub mod highscores;
pub mod notify;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ArcadeError, StorageError};
pub use highscores::ScoreRecord;
pub use notify::{Notification, NotificationSink, Severity};
pub use persistence::ScoreStore;
pub use session::{GameSession, SessionEvent};
pub use settings::Settings;

/// Arcade-wide constants
pub mod consts {
    /// Prefix of every persisted key
    pub const APP_NAMESPACE: &str = "pocket_arcade";
    /// Identity used when no authenticated user is available
    pub const GUEST_USER: &str = "guest";
    /// Default capacity of the buffered directional intent queue
    pub const INTENT_QUEUE_CAPACITY: usize = 3;

    /// Breaker arena dimensions (pixels)
    pub const BREAKER_WIDTH: f32 = 600.0;
    pub const BREAKER_HEIGHT: f32 = 400.0;
    /// Breaker ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_START_VEL: (f32, f32) = (3.2, -3.2);
    /// Breaker paddle defaults (paddle top sits this far above the floor)
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_OFFSET: f32 = 20.0;
    /// Maximum horizontal speed the paddle can steer the ball to
    pub const PADDLE_STEER: f32 = 5.0;

    /// Snake grid size (cells)
    pub const SNAKE_GRID: i32 = 20;
    /// Points awarded per food eaten
    pub const SNAKE_FOOD_POINTS: u64 = 10;

    /// Tic-tac-toe board size (cells)
    pub const BOARD_CELLS: usize = 9;
}
