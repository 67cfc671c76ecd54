//! Arcade settings and per-game tuning
//!
//! Persisted as a JSON blob through the same store as scores. Every block
//! is `#[serde(default)]`, so older or partial saves still load.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::ScoreStore;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "med" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Speed multiplier applied to moving bodies and loop rates
    pub fn speed_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeTuning {
    /// Grid is `grid` x `grid` cells
    pub grid: i32,
    pub base_interval_ms: u64,
    pub min_interval_ms: u64,
    /// Interval reduction per food eaten
    pub accel_ms_per_food: u64,
    pub food_points: u64,
}

impl Default for SnakeTuning {
    fn default() -> Self {
        Self {
            grid: SNAKE_GRID,
            base_interval_ms: 150,
            min_interval_ms: 60,
            accel_ms_per_food: 5,
            food_points: SNAKE_FOOD_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerTuning {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    /// Serve velocity in pixels per frame
    pub serve_velocity: (f32, f32),
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle top sits this far above the floor
    pub paddle_offset: f32,
    pub paddle_steer: f32,
    pub brick_rows: u32,
    pub brick_cols: u32,
    pub brick_height: f32,
    pub brick_gap: f32,
    pub brick_top: f32,
}

impl Default for BreakerTuning {
    fn default() -> Self {
        Self {
            width: BREAKER_WIDTH,
            height: BREAKER_HEIGHT,
            ball_radius: BALL_RADIUS,
            serve_velocity: BALL_START_VEL,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_offset: PADDLE_OFFSET,
            paddle_steer: PADDLE_STEER,
            brick_rows: 5,
            brick_cols: 8,
            brick_height: 18.0,
            brick_gap: 6.0,
            brick_top: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub width: f32,
    pub height: f32,
    pub ship_width: f32,
    pub ship_height: f32,
    /// Bullet speed in pixels per frame
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    pub fire_cooldown_frames: u32,
    pub enemy_size: f32,
    /// Enemy fall speed in pixels per frame
    pub enemy_speed: f32,
    pub spawn_interval_frames: u32,
    pub min_spawn_interval_frames: u32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 640.0,
            ship_width: 32.0,
            ship_height: 24.0,
            bullet_speed: 8.0,
            bullet_width: 4.0,
            bullet_height: 12.0,
            fire_cooldown_frames: 10,
            enemy_size: 28.0,
            enemy_speed: 1.5,
            spawn_interval_frames: 60,
            min_spawn_interval_frames: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTuning {
    pub tick_ms: u64,
    pub round_ms: u64,
    pub target_ttl_ms: u64,
    pub lives: u32,
    /// Targets appear on one of `cells` positions
    pub cells: usize,
}

impl Default for ReactionTuning {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            round_ms: 30_000,
            target_ttl_ms: 1_200,
            lives: 3,
            cells: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTuning {
    pub pairs: usize,
    pub base_score: u64,
    /// Points lost per move beyond the minimum
    pub move_penalty: u64,
}

impl Default for MemoryTuning {
    fn default() -> Self {
        Self {
            pairs: 8,
            base_score: 200,
            move_penalty: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleTuning {
    pub tick_ms: u64,
    pub click_value: f64,
    pub cost_growth: f64,
    pub market_interval_ms: u64,
    /// Chance per market update of jumping to the maximum multiplier
    pub boom_chance: f64,
    /// Chance per market update of dropping to the minimum multiplier
    pub crash_chance: f64,
    /// Largest drift per market update
    pub market_drift: f64,
    pub offer_min_delay_ms: u64,
    pub offer_max_delay_ms: u64,
    pub offer_ttl_ms: u64,
    pub double_duration_ms: u64,
    /// Offer price, in seconds of current production (at least `click_value`)
    pub offer_price_secs: f64,
}

impl Default for IdleTuning {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            click_value: 1.0,
            cost_growth: 1.15,
            market_interval_ms: 10_000,
            boom_chance: 0.05,
            crash_chance: 0.05,
            market_drift: 0.1,
            offer_min_delay_ms: 30_000,
            offer_max_delay_ms: 60_000,
            offer_ttl_ms: 10_000,
            double_duration_ms: 30_000,
            offer_price_secs: 20.0,
        }
    }
}

/// Arcade settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Identity used when no user is signed in
    pub default_user: String,
    /// Directional intents buffered between steps
    pub intent_capacity: usize,

    pub snake: SnakeTuning,
    pub breaker: BreakerTuning,
    pub shooter: ShooterTuning,
    pub reaction: ReactionTuning,
    pub memory: MemoryTuning,
    pub idle: IdleTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            default_user: GUEST_USER.to_string(),
            intent_capacity: INTENT_QUEUE_CAPACITY,
            snake: SnakeTuning::default(),
            breaker: BreakerTuning::default(),
            shooter: ShooterTuning::default(),
            reaction: ReactionTuning::default(),
            memory: MemoryTuning::default(),
            idle: IdleTuning::default(),
        }
    }
}

impl Settings {
    /// Store scope for arcade-wide blobs
    const SCOPE: &'static str = "arcade";
    const SUFFIX: &'static str = "settings";

    /// Settings with a difficulty preset applied
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Scale speed-related tuning from the Normal baseline
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let base = Self::default();
        let factor = difficulty.speed_factor();
        self.difficulty = difficulty;

        self.snake.base_interval_ms = (base.snake.base_interval_ms as f32 / factor).round() as u64;
        self.breaker.serve_velocity = (
            base.breaker.serve_velocity.0 * factor,
            base.breaker.serve_velocity.1 * factor,
        );
        self.shooter.enemy_speed = base.shooter.enemy_speed * factor;
        self.reaction.target_ttl_ms = (base.reaction.target_ttl_ms as f32 / factor).round() as u64;
    }

    /// User id to use when the host has none
    pub fn user_or_default<'a>(&'a self, user: Option<&'a str>) -> &'a str {
        match user {
            Some(u) if !u.is_empty() => u,
            _ => &self.default_user,
        }
    }

    /// Load settings for `user`, falling back to defaults
    pub fn load(store: &ScoreStore, user: &str) -> Self {
        let settings: Self = store.read_json(Self::SCOPE, Self::SUFFIX, user, Self::default());
        log::info!("Loaded settings ({} difficulty)", settings.difficulty.as_str());
        settings
    }

    pub fn save(&self, store: &ScoreStore, user: &str) {
        store.write_json(Self::SCOPE, Self::SUFFIX, user, self);
        log::info!("Settings saved");
    }
}
