//! Brick breaker
//!
//! Per-frame game. The paddle follows the pointer; the ball and bricks are
//! resolved by `sim::collision::resolve_ball`.

use glam::Vec2;

use super::Game;
use crate::error::StepFault;
use crate::settings::BreakerTuning;
use crate::sim::collision::{Aabb, BreakerArena, MovingBody, StaticObstacle, resolve_ball};
use crate::sim::{GameId, InputFrame, LoopMode, Outcome, StepStatus};

#[derive(Debug, Clone)]
pub struct BreakerGame {
    tuning: BreakerTuning,
    arena: BreakerArena,
    ball: MovingBody,
    paddle: Aabb,
    bricks: Vec<StaticObstacle>,
    score: u64,
    frames: u64,
}

impl BreakerGame {
    pub fn new(tuning: BreakerTuning) -> Self {
        let arena = BreakerArena {
            width: tuning.width,
            height: tuning.height,
            paddle_steer: tuning.paddle_steer,
        };
        let mut game = Self {
            arena,
            ball: MovingBody::new(Vec2::ZERO, Vec2::ZERO, tuning.ball_radius),
            paddle: Aabb::from_xywh(0.0, 0.0, tuning.paddle_width, tuning.paddle_height),
            bricks: Vec::new(),
            score: 0,
            frames: 0,
            tuning,
        };
        game.layout();
        game
    }

    pub fn ball(&self) -> &MovingBody {
        &self.ball
    }

    pub fn paddle(&self) -> &Aabb {
        &self.paddle
    }

    pub fn bricks(&self) -> &[StaticObstacle] {
        &self.bricks
    }

    pub fn arena(&self) -> &BreakerArena {
        &self.arena
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    /// Replace ball and bricks explicitly (scenario setup)
    pub fn arrange(&mut self, ball: MovingBody, bricks: Vec<StaticObstacle>) {
        self.ball = ball;
        self.bricks = bricks;
    }

    /// Center the paddle on `x`, keeping it inside the arena
    pub fn move_paddle_to(&mut self, x: f32) {
        let half = self.tuning.paddle_width / 2.0;
        let center = x.clamp(half, (self.arena.width - half).max(half));
        let top = self.arena.height - self.tuning.paddle_offset;
        self.paddle = Aabb::from_xywh(
            center - half,
            top,
            self.tuning.paddle_width,
            self.tuning.paddle_height,
        );
    }

    fn layout(&mut self) {
        let t = &self.tuning;
        let cols = t.brick_cols.max(1);
        let brick_width = (t.width - t.brick_gap * (cols as f32 + 1.0)) / cols as f32;
        self.bricks = (0..t.brick_rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let x = t.brick_gap + col as f32 * (brick_width + t.brick_gap);
                let y = t.brick_top + row as f32 * (t.brick_height + t.brick_gap);
                StaticObstacle::new(Aabb::from_xywh(x, y, brick_width, t.brick_height))
            })
            .collect();

        let (vx, vy) = t.serve_velocity;
        self.ball = MovingBody::new(
            Vec2::new(t.width / 2.0, t.height - 80.0),
            Vec2::new(vx, vy),
            t.ball_radius,
        );
        self.move_paddle_to(t.width / 2.0);
    }
}

impl Game for BreakerGame {
    fn id(&self) -> GameId {
        GameId::Breaker
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::PerFrame
    }

    fn reset(&mut self, _seed: u64, _now_ms: u64) {
        self.score = 0;
        self.frames = 0;
        self.layout();
    }

    fn step(&mut self, frame: &InputFrame, _now_ms: u64) -> Result<StepStatus, StepFault> {
        if !self.ball.pos.is_finite() || !self.ball.vel.is_finite() {
            return Err(StepFault::new(format!(
                "ball state is not finite: pos {:?} vel {:?}",
                self.ball.pos, self.ball.vel
            )));
        }
        self.frames += 1;

        if let Some(pointer) = frame.pointer {
            self.move_paddle_to(pointer.x);
        }

        let step = resolve_ball(&mut self.ball, &self.paddle, &mut self.bricks, &self.arena);
        self.score += step.destroyed.len() as u64;
        if !step.destroyed.is_empty() {
            log::trace!("Frame {}: bricks {:?} destroyed", self.frames, step.destroyed);
        }

        if step.missed {
            log::debug!("Ball lost after {} frames", self.frames);
            return Ok(StepStatus::Terminated(Outcome::Over));
        }
        if step.cleared {
            log::debug!("All bricks cleared after {} frames", self.frames);
            return Ok(StepStatus::Terminated(Outcome::Won));
        }
        Ok(StepStatus::Continue)
    }

    fn score(&self) -> u64 {
        self.score
    }
}
