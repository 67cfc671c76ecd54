//! Collision detection and response for the continuous-motion games
//!
//! The tricky part is the breaker ball: at high speed a single position
//! update can skip straight over a thin brick. `resolve_ball` therefore
//! splits every step into sub-steps proportional to the ball's speed and
//! resolves walls, paddle and bricks once per sub-step.
//!
//! Coordinates are screen-style: origin top-left, +y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::GridCell;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from top-left corner and size
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.min += delta;
        self.max += delta;
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Whether a circle intersects this rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        center.distance_squared(closest) < radius * radius
    }
}

/// A moving circle (ball)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingBody {
    pub pos: Vec2,
    /// Displacement per step
    pub vel: Vec2,
    pub radius: f32,
}

impl MovingBody {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }
}

/// A destructible brick; flips `alive` instead of being removed so that
/// indices stay stable for the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticObstacle {
    pub bounds: Aabb,
    pub alive: bool,
}

impl StaticObstacle {
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds, alive: true }
    }
}

/// Breaker playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerArena {
    pub width: f32,
    pub height: f32,
    /// Horizontal speed given to a ball hitting the paddle's very edge
    pub paddle_steer: f32,
}

/// What happened while resolving one ball step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakerStep {
    /// Sub-steps actually simulated
    pub substeps: u32,
    /// Obstacle indices destroyed, in the order they were hit
    pub destroyed: Vec<usize>,
    pub wall_hits: u32,
    pub paddle_hits: u32,
    /// Ball dropped past the floor; the round is lost
    pub missed: bool,
    /// No obstacle left alive; the round is won
    pub cleared: bool,
}

/// Number of sub-steps for a displacement: ceil(max(|vx|, |vy|) / 2), at least 1
pub fn substep_count(vel: Vec2) -> u32 {
    let largest = vel.x.abs().max(vel.y.abs());
    if !largest.is_finite() {
        return 1;
    }
    ((largest / 2.0).ceil() as u32).max(1)
}

/// Which velocity component to flip after hitting `bounds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceAxis {
    Horizontal,
    Vertical,
}

/// Minimum penetration axis between a circle and a rectangle.
///
/// Compares how far the circle reaches past each of the four sides; a side
/// overlap that is strictly smaller than the top/bottom one flips `vx`,
/// anything else (ties included) flips `vy`.
pub fn bounce_axis(bounds: &Aabb, center: Vec2, radius: f32) -> BounceAxis {
    let overlap_left = (center.x + radius) - bounds.min.x;
    let overlap_right = bounds.max.x - (center.x - radius);
    let overlap_top = (center.y + radius) - bounds.min.y;
    let overlap_bottom = bounds.max.y - (center.y - radius);

    let min_x = overlap_left.min(overlap_right);
    let min_y = overlap_top.min(overlap_bottom);
    if min_x < min_y {
        BounceAxis::Horizontal
    } else {
        BounceAxis::Vertical
    }
}

/// Advance the breaker ball by one step, resolving walls, paddle and
/// obstacles once per sub-step.
///
/// At most one obstacle is destroyed per sub-step: the first alive one in
/// scan order that the ball overlaps.
pub fn resolve_ball(
    ball: &mut MovingBody,
    paddle: &Aabb,
    obstacles: &mut [StaticObstacle],
    arena: &BreakerArena,
) -> BreakerStep {
    let steps = substep_count(ball.vel);
    let r = ball.radius;
    let mut result = BreakerStep::default();

    for _ in 0..steps {
        result.substeps += 1;
        ball.pos += ball.vel / steps as f32;

        // --- Walls ---
        if ball.pos.x < r {
            ball.pos.x = r;
            ball.vel.x = ball.vel.x.abs();
            result.wall_hits += 1;
        } else if ball.pos.x > arena.width - r {
            ball.pos.x = arena.width - r;
            ball.vel.x = -ball.vel.x.abs();
            result.wall_hits += 1;
        }
        if ball.pos.y < r {
            ball.pos.y = r;
            ball.vel.y = ball.vel.y.abs();
            result.wall_hits += 1;
        }
        if ball.pos.y + r > arena.height {
            result.missed = true;
            return result;
        }

        // --- Paddle ---
        let overlaps_band = ball.pos.y + r >= paddle.min.y && ball.pos.y - r <= paddle.max.y;
        let within_span = ball.pos.x >= paddle.min.x && ball.pos.x <= paddle.max.x;
        if ball.vel.y > 0.0 && overlaps_band && within_span {
            let half = (paddle.width() * 0.5).max(f32::EPSILON);
            let hit = ((ball.pos.x - paddle.center().x) / half).clamp(-1.0, 1.0);
            ball.vel.x = hit * arena.paddle_steer;
            ball.vel.y = -ball.vel.y.abs();
            ball.pos.y = paddle.min.y - r;
            result.paddle_hits += 1;
        }

        // --- Obstacles ---
        let hit = obstacles
            .iter()
            .position(|o| o.alive && o.bounds.overlaps_circle(ball.pos, r));
        if let Some(index) = hit {
            let obstacle = &mut obstacles[index];
            obstacle.alive = false;
            match bounce_axis(&obstacle.bounds, ball.pos, r) {
                BounceAxis::Horizontal => ball.vel.x = -ball.vel.x,
                BounceAxis::Vertical => ball.vel.y = -ball.vel.y,
            }
            result.destroyed.push(index);
        }
    }

    result.cleared = obstacles.iter().all(|o| !o.alive);
    result
}

/// Whether `cell` lies on `body`. With `tail_moves` the last-to-move cell
/// (index 0, the tail) is ignored because it vacates this step.
pub fn hits_body(body: &[GridCell], cell: GridCell, tail_moves: bool) -> bool {
    let skip = usize::from(tail_moves && !body.is_empty());
    body[skip..].contains(&cell)
}
