//! Vertical shooter
//!
//! Per-frame game. The ship follows the pointer along the bottom edge and
//! fires upward; enemies spawn at random columns and fall.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Game;
use crate::error::StepFault;
use crate::settings::ShooterTuning;
use crate::sim::collision::Aabb;
use crate::sim::{GameId, InputFrame, LoopMode, Outcome, StepStatus};

/// Frames shaved off the spawn interval per point scored
const SPAWN_SPEEDUP_PER_POINT: u32 = 2;

#[derive(Debug, Clone)]
pub struct ShooterGame {
    tuning: ShooterTuning,
    rng: Pcg32,
    ship: Aabb,
    bullets: Vec<Aabb>,
    enemies: Vec<Aabb>,
    cooldown: u32,
    spawn_timer: u32,
    score: u64,
    frames: u64,
}

impl ShooterGame {
    pub fn new(tuning: ShooterTuning) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(0),
            ship: Aabb::from_xywh(0.0, 0.0, tuning.ship_width, tuning.ship_height),
            bullets: Vec::new(),
            enemies: Vec::new(),
            cooldown: 0,
            spawn_timer: 0,
            score: 0,
            frames: 0,
            tuning,
        };
        game.move_ship_to(game.tuning.width / 2.0);
        game
    }

    pub fn ship(&self) -> &Aabb {
        &self.ship
    }

    pub fn bullets(&self) -> &[Aabb] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Aabb] {
        &self.enemies
    }

    /// Add an enemy with its top-left corner at `pos` (scenario setup)
    pub fn spawn_enemy_at(&mut self, pos: Vec2) {
        let size = self.tuning.enemy_size;
        self.enemies.push(Aabb::from_xywh(pos.x, pos.y, size, size));
    }

    pub fn move_ship_to(&mut self, x: f32) {
        let t = &self.tuning;
        let half = t.ship_width / 2.0;
        let center = x.clamp(half, (t.width - half).max(half));
        let top = t.height - t.ship_height - 10.0;
        self.ship = Aabb::from_xywh(center - half, top, t.ship_width, t.ship_height);
    }

    /// Frames between spawns at the current score
    pub fn spawn_interval(&self) -> u32 {
        let speedup = u32::try_from(self.score)
            .unwrap_or(u32::MAX)
            .saturating_mul(SPAWN_SPEEDUP_PER_POINT);
        self.tuning
            .spawn_interval_frames
            .saturating_sub(speedup)
            .max(self.tuning.min_spawn_interval_frames)
    }

    fn fire(&mut self) {
        let t = &self.tuning;
        let center = self.ship.center().x;
        self.bullets.push(Aabb::from_xywh(
            center - t.bullet_width / 2.0,
            self.ship.min.y - t.bullet_height,
            t.bullet_width,
            t.bullet_height,
        ));
        self.cooldown = t.fire_cooldown_frames;
    }

    fn spawn_enemy(&mut self) {
        let size = self.tuning.enemy_size;
        let max_x = (self.tuning.width - size).max(0.0);
        let x = self.rng.random_range(0.0..=max_x);
        self.spawn_enemy_at(Vec2::new(x, -size));
    }

    /// Bullet/enemy hits: each bullet destroys the first enemy it overlaps
    fn resolve_hits(&mut self) -> u64 {
        let mut enemy_alive = vec![true; self.enemies.len()];
        let mut bullet_alive = vec![true; self.bullets.len()];
        let mut hits = 0;
        for (bi, bullet) in self.bullets.iter().enumerate() {
            let target = self
                .enemies
                .iter()
                .enumerate()
                .position(|(ei, enemy)| enemy_alive[ei] && bullet.overlaps(enemy));
            if let Some(ei) = target {
                enemy_alive[ei] = false;
                bullet_alive[bi] = false;
                hits += 1;
            }
        }

        let mut alive = enemy_alive.into_iter();
        self.enemies.retain(|_| alive.next().unwrap_or(false));
        let mut alive = bullet_alive.into_iter();
        self.bullets.retain(|_| alive.next().unwrap_or(false));
        hits
    }
}

impl Game for ShooterGame {
    fn id(&self) -> GameId {
        GameId::Shooter
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::PerFrame
    }

    fn reset(&mut self, seed: u64, _now_ms: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.bullets.clear();
        self.enemies.clear();
        self.cooldown = 0;
        self.spawn_timer = 0;
        self.score = 0;
        self.frames = 0;
        self.move_ship_to(self.tuning.width / 2.0);
    }

    fn step(&mut self, frame: &InputFrame, _now_ms: u64) -> Result<StepStatus, StepFault> {
        self.frames += 1;

        if let Some(pointer) = frame.pointer {
            self.move_ship_to(pointer.x);
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        if (frame.actions > 0 || frame.pointer_down) && self.cooldown == 0 {
            self.fire();
        }

        let bullet_step = Vec2::new(0.0, -self.tuning.bullet_speed);
        for bullet in &mut self.bullets {
            bullet.translate(bullet_step);
        }
        self.bullets.retain(|b| b.max.y > 0.0);

        let enemy_step = Vec2::new(0.0, self.tuning.enemy_speed);
        for enemy in &mut self.enemies {
            enemy.translate(enemy_step);
        }

        let hits = self.resolve_hits();
        if hits > 0 {
            self.score += hits;
            log::trace!("Frame {}: {} enemies shot", self.frames, hits);
        }

        let height = self.tuning.height;
        if self
            .enemies
            .iter()
            .any(|e| e.overlaps(&self.ship) || e.max.y >= height)
        {
            log::debug!("Ship overrun after {} frames", self.frames);
            return Ok(StepStatus::Terminated(Outcome::Over));
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= self.spawn_interval() {
            self.spawn_timer = 0;
            self.spawn_enemy();
        }
        Ok(StepStatus::Continue)
    }

    fn score(&self) -> u64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> ShooterGame {
        let mut game = ShooterGame::new(ShooterTuning::default());
        game.reset(9, 0);
        game
    }

    fn fire_at(x: f32) -> InputFrame {
        InputFrame {
            pointer: Some(Vec2::new(x, 0.0)),
            actions: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut game = game();
        game.step(&fire_at(240.0), 0).unwrap();
        assert_eq!(game.bullets().len(), 1);
        game.step(&fire_at(240.0), 0).unwrap();
        assert_eq!(game.bullets().len(), 1);
        for _ in 0..ShooterTuning::default().fire_cooldown_frames {
            game.step(&fire_at(240.0), 0).unwrap();
        }
        assert_eq!(game.bullets().len(), 2);
    }

    #[test]
    fn test_bullet_destroys_enemy_and_scores() {
        let mut game = game();
        let ship_top = game.ship().min.y;
        // Enemy directly above the ship, just over the muzzle
        game.spawn_enemy_at(Vec2::new(226.0, ship_top - 40.0));
        game.step(&fire_at(240.0), 0).unwrap();
        assert_eq!(game.score(), 1);
        assert!(game.bullets().is_empty());
        assert!(game.enemies().iter().all(|e| e.min.y < 0.0));
    }

    #[test]
    fn test_one_bullet_one_enemy() {
        let mut game = game();
        let ship_top = game.ship().min.y;
        game.spawn_enemy_at(Vec2::new(226.0, ship_top - 40.0));
        game.spawn_enemy_at(Vec2::new(228.0, ship_top - 40.0));
        game.step(&fire_at(240.0), 0).unwrap();
        assert_eq!(game.score(), 1);
        assert_eq!(game.enemies().iter().filter(|e| e.min.y > 0.0).count(), 1);
    }

    #[test]
    fn test_enemy_reaching_bottom_ends_game() {
        let mut game = game();
        let height = ShooterTuning::default().height;
        game.spawn_enemy_at(Vec2::new(0.0, height - 28.5));
        let status = game.step(&InputFrame::default(), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Over));
    }

    #[test]
    fn test_enemies_spawn_deterministically() {
        let mut a = game();
        let mut b = game();
        for _ in 0..200 {
            a.step(&InputFrame::default(), 0).unwrap();
            b.step(&InputFrame::default(), 0).unwrap();
        }
        assert!(!a.enemies().is_empty());
        assert_eq!(a.enemies(), b.enemies());
    }

    #[test]
    fn test_spawn_interval_shrinks_with_score() {
        let mut game = game();
        let tuning = ShooterTuning::default();
        assert_eq!(game.spawn_interval(), tuning.spawn_interval_frames);
        game.score = 1_000;
        assert_eq!(game.spawn_interval(), tuning.min_spawn_interval_frames);
    }
}
