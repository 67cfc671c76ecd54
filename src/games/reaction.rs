//! Reaction game
//!
//! Fixed-interval game. One target is live at a time on a small grid; hit
//! it before it expires. Wrong picks and expired targets cost a life.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::Game;
use crate::error::StepFault;
use crate::settings::ReactionTuning;
use crate::sim::{GameId, InputFrame, LoopMode, Outcome, StepStatus};

/// The live target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub cell: usize,
    pub spawned_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ReactionGame {
    tuning: ReactionTuning,
    rng: Pcg32,
    started_ms: u64,
    target: Option<Target>,
    lives: u32,
    score: u64,
    misses: u32,
    reaction_times: Vec<u64>,
}

impl ReactionGame {
    pub fn new(tuning: ReactionTuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(0),
            started_ms: 0,
            target: None,
            lives: tuning.lives,
            score: 0,
            misses: 0,
            reaction_times: Vec::new(),
            tuning,
        }
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Time left in the round at `now_ms`
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.started_ms + self.tuning.round_ms).saturating_sub(now_ms)
    }

    pub fn average_reaction_ms(&self) -> Option<u64> {
        if self.reaction_times.is_empty() {
            return None;
        }
        Some(self.reaction_times.iter().sum::<u64>() / self.reaction_times.len() as u64)
    }

    fn spawn(&mut self, now_ms: u64) {
        let cell = self.rng.random_range(0..self.tuning.cells.max(1));
        self.target = Some(Target {
            cell,
            spawned_ms: now_ms,
        });
    }

    /// Returns true when the last life is gone
    fn lose_life(&mut self, reason: &str) -> bool {
        self.misses += 1;
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Life lost ({}), {} left", reason, self.lives);
        self.lives == 0
    }
}

impl Game for ReactionGame {
    fn id(&self) -> GameId {
        GameId::Reaction
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::FixedInterval {
            interval_ms: self.tuning.tick_ms,
        }
    }

    fn reset(&mut self, seed: u64, now_ms: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.started_ms = now_ms;
        self.lives = self.tuning.lives;
        self.score = 0;
        self.misses = 0;
        self.reaction_times.clear();
        self.spawn(now_ms);
    }

    fn step(&mut self, frame: &InputFrame, now_ms: u64) -> Result<StepStatus, StepFault> {
        for &cell in &frame.selections {
            let Some(target) = self.target else {
                break;
            };
            if cell == target.cell {
                self.score += 1;
                self.reaction_times.push(now_ms.saturating_sub(target.spawned_ms));
                self.spawn(now_ms);
            } else if self.lose_life("wrong cell") {
                return Ok(StepStatus::Terminated(Outcome::Over));
            }
        }

        if let Some(target) = self.target {
            if now_ms.saturating_sub(target.spawned_ms) >= self.tuning.target_ttl_ms {
                if self.lose_life("target expired") {
                    return Ok(StepStatus::Terminated(Outcome::Over));
                }
                self.spawn(now_ms);
            }
        }

        if self.remaining_ms(now_ms) == 0 {
            let outcome = if self.lives == self.tuning.lives {
                Outcome::Won
            } else {
                Outcome::Over
            };
            log::debug!(
                "Round over: {} hits, average {:?} ms",
                self.score,
                self.average_reaction_ms()
            );
            return Ok(StepStatus::Terminated(outcome));
        }
        Ok(StepStatus::Continue)
    }

    fn score(&self) -> u64 {
        self.score
    }
}
