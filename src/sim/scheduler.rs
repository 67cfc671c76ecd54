//! Game loop scheduling
//!
//! The host delivers timer/frame callbacks; the scheduler decides whether a
//! step may run. Every registration is stamped with a generation so a
//! callback carrying a stale handle (issued before `stop` or a restart) is
//! ignored. That is the whole cancellation story: single-threaded, one
//! active registration per scheduler, no trailing call after `stop`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GameId;
use crate::error::{ArcadeError, StepFault};

/// How the loop is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Step every `interval_ms` (snake, reaction, idle ticks)
    FixedInterval { interval_ms: u64 },
    /// Step once per display refresh (shooter, breaker)
    PerFrame,
    /// Step only when input arrives (board and card games)
    OnInput,
}

/// Token for one loop registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle {
    generation: u64,
}

/// Drives one session's step function
#[derive(Debug)]
pub struct GameLoopScheduler {
    game: GameId,
    mode: Option<LoopMode>,
    generation: u64,
    interval_ms: u64,
    next_due_ms: u64,
    steps: u64,
}

impl GameLoopScheduler {
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            mode: None,
            generation: 0,
            interval_ms: 0,
            next_due_ms: 0,
            steps: 0,
        }
    }

    /// Register a loop, cancelling any previous one
    pub fn start(&mut self, mode: LoopMode, now_ms: u64) -> LoopHandle {
        self.generation += 1;
        self.mode = Some(mode);
        self.steps = 0;
        if let LoopMode::FixedInterval { interval_ms } = mode {
            self.interval_ms = interval_ms.max(1);
            self.next_due_ms = now_ms + self.interval_ms;
        }
        log::debug!("{} loop started ({:?}, gen {})", self.game, mode, self.generation);
        LoopHandle {
            generation: self.generation,
        }
    }

    /// Cancel the active registration. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mode) = self.mode.take() {
            log::debug!("{} loop stopped after {} steps ({:?})", self.game, self.steps, mode);
        }
        self.generation += 1;
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<LoopMode> {
        self.mode
    }

    /// Whether `handle` still refers to the active registration
    pub fn is_current(&self, handle: LoopHandle) -> bool {
        self.mode.is_some() && handle.generation == self.generation
    }

    /// Change the fixed interval. The already-scheduled call keeps its due
    /// time; the new interval applies when the following call is scheduled.
    pub fn set_interval(&mut self, interval_ms: u64) {
        if matches!(self.mode, Some(LoopMode::FixedInterval { .. })) {
            let interval_ms = interval_ms.max(1);
            if interval_ms != self.interval_ms {
                log::trace!("{} interval {} -> {} ms", self.game, self.interval_ms, interval_ms);
                self.interval_ms = interval_ms;
                self.mode = Some(LoopMode::FixedInterval { interval_ms });
            }
        }
    }

    pub fn interval_ms(&self) -> Option<u64> {
        match self.mode {
            Some(LoopMode::FixedInterval { .. }) => Some(self.interval_ms),
            _ => None,
        }
    }

    /// Due time of the pending fixed-interval call
    pub fn next_due_ms(&self) -> Option<u64> {
        match self.mode {
            Some(LoopMode::FixedInterval { .. }) => Some(self.next_due_ms),
            _ => None,
        }
    }

    pub fn steps_run(&self) -> u64 {
        self.steps
    }

    /// Host callback: run `step` at most once if `handle` is current and the
    /// loop is due. Returns whether a step ran.
    ///
    /// A failing step stops the loop permanently and surfaces as
    /// `ArcadeError::SchedulerFault`.
    pub fn fire<F>(&mut self, handle: LoopHandle, now_ms: u64, step: F) -> Result<bool, ArcadeError>
    where
        F: FnOnce() -> Result<(), StepFault>,
    {
        if !self.is_current(handle) {
            return Ok(false);
        }
        if let Some(LoopMode::FixedInterval { .. }) = self.mode {
            if now_ms < self.next_due_ms {
                return Ok(false);
            }
        }

        match step() {
            Ok(()) => {
                self.steps += 1;
                if let Some(LoopMode::FixedInterval { .. }) = self.mode {
                    self.next_due_ms = now_ms + self.interval_ms;
                }
                Ok(true)
            }
            Err(fault) => {
                log::warn!("{} step faulted, stopping loop: {}", self.game, fault);
                self.stop();
                Err(ArcadeError::SchedulerFault {
                    game: self.game,
                    reason: fault.to_string(),
                })
            }
        }
    }
}

/// Auxiliary one-shot timers keyed by `K`, cancelled as a group on exit
#[derive(Debug, Clone)]
pub struct TimerSet<K: Ord> {
    due: BTreeMap<K, u64>,
}

impl<K: Ord> Default for TimerSet<K> {
    fn default() -> Self {
        Self {
            due: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> TimerSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) `key` to fire at `due_ms`
    pub fn schedule(&mut self, key: K, due_ms: u64) {
        self.due.insert(key, due_ms);
    }

    pub fn cancel(&mut self, key: K) -> bool {
        self.due.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.due.clear();
    }

    pub fn is_scheduled(&self, key: K) -> bool {
        self.due.contains_key(&key)
    }

    pub fn due_at(&self, key: K) -> Option<u64> {
        self.due.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: u64) -> Vec<K> {
        let mut fired: Vec<(u64, K)> = self
            .due
            .iter()
            .filter(|(_, due)| **due <= now_ms)
            .map(|(key, due)| (*due, *key))
            .collect();
        fired.sort();
        for (_, key) in &fired {
            self.due.remove(key);
        }
        fired.into_iter().map(|(_, key)| key).collect()
    }
}
