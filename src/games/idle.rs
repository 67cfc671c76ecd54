//! Idle clicker economy
//!
//! Fixed-interval game that never ends on its own. Each tick adds the
//! generators' output scaled by a random-walking market multiplier. Two
//! side timers run next to the tick: market drift and a time-limited
//! double-production offer. All of them live in one `TimerSet` so exit
//! cancels them together.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::Game;
use crate::error::StepFault;
use crate::settings::IdleTuning;
use crate::sim::{GameId, InputFrame, LoopMode, StepStatus, TimerSet};

pub const MARKET_MIN: f64 = 0.5;
pub const MARKET_MAX: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    Cursor,
    Farm,
    Factory,
    Bank,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 4] = [
        GeneratorKind::Cursor,
        GeneratorKind::Farm,
        GeneratorKind::Factory,
        GeneratorKind::Bank,
    ];

    pub fn base_cost(self) -> f64 {
        match self {
            GeneratorKind::Cursor => 15.0,
            GeneratorKind::Farm => 100.0,
            GeneratorKind::Factory => 1_100.0,
            GeneratorKind::Bank => 12_000.0,
        }
    }

    /// Output per second per owned generator
    pub fn rate(self) -> f64 {
        match self {
            GeneratorKind::Cursor => 0.1,
            GeneratorKind::Farm => 1.0,
            GeneratorKind::Factory => 8.0,
            GeneratorKind::Bank => 47.0,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Persistent economy state (the idle game's save-state)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleEconomy {
    pub balance: f64,
    /// Everything ever earned; purchases never reduce it
    pub lifetime: f64,
    pub generators: BTreeMap<GeneratorKind, u32>,
    pub market_multiplier: f64,
}

impl Default for IdleEconomy {
    fn default() -> Self {
        Self {
            balance: 0.0,
            lifetime: 0.0,
            generators: BTreeMap::new(),
            market_multiplier: 1.0,
        }
    }
}

impl IdleEconomy {
    pub fn count(&self, kind: GeneratorKind) -> u32 {
        self.generators.get(&kind).copied().unwrap_or(0)
    }

    /// Price of the next `kind`: `base * growth^owned`
    pub fn cost(&self, kind: GeneratorKind, growth: f64) -> f64 {
        kind.base_cost() * growth.powi(self.count(kind) as i32)
    }

    /// Combined output per second before the market multiplier
    pub fn auto_rate(&self) -> f64 {
        self.generators
            .iter()
            .map(|(kind, count)| kind.rate() * f64::from(*count))
            .sum()
    }

    pub fn earn(&mut self, amount: f64) {
        if amount > 0.0 && amount.is_finite() {
            self.balance += amount;
            self.lifetime += amount;
        }
    }

    /// Debit `amount` if affordable
    pub fn spend(&mut self, amount: f64) -> bool {
        if amount.is_finite() && self.balance >= amount {
            self.balance -= amount;
            true
        } else {
            false
        }
    }

    pub fn buy(&mut self, kind: GeneratorKind, growth: f64) -> bool {
        let cost = self.cost(kind, growth);
        if !self.spend(cost) {
            return false;
        }
        *self.generators.entry(kind).or_insert(0) += 1;
        true
    }

    /// Repair values a hand-edited or corrupted save could carry
    fn sanitize(&mut self) {
        if !self.balance.is_finite() || self.balance < 0.0 {
            self.balance = 0.0;
        }
        if !self.lifetime.is_finite() || self.lifetime < self.balance {
            self.lifetime = self.balance;
        }
        self.market_multiplier = if self.market_multiplier.is_finite() {
            self.market_multiplier.clamp(MARKET_MIN, MARKET_MAX)
        } else {
            1.0
        };
    }
}

/// One market update. `roll` in `[0, 1)` picks boom, crash or drift;
/// `drift` is the signed change applied otherwise.
pub fn next_market_multiplier(current: f64, roll: f64, drift: f64, tuning: &IdleTuning) -> f64 {
    if roll < tuning.boom_chance {
        return MARKET_MAX;
    }
    if roll < tuning.boom_chance + tuning.crash_chance {
        return MARKET_MIN;
    }
    let next = current + drift;
    if next.is_finite() {
        next.clamp(MARKET_MIN, MARKET_MAX)
    } else {
        1.0
    }
}

/// Side timers of the idle game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdleTimer {
    Market,
    OfferSpawn,
    OfferExpiry,
    DoubleEnd,
}

/// A pending double-production offer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offer {
    pub price: f64,
    pub expires_ms: u64,
}

#[derive(Debug, Clone)]
pub struct IdleGame {
    tuning: IdleTuning,
    rng: Pcg32,
    economy: IdleEconomy,
    timers: TimerSet<IdleTimer>,
    offer: Option<Offer>,
    doubled: bool,
    ticks: u64,
}

impl IdleGame {
    pub fn new(tuning: IdleTuning) -> Self {
        Self {
            tuning,
            rng: Pcg32::seed_from_u64(0),
            economy: IdleEconomy::default(),
            timers: TimerSet::new(),
            offer: None,
            doubled: false,
            ticks: 0,
        }
    }

    pub fn economy(&self) -> &IdleEconomy {
        &self.economy
    }

    pub fn timers(&self) -> &TimerSet<IdleTimer> {
        &self.timers
    }

    pub fn offer(&self) -> Option<Offer> {
        self.offer
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    /// Output per tick at the current multiplier and bonus
    pub fn tick_income(&self) -> f64 {
        let bonus = if self.doubled { 2.0 } else { 1.0 };
        let secs = self.tuning.tick_ms as f64 / 1_000.0;
        self.economy.auto_rate() * self.economy.market_multiplier * bonus * secs
    }

    fn schedule_offer(&mut self, now_ms: u64) {
        let min = self.tuning.offer_min_delay_ms;
        let max = self.tuning.offer_max_delay_ms.max(min);
        let delay = self.rng.random_range(min..=max);
        self.timers.schedule(IdleTimer::OfferSpawn, now_ms + delay);
    }

    fn drift_market(&mut self) {
        let roll: f64 = self.rng.random();
        let span = self.tuning.market_drift.abs();
        let drift = if span > 0.0 {
            self.rng.random_range(-span..=span)
        } else {
            0.0
        };
        let before = self.economy.market_multiplier;
        self.economy.market_multiplier = next_market_multiplier(before, roll, drift, &self.tuning);
        log::debug!(
            "Market {:.2} -> {:.2}",
            before,
            self.economy.market_multiplier
        );
    }

    fn on_timer(&mut self, timer: IdleTimer, now_ms: u64) {
        match timer {
            IdleTimer::Market => {
                self.drift_market();
                self.timers
                    .schedule(IdleTimer::Market, now_ms + self.tuning.market_interval_ms);
            }
            IdleTimer::OfferSpawn => {
                let price = (self.economy.auto_rate()
                    * self.economy.market_multiplier
                    * self.tuning.offer_price_secs)
                    .max(self.tuning.click_value);
                let expires_ms = now_ms + self.tuning.offer_ttl_ms;
                self.offer = Some(Offer { price, expires_ms });
                self.timers.schedule(IdleTimer::OfferExpiry, expires_ms);
                log::debug!("Double production offered for {:.1}", price);
            }
            IdleTimer::OfferExpiry => {
                if self.offer.take().is_some() {
                    log::debug!("Offer expired");
                }
                self.schedule_offer(now_ms);
            }
            IdleTimer::DoubleEnd => {
                self.doubled = false;
                log::debug!("Double production ended");
                self.schedule_offer(now_ms);
            }
        }
    }

    fn accept_offer(&mut self, now_ms: u64) {
        let Some(offer) = self.offer else {
            log::trace!("No offer to accept");
            return;
        };
        if !self.economy.spend(offer.price) {
            log::trace!("Offer unaffordable ({:.1})", offer.price);
            return;
        }
        self.offer = None;
        self.doubled = true;
        self.timers.cancel(IdleTimer::OfferExpiry);
        self.timers
            .schedule(IdleTimer::DoubleEnd, now_ms + self.tuning.double_duration_ms);
        log::debug!("Double production active");
    }

    fn buy(&mut self, index: usize) {
        let Some(kind) = GeneratorKind::from_index(index) else {
            log::trace!("No generator at index {}", index);
            return;
        };
        if self.economy.buy(kind, self.tuning.cost_growth) {
            log::debug!("Bought {:?} (now {})", kind, self.economy.count(kind));
        }
    }
}

impl Game for IdleGame {
    fn id(&self) -> GameId {
        GameId::Idle
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::FixedInterval {
            interval_ms: self.tuning.tick_ms,
        }
    }

    fn reset(&mut self, seed: u64, now_ms: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.economy = IdleEconomy::default();
        self.offer = None;
        self.doubled = false;
        self.ticks = 0;
        self.timers.cancel_all();
        self.timers
            .schedule(IdleTimer::Market, now_ms + self.tuning.market_interval_ms);
        self.schedule_offer(now_ms);
    }

    fn step(&mut self, frame: &InputFrame, now_ms: u64) -> Result<StepStatus, StepFault> {
        self.ticks += 1;
        for timer in self.timers.take_due(now_ms) {
            self.on_timer(timer, now_ms);
        }

        if frame.actions > 0 {
            self.economy
                .earn(f64::from(frame.actions) * self.tuning.click_value);
        }

        for &index in &frame.selections {
            match index {
                0 => self.accept_offer(now_ms),
                n => self.buy(n - 1),
            }
        }

        let income = self.tick_income();
        self.economy.earn(income);
        if !self.economy.balance.is_finite() {
            return Err(StepFault::new("idle balance overflowed"));
        }
        Ok(StepStatus::Continue)
    }

    fn score(&self) -> u64 {
        self.economy.lifetime.floor() as u64
    }

    fn is_endless(&self) -> bool {
        true
    }

    fn save_state(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(&self.economy) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Could not serialize idle economy: {}", e);
                None
            }
        }
    }

    fn restore_state(&mut self, state: serde_json::Value) {
        match serde_json::from_value::<IdleEconomy>(state) {
            Ok(mut economy) => {
                economy.sanitize();
                log::info!(
                    "Restored idle economy (balance {:.1}, {} generator kinds)",
                    economy.balance,
                    economy.generators.len()
                );
                self.economy = economy;
            }
            Err(e) => log::warn!("Ignoring malformed idle save: {}", e),
        }
    }

    fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.offer = None;
        self.doubled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn game() -> IdleGame {
        let mut game = IdleGame::new(IdleTuning::default());
        game.reset(5, 0);
        game
    }

    fn clicks(n: u32) -> InputFrame {
        InputFrame {
            actions: n,
            ..Default::default()
        }
    }

    fn select(indices: &[usize]) -> InputFrame {
        InputFrame {
            selections: indices.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clicks_earn_balance() {
        let mut game = game();
        game.step(&clicks(3), 1_000).unwrap();
        assert_eq!(game.economy().balance, 3.0);
        assert_eq!(game.score(), 3);
    }

    #[test]
    fn test_generator_cost_grows_geometrically() {
        let mut economy = IdleEconomy::default();
        assert_eq!(economy.cost(GeneratorKind::Cursor, 1.15), 15.0);
        economy.earn(100.0);
        assert!(economy.buy(GeneratorKind::Cursor, 1.15));
        assert!((economy.cost(GeneratorKind::Cursor, 1.15) - 17.25).abs() < 1e-9);
        assert!((economy.balance - 85.0).abs() < 1e-9);
        // Purchases never reduce lifetime earnings
        assert_eq!(economy.lifetime, 100.0);
        assert!(!economy.buy(GeneratorKind::Bank, 1.15));
    }

    #[test]
    fn test_buying_through_selection_and_ticking() {
        let mut game = game();
        game.step(&clicks(100), 1_000).unwrap();
        // Select(2) buys a Farm (1 per second)
        game.step(&select(&[2]), 2_000).unwrap();
        assert_eq!(game.economy().count(GeneratorKind::Farm), 1);
        let before = game.economy().balance;
        game.step(&InputFrame::default(), 3_000).unwrap();
        assert!((game.economy().balance - before - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_timer_drifts_and_reschedules() {
        let mut game = game();
        let interval = IdleTuning::default().market_interval_ms;
        assert_eq!(game.timers().due_at(IdleTimer::Market), Some(interval));
        game.step(&InputFrame::default(), interval).unwrap();
        assert_eq!(game.timers().due_at(IdleTimer::Market), Some(interval * 2));
        let m = game.economy().market_multiplier;
        assert!((MARKET_MIN..=MARKET_MAX).contains(&m));
    }

    #[test]
    fn test_offer_can_be_accepted_for_double_production() {
        let tuning = IdleTuning::default();
        let mut game = game();
        game.step(&clicks(1_000), 1_000).unwrap();

        let spawn_at = game.timers().due_at(IdleTimer::OfferSpawn).unwrap();
        assert!((tuning.offer_min_delay_ms..=tuning.offer_max_delay_ms).contains(&spawn_at));
        game.step(&InputFrame::default(), spawn_at).unwrap();
        let offer = game.offer().unwrap();
        assert_eq!(offer.expires_ms, spawn_at + tuning.offer_ttl_ms);

        let before = game.economy().balance;
        game.step(&select(&[0]), spawn_at + 1_000).unwrap();
        assert!(game.is_doubled());
        assert!(game.offer().is_none());
        assert!(game.economy().balance < before);
        assert!(!game.timers().is_scheduled(IdleTimer::OfferExpiry));

        let end = spawn_at + 1_000 + tuning.double_duration_ms;
        game.step(&InputFrame::default(), end).unwrap();
        assert!(!game.is_doubled());
        assert!(game.timers().is_scheduled(IdleTimer::OfferSpawn));
    }

    #[test]
    fn test_ignored_offer_expires_without_penalty() {
        let tuning = IdleTuning::default();
        let mut game = game();
        let spawn_at = game.timers().due_at(IdleTimer::OfferSpawn).unwrap();
        game.step(&InputFrame::default(), spawn_at).unwrap();
        assert!(game.offer().is_some());

        game.step(&InputFrame::default(), spawn_at + tuning.offer_ttl_ms).unwrap();
        assert!(game.offer().is_none());
        assert!(!game.is_doubled());
        assert_eq!(game.economy().balance, 0.0);
        assert!(game.timers().is_scheduled(IdleTimer::OfferSpawn));
    }

    #[test]
    fn test_shutdown_cancels_every_timer() {
        let mut game = game();
        assert!(!game.timers().is_empty());
        game.shutdown();
        assert!(game.timers().is_empty());
        assert!(game.offer().is_none());
    }

    #[test]
    fn test_save_state_round_trip() {
        let mut game = game();
        game.step(&clicks(50), 1_000).unwrap();
        game.step(&select(&[1]), 2_000).unwrap();
        let saved = game.save_state().unwrap();

        let mut restored = IdleGame::new(IdleTuning::default());
        restored.reset(1, 0);
        restored.restore_state(saved);
        assert_eq!(restored.economy(), game.economy());
        assert_eq!(restored.economy().count(GeneratorKind::Cursor), 1);
    }

    #[test]
    fn test_malformed_save_is_ignored() {
        let mut game = game();
        game.restore_state(serde_json::json!({"balance": "lots"}));
        assert_eq!(game.economy(), &IdleEconomy::default());

        game.restore_state(serde_json::json!({"balance": 10.0, "market_multiplier": 9.0}));
        assert_eq!(game.economy().market_multiplier, MARKET_MAX);
        assert_eq!(game.economy().lifetime, 10.0);
    }

    #[test]
    fn test_boom_and_crash_jump_to_extremes() {
        let tuning = IdleTuning::default();
        assert_eq!(next_market_multiplier(1.0, 0.0, 0.0, &tuning), MARKET_MAX);
        assert_eq!(next_market_multiplier(1.0, 0.07, 0.0, &tuning), MARKET_MIN);
        assert!((next_market_multiplier(1.0, 0.5, 0.05, &tuning) - 1.05).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_market_multiplier_stays_in_range(
            start in MARKET_MIN..=MARKET_MAX,
            steps in proptest::collection::vec((0.0f64..1.0, -1.0f64..1.0), 1..200),
        ) {
            let tuning = IdleTuning::default();
            let mut m = start;
            for (roll, drift) in steps {
                m = next_market_multiplier(m, roll, drift, &tuning);
                prop_assert!((MARKET_MIN..=MARKET_MAX).contains(&m));
            }
        }

        #[test]
        fn prop_seeded_game_keeps_multiplier_in_range(seed in any::<u64>()) {
            let mut game = IdleGame::new(IdleTuning::default());
            game.reset(seed, 0);
            for t in 1..=60u64 {
                game.step(&InputFrame::default(), t * 10_000).unwrap();
                let m = game.economy().market_multiplier;
                prop_assert!((MARKET_MIN..=MARKET_MAX).contains(&m));
            }
        }
    }
}
