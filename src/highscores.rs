//! Best-score records
//!
//! One monotonically non-decreasing best per (game, user), persisted through
//! the `ScoreStore`.

use serde::{Deserialize, Serialize};

use crate::notify::{Notification, NotificationSink, Severity};
use crate::persistence::ScoreStore;
use crate::sim::GameId;

/// Persisted best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub best: u64,
}

impl ScoreRecord {
    /// Load the record for `game`/`user` (0 if never written)
    pub fn load(store: &ScoreStore, game: GameId, user: &str) -> Self {
        Self {
            best: store.read_best(game.as_str(), user),
        }
    }

    /// Whether `score` would beat this record
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }
}

/// Result of submitting a finished round's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestOutcome {
    /// Score did not beat the stored best
    Unchanged { best: u64 },
    /// Score is the new best (even if the write could not be persisted)
    NewBest { previous: u64, best: u64 },
}

impl BestOutcome {
    pub fn best(&self) -> u64 {
        match *self {
            BestOutcome::Unchanged { best } | BestOutcome::NewBest { best, .. } => best,
        }
    }
}

/// Compare `score` with the stored best, write it if higher and announce it
pub fn submit_score(
    store: &ScoreStore,
    sink: &dyn NotificationSink,
    game: GameId,
    user: &str,
    score: u64,
) -> BestOutcome {
    let record = ScoreRecord::load(store, game, user);
    if !record.qualifies(score) {
        return BestOutcome::Unchanged { best: record.best };
    }

    if !store.write_best(game.as_str(), user, score) {
        log::debug!("New {} best {} for {} not persisted", game, score, user);
    }
    log::info!("New {} best for {}: {} (was {})", game, user, score, record.best);
    sink.notify(Notification::new(
        "New best score",
        format!("{}: {} points", game, score),
        Severity::Success,
    ));
    BestOutcome::NewBest {
        previous: record.best,
        best: score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingSink;

    #[test]
    fn test_first_score_is_a_new_best() {
        let store = ScoreStore::in_memory();
        let sink = RecordingSink::new();
        let outcome = submit_score(&store, &sink, GameId::Snake, "guest", 30);
        assert_eq!(outcome, BestOutcome::NewBest { previous: 0, best: 30 });
        assert_eq!(ScoreRecord::load(&store, GameId::Snake, "guest").best, 30);
        let received = sink.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].severity, Severity::Success);
    }

    #[test]
    fn test_lower_score_leaves_best_and_stays_quiet() {
        let store = ScoreStore::in_memory();
        let sink = RecordingSink::new();
        submit_score(&store, &sink, GameId::Breaker, "guest", 12);
        let outcome = submit_score(&store, &sink, GameId::Breaker, "guest", 5);
        assert_eq!(outcome, BestOutcome::Unchanged { best: 12 });
        assert_eq!(sink.received().len(), 1);
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!ScoreRecord::default().qualifies(0));
        assert!(ScoreRecord::default().qualifies(1));
    }
}
