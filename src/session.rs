//! Game sessions
//!
//! A `GameSession` is one running instance of a mini-game. It owns the game
//! state, its loop scheduler and its input router, and touches the score
//! store only at round boundaries:
//! - `start`/`retry`: reset entities, clear input, restore any save-state
//! - termination: compare the final score with the stored best
//! - `exit`: write the save-state, cancel every timer, drop the session
//!
//! Sessions never share mutable state. Two sessions on the same store only
//! meet through keys, which are distinct per (game, user).

use std::rc::Rc;

use crate::clock::Clock;
use crate::error::ArcadeError;
use crate::games::{Game, new_game};
use crate::highscores::{BestOutcome, submit_score};
use crate::notify::NotificationSink;
use crate::persistence::{SAVE_SUFFIX, ScoreStore};
use crate::settings::Settings;
use crate::sim::{
    GameId, GameLoopScheduler, InputEvent, InputRouter, LoopHandle, LoopMode, Outcome, SessionPhase,
    StepStatus,
};

/// What a call to `pump` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is not running
    Inactive,
    /// Not due yet, or a turn-based game has no input to act on
    Waiting,
    /// One step ran and the round continues
    Stepped,
    /// The round just ended
    Ended {
        outcome: Outcome,
        score: u64,
        best: BestOutcome,
    },
}

pub struct GameSession<G: Game = Box<dyn Game>> {
    game: G,
    phase: SessionPhase,
    scheduler: GameLoopScheduler,
    handle: Option<LoopHandle>,
    router: InputRouter,
    store: Rc<ScoreStore>,
    notifier: Box<dyn NotificationSink>,
    clock: Rc<dyn Clock>,
    user: String,
    seed: u64,
    rounds: u64,
    faulted: bool,
    last_result: Option<BestOutcome>,
}

impl GameSession<Box<dyn Game>> {
    /// Session for any game id, built from settings
    pub fn for_game(
        id: GameId,
        settings: &Settings,
        store: Rc<ScoreStore>,
        notifier: Box<dyn NotificationSink>,
        clock: Rc<dyn Clock>,
        user: Option<&str>,
    ) -> Self {
        Self::new(new_game(id, settings), settings, store, notifier, clock, user)
    }
}

impl<G: Game> GameSession<G> {
    pub fn new(
        game: G,
        settings: &Settings,
        store: Rc<ScoreStore>,
        notifier: Box<dyn NotificationSink>,
        clock: Rc<dyn Clock>,
        user: Option<&str>,
    ) -> Self {
        let id = game.id();
        Self {
            game,
            phase: SessionPhase::Idle,
            scheduler: GameLoopScheduler::new(id),
            handle: None,
            router: InputRouter::new(settings.intent_capacity),
            store,
            notifier,
            clock,
            user: settings.user_or_default(user).to_string(),
            seed: 0,
            rounds: 0,
            faulted: false,
            last_result: None,
        }
    }

    /// Base seed; round `n` plays with `seed + n`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn id(&self) -> GameId {
        self.game.id()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Read-only view of the game state, for polling by the presentation layer
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    /// Stored best score for this game and user
    pub fn best(&self) -> u64 {
        self.store.read_best(self.game.id().as_str(), &self.user)
    }

    /// Best-score comparison of the last finished round
    pub fn last_result(&self) -> Option<BestOutcome> {
        self.last_result
    }

    pub fn scheduler(&self) -> &GameLoopScheduler {
        &self.scheduler
    }

    /// `idle --start--> running`. Ignored while already running.
    pub fn start(&mut self) {
        match self.phase {
            SessionPhase::Running => log::warn!("{} already running", self.game.id()),
            SessionPhase::Idle | SessionPhase::Ended(_) => self.begin_round(),
        }
    }

    /// `ended --retry--> running`. Ignored in any other phase.
    pub fn retry(&mut self) {
        match self.phase {
            SessionPhase::Ended(_) => self.begin_round(),
            phase => log::debug!("Ignoring retry of {} in {:?}", self.game.id(), phase),
        }
    }

    fn begin_round(&mut self) {
        let now = self.clock.now_ms();
        let seed = self.seed.wrapping_add(self.rounds);
        self.rounds += 1;

        self.game.reset(seed, now);
        let id = self.game.id();
        let saved: Option<serde_json::Value> =
            self.store.read_json(id.as_str(), SAVE_SUFFIX, &self.user, None);
        if let Some(state) = saved {
            self.game.restore_state(state);
        }

        self.router.clear();
        if let Some(heading) = self.game.heading() {
            self.router.set_heading(heading);
        }
        self.handle = Some(self.scheduler.start(self.game.loop_mode(), now));
        self.phase = SessionPhase::Running;
        self.faulted = false;
        self.last_result = None;
        log::info!("{} round {} started for {} (seed {})", id, self.rounds, self.user, seed);
    }

    /// Route a player input. Inputs outside `running` are dropped.
    pub fn push_input(&mut self, event: InputEvent) -> Result<(), ArcadeError> {
        if self.phase != SessionPhase::Running {
            log::trace!("Dropping {:?}, {} not running", event, self.game.id());
            return Ok(());
        }
        self.router.push(event)
    }

    /// Host timer/frame callback: run at most one step if the loop is due
    pub fn pump(&mut self) -> Result<SessionEvent, ArcadeError> {
        if self.phase != SessionPhase::Running {
            return Ok(SessionEvent::Inactive);
        }
        let Some(handle) = self.handle else {
            return Ok(SessionEvent::Inactive);
        };
        if self.scheduler.mode() == Some(LoopMode::OnInput) && !self.router.has_discrete_input() {
            return Ok(SessionEvent::Waiting);
        }

        let now = self.clock.now_ms();
        let mut status = StepStatus::Continue;
        let fired = self.scheduler.fire(handle, now, || {
            let frame = self.router.next_frame();
            status = self.game.step(&frame, now)?;
            Ok(())
        });
        let ran = match fired {
            Ok(ran) => ran,
            Err(err) => {
                self.abort();
                return Err(err);
            }
        };
        if !ran {
            return Ok(SessionEvent::Waiting);
        }

        if let Some(interval_ms) = self.game.tick_interval_ms() {
            self.scheduler.set_interval(interval_ms);
        }
        Ok(match status {
            StepStatus::Continue => SessionEvent::Stepped,
            StepStatus::Terminated(outcome) => self.finish(outcome),
        })
    }

    /// `running --terminate--> ended`
    fn finish(&mut self, outcome: Outcome) -> SessionEvent {
        self.scheduler.stop();
        self.handle = None;
        self.phase = SessionPhase::Ended(outcome);

        let id = self.game.id();
        let score = self.game.score();
        let best = submit_score(&self.store, self.notifier.as_ref(), id, &self.user, score);
        self.last_result = Some(best);
        log::info!("{} ended ({:?}) with score {}, best {}", id, outcome, score, best.best());
        SessionEvent::Ended {
            outcome,
            score,
            best,
        }
    }

    /// A step faulted: the loop is already stopped. End the round without
    /// touching the stored best.
    fn abort(&mut self) {
        self.scheduler.stop();
        self.handle = None;
        self.phase = SessionPhase::Ended(Outcome::Over);
        self.faulted = true;
        log::error!("{} session aborted after a step fault", self.game.id());
    }

    /// Destroy the session: persist the save-state, then cancel the loop and
    /// every auxiliary timer. A round that ended on a step fault writes
    /// nothing.
    ///
    /// Endless games never reach `finish`, so their running score is
    /// submitted here instead.
    pub fn exit(mut self) {
        let id = self.game.id();
        if self.faulted {
            log::warn!("{} closed after a step fault, progress not saved", id);
        } else if self.rounds > 0 {
            if self.phase == SessionPhase::Running && self.game.is_endless() {
                let score = self.game.score();
                submit_score(&self.store, self.notifier.as_ref(), id, &self.user, score);
            }
            if let Some(state) = self.game.save_state() {
                self.store.write_json(id.as_str(), SAVE_SUFFIX, &self.user, &state);
            }
        }
        self.game.shutdown();
        self.scheduler.stop();
        self.handle = None;
        log::info!("{} session closed for {}", id, self.user);
    }
}

impl<G: Game> std::fmt::Debug for GameSession<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("game", &self.game.id())
            .field("phase", &self.phase)
            .field("user", &self.user)
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}
