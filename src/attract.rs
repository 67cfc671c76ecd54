//! Attract mode: scripted players
//!
//! Each pilot looks at a game's state and returns the inputs a player
//! would send before the next step. Used by the native binary for headless
//! demo runs and by tests as a stand-in player.

use std::collections::{BTreeMap, BTreeSet};

use crate::clock::ManualClock;
use crate::games::memory::CardFace;
use crate::games::{
    BreakerGame, Game, GeneratorKind, IdleGame, MemoryGame, ReactionGame, ShooterGame, SnakeGame,
    TicTacToeGame,
};
use crate::session::{GameSession, SessionEvent};
use crate::sim::collision::hits_body;
use crate::sim::{Direction, GameId, InputEvent, Mark, Outcome, best_move};

/// Result of one attract-mode run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub game: GameId,
    /// `None` if the frame budget ran out first
    pub outcome: Option<Outcome>,
    pub score: u64,
    pub best: u64,
    pub frames: u64,
}

/// Drive `session` with `pilot` for at most `frames` pumps, advancing
/// `clock` by `tick_ms` before each one, then exit the session
pub fn run<G, P>(
    mut session: GameSession<G>,
    clock: &ManualClock,
    tick_ms: u64,
    frames: u64,
    mut pilot: P,
) -> RunSummary
where
    G: Game,
    P: FnMut(&G) -> Vec<InputEvent>,
{
    let game = session.id();
    session.start();

    let mut outcome = None;
    let mut played = 0;
    while played < frames {
        played += 1;
        for event in pilot(session.game()) {
            if let Err(e) = session.push_input(event) {
                log::debug!("{}", e);
            }
        }
        clock.advance(tick_ms);
        match session.pump() {
            Ok(SessionEvent::Ended { outcome: o, .. }) => {
                outcome = Some(o);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("{}", e);
                outcome = Some(Outcome::Over);
                break;
            }
        }
    }

    let summary = RunSummary {
        game,
        outcome,
        score: session.score(),
        best: session.best(),
        frames: played,
    };
    session.exit();
    summary
}

/// Head for the food, never into a wall or the body
pub fn snake_pilot(game: &SnakeGame) -> Vec<InputEvent> {
    let head = game.head();
    let food = game.food();
    let grid = game.grid();
    let body = game.body();
    let heading = game.direction();

    let distance = |dir: Direction| {
        let next = head.step(dir);
        (next.row - food.row).abs() + (next.col - food.col).abs()
    };
    let choice = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .filter(|&dir| body.len() == 1 || dir != heading.opposite())
        .filter(|&dir| {
            let next = head.step(dir);
            next.in_bounds(grid, grid) && !hits_body(body, next, next != food)
        })
        .min_by_key(|&dir| distance(dir));

    match choice {
        Some(dir) if dir != heading => vec![InputEvent::Direction(dir)],
        _ => Vec::new(),
    }
}

/// Keep the paddle under the ball
pub fn breaker_pilot(game: &BreakerGame) -> Vec<InputEvent> {
    vec![InputEvent::PointerMove(game.ball().pos)]
}

/// Track the lowest enemy and keep firing
pub fn shooter_pilot(game: &ShooterGame) -> Vec<InputEvent> {
    let target = game
        .enemies()
        .iter()
        .max_by(|a, b| a.max.y.total_cmp(&b.max.y))
        .map(|enemy| enemy.center())
        .unwrap_or(game.ship().center());
    vec![InputEvent::PointerMove(target), InputEvent::Action]
}

/// Play X with the same search the opponent uses
pub fn tictactoe_pilot(game: &TicTacToeGame) -> Vec<InputEvent> {
    best_move(game.board(), Mark::X, Mark::O)
        .map(|cell| vec![InputEvent::Select(cell)])
        .unwrap_or_default()
}

/// Hit the live target
pub fn reaction_pilot(game: &ReactionGame) -> Vec<InputEvent> {
    game.target()
        .map(|target| vec![InputEvent::Select(target.cell)])
        .unwrap_or_default()
}

/// Memory player with perfect recall; one pick per call
#[derive(Debug, Default)]
pub struct MemoryPilot {
    seen: BTreeMap<u8, BTreeSet<usize>>,
    pending: Option<usize>,
}

impl MemoryPilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, game: &MemoryGame) -> Vec<InputEvent> {
        let cards = game.cards();
        for (index, card) in cards.iter().enumerate() {
            if card.face == CardFace::Revealed {
                self.seen.entry(card.pair).or_default().insert(index);
            }
        }
        let hidden = |i: usize| cards.get(i).is_some_and(|c| c.face == CardFace::Hidden);
        let unseen = |skip: Option<usize>| {
            (0..cards.len()).find(|&i| {
                Some(i) != skip && hidden(i) && !self.seen.values().any(|s| s.contains(&i))
            })
        };

        let pick = match self.pending.take() {
            Some(first) => {
                let partner = cards.get(first).and_then(|card| {
                    self.seen
                        .get(&card.pair)
                        .and_then(|indices| indices.iter().copied().find(|&i| i != first))
                });
                partner.or_else(|| unseen(Some(first)))
            }
            None => {
                let known = self.seen.values().find_map(|indices| {
                    let both: Vec<usize> = indices.iter().copied().filter(|&i| hidden(i)).collect();
                    match both.as_slice() {
                        [first, _] => Some(*first),
                        _ => None,
                    }
                });
                let pick = known.or_else(|| unseen(None));
                self.pending = pick;
                pick
            }
        };
        pick.map(|i| vec![InputEvent::Select(i)]).unwrap_or_default()
    }
}

/// Click, take every offer and buy the cheapest affordable generator
pub fn idle_pilot(game: &IdleGame, cost_growth: f64) -> Vec<InputEvent> {
    let mut events = vec![InputEvent::Action; 3];
    let economy = game.economy();
    if game.offer().is_some_and(|offer| economy.balance >= offer.price) {
        events.push(InputEvent::Select(0));
    }
    let cheapest = GeneratorKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| (i, economy.cost(*kind, cost_growth)))
        .filter(|(_, cost)| *cost <= economy.balance)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((index, _)) = cheapest {
        events.push(InputEvent::Select(index + 1));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::notify::RecordingSink;
    use crate::persistence::ScoreStore;
    use crate::settings::{
        BreakerTuning, IdleTuning, MemoryTuning, ReactionTuning, Settings, SnakeTuning,
    };
    use crate::sim::InputFrame;

    fn session<G: Game>(game: G, clock: &ManualClock, store: &Rc<ScoreStore>) -> GameSession<G> {
        GameSession::new(
            game,
            &Settings::default(),
            store.clone(),
            Box::new(RecordingSink::new()),
            Rc::new(clock.clone()),
            None,
        )
        .with_seed(7)
    }

    #[test]
    fn test_snake_pilot_eats() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let game = SnakeGame::new(SnakeTuning::default());
        let summary = run(session(game, &clock, &store), &clock, 150, 2_000, snake_pilot);
        assert!(summary.score >= 10);
        if summary.outcome.is_some() {
            assert_eq!(summary.best, summary.score);
        }
    }

    #[test]
    fn test_breaker_pilot_scores() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let game = BreakerGame::new(BreakerTuning::default());
        let summary = run(session(game, &clock, &store), &clock, 16, 2_000, breaker_pilot);
        assert!(summary.score > 0);
        assert_ne!(summary.outcome, Some(Outcome::Over));
    }

    #[test]
    fn test_perfect_players_draw_forever() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let summary = run(
            session(TicTacToeGame::new(), &clock, &store),
            &clock,
            16,
            50,
            tictactoe_pilot,
        );
        assert_eq!(summary.outcome, None);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn test_reaction_pilot_wins_clean_round() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let tuning = ReactionTuning::default();
        let tick = tuning.tick_ms;
        let game = ReactionGame::new(tuning);
        let summary = run(session(game, &clock, &store), &clock, tick, 1_000, reaction_pilot);
        assert_eq!(summary.outcome, Some(Outcome::Won));
    }

    #[test]
    fn test_memory_pilot_solves_board() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let mut pilot = MemoryPilot::new();
        let game = MemoryGame::new(MemoryTuning::default());
        let summary = run(session(game, &clock, &store), &clock, 16, 200, |g| pilot.next(g));
        assert_eq!(summary.outcome, Some(Outcome::Won));
        assert!(summary.score > 0);
    }

    #[test]
    fn test_memory_pilot_keeps_picking_after_matches() {
        let mut game = MemoryGame::new(MemoryTuning::default());
        game.reset(11, 0);
        let mut pilot = MemoryPilot::new();
        for _ in 0..200 {
            if game.is_solved() {
                break;
            }
            let frame = InputFrame {
                selections: pilot
                    .next(&game)
                    .into_iter()
                    .filter_map(|event| match event {
                        InputEvent::Select(index) => Some(index),
                        _ => None,
                    })
                    .collect(),
                ..Default::default()
            };
            game.step(&frame, 0).unwrap();
        }
        assert!(game.is_solved());
        assert_eq!(game.matched_pairs(), MemoryTuning::default().pairs);
    }

    #[test]
    fn test_idle_pilot_grows_economy() {
        let clock = ManualClock::new(0);
        let store = Rc::new(ScoreStore::in_memory());
        let tuning = IdleTuning::default();
        let growth = tuning.cost_growth;
        let tick = tuning.tick_ms;
        let game = IdleGame::new(tuning);
        let summary = run(session(game, &clock, &store), &clock, tick, 300, |g| {
            idle_pilot(g, growth)
        });
        assert_eq!(summary.outcome, None);
        assert!(summary.score >= 900);
    }
}
