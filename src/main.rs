//! Pocket Arcade entry point
//!
//! Native: headless attract mode. Every game (or the one named on the
//! command line) plays itself with scripted input against the JSON score
//! file, and the results are logged.
//!
//! Usage: `pocket-arcade [game] [frames]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    pocket_arcade::platform::init_logging();
    log::info!("Pocket Arcade (native) starting...");

    match native::run_cli() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            std::process::ExitCode::from(1)
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::wasm_start`
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::env;
    use std::rc::Rc;

    use pocket_arcade::attract::{self, MemoryPilot, RunSummary};
    use pocket_arcade::consts::GUEST_USER;
    use pocket_arcade::games::{
        BreakerGame, Game, IdleGame, MemoryGame, ReactionGame, ShooterGame, SnakeGame,
        TicTacToeGame,
    };
    use pocket_arcade::notify::LogSink;
    use pocket_arcade::sim::GameId;
    use pocket_arcade::{GameSession, ManualClock, ScoreStore, Settings, platform};

    const DEFAULT_FRAMES: u64 = 5_000;
    /// Nominal display refresh for per-frame and turn-based games
    const FRAME_MS: u64 = 16;

    fn usage_text() -> String {
        let games: Vec<&str> = GameId::ALL.iter().map(|id| id.as_str()).collect();
        format!(
            "usage: pocket-arcade [game] [frames]\n  game: {} (default: all)\n  frames: pumps per game (default: {})",
            games.join(", "),
            DEFAULT_FRAMES
        )
    }

    pub fn run_cli() -> Result<(), String> {
        let args = env::args().skip(1).collect::<Vec<_>>();
        if args.first().is_some_and(|a| a == "-h" || a == "--help") {
            println!("{}", usage_text());
            return Ok(());
        }

        let games = match args.first().map(String::as_str) {
            None | Some("all") => GameId::ALL.to_vec(),
            Some(name) => {
                let id = GameId::from_str(name)
                    .ok_or_else(|| format!("unknown game '{name}'\n{}", usage_text()))?;
                vec![id]
            }
        };
        let frames = match args.get(1) {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| format!("invalid frames value '{value}' (expected u64)"))?,
            None => DEFAULT_FRAMES,
        };

        let store = Rc::new(platform::default_store());
        let settings = Settings::load(&store, GUEST_USER);
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        log::info!("Attract mode: {} game(s), {} frames each, seed {}", games.len(), frames, seed);

        for id in games {
            let summary = play(id, &settings, &store, seed, frames);
            let outcome = match summary.outcome {
                Some(outcome) => format!("{outcome:?}"),
                None => "still running".to_string(),
            };
            log::info!(
                "{}: {} after {} frames, score {}, best {}",
                summary.game,
                outcome,
                summary.frames,
                summary.score,
                summary.best
            );
        }
        Ok(())
    }

    fn play(
        id: GameId,
        settings: &Settings,
        store: &Rc<ScoreStore>,
        seed: u64,
        frames: u64,
    ) -> RunSummary {
        let clock = ManualClock::new(0);
        match id {
            GameId::Snake => {
                let game = SnakeGame::new(settings.snake.clone());
                let tick = interval_of(&game);
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, tick, frames, attract::snake_pilot)
            }
            GameId::Shooter => {
                let game = ShooterGame::new(settings.shooter.clone());
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, FRAME_MS, frames, attract::shooter_pilot)
            }
            GameId::Breaker => {
                let game = BreakerGame::new(settings.breaker.clone());
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, FRAME_MS, frames, attract::breaker_pilot)
            }
            GameId::TicTacToe => {
                let session = session(TicTacToeGame::new(), settings, store, &clock, seed);
                attract::run(session, &clock, FRAME_MS, frames, attract::tictactoe_pilot)
            }
            GameId::Reaction => {
                let game = ReactionGame::new(settings.reaction.clone());
                let tick = interval_of(&game);
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, tick, frames, attract::reaction_pilot)
            }
            GameId::Memory => {
                let mut pilot = MemoryPilot::new();
                let game = MemoryGame::new(settings.memory.clone());
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, FRAME_MS, frames, |g| pilot.next(g))
            }
            GameId::Idle => {
                let growth = settings.idle.cost_growth;
                let game = IdleGame::new(settings.idle.clone());
                let tick = interval_of(&game);
                let session = session(game, settings, store, &clock, seed);
                attract::run(session, &clock, tick, frames, |g| attract::idle_pilot(g, growth))
            }
        }
    }

    fn session<G: Game>(
        game: G,
        settings: &Settings,
        store: &Rc<ScoreStore>,
        clock: &ManualClock,
        seed: u64,
    ) -> GameSession<G> {
        GameSession::new(
            game,
            settings,
            store.clone(),
            Box::new(LogSink),
            Rc::new(clock.clone()),
            None,
        )
        .with_seed(seed)
    }

    fn interval_of(game: &impl Game) -> u64 {
        match game.loop_mode() {
            pocket_arcade::sim::LoopMode::FixedInterval { interval_ms } => interval_ms,
            _ => FRAME_MS,
        }
    }
}
