//! JS bridge (WASM only)
//!
//! The page owns timers and events; it forwards them to a `WebSession` and
//! polls the result after every `pump`.

use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::clock::SystemClock;
use crate::notify::LogSink;
use crate::session::{GameSession, SessionEvent};
use crate::settings::Settings;
use crate::sim::{Direction, GameId, InputEvent, Outcome, SessionPhase};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    super::init_logging();
    log::info!("Pocket Arcade loaded");
}

/// One open mini-game
#[wasm_bindgen]
pub struct WebSession {
    session: GameSession,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(game: &str, user: Option<String>) -> Result<WebSession, JsError> {
        let id = GameId::from_str(game).ok_or_else(|| JsError::new(&format!("unknown game '{game}'")))?;
        let store = Rc::new(super::default_store());
        let user = Settings::default().user_or_default(user.as_deref()).to_string();
        let settings = Settings::load(&store, &user);
        let seed = js_sys::Date::now() as u64;
        let session = GameSession::for_game(
            id,
            &settings,
            store,
            Box::new(LogSink),
            Rc::new(SystemClock::new()),
            Some(&user),
        )
        .with_seed(seed);
        Ok(WebSession { session })
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn retry(&mut self) {
        self.session.retry();
    }

    /// Arrow key or swipe: "up", "down", "left" or "right"
    pub fn direction(&mut self, dir: &str) {
        let dir = match dir.to_lowercase().as_str() {
            "up" | "arrowup" | "w" => Direction::Up,
            "down" | "arrowdown" | "s" => Direction::Down,
            "left" | "arrowleft" | "a" => Direction::Left,
            "right" | "arrowright" | "d" => Direction::Right,
            other => {
                log::debug!("Ignoring direction '{}'", other);
                return;
            }
        };
        self.push(InputEvent::Direction(dir));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.push(InputEvent::PointerMove(Vec2::new(x, y)));
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self) {
        self.push(InputEvent::PointerDown);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.push(InputEvent::PointerUp);
    }

    pub fn select(&mut self, index: u32) {
        self.push(InputEvent::Select(index as usize));
    }

    pub fn action(&mut self) {
        self.push(InputEvent::Action);
    }

    /// Timer or animation-frame callback. Returns "inactive", "waiting",
    /// "stepped", "won" or "over".
    pub fn pump(&mut self) -> Result<String, JsError> {
        let event = self
            .session
            .pump()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let name = match event {
            SessionEvent::Inactive => "inactive",
            SessionEvent::Waiting => "waiting",
            SessionEvent::Stepped => "stepped",
            SessionEvent::Ended {
                outcome: Outcome::Won,
                ..
            } => "won",
            SessionEvent::Ended {
                outcome: Outcome::Over,
                ..
            } => "over",
        };
        Ok(name.to_string())
    }

    pub fn phase(&self) -> String {
        match self.session.phase() {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Ended(Outcome::Won) => "won",
            SessionPhase::Ended(Outcome::Over) => "over",
        }
        .to_string()
    }

    pub fn score(&self) -> f64 {
        self.session.score() as f64
    }

    pub fn best(&self) -> f64 {
        self.session.best() as f64
    }

    /// Close the game; the JS object is unusable afterwards
    pub fn exit(self) {
        self.session.exit();
    }
}

impl WebSession {
    fn push(&mut self, event: InputEvent) {
        if let Err(e) = self.session.push_input(event) {
            log::debug!("{}", e);
        }
    }
}
