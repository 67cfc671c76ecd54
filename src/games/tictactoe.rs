//! Tic-tac-toe against the minimax opponent
//!
//! Stepped per input. The human plays X, the AI answers as O. A session is
//! a win streak: every human win scores one and deals a fresh board, draws
//! deal a fresh board, and the first AI win ends the session.

use super::Game;
use crate::error::StepFault;
use crate::sim::{Board, GameId, InputFrame, LoopMode, Mark, Outcome, StepStatus, best_move, winner};

pub const HUMAN: Mark = Mark::X;
pub const AI: Mark = Mark::O;

#[derive(Debug, Clone, Default)]
pub struct TicTacToeGame {
    board: Board,
    wins: u64,
    draws: u64,
    /// Human moves rejected because the cell was taken or out of range
    rejected: u64,
}

impl TicTacToeGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn rejected_moves(&self) -> u64 {
        self.rejected
    }

    /// Replace the live board (scenario setup)
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    fn deal(&mut self) {
        self.board = Board::new();
    }

    /// One human move plus the AI reply
    fn play(&mut self, cell: usize) -> Result<StepStatus, StepFault> {
        if let Err(err) = self.board.place(cell, HUMAN) {
            log::warn!("Ignoring move: {}", err);
            self.rejected += 1;
            return Ok(StepStatus::Continue);
        }

        if winner(&self.board) == Some(HUMAN) {
            self.wins += 1;
            log::debug!("Human wins (streak {})", self.wins);
            self.deal();
            return Ok(StepStatus::Continue);
        }
        if self.board.is_full() {
            self.draws += 1;
            log::debug!("Draw");
            self.deal();
            return Ok(StepStatus::Continue);
        }

        let reply = best_move(&self.board, AI, HUMAN)
            .ok_or_else(|| StepFault::new("opponent found no move on an open board"))?;
        self.board
            .place(reply, AI)
            .map_err(|err| StepFault::new(format!("opponent move rejected: {err}")))?;
        log::trace!("AI plays {}", reply);

        if winner(&self.board) == Some(AI) {
            log::debug!("AI wins, streak ends at {}", self.wins);
            return Ok(StepStatus::Terminated(Outcome::Over));
        }
        if self.board.is_full() {
            self.draws += 1;
            log::debug!("Draw");
            self.deal();
        }
        Ok(StepStatus::Continue)
    }
}

impl Game for TicTacToeGame {
    fn id(&self) -> GameId {
        GameId::TicTacToe
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::OnInput
    }

    fn reset(&mut self, _seed: u64, _now_ms: u64) {
        *self = Self::default();
    }

    fn step(&mut self, frame: &InputFrame, _now_ms: u64) -> Result<StepStatus, StepFault> {
        for &cell in &frame.selections {
            if let StepStatus::Terminated(outcome) = self.play(cell)? {
                return Ok(StepStatus::Terminated(outcome));
            }
        }
        Ok(StepStatus::Continue)
    }

    fn score(&self) -> u64 {
        self.wins
    }
}
