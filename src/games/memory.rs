//! Memory matching game
//!
//! Stepped per input. Cards are dealt face down in a seeded shuffle; pick
//! two to reveal them. A mismatched pair stays visible until the next pick.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::Game;
use crate::error::StepFault;
use crate::settings::MemoryTuning;
use crate::sim::{GameId, InputFrame, LoopMode, Outcome, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Cards with equal `pair` match
    pub pair: u8,
    pub face: CardFace,
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    tuning: MemoryTuning,
    cards: Vec<Card>,
    first: Option<usize>,
    mismatch: Option<(usize, usize)>,
    moves: u64,
    matched: usize,
}

impl MemoryGame {
    pub fn new(tuning: MemoryTuning) -> Self {
        let mut game = Self {
            tuning,
            cards: Vec::new(),
            first: None,
            mismatch: None,
            moves: 0,
            matched: 0,
        };
        game.deal(&mut Pcg32::seed_from_u64(0));
        game
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Completed pair reveals
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched
    }

    pub fn is_solved(&self) -> bool {
        self.matched == self.tuning.pairs
    }

    fn deal(&mut self, rng: &mut Pcg32) {
        let pairs = self.tuning.pairs.min(u8::MAX as usize);
        self.cards = (0..pairs)
            .flat_map(|pair| {
                let card = Card {
                    pair: pair as u8,
                    face: CardFace::Hidden,
                };
                [card, card]
            })
            .collect();
        self.cards.shuffle(rng);
        self.tuning.pairs = pairs;
        self.first = None;
        self.mismatch = None;
        self.moves = 0;
        self.matched = 0;
    }

    fn pick(&mut self, index: usize) {
        if let Some((a, b)) = self.mismatch.take() {
            self.cards[a].face = CardFace::Hidden;
            self.cards[b].face = CardFace::Hidden;
        }

        match self.cards.get(index) {
            Some(card) if card.face == CardFace::Hidden => {}
            _ => {
                log::trace!("Ignoring pick of card {}", index);
                return;
            }
        }
        self.cards[index].face = CardFace::Revealed;

        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return;
        };

        self.moves += 1;
        if self.cards[first].pair == self.cards[index].pair {
            self.cards[first].face = CardFace::Matched;
            self.cards[index].face = CardFace::Matched;
            self.matched += 1;
            log::trace!("Matched pair {}", self.cards[index].pair);
        } else {
            self.mismatch = Some((first, index));
        }
    }
}

impl Game for MemoryGame {
    fn id(&self) -> GameId {
        GameId::Memory
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::OnInput
    }

    fn reset(&mut self, seed: u64, _now_ms: u64) {
        self.deal(&mut Pcg32::seed_from_u64(seed));
    }

    fn step(&mut self, frame: &InputFrame, _now_ms: u64) -> Result<StepStatus, StepFault> {
        for &index in &frame.selections {
            self.pick(index);
            if self.is_solved() {
                log::debug!("Board solved in {} moves", self.moves);
                return Ok(StepStatus::Terminated(Outcome::Won));
            }
        }
        Ok(StepStatus::Continue)
    }

    /// Zero until solved, then the base score minus a penalty per extra move
    fn score(&self) -> u64 {
        if !self.is_solved() || self.cards.is_empty() {
            return 0;
        }
        let extra = self.moves.saturating_sub(self.tuning.pairs as u64);
        self.tuning
            .base_score
            .saturating_sub(extra.saturating_mul(self.tuning.move_penalty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> MemoryGame {
        let mut game = MemoryGame::new(MemoryTuning::default());
        game.reset(11, 0);
        game
    }

    fn select(cells: &[usize]) -> InputFrame {
        InputFrame {
            selections: cells.to_vec(),
            ..Default::default()
        }
    }

    /// Indices of both cards of every pair
    fn pairs(game: &MemoryGame) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in game.cards().iter().enumerate() {
            for (j, b) in game.cards().iter().enumerate().skip(i + 1) {
                if a.pair == b.pair {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_deal_has_every_pair_twice() {
        let game = game();
        assert_eq!(game.cards().len(), 16);
        assert_eq!(pairs(&game).len(), 8);
        assert!(game.cards().iter().all(|c| c.face == CardFace::Hidden));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = game();
        let b = game();
        assert_eq!(a.cards(), b.cards());
    }

    #[test]
    fn test_mismatch_hides_on_next_pick() {
        let mut game = game();
        let pairs = pairs(&game);
        let (a, _) = pairs[0];
        let (b, _) = pairs[1];
        let (c, _) = pairs[2];

        game.step(&select(&[a, b]), 0).unwrap();
        assert_eq!(game.cards()[a].face, CardFace::Revealed);
        assert_eq!(game.cards()[b].face, CardFace::Revealed);
        assert_eq!(game.moves(), 1);

        game.step(&select(&[c]), 0).unwrap();
        assert_eq!(game.cards()[a].face, CardFace::Hidden);
        assert_eq!(game.cards()[b].face, CardFace::Hidden);
        assert_eq!(game.cards()[c].face, CardFace::Revealed);
    }

    #[test]
    fn test_repeat_pick_is_ignored() {
        let mut game = game();
        let (a, b) = pairs(&game)[0];
        game.step(&select(&[a, a, 99]), 0).unwrap();
        assert_eq!(game.moves(), 0);
        game.step(&select(&[b]), 0).unwrap();
        assert_eq!(game.cards()[a].face, CardFace::Matched);
        assert_eq!(game.matched_pairs(), 1);
    }

    #[test]
    fn test_perfect_game_scores_base() {
        let mut game = game();
        let picks: Vec<usize> = pairs(&game).into_iter().flat_map(|(a, b)| [a, b]).collect();
        let status = game.step(&select(&picks), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Won));
        assert_eq!(game.score(), 200);
    }

    #[test]
    fn test_extra_moves_are_penalized() {
        let mut game = game();
        let pairs = pairs(&game);
        // Two wasted moves first
        game.step(&select(&[pairs[0].0, pairs[1].0]), 0).unwrap();
        game.step(&select(&[pairs[2].0, pairs[3].0]), 0).unwrap();
        assert_eq!(game.score(), 0);

        let picks: Vec<usize> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        let status = game.step(&select(&picks), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Won));
        assert_eq!(game.moves(), 10);
        assert_eq!(game.score(), 180);
    }
}
