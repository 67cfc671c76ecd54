//! Tic-tac-toe board and minimax opponent
//!
//! The board has nine cells, so a full-depth search is cheap (at most 9!
//! leaves) and needs no pruning. Trial moves are made on a scratch copy and
//! undone before returning, so the caller's board is never touched.

use serde::{Deserialize, Serialize};

use crate::consts::BOARD_CELLS;
use crate::error::ArcadeError;

/// Score magnitude of a decided game; depth is subtracted so that quicker
/// wins and slower losses are preferred
const WIN_SCORE: i32 = 10;

/// Center cell, taken directly on an empty board
pub const CENTER: usize = 4;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Player mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// 3x3 board, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Option<Mark>; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Mark>; BOARD_CELLS] {
        &self.cells
    }

    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.cells.get(cell).copied().flatten()
    }

    /// Place `mark` on an empty, in-range cell
    pub fn place(&mut self, cell: usize, mark: Mark) -> Result<(), ArcadeError> {
        match self.cells.get_mut(cell) {
            Some(slot) if slot.is_none() => {
                *slot = Some(mark);
                Ok(())
            }
            _ => Err(ArcadeError::InvalidMove { cell }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
    }

    pub fn marks_played(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// The mark owning a complete line, if any
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| {
        let mark = board.cells[a]?;
        (board.cells[b] == Some(mark) && board.cells[c] == Some(mark)).then_some(mark)
    })
}

/// Best cell for `ai` to play, or `None` if the game is already decided or
/// the board is full. Ties go to the lowest cell index.
pub fn best_move(board: &Board, ai: Mark, human: Mark) -> Option<usize> {
    if winner(board).is_some() || board.is_full() {
        return None;
    }
    if board.is_empty() {
        return Some(CENTER);
    }

    let mut scratch = *board;
    let mut best: Option<(usize, i32)> = None;
    let candidates: Vec<usize> = board.empty_cells().collect();
    for cell in candidates {
        scratch.cells[cell] = Some(ai);
        let score = minimax(&mut scratch, 0, false, ai, human);
        scratch.cells[cell] = None;

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((cell, score));
        }
    }
    debug_assert_eq!(&scratch, board);
    best.map(|(cell, _)| cell)
}

fn minimax(board: &mut Board, depth: i32, maximizing: bool, ai: Mark, human: Mark) -> i32 {
    match winner(board) {
        Some(mark) if mark == ai => return WIN_SCORE - depth,
        Some(_) => return depth - WIN_SCORE,
        None if board.is_full() => return 0,
        None => {}
    }

    let mark = if maximizing { ai } else { human };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for cell in 0..BOARD_CELLS {
        if board.cells[cell].is_some() {
            continue;
        }
        board.cells[cell] = Some(mark);
        let score = minimax(board, depth + 1, !maximizing, ai, human);
        board.cells[cell] = None;

        best = if maximizing { best.max(score) } else { best.min(score) };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board(layout: &str) -> Board {
        let mut cells = [None; BOARD_CELLS];
        for (i, ch) in layout.chars().enumerate() {
            cells[i] = match ch {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        Board::from_cells(cells)
    }

    #[test]
    fn test_empty_board_takes_center() {
        assert_eq!(best_move(&Board::new(), Mark::O, Mark::X), Some(CENTER));
    }

    #[test]
    fn test_takes_immediate_win() {
        let b = board("OO.XX....");
        assert_eq!(best_move(&b, Mark::O, Mark::X), Some(2));
    }

    #[test]
    fn test_blocks_two_in_a_row() {
        let b = board("XX..O....");
        assert_eq!(best_move(&b, Mark::O, Mark::X), Some(2));
    }

    #[test]
    fn test_prefers_win_over_block() {
        // X threatens 1, but O can win at 5 right away
        let b = board("X.XOO.X..");
        assert_eq!(best_move(&b, Mark::O, Mark::X), Some(5));
    }

    #[test]
    fn test_decided_or_full_board_has_no_move() {
        assert_eq!(best_move(&board("XXXOO...."), Mark::O, Mark::X), None);
        assert_eq!(best_move(&board("XOXXOOOXX"), Mark::O, Mark::X), None);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let b = board("X...O..X.");
        let before = b;
        let _ = best_move(&b, Mark::O, Mark::X);
        assert_eq!(b, before);
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut b = board("X........");
        assert!(matches!(b.place(0, Mark::O), Err(ArcadeError::InvalidMove { cell: 0 })));
        assert!(matches!(b.place(9, Mark::O), Err(ArcadeError::InvalidMove { cell: 9 })));
        assert!(b.place(1, Mark::O).is_ok());
        assert_eq!(b.get(1), Some(Mark::O));
    }

    #[test]
    fn test_perfect_play_draws() {
        let mut b = Board::new();
        let mut turn = Mark::X;
        while let Some(cell) = best_move(&b, turn, turn.opponent()) {
            b.place(cell, turn).unwrap();
            turn = turn.opponent();
        }
        assert_eq!(winner(&b), None);
        assert!(b.is_full());
    }

    proptest! {
        #[test]
        fn prop_best_move_is_an_empty_cell(seed in proptest::collection::vec(0usize..9, 0..6)) {
            let mut b = Board::new();
            let mut turn = Mark::X;
            for cell in seed {
                if winner(&b).is_some() {
                    break;
                }
                if b.place(cell, turn).is_ok() {
                    turn = turn.opponent();
                }
            }
            if let Some(cell) = best_move(&b, turn, turn.opponent()) {
                prop_assert!(cell < BOARD_CELLS);
                prop_assert_eq!(b.get(cell), None);
            }
        }
    }
}
