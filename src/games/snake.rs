//! Grid snake
//!
//! Fixed-interval game. The body is an ordered list of cells with the head
//! last; the loop speeds up as food is eaten.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Game;
use crate::error::StepFault;
use crate::settings::SnakeTuning;
use crate::sim::collision::hits_body;
use crate::sim::{Direction, GameId, GridCell, InputFrame, LoopMode, Outcome, StepStatus};

#[derive(Debug, Clone)]
pub struct SnakeGame {
    tuning: SnakeTuning,
    rng: Pcg32,
    /// Tail first, head last
    body: Vec<GridCell>,
    direction: Direction,
    food: GridCell,
    foods_eaten: u64,
    score: u64,
}

impl SnakeGame {
    pub fn new(tuning: SnakeTuning) -> Self {
        let start = GridCell::new(tuning.grid / 2, tuning.grid / 2);
        Self {
            tuning,
            rng: Pcg32::seed_from_u64(0),
            body: vec![start],
            direction: Direction::Right,
            food: start,
            foods_eaten: 0,
            score: 0,
        }
    }

    pub fn body(&self) -> &[GridCell] {
        &self.body
    }

    pub fn head(&self) -> GridCell {
        self.body.last().copied().unwrap_or(GridCell::new(0, 0))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> GridCell {
        self.food
    }

    /// Side length of the square grid
    pub fn grid(&self) -> i32 {
        self.tuning.grid
    }

    /// Place the snake and food explicitly (scenario setup)
    pub fn arrange(&mut self, body: Vec<GridCell>, direction: Direction, food: GridCell) {
        self.body = body;
        self.direction = direction;
        self.food = food;
    }

    /// Random free cell, or `None` when the snake fills the grid
    fn place_food(&mut self) -> Option<GridCell> {
        let grid = self.tuning.grid;
        let free: Vec<GridCell> = (0..grid)
            .flat_map(|row| (0..grid).map(move |col| GridCell::new(row, col)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.random_range(0..free.len())])
    }
}

impl Game for SnakeGame {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn loop_mode(&self) -> LoopMode {
        LoopMode::FixedInterval {
            interval_ms: self.tuning.base_interval_ms,
        }
    }

    fn reset(&mut self, seed: u64, _now_ms: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.body = vec![GridCell::new(self.tuning.grid / 2, self.tuning.grid / 2)];
        self.direction = Direction::Right;
        self.foods_eaten = 0;
        self.score = 0;
        self.food = self.place_food().unwrap_or(self.head());
    }

    fn step(&mut self, frame: &InputFrame, _now_ms: u64) -> Result<StepStatus, StepFault> {
        if let Some(dir) = frame.direction {
            if self.body.len() == 1 || dir != self.direction.opposite() {
                self.direction = dir;
            }
        }

        let head = self.head().step(self.direction);
        if !head.in_bounds(self.tuning.grid, self.tuning.grid) {
            log::debug!("Snake hit the wall at {:?}", head);
            return Ok(StepStatus::Terminated(Outcome::Over));
        }

        let eating = head == self.food;
        if hits_body(&self.body, head, !eating) {
            log::debug!("Snake bit itself at {:?}", head);
            return Ok(StepStatus::Terminated(Outcome::Over));
        }

        self.body.push(head);
        if !eating {
            self.body.remove(0);
            return Ok(StepStatus::Continue);
        }

        self.foods_eaten += 1;
        self.score += self.tuning.food_points;
        match self.place_food() {
            Some(cell) => {
                self.food = cell;
                Ok(StepStatus::Continue)
            }
            None => Ok(StepStatus::Terminated(Outcome::Won)),
        }
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn tick_interval_ms(&self) -> Option<u64> {
        let speedup = self.foods_eaten.saturating_mul(self.tuning.accel_ms_per_food);
        Some(
            self.tuning
                .base_interval_ms
                .saturating_sub(speedup)
                .max(self.tuning.min_interval_ms),
        )
    }

    fn heading(&self) -> Option<Direction> {
        Some(self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> SnakeGame {
        let mut game = SnakeGame::new(SnakeTuning::default());
        game.reset(42, 0);
        game
    }

    fn frame(direction: Option<Direction>) -> InputFrame {
        InputFrame {
            direction,
            ..Default::default()
        }
    }

    fn cells(list: &[(i32, i32)]) -> Vec<GridCell> {
        list.iter().copied().map(GridCell::from).collect()
    }

    #[test]
    fn test_reset_places_food_off_snake() {
        let game = game();
        assert_eq!(game.body(), &[GridCell::new(10, 10)]);
        assert!(!game.body().contains(&game.food()));
    }

    #[test]
    fn test_eating_food_grows_and_scores() {
        let mut game = game();
        game.arrange(cells(&[(10, 10)]), Direction::Right, GridCell::new(10, 11));

        let status = game.step(&frame(None), 0).unwrap();
        assert_eq!(status, StepStatus::Continue);
        assert_eq!(game.body(), cells(&[(10, 10), (10, 11)]).as_slice());
        assert_eq!(game.score(), SnakeTuning::default().food_points);
        assert!(!game.body().contains(&game.food()));
    }

    #[test]
    fn test_moving_keeps_length() {
        let mut game = game();
        game.arrange(cells(&[(5, 5), (5, 6)]), Direction::Right, GridCell::new(0, 0));
        game.step(&frame(Some(Direction::Down)), 0).unwrap();
        assert_eq!(game.body(), cells(&[(5, 6), (6, 6)]).as_slice());
    }

    #[test]
    fn test_wall_ends_game() {
        let mut game = game();
        game.arrange(cells(&[(0, 19)]), Direction::Right, GridCell::new(5, 5));
        let status = game.step(&frame(None), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Over));
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut game = game();
        // Head at (5,5) turning down into the second body cell
        game.arrange(
            cells(&[(7, 5), (6, 5), (6, 6), (5, 6), (5, 5)]),
            Direction::Left,
            GridCell::new(0, 0),
        );
        let status = game.step(&frame(Some(Direction::Down)), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Over));
    }

    #[test]
    fn test_chasing_the_tail_is_allowed() {
        let mut game = game();
        // The tail at (6,5) vacates this step, so the head may take it
        game.arrange(
            cells(&[(6, 5), (6, 6), (5, 6), (5, 5)]),
            Direction::Left,
            GridCell::new(0, 0),
        );
        let status = game.step(&frame(Some(Direction::Down)), 0).unwrap();
        assert_eq!(status, StepStatus::Continue);
        assert_eq!(game.head(), GridCell::new(6, 5));
        assert_eq!(game.body().len(), 4);
    }

    #[test]
    fn test_reverse_is_ignored_when_longer_than_one() {
        let mut game = game();
        game.arrange(cells(&[(5, 5), (5, 6)]), Direction::Right, GridCell::new(0, 0));
        let status = game.step(&frame(Some(Direction::Left)), 0).unwrap();
        assert_eq!(status, StepStatus::Continue);
        assert_eq!(game.head(), GridCell::new(5, 7));
    }

    #[test]
    fn test_interval_speeds_up_with_food_and_is_bounded() {
        let tuning = SnakeTuning::default();
        let mut game = game();
        assert_eq!(game.tick_interval_ms(), Some(tuning.base_interval_ms));
        for i in 0..3 {
            let head = game.head();
            game.arrange(game.body().to_vec(), Direction::Right, head.step(Direction::Right));
            game.step(&frame(None), 0).unwrap();
            assert_eq!(game.score(), (i + 1) * tuning.food_points);
        }
        assert_eq!(
            game.tick_interval_ms(),
            Some(tuning.base_interval_ms - 3 * tuning.accel_ms_per_food)
        );

        game.foods_eaten = 1_000;
        assert_eq!(game.tick_interval_ms(), Some(tuning.min_interval_ms));
    }

    #[test]
    fn test_filling_the_grid_wins() {
        let mut game = SnakeGame::new(SnakeTuning {
            grid: 2,
            ..SnakeTuning::default()
        });
        game.reset(1, 0);
        game.arrange(cells(&[(0, 0), (0, 1), (1, 1)]), Direction::Down, GridCell::new(1, 0));
        let status = game.step(&frame(Some(Direction::Left)), 0).unwrap();
        assert_eq!(status, StepStatus::Terminated(Outcome::Won));
    }

    #[test]
    fn test_same_seed_same_food() {
        let a = game();
        let b = game();
        assert_eq!(a.food(), b.food());
    }
}
