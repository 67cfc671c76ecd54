//! Input routing
//!
//! Raw pointer/key events become intents that the next simulation step
//! consumes. Directional intents are buffered in a small bounded queue so
//! fast key presses between two snake steps are not lost.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ArcadeError;

/// Grid direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// (row, col) delta
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// External input event, transport-agnostic
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Direction(Direction),
    PointerMove(Vec2),
    PointerDown,
    PointerUp,
    /// Pick a cell, card, target or menu entry by index
    Select(usize),
    /// Fire / click
    Action,
}

/// Bounded FIFO of directional intents
#[derive(Debug, Clone)]
pub struct IntentQueue {
    capacity: usize,
    queue: VecDeque<Direction>,
}

impl IntentQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Queue `dir` relative to the current `heading`.
    ///
    /// A direction equal or opposite to the last queued one (or to `heading`
    /// when nothing is queued) is discarded. When the buffer is full the new
    /// intent is dropped and the queued ones are kept.
    pub fn push(&mut self, dir: Direction, heading: Direction) -> Result<bool, ArcadeError> {
        let reference = self.queue.back().copied().unwrap_or(heading);
        if dir == reference || dir == reference.opposite() {
            return Ok(false);
        }
        if self.queue.len() >= self.capacity {
            return Err(ArcadeError::InputOverflow {
                capacity: self.capacity,
            });
        }
        self.queue.push_back(dir);
        Ok(true)
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Everything one step gets to see of the player's input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// At most one directional intent per step
    pub direction: Option<Direction>,
    /// Last known pointer position (arena coordinates)
    pub pointer: Option<Vec2>,
    pub pointer_down: bool,
    /// Index picks since the previous step, oldest first
    pub selections: Vec<usize>,
    /// Fire/click presses since the previous step
    pub actions: u32,
}

/// Cap on index picks buffered between two steps
const MAX_PENDING_SELECTIONS: usize = 16;

/// Maps input events to per-step frames
#[derive(Debug, Clone)]
pub struct InputRouter {
    intents: IntentQueue,
    heading: Direction,
    pointer: Option<Vec2>,
    pointer_down: bool,
    selections: Vec<usize>,
    actions: u32,
}

impl InputRouter {
    pub fn new(intent_capacity: usize) -> Self {
        Self {
            intents: IntentQueue::new(intent_capacity),
            heading: Direction::Right,
            pointer: None,
            pointer_down: false,
            selections: Vec::new(),
            actions: 0,
        }
    }

    /// Direction the controlled body currently travels in
    pub fn set_heading(&mut self, heading: Direction) {
        self.heading = heading;
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }

    /// Whether a selection or action is waiting for the next step
    pub fn has_discrete_input(&self) -> bool {
        !self.selections.is_empty() || self.actions > 0
    }

    pub fn push(&mut self, event: InputEvent) -> Result<(), ArcadeError> {
        match event {
            InputEvent::Direction(dir) => {
                if !self.intents.push(dir, self.heading)? {
                    log::trace!("Discarded intent {:?} (heading {:?})", dir, self.heading);
                }
            }
            InputEvent::PointerMove(pos) => self.pointer = Some(pos),
            InputEvent::PointerDown => self.pointer_down = true,
            InputEvent::PointerUp => self.pointer_down = false,
            InputEvent::Select(index) => {
                if self.selections.len() < MAX_PENDING_SELECTIONS {
                    self.selections.push(index);
                } else {
                    log::trace!("Dropped selection {} (buffer full)", index);
                }
            }
            InputEvent::Action => self.actions = self.actions.saturating_add(1),
        }
        Ok(())
    }

    /// Build the frame for the next step, consuming one directional intent
    /// and all discrete events
    pub fn next_frame(&mut self) -> InputFrame {
        let direction = self.intents.pop();
        if let Some(dir) = direction {
            self.heading = dir;
        }
        InputFrame {
            direction,
            pointer: self.pointer,
            pointer_down: self.pointer_down,
            selections: std::mem::take(&mut self.selections),
            actions: std::mem::take(&mut self.actions),
        }
    }

    /// Forget everything (session start/retry)
    pub fn clear(&mut self) {
        self.intents.clear();
        self.pointer = None;
        self.pointer_down = false;
        self.selections.clear();
        self.actions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_and_duplicate_intents_are_discarded() {
        let mut queue = IntentQueue::new(3);
        assert!(!queue.push(Direction::Left, Direction::Right).unwrap());
        assert!(!queue.push(Direction::Right, Direction::Right).unwrap());
        assert!(queue.push(Direction::Up, Direction::Right).unwrap());
        // Opposite of the last queued intent, not of the heading
        assert!(!queue.push(Direction::Down, Direction::Right).unwrap());
        assert!(queue.push(Direction::Left, Direction::Right).unwrap());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_overflow_keeps_oldest_intents() {
        let mut queue = IntentQueue::new(2);
        queue.push(Direction::Up, Direction::Right).unwrap();
        queue.push(Direction::Left, Direction::Right).unwrap();
        let err = queue.push(Direction::Down, Direction::Right).unwrap_err();
        assert!(matches!(err, ArcadeError::InputOverflow { capacity: 2 }));
        assert_eq!(queue.pop(), Some(Direction::Up));
        assert_eq!(queue.pop(), Some(Direction::Left));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_router_consumes_one_direction_per_frame() {
        let mut router = InputRouter::new(3);
        router.push(InputEvent::Direction(Direction::Up)).unwrap();
        router.push(InputEvent::Direction(Direction::Left)).unwrap();
        router.push(InputEvent::Select(4)).unwrap();
        router.push(InputEvent::Action).unwrap();
        router.push(InputEvent::Action).unwrap();
        router.push(InputEvent::PointerMove(Vec2::new(10.0, 20.0))).unwrap();

        let frame = router.next_frame();
        assert_eq!(frame.direction, Some(Direction::Up));
        assert_eq!(frame.selections, vec![4]);
        assert_eq!(frame.actions, 2);
        assert_eq!(router.heading(), Direction::Up);

        let frame = router.next_frame();
        assert_eq!(frame.direction, Some(Direction::Left));
        assert!(frame.selections.is_empty());
        assert_eq!(frame.actions, 0);
        // Pointer position persists between frames
        assert_eq!(frame.pointer, Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut router = InputRouter::new(3);
        router.push(InputEvent::Direction(Direction::Up)).unwrap();
        router.push(InputEvent::PointerDown).unwrap();
        router.push(InputEvent::Select(1)).unwrap();
        router.clear();
        assert_eq!(router.next_frame(), InputFrame::default());
    }
}
