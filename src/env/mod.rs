//! The capability surface the engine uses to reach the outside world.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    None,
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// MOVE's numbering: 0=none, 1=up, 2=right, 3=down, 4=left.
    pub fn from_code(code: i64) -> Option<Direction> {
        match code {
            0 => Some(Direction::None),
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            3 => Some(Direction::Down),
            4 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Grid offset, y grows downwards.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// The cell one step away from `from`, if it is representable at all.
    pub fn step_from(self, (x, y): (i64, i64)) -> Option<(i64, i64)> {
        let (dx, dy) = self.delta();
        Some((x.checked_add(dx)?, y.checked_add(dy)?))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What occupies a cell, as far as LOOK is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    Outside,
    Block,
    Exit,
    Spike,
    Pickup(i64),
    Other(String),
}

impl CellKind {
    /// Numeric class pushed by LOOK.
    pub fn code(&self) -> i64 {
        match self {
            CellKind::Outside => -1,
            CellKind::Empty | CellKind::Pickup(_) | CellKind::Other(_) => 0,
            CellKind::Block => 1,
            CellKind::Exit => 2,
            CellKind::Spike => 3,
        }
    }
}

/// Host side of the interpreter. Movement legality, collisions and level
/// completion are entirely the host's business.
pub trait Environment {
    /// Request a move. Returns the value of a pickup collected on the way,
    /// which the engine pushes onto the stack.
    fn move_player(&mut self, direction: Direction) -> Option<i64>;

    fn look_at(&self, x: i64, y: i64) -> CellKind;

    fn current_position(&self) -> (i64, i64);

    fn stack_changed(&mut self, _stack: &[i64]) {}

    fn step_counted(&mut self, _steps: u64) {}
}

/// An open plane with a few marked cells. Blocks stop movement, pickups are
/// collected once. Records every requested move; used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    position: (i64, i64),
    cells: HashMap<(i64, i64), CellKind>,
    bounds: Option<(i64, i64)>,
    pub moves: Vec<Direction>,
    pub stack_updates: usize,
    pub steps: u64,
}

impl Recorder {
    pub fn new(start: (i64, i64)) -> Self {
        Recorder { position: start, ..Recorder::default() }
    }

    /// Cells at or beyond `(width, height)` (or negative) read as outside
    /// and cannot be entered.
    pub fn with_bounds(mut self, width: i64, height: i64) -> Self {
        self.bounds = Some((width, height));
        self
    }

    pub fn with_cell(mut self, x: i64, y: i64, kind: CellKind) -> Self {
        self.cells.insert((x, y), kind);
        self
    }

    fn inside(&self, x: i64, y: i64) -> bool {
        match self.bounds {
            Some((w, h)) => x >= 0 && y >= 0 && x < w && y < h,
            None => true,
        }
    }
}

impl Environment for Recorder {
    fn move_player(&mut self, direction: Direction) -> Option<i64> {
        self.moves.push(direction);
        let (x, y) = direction.step_from(self.position)?;
        match self.look_at(x, y) {
            CellKind::Block | CellKind::Outside => None,
            CellKind::Pickup(value) => {
                self.position = (x, y);
                self.cells.remove(&(x, y));
                Some(value)
            }
            _ => {
                self.position = (x, y);
                None
            }
        }
    }

    fn look_at(&self, x: i64, y: i64) -> CellKind {
        if !self.inside(x, y) {
            return CellKind::Outside;
        }
        self.cells.get(&(x, y)).cloned().unwrap_or(CellKind::Empty)
    }

    fn current_position(&self) -> (i64, i64) {
        self.position
    }

    fn stack_changed(&mut self, _stack: &[i64]) {
        self.stack_updates += 1;
    }

    fn step_counted(&mut self, steps: u64) {
        self.steps = steps;
    }
}
