use std::fmt;
use std::iter::Iterator;
use std::str::FromStr;

use crate::error::{Error, Result};

/// What the learner observes after every reset or step.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct State {
    pub x: usize,
    pub y: usize,
    pub phase: usize,  // clock mod global period
}

impl State {
    pub fn new(x: usize, y: usize, phase: usize) -> State {
        State { x, y, phase }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {}, phase: {})", self.x, self.y, self.phase)
    }
}

/// Visits every (x, y, phase) combination of a `width` x `height` grid,
/// phase varying fastest.
pub struct StateIterator {
    x: usize,
    y: usize,
    phase: usize,
    width: usize,
    height: usize,
    period: usize,
}

impl StateIterator {
    pub fn new(width: usize, height: usize, period: usize) -> StateIterator {
        StateIterator { x: 0, y: 0, phase: 0, width, height, period }
    }
}

impl Iterator for StateIterator {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.width || self.height == 0 || self.period == 0 {
            return None;
        }
        let state = State::new(self.x, self.y, self.phase);
        self.phase += 1;
        if self.phase == self.period {
            self.phase = 0;
            self.y += 1;
            if self.y == self.height {
                self.y = 0;
                self.x += 1;
            }
        }
        Some(state)
    }
}

/// The five moves available to the agent.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Wait,
}

impl Action {
    pub const COUNT: usize = 5;

    /// All actions in table index order.
    pub const ALL: [Action; Action::COUNT] =
        [Action::Up, Action::Down, Action::Left, Action::Right, Action::Wait];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset `(dx, dy)`. Rows grow downward, so `Up` is `dy = -1`.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Wait => (0, 0),
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Action::Up => '^',
            Action::Down => 'v',
            Action::Left => '<',
            Action::Right => '>',
            Action::Wait => 'o',
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Action> {
        Action::ALL.get(index).copied().ok_or(Error::InvalidAction(index))
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Action> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Action::Up),
            "down" | "d" => Ok(Action::Down),
            "left" | "l" => Ok(Action::Left),
            "right" | "r" => Ok(Action::Right),
            "wait" | "w" => Ok(Action::Wait),
            _ => Err(Error::UnknownActionName(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::Up => "Up",
            Action::Down => "Down",
            Action::Left => "Left",
            Action::Right => "Right",
            Action::Wait => "Wait",
        };
        f.pad(name)
    }
}
