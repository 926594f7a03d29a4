use serde::Deserialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::hazard::{self, Laser};
use crate::state::{Action, State};

/// How the hazard penalty is applied when several lasers hit on one step.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyStacking {
    /// One penalty per step, however many lasers hit.
    #[default]
    Once,
    /// One penalty per colliding laser.
    PerHazard,
}

/// Reward constants for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardScheme {
    pub step_cost: f64,
    pub hazard_penalty: f64,
    pub goal_bonus: f64,
    pub stacking: PenaltyStacking,
}

impl Default for RewardScheme {
    fn default() -> Self {
        RewardScheme {
            step_cost: -1.0,
            hazard_penalty: -10.0,
            goal_bonus: 20.0,
            stacking: PenaltyStacking::Once,
        }
    }
}

impl RewardScheme {
    /// Total reward for a step that hit `hazards_hit` lasers.
    pub fn reward(&self, hazards_hit: usize, reached_goal: bool) -> f64 {
        let mut r = self.step_cost;
        if hazards_hit > 0 {
            let hits = match self.stacking {
                PenaltyStacking::Once => 1,
                PenaltyStacking::PerHazard => hazards_hit,
            };
            r += self.hazard_penalty * hits as f64;
        }
        if reached_goal {
            r += self.goal_bonus;
        }
        r
    }
}

/// Everything observed after a single `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub state: State,
    pub reward: f64,
    pub terminal: bool,
    pub hazards_hit: usize,
    pub reached_goal: bool,
}

/// Grid world with walls and sweeping lasers.
///
/// Grid, lasers, start, goal and period are fixed at construction. Only the
/// agent position and clock change, through `reset` and `step`.
#[derive(Debug, Clone)]
pub struct Environment {
    grid: Grid,
    lasers: Vec<Laser>,
    start: (usize, usize),
    goal: (usize, usize),
    period: usize,
    rewards: RewardScheme,
    pos: (usize, usize),
    t: usize,
}

impl Environment {
    /// Build an environment, validating every piece of configuration.
    ///
    /// `period` is the global phase period of the observed state. Every laser
    /// period must divide it so the phase determines each beam. Pass `None`
    /// to use the least common multiple of the laser periods.
    pub fn new(
        grid: Grid,
        lasers: Vec<Laser>,
        start: (usize, usize),
        goal: (usize, usize),
        period: Option<usize>,
        rewards: RewardScheme,
    ) -> Result<Environment> {
        grid.check_open("start", start.0, start.1)?;
        grid.check_open("goal", goal.0, goal.1)?;
        if let Some(index) = lasers.iter().position(|l| l.period == 0) {
            return Err(Error::ZeroHazardPeriod { index });
        }
        let period = period.unwrap_or_else(|| hazard::lcm_period(&lasers));
        if period == 0 {
            return Err(Error::ZeroGlobalPeriod);
        }
        for (index, laser) in lasers.iter().enumerate() {
            if period % laser.period != 0 {
                return Err(Error::PhaseAliasing { index, period: laser.period, global: period });
            }
        }
        Ok(Environment { grid, lasers, start, goal, period, rewards, pos: start, t: 0 })
    }

    /// Return the agent to the start cell and zero the clock.
    pub fn reset(&mut self) -> State {
        self.pos = self.start;
        self.t = 0;
        self.state()
    }

    /// Apply one action and advance the clock.
    ///
    /// Moves into walls or off the grid leave the agent in place and still
    /// cost a step. Lasers are checked against the agent's cell at the new
    /// clock value.
    pub fn step(&mut self, action: Action) -> StepResult {
        let (dx, dy) = action.offset();
        if let Some(next) = self.grid.offset(self.pos.0, self.pos.1, dx, dy) {
            self.pos = next;
        }
        self.t += 1;

        let (x, y) = self.pos;
        let hazards_hit = self.lasers.iter()
            .filter(|l| l.hits(self.t, x, y))
            .count();
        let reached_goal = self.pos == self.goal;
        let reward = self.rewards.reward(hazards_hit, reached_goal);
        let terminal = hazards_hit > 0 || reached_goal;
        trace!(t = self.t, x, y, %action, reward, terminal, "step");

        StepResult { state: self.state(), reward, terminal, hazards_hit, reached_goal }
    }

    /// Same as `step`, taking a raw action index.
    pub fn step_index(&mut self, action: usize) -> Result<StepResult> {
        Ok(self.step(Action::try_from(action)?))
    }

    pub fn state(&self) -> State {
        State::new(self.pos.0, self.pos.1, self.t % self.period)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn rewards(&self) -> &RewardScheme {
        &self.rewards
    }

    pub fn clock(&self) -> usize {
        self.t
    }

    pub fn position(&self) -> (usize, usize) {
        self.pos
    }

    /// Text snapshot at the current clock.
    pub fn render(&self) -> String {
        self.render_at(self.t)
    }

    /// Text snapshot with beams drawn as they are at clock `t`.
    ///
    /// `#` wall, `.` open, `*` beam, `S` start, `G` goal, `A` agent.
    pub fn render_at(&self, t: usize) -> String {
        let (w, h) = (self.width(), self.height());
        let mut rows: Vec<Vec<char>> = (0..h)
            .map(|y| (0..w).map(|x| if self.grid.is_wall(x, y) { '#' } else { '.' }).collect())
            .collect();
        for laser in &self.lasers {
            for (x, y) in laser.beam_cells(t, w, h) {
                rows[y][x] = '*';
            }
        }
        rows[self.start.1][self.start.0] = 'S';
        rows[self.goal.1][self.goal.0] = 'G';
        rows[self.pos.1][self.pos.0] = 'A';

        let mut out = String::new();
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
