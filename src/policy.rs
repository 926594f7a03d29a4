use std::io;

use ndarray::{s, Array3, Array4, ArrayView1};
use serde::Serialize;

use crate::env::Environment;
use crate::state::{Action, State, StateIterator};

/// Action-value estimates for every (x, y, phase, action).
///
/// Indexes to `action_value` are [x, y, phase, action index].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    pub width: usize,
    pub height: usize,
    pub period: usize,
    pub action_value: Array4<f64>,
}

/// One exported table entry.
#[derive(Debug, Serialize)]
struct ValueRecord {
    x: usize,
    y: usize,
    phase: usize,
    action: String,
    value: f64,
}

impl ValueTable {
    pub fn new(width: usize, height: usize, period: usize) -> ValueTable {
        let dimensions = (width, height, period, Action::COUNT);
        ValueTable {
            width, height, period,
            action_value: Array4::<f64>::zeros(dimensions),
        }
    }

    /// Zeroed table sized for `env`.
    pub fn for_env(env: &Environment) -> ValueTable {
        ValueTable::new(env.width(), env.height(), env.period())
    }

    /// Table dimensions as (width, height, period).
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.period)
    }

    pub fn get(&self, s: State, a: Action) -> f64 {
        self.action_value[[s.x, s.y, s.phase, a.index()]]
    }

    pub fn set(&mut self, s: State, a: Action, value: f64) {
        self.action_value[[s.x, s.y, s.phase, a.index()]] = value;
    }

    /// Estimates for every action at `s`, in `Action::ALL` order.
    pub fn row(&self, s: State) -> ArrayView1<'_, f64> {
        self.action_value.slice(s![s.x, s.y, s.phase, ..])
    }

    pub fn max_value(&self, s: State) -> f64 {
        self.row(s).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action at `s`. Ties go to the lowest action index.
    pub fn best_action(&self, s: State) -> Action {
        let mut best = 0;
        let row = self.row(s);
        for (i, v) in row.iter().enumerate() {
            if *v > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Greedy action for every state, indexed [x, y, phase].
    pub fn greedy_policy(&self) -> Array3<Action> {
        Array3::from_shape_fn((self.width, self.height, self.period), |(x, y, phase)| {
            self.best_action(State::new(x, y, phase))
        })
    }

    /// Print the greedy policy as arrows, one grid per phase.
    /// Walls are drawn as `#`.
    pub fn show_policy(&self, env: &Environment) -> String {
        let policy = self.greedy_policy();
        let mut out = String::new();
        for phase in 0..self.period {
            out.push_str(&format!("phase {phase}:\n"));
            for y in 0..self.height {
                for x in 0..self.width {
                    if env.grid().is_wall(x, y) {
                        out.push('#');
                    } else if (x, y) == env.goal() {
                        out.push('G');
                    } else {
                        out.push(policy[[x, y, phase]].arrow());
                    }
                }
                out.push('\n');
            }
        }
        out
    }

    /// Write every entry as a `x,y,phase,action,value` CSV row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for s in StateIterator::new(self.width, self.height, self.period) {
            for a in Action::ALL {
                wtr.serialize(ValueRecord {
                    x: s.x,
                    y: s.y,
                    phase: s.phase,
                    action: a.to_string(),
                    value: self.get(s, a),
                })?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Greedy action for `state` under a trained table.
pub fn best_action(table: &ValueTable, state: State) -> Action {
    table.best_action(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_zeroed_table() {
        // Act
        let table = ValueTable::new(4, 3, 6);
        // Assert
        let dims = table.action_value.dim();
        assert_eq!(table.action_value.ndim(), 4);
        assert_eq!(dims, (4, 3, 6, 5));
        assert_eq!(table.action_value[[0, 0, 0, 0]], 0.0);
        assert_eq!(table.shape(), (4, 3, 6));
    }

    #[test]
    fn best_action_picks_maximum() {
        // Arrange
        let mut table = ValueTable::new(2, 2, 2);
        let s = State::new(1, 0, 1);
        table.set(s, Action::Left, 0.5);
        table.set(s, Action::Down, 2.0);
        // Act / Assert
        assert_eq!(best_action(&table, s), Action::Down);
        assert_eq!(table.max_value(s), 2.0);
    }

    #[test]
    fn ties_go_to_first_action() {
        // Arrange
        let mut table = ValueTable::new(1, 1, 1);
        let s = State::new(0, 0, 0);
        // Act / Assert
        assert_eq!(table.best_action(s), Action::Up);
        table.set(s, Action::Right, 1.0);
        table.set(s, Action::Wait, 1.0);
        assert_eq!(table.best_action(s), Action::Right);
    }

    #[test]
    fn max_value_handles_all_negative_rows() {
        let mut table = ValueTable::new(1, 1, 1);
        let s = State::new(0, 0, 0);
        for (i, a) in Action::ALL.iter().enumerate() {
            table.set(s, *a, -10.0 + i as f64);
        }
        assert_eq!(table.max_value(s), -6.0);
        assert_eq!(table.best_action(s), Action::Wait);
    }

    #[test]
    fn greedy_policy_matches_best_action() {
        let mut table = ValueTable::new(2, 1, 2);
        table.set(State::new(0, 0, 1), Action::Right, 3.0);
        let policy = table.greedy_policy();
        assert_eq!(policy.dim(), (2, 1, 2));
        assert_eq!(policy[[0, 0, 1]], Action::Right);
        assert_eq!(policy[[0, 0, 0]], Action::Up);
    }

    #[test]
    fn show_policy_arrows() {
        // Arrange
        let grid = crate::grid::Grid::from_rows(&[vec![0, 0, 1]]).unwrap();
        let env = Environment::new(
            grid, vec![], (0, 0), (1, 0), None, crate::env::RewardScheme::default()).unwrap();
        let mut table = ValueTable::for_env(&env);
        table.set(State::new(0, 0, 0), Action::Right, 1.0);
        // Act
        let text = table.show_policy(&env);
        // Assert
        assert_eq!(text, "phase 0:\n>G#\n");
    }

    #[test]
    fn write_csv_rows() {
        // Arrange
        let mut table = ValueTable::new(1, 1, 2);
        table.set(State::new(0, 0, 1), Action::Wait, 1.5);
        let mut buf: Vec<u8> = Vec::new();
        // Act
        table.write_csv(&mut buf).unwrap();
        // Assert
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * Action::COUNT);
        assert_eq!(lines[0], "x,y,phase,action,value");
        assert_eq!(lines[1], "0,0,0,Up,0.0");
        assert_eq!(lines[10], "0,0,1,Wait,1.5");
    }
}
