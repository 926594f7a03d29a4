use rand::Rng;
use serde::Deserialize;
use statrs::statistics::Statistics;
use tracing::{debug, info};

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::policy::ValueTable;
use crate::state::{Action, State};

/// Hyperparameters for epsilon-greedy Q-learning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Learning rate alpha, in (0, 1]
    pub alpha: f64,
    /// Discount factor gamma, in [0, 1]
    pub gamma: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Multiplicative exploration decay applied after each episode
    pub epsilon_decay: f64,
    /// Exploration floor
    pub epsilon_min: f64,
    /// Episodes are truncated after this many steps
    pub max_steps_per_episode: usize,
    /// Log a progress line every this many episodes. 0 disables it.
    pub log_every: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig {
            episodes: 5000,
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.05,
            max_steps_per_episode: 1000,
            log_every: 500,
        }
    }
}

impl LearnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::ZeroEpisodes);
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidLearningRate(self.alpha));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidDiscount(self.gamma));
        }
        for (name, value) in [("epsilon", self.epsilon), ("epsilon_min", self.epsilon_min)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidExploration { name, value });
            }
        }
        if self.epsilon_min > self.epsilon {
            return Err(Error::ExplorationFloorAboveStart {
                min: self.epsilon_min, initial: self.epsilon,
            });
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::InvalidDecay(self.epsilon_decay));
        }
        if self.max_steps_per_episode == 0 {
            return Err(Error::ZeroStepCap);
        }
        Ok(())
    }
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    Goal,
    Hazard,
    /// Hit the step cap without a terminal event.
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub total_reward: f64,
    pub steps: usize,
    pub outcome: Outcome,
    pub epsilon: f64,  // exploration rate used during the episode
}

/// Per-episode results of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeStats>,
}

impl TrainingReport {
    /// Mean and standard deviation of returns over the last `window` episodes.
    pub fn recent_returns(&self, window: usize) -> (f64, f64) {
        let start = self.episodes.len().saturating_sub(window);
        let returns: Vec<f64> = self.episodes[start..].iter().map(|e| e.total_reward).collect();
        let mean = returns.iter().mean();
        let std_dev = returns.iter().std_dev();
        (mean, std_dev)
    }

    /// Fraction of the last `window` episodes that reached the goal.
    pub fn success_rate(&self, window: usize) -> f64 {
        let start = self.episodes.len().saturating_sub(window);
        let recent = &self.episodes[start..];
        if recent.is_empty() {
            return 0.0;
        }
        let goals = recent.iter().filter(|e| e.outcome == Outcome::Goal).count();
        goals as f64 / recent.len() as f64
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.episodes.iter().filter(|e| e.outcome == outcome).count()
    }
}

/// Epsilon-greedy Q-learner owning its value table.
#[derive(Debug, Clone)]
pub struct Learner {
    config: LearnerConfig,
    table: ValueTable,
    epsilon: f64,
}

impl Learner {
    /// Validate `config` and allocate a zeroed table sized for `env`.
    pub fn new(config: LearnerConfig, env: &Environment) -> Result<Learner> {
        config.validate()?;
        let epsilon = config.epsilon;
        Ok(Learner { config, table: ValueTable::for_env(env), epsilon })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn into_table(self) -> ValueTable {
        self.table
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// With probability epsilon a uniformly random action, else greedy.
    pub fn choose_action<R: Rng>(&self, s: State, rng: &mut R) -> Action {
        if rng.gen::<f64>() < self.epsilon {
            Action::ALL[rng.gen_range(0..Action::COUNT)]
        } else {
            self.table.best_action(s)
        }
    }

    /// One temporal-difference update. Terminal transitions do not bootstrap.
    pub fn update(&mut self, s: State, a: Action, reward: f64, next: State, terminal: bool) {
        let future = if terminal { 0.0 } else { self.table.max_value(next) };
        let old = self.table.get(s, a);
        let target = reward + self.config.gamma * future;
        self.table.set(s, a, old + self.config.alpha * (target - old));
    }

    /// Run a single episode, updating the table as it goes.
    pub fn run_episode<R: Rng>(&mut self, env: &mut Environment, rng: &mut R) -> EpisodeStats {
        let mut s = env.reset();
        let mut total_reward = 0.0;
        let mut outcome = Outcome::Truncated;
        let mut steps = 0;
        while steps < self.config.max_steps_per_episode {
            let a = self.choose_action(s, rng);
            let result = env.step(a);
            self.update(s, a, result.reward, result.state, result.terminal);
            total_reward += result.reward;
            steps += 1;
            s = result.state;
            if result.terminal {
                outcome = if result.reached_goal { Outcome::Goal } else { Outcome::Hazard };
                break;
            }
        }
        EpisodeStats { total_reward, steps, outcome, epsilon: self.epsilon }
    }

    /// Train for exactly the configured number of episodes.
    pub fn train<R: Rng>(&mut self, env: &mut Environment, rng: &mut R) -> Result<TrainingReport> {
        if self.table.shape() != (env.width(), env.height(), env.period()) {
            return Err(Error::TableShapeMismatch {
                expected: self.table.shape(),
                found: (env.width(), env.height(), env.period()),
            });
        }
        let mut report = TrainingReport::default();
        for episode in 0..self.config.episodes {
            let stats = self.run_episode(env, rng);
            debug!(episode, reward = stats.total_reward, steps = stats.steps,
                   outcome = ?stats.outcome, epsilon = stats.epsilon, "episode finished");
            report.episodes.push(stats);
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);

            let done = episode + 1;
            if self.config.log_every > 0 && done % self.config.log_every == 0 {
                let (mean, std_dev) = report.recent_returns(self.config.log_every);
                info!(episodes = done, mean_return = mean, std_dev,
                      success_rate = report.success_rate(self.config.log_every),
                      epsilon = self.epsilon, "training progress");
            }
        }
        Ok(report)
    }
}

/// Train a fresh table on `env` and return it.
pub fn train<R: Rng>(
    env: &mut Environment, config: &LearnerConfig, rng: &mut R
) -> Result<ValueTable> {
    let mut learner = Learner::new(config.clone(), env)?;
    learner.train(env, rng)?;
    Ok(learner.into_table())
}

/// A greedy, exploration-free run of a trained table.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    pub states: Vec<State>,
    pub actions: Vec<Action>,
    pub total_reward: f64,
    pub outcome: Outcome,
}

/// Follow the greedy policy of `table` from a fresh reset for up to `max_steps`.
/// The table is only read.
pub fn greedy_rollout(env: &mut Environment, table: &ValueTable, max_steps: usize) -> Result<Rollout> {
    if table.shape() != (env.width(), env.height(), env.period()) {
        return Err(Error::TableShapeMismatch {
            expected: table.shape(),
            found: (env.width(), env.height(), env.period()),
        });
    }
    let mut s = env.reset();
    let mut rollout = Rollout {
        states: vec![s], actions: Vec::new(), total_reward: 0.0, outcome: Outcome::Truncated,
    };
    for _ in 0..max_steps {
        let a = table.best_action(s);
        let result = env.step(a);
        rollout.actions.push(a);
        rollout.states.push(result.state);
        rollout.total_reward += result.reward;
        s = result.state;
        if result.terminal {
            rollout.outcome = if result.reached_goal { Outcome::Goal } else { Outcome::Hazard };
            break;
        }
    }
    Ok(rollout)
}
