use serde::Deserialize;

use crate::env::{Environment, RewardScheme};
use crate::error::Result;
use crate::grid::Grid;
use crate::hazard::Laser;
use crate::learner::LearnerConfig;

/// Hold information read from a TOML configuration file.
///
/// ```toml
/// grid = [[0, 0, 0], [0, 1, 0]]
/// start = [0, 0]
/// goal = [2, 1]
///
/// [[lasers]]
/// x = 2
/// y = 0
/// orientation = "vertical"
/// period = 4
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct SimConfig {
    /// Rows of cell codes, 0 open and 1 wall
    pub grid: Vec<Vec<u8>>,
    /// Start cell as [x, y]
    pub start: [usize; 2],
    /// Goal cell as [x, y]
    pub goal: [usize; 2],
    #[serde(default)]
    pub lasers: Vec<Laser>,
    /// Global phase period. Defaults to the LCM of laser periods.
    pub period: Option<usize>,
    #[serde(default)]
    pub rewards: RewardScheme,
    #[serde(default)]
    pub learner: LearnerConfig,
    /// Seed for exploration randomness
    #[serde(default)]
    pub seed: u64,
}

impl SimConfig {
    pub fn build_environment(&self) -> Result<Environment> {
        let grid = Grid::from_rows(&self.grid)?;
        Environment::new(
            grid,
            self.lasers.clone(),
            (self.start[0], self.start[1]),
            (self.goal[0], self.goal[1]),
            self.period,
            self.rewards,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PenaltyStacking;
    use crate::error::Error;
    use crate::hazard::Orientation;
    use config_file::FromConfigFile;
    use std::path::PathBuf;

    fn write_config(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lasergrid_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn read_full_config() {
        // Arrange
        let path = write_config("full", r#"
            grid = [[0, 0, 0], [0, 1, 0]]
            start = [0, 0]
            goal = [2, 1]
            period = 8
            seed = 11

            [[lasers]]
            x = 2
            y = 0
            orientation = "vertical"
            period = 4

            [rewards]
            goal_bonus = 50.0
            stacking = "per_hazard"

            [learner]
            episodes = 10
            alpha = 0.3
        "#);
        // Act
        let config = SimConfig::from_config_file(&path).unwrap();
        let env = config.build_environment().unwrap();
        // Assert
        assert_eq!(config.seed, 11);
        assert_eq!(config.learner.episodes, 10);
        assert_eq!(config.learner.gamma, LearnerConfig::default().gamma);
        assert_eq!(config.rewards.goal_bonus, 50.0);
        assert_eq!(config.rewards.step_cost, -1.0);
        assert_eq!(config.rewards.stacking, PenaltyStacking::PerHazard);
        assert_eq!(env.lasers(), &[Laser::new(2, 0, Orientation::Vertical, 4)]);
        assert_eq!(env.period(), 8);
        assert_eq!(env.goal(), (2, 1));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let path = write_config("minimal", r#"
            grid = [[0, 0]]
            start = [0, 0]
            goal = [1, 0]
        "#);
        let config = SimConfig::from_config_file(&path).unwrap();
        let env = config.build_environment().unwrap();
        assert!(env.lasers().is_empty());
        assert_eq!(env.period(), 1);
        assert_eq!(config.learner, LearnerConfig::default());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn demo_maze_builds() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/laser_maze.toml");
        let config = SimConfig::from_config_file(&path).unwrap();
        let env = config.build_environment().unwrap();
        assert_eq!((env.width(), env.height()), (8, 6));
        assert_eq!(env.period(), 12);
        assert!(config.learner.validate().is_ok());
    }

    #[test]
    fn invalid_layout_is_reported() {
        let config = SimConfig {
            grid: vec![vec![0, 1]],
            start: [0, 0],
            goal: [1, 0],
            lasers: vec![],
            period: None,
            rewards: RewardScheme::default(),
            learner: LearnerConfig::default(),
            seed: 0,
        };
        assert_eq!(config.build_environment().unwrap_err(), Error::OnWall { what: "goal", x: 1, y: 0 });
    }
}
