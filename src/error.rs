use thiserror::Error;

/// Configuration and contract violations detected by the simulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Grid must have at least one row and one column")]
    EmptyGrid,

    #[error("Grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, found: usize },

    #[error("Unknown cell code {code} at ({x}, {y}); use 0 for open and 1 for wall")]
    UnknownCell { code: u8, x: usize, y: usize },

    #[error("{what} cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { what: &'static str, x: usize, y: usize, width: usize, height: usize },

    #[error("{what} cell ({x}, {y}) is a wall")]
    OnWall { what: &'static str, x: usize, y: usize },

    #[error("Laser #{index} has period 0")]
    ZeroHazardPeriod { index: usize },

    #[error("Global period must be positive")]
    ZeroGlobalPeriod,

    #[error("Laser #{index} period {period} does not divide global period {global}")]
    PhaseAliasing { index: usize, period: usize, global: usize },

    #[error("Learning rate must be in (0, 1], got {0}")]
    InvalidLearningRate(f64),

    #[error("Discount factor must be in [0, 1], got {0}")]
    InvalidDiscount(f64),

    #[error("Exploration rate {name} must be in [0, 1], got {value}")]
    InvalidExploration { name: &'static str, value: f64 },

    #[error("Minimum exploration rate {min} exceeds initial rate {initial}")]
    ExplorationFloorAboveStart { min: f64, initial: f64 },

    #[error("Exploration decay must be in (0, 1], got {0}")]
    InvalidDecay(f64),

    #[error("Episode count must be positive")]
    ZeroEpisodes,

    #[error("Maximum steps per episode must be positive")]
    ZeroStepCap,

    #[error("Invalid action index: {0}")]
    InvalidAction(usize),

    #[error("Unknown action name: {0}")]
    UnknownActionName(String),

    #[error("Value table is {expected:?} but the environment needs {found:?}")]
    TableShapeMismatch { expected: (usize, usize, usize), found: (usize, usize, usize) },
}

pub type Result<T> = std::result::Result<T, Error>;
