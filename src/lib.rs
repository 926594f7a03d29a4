//! Grid world with sweeping laser hazards and a tabular Q-learner that
//! learns to cross it.
//!
//! The [`env::Environment`] is a deterministic function of position, clock
//! and action. The learner observes `(x, y, clock mod period)` and keeps a
//! dense [`policy::ValueTable`] over those states and the five actions.

pub mod config;
pub mod env;
pub mod error;
pub mod grid;
pub mod hazard;
pub mod learner;
pub mod policy;
pub mod state;

pub use error::{Error, Result};
