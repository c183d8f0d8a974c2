pub mod config;
pub mod error;
pub mod types;

pub use config::{BoundsMode, EvictionPolicy, SimulationConfig};
pub use error::{EvoError, Result};
pub use types::{Direction, FoodId, OrganismId, Rgb, Tick, Vec2};
