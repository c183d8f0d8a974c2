//! Simulation systems - everything that runs inside a tick

pub mod clock;
pub mod consumption;
pub mod decisions;
pub mod movement;
pub mod population;
pub mod reproduction;
pub mod targeting;
pub mod tick;

pub use clock::Simulation;
pub use movement::{MoveContext, MoveOutcome};
pub use population::Birth;
pub use reproduction::ReproductionTrigger;
pub use tick::{run_simulation_tick, SimulationEvent};
