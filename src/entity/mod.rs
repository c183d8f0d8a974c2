pub mod organism;

pub use organism::{DeathCause, Organism, Target, Wander};
