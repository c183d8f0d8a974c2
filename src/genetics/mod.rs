//! Heritable traits and their mutation

pub mod traits;

pub use traits::{GeneticTraits, MutatedTrait};
