//! Background population of alias variants

mod in_flight;
mod pipeline;

pub use in_flight::{InFlightPopulations, PopulationGuard};
pub use pipeline::PopulationPipeline;
