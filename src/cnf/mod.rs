pub mod dimacs;
pub mod formula;
pub mod generator;

pub use formula::{Formula, Lit};
pub use generator::{ExternalGenerator, FormulaSource, InstanceParams, UniformRandom};
