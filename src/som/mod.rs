//! Self-Organizing Map (SOM) training engine.
//!
//! - **Grid**: rectangular map of nodes with double-buffered synaptic vectors (grid.rs)
//! - **Training**: epoch loop, decay schedule and convergence (training.rs)
//! - **Session**: configure / run / reset lifecycle for a whole run (session.rs)

mod grid;
mod node;
mod random;
mod sample;
pub mod session;
pub mod training;

pub use grid::SomGrid;
pub use node::{MapNode, Position};
pub use random::{seeded_source, UniformSource};
pub use sample::InputSample;
pub use session::{InputSnapshot, KohonenMap, MapSnapshot, NodeSnapshot, TrainingSummary};
pub use training::{EpochReport, TrainingEngine, TrainingPhase};
