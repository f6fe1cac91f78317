//! # Kohonen - Self-Organizing Map Training Engine
//!
//! Trains a Kohonen self-organizing map: a fixed rectangular grid of nodes
//! whose synaptic vectors are pulled towards a set of N-dimensional inputs so
//! that neighbouring nodes end up holding similar vectors.
//!
//! ## Overview
//!
//! Training runs in epochs. Each epoch presents every input once, finds its
//! winning node by exhaustive Euclidean search, and stages updates for the
//! winner and every node within the current neighbourhood radius. Staged
//! updates are committed together at the end of the epoch, so every winner
//! search within one epoch sees the same map. Learning rates and radius then
//! decay, and the run converges once the winner rate drops below 0.5.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kohonen::{Config, KohonenMap};
//!
//! let mut config = Config::default();
//! config.som.x_size = 10;
//! config.som.y_size = 10;
//! config.som.seed = Some(42);
//!
//! let inputs = vec![vec![0.1, 0.9, 0.3], vec![0.8, 0.2, 0.5]];
//! let mut map = KohonenMap::configure(config, inputs)?;
//! let summary = map.train()?;
//! let snapshot = map.snapshot();
//! ```
//!
//! ## Architecture
//!
//! - [`vector`] - Fixed-length vectors with checked arithmetic
//! - [`som`] - Grid, training engine and run lifecycle
//! - [`input`] - Reading input vectors from text
//! - [`config`] - Grid and schedule configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod input;
pub mod som;
pub mod vector;

// Re-export commonly used types
pub use config::{Config, SomConfig, TrainingConfig};
pub use error::{KohonenError, Result};
pub use som::{
    EpochReport, InputSample, KohonenMap, MapNode, MapSnapshot, Position, SomGrid,
    TrainingEngine, TrainingPhase, TrainingSummary, UniformSource,
};
pub use vector::Vector;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Winner learning rate below which a run counts as converged.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.5;
