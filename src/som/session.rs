//! A complete training run: grid, engine and inputs behind one handle.
//!
//! [`KohonenMap::configure`] validates everything up front and builds the
//! initial map; [`KohonenMap::run_epoch`] and [`KohonenMap::train`] then
//! advance it. [`KohonenMap::reset`] starts the run over from scratch.

use crate::config::Config;
use crate::error::{KohonenError, Result};
use crate::som::{
    seeded_source, EpochReport, InputSample, Position, SomGrid, TrainingEngine, TrainingPhase,
    UniformSource,
};
use crate::vector::Vector;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// One training run.
#[derive(Debug, Clone)]
pub struct KohonenMap {
    config: Config,
    grid: SomGrid,
    engine: TrainingEngine,
    samples: Vec<InputSample>,
}

/// Outcome of [`KohonenMap::train`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Epochs run by this call.
    pub epochs_run: usize,
    /// Total epochs of the run so far.
    pub total_epochs: usize,
    /// Whether the run has converged.
    pub converged: bool,
    /// Whether the cancellation flag stopped training.
    pub cancelled: bool,
    /// Quantization error of the last epoch run by this call.
    pub last_quantization_error: Option<f64>,
}

/// State of one node, for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Row coordinate.
    pub i: usize,
    /// Column coordinate.
    pub j: usize,
    /// Output-space position.
    pub position: Position,
    /// Committed synaptic vector.
    pub weights: Vec<f64>,
}

/// Best match of one input, for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Grid coordinates of the winner.
    pub matched_node: Option<(usize, usize)>,
    /// Output-space position of the winner.
    pub matched_position: Option<Position>,
}

/// Everything a caller reads back after an epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Lifecycle phase.
    pub phase: TrainingPhase,
    /// Whether the run has converged.
    pub converged: bool,
    /// Epochs run so far.
    pub epoch: usize,
    /// Current neighbourhood radius.
    pub neighborhood_radius: f64,
    /// Current winner learning rate.
    pub win_rate: f64,
    /// Current neighbour learning rate.
    pub other_rate: f64,
    /// Grid width.
    pub x_size: usize,
    /// Grid height.
    pub y_size: usize,
    /// Nodes in row-major order.
    pub nodes: Vec<NodeSnapshot>,
    /// Inputs in the order given.
    pub inputs: Vec<InputSnapshot>,
}

impl KohonenMap {
    /// Validates `config` and `vectors` and builds the initial map.
    ///
    /// When `config.som.dimension` is `None` the first vector's length is used.
    /// Every vector must have that length and contain only finite values.
    pub fn configure(config: Config, vectors: Vec<Vec<f64>>) -> Result<Self> {
        let mut source = seeded_source(config.som.seed);
        Self::configure_with_source(config, vectors, &mut source)
    }

    /// Like [`configure`](Self::configure), drawing initial weights from `source`.
    pub fn configure_with_source<S: UniformSource + ?Sized>(
        config: Config,
        vectors: Vec<Vec<f64>>,
        source: &mut S,
    ) -> Result<Self> {
        config.validate()?;

        let first = vectors
            .first()
            .ok_or_else(|| KohonenError::EmptyInput("no input vectors".to_string()))?;
        let dimension = config.som.dimension.unwrap_or(first.len());
        if dimension == 0 {
            return Err(KohonenError::EmptyInput("input vectors have no components".to_string()));
        }

        let mut samples = Vec::with_capacity(vectors.len());
        for (index, values) in vectors.into_iter().enumerate() {
            if values.len() != dimension {
                return Err(KohonenError::mismatch(dimension, values.len()));
            }
            let features = Vector::from_vec(values);
            if !features.is_finite() {
                return Err(KohonenError::NonFinite { index });
            }
            samples.push(InputSample::new(features));
        }

        let grid = SomGrid::from_config(&config.som, dimension, source)?;
        let engine = TrainingEngine::for_grid(config.training.clone(), &grid)?;

        info!(
            "Configured {}x{} map: {} inputs of dimension {}",
            grid.x_size(),
            grid.y_size(),
            samples.len(),
            dimension
        );

        Ok(Self {
            config,
            grid,
            engine,
            samples,
        })
    }

    /// Runs one epoch. A no-op once converged.
    pub fn run_epoch(&mut self) -> Result<EpochReport> {
        self.engine.run_epoch(&mut self.grid, &mut self.samples)
    }

    /// Runs epochs until convergence or until `training.max_epochs` more
    /// epochs have run.
    pub fn train(&mut self) -> Result<TrainingSummary> {
        let never = AtomicBool::new(false);
        self.train_with_cancel(&never, |_| {})
    }

    /// Like [`train`](Self::train), checking `cancel` before each epoch and
    /// calling `on_epoch` after each one.
    pub fn train_with_cancel<F>(
        &mut self,
        cancel: &AtomicBool,
        mut on_epoch: F,
    ) -> Result<TrainingSummary>
    where
        F: FnMut(&EpochReport),
    {
        let max_epochs = self.config.training.max_epochs;
        let mut epochs_run = 0;
        let mut cancelled = false;
        let mut last_quantization_error = None;

        while epochs_run < max_epochs && !self.engine.is_converged() {
            if cancel.load(Ordering::Relaxed) {
                warn!("Training cancelled after {} epochs", self.engine.epoch());
                cancelled = true;
                break;
            }
            let report = self.run_epoch()?;
            last_quantization_error = report.quantization_error;
            on_epoch(&report);
            epochs_run += 1;
        }

        if !cancelled && !self.engine.is_converged() {
            warn!(
                "Stopped at the {} epoch limit without converging (win_rate={:.4})",
                max_epochs,
                self.engine.win_rate()
            );
        }

        Ok(TrainingSummary {
            epochs_run,
            total_epochs: self.engine.epoch(),
            converged: self.engine.is_converged(),
            cancelled,
            last_quantization_error,
        })
    }

    /// Discards all training progress and rebuilds the initial map.
    ///
    /// With a configured seed the rebuilt map equals the original one.
    pub fn reset(&mut self) -> Result<()> {
        let mut source = seeded_source(self.config.som.seed);
        self.reset_with_source(&mut source)
    }

    /// Like [`reset`](Self::reset), drawing initial weights from `source`.
    pub fn reset_with_source<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        self.grid = SomGrid::from_config(&self.config.som, self.grid.dimension(), source)?;
        self.engine.reset();
        for sample in &mut self.samples {
            sample.clear_match();
        }
        info!("Map reset");
        Ok(())
    }

    /// Captures the current state for output.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            phase: self.engine.phase(),
            converged: self.engine.is_converged(),
            epoch: self.engine.epoch(),
            neighborhood_radius: self.engine.radius(),
            win_rate: self.engine.win_rate(),
            other_rate: self.engine.other_rate(),
            x_size: self.grid.x_size(),
            y_size: self.grid.y_size(),
            nodes: self
                .grid
                .nodes()
                .iter()
                .map(|node| NodeSnapshot {
                    i: node.i,
                    j: node.j,
                    position: node.position(),
                    weights: node.committed().as_slice().to_vec(),
                })
                .collect(),
            inputs: self
                .samples
                .iter()
                .map(|sample| InputSnapshot {
                    matched_node: sample.matched_node(),
                    matched_position: sample.matched_position(),
                })
                .collect(),
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The map.
    pub fn grid(&self) -> &SomGrid {
        &self.grid
    }

    /// The training state.
    pub fn engine(&self) -> &TrainingEngine {
        &self.engine
    }

    /// The inputs, in the order given.
    pub fn samples(&self) -> &[InputSample] {
        &self.samples
    }

    /// Whether the run has converged.
    pub fn is_converged(&self) -> bool {
        self.engine.is_converged()
    }
}
