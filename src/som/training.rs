//! Epoch-based Kohonen training.
//!
//! One epoch presents every input once, in order. Winner search reads the
//! committed node vectors only; every update goes to the staged vectors and is
//! committed in a single step at the end of the epoch. Rates then decay with
//! a factor that is linear in the epoch index and applied to the current value:
//!
//! ```text
//! win_rate   *= 1 - epoch * (1 - win_rate_decay)
//! other_rate *= 1 - epoch * (1 - other_rate_decay)
//! radius      = initial_radius * (1 - epoch * (1 - radius_decay))
//! ```

use crate::config::TrainingConfig;
use crate::error::{KohonenError, Result};
use crate::som::{InputSample, SomGrid};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Lifecycle of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingPhase {
    /// No epoch has run yet.
    Uninitialized,
    /// At least one epoch has run and `win_rate` is still above the threshold.
    Training,
    /// `win_rate` dropped below the threshold; further epochs are no-ops.
    Converged,
}

/// What one call to [`TrainingEngine::run_epoch`] did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// Zero-based index of the epoch that ran, or the epoch count if none ran.
    pub epoch: usize,
    /// Winner learning rate used for this epoch.
    pub win_rate: f64,
    /// Neighbour learning rate used for this epoch.
    pub other_rate: f64,
    /// Neighbourhood radius used for this epoch.
    pub radius: f64,
    /// Mean distance between each input and its winner, before the update.
    /// `None` when the run had already converged.
    pub quantization_error: Option<f64>,
    /// Whether the run is converged after this call.
    pub converged: bool,
}

/// Training state and schedule for one run.
#[derive(Debug, Clone)]
pub struct TrainingEngine {
    config: TrainingConfig,
    phase: TrainingPhase,
    win_rate: f64,
    other_rate: f64,
    radius: f64,
    initial_radius: f64,
    epoch: usize,
}

impl TrainingEngine {
    /// Creates an engine for an `x_size` by `y_size` grid.
    ///
    /// The initial radius is the grid diagonal times `radius_factor` and never
    /// changes for the lifetime of the engine.
    pub fn new(config: TrainingConfig, x_size: usize, y_size: usize) -> Result<Self> {
        config.validate()?;
        if x_size == 0 || y_size == 0 {
            return Err(KohonenError::Config(format!(
                "grid sizes must be positive, got {}x{}",
                x_size, y_size
            )));
        }

        let diagonal = (x_size as f64).hypot(y_size as f64);
        let initial_radius = diagonal * config.radius_factor;

        Ok(Self {
            phase: TrainingPhase::Uninitialized,
            win_rate: config.win_rate,
            other_rate: config.other_rate,
            radius: initial_radius,
            initial_radius,
            epoch: 0,
            config,
        })
    }

    /// Creates an engine sized for `grid`.
    pub fn for_grid(config: TrainingConfig, grid: &SomGrid) -> Result<Self> {
        Self::new(config, grid.x_size(), grid.y_size())
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// True once the run has converged.
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.phase == TrainingPhase::Converged
    }

    /// Number of epochs run so far.
    #[inline]
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Current winner learning rate.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        self.win_rate
    }

    /// Current neighbour learning rate.
    #[inline]
    pub fn other_rate(&self) -> f64 {
        self.other_rate
    }

    /// Current neighbourhood radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Radius at epoch zero.
    #[inline]
    pub fn initial_radius(&self) -> f64 {
        self.initial_radius
    }

    /// The schedule this engine was built with.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Returns the engine to its freshly constructed state.
    pub fn reset(&mut self) {
        self.phase = TrainingPhase::Uninitialized;
        self.win_rate = self.config.win_rate;
        self.other_rate = self.config.other_rate;
        self.radius = self.initial_radius;
        self.epoch = 0;
    }

    /// Runs one epoch over `inputs`.
    ///
    /// All inputs are checked against the grid dimension first, so a bad input
    /// leaves both grid and engine untouched. After convergence this is a
    /// no-op that reports the final state.
    pub fn run_epoch(&mut self, grid: &mut SomGrid, inputs: &mut [InputSample]) -> Result<EpochReport> {
        if self.phase == TrainingPhase::Converged {
            return Ok(EpochReport {
                epoch: self.epoch,
                win_rate: self.win_rate,
                other_rate: self.other_rate,
                radius: self.radius,
                quantization_error: None,
                converged: true,
            });
        }

        if inputs.is_empty() {
            return Err(KohonenError::EmptyInput("no input samples".to_string()));
        }
        for sample in inputs.iter() {
            if sample.features().len() != grid.dimension() {
                return Err(KohonenError::mismatch(grid.dimension(), sample.features().len()));
            }
        }

        if self.phase == TrainingPhase::Uninitialized {
            debug!(
                "Starting training: {} inputs, {}x{} grid, initial radius {:.3}",
                inputs.len(),
                grid.x_size(),
                grid.y_size(),
                self.initial_radius
            );
            self.phase = TrainingPhase::Training;
        }

        let (win_rate, other_rate, radius) = (self.win_rate, self.other_rate, self.radius);
        let mut total_distance = 0.0;

        if self.config.parallel_search {
            // Winner search only reads committed vectors, so it can run ahead
            let winners = grid.find_winners_parallel(inputs)?;
            for (sample, (winner, dist)) in inputs.iter_mut().zip(winners) {
                total_distance += dist;
                Self::apply(grid, sample, winner, win_rate, other_rate, radius)?;
            }
        } else {
            for sample in inputs.iter_mut() {
                let (winner, dist) = grid.find_winner_with_distance(sample.features())?;
                total_distance += dist;
                Self::apply(grid, sample, winner, win_rate, other_rate, radius)?;
            }
        }

        grid.commit()?;

        let ran = self.epoch;
        self.decay();

        if self.win_rate < self.config.convergence_threshold {
            self.phase = TrainingPhase::Converged;
            info!(
                "Converged after {} epochs (win_rate={:.4})",
                self.epoch, self.win_rate
            );
        }

        let quantization_error = total_distance / inputs.len() as f64;
        debug!(
            "Epoch {}: win_rate={:.4}, other_rate={:.4}, radius={:.3}, qe={:.5}",
            ran, win_rate, other_rate, radius, quantization_error
        );

        Ok(EpochReport {
            epoch: ran,
            win_rate,
            other_rate,
            radius,
            quantization_error: Some(quantization_error),
            converged: self.is_converged(),
        })
    }

    fn apply(
        grid: &mut SomGrid,
        sample: &mut InputSample,
        winner: (usize, usize),
        win_rate: f64,
        other_rate: f64,
        radius: f64,
    ) -> Result<()> {
        let position = grid
            .node(winner.0, winner.1)
            .map(|node| node.position())
            .ok_or(KohonenError::NodeOutOfBounds {
                i: winner.0,
                j: winner.1,
                x_size: grid.x_size(),
                y_size: grid.y_size(),
            })?;
        sample.set_match(winner, position);
        grid.accumulate(winner, sample.features(), win_rate, other_rate, radius)
    }

    fn decay(&mut self) {
        let t = self.epoch as f64;
        self.win_rate *= 1.0 - t * (1.0 - self.config.win_rate_decay);
        self.other_rate *= 1.0 - t * (1.0 - self.config.other_rate_decay);
        self.radius = self.initial_radius * (1.0 - t * (1.0 - self.config.radius_decay));
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::som::seeded_source;
    use crate::vector::Vector;

    fn test_config() -> TrainingConfig {
        TrainingConfig {
            win_rate: 0.9,
            other_rate: 0.5,
            radius_factor: 1.0,
            ..Default::default()
        }
    }

    fn samples(values: &[&[f64]]) -> Vec<InputSample> {
        values.iter().map(|v| InputSample::from(v.to_vec())).collect()
    }

    #[test]
    fn test_initial_state() {
        let engine = TrainingEngine::new(test_config(), 3, 4).unwrap();
        assert_eq!(engine.phase(), TrainingPhase::Uninitialized);
        assert_eq!(engine.epoch(), 0);
        assert!((engine.initial_radius() - 5.0).abs() < 1e-12);
        assert_eq!(engine.radius(), engine.initial_radius());
    }

    #[test]
    fn test_initial_radius_for_huge_grid() {
        // Squaring these sides would overflow usize
        let side = 1usize << 33;
        let engine = TrainingEngine::new(TrainingConfig::default(), side, side).unwrap();
        let expected = side as f64 * std::f64::consts::SQRT_2 * 0.5;
        assert!(engine.initial_radius().is_finite());
        assert!((engine.initial_radius() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_first_epoch_keeps_rates() {
        let mut rng = seeded_source(Some(42));
        let mut grid = SomGrid::new(3, 3, 2, 1.0, &mut rng).unwrap();
        let mut engine = TrainingEngine::for_grid(test_config(), &grid).unwrap();
        let mut inputs = samples(&[&[0.1, 0.2], &[0.9, 0.8]]);

        let report = engine.run_epoch(&mut grid, &mut inputs).unwrap();
        assert_eq!(report.epoch, 0);
        assert_eq!(report.win_rate, 0.9);
        assert!(!report.converged);

        // Multiplier at epoch zero is exactly one
        assert_eq!(engine.phase(), TrainingPhase::Training);
        assert_eq!(engine.win_rate(), 0.9);
        assert_eq!(engine.other_rate(), 0.5);
        assert_eq!(engine.radius(), engine.initial_radius());
        assert_eq!(engine.epoch(), 1);
    }

    #[test]
    fn test_decay_recurrence() {
        let config = TrainingConfig {
            win_rate: 0.95,
            other_rate: 0.9,
            win_rate_decay: 0.99,
            other_rate_decay: 0.98,
            radius_decay: 0.9,
            radius_factor: 0.5,
            ..Default::default()
        };
        let mut rng = seeded_source(Some(1));
        let mut grid = SomGrid::new(4, 4, 1, 1.0, &mut rng).unwrap();
        let mut engine = TrainingEngine::for_grid(config.clone(), &grid).unwrap();
        let mut inputs = samples(&[&[0.5]]);

        let initial_radius = (32.0f64).sqrt() * 0.5;
        let mut win = config.win_rate;
        let mut other = config.other_rate;
        for epoch in 0..4 {
            engine.run_epoch(&mut grid, &mut inputs).unwrap();
            let t = epoch as f64;
            win *= 1.0 - t * (1.0 - config.win_rate_decay);
            other *= 1.0 - t * (1.0 - config.other_rate_decay);
            let radius = initial_radius * (1.0 - t * (1.0 - config.radius_decay));
            assert_eq!(engine.win_rate(), win);
            assert_eq!(engine.other_rate(), other);
            assert!((engine.radius() - radius).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_epoch_scenario() {
        let mut rng = seeded_source(Some(7));
        let mut grid = SomGrid::new(2, 2, 1, 1.0, &mut rng).unwrap();
        let before: Vec<f64> = grid.nodes().iter().map(|n| n.committed().as_slice()[0]).collect();

        let mut engine = TrainingEngine::for_grid(test_config(), &grid).unwrap();
        let mut inputs = samples(&[&[1.0]]);
        let (wi, wj) = grid.find_winner(inputs[0].features()).unwrap();

        engine.run_epoch(&mut grid, &mut inputs).unwrap();

        for (idx, node) in grid.nodes().iter().enumerate() {
            let v = before[idx];
            let after = node.committed().as_slice()[0];
            let expected = if (node.i, node.j) == (wi, wj) {
                v + 0.9 * (1.0 - v)
            } else {
                // Radius is the full diagonal, so every node is a neighbour
                let r = node.grid_distance(wi, wj);
                v + (0.5 / r) * (1.0 - v)
            };
            assert!((after - expected).abs() < 1e-12, "node {}: {} vs {}", idx, after, expected);
        }
        assert_eq!(
            inputs[0].matched_position(),
            Some(grid.node(wi, wj).unwrap().position())
        );
        assert_eq!(inputs[0].matched_node(), Some((wi, wj)));
    }

    #[test]
    fn test_batch_commit_isolation() {
        // Node 0 starts nearest to both inputs. If the first input's update were
        // visible, node 0 would drift to ~0.9 and lose the second input to node 1.
        let weights = vec![Vector::from_vec(vec![0.5]), Vector::from_vec(vec![0.0])];
        let mut grid = SomGrid::from_weights(1, 2, 1.0, weights).unwrap();
        let config = TrainingConfig {
            win_rate: 0.9,
            other_rate: 0.0,
            ..Default::default()
        };
        let mut engine = TrainingEngine::for_grid(config, &grid).unwrap();
        let mut inputs = samples(&[&[0.95], &[0.3]]);

        engine.run_epoch(&mut grid, &mut inputs).unwrap();

        assert_eq!(inputs[0].matched_node(), Some((0, 0)));
        assert_eq!(inputs[1].matched_node(), Some((0, 0)));
        // Both contributions measured against the committed 0.5
        let expected = 0.5 + 0.9 * (0.95 - 0.5) + 0.9 * (0.3 - 0.5);
        let after = grid.node(0, 0).unwrap().committed().as_slice()[0];
        assert!((after - expected).abs() < 1e-12);
    }

    #[test]
    fn test_converges_and_stays_converged() {
        let mut rng = seeded_source(Some(3));
        let mut grid = SomGrid::new(3, 3, 2, 1.0, &mut rng).unwrap();
        let config = TrainingConfig {
            win_rate_decay: 0.9,
            ..Default::default()
        };
        let mut engine = TrainingEngine::for_grid(config, &grid).unwrap();
        let mut inputs = samples(&[&[0.2, 0.4], &[0.6, 0.1]]);

        let mut previous = engine.win_rate();
        let mut converged_at = None;
        for _ in 0..50 {
            let report = engine.run_epoch(&mut grid, &mut inputs).unwrap();
            if report.converged {
                converged_at = Some(engine.epoch());
                break;
            }
            assert!(engine.win_rate() <= previous);
            assert!(engine.win_rate() >= 0.5);
            previous = engine.win_rate();
        }
        assert!(converged_at.is_some());
        assert!(engine.win_rate() < 0.5);

        let frozen: Vec<Vector> = grid.nodes().iter().map(|n| n.committed().clone()).collect();
        let epoch = engine.epoch();
        for _ in 0..3 {
            let report = engine.run_epoch(&mut grid, &mut inputs).unwrap();
            assert!(report.converged);
            assert!(report.quantization_error.is_none());
        }
        assert_eq!(engine.epoch(), epoch);
        let after: Vec<Vector> = grid.nodes().iter().map(|n| n.committed().clone()).collect();
        assert_eq!(frozen, after);
    }

    #[test]
    fn test_dimension_mismatch_leaves_state() {
        let mut rng = seeded_source(Some(3));
        let mut grid = SomGrid::new(2, 2, 2, 1.0, &mut rng).unwrap();
        let before: Vec<Vector> = grid.nodes().iter().map(|n| n.committed().clone()).collect();
        let mut engine = TrainingEngine::for_grid(test_config(), &grid).unwrap();
        let mut inputs = samples(&[&[0.2, 0.4], &[0.6]]);

        let err = engine.run_epoch(&mut grid, &mut inputs).unwrap_err();
        assert!(matches!(err, KohonenError::DimensionMismatch { expected: 2, found: 1 }));
        assert_eq!(engine.phase(), TrainingPhase::Uninitialized);
        assert_eq!(engine.epoch(), 0);
        assert!(inputs[0].matched_position().is_none());

        let after: Vec<Vector> = grid.nodes().iter().map(|n| n.staged().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let mut rng = seeded_source(Some(3));
        let mut grid = SomGrid::new(2, 2, 2, 1.0, &mut rng).unwrap();
        let mut engine = TrainingEngine::for_grid(test_config(), &grid).unwrap();
        let mut inputs: Vec<InputSample> = Vec::new();
        assert!(matches!(
            engine.run_epoch(&mut grid, &mut inputs),
            Err(KohonenError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_parallel_search_is_bit_identical() {
        let data: Vec<Vec<f64>> = {
            let mut rng = seeded_source(Some(99));
            (0..40).map(|_| Vector::random(3, &mut rng).into_inner()).collect()
        };

        let run = |parallel: bool| {
            let mut rng = seeded_source(Some(17));
            let mut grid = SomGrid::new(5, 5, 3, 1.0, &mut rng).unwrap();
            let config = TrainingConfig {
                parallel_search: parallel,
                ..Default::default()
            };
            let mut engine = TrainingEngine::for_grid(config, &grid).unwrap();
            let mut inputs: Vec<InputSample> = data.iter().cloned().map(InputSample::from).collect();
            for _ in 0..5 {
                engine.run_epoch(&mut grid, &mut inputs).unwrap();
            }
            grid.nodes().iter().map(|n| n.committed().clone()).collect::<Vec<_>>()
        };

        assert_eq!(run(false), run(true));
    }

    #[test]
    fn test_reset() {
        let mut rng = seeded_source(Some(3));
        let mut grid = SomGrid::new(2, 2, 1, 1.0, &mut rng).unwrap();
        let mut engine = TrainingEngine::for_grid(test_config(), &grid).unwrap();
        let mut inputs = samples(&[&[0.3]]);
        engine.run_epoch(&mut grid, &mut inputs).unwrap();
        engine.run_epoch(&mut grid, &mut inputs).unwrap();

        engine.reset();
        assert_eq!(engine.phase(), TrainingPhase::Uninitialized);
        assert_eq!(engine.epoch(), 0);
        assert_eq!(engine.win_rate(), 0.9);
        assert_eq!(engine.radius(), engine.initial_radius());
    }
}
