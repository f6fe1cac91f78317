//! Configuration for the Kohonen map training engine.

use crate::error::{KohonenError, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Grid layout and initialization.
    pub som: SomConfig,

    /// Learning rates, decay schedule and stopping criteria.
    pub training: TrainingConfig,
}

impl Config {
    /// Validates both sections.
    pub fn validate(&self) -> Result<()> {
        self.som.validate()?;
        self.training.validate()
    }
}

/// Grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Number of nodes along the first grid axis.
    /// Default: 30.
    pub x_size: usize,

    /// Number of nodes along the second grid axis.
    /// Default: 30.
    pub y_size: usize,

    /// Distance between neighbouring node positions in output space.
    /// Zero collapses every position onto the origin and a negative value
    /// mirrors the layout; only the search and update stay on grid indices.
    /// Default: 1.0.
    pub spacing: f64,

    /// Length of the synaptic vectors.
    /// Default: None (taken from the first input vector).
    pub dimension: Option<usize>,

    /// Random seed for the initial synaptic vectors.
    /// Default: None (seeded from OS entropy).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            x_size: 30,
            y_size: 30,
            spacing: 1.0,
            dimension: None,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Returns the total number of nodes in the grid.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.x_size * self.y_size
    }

    /// Maps the legacy "zero means time-seeded" convention onto `Option`.
    pub fn seed_from_legacy(seed: u64) -> Option<u64> {
        if seed == 0 {
            None
        } else {
            Some(seed)
        }
    }

    /// Checks grid sizes, spacing and dimension.
    pub fn validate(&self) -> Result<()> {
        if self.x_size == 0 || self.y_size == 0 {
            return Err(KohonenError::Config(format!(
                "grid sizes must be positive, got {}x{}",
                self.x_size, self.y_size
            )));
        }
        if !self.spacing.is_finite() {
            return Err(KohonenError::Config(format!(
                "spacing must be finite, got {}",
                self.spacing
            )));
        }
        if self.dimension == Some(0) {
            return Err(KohonenError::Config("dimension must be positive".to_string()));
        }
        Ok(())
    }
}

/// Learning-rate and neighbourhood schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Initial learning rate of the winning node.
    /// Default: 0.95.
    pub win_rate: f64,

    /// Initial learning rate of the non-winning nodes inside the neighbourhood.
    /// Default: 0.90.
    pub other_rate: f64,

    /// Decay constant for `win_rate`.
    /// Default: 0.9980.
    pub win_rate_decay: f64,

    /// Decay constant for `other_rate`.
    /// Default: 0.9975.
    pub other_rate_decay: f64,

    /// Decay constant for the neighbourhood radius.
    /// Default: 0.99.
    pub radius_decay: f64,

    /// Initial neighbourhood radius as a fraction of the grid diagonal.
    /// Default: 0.50.
    pub radius_factor: f64,

    /// The run converges once `win_rate` falls below this value.
    /// Default: 0.5.
    pub convergence_threshold: f64,

    /// Upper bound on epochs for [`KohonenMap::train`](crate::KohonenMap::train).
    /// Default: 1000.
    pub max_epochs: usize,

    /// Search winners for all inputs in parallel before accumulating.
    /// Default: false.
    pub parallel_search: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            win_rate: 0.95,
            other_rate: 0.90,
            win_rate_decay: 0.9980,
            other_rate_decay: 0.9975,
            radius_decay: 0.99,
            radius_factor: 0.50,
            convergence_threshold: crate::DEFAULT_CONVERGENCE_THRESHOLD,
            max_epochs: 1000,
            parallel_search: false,
        }
    }
}

impl TrainingConfig {
    /// Checks that every hyperparameter is finite and the epoch cap is positive.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("win_rate", self.win_rate),
            ("other_rate", self.other_rate),
            ("win_rate_decay", self.win_rate_decay),
            ("other_rate_decay", self.other_rate_decay),
            ("radius_decay", self.radius_decay),
            ("radius_factor", self.radius_factor),
            ("convergence_threshold", self.convergence_threshold),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(KohonenError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.max_epochs == 0 {
            return Err(KohonenError::Config("max_epochs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.som.x_size, 30);
        assert_eq!(config.som.total_nodes(), 900);
        assert_eq!(config.training.win_rate, 0.95);
        assert_eq!(config.training.other_rate_decay, 0.9975);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = SomConfig {
            y_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KohonenError::Config(_))));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let config = SomConfig {
            dimension: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spacing_sign_accepted() {
        for spacing in [-1.0, 0.0, 2.5] {
            let config = SomConfig {
                spacing,
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "spacing {spacing} rejected");
        }

        let config = SomConfig {
            spacing: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KohonenError::Config(_))));
    }

    #[test]
    fn test_nan_hyperparameter_rejected() {
        let config = TrainingConfig {
            radius_factor: f64::NAN,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("radius_factor"));
    }

    #[test]
    fn test_legacy_seed() {
        assert_eq!(SomConfig::seed_from_legacy(0), None);
        assert_eq!(SomConfig::seed_from_legacy(7), Some(7));
    }
}
