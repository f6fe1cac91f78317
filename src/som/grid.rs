//! Rectangular grid of map nodes.

use crate::config::SomConfig;
use crate::error::{KohonenError, Result};
use crate::som::{InputSample, MapNode, UniformSource};
use crate::vector::Vector;
use rayon::prelude::*;

/// A rectangular Kohonen map.
///
/// Nodes are stored in row-major order: node `(i, j)` lives at index
/// `i * y_size + j`. Winner search visits them in that order, so ties resolve
/// to the node with the smallest `i`, then the smallest `j`.
#[derive(Debug, Clone)]
pub struct SomGrid {
    x_size: usize,
    y_size: usize,
    dimension: usize,
    spacing: f64,
    nodes: Vec<MapNode>,
}

impl SomGrid {
    /// Creates a grid whose committed vectors are drawn from `source`.
    ///
    /// Values are drawn node by node in row-major order, component by
    /// component, so a seeded source always yields the same map.
    pub fn new<S: UniformSource + ?Sized>(
        x_size: usize,
        y_size: usize,
        dimension: usize,
        spacing: f64,
        source: &mut S,
    ) -> Result<Self> {
        Self::check_shape(x_size, y_size, dimension)?;

        let mut nodes = Vec::with_capacity(x_size * y_size);
        for i in 0..x_size {
            for j in 0..y_size {
                nodes.push(MapNode::new_random(i, j, dimension, spacing, source));
            }
        }

        Ok(Self {
            x_size,
            y_size,
            dimension,
            spacing,
            nodes,
        })
    }

    /// Creates a grid from a validated [`SomConfig`].
    pub fn from_config<S: UniformSource + ?Sized>(
        config: &SomConfig,
        dimension: usize,
        source: &mut S,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(config.x_size, config.y_size, dimension, config.spacing, source)
    }

    /// Creates a grid with explicit committed vectors, given in row-major order.
    pub fn from_weights(
        x_size: usize,
        y_size: usize,
        spacing: f64,
        weights: Vec<Vector>,
    ) -> Result<Self> {
        let dimension = weights.first().map(Vector::len).unwrap_or(0);
        Self::check_shape(x_size, y_size, dimension)?;

        if weights.len() != x_size * y_size {
            return Err(KohonenError::Config(format!(
                "expected {} weight vectors for a {}x{} grid, got {}",
                x_size * y_size,
                x_size,
                y_size,
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| w.len() != dimension) {
            return Err(KohonenError::mismatch(dimension, bad.len()));
        }

        let nodes = weights
            .into_iter()
            .enumerate()
            .map(|(idx, w)| MapNode::new_with_weights(idx / y_size, idx % y_size, spacing, w))
            .collect();

        Ok(Self {
            x_size,
            y_size,
            dimension,
            spacing,
            nodes,
        })
    }

    fn check_shape(x_size: usize, y_size: usize, dimension: usize) -> Result<()> {
        if x_size == 0 || y_size == 0 {
            return Err(KohonenError::Config(format!(
                "grid sizes must be positive, got {}x{}",
                x_size, y_size
            )));
        }
        if dimension == 0 {
            return Err(KohonenError::Config("dimension must be positive".to_string()));
        }
        Ok(())
    }

    /// Number of nodes along the first axis.
    #[inline]
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// Number of nodes along the second axis.
    #[inline]
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Synaptic vector length.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Spacing between node positions.
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Returns the total number of nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in row-major order.
    #[inline]
    pub fn nodes(&self) -> &[MapNode] {
        &self.nodes
    }

    /// Gets a node by its grid coordinates.
    #[inline]
    pub fn node(&self, i: usize, j: usize) -> Option<&MapNode> {
        if i < self.x_size && j < self.y_size {
            Some(&self.nodes[self.coords_to_index(i, j)])
        } else {
            None
        }
    }

    /// Converts 2D coordinates to a 1D index.
    #[inline]
    pub fn coords_to_index(&self, i: usize, j: usize) -> usize {
        i * self.y_size + j
    }

    /// Converts a 1D index to 2D coordinates.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index / self.y_size, index % self.y_size)
    }

    fn check_input(&self, input: &Vector) -> Result<()> {
        if input.len() != self.dimension {
            return Err(KohonenError::mismatch(self.dimension, input.len()));
        }
        Ok(())
    }

    /// Finds the winning node for `input` and its distance.
    ///
    /// Scans every node; only a strictly smaller distance replaces the current
    /// best, which keeps the earliest node on ties.
    pub fn find_winner_with_distance(&self, input: &Vector) -> Result<((usize, usize), f64)> {
        self.check_input(input)?;

        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;

        for (idx, node) in self.nodes.iter().enumerate() {
            let dist = node.distance(input)?;
            if dist < best_dist {
                best_dist = dist;
                best_idx = idx;
            }
        }

        Ok((self.index_to_coords(best_idx), best_dist))
    }

    /// Finds the coordinates of the winning node for `input`.
    pub fn find_winner(&self, input: &Vector) -> Result<(usize, usize)> {
        self.find_winner_with_distance(input).map(|(winner, _)| winner)
    }

    /// Finds winners for all samples in parallel.
    ///
    /// Reads committed vectors only, so the result equals calling
    /// [`find_winner_with_distance`](Self::find_winner_with_distance) per sample.
    pub fn find_winners_parallel(
        &self,
        samples: &[InputSample],
    ) -> Result<Vec<((usize, usize), f64)>> {
        samples
            .par_iter()
            .map(|sample| self.find_winner_with_distance(sample.features()))
            .collect()
    }

    /// Stages the learning update caused by one input.
    ///
    /// The winner moves by `win_rate * (input - committed)`. Any other node at
    /// topological distance `r <= radius` moves by
    /// `(other_rate / r) * (input - committed)`. Committed vectors are not
    /// touched until [`commit`](Self::commit).
    pub fn accumulate(
        &mut self,
        winner: (usize, usize),
        input: &Vector,
        win_rate: f64,
        other_rate: f64,
        radius: f64,
    ) -> Result<()> {
        self.check_input(input)?;
        let (wi, wj) = winner;
        if wi >= self.x_size || wj >= self.y_size {
            return Err(KohonenError::NodeOutOfBounds {
                i: wi,
                j: wj,
                x_size: self.x_size,
                y_size: self.y_size,
            });
        }

        for node in &mut self.nodes {
            if node.i == wi && node.j == wj {
                node.stage_update(input, win_rate)?;
            } else {
                let r = node.grid_distance(wi, wj);
                if r <= radius {
                    node.stage_update(input, other_rate / r)?;
                }
            }
        }

        Ok(())
    }

    /// Folds every staged vector into its committed vector.
    pub fn commit(&mut self) -> Result<()> {
        for node in &mut self.nodes {
            node.commit()?;
        }
        Ok(())
    }

    /// Mean distance between each sample and its winning node.
    pub fn quantization_error(&self, samples: &[InputSample]) -> Result<f64> {
        if samples.is_empty() {
            return Err(KohonenError::EmptyInput("no samples to measure".to_string()));
        }
        let mut total = 0.0;
        for sample in samples {
            let (_, dist) = self.find_winner_with_distance(sample.features())?;
            total += dist;
        }
        Ok(total / samples.len() as f64)
    }
}
