//! Node representation for the Kohonen map.

use crate::error::Result;
use crate::som::UniformSource;
use crate::vector::Vector;
use serde::{Deserialize, Serialize};

/// A point in output space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// First axis.
    pub x: f64,
    /// Second axis.
    pub y: f64,
    /// Third axis; always zero for grid nodes.
    pub z: f64,
}

impl Position {
    /// Creates a position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A node in the Kohonen map.
///
/// Each node holds two synaptic vectors. `committed` is what winner search
/// sees; `staged` collects the updates of the running epoch and is folded into
/// `committed` by [`MapNode::commit`].
#[derive(Debug, Clone)]
pub struct MapNode {
    /// Row coordinate on the grid.
    pub i: usize,
    /// Column coordinate on the grid.
    pub j: usize,
    committed: Vector,
    staged: Vector,
    position: Position,
}

impl MapNode {
    /// Creates a node with a random committed vector.
    pub fn new_random<S: UniformSource + ?Sized>(
        i: usize,
        j: usize,
        dimension: usize,
        spacing: f64,
        source: &mut S,
    ) -> Self {
        Self::new_with_weights(i, j, spacing, Vector::random(dimension, source))
    }

    /// Creates a node with the given committed vector.
    pub fn new_with_weights(i: usize, j: usize, spacing: f64, weights: Vector) -> Self {
        let staged = weights.clone();
        Self {
            i,
            j,
            committed: weights,
            staged,
            position: Position::new(i as f64 * spacing, j as f64 * spacing, 0.0),
        }
    }

    /// The node's current synaptic vector.
    #[inline]
    pub fn committed(&self) -> &Vector {
        &self.committed
    }

    /// The pending synaptic vector for this epoch.
    #[inline]
    pub fn staged(&self) -> &Vector {
        &self.staged
    }

    /// Fixed output-space position.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Euclidean distance from the committed vector to `input`.
    pub fn distance(&self, input: &Vector) -> Result<f64> {
        self.committed.distance(input)
    }

    /// Topological distance to grid cell `(i, j)`.
    #[inline]
    pub fn grid_distance(&self, i: usize, j: usize) -> f64 {
        let di = self.i as f64 - i as f64;
        let dj = self.j as f64 - j as f64;
        (di * di + dj * dj).sqrt()
    }

    /// Adds `rate * (input - committed)` to the staged vector.
    pub fn stage_update(&mut self, input: &Vector, rate: f64) -> Result<()> {
        let mut delta = input.clone();
        delta.subtract(&self.committed)?;
        delta.scale(rate);
        self.staged.sum(&delta)
    }

    /// Makes the staged vector current and restarts staging from it.
    pub fn commit(&mut self) -> Result<()> {
        self.committed.copy_from(&self.staged)?;
        self.staged = self.committed.clone();
        Ok(())
    }
}
