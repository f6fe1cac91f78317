//! Training inputs and their best-match bookkeeping.

use crate::som::Position;
use crate::vector::Vector;

/// One training vector plus the position of its current winner.
#[derive(Debug, Clone)]
pub struct InputSample {
    features: Vector,
    matched_node: Option<(usize, usize)>,
    matched_position: Option<Position>,
}

impl InputSample {
    /// Creates a sample with no match yet.
    pub fn new(features: Vector) -> Self {
        Self {
            features,
            matched_node: None,
            matched_position: None,
        }
    }

    /// The immutable feature vector.
    #[inline]
    pub fn features(&self) -> &Vector {
        &self.features
    }

    /// Grid coordinates of the winner found in the latest epoch.
    #[inline]
    pub fn matched_node(&self) -> Option<(usize, usize)> {
        self.matched_node
    }

    /// Output-space position of the winner found in the latest epoch.
    #[inline]
    pub fn matched_position(&self) -> Option<Position> {
        self.matched_position
    }

    pub(crate) fn set_match(&mut self, node: (usize, usize), position: Position) {
        self.matched_node = Some(node);
        self.matched_position = Some(position);
    }

    pub(crate) fn clear_match(&mut self) {
        self.matched_node = None;
        self.matched_position = None;
    }
}

impl From<Vec<f64>> for InputSample {
    fn from(values: Vec<f64>) -> Self {
        Self::new(Vector::from_vec(values))
    }
}
