//! Fixed-length real vectors used for synaptic weights and input features.
//!
//! Every binary operation checks that both operands have the same length and
//! returns [`KohonenError::DimensionMismatch`] otherwise. Mutating operations
//! only touch the receiver.

use crate::error::{KohonenError, Result};
use crate::som::UniformSource;
use serde::{Deserialize, Serialize};

/// An N-dimensional vector of `f64` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    values: Vec<f64>,
}

impl Vector {
    /// Creates a zero vector of the given length.
    pub fn zeros(dim: usize) -> Self {
        Self {
            values: vec![0.0; dim],
        }
    }

    /// Creates a vector taking ownership of `values`.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Creates a vector with each component drawn uniformly from [0, 1).
    ///
    /// Components are drawn in index order.
    pub fn random<S: UniformSource + ?Sized>(dim: usize, source: &mut S) -> Self {
        let values = (0..dim).map(|_| source.next_uniform()).collect();
        Self { values }
    }

    /// Number of components.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the vector has no components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Component at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Borrows the components.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consumes the vector, returning its components.
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }

    /// True if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    #[inline]
    fn check_len(&self, other: &Vector) -> Result<()> {
        if self.values.len() != other.values.len() {
            return Err(KohonenError::mismatch(self.values.len(), other.values.len()));
        }
        Ok(())
    }

    /// Euclidean (L2) distance to `other`.
    pub fn distance(&self, other: &Vector) -> Result<f64> {
        self.check_len(other)?;

        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (b - a).powi(2))
            .sum::<f64>()
            .sqrt())
    }

    /// `self -= other`, element-wise.
    pub fn subtract(&mut self, other: &Vector) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a -= b;
        }
        Ok(())
    }

    /// `self += other`, element-wise.
    pub fn sum(&mut self, other: &Vector) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// `self *= factor`, element-wise.
    pub fn scale(&mut self, factor: f64) {
        for a in &mut self.values {
            *a *= factor;
        }
    }

    /// Overwrites every component with the matching one from `other`.
    pub fn copy_from(&mut self, other: &Vector) -> Result<()> {
        self.check_len(other)?;
        self.values.copy_from_slice(&other.values);
        Ok(())
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}
