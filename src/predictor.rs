//! Defines the [`Predictor`] trait shared by trained trees.
use rayon::prelude::*;

use crate::{Dataset, Vector};


/// A trained model that maps a feature vector to a real value.
/// For classification the value is a class index `0.0, 1.0, ...`.
///
/// # Required Methods
/// - [`Predictor::predict`]
///
/// # Provided Methods
/// - [`Predictor::predict_batch`]
/// - [`Predictor::predict_all`]
pub trait Predictor: Sync {
    /// Predict the value of a single feature vector.
    fn predict(&self, features: &Vector) -> f64;


    /// Predict the values of a slice of feature vectors in parallel.
    fn predict_batch(&self, features: &[Vector]) -> Vec<f64> {
        features.par_iter()
            .map(|x| self.predict(x))
            .collect()
    }


    /// Predict the values of a partitioned collection.
    /// The result has the same partitioning as `features`.
    fn predict_all(&self, features: &Dataset<Vector>) -> Dataset<f64> {
        features.map(|x| self.predict(x))
    }
}
