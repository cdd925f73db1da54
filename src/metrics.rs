//! Measures of how well a model fits labeled points.
use rayon::prelude::*;

use crate::{LabeledPoint, Predictor};


/// Returns the number of points whose prediction equals the label.
pub fn validate_prediction<P>(points: &[LabeledPoint], model: &P) -> usize
    where P: Predictor + ?Sized,
{
    points.par_iter()
        .filter(|point| model.predict(point.features()) == point.label())
        .count()
}


/// Returns the share of points predicted correctly.
/// Returns `0` for an empty slice.
pub fn accuracy<P>(points: &[LabeledPoint], model: &P) -> f64
    where P: Predictor + ?Sized,
{
    if points.is_empty() { return 0.0; }
    validate_prediction(points, model) as f64 / points.len() as f64
}


/// Returns the mean squared error of the predictions.
/// Returns `0` for an empty slice.
pub fn mean_squared_error<P>(points: &[LabeledPoint], model: &P) -> f64
    where P: Predictor + ?Sized,
{
    if points.is_empty() { return 0.0; }
    let loss = points.par_iter()
        .map(|point| (model.predict(point.features()) - point.label()).powi(2))
        .sum::<f64>();
    loss / points.len() as f64
}
