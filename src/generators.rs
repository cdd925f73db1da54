//! Deterministic synthetic datasets.
//! Each generator returns a small, separable dataset
//! that a tree of modest depth fits exactly.
use crate::LabeledPoint;


/// 1000 points with two binary features.
/// The first 600 points are `(1.0, [0.0, 1.0])`
/// and the rest are `(0.0, [1.0, 0.0])`.
/// Feature 1 is meant to be declared categorical with 2 categories.
pub fn generate_categorical_data_points() -> Vec<LabeledPoint> {
    (0..1000)
        .map(|i| {
            if i < 600 {
                LabeledPoint::new(1.0, vec![0.0, 1.0])
            } else {
                LabeledPoint::new(0.0, vec![1.0, 0.0])
            }
        })
        .collect()
}


/// 1000 points `(0.0, [i, 1000 - i])`.
pub fn generate_ordered_labeled_points_with_label0() -> Vec<LabeledPoint> {
    ordered_points(|_| 0.0)
}


/// 1000 points `(1.0, [i, 1000 - i])`.
pub fn generate_ordered_labeled_points_with_label1() -> Vec<LabeledPoint> {
    ordered_points(|_| 1.0)
}


/// 1000 points `(y, [i, 1000 - i])`,
/// where `y` alternates between `0` and `1` over four intervals
/// `[0, 100)`, `[100, 500)`, `[500, 900)`, and `[900, 1000)`.
pub fn generate_ordered_labeled_points() -> Vec<LabeledPoint> {
    ordered_points(|i| {
        if i < 100 {
            0.0
        } else if i < 500 {
            1.0
        } else if i < 900 {
            0.0
        } else {
            1.0
        }
    })
}


/// 3000 points in three blocks of 1000 with labels `0, 1, 2`.
/// Feature 0 equals the label and is meant to be declared categorical
/// with 3 categories; feature 1 is the constant `2.0`.
pub fn generate_categorical_data_points_for_multiclass() -> Vec<LabeledPoint> {
    (0..3000)
        .map(|i| {
            let y = (i / 1000) as f64;
            LabeledPoint::new(y, vec![y, 2.0])
        })
        .collect()
}


/// 3000 points `(i / 1000, [2.0, i])`.
pub fn generate_continuous_data_points_for_multiclass() -> Vec<LabeledPoint> {
    (0..3000)
        .map(|i| {
            let y = (i / 1000) as f64;
            LabeledPoint::new(y, vec![2.0, i as f64])
        })
        .collect()
}


fn ordered_points<F>(label: F) -> Vec<LabeledPoint>
    where F: Fn(usize) -> f64
{
    (0..1000)
        .map(|i| {
            let x = i as f64;
            LabeledPoint::new(label(i), vec![x, 1000.0 - x])
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_data_points() {
        let points = generate_categorical_data_points();
        assert_eq!(1000, points.len());

        let positives = points.iter()
            .filter(|p| p.label() == 1.0)
            .count();
        assert_eq!(600, positives, "expected 600, got {positives}.");
    }

    #[test]
    fn test_ordered_labeled_points() {
        let points = generate_ordered_labeled_points();
        let result = [0, 99, 100, 499, 500, 899, 900, 999].iter()
            .map(|&i| points[i].label())
            .collect::<Vec<_>>();
        let expect = vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }
}
