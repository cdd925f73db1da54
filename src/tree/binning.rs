//! Discretizes features into bins before growing the tree.
use log::debug;
use rayon::prelude::*;

use std::fmt;

use crate::constants::MIN_SPLIT_SAMPLES;
use crate::error::{Result, TreeError};
use crate::{Dataset, LabeledPoint, Vector};
use super::configuration::Algo;
use super::metadata::TreeMetadata;


/// The bins of a single feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureBins {
    /// Bin `j` holds the values in `(thresholds[j - 1], thresholds[j]]`.
    /// The first and the last bins are unbounded.
    Continuous {
        thresholds: Vec<f64>,
    },
    /// Bin `j` holds category `j`.
    Categorical {
        arity: usize,
        unordered: bool,
    },
}


impl FeatureBins {
    /// Returns the number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Continuous { thresholds } => thresholds.len() + 1,
            Self::Categorical { arity, .. } => *arity,
        }
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /// Returns the bin of `value`.
    /// A categorical `value` must be an integer in `[0, arity)`.
    #[inline]
    pub fn bin_of(&self, feature: usize, value: f64) -> Result<usize> {
        match self {
            Self::Continuous { thresholds } => {
                Ok(thresholds.partition_point(|&t| t < value))
            },
            Self::Categorical { arity, .. } => {
                let is_category = value >= 0.0
                    && value.fract() == 0.0
                    && (value as usize) < *arity;
                if is_category {
                    Ok(value as usize)
                } else {
                    Err(TreeError::InvalidCategory {
                        feature, value, arity: *arity,
                    })
                }
            },
        }
    }
}


impl fmt::Display for FeatureBins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous { thresholds } => {
                write!(f, "continuous, {} bins", thresholds.len() + 1)
            },
            Self::Categorical { arity, unordered } => {
                let order = if *unordered { "unordered" } else { "ordered" };
                write!(f, "categorical ({order}), {arity} bins")
            },
        }
    }
}


/// A labeled point whose features are replaced by bin indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TreePoint {
    pub label: f64,
    pub bins: Vec<usize>,
}


/// Compute the bins of every feature.
/// The thresholds of continuous features are taken from
/// a sample of `input` drawn with `seed`.
/// `metadata.num_bins` is updated to the number of bins found.
pub fn find_bins(
    input: &Dataset<LabeledPoint>,
    metadata: &mut TreeMetadata,
    seed: u64,
) -> Vec<FeatureBins>
{
    let continuous = (0..metadata.num_features)
        .filter(|&f| metadata.is_continuous(f))
        .collect::<Vec<_>>();

    let mut thresholds = Vec::with_capacity(continuous.len());
    if !continuous.is_empty() {
        let required = (metadata.max_bins * metadata.max_bins)
            .max(MIN_SPLIT_SAMPLES);
        let fraction = if required < metadata.num_examples {
            required as f64 / metadata.num_examples as f64
        } else {
            1.0
        };
        let sample = input.sample(fraction, seed)
            .map(|point| point.features().clone())
            .collect();
        debug!(
            "Finding thresholds of {} continuous features from {} rows",
            continuous.len(), sample.len(),
        );

        let num_bins = &metadata.num_bins;
        thresholds = input.install(|| {
            continuous.par_iter()
                .map(|&f| {
                    let values = sample.iter()
                        .map(|x: &Vector| x[f])
                        .collect::<Vec<_>>();
                    find_thresholds(values, num_bins[f].saturating_sub(1))
                })
                .collect::<Vec<_>>()
        });
    }

    let mut thresholds = thresholds.into_iter();
    (0..metadata.num_features)
        .map(|f| {
            if let Some(&arity) = metadata.feature_arity.get(&f) {
                let unordered = metadata.is_unordered(f);
                return FeatureBins::Categorical { arity, unordered };
            }
            let thresholds = thresholds.next()
                .unwrap_or_default();
            metadata.num_bins[f] = thresholds.len() + 1;
            FeatureBins::Continuous { thresholds }
        })
        .collect()
}


/// Returns at most about `num_splits` thresholds for the given values.
/// If the values take few distinct values,
/// the thresholds are the midpoints of consecutive ones.
/// Otherwise, they are approximate quantiles.
pub fn find_thresholds(values: Vec<f64>, num_splits: usize) -> Vec<f64> {
    let counts = value_counts(values);
    if counts.len() <= 1 || num_splits == 0 {
        return Vec::new();
    }

    let possible_splits = counts.len() - 1;
    if possible_splits <= num_splits {
        return counts.windows(2)
            .map(|w| (w[0].0 + w[1].0) / 2.0)
            .collect();
    }

    let n_sample = counts.iter()
        .map(|(_, c)| *c)
        .sum::<usize>() as f64;
    let stride = n_sample / (num_splits + 1) as f64;

    let mut thresholds = Vec::with_capacity(num_splits);
    let mut current = counts[0].1 as f64;
    let mut target = stride;
    for i in 1..counts.len() {
        let previous = current;
        current += counts[i].1 as f64;

        // Cut before `counts[i]` if that lands closer to the target.
        let previous_gap = (previous - target).abs();
        let current_gap = (current - target).abs();
        if previous_gap < current_gap {
            thresholds.push((counts[i - 1].0 + counts[i].0) / 2.0);
            target += stride;
        }
    }
    thresholds
}


/// Count the number of items in `src` that has the same value.
/// The output is sorted in ascending order of the value.
fn value_counts(mut src: Vec<f64>) -> Vec<(f64, usize)> {
    src.sort_by(|a, b| a.total_cmp(b));

    let mut dst = Vec::new();
    let mut iter = src.into_iter();
    let mut value = match iter.next() {
        Some(v) => v,
        None => { return dst; }
    };

    let mut count: usize = 1;
    for v in iter {
        if v == value {
            count += 1;
        } else {
            dst.push((value, count));
            value = v;
            count = 1;
        }
    }

    dst.push((value, count));
    dst
}


/// Convert `input` into binned points.
/// Fails if a label is not a class index (classification)
/// or a categorical value is not a category.
pub fn to_tree_points(
    input: &Dataset<LabeledPoint>,
    bins: &[FeatureBins],
    metadata: &TreeMetadata,
) -> Result<Dataset<TreePoint>>
{
    let algo = metadata.algo;
    let num_classes = metadata.num_classes;
    input.try_map(|point| {
        let label = point.label();
        if algo == Algo::Classification {
            let is_class = label >= 0.0
                && label.fract() == 0.0
                && (label as usize) < num_classes;
            if !is_class {
                return Err(TreeError::InvalidLabel { label, num_classes });
            }
        }

        let features = point.features();
        let bins = bins.iter()
            .enumerate()
            .map(|(f, b)| b.bin_of(f, features[f]))
            .collect::<Result<Vec<_>>>()?;
        Ok(TreePoint { label, bins })
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts() {
        let result = value_counts(vec![3.0, 1.0, 3.0, 2.0, 1.0, 3.0]);
        let expect = vec![(1.0, 2), (2.0, 1), (3.0, 3)];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_value_counts_sorts_nan_last() {
        let result = value_counts(vec![2.0, f64::NAN, 1.0, 2.0]);
        assert_eq!(3, result.len(), "expected 3 entries, got {result:?}.");
        assert_eq!((1.0, 1), result[0]);
        assert_eq!((2.0, 2), result[1]);
        assert!(result[2].0.is_nan());
    }

    #[test]
    fn test_thresholds_single_value() {
        let result = find_thresholds(vec![5.0; 10], 10);
        assert!(result.is_empty(), "expected no thresholds, got {result:?}.");
    }

    #[test]
    fn test_thresholds_few_distinct_values() {
        let values = [vec![0.0; 600], vec![1.0; 400]].concat();
        let result = find_thresholds(values, 99);
        let expect = vec![0.5];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_thresholds_as_many_distinct_values_as_bins() {
        // 4 distinct values fit in 4 bins, i.e., 3 splits.
        let values = vec![3.0, 0.0, 2.0, 1.0, 2.0];
        let result = find_thresholds(values, 3);
        let expect = vec![0.5, 1.5, 2.5];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_thresholds_quantiles() {
        let values = (0..1000).map(|i| i as f64).collect::<Vec<_>>();
        let result = find_thresholds(values, 3);
        let expect = vec![249.5, 499.5, 749.5];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_find_bins_on_a_sample() {
        use crate::Context;
        use crate::tree::configuration::Strategy;

        let context = Context::new("local[2]", "binning-test").unwrap();
        let points = (0..20_000)
            .map(|i| LabeledPoint::new(0.0, vec![i as f64]))
            .collect::<Vec<_>>();
        let input = context.parallelize(points);
        let strategy = Strategy::builder(Algo::Classification)
            .max_bins(10)
            .build()
            .unwrap();

        let mut metadata = TreeMetadata::build(&input, &strategy).unwrap();
        let lhs = find_bins(&input, &mut metadata, 3);
        let rhs = find_bins(&input, &mut metadata, 3);
        assert_eq!(lhs, rhs);

        let thresholds = match &lhs[0] {
            FeatureBins::Continuous { thresholds } => thresholds.clone(),
            FeatureBins::Categorical { .. } => panic!("feature 0 is continuous"),
        };
        assert_eq!(9, thresholds.len(), "got {thresholds:?}.");
        assert_eq!(10, metadata.num_bins[0]);
        for (k, t) in thresholds.iter().enumerate() {
            let target = 2000.0 * (k + 1) as f64;
            assert!((t - target).abs() < 300.0, "threshold {t} is far from {target}.");
        }
        context.stop();
    }

    #[test]
    fn test_continuous_bin_of() {
        let bins = FeatureBins::Continuous { thresholds: vec![0.5, 1.5] };
        let result = [-3.0, 0.5, 0.7, 1.5, 9.0]
            .map(|v| bins.bin_of(0, v).unwrap());
        let expect = [0, 0, 1, 1, 2];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
        assert_eq!(3, bins.len());
    }

    #[test]
    fn test_categorical_bin_of() {
        let bins = FeatureBins::Categorical { arity: 3, unordered: false };
        assert_eq!(2, bins.bin_of(4, 2.0).unwrap());
        for value in [3.0, -1.0, 0.5] {
            let result = bins.bin_of(4, value);
            assert!(
                matches!(result, Err(TreeError::InvalidCategory { feature: 4, .. })),
                "expected InvalidCategory for {value}, got {result:?}."
            );
        }
    }
}
