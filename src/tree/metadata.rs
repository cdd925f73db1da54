//! Facts about the training input that drive tree growth.
use log::warn;

use std::collections::{HashMap, HashSet};

use crate::error::{Result, TreeError};
use crate::{Dataset, LabeledPoint};
use super::configuration::{Algo, Strategy};
use super::impurity::Impurity;


/// Metadata derived from the input and the [`Strategy`].
#[derive(Debug, Clone)]
pub struct TreeMetadata {
    pub algo: Algo,
    pub impurity: Impurity,
    pub num_features: usize,
    pub num_examples: usize,
    /// `0` for regression.
    pub num_classes: usize,
    /// `max_bins` capped by the number of examples.
    pub max_bins: usize,
    pub max_depth: usize,
    pub min_instances_per_node: usize,
    pub min_info_gain: f64,
    /// Number of categories of each categorical feature.
    pub feature_arity: HashMap<usize, usize>,
    /// Categorical features split by category subsets.
    pub unordered_features: HashSet<usize>,
    /// Number of bins of each feature.
    pub num_bins: Vec<usize>,
}


impl TreeMetadata {
    /// Inspect `input` and build the metadata.
    pub fn build(input: &Dataset<LabeledPoint>, strategy: &Strategy)
        -> Result<Self>
    {
        let num_examples = input.count();
        let num_features = input.iter()
            .next()
            .map(|point| point.features().size())
            .ok_or(TreeError::EmptyDataset)?;

        if let Some((row, point)) = input.iter()
            .enumerate()
            .find(|(_, point)| point.features().size() != num_features)
        {
            return Err(TreeError::DimensionMismatch {
                row,
                expected: num_features,
                found: point.features().size(),
            });
        }

        let num_classes = match strategy.algo {
            Algo::Classification => strategy.num_classes,
            Algo::Regression => 0,
        };

        let max_bins = strategy.max_bins.min(num_examples);
        if max_bins < strategy.max_bins {
            warn!(
                "max_bins = {} is greater than the number of examples ({num_examples}). \
                 Using max_bins = {max_bins}",
                strategy.max_bins,
            );
        }

        let mut num_bins = vec![max_bins; num_features];
        let mut unordered_features = HashSet::new();

        // Unordered features enumerate 2^(arity - 1) - 1 subsets,
        // so only small arities are treated as unordered.
        // `max_bins / 2 + 1 >= 1`, so the logarithm is finite and non-negative.
        let max_unordered_arity = ((max_bins / 2 + 1) as f64).log2().floor() as usize + 1;

        for (&feature, &arity) in strategy.categorical_features_info.iter() {
            if feature >= num_features {
                return Err(TreeError::InvalidStrategy(format!(
                    "feature {feature} is declared categorical, \
                     but the input has only {num_features} features"
                )));
            }
            if arity > max_bins {
                return Err(TreeError::TooFewBins {
                    feature, arity, max_bins,
                });
            }
            if strategy.is_multiclass_with_categorical_features()
                && arity <= max_unordered_arity
            {
                unordered_features.insert(feature);
            }
            num_bins[feature] = arity;
        }

        Ok(Self {
            algo: strategy.algo,
            impurity: strategy.impurity,
            num_features,
            num_examples,
            num_classes,
            max_bins,
            max_depth: strategy.max_depth,
            min_instances_per_node: strategy.min_instances_per_node,
            min_info_gain: strategy.min_info_gain,
            feature_arity: strategy.categorical_features_info.clone(),
            unordered_features,
            num_bins,
        })
    }


    #[inline]
    pub fn is_categorical(&self, feature: usize) -> bool {
        self.feature_arity.contains_key(&feature)
    }


    #[inline]
    pub fn is_continuous(&self, feature: usize) -> bool {
        !self.is_categorical(feature)
    }


    #[inline]
    pub fn is_unordered(&self, feature: usize) -> bool {
        self.unordered_features.contains(&feature)
    }


    /// Returns the number of candidate splits of `feature`.
    pub fn num_splits(&self, feature: usize) -> usize {
        if self.is_unordered(feature) {
            let arity = self.feature_arity[&feature];
            (1 << (arity - 1)) - 1
        } else {
            self.num_bins[feature].saturating_sub(1)
        }
    }


    /// Returns the number of sufficient statistics per bin.
    #[inline]
    pub fn stat_size(&self) -> usize {
        self.impurity.stat_size(self.num_classes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use crate::generators::*;

    fn context() -> Context {
        Context::new("local[2]", "metadata-test").unwrap()
    }

    #[test]
    fn test_binary_categorical_is_ordered() {
        let context = context();
        let input = context.parallelize(generate_categorical_data_points());
        let strategy = Strategy::new(
            Algo::Classification, Impurity::Gini, 4, 2, 100,
            HashMap::from([(1, 2)]),
        );
        let metadata = TreeMetadata::build(&input, &strategy).unwrap();

        assert_eq!(2, metadata.num_features);
        assert_eq!(1000, metadata.num_examples);
        assert_eq!(100, metadata.max_bins);
        assert!(metadata.is_categorical(1));
        assert!(!metadata.is_unordered(1));
        assert_eq!(1, metadata.num_splits(1));
    }

    #[test]
    fn test_multiclass_categorical_is_unordered() {
        let context = context();
        let input = context.parallelize(
            generate_categorical_data_points_for_multiclass()
        );
        let strategy = Strategy::new(
            Algo::Classification, Impurity::Gini, 2, 3, 100,
            HashMap::from([(0, 3)]),
        );
        let metadata = TreeMetadata::build(&input, &strategy).unwrap();

        assert!(metadata.is_unordered(0));
        assert_eq!(3, metadata.num_splits(0));
    }

    #[test]
    fn test_large_arity_is_ordered_for_multiclass() {
        let context = context();
        let points = (0..100)
            .map(|i| LabeledPoint::new((i % 3) as f64, vec![(i % 10) as f64]))
            .collect::<Vec<_>>();
        let input = context.parallelize(points);
        let strategy = Strategy::new(
            Algo::Classification, Impurity::Gini, 2, 3, 10,
            HashMap::from([(0, 10)]),
        );
        let metadata = TreeMetadata::build(&input, &strategy).unwrap();
        // floor(log2(10 / 2 + 1)) + 1 == 3 < 10
        assert!(!metadata.is_unordered(0));
        assert_eq!(9, metadata.num_splits(0));
    }

    #[test]
    fn test_too_few_bins() {
        let context = context();
        let input = context.parallelize(generate_categorical_data_points());
        let strategy = Strategy::new(
            Algo::Classification, Impurity::Gini, 4, 2, 2,
            HashMap::from([(1, 3)]),
        );
        let result = TreeMetadata::build(&input, &strategy);
        assert!(
            matches!(result, Err(TreeError::TooFewBins { feature: 1, .. })),
            "expected TooFewBins, got {result:?}."
        );
    }

    #[test]
    fn test_max_bins_capped_by_examples() {
        let context = context();
        let points = (0..5)
            .map(|i| LabeledPoint::new(0.0, vec![i as f64]))
            .collect::<Vec<_>>();
        let input = context.parallelize(points);
        let strategy = Strategy::default_strategy(Algo::Classification);
        let metadata = TreeMetadata::build(&input, &strategy).unwrap();
        assert_eq!(5, metadata.max_bins);
    }

    #[test]
    fn test_empty_and_ragged_input() {
        let context = context();
        let strategy = Strategy::default_strategy(Algo::Classification);

        let input = context.parallelize(Vec::<LabeledPoint>::new());
        let result = TreeMetadata::build(&input, &strategy);
        assert!(matches!(result, Err(TreeError::EmptyDataset)));

        let input = context.parallelize(vec![
            LabeledPoint::new(0.0, vec![1.0, 2.0]),
            LabeledPoint::new(1.0, vec![1.0]),
        ]);
        let result = TreeMetadata::build(&input, &strategy);
        assert!(
            matches!(result, Err(TreeError::DimensionMismatch { row: 1, .. })),
            "expected DimensionMismatch, got {result:?}."
        );
    }
}
