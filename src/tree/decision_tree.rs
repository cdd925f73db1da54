//! Grows a decision tree from a partitioned collection.
use fixedbitset::FixedBitSet;
use log::{debug, info};
use rayon::prelude::*;

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use crate::error::Result;
use crate::{Dataset, LabeledPoint};
use super::aggregator::StatsAggregator;
use super::binning::{self, FeatureBins, TreePoint};
use super::configuration::{Algo, Strategy};
use super::impurity::{Impurity, ImpurityCalculator};
use super::metadata::TreeMetadata;
use super::model::DecisionTreeModel;
use super::node::{InformationGainStats, Node, Predict};
use super::split::Split;


/// A greedy, top-down decision tree learner.
///
/// # Example
/// ```
/// use minitree::{Algo, Context, DecisionTree, LabeledPoint, Predictor, Strategy};
///
/// let context = Context::new("local[2]", "example").unwrap();
/// let points = (0..100)
///     .map(|i| {
///         let label = if i < 60 { 1.0 } else { 0.0 };
///         LabeledPoint::new(label, vec![i as f64])
///     })
///     .collect::<Vec<_>>();
/// let input = context.parallelize(points);
///
/// let strategy = Strategy::builder(Algo::Classification)
///     .max_depth(2)
///     .build()
///     .unwrap();
/// let model = DecisionTree::new(strategy).run(&input).unwrap();
///
/// assert_eq!(model.predict(&vec![10.0].into()), 1.0);
/// assert_eq!(model.predict(&vec![90.0].into()), 0.0);
/// context.stop();
/// ```
#[derive(Debug, Clone)]
pub struct DecisionTree {
    strategy: Strategy,
}


impl DecisionTree {
    /// Construct a learner with the given parameters.
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }


    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }


    /// Train a tree on `input`.
    pub fn run(&self, input: &Dataset<LabeledPoint>)
        -> Result<DecisionTreeModel>
    {
        let now = Instant::now();
        self.strategy.validate()?;

        let mut metadata = TreeMetadata::build(input, &self.strategy)?;
        info!(
            "Training a {} on {} examples with {} features \
             ({} categorical, {} unordered) over {} partitions",
            self.strategy.algo,
            metadata.num_examples,
            metadata.num_features,
            metadata.feature_arity.len(),
            metadata.unordered_features.len(),
            input.num_partitions(),
        );

        let bins = binning::find_bins(input, &mut metadata, self.strategy.seed);
        let points = binning::to_tree_points(input, &bins, &metadata)?;

        let rows = points.partitions()
            .iter()
            .map(|part| (0..part.len()).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let grower = TreeGrower { metadata: &metadata, bins: &bins, points: &points };
        let root = grower.grow(rows, 1);
        let model = DecisionTreeModel::new(self.strategy.algo, root);

        info!(
            "Trained a tree of depth {} with {} nodes in {} ms",
            model.depth(),
            model.num_nodes(),
            now.elapsed().as_millis(),
        );
        Ok(model)
    }


    /// Train a tree on `input` with `strategy`.
    pub fn train(input: &Dataset<LabeledPoint>, strategy: Strategy)
        -> Result<DecisionTreeModel>
    {
        Self::new(strategy).run(input)
    }


    /// Train a classification tree.
    /// `impurity` is either `"gini"` or `"entropy"`.
    pub fn train_classifier(
        input: &Dataset<LabeledPoint>,
        num_classes: usize,
        categorical_features_info: HashMap<usize, usize>,
        impurity: &str,
        max_depth: usize,
        max_bins: usize,
    ) -> Result<DecisionTreeModel>
    {
        let impurity = impurity.parse::<Impurity>()?;
        let strategy = Strategy::new(
            Algo::Classification,
            impurity,
            max_depth,
            num_classes,
            max_bins,
            categorical_features_info,
        );
        Self::train(input, strategy)
    }


    /// Train a regression tree.
    /// `impurity` must be `"variance"`.
    pub fn train_regressor(
        input: &Dataset<LabeledPoint>,
        categorical_features_info: HashMap<usize, usize>,
        impurity: &str,
        max_depth: usize,
        max_bins: usize,
    ) -> Result<DecisionTreeModel>
    {
        let impurity = impurity.parse::<Impurity>()?;
        let strategy = Strategy::new(
            Algo::Regression,
            impurity,
            max_depth,
            0,
            max_bins,
            categorical_features_info,
        );
        Self::train(input, strategy)
    }
}


impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.strategy;
        write!(
            f,
            "DecisionTree ({}, impurity = {}, max depth = {}, max bins = {})",
            s.algo, s.impurity, s.max_depth, s.max_bins,
        )
    }
}


/// A split on bin indices.
#[derive(Debug, Clone)]
enum BinnedSplit {
    /// Rows with `bin <= bin` go to the left.
    Threshold { feature: usize, bin: usize },
    /// Rows whose category is in `left` go to the left.
    Categories { feature: usize, left: FixedBitSet },
}


impl BinnedSplit {
    #[inline]
    fn goes_left(&self, point: &TreePoint) -> bool {
        match self {
            Self::Threshold { feature, bin } => point.bins[*feature] <= *bin,
            Self::Categories { feature, left } => left.contains(point.bins[*feature]),
        }
    }


    /// Convert `self` into a split on raw feature values.
    fn to_split(&self, bins: &[FeatureBins]) -> Split {
        match self {
            Self::Threshold { feature, bin } => {
                let threshold = match &bins[*feature] {
                    FeatureBins::Continuous { thresholds } => thresholds[*bin],
                    FeatureBins::Categorical { .. } => {
                        unreachable!("threshold split on a categorical feature")
                    },
                };
                Split::continuous(*feature, threshold)
            },
            Self::Categories { feature, left } => {
                let categories = left.ones()
                    .map(|c| c as f64)
                    .collect::<Vec<_>>();
                Split::categorical(*feature, categories)
            },
        }
    }
}


/// A valid split candidate and the statistics of its children.
#[derive(Debug, Clone)]
struct Candidate {
    split: BinnedSplit,
    gain: f64,
    left: ImpurityCalculator,
    right: ImpurityCalculator,
}


struct TreeGrower<'a> {
    metadata: &'a TreeMetadata,
    bins: &'a [FeatureBins],
    points: &'a Dataset<TreePoint>,
}


impl<'a> TreeGrower<'a> {
    /// Grow the subtree rooted at node `id`.
    /// `rows[i]` holds the positions in partition `i`
    /// of the rows reaching the node.
    fn grow(&self, rows: Vec<Vec<usize>>, id: usize) -> Node {
        let level = Node::index_to_level(id);
        let aggregator = self.aggregate(&rows);
        let calculator = aggregator.node_calculator();

        let impurity = calculator.calculate();
        let predict = predict_of(&calculator);

        if level >= self.metadata.max_depth || impurity <= 0.0 {
            return Node::leaf(id, predict, impurity);
        }

        let best = match self.best_split(&aggregator, &calculator, impurity) {
            Some(best) if best.gain > 0.0 => best,
            _ => {
                return Node::leaf(id, predict, impurity);
            },
        };

        let split = best.split.to_split(self.bins);
        let stats = InformationGainStats {
            gain: best.gain,
            impurity,
            left_impurity: best.left.calculate(),
            right_impurity: best.right.calculate(),
            left_predict: predict_of(&best.left),
            right_predict: predict_of(&best.right),
        };
        debug!("Node {id} at level {level}: split {split} with {stats}");

        let (left_rows, right_rows) = self.partition(&rows, &best.split);
        drop(rows);

        let left = self.grow(left_rows, Node::left_child_index(id));
        let right = self.grow(right_rows, Node::right_child_index(id));

        Node::branch(id, split, left, right, predict, impurity, stats)
    }


    /// Aggregate the statistics of the given rows over the partitions.
    fn aggregate(&self, rows: &[Vec<usize>]) -> StatsAggregator {
        let metadata = self.metadata;
        let bins = self.bins;
        let zero = || StatsAggregator::new(
            metadata.impurity, metadata.stat_size(), bins
        );
        let aggregated = self.points.fold_partitions(
            |i, part| {
                let mut aggregator = zero();
                rows[i].iter().for_each(|&r| aggregator.update(&part[r]));
                aggregator
            },
            |a, b| a.merge(b),
        );
        aggregated.unwrap_or_else(zero)
    }


    /// Send the rows to the children.
    fn partition(&self, rows: &[Vec<usize>], split: &BinnedSplit)
        -> (Vec<Vec<usize>>, Vec<Vec<usize>>)
    {
        let partitions = self.points.partitions();
        self.points.install(|| {
            rows.par_iter()
                .zip(partitions.par_iter())
                .map(|(rows, part)| {
                    rows.iter()
                        .copied()
                        .partition::<Vec<usize>, _>(|&r| split.goes_left(&part[r]))
                })
                .unzip()
        })
    }


    /// Returns the best valid split over all features.
    /// Ties are broken in favor of the smaller feature index.
    fn best_split(
        &self,
        aggregator: &StatsAggregator,
        parent: &ImpurityCalculator,
        impurity: f64,
    ) -> Option<Candidate>
    {
        let candidates = self.points.install(|| {
            (0..self.metadata.num_features).into_par_iter()
                .map(|f| self.best_split_of(f, aggregator, parent, impurity))
                .collect::<Vec<_>>()
        });

        let mut best: Option<Candidate> = None;
        for candidate in candidates.into_iter().flatten() {
            if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                best = Some(candidate);
            }
        }
        best
    }


    /// Returns the best valid split on `feature`.
    /// Ties are broken in favor of the smaller split index.
    fn best_split_of(
        &self,
        feature: usize,
        aggregator: &StatsAggregator,
        parent: &ImpurityCalculator,
        impurity: f64,
    ) -> Option<Candidate>
    {
        let bins = aggregator.feature_calculators(feature);
        let mut best: Option<Candidate> = None;
        let mut consider = |split: BinnedSplit, left: ImpurityCalculator| {
            let mut right = parent.clone();
            right.subtract(&left);
            if let Some(candidate) = self.evaluate(split, left, right, impurity) {
                if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        };

        match &self.bins[feature] {
            FeatureBins::Continuous { .. } => {
                let mut left = ImpurityCalculator::zeros(
                    self.metadata.impurity, self.metadata.stat_size()
                );
                for (bin, stats) in bins.iter().enumerate().take(bins.len().saturating_sub(1)) {
                    left.add(stats);
                    consider(BinnedSplit::Threshold { feature, bin }, left.clone());
                }
            },
            FeatureBins::Categorical { arity, unordered: true } => {
                for index in 0..self.metadata.num_splits(feature) {
                    let mask = index + 1;
                    let mut categories = FixedBitSet::with_capacity(*arity);
                    let mut left = ImpurityCalculator::zeros(
                        self.metadata.impurity, self.metadata.stat_size()
                    );
                    for (c, stats) in bins.iter().enumerate() {
                        if mask & (1 << c) != 0 {
                            categories.insert(c);
                            left.add(stats);
                        }
                    }
                    let split = BinnedSplit::Categories { feature, left: categories };
                    consider(split, left);
                }
            },
            FeatureBins::Categorical { arity, unordered: false } => {
                let order = self.centroid_order(&bins);
                let mut categories = FixedBitSet::with_capacity(*arity);
                let mut left = ImpurityCalculator::zeros(
                    self.metadata.impurity, self.metadata.stat_size()
                );
                for &c in order.iter().take(order.len().saturating_sub(1)) {
                    categories.insert(c);
                    left.add(&bins[c]);
                    let split = BinnedSplit::Categories {
                        feature,
                        left: categories.clone(),
                    };
                    consider(split, left.clone());
                }
            },
        }
        best
    }


    /// Returns the categories sorted by their centroids.
    /// Empty categories go last.
    fn centroid_order(&self, bins: &[ImpurityCalculator]) -> Vec<usize> {
        let centroids = bins.iter()
            .map(|stats| {
                if stats.count() <= 0.0 {
                    return f64::MAX;
                }
                match self.metadata.algo {
                    Algo::Classification if self.metadata.num_classes == 2 => {
                        stats.stats()[1] / stats.count()
                    },
                    Algo::Classification => stats.calculate(),
                    Algo::Regression => stats.predict(),
                }
            })
            .collect::<Vec<_>>();

        let mut order = (0..bins.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| centroids[a].total_cmp(&centroids[b]));
        order
    }


    /// Compute the gain of a split.
    /// Returns `None` if the split violates
    /// `min_instances_per_node` or `min_info_gain`.
    fn evaluate(
        &self,
        split: BinnedSplit,
        left: ImpurityCalculator,
        right: ImpurityCalculator,
        impurity: f64,
    ) -> Option<Candidate>
    {
        let left_count = left.count();
        let right_count = right.count();
        let min_count = self.metadata.min_instances_per_node as f64;
        if left_count < min_count || right_count < min_count {
            return None;
        }

        let total = left_count + right_count;
        let left_weight = left_count / total;
        let right_weight = right_count / total;
        let gain = impurity
            - left_weight * left.calculate()
            - right_weight * right.calculate();

        if gain < self.metadata.min_info_gain {
            return None;
        }
        Some(Candidate { split, gain, left, right })
    }
}


fn predict_of(calculator: &ImpurityCalculator) -> Predict {
    let predict = calculator.predict();
    Predict::new(predict, calculator.prob(predict))
}
