//! Training configuration of the decision tree.
use serde::{Serialize, Deserialize};

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{Result, TreeError};
use super::impurity::Impurity;


/// The learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algo {
    Classification,
    Regression,
}


impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Classification => "classifier",
            Self::Regression => "regressor",
        };
        write!(f, "{name}")
    }
}


/// The type of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    /// Ordered real values. Split by a threshold.
    Continuous,
    /// Unordered categories `0, 1, ..., arity - 1`. Split by a subset.
    Categorical,
}


/// How to compute the candidate thresholds of continuous features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuantileStrategy {
    /// Sort a sample of the values and pick approximate quantiles.
    #[default]
    Sort,
}


/// Parameters for growing a decision tree.
///
/// `categorical_features_info` maps a feature index to its number of
/// categories. Features not in the map are continuous.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use minitree::{Algo, Impurity, Strategy};
///
/// let categorical = HashMap::from([(1, 2)]);
/// let strategy = Strategy::new(
///     Algo::Classification, Impurity::Gini, 4, 2, 100, categorical
/// );
/// assert!(strategy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub algo: Algo,
    pub impurity: Impurity,
    pub max_depth: usize,
    pub num_classes: usize,
    pub max_bins: usize,
    pub quantile_strategy: QuantileStrategy,
    pub categorical_features_info: HashMap<usize, usize>,
    pub min_instances_per_node: usize,
    pub min_info_gain: f64,
    pub seed: u64,
}


impl Strategy {
    /// Construct a new [`Strategy`].
    /// The other parameters take their default values.
    /// This constructor does not validate the arguments;
    /// training calls [`Strategy::validate`].
    pub fn new(
        algo: Algo,
        impurity: Impurity,
        max_depth: usize,
        num_classes: usize,
        max_bins: usize,
        categorical_features_info: HashMap<usize, usize>,
    ) -> Self
    {
        Self {
            algo,
            impurity,
            max_depth,
            num_classes,
            max_bins,
            quantile_strategy: QuantileStrategy::Sort,
            categorical_features_info,
            min_instances_per_node: DEFAULT_MIN_INSTANCES_PER_NODE,
            min_info_gain: DEFAULT_MIN_INFO_GAIN,
            seed: DEFAULT_SEED,
        }
    }


    /// Returns the default strategy for `algo`:
    /// Gini impurity with 2 classes for classification,
    /// variance for regression, and max depth `10` for both.
    pub fn default_strategy(algo: Algo) -> Self {
        Self::new(
            algo,
            default_impurity(algo),
            DEFAULT_MAX_DEPTH,
            DEFAULT_NUM_CLASSES,
            DEFAULT_MAX_BINS,
            HashMap::new(),
        )
    }


    /// Returns a [`StrategyBuilder`] for `algo`.
    pub fn builder(algo: Algo) -> StrategyBuilder {
        StrategyBuilder::new(algo)
    }


    /// Parse a strategy from JSON.
    /// Omitted fields take their default values,
    /// and the default impurity depends on `algo`.
    ///
    /// ```
    /// use minitree::{Algo, Impurity, Strategy};
    ///
    /// let json = r#"{
    ///     "algo": "Classification",
    ///     "max_depth": 4,
    ///     "max_bins": 100,
    ///     "categorical_features_info": { "1": 2 }
    /// }"#;
    /// let strategy = Strategy::from_json_str(json).unwrap();
    /// assert_eq!(Impurity::Gini, strategy.impurity);
    /// assert_eq!(Some(&2), strategy.categorical_features_info.get(&1));
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file = serde_json::from_str::<StrategyFile>(json)?;
        file.into_builder().build()
    }


    /// Read a strategy from a JSON file.
    /// See [`Strategy::from_json_str`] for the format.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }


    /// Returns `true` for classification with more than 2 classes.
    pub fn is_multiclass_classification(&self) -> bool {
        self.algo == Algo::Classification && self.num_classes > 2
    }


    /// Returns `true` for multiclass classification
    /// with at least one categorical feature.
    pub fn is_multiclass_with_categorical_features(&self) -> bool {
        self.is_multiclass_classification()
            && !self.categorical_features_info.is_empty()
    }


    /// Check that the parameters are consistent.
    pub fn validate(&self) -> Result<()> {
        match self.algo {
            Algo::Classification => {
                if !self.impurity.is_classification() {
                    return invalid(format!(
                        "impurity `{}` cannot be used for classification",
                        self.impurity,
                    ));
                }
                if self.num_classes < 2 {
                    return invalid(format!(
                        "classification needs at least 2 classes, got {}",
                        self.num_classes,
                    ));
                }
            },
            Algo::Regression => {
                if self.impurity != Impurity::Variance {
                    return invalid(format!(
                        "impurity `{}` cannot be used for regression",
                        self.impurity,
                    ));
                }
            },
        }

        if self.max_depth > MAX_DEPTH_LIMIT {
            return invalid(format!(
                "max_depth must be at most {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth,
            ));
        }
        if self.max_bins < 2 {
            return invalid(format!(
                "max_bins must be at least 2, got {}", self.max_bins,
            ));
        }
        if self.min_instances_per_node < 1 {
            return invalid(format!(
                "min_instances_per_node must be at least 1, got {}",
                self.min_instances_per_node,
            ));
        }
        if !(self.min_info_gain >= 0.0 && self.min_info_gain.is_finite()) {
            return invalid(format!(
                "min_info_gain must be a non-negative number, got {}",
                self.min_info_gain,
            ));
        }
        if let Some((feature, arity)) = self.categorical_features_info.iter()
            .find(|(_, arity)| **arity < 2)
        {
            return invalid(format!(
                "feature {feature} has arity {arity}, but arity must be >= 2"
            ));
        }
        Ok(())
    }
}


fn invalid(message: String) -> Result<()> {
    Err(TreeError::InvalidStrategy(message))
}


fn default_impurity(algo: Algo) -> Impurity {
    match algo {
        Algo::Classification => Impurity::Gini,
        Algo::Regression => Impurity::Variance,
    }
}


/// A struct that builds a validated [`Strategy`].
///
/// # Example
/// ```
/// use minitree::{Algo, Impurity, Strategy};
///
/// let strategy = Strategy::builder(Algo::Classification)
///     .impurity(Impurity::Entropy)
///     .max_depth(3)
///     .num_classes(3)
///     .categorical_feature(0, 3)
///     .build()
///     .unwrap();
/// assert!(strategy.is_multiclass_with_categorical_features());
/// ```
#[derive(Debug, Clone)]
pub struct StrategyBuilder {
    algo: Algo,
    impurity: Option<Impurity>,
    max_depth: usize,
    num_classes: usize,
    max_bins: usize,
    quantile_strategy: QuantileStrategy,
    categorical_features_info: HashMap<usize, usize>,
    min_instances_per_node: usize,
    min_info_gain: f64,
    seed: u64,
}


impl StrategyBuilder {
    /// Construct a new builder for `algo`.
    /// The parameters are the ones of [`Strategy::default_strategy`].
    pub fn new(algo: Algo) -> Self {
        Self {
            algo,
            impurity: None,
            max_depth: DEFAULT_MAX_DEPTH,
            num_classes: DEFAULT_NUM_CLASSES,
            max_bins: DEFAULT_MAX_BINS,
            quantile_strategy: QuantileStrategy::Sort,
            categorical_features_info: HashMap::new(),
            min_instances_per_node: DEFAULT_MIN_INSTANCES_PER_NODE,
            min_info_gain: DEFAULT_MIN_INFO_GAIN,
            seed: DEFAULT_SEED,
        }
    }


    /// Set the impurity.
    /// Default is `Gini` for classification and `Variance` for regression.
    pub fn impurity(mut self, impurity: Impurity) -> Self {
        self.impurity = Some(impurity);
        self
    }


    /// Set the maximal depth. Depth `0` means a single leaf.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }


    /// Set the number of classes.
    pub fn num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }


    /// Set the maximal number of bins per feature.
    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }


    /// Set the quantile strategy.
    pub fn quantile_strategy(mut self, strategy: QuantileStrategy) -> Self {
        self.quantile_strategy = strategy;
        self
    }


    /// Replace the whole categorical feature map.
    pub fn categorical_features_info(mut self, info: HashMap<usize, usize>)
        -> Self
    {
        self.categorical_features_info = info;
        self
    }


    /// Declare feature `feature` categorical with `arity` categories.
    pub fn categorical_feature(mut self, feature: usize, arity: usize)
        -> Self
    {
        self.categorical_features_info.insert(feature, arity);
        self
    }


    /// Set the minimal number of rows each child must have.
    pub fn min_instances_per_node(mut self, n: usize) -> Self {
        self.min_instances_per_node = n;
        self
    }


    /// Set the minimal information gain of a split.
    pub fn min_info_gain(mut self, gain: f64) -> Self {
        self.min_info_gain = gain;
        self
    }


    /// Set the seed used to sample rows for continuous splits.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Build a [`Strategy`] and validate it.
    /// This method consumes `self`.
    pub fn build(self) -> Result<Strategy> {
        let strategy = Strategy {
            algo: self.algo,
            impurity: self.impurity.unwrap_or(default_impurity(self.algo)),
            max_depth: self.max_depth,
            num_classes: self.num_classes,
            max_bins: self.max_bins,
            quantile_strategy: self.quantile_strategy,
            categorical_features_info: self.categorical_features_info,
            min_instances_per_node: self.min_instances_per_node,
            min_info_gain: self.min_info_gain,
            seed: self.seed,
        };
        strategy.validate()?;
        Ok(strategy)
    }
}


/// The on-disk form of [`Strategy`]. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StrategyFile {
    algo: Option<Algo>,
    impurity: Option<Impurity>,
    max_depth: Option<usize>,
    num_classes: Option<usize>,
    max_bins: Option<usize>,
    quantile_strategy: Option<QuantileStrategy>,
    categorical_features_info: Option<HashMap<usize, usize>>,
    min_instances_per_node: Option<usize>,
    min_info_gain: Option<f64>,
    seed: Option<u64>,
}


impl StrategyFile {
    fn into_builder(self) -> StrategyBuilder {
        let mut builder = StrategyBuilder::new(
            self.algo.unwrap_or(Algo::Classification)
        );
        builder.impurity = self.impurity;
        if let Some(v) = self.max_depth { builder.max_depth = v; }
        if let Some(v) = self.num_classes { builder.num_classes = v; }
        if let Some(v) = self.max_bins { builder.max_bins = v; }
        if let Some(v) = self.quantile_strategy { builder.quantile_strategy = v; }
        if let Some(v) = self.categorical_features_info {
            builder.categorical_features_info = v;
        }
        if let Some(v) = self.min_instances_per_node {
            builder.min_instances_per_node = v;
        }
        if let Some(v) = self.min_info_gain { builder.min_info_gain = v; }
        if let Some(v) = self.seed { builder.seed = v; }
        builder
    }
}
