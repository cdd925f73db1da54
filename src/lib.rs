//!
//! A crate that trains decision trees
//! on partitioned in-memory collections.
//!
//! A [`Context`] owns a thread pool and splits a `Vec`
//! into a [`Dataset`] of partitions.
//! A [`DecisionTree`] grows a tree greedily from the root.
//! At each node, the statistics of the rows are aggregated
//! partition by partition in parallel,
//! and the split with the largest impurity decrease is chosen.
//!
//! - Impurities: Gini index, entropy, and variance (regression).
//! - Continuous features are split on thresholds
//!   found from a sample of the input.
//! - Categorical features are split on subsets of categories.
//!
//! # Example
//! ```
//! use minitree::prelude::*;
//! use minitree::generators::generate_categorical_data_points;
//!
//! let context = Context::new("local[2]", "readme").unwrap();
//! let points = generate_categorical_data_points();
//! let input = context.parallelize(points.clone());
//!
//! let strategy = Strategy::builder(Algo::Classification)
//!     .max_depth(4)
//!     .max_bins(100)
//!     .categorical_feature(1, 2)
//!     .build()
//!     .unwrap();
//! let model = DecisionTree::train(&input, strategy).unwrap();
//!
//! assert_eq!(validate_prediction(&points, &model), points.len());
//! println!("{}", model.to_debug_string());
//! context.stop();
//! ```

pub mod constants;
pub mod error;
pub mod context;
pub mod dataset;
pub mod sample;
pub mod generators;
pub mod predictor;
pub mod tree;
pub mod metrics;
pub mod prelude;


pub use error::{Result, TreeError};

pub use context::{Context, ContextBuilder};
pub use dataset::Dataset;

pub use sample::{Format, LabeledPoint, SampleReader, Vector};

pub use predictor::Predictor;

pub use tree::{
    Algo,
    FeatureType,
    Impurity,
    QuantileStrategy,
    Strategy,
    StrategyBuilder,

    DecisionTree,
    DecisionTreeModel,
    Node,
    Split,
};
