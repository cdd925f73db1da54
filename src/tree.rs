//! Decision tree training and prediction.
pub mod configuration;
pub mod impurity;
pub mod metadata;
pub mod binning;
mod aggregator;
pub mod split;
pub mod node;
pub mod decision_tree;
pub mod model;


pub use configuration::{Algo, FeatureType, QuantileStrategy, Strategy, StrategyBuilder};
pub use impurity::{Impurity, ImpurityCalculator};
pub use split::{LeftRight, Split};
pub use node::{InformationGainStats, Node, Predict};
pub use decision_tree::DecisionTree;
pub use model::DecisionTreeModel;
