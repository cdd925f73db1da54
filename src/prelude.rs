//! Exports the types needed to train and use a decision tree.
//!
//! ```
//! use minitree::prelude::*;
//! ```
pub use crate::{
    Context,
    ContextBuilder,
    Dataset,

    LabeledPoint,
    Vector,
    SampleReader,

    Predictor,

    Algo,
    Impurity,
    Strategy,
    DecisionTree,
    DecisionTreeModel,

    TreeError,
};

pub use crate::metrics::{accuracy, mean_squared_error, validate_prediction};
