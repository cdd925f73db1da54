//! Defines the splitting rule stored in branch nodes.
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::Vector;
use super::configuration::FeatureType;


/// The output of [`Split::split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeftRight {
    Left,
    Right,
}


/// A splitting rule on a single feature.
///
/// * A continuous split sends `x` to the left
///   if `x[feature] <= threshold`.
/// * A categorical split sends `x` to the left
///   if `x[feature]` is in `categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub feature_type: FeatureType,
    pub categories: Vec<f64>,
}


impl Split {
    /// Construct a threshold split on a continuous feature.
    #[inline]
    pub fn continuous(feature: usize, threshold: f64) -> Self {
        Self {
            feature,
            threshold,
            feature_type: FeatureType::Continuous,
            categories: Vec::new(),
        }
    }


    /// Construct a subset split on a categorical feature.
    /// `categories` are the categories sent to the left.
    #[inline]
    pub fn categorical(feature: usize, mut categories: Vec<f64>) -> Self {
        categories.sort_by(|a, b| a.total_cmp(b));
        Self {
            feature,
            threshold: f64::MIN,
            feature_type: FeatureType::Categorical,
            categories,
        }
    }


    /// Defines the splitting.
    #[inline]
    pub fn split(&self, features: &Vector) -> LeftRight {
        if self.goes_left(features) { LeftRight::Left } else { LeftRight::Right }
    }


    /// Returns `true` if `features` is sent to the left child.
    #[inline]
    pub fn goes_left(&self, features: &Vector) -> bool {
        let value = features[self.feature];
        match self.feature_type {
            FeatureType::Continuous => value <= self.threshold,
            FeatureType::Categorical => self.categories.contains(&value),
        }
    }


    /// Returns a description of one side of this split,
    /// e.g., `(feature 0 <= 0.5)` or `(feature 1 not in {0.0})`.
    pub(crate) fn describe(&self, side: LeftRight) -> String {
        let feature = self.feature;
        match (self.feature_type, side) {
            (FeatureType::Continuous, LeftRight::Left) => {
                format!("(feature {feature} <= {:?})", self.threshold)
            },
            (FeatureType::Continuous, LeftRight::Right) => {
                format!("(feature {feature} > {:?})", self.threshold)
            },
            (FeatureType::Categorical, LeftRight::Left) => {
                format!("(feature {feature} in {})", self.category_set())
            },
            (FeatureType::Categorical, LeftRight::Right) => {
                format!("(feature {feature} not in {})", self.category_set())
            },
        }
    }


    fn category_set(&self) -> String {
        let categories = self.categories.iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{categories}}}")
    }
}


impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe(LeftRight::Left))
    }
}
