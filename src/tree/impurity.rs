//! Impurity measures used to choose splits.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;


/// The impurity of a node.
///
/// The layout of the sufficient statistics depends on the impurity:
/// * `Gini` and `Entropy` read class counts `[n_0, n_1, ..., n_{k-1}]`.
/// * `Variance` reads `[count, sum, sum of squares]` of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impurity {
    /// Gini index `1 - sum_j p_j^2`.
    Gini,
    /// Entropy `- sum_j p_j log2 p_j`.
    Entropy,
    /// Variance of the labels. Used for regression.
    Variance,
}


impl Impurity {
    /// Returns the impurity of the given sufficient statistics.
    #[inline]
    pub fn calculate(&self, stats: &[f64]) -> f64 {
        match self {
            Self::Gini => gini(stats),
            Self::Entropy => entropy(stats),
            Self::Variance => {
                assert_eq!(stats.len(), 3, "Variance reads 3 statistics");
                variance(stats[0], stats[1], stats[2])
            },
        }
    }


    /// Returns the number of sufficient statistics per bin.
    #[inline]
    pub fn stat_size(&self, num_classes: usize) -> usize {
        match self {
            Self::Gini | Self::Entropy => num_classes,
            Self::Variance => 3,
        }
    }


    /// Returns `true` if this impurity is for classification.
    #[inline]
    pub fn is_classification(&self) -> bool {
        !matches!(self, Self::Variance)
    }
}


impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gini => "gini",
            Self::Entropy => "entropy",
            Self::Variance => "variance",
        };
        write!(f, "{name}")
    }
}


impl FromStr for Impurity {
    type Err = TreeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gini" => Ok(Self::Gini),
            "entropy" => Ok(Self::Entropy),
            "variance" => Ok(Self::Variance),
            _ => Err(TreeError::InvalidStrategy(
                format!("unknown impurity `{s}`")
            )),
        }
    }
}


/// Returns the gini-impurity of the given class counts.
#[inline]
pub fn gini(counts: &[f64]) -> f64 {
    let total = counts.iter().sum::<f64>();
    if total <= 0.0 { return 0.0; }

    let correct = counts.iter()
        .map(|&w| (w / total).powi(2))
        .sum::<f64>();

    (1.0 - correct).max(0.0)
}


/// Returns the entropic-impurity (base 2) of the given class counts.
#[inline]
pub fn entropy(counts: &[f64]) -> f64 {
    let total = counts.iter().sum::<f64>();
    if total <= 0.0 { return 0.0; }

    counts.iter()
        .map(|&w| {
            let p = w / total;
            if p <= 0.0 { 0.0 } else { -p * p.log2() }
        })
        .sum::<f64>()
}


/// Returns the variance computed from
/// the count, the sum, and the sum of squares.
#[inline]
pub fn variance(count: f64, sum: f64, sum_sq: f64) -> f64 {
    if count <= 0.0 { return 0.0; }
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}


/// Sufficient statistics of a set of rows
/// together with the impurity that reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpurityCalculator {
    impurity: Impurity,
    stats: Vec<f64>,
}


impl ImpurityCalculator {
    /// Construct a calculator from raw statistics.
    pub fn new(impurity: Impurity, stats: Vec<f64>) -> Self {
        Self { impurity, stats }
    }


    /// Construct a calculator with all-zero statistics.
    pub fn zeros(impurity: Impurity, stat_size: usize) -> Self {
        Self::new(impurity, vec![0f64; stat_size])
    }


    /// Returns the statistics.
    pub fn stats(&self) -> &[f64] {
        &self.stats[..]
    }


    /// Add the statistics of `other` to `self`.
    #[inline]
    pub fn add(&mut self, other: &Self) -> &mut Self {
        self.add_stats(&other.stats);
        self
    }


    /// Add raw statistics to `self`.
    #[inline]
    pub fn add_stats(&mut self, stats: &[f64]) -> &mut Self {
        assert_eq!(self.stats.len(), stats.len());
        self.stats.iter_mut()
            .zip(stats)
            .for_each(|(s, o)| { *s += o; });
        self
    }


    /// Subtract the statistics of `other` from `self`.
    #[inline]
    pub fn subtract(&mut self, other: &Self) -> &mut Self {
        assert_eq!(self.stats.len(), other.stats.len());
        self.stats.iter_mut()
            .zip(&other.stats)
            .for_each(|(s, o)| { *s -= o; });
        self
    }


    /// Returns the number of rows summarized by `self`.
    #[inline]
    pub fn count(&self) -> f64 {
        match self.impurity {
            Impurity::Variance => self.stats[0],
            _ => self.stats.iter().sum::<f64>(),
        }
    }


    /// Returns the impurity of the summarized rows.
    #[inline]
    pub fn calculate(&self) -> f64 {
        self.impurity.calculate(&self.stats)
    }


    /// Returns the prediction for the summarized rows:
    /// the majority class for classification,
    /// and the mean label for regression.
    /// Ties are broken in favor of the smaller class.
    pub fn predict(&self) -> f64 {
        match self.impurity {
            Impurity::Variance => {
                let count = self.stats[0];
                if count <= 0.0 { 0.0 } else { self.stats[1] / count }
            },
            _ => {
                let mut best = 0;
                for (j, &c) in self.stats.iter().enumerate() {
                    if c > self.stats[best] { best = j; }
                }
                best as f64
            },
        }
    }


    /// Returns the empirical probability of `label`.
    /// Always `0` for regression.
    pub fn prob(&self, label: f64) -> f64 {
        if !self.impurity.is_classification() {
            return 0.0;
        }
        let count = self.count();
        if count <= 0.0 {
            return 0.0;
        }
        self.stats.get(label as usize)
            .map(|c| c / count)
            .unwrap_or(0.0)
    }
}
