//! Defines [`LabeledPoint`], a pair of a label and a feature vector.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;

use super::vector::Vector;
use crate::error::{Result, TreeError};


/// A training example.
/// For classification, `label` is a class index `0.0, 1.0, ...`.
/// For regression, `label` is the real-valued target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    label: f64,
    features: Vector,
}


impl LabeledPoint {
    /// Construct a new instance of [`LabeledPoint`].
    #[inline]
    pub fn new<V: Into<Vector>>(label: f64, features: V) -> Self {
        Self { label, features: features.into() }
    }


    /// Returns the label.
    #[inline]
    pub fn label(&self) -> f64 {
        self.label
    }


    /// Returns the feature vector.
    #[inline]
    pub fn features(&self) -> &Vector {
        &self.features
    }
}


impl fmt::Display for LabeledPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?},{})", self.label, self.features)
    }
}


impl FromStr for LabeledPoint {
    type Err = TreeError;

    /// Parses `(label,[v0,v1,...])`, `(label,(size,[i...],[v...]))`,
    /// or the plain form `label,v0 v1 ...`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (label, features) = match s.strip_prefix('(') {
            Some(rest) => {
                let inner = rest.strip_suffix(')')
                    .ok_or_else(|| parse_error(format!("unbalanced `{s}`")))?;
                let (label, features) = inner.split_once(',')
                    .ok_or_else(|| parse_error(format!("no features in `{s}`")))?;
                (label, features.parse::<Vector>()?)
            },
            None => {
                let (label, features) = s.split_once(',')
                    .ok_or_else(|| parse_error(format!("no features in `{s}`")))?;
                let values = features.split_whitespace()
                    .map(|x| {
                        x.parse::<f64>()
                            .map_err(|e| parse_error(format!("invalid `{x}`: {e}")))
                    })
                    .collect::<Result<Vec<_>>>()?;
                (label, Vector::dense(values))
            },
        };

        let label = label.trim()
            .parse::<f64>()
            .map_err(|e| parse_error(format!("invalid label `{label}`: {e}")))?;

        Ok(Self::new(label, features))
    }
}


fn parse_error(message: String) -> TreeError {
    TreeError::Parse { line: 1, message }
}
