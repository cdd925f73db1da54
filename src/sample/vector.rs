//! Defines the feature vector type.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::{Result, TreeError};


const ZERO: f64 = 0.0;


/// A feature vector.
/// `Vector::Sparse` stores the non-zero entries only,
/// with strictly increasing `indices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Vector {
    /// All entries are stored.
    Dense(Vec<f64>),
    /// Only the listed entries are non-zero.
    Sparse {
        /// The dimension of the vector.
        size: usize,
        /// Positions of the stored entries.
        indices: Vec<usize>,
        /// Values of the stored entries.
        values: Vec<f64>,
    },
}


impl Vector {
    /// Construct a dense vector.
    #[inline]
    pub fn dense(values: Vec<f64>) -> Self {
        Self::Dense(values)
    }


    /// Construct a sparse vector of dimension `size`.
    /// Returns `Err` if `indices` and `values` differ in length,
    /// or `indices` is not strictly increasing in `[0, size)`.
    pub fn sparse(size: usize, indices: Vec<usize>, values: Vec<f64>)
        -> Result<Self>
    {
        if indices.len() != values.len() {
            return Err(parse_error(format!(
                "sparse vector has {} indices but {} values",
                indices.len(), values.len(),
            )));
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(parse_error(
                "sparse vector indices must be strictly increasing"
            ));
        }
        if let Some(&last) = indices.last() {
            if last >= size {
                return Err(parse_error(format!(
                    "index {last} is out of range for a vector of size {size}"
                )));
            }
        }
        Ok(Self::Sparse { size, indices, values })
    }


    /// Returns the dimension of this vector.
    #[inline]
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(values) => values.len(),
            Self::Sparse { size, .. } => *size,
        }
    }


    /// Returns the `i`-th entry.
    /// Panics if `i` is out of range.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self[i]
    }


    /// Returns all the entries as a `Vec<f64>`.
    pub fn to_dense(&self) -> Vec<f64> {
        match self {
            Self::Dense(values) => values.clone(),
            Self::Sparse { size, indices, values } => {
                let mut dense = vec![0f64; *size];
                indices.iter()
                    .zip(values)
                    .for_each(|(&i, &v)| { dense[i] = v; });
                dense
            },
        }
    }


    /// Returns an iterator over the stored `(index, value)` pairs.
    /// For a sparse vector, the implicit zeros are skipped.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        match self {
            Self::Dense(values) => {
                Box::new(values.iter().copied().enumerate())
            },
            Self::Sparse { indices, values, .. } => {
                Box::new(indices.iter().copied().zip(values.iter().copied()))
            },
        }
    }
}


impl Index<usize> for Vector {
    type Output = f64;
    fn index(&self, i: usize) -> &Self::Output {
        match self {
            Self::Dense(values) => &values[i],
            Self::Sparse { size, indices, values } => {
                assert!(i < *size, "index {i} is out of range for size {size}");
                match indices.binary_search(&i) {
                    Ok(pos) => &values[pos],
                    Err(_) => &ZERO,
                }
            },
        }
    }
}


impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self::Dense(values)
    }
}


impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense(values) => {
                write!(f, "[{}]", join(values))
            },
            Self::Sparse { size, indices, values } => {
                let indices = indices.iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "({size},[{indices}],[{}])", join(values))
            },
        }
    }
}


impl FromStr for Vector {
    type Err = TreeError;

    /// Parses `[v0,v1,...]` as a dense vector and
    /// `(size,[i0,i1,...],[v0,v1,...])` as a sparse one.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return parse_list::<f64>(inner).map(Self::Dense);
        }

        let inner = s.strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| parse_error(format!("`{s}` is not a vector")))?;

        let (size, rest) = inner.split_once(',')
            .ok_or_else(|| parse_error(format!("`{s}` is not a sparse vector")))?;
        let size = size.trim()
            .parse::<usize>()
            .map_err(|e| parse_error(format!("invalid size `{size}`: {e}")))?;

        let (indices, values) = rest.trim()
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .and_then(|r| r.split_once("],["))
            .ok_or_else(|| parse_error(format!("`{s}` is not a sparse vector")))?;

        let indices = parse_list::<usize>(indices)?;
        let values = parse_list::<f64>(values)?;
        Self::sparse(size, indices, values)
    }
}


fn join(values: &[f64]) -> String {
    values.iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(",")
}


fn parse_list<T>(s: &str) -> Result<Vec<T>>
    where T: FromStr,
          T::Err: fmt::Display,
{
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|x| {
            let x = x.trim();
            x.parse::<T>()
                .map_err(|e| parse_error(format!("invalid entry `{x}`: {e}")))
        })
        .collect()
}


fn parse_error<S: Into<String>>(message: S) -> TreeError {
    TreeError::Parse { line: 1, message: message.into() }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_get() {
        let v = Vector::sparse(4, vec![1, 3], vec![2.0, 5.0]).unwrap();
        let result = (0..4).map(|i| v.get(i)).collect::<Vec<_>>();
        let expect = vec![0.0, 2.0, 0.0, 5.0];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
        assert_eq!(expect, v.to_dense());
    }

    #[test]
    fn test_sparse_rejects_unsorted_indices() {
        let result = Vector::sparse(4, vec![3, 1], vec![2.0, 5.0]);
        assert!(result.is_err(), "expected an error, got {result:?}.");

        let result = Vector::sparse(2, vec![0, 2], vec![2.0, 5.0]);
        assert!(result.is_err(), "expected an error, got {result:?}.");
    }

    #[test]
    fn test_display_dense() {
        let v = Vector::dense(vec![0.0, 1.5]);
        let result = format!("{v}");
        let expect = "[0.0,1.5]".to_string();
        assert_eq!(expect, result, "expected {expect}, got {result}.");
    }

    #[test]
    fn test_display_sparse() {
        let v = Vector::sparse(3, vec![1], vec![1.0]).unwrap();
        let result = format!("{v}");
        let expect = "(3,[1],[1.0])".to_string();
        assert_eq!(expect, result, "expected {expect}, got {result}.");
    }

    #[test]
    fn test_parse_dense_and_sparse() {
        let result = " [1.0, -2.5 ,3] ".parse::<Vector>().unwrap();
        let expect = Vector::dense(vec![1.0, -2.5, 3.0]);
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");

        let result = "(5,[0,4],[1.0,2.0])".parse::<Vector>().unwrap();
        let expect = Vector::sparse(5, vec![0, 4], vec![1.0, 2.0]).unwrap();
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");

        let result = "[]".parse::<Vector>().unwrap();
        assert_eq!(0, result.size());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for s in ["1.0,2.0", "[1.0,x]", "(3,[1])", "(a,[1],[1.0])"] {
            let result = s.parse::<Vector>();
            assert!(result.is_err(), "expected an error for {s}, got {result:?}.");
        }
    }

    #[test]
    fn test_iter_skips_implicit_zeros() {
        let v = Vector::sparse(10, vec![2, 7], vec![1.0, 3.0]).unwrap();
        let result = v.iter().collect::<Vec<_>>();
        let expect = vec![(2, 1.0), (7, 3.0)];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }
}
