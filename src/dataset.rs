//! Defines [`Dataset`], a partitioned in-memory collection.
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rayon::prelude::*;
use rayon::ThreadPool;

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TreeError};


/// A collection of rows split into partitions.
/// Parallel operations process one partition per task
/// on the thread pool of the [`Context`](crate::Context)
/// that created this dataset.
///
/// Every operation keeps the partitioning and the row order,
/// so two datasets derived from the same source can be zipped.
pub struct Dataset<T> {
    partitions: Vec<Vec<T>>,
    pool: Arc<ThreadPool>,
}


impl<T> Dataset<T> {
    /// Split `data` into `n_partitions` contiguous partitions.
    pub(crate) fn from_vec(
        data: Vec<T>,
        n_partitions: usize,
        pool: Arc<ThreadPool>,
    ) -> Self
    {
        let n_partitions = n_partitions.max(1);
        let len = data.len();

        let mut iter = data.into_iter();
        let partitions = (0..n_partitions)
            .map(|i| {
                let start = i * len / n_partitions;
                let end = (i + 1) * len / n_partitions;
                iter.by_ref()
                    .take(end - start)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Self { partitions, pool }
    }


    /// Returns the total number of rows.
    pub fn count(&self) -> usize {
        self.partitions.iter()
            .map(|part| part.len())
            .sum::<usize>()
    }


    /// Returns `true` if this dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }


    /// Returns the number of partitions.
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }


    /// Returns the partitions.
    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions[..]
    }


    /// Returns an iterator over the rows in partition order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flatten()
    }


    /// Consume `self` and returns the rows in partition order.
    pub fn collect(self) -> Vec<T> {
        self.partitions.into_iter()
            .flatten()
            .collect()
    }


    /// Run `op` on the thread pool of this dataset.
    pub fn install<OP, R>(&self, op: OP) -> R
        where OP: FnOnce() -> R + Send,
              R: Send,
    {
        self.pool.install(op)
    }


    fn with_partitions<U>(&self, partitions: Vec<Vec<U>>) -> Dataset<U> {
        Dataset { partitions, pool: Arc::clone(&self.pool) }
    }
}


impl<T: Sync> Dataset<T> {
    /// Apply `f` to each row.
    pub fn map<U, F>(&self, f: F) -> Dataset<U>
        where U: Send,
              F: Fn(&T) -> U + Sync + Send,
    {
        let partitions = self.pool.install(|| {
            self.partitions.par_iter()
                .map(|part| part.iter().map(&f).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        });
        self.with_partitions(partitions)
    }


    /// Apply the fallible `f` to each row.
    /// Returns the first error encountered, if any.
    pub fn try_map<U, F>(&self, f: F) -> Result<Dataset<U>>
        where U: Send,
              F: Fn(&T) -> Result<U> + Sync + Send,
    {
        let partitions = self.pool.install(|| {
            self.partitions.par_iter()
                .map(|part| part.iter().map(&f).collect::<Result<Vec<_>>>())
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(self.with_partitions(partitions))
    }


    /// Apply `f` to pairs of rows of `self` and `other`.
    /// Both datasets must have the same partitioning,
    /// e.g., `other` is derived from `self` by [`Dataset::map`].
    /// Otherwise, returns [`TreeError::PartitionMismatch`].
    pub fn zip_map<U, V, F>(&self, other: &Dataset<U>, f: F)
        -> Result<Dataset<V>>
        where U: Sync,
              V: Send,
              F: Fn(&T, &U) -> V + Sync + Send,
    {
        if self.num_partitions() != other.num_partitions() {
            return Err(TreeError::PartitionMismatch(format!(
                "{} partitions against {}",
                self.num_partitions(), other.num_partitions(),
            )));
        }
        let mismatch = self.partitions.iter()
            .zip(&other.partitions)
            .position(|(lhs, rhs)| lhs.len() != rhs.len());
        if let Some(i) = mismatch {
            return Err(TreeError::PartitionMismatch(format!(
                "partition {i} has {} rows against {}",
                self.partitions[i].len(), other.partitions[i].len(),
            )));
        }

        let partitions = self.pool.install(|| {
            self.partitions.par_iter()
                .zip(other.partitions.par_iter())
                .map(|(lhs, rhs)| {
                    lhs.iter()
                        .zip(rhs)
                        .map(|(x, y)| f(x, y))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        });
        Ok(self.with_partitions(partitions))
    }


    /// Fold every row into an accumulator per partition,
    /// then combine the accumulators.
    pub fn aggregate<A, Z, S, C>(&self, zero: Z, seq: S, comb: C) -> A
        where A: Send,
              Z: Fn() -> A + Sync + Send,
              S: Fn(A, &T) -> A + Sync + Send,
              C: Fn(A, A) -> A + Sync + Send,
    {
        self.pool.install(|| {
            self.partitions.par_iter()
                .map(|part| part.iter().fold(zero(), &seq))
                .reduce(&zero, &comb)
        })
    }


    /// Compute a value from each partition and its index,
    /// then combine the values.
    /// Unlike [`Dataset::aggregate`], `fold` sees the whole partition,
    /// which lets callers visit a subset of rows by position.
    pub fn fold_partitions<A, F, C>(&self, fold: F, comb: C) -> Option<A>
        where A: Send,
              F: Fn(usize, &[T]) -> A + Sync + Send,
              C: Fn(A, A) -> A + Sync + Send,
    {
        self.pool.install(|| {
            self.partitions.par_iter()
                .enumerate()
                .map(|(i, part)| fold(i, &part[..]))
                .reduce_with(&comb)
        })
    }
}


impl<T: Clone + Send + Sync> Dataset<T> {
    /// Returns a Bernoulli sample without replacement.
    /// Each row is kept with probability `fraction`.
    /// The result only depends on `seed` and the partitioning.
    pub fn sample(&self, fraction: f64, seed: u64) -> Dataset<T> {
        let fraction = fraction.clamp(0.0, 1.0);
        let partitions = self.pool.install(|| {
            self.partitions.par_iter()
                .enumerate()
                .map(|(i, part)| {
                    if fraction >= 1.0 {
                        return part.clone();
                    }
                    let mut rng = StdRng::seed_from_u64(
                        seed.wrapping_add(i as u64)
                    );
                    part.iter()
                        .filter(|_| rng.gen_bool(fraction))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        });
        self.with_partitions(partitions)
    }
}


impl<T: Clone> Clone for Dataset<T> {
    fn clone(&self) -> Self {
        Self {
            partitions: self.partitions.clone(),
            pool: Arc::clone(&self.pool),
        }
    }
}


impl<T> fmt::Debug for Dataset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = self.partitions.iter()
            .map(|part| part.len())
            .collect::<Vec<_>>();
        f.debug_struct("Dataset")
            .field("count", &self.count())
            .field("partition_sizes", &sizes)
            .finish()
    }
}
