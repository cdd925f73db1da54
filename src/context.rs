//! Defines the local execution context.
//! A [`Context`] owns a thread pool and turns in-memory data
//! into partitioned [`Dataset`]s that are processed on that pool.
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};

use std::fmt;
use std::sync::Arc;

use crate::constants::{DEFAULT_APP_NAME, DEFAULT_MASTER};
use crate::error::{Result, TreeError};
use crate::Dataset;


/// A struct that builds [`Context`].
///
/// # Example
/// ```
/// use minitree::Context;
///
/// let context = Context::builder()
///     .master("local[2]")
///     .app_name("DecisionTreeSuite")
///     .build()
///     .unwrap();
/// assert_eq!(context.default_parallelism(), 2);
/// context.stop();
/// ```
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    master: String,
    app_name: String,
}


impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            master: DEFAULT_MASTER.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}


impl ContextBuilder {
    /// Set the master string.
    /// Accepted forms are `local`, `local[N]`, and `local[*]`.
    pub fn master<S: AsRef<str>>(mut self, master: S) -> Self {
        self.master = master.as_ref().to_string();
        self
    }


    /// Set the application name.
    /// Worker threads are named after it.
    pub fn app_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.app_name = name.as_ref().to_string();
        self
    }


    /// Build a [`Context`].
    /// This method consumes `self`.
    pub fn build(self) -> Result<Context> {
        let parallelism = parse_master(&self.master)?;

        let name = self.app_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(move |i| format!("{name}-worker-{i}"))
            .build()?;

        info!(
            "Started context `{}` (master: {}, threads: {parallelism})",
            self.app_name, self.master,
        );

        Ok(Context {
            master: self.master,
            app_name: self.app_name,
            parallelism,
            pool: Arc::new(pool),
        })
    }
}


/// A single-process execution context.
/// Every [`Dataset`] created from a context runs
/// its parallel operations on the context's thread pool.
pub struct Context {
    master: String,
    app_name: String,
    parallelism: usize,
    pool: Arc<ThreadPool>,
}


impl Context {
    /// Returns a [`ContextBuilder`] with master `local`.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }


    /// Shorthand for `Context::builder().master(..).app_name(..).build()`.
    pub fn new<S, T>(master: S, app_name: T) -> Result<Self>
        where S: AsRef<str>,
              T: AsRef<str>,
    {
        Self::builder()
            .master(master)
            .app_name(app_name)
            .build()
    }


    /// Returns the master string.
    pub fn master(&self) -> &str {
        &self.master
    }


    /// Returns the application name.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }


    /// Returns the number of worker threads,
    /// which is also the default number of partitions.
    pub fn default_parallelism(&self) -> usize {
        self.parallelism
    }


    /// Distribute `data` over `default_parallelism` partitions.
    pub fn parallelize<T>(&self, data: Vec<T>) -> Dataset<T> {
        self.parallelize_with_partitions(data, self.parallelism)
    }


    /// Distribute `data` over `n_partitions` partitions.
    /// The order of `data` is kept:
    /// partition `i` holds a contiguous slice of the input.
    pub fn parallelize_with_partitions<T>(&self, data: Vec<T>, n_partitions: usize)
        -> Dataset<T>
    {
        let dataset = Dataset::from_vec(
            data, n_partitions, Arc::clone(&self.pool)
        );
        debug!(
            "Parallelized {} rows into {} partitions",
            dataset.count(), dataset.num_partitions(),
        );
        dataset
    }


    /// Stop this context.
    /// Datasets created from it keep working until they are dropped.
    pub fn stop(self) {
        info!("Stopped context `{}`", self.app_name);
    }
}


impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("master", &self.master)
            .field("app_name", &self.app_name)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}


/// Returns the number of worker threads for the given master string.
fn parse_master(master: &str) -> Result<usize> {
    let master = master.trim();
    if master == "local" {
        return Ok(1);
    }

    let inner = master.strip_prefix("local[")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| TreeError::InvalidMaster(master.to_string()))?;

    if inner == "*" {
        let n = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        return Ok(n);
    }

    match inner.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TreeError::InvalidMaster(master.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_master_local() {
        let result = parse_master("local").unwrap();
        let expect = 1;
        assert_eq!(expect, result, "expected {expect}, got {result}.");
    }

    #[test]
    fn test_parse_master_local_n() {
        let result = parse_master("local[4]").unwrap();
        let expect = 4;
        assert_eq!(expect, result, "expected {expect}, got {result}.");
    }

    #[test]
    fn test_parse_master_local_star() {
        let result = parse_master("local[*]").unwrap();
        assert!(result >= 1, "expected a positive count, got {result}.");
    }

    #[test]
    fn test_parse_master_rejects_others() {
        for master in ["yarn", "local[0]", "local[x]", "local[2", "cluster://h:7077"] {
            let result = parse_master(master);
            assert!(
                matches!(result, Err(TreeError::InvalidMaster(_))),
                "expected InvalidMaster for {master}, got {result:?}."
            );
        }
    }

    #[test]
    fn test_parallelize_keeps_order() {
        let context = Context::new("local[3]", "test").unwrap();
        let data = (0..10).collect::<Vec<usize>>();
        let dataset = context.parallelize(data.clone());

        assert_eq!(3, dataset.num_partitions());
        assert_eq!(10, dataset.count());

        let result = dataset.collect();
        assert_eq!(data, result, "expected {data:?}, got {result:?}.");
        context.stop();
    }
}
