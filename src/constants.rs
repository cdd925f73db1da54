//! Default values shared across the crate.

pub const DEFAULT_MASTER:   &str = "local";
pub const DEFAULT_APP_NAME: &str = "minitree";

pub const DEFAULT_NUM_CLASSES:            usize = 2;
pub const DEFAULT_MAX_BINS:               usize = 32;
pub const DEFAULT_MAX_DEPTH:              usize = 10;
pub const DEFAULT_MIN_INSTANCES_PER_NODE: usize = 1;
pub const DEFAULT_MIN_INFO_GAIN:          f64   = 0.0;
pub const DEFAULT_SEED:                   u64   = 42;

/// Node ids are stored in heap order,
/// so the depth is bounded to keep them representable.
pub const MAX_DEPTH_LIMIT: usize = 30;

/// The minimal number of rows sampled to find continuous splits.
pub const MIN_SPLIT_SAMPLES: usize = 10_000;
