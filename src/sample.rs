//! Labeled data points and the readers that load them.

pub mod vector;
pub mod labeled_point;
pub mod reader;


pub use vector::Vector;
pub use labeled_point::LabeledPoint;
pub use reader::{SampleReader, Format};
