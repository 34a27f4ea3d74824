//! Analysis modules.
//!
//! Rollups of country records and classification of German regions.

pub mod aggregator;
pub mod regions;

pub use aggregator::*;
pub use regions::{classify, Bucket, RegionRecord, Selection};
