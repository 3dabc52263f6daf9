//! Analytics over recorded interactions.

pub mod aggregator;

pub use aggregator::*;
