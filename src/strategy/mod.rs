//! Parsing Strategies
//!
//! - Parallel: batch parsing of independent inputs across threads

#[cfg(feature = "parallel")]
pub mod parallel;
