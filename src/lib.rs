//! stencil1d: one-dimensional iterative averaging on cooperating workers
//!
//! Each sweep replaces every interior point `j` of `[1..n]` with the mean of
//! its two neighbours. Three engines run the same sweeps: a sequential
//! reference, a parallel engine that meets at a global barrier every
//! iteration, and a pipelined "fuzzy barrier" engine whose workers only wait
//! on their immediate neighbours' phase counters.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod engine;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use self::config::*;
pub use self::context::*;
pub use self::core::*;
pub use self::engine::*;
pub use self::error::*;
pub use self::parallel::{Cancel, Interrupt};
pub use self::utils::*;
