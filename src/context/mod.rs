//! Context module for stencil1d.
//!
//! Contexts turn a [`RunOptions`](crate::config::RunOptions) into a
//! configured engine and run it.
//!
//! Modules:
//! - [`run_context`]: the `RunContext` factory.

pub mod run_context;
pub use run_context::RunContext;
