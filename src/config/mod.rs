pub mod options;
pub use options::{RemainderPolicy, RunOptions, Strategy};
