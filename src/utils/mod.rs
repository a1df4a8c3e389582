pub mod partition;
pub use partition::{Chunk, owner_of, partition};

pub mod stats;
pub use stats::{FinalBuffer, RunStats};
