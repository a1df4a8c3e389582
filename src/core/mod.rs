pub mod arena;
pub use arena::{AtomicF64, BufferArena, check_buffers};

pub mod traits;
pub use traits::AveragingEngine;
