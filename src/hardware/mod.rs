pub mod keyboard;
pub mod memory;
pub mod registers;

pub use memory::{LoadReport, Memory, MemoryMappedIOLocations};
pub use registers::{ConditionFlag, Registers};
