pub mod dataset;
pub mod memory;

mod error;

pub use dataset::{Dataset, Hierarchy};
pub use error::Error;
pub use memory::MemoryStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;
