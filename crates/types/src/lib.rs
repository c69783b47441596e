// crates/types/src/lib.rs
pub mod pack;
pub mod subject;

pub use pack::*;
pub use subject::*;
