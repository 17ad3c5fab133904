pub mod common;
pub mod generation;
pub mod storage;

pub use common::*;
pub use generation::*;
pub use storage::*;
