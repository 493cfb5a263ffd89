mod data;
mod write;

pub use data::*;
pub use write::*;
