pub mod compile;
pub mod listing;

pub use compile::*;
