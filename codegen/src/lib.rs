mod convert;
mod error;
mod stack;

pub use convert::convert;
pub use error::{ConvertError, StackError};
pub use stack::{max_stack_depth, StackModel};
