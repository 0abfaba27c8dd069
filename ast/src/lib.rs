pub mod symbol;
pub mod syntax;

pub use symbol::SymbolTable;
pub use syntax::*;
