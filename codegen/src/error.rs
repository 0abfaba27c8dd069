use thiserror::Error;
use util::{Id, Span};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("operand stack underflow")]
    Underflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("variable `{0}` has no slot in the symbol table")]
    Undeclared(Id, Span),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Cfg(#[from] cfg::CfgError),
}
