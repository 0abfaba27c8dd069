use thiserror::Error;
use util::Slot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegAllocError {
    #[error("slot {0} is used but not declared in the symbol table")]
    UndeclaredSlot(Slot),
}
