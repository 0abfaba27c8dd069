mod builder;
mod dot;
mod error;
mod graph;
mod inst;
mod purge;

pub use builder::{build, Builder, Event, UnresolvedJumps};
pub use error::CfgError;
pub use graph::{BasicBlock, BlockId, ControlFlowGraph, Head};
pub use inst::{Cond, InstId, Instruction, Label, Opcode};
