mod dataflow;
mod error;
mod interference;
mod liveness;
mod regalloc;
mod types;

pub use dataflow::{DataFlowGraph, DataFlowNode};
pub use error::RegAllocError;
pub use interference::{InterferenceGraph, InterferenceNode};
pub use regalloc::{do_regalloc, Allocation};
pub use types::{Color, LiveSet, NodeId};
