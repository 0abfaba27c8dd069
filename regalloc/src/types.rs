use util::{Set, Slot};

/// Index into `DataFlowGraph::nodes`.
pub type NodeId = usize;

pub type LiveSet = Set<Slot>;

/// Register number; 0 means not yet colored.
pub type Color = u32;
