use std::fmt;

use ast::SymbolTable;
use cfg::ControlFlowGraph;
use util::{Id, Slot};

use super::dataflow::DataFlowGraph;
use super::error::RegAllocError;
use super::interference::InterferenceGraph;
use super::types::*;

/// Result of coloring: how many registers are needed and which one each
/// declared variable gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub registers: usize,
    // ascending slot order
    pub assignment: Vec<(Id, Slot, Color)>,
}

impl Allocation {
    pub fn color_of(&self, name: &str) -> Option<Color> {
        self.assignment
            .iter()
            .find(|(x, _, _)| x == name)
            .map(|(_, _, c)| *c)
    }

    pub fn color_of_slot(&self, slot: Slot) -> Option<Color> {
        self.assignment
            .iter()
            .find(|(_, s, _)| *s == slot)
            .map(|(_, _, c)| *c)
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "registers: {}", self.registers)?;
        for (x, slot, c) in &self.assignment {
            writeln!(f, "    {x} (slot {slot}) => r{c}")?;
        }
        Ok(())
    }
}

/// Liveness and coloring for a finished graph. The data-flow graph comes
/// back solved, so callers can inspect the live sets without re-running the
/// fixpoint.
pub fn do_regalloc(
    cfg: &ControlFlowGraph,
    symbols: &SymbolTable,
) -> Result<(DataFlowGraph, InterferenceGraph, Allocation), RegAllocError> {
    log::info!("register allocation for `{}` started", cfg.head.class);

    let mut g = DataFlowGraph::from_cfg(cfg);
    let mut ig = InterferenceGraph::from_dataflow(&mut g, symbols)?;
    let alloc = ig.color();

    debug_assert!(ig.is_valid_coloring());
    log::info!(
        "{} variables in {} registers",
        alloc.assignment.len(),
        alloc.registers
    );

    Ok((g, ig, alloc))
}
