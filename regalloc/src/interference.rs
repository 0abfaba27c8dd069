use std::iter;

use ast::SymbolTable;
use util::{Id, Map, Set, Slot};

use super::dataflow::DataFlowGraph;
use super::error::RegAllocError;
use super::regalloc::Allocation;
use super::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceNode {
    pub slot: Slot,
    pub name: Id,
    pub neighbors: Set<usize>,
    pub color: Color,
}

/// Undirected graph over the declared slots; nodes are kept in ascending
/// slot order.
#[derive(Debug, Clone)]
pub struct InterferenceGraph {
    nodes: Vec<InterferenceNode>,
    index: Map<Slot, usize>,
}

impl InterferenceGraph {
    fn new(symbols: &SymbolTable) -> Self {
        let mut nodes = Vec::with_capacity(symbols.len());
        let mut index = Map::default();
        for (name, slot) in symbols.iter() {
            index.insert(slot, nodes.len());
            nodes.push(InterferenceNode {
                slot,
                name: name.clone(),
                neighbors: Set::default(),
                color: 0,
            });
        }
        Self { nodes, index }
    }

    fn lookup(&self, slot: Slot) -> Result<usize, RegAllocError> {
        self.index
            .get(&slot)
            .copied()
            .ok_or(RegAllocError::UndeclaredSlot(slot))
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        self.nodes[u].neighbors.insert(v);
        self.nodes[v].neighbors.insert(u);
    }

    /// Builds the graph from already solved live-out sets: two slots
    /// interfere if they are live out of the same instruction.
    pub fn from_liveness(g: &DataFlowGraph, symbols: &SymbolTable) -> Result<Self, RegAllocError> {
        let mut ig = Self::new(symbols);

        for node in g.nodes() {
            for x in node.def.iter().chain(&node.used) {
                ig.lookup(*x)?;
            }

            let live = util::sorted(&node.live_out);
            let live = live
                .iter()
                .map(|x| ig.lookup(*x))
                .collect::<Result<Vec<_>, _>>()?;
            for (i, u) in live.iter().enumerate() {
                for v in &live[i + 1..] {
                    ig.add_edge(*u, *v);
                }
            }
        }

        log::debug!(
            "interference graph: {} nodes, {} edges",
            ig.nodes.len(),
            ig.edges().count()
        );

        Ok(ig)
    }

    /// Runs the liveness fixpoint on `g`, then builds the graph from the
    /// resulting live-out sets.
    pub fn from_dataflow(g: &mut DataFlowGraph, symbols: &SymbolTable) -> Result<Self, RegAllocError> {
        g.solve();
        Self::from_liveness(g, symbols)
    }

    pub fn nodes(&self) -> &[InterferenceNode] {
        &self.nodes
    }

    pub fn interferes(&self, a: Slot, b: Slot) -> bool {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(u), Some(v)) => self.nodes[*u].neighbors.contains(v),
            _ => false,
        }
    }

    /// Each edge once, as `(a, b)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (Slot, Slot)> + '_ {
        self.nodes.iter().enumerate().flat_map(move |(u, n)| {
            util::sorted(&n.neighbors)
                .into_iter()
                .filter(move |v| *v > u)
                .map(move |v| (n.slot, self.nodes[v].slot))
        })
    }

    /// Greedy coloring in ascending slot order: each node takes the smallest
    /// color not already taken by a colored neighbor. Always valid, not
    /// necessarily minimal.
    pub fn color(&mut self) -> Allocation {
        for n in &mut self.nodes {
            n.color = 0;
        }

        for u in 0..self.nodes.len() {
            let taken: Set<Color> = self.nodes[u]
                .neighbors
                .iter()
                .map(|v| self.nodes[*v].color)
                .filter(|c| *c != 0)
                .collect();

            let mut c = 1;
            while taken.contains(&c) {
                c += 1;
            }
            self.nodes[u].color = c;
            log::trace!("`{}` (slot {}) -> r{}", self.nodes[u].name, self.nodes[u].slot, c);
        }

        let registers = self.nodes.iter().map(|n| n.color).collect::<Set<_>>().len();
        let assignment = self
            .nodes
            .iter()
            .map(|n| (n.name.clone(), n.slot, n.color))
            .collect();

        Allocation {
            registers,
            assignment,
        }
    }

    pub fn is_valid_coloring(&self) -> bool {
        self.nodes.iter().all(|n| {
            n.color != 0 && n.neighbors.iter().all(|v| self.nodes[*v].color != n.color)
        })
    }

    /// Graphviz description, one line at a time.
    pub fn dot(&self) -> impl Iterator<Item = String> + '_ {
        let nodes = self.nodes.iter().map(|n| {
            let label = if n.color == 0 {
                format!("{} ({})", n.name, n.slot)
            } else {
                format!("{} ({}) r{}", n.name, n.slot, n.color)
            };
            format!("    v{} [label=\"{}\"];", n.slot, label.replace('"', "\\\""))
        });
        let edges = self.edges().map(|(a, b)| format!("    v{a} -- v{b};"));

        iter::once("graph interference {".to_string())
            .chain(nodes)
            .chain(edges)
            .chain(iter::once("}".to_string()))
    }
}
