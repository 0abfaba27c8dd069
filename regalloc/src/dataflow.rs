use std::fmt;

use cfg::{BlockId, ControlFlowGraph, InstId, Opcode};
use util::{Map, Set, Slot};

use super::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFlowNode {
    pub inst: InstId,
    pub def: Option<Slot>,
    pub used: Option<Slot>,
    pub preds: Set<NodeId>,
    pub succs: Set<NodeId>,
    pub live_in: LiveSet,
    pub live_out: LiveSet,
}

impl DataFlowNode {
    fn new(inst: InstId, opcode: &Opcode) -> Self {
        // only instructions naming a slot take part in liveness
        let (def, used) = match opcode {
            Opcode::Load(x) => (None, Some(*x)),
            Opcode::Store(x) => (Some(*x), None),
            Opcode::Jump(..) | Opcode::Other(..) => (None, None),
        };

        Self {
            inst,
            def,
            used,
            preds: Set::default(),
            succs: Set::default(),
            live_in: LiveSet::default(),
            live_out: LiveSet::default(),
        }
    }
}

/// One node per instruction, with instruction-level flow edges.
#[derive(Debug, Clone)]
pub struct DataFlowGraph {
    pub(crate) nodes: Vec<DataFlowNode>,
    by_inst: Map<InstId, NodeId>,
}

// first instructions reached on entering `bid`; blocks that kept only their
// label are looked through
fn entry_nodes(
    cfg: &ControlFlowGraph,
    bid: BlockId,
    by_inst: &Map<InstId, NodeId>,
    visited: &mut Set<BlockId>,
    res: &mut Vec<NodeId>,
) {
    if !visited.insert(bid) {
        return;
    }

    match cfg[bid].insts.first() {
        Some(i) => res.push(by_inst[i]),
        None => {
            for s in util::sorted(&cfg[bid].succs) {
                entry_nodes(cfg, s, by_inst, visited, res);
            }
        }
    }
}

impl DataFlowGraph {
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Self {
        let mut nodes = Vec::with_capacity(cfg.inst_count());
        let mut by_inst = Map::default();
        for inst in cfg.instructions() {
            by_inst.insert(inst.id, nodes.len());
            nodes.push(DataFlowNode::new(inst.id, &inst.opcode));
        }

        let mut g = Self { nodes, by_inst };

        for block in cfg.blocks() {
            for pair in block.insts.windows(2) {
                g.link(g.by_inst[&pair[0]], g.by_inst[&pair[1]]);
            }

            let last = match block.insts.last() {
                Some(i) => g.by_inst[i],
                None => continue,
            };

            let mut visited = Set::default();
            let mut targets = vec![];
            for s in util::sorted(&block.succs) {
                entry_nodes(cfg, s, &g.by_inst, &mut visited, &mut targets);
            }
            for t in targets {
                g.link(last, t);
            }
        }

        log::debug!(
            "dataflow graph: {} nodes, {} edges",
            g.nodes.len(),
            g.nodes.iter().map(|n| n.succs.len()).sum::<usize>()
        );

        g
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from].succs.insert(to);
        self.nodes[to].preds.insert(from);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DataFlowNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[DataFlowNode] {
        &self.nodes
    }

    /// Nodes without successors: where execution leaves the method.
    pub fn exits(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|n| self.nodes[*n].succs.is_empty())
            .collect()
    }
}

impl fmt::Display for DataFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, n) in self.nodes.iter().enumerate() {
            write!(f, "{i:>4}: in ")?;
            util::format_vec(f, &util::sorted(&n.live_in), "{", ", ", "}")?;
            write!(f, " out ")?;
            util::format_vec(f, &util::sorted(&n.live_out), "{", ", ", "}")?;
            write!(f, " -> ")?;
            util::format_vec(f, &util::sorted(&n.succs), "[", ", ", "]")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfg::{build, Cond, Event, Head};

    fn load(s: u16) -> Event {
        Event::Emit(Opcode::Load(Slot(s)))
    }

    fn store(s: u16) -> Event {
        Event::Emit(Opcode::Store(Slot(s)))
    }

    fn emit(m: &str) -> Event {
        Event::Emit(Opcode::other(m, &[]))
    }

    #[test]
    fn straight_line_chain() {
        let cfg = build(Head::default(), vec![emit("ldc"), store(1), load(1), emit("return")]).unwrap();
        let g = DataFlowGraph::from_cfg(&cfg);
        assert_eq!(g.len(), 4);
        assert_eq!(util::sorted(&g.node(0).succs), vec![1]);
        assert_eq!(util::sorted(&g.node(2).preds), vec![1]);
        assert_eq!(g.node(1).def, Some(Slot(1)));
        assert_eq!(g.node(2).used, Some(Slot(1)));
        assert_eq!(g.node(0).def, None);
        assert_eq!(g.node(0).used, None);
        assert_eq!(g.exits(), vec![3]);
    }

    #[test]
    fn block_edges_reach_every_successor() {
        // 0: load 1; 1: ifeq Else; 2: store 2; 3: goto End; Else: 4: store 3; End: 5: return
        let cfg = build(
            Head::default(),
            vec![
                load(1),
                Event::Jump(Cond::Eq, "Else".into()),
                store(2),
                Event::Jump(Cond::Always, "End".into()),
                Event::Label("Else".into()),
                store(3),
                Event::Label("End".into()),
                emit("return"),
            ],
        )
        .unwrap();
        let g = DataFlowGraph::from_cfg(&cfg);
        assert_eq!(g.len(), 6);
        assert_eq!(util::sorted(&g.node(1).succs), vec![2, 4]);
        assert_eq!(util::sorted(&g.node(3).succs), vec![5]);
        assert_eq!(util::sorted(&g.node(5).preds), vec![3, 4]);
    }

    #[test]
    fn looks_through_labeled_empty_blocks() {
        let cfg = build(
            Head::default(),
            vec![
                load(1),
                Event::Label("A".into()),
                Event::Label("B".into()),
                emit("return"),
            ],
        )
        .unwrap();
        let g = DataFlowGraph::from_cfg(&cfg);
        assert_eq!(util::sorted(&g.node(0).succs), vec![1]);
    }

    #[test]
    fn empty_loop_of_labels_terminates() {
        // `A: goto A` with an empty labeled block in front
        let cfg = build(
            Head::default(),
            vec![
                load(1),
                Event::Label("A".into()),
                Event::Label("B".into()),
                Event::Jump(Cond::Always, "A".into()),
            ],
        )
        .unwrap();
        let g = DataFlowGraph::from_cfg(&cfg);
        assert_eq!(g.len(), 2);
        assert_eq!(util::sorted(&g.node(0).succs), vec![1]);
        assert_eq!(util::sorted(&g.node(1).succs), vec![1]);
    }
}
