use super::dataflow::DataFlowGraph;
use super::types::*;

impl DataFlowGraph {
    /// Recomputes `OUT[n] = ∪ IN[s]` and `IN[n] = use[n] ∪ (OUT[n] \ def[n])`.
    /// Returns whether either set changed.
    pub fn update(&mut self, n: NodeId) -> bool {
        let mut live_out = LiveSet::default();
        for s in &self.nodes[n].succs {
            live_out.extend(self.nodes[*s].live_in.iter().copied());
        }

        let node = &self.nodes[n];
        let mut live_in: LiveSet = live_out
            .iter()
            .copied()
            .filter(|x| Some(*x) != node.def)
            .collect();
        live_in.extend(node.used);

        let changed = live_in != node.live_in || live_out != node.live_out;

        let node = &mut self.nodes[n];
        node.live_in = live_in;
        node.live_out = live_out;
        changed
    }

    /// One pass over `order`; true if any set changed.
    pub fn sweep(&mut self, order: &[NodeId]) -> bool {
        let mut changed = false;
        for n in order {
            changed |= self.update(*n);
        }
        changed
    }

    /// Sweeps in `order` until nothing changes and returns the number of
    /// passes, the last (unchanged) one included. `order` must visit every
    /// node; which permutation only affects the pass count.
    pub fn solve_in_order(&mut self, order: &[NodeId]) -> usize {
        debug_assert_eq!(order.len(), self.len());

        let mut passes = 1;
        while self.sweep(order) {
            passes += 1;
        }

        log::debug!("liveness converged after {passes} passes");
        passes
    }

    /// Solves visiting nodes in reverse program order, which suits a
    /// backward problem.
    pub fn solve(&mut self) -> usize {
        let order: Vec<NodeId> = (0..self.len()).rev().collect();
        self.solve_in_order(&order)
    }

    /// Snapshot of every node's (IN, OUT).
    pub fn live_sets(&self) -> Vec<(LiveSet, LiveSet)> {
        self.nodes
            .iter()
            .map(|n| (n.live_in.clone(), n.live_out.clone()))
            .collect()
    }
}
