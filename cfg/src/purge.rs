use util::Set;

use crate::graph::{BlockId, ControlFlowGraph};

impl ControlFlowGraph {
    /// Removes blocks with neither label nor instructions, connecting each of
    /// their predecessors directly to each of their successors.
    pub fn purge_empty_blocks(&mut self) {
        let removed: Set<BlockId> = self
            .blocks()
            .filter(|b| b.is_removable())
            .map(|b| b.id)
            .collect();

        // program order keeps the pass deterministic
        let order: Vec<BlockId> = self
            .block_ids()
            .iter()
            .copied()
            .filter(|b| removed.contains(b))
            .collect();

        for bid in order {
            let preds: Vec<BlockId> = util::sorted(&self[bid].preds);
            let succs: Vec<BlockId> = util::sorted(&self[bid].succs);

            for p in &preds {
                self.unlink(*p, bid);
            }
            for s in &succs {
                self.unlink(bid, *s);
            }
            for p in preds.iter().filter(|p| **p != bid) {
                for s in succs.iter().filter(|s| **s != bid) {
                    self.link(*p, *s);
                }
            }

            log::trace!(
                "purged empty block #{} ({} preds, {} succs)",
                bid.index(),
                preds.len(),
                succs.len()
            );
        }

        self.retain_blocks(&removed);
    }
}
