use std::iter;

use crate::graph::{BasicBlock, ControlFlowGraph};

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl ControlFlowGraph {
    fn node_line(&self, b: &BasicBlock) -> String {
        let mut text = format!("{}:\\l", escape(&b.name()));
        for i in &b.insts {
            text += &format!("  {}\\l", escape(&self.inst(*i).opcode.to_string()));
        }
        format!("    b{} [shape=box, label=\"{}\"];", b.id.index(), text)
    }

    fn edge_lines<'a>(&'a self, b: &'a BasicBlock) -> impl Iterator<Item = String> + 'a {
        let target = self.last_inst(b.id).and_then(|i| i.opcode.jump_target());
        util::sorted(&b.succs).into_iter().map(move |s| {
            let kind = match (target, &self[s].label) {
                (Some(t), Some(l)) if t == l => "jump",
                _ => "fallthrough",
            };
            format!("    b{} -> b{} [label=\"{}\"];", b.id.index(), s.index(), kind)
        })
    }

    /// Graphviz description of the graph, produced line by line.
    pub fn dot(&self) -> impl Iterator<Item = String> + '_ {
        iter::once(format!("digraph \"{}\" {{", escape(&self.head.class)))
            .chain(self.blocks().map(move |b| self.node_line(b)))
            .chain(self.blocks().flat_map(move |b| self.edge_lines(b)))
            .chain(iter::once("}".to_string()))
    }
}
