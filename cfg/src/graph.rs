use std::fmt;
use std::ops::Index;

use id_arena::Arena;
use util::Set;

use crate::inst::{InstId, Instruction, Label, Opcode};

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: Option<Label>,
    pub insts: Vec<InstId>,
    pub preds: Set<BlockId>,
    pub succs: Set<BlockId>,
}

pub type BlockId = id_arena::Id<BasicBlock>;

impl BasicBlock {
    fn new(id: BlockId, label: Option<Label>) -> Self {
        Self {
            id,
            label,
            insts: vec![],
            preds: Set::default(),
            succs: Set::default(),
        }
    }

    /// Leftover of two back-to-back block-closing events.
    #[inline]
    pub fn is_removable(&self) -> bool {
        self.label.is_none() && self.insts.is_empty()
    }

    pub fn name(&self) -> String {
        match &self.label {
            Some(l) => l.clone(),
            None => format!("#{}", self.id.index()),
        }
    }
}

/// Frame metadata read by the emission stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    pub source: String,
    pub class: String,
    pub stack_size: usize,
    pub locals: usize,
}

impl Head {
    pub fn new(source: &str, class: &str) -> Self {
        Self {
            source: source.to_string(),
            class: class.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub head: Head,
    blocks: Arena<BasicBlock>,
    insts: Arena<Instruction>,
    // program order; purged blocks stay in the arena but leave this list
    order: Vec<BlockId>,
}

impl ControlFlowGraph {
    pub(crate) fn new(head: Head) -> Self {
        Self {
            head,
            blocks: Arena::new(),
            insts: Arena::new(),
            order: vec![],
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.order.iter().map(move |b| &self.blocks[*b])
    }

    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.insts[id]
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.blocks()
            .flat_map(move |b| b.insts.iter().map(move |i| &self.insts[*i]))
    }

    pub fn inst_count(&self) -> usize {
        self.blocks().map(|b| b.insts.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.order.first().copied()
    }

    pub fn last_block(&self) -> Option<BlockId> {
        self.order.last().copied()
    }

    pub fn last_inst(&self, id: BlockId) -> Option<&Instruction> {
        self.blocks[id].insts.last().map(|i| &self.insts[*i])
    }

    pub fn find_label(&self, label: &str) -> Option<BlockId> {
        self.blocks()
            .find(|b| b.label.as_deref() == Some(label))
            .map(|b| b.id)
    }

    /// Blocks reachable from `from` along at least one edge.
    pub fn reachable_from(&self, from: BlockId) -> Set<BlockId> {
        let mut seen = Set::default();
        let mut stack: Vec<BlockId> = self.blocks[from].succs.iter().copied().collect();
        while let Some(b) = stack.pop() {
            if seen.insert(b) {
                stack.extend(self.blocks[b].succs.iter().copied());
            }
        }
        seen
    }

    pub(crate) fn alloc_block(&mut self, label: Option<Label>) -> BlockId {
        let id = self.blocks.alloc_with_id(|id| BasicBlock::new(id, label));
        self.order.push(id);
        id
    }

    pub(crate) fn push_inst(&mut self, block: BlockId, opcode: Opcode) -> InstId {
        let id = self.insts.alloc_with_id(|id| Instruction { id, block, opcode });
        self.blocks[block].insts.push(id);
        id
    }

    pub(crate) fn link(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from].succs.insert(to);
        self.blocks[to].preds.insert(from);
    }

    pub(crate) fn unlink(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from].succs.remove(&to);
        self.blocks[to].preds.remove(&from);
    }

    pub(crate) fn retain_blocks(&mut self, removed: &Set<BlockId>) {
        self.order.retain(|b| !removed.contains(b));
    }

    fn format_block(&self, f: &mut fmt::Formatter, b: &BasicBlock) -> fmt::Result {
        let indent = |level: usize| "    ".repeat(level);
        let names = |set: &Set<BlockId>| {
            util::sorted(set)
                .into_iter()
                .map(|b| self.blocks[b].name())
                .collect::<Vec<_>>()
        };

        writeln!(f, "{}Block {}", indent(1), b.name())?;
        write!(f, "{}preds: ", indent(2))?;
        util::format_vec(f, &names(&b.preds), "[", ", ", "]")?;
        write!(f, "\n{}succs: ", indent(2))?;
        util::format_vec(f, &names(&b.succs), "[", ", ", "]")?;
        writeln!(f, "\n{}body:", indent(2))?;
        for i in &b.insts {
            writeln!(f, "{}{}", indent(3), self.insts[*i].opcode)?;
        }
        Ok(())
    }
}

impl Index<BlockId> for ControlFlowGraph {
    type Output = BasicBlock;

    fn index(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Source: {}", self.head.source)?;
        writeln!(f, "Class: {}", self.head.class)?;
        writeln!(
            f,
            "Limits: stack {}, locals {}\n",
            self.head.stack_size, self.head.locals
        )?;
        writeln!(f, "Blocks:")?;
        for b in self.blocks() {
            self.format_block(f, b)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
