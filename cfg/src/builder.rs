use util::Map;

use crate::error::CfgError;
use crate::graph::{BlockId, ControlFlowGraph, Head};
use crate::inst::{Cond, InstId, Label, Opcode};

/// One emission event of the code generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Emit(Opcode),
    Label(Label),
    Jump(Cond, Label),
}

/// Forward jumps whose target label has not been emitted yet.
///
/// Entries are recorded when a jump names an unknown label and drained when
/// that label is finally placed; a finished graph leaves this empty.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedJumps {
    waiting: Map<Label, Vec<BlockId>>,
}

impl UnresolvedJumps {
    pub fn record(&mut self, target: Label, from: BlockId) {
        self.waiting.entry(target).or_default().push(from);
    }

    pub fn drain(&mut self, target: &str) -> Vec<BlockId> {
        self.waiting.remove(target).unwrap_or_default()
    }

    pub fn waiting_on(&self, target: &str) -> &[BlockId] {
        self.waiting.get(target).map_or(&[], |v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Pending labels, sorted.
    pub fn labels(&self) -> Vec<Label> {
        let mut v: Vec<_> = self.waiting.keys().cloned().collect();
        v.sort();
        v
    }
}

pub struct Builder {
    cfg: ControlFlowGraph,
    labels: Map<Label, BlockId>,
    unresolved: UnresolvedJumps,
}

impl Builder {
    pub fn new(head: Head) -> Self {
        Self {
            cfg: ControlFlowGraph::new(head),
            labels: Map::default(),
            unresolved: UnresolvedJumps::default(),
        }
    }

    /// The graph under construction.
    pub fn graph(&self) -> &ControlFlowGraph {
        &self.cfg
    }

    pub fn unresolved(&self) -> &UnresolvedJumps {
        &self.unresolved
    }

    fn current(&mut self) -> BlockId {
        match self.cfg.last_block() {
            Some(b) => b,
            None => self.cfg.alloc_block(None),
        }
    }

    // a new block at the end, entered by fallthrough unless the previous
    // block ends with `goto`
    fn open_block(&mut self, label: Option<Label>) -> BlockId {
        let prev = self.cfg.last_block();
        let bid = self.cfg.alloc_block(label);

        if let Some(prev) = prev {
            let falls_through = !self
                .cfg
                .last_inst(prev)
                .map_or(false, |i| i.opcode.is_unconditional_jump());
            if falls_through {
                self.cfg.link(prev, bid);
            }
        }

        bid
    }

    pub fn add_instruction(&mut self, opcode: Opcode) -> InstId {
        if let Opcode::Jump(cond, target) = opcode {
            return self.add_jump(cond, target);
        }
        let bid = self.current();
        self.cfg.push_inst(bid, opcode)
    }

    pub fn add_label(&mut self, name: &str) -> Result<BlockId, CfgError> {
        if self.labels.contains_key(name) {
            return Err(CfgError::DuplicateLabel(name.to_string()));
        }

        let bid = self.open_block(Some(name.to_string()));
        self.labels.insert(name.to_string(), bid);

        for from in self.unresolved.drain(name) {
            log::trace!("resolved forward jump to `{name}`");
            self.cfg.link(from, bid);
        }

        Ok(bid)
    }

    pub fn add_jump(&mut self, cond: Cond, target: Label) -> InstId {
        let bid = self.current();
        let id = self
            .cfg
            .push_inst(bid, Opcode::Jump(cond, target.clone()));

        match self.labels.get(&target) {
            Some(dest) => {
                let dest = *dest;
                self.cfg.link(bid, dest);
            }
            None => self.unresolved.record(target, bid),
        }

        self.open_block(None);
        id
    }

    pub fn feed(&mut self, event: Event) -> Result<(), CfgError> {
        match event {
            Event::Emit(opcode) => {
                self.add_instruction(opcode);
            }
            Event::Label(name) => {
                self.add_label(&name)?;
            }
            Event::Jump(cond, target) => {
                self.add_jump(cond, target);
            }
        }
        Ok(())
    }

    /// Checks that every jump found its label, purges the empty blocks and
    /// returns the frozen graph.
    pub fn finalize(self) -> Result<ControlFlowGraph, CfgError> {
        if !self.unresolved.is_empty() {
            return Err(CfgError::UnresolvedLabels(self.unresolved.labels()));
        }

        let mut cfg = self.cfg;
        let before = cfg.len();
        cfg.purge_empty_blocks();
        log::debug!(
            "cfg `{}`: {} blocks ({} purged), {} instructions",
            cfg.head.class,
            cfg.len(),
            before - cfg.len(),
            cfg.inst_count()
        );

        Ok(cfg)
    }
}

pub fn build<I>(head: Head, events: I) -> Result<ControlFlowGraph, CfgError>
where
    I: IntoIterator<Item = Event>,
{
    let mut builder = Builder::new(head);
    for e in events {
        builder.feed(e)?;
    }
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::Slot;

    fn emit(m: &str) -> Event {
        Event::Emit(Opcode::other(m, &[]))
    }

    fn label(l: &str) -> Event {
        Event::Label(l.to_string())
    }

    fn jump(c: Cond, l: &str) -> Event {
        Event::Jump(c, l.to_string())
    }

    fn names(cfg: &ControlFlowGraph, set: &util::Set<BlockId>) -> Vec<String> {
        let mut v: Vec<_> = set.iter().map(|b| cfg[*b].name()).collect();
        v.sort();
        v
    }

    #[test]
    fn first_instruction_opens_a_block() {
        let mut b = Builder::new(Head::default());
        assert!(b.graph().is_empty());
        b.add_instruction(Opcode::Load(Slot(1)));
        b.add_instruction(Opcode::Store(Slot(2)));
        assert_eq!(b.graph().len(), 1);
        let cfg = b.finalize().unwrap();
        let entry = cfg.entry().unwrap();
        assert_eq!(cfg[entry].label, None);
        assert_eq!(cfg[entry].insts.len(), 2);
    }

    #[test]
    fn label_links_fallthrough() {
        let cfg = build(Head::default(), vec![emit("nop"), label("A"), emit("nop")]).unwrap();
        let a = cfg.find_label("A").unwrap();
        let entry = cfg.entry().unwrap();
        assert!(cfg[entry].succs.contains(&a));
        assert!(cfg[a].preds.contains(&entry));
    }

    #[test]
    fn goto_never_falls_through() {
        let cfg = build(
            Head::default(),
            vec![
                emit("nop"),
                jump(Cond::Always, "End"),
                emit("dead"),
                label("End"),
                emit("return"),
            ],
        )
        .unwrap();
        let entry = cfg.entry().unwrap();
        let end = cfg.find_label("End").unwrap();
        assert_eq!(names(&cfg, &cfg[entry].succs), vec!["End"]);
        // the dead block is still there, unreachable, and falls into End
        assert_eq!(cfg.len(), 3);
        assert_eq!(cfg[end].preds.len(), 2);
        let dead = cfg.block_ids()[1];
        assert!(cfg[dead].preds.is_empty());
    }

    #[test]
    fn conditional_jump_falls_through() {
        let cfg = build(
            Head::default(),
            vec![
                emit("iconst_1"),
                jump(Cond::Eq, "Else"),
                emit("then"),
                label("Else"),
                emit("return"),
            ],
        )
        .unwrap();
        let entry = cfg.entry().unwrap();
        let then = cfg.block_ids()[1];
        let els = cfg.find_label("Else").unwrap();
        let mut expect = vec![then, els];
        expect.sort();
        assert_eq!(util::sorted(&cfg[entry].succs), expect);
        assert!(cfg[then].succs.contains(&els));
    }

    #[test]
    fn forward_jumps_wait_for_their_label() {
        let mut b = Builder::new(Head::default());
        b.feed(jump(Cond::Ne, "Out")).unwrap();
        b.feed(jump(Cond::Always, "Out")).unwrap();
        assert_eq!(b.unresolved().waiting_on("Out").len(), 2);
        assert_eq!(b.unresolved().len(), 2);
        let out = b.add_label("Out").unwrap();
        assert!(b.unresolved().is_empty());
        // the empty block left behind by `goto` falls into Out until purged
        assert_eq!(b.graph()[out].preds.len(), 3);
        let cfg = b.finalize().unwrap();
        assert_eq!(cfg[out].preds.len(), 2);
    }

    #[test]
    fn backward_jump_links_immediately() {
        let cfg = build(
            Head::default(),
            vec![
                label("Loop"),
                emit("nop"),
                jump(Cond::Ne, "Loop"),
                emit("return"),
            ],
        )
        .unwrap();
        let lp = cfg.find_label("Loop").unwrap();
        assert!(cfg[lp].succs.contains(&lp));
        assert!(cfg[lp].preds.contains(&lp));
        assert_eq!(cfg.len(), 2);
    }

    #[test]
    fn self_loop_on_goto() {
        let cfg = build(Head::default(), vec![label("L"), jump(Cond::Always, "L")]).unwrap();
        let l = cfg.find_label("L").unwrap();
        assert_eq!(cfg.len(), 1);
        assert_eq!(util::sorted(&cfg[l].succs), vec![l]);
    }

    #[test]
    fn jump_as_first_event() {
        let cfg = build(
            Head::default(),
            vec![jump(Cond::Always, "Start"), label("Start"), emit("return")],
        )
        .unwrap();
        let entry = cfg.entry().unwrap();
        let start = cfg.find_label("Start").unwrap();
        assert_eq!(cfg.len(), 2);
        assert_eq!(util::sorted(&cfg[entry].succs), vec![start]);
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let err = build(Head::default(), vec![label("A"), emit("nop"), label("A")]).unwrap_err();
        assert_eq!(err, CfgError::DuplicateLabel("A".to_string()));
    }

    #[test]
    fn undefined_label_is_an_error() {
        let err = build(
            Head::default(),
            vec![jump(Cond::Eq, "B"), jump(Cond::Always, "A"), label("C")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CfgError::UnresolvedLabels(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn jump_opcode_through_add_instruction() {
        let mut b = Builder::new(Head::default());
        b.add_instruction(Opcode::Jump(Cond::Always, "X".to_string()));
        assert_eq!(b.unresolved().waiting_on("X").len(), 1);
        b.add_label("X").unwrap();
        let cfg = b.finalize().unwrap();
        assert_eq!(cfg.len(), 2);
    }
}
