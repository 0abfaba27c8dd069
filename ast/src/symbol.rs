use std::collections::BTreeMap;

use util::{Id, Map, Slot};

use crate::syntax::{Program, Stmt, StmtKind};

/// Variable name to local slot, as handed over by type checking.
///
/// Slot 0 holds the entry method's argument array, so variables declared
/// with [`SymbolTable::declare`] are numbered from 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    by_name: Map<Id, Slot>,
    by_slot: BTreeMap<Slot, Id>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next slot after the highest one in use to `name`.
    /// Declaring a name twice returns the slot it already has. `None` when
    /// the highest slot is already `u16::MAX`.
    pub fn declare(&mut self, name: &str) -> Option<Slot> {
        if let Some(slot) = self.by_name.get(name) {
            return Some(*slot);
        }
        let next = match self.by_slot.keys().next_back() {
            Some(s) => s.0.checked_add(1)?,
            None => 1,
        };
        let slot = Slot(next);
        self.by_name.insert(name.to_string(), slot);
        self.by_slot.insert(slot, name.to_string());
        Some(slot)
    }

    /// Binds `name` to an explicit slot. Returns false, leaving the table
    /// untouched, if either the name or the slot is already taken.
    pub fn declare_at(&mut self, name: &str, slot: Slot) -> bool {
        if self.by_name.contains_key(name) || self.by_slot.contains_key(&slot) {
            return false;
        }
        self.by_name.insert(name.to_string(), slot);
        self.by_slot.insert(slot, name.to_string());
        true
    }

    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, slot: Slot) -> Option<&Id> {
        self.by_slot.get(&slot)
    }

    /// Declared symbols in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Id, Slot)> {
        self.by_slot.iter().map(|(s, x)| (x, *s))
    }

    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    /// Size of the local-variable area: highest slot + 1, and at least 1 for
    /// the argument array.
    pub fn local_count(&self) -> usize {
        self.by_slot
            .keys()
            .next_back()
            .map_or(1, |s| s.index() + 1)
    }

    /// Slots in declaration order, walking nested blocks. Names that find no
    /// slot stay undeclared and are reported by lowering.
    pub fn from_program(p: &Program) -> Self {
        fn collect(body: &[Stmt], table: &mut SymbolTable) {
            for s in body {
                match &s.item {
                    StmtKind::Decl(x, _) => {
                        table.declare(x);
                    }
                    StmtKind::If(_, then, els) => {
                        collect(then, table);
                        collect(els, table);
                    }
                    StmtKind::While(_, body) => collect(body, table),
                    StmtKind::Assign(..) | StmtKind::Print(_) => {}
                }
            }
        }

        let mut table = Self::new();
        collect(&p.body, &mut table);
        table
    }
}
