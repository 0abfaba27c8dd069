use std::fmt;

use util::{Id, Slot};

use crate::graph::BlockId;

pub type Label = Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Always,
    // compare with zero
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
    // compare two operands
    CmpEq,
    CmpNe,
    CmpLt,
    CmpGe,
    CmpGt,
    CmpLe,
}

impl Cond {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        use Cond::*;
        let c = match s {
            "goto" => Always,
            "ifeq" => Eq,
            "ifne" => Ne,
            "iflt" => Lt,
            "ifge" => Ge,
            "ifgt" => Gt,
            "ifle" => Le,
            "if_icmpeq" => CmpEq,
            "if_icmpne" => CmpNe,
            "if_icmplt" => CmpLt,
            "if_icmpge" => CmpGe,
            "if_icmpgt" => CmpGt,
            "if_icmple" => CmpLe,
            _ => return None,
        };
        Some(c)
    }

    pub fn mnemonic(self) -> &'static str {
        use Cond::*;
        match self {
            Always => "goto",
            Eq => "ifeq",
            Ne => "ifne",
            Lt => "iflt",
            Ge => "ifge",
            Gt => "ifgt",
            Le => "ifle",
            CmpEq => "if_icmpeq",
            CmpNe => "if_icmpne",
            CmpLt => "if_icmplt",
            CmpGe => "if_icmpge",
            CmpGt => "if_icmpgt",
            CmpLe => "if_icmple",
        }
    }

    #[inline]
    pub fn is_unconditional(self) -> bool {
        self == Cond::Always
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Load(Slot),
    Store(Slot),
    Jump(Cond, Label),
    Other(String, Vec<String>),
}

impl Opcode {
    pub fn other(mnemonic: &str, operands: &[&str]) -> Self {
        Opcode::Other(
            mnemonic.to_string(),
            operands.iter().map(|x| x.to_string()).collect(),
        )
    }

    pub fn is_unconditional_jump(&self) -> bool {
        matches!(self, Opcode::Jump(c, _) if c.is_unconditional())
    }

    pub fn jump_target(&self) -> Option<&Label> {
        match self {
            Opcode::Jump(_, target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Opcode::*;
        match self {
            Load(x) => write!(f, "iload {x}"),
            Store(x) => write!(f, "istore {x}"),
            Jump(cond, target) => write!(f, "{} {target}", cond.mnemonic()),
            Other(m, operands) if operands.is_empty() => write!(f, "{m}"),
            Other(m, operands) => write!(f, "{m} {}", operands.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub id: InstId,
    pub block: BlockId,
    pub opcode: Opcode,
}

pub type InstId = id_arena::Id<Instruction>;
