use util::{Id, Spanned};

use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum UnOp {
    Neg,
    Not
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        use BinOp::*;
        matches!(self, Eq | Ne | Lt | Le | Gt | Ge)
    }

    fn symbol(self) -> &'static str {
        use BinOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            And => "&&",
            Or => "||",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">="
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i32),
    Bool(bool),
    Var(Id),
    UnaryOp(UnOp, Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>)
}

pub type Expr = Spanned<ExprKind>;

// type checking has already run: every `Var` names a declared variable
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Decl(Id, Box<Expr>),
    Assign(Id, Box<Expr>),
    Print(Box<Expr>),
    If(Box<Expr>, Vec<Stmt>, Vec<Stmt>),
    While(Box<Expr>, Vec<Stmt>)
}

pub type Stmt = Spanned<StmtKind>;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub source: String,
    pub class: String,
    pub body: Vec<Stmt>
}

impl Program {
    pub fn new(source: &str, class: &str, body: Vec<Stmt>) -> Self {
        Self {
            source: source.to_string(),
            class: class.to_string(),
            body
        }
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExprKind::Int(n) => write!(f, "{n}"),
            ExprKind::Bool(b) => write!(f, "{b}"),
            ExprKind::Var(x) => write!(f, "{x}"),
            ExprKind::UnaryOp(UnOp::Neg, e) => write!(f, "-({})", e.item),
            ExprKind::UnaryOp(UnOp::Not, e) => write!(f, "!({})", e.item),
            ExprKind::BinOp(op, e1, e2) => write!(f, "({} {} {})", e1.item, op.symbol(), e2.item)
        }
    }
}

fn format_block(f: &mut fmt::Formatter, body: &[Stmt], level: usize) -> fmt::Result {
    for s in body {
        format_stmt(f, &s.item, level)?;
    }
    Ok(())
}

fn format_stmt(f: &mut fmt::Formatter, s: &StmtKind, level: usize) -> fmt::Result {
    let indent = "    ".repeat(level);
    match s {
        StmtKind::Decl(x, e) => writeln!(f, "{indent}int {x} = {};", e.item),
        StmtKind::Assign(x, e) => writeln!(f, "{indent}{x} = {};", e.item),
        StmtKind::Print(e) => writeln!(f, "{indent}print({});", e.item),
        StmtKind::If(cond, then, els) => {
            writeln!(f, "{indent}if ({}) {{", cond.item)?;
            format_block(f, then, level + 1)?;
            if els.is_empty() {
                writeln!(f, "{indent}}}")
            } else {
                writeln!(f, "{indent}}} else {{")?;
                format_block(f, els, level + 1)?;
                writeln!(f, "{indent}}}")
            }
        }
        StmtKind::While(cond, body) => {
            writeln!(f, "{indent}while ({}) {{", cond.item)?;
            format_block(f, body, level + 1)?;
            writeln!(f, "{indent}}}")
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "// {}", self.source)?;
        writeln!(f, "class {} {{", self.class)?;
        format_block(f, &self.body, 1)?;
        writeln!(f, "}}")
    }
}
