use ast::*;

use crate::error::StackError;

/// Operand-stack depth tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackModel {
    depth: usize,
    max: usize,
}

impl StackModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.depth += 1;
        self.max = self.max.max(self.depth);
    }

    pub fn pop(&mut self) -> Result<(), StackError> {
        if self.depth == 0 {
            return Err(StackError::Underflow);
        }
        self.depth -= 1;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max
    }
}

fn visit_expr(e: &Expr, m: &mut StackModel) -> Result<(), StackError> {
    match &e.item {
        ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::Var(_) => m.push(),
        ExprKind::UnaryOp(UnOp::Neg, e1) => {
            visit_expr(e1, m)?;
            m.pop()?;
            m.push();
        }
        // value, constant 1, xor
        ExprKind::UnaryOp(UnOp::Not, e1) => {
            visit_expr(e1, m)?;
            m.push();
            m.pop()?;
            m.pop()?;
            m.push();
        }
        ExprKind::BinOp(_, e1, e2) => {
            visit_expr(e1, m)?;
            visit_expr(e2, m)?;
            m.pop()?;
            m.pop()?;
            m.push();
        }
    }
    Ok(())
}

fn visit_stmt(s: &Stmt, m: &mut StackModel) -> Result<(), StackError> {
    match &s.item {
        StmtKind::Decl(_, e) | StmtKind::Assign(_, e) => {
            visit_expr(e, m)?;
            m.pop()?;
        }
        // receiver, then argument
        StmtKind::Print(e) => {
            m.push();
            visit_expr(e, m)?;
            m.pop()?;
            m.pop()?;
        }
        StmtKind::If(cond, then, els) => {
            visit_expr(cond, m)?;
            m.pop()?;
            visit_body(then, m)?;
            visit_body(els, m)?;
        }
        StmtKind::While(cond, body) => {
            visit_expr(cond, m)?;
            m.pop()?;
            visit_body(body, m)?;
        }
    }
    Ok(())
}

fn visit_body(body: &[Stmt], m: &mut StackModel) -> Result<(), StackError> {
    for s in body {
        visit_stmt(s, m)?;
    }
    Ok(())
}

/// Deepest operand stack the code for `p` will need.
pub fn max_stack_depth(p: &Program) -> Result<usize, StackError> {
    let mut m = StackModel::new();
    visit_body(&p.body, &mut m)?;
    debug_assert_eq!(m.depth(), 0);
    log::debug!("`{}`: max stack depth {}", p.class, m.max_depth());
    Ok(m.max_depth())
}
