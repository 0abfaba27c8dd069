use ast::*;
use cfg::{Builder, Cond, ControlFlowGraph, Head, Opcode};
use util::{id, Slot};

use crate::error::ConvertError;
use crate::stack;

const PRINT_STREAM: [&str; 2] = ["java/lang/System/out", "Ljava/io/PrintStream;"];
const PRINTLN: &str = "java/io/PrintStream/println(I)V";

fn arith(op: BinOp) -> &'static str {
    use BinOp::*;
    match op {
        Add => "iadd",
        Sub => "isub",
        Mul => "imul",
        Div => "idiv",
        Rem => "irem",
        And => "iand",
        Or => "ior",
        Eq | Ne | Lt | Le | Gt | Ge => unreachable!("comparison `{:?}` is lowered to a jump", op),
    }
}

fn compare(op: BinOp) -> Cond {
    use BinOp::*;
    match op {
        Eq => Cond::CmpEq,
        Ne => Cond::CmpNe,
        Lt => Cond::CmpLt,
        Le => Cond::CmpLe,
        Gt => Cond::CmpGt,
        Ge => Cond::CmpGe,
        _ => unreachable!("`{:?}` is not a comparison", op),
    }
}

struct Converter<'a> {
    symbols: &'a SymbolTable,
    builder: Builder,
}

impl<'a> Converter<'a> {
    fn emit(&mut self, mnemonic: &str, operands: &[&str]) {
        self.builder.add_instruction(Opcode::other(mnemonic, operands));
    }

    fn slot(&self, x: &str, span: util::Span) -> Result<Slot, ConvertError> {
        self.symbols
            .slot(x)
            .ok_or_else(|| ConvertError::Undeclared(x.to_string(), span))
    }

    fn conv_expr(&mut self, e: &Expr) -> Result<(), ConvertError> {
        match &e.item {
            ExprKind::Int(n) => {
                let n = n.to_string();
                self.emit("ldc", &[n.as_str()]);
            }
            ExprKind::Bool(true) => self.emit("iconst_1", &[]),
            ExprKind::Bool(false) => self.emit("iconst_0", &[]),
            ExprKind::Var(x) => {
                let slot = self.slot(x, e.loc)?;
                self.builder.add_instruction(Opcode::Load(slot));
            }
            ExprKind::UnaryOp(UnOp::Neg, e1) => {
                self.conv_expr(e1)?;
                self.emit("ineg", &[]);
            }
            ExprKind::UnaryOp(UnOp::Not, e1) => {
                self.conv_expr(e1)?;
                self.emit("iconst_1", &[]);
                self.emit("ixor", &[]);
            }
            ExprKind::BinOp(op, e1, e2) if op.is_comparison() => {
                // leaves 0 or 1 on the stack
                let l_true = id::gen_label_with("true");
                let l_end = id::gen_label_with("cmp");
                self.conv_expr(e1)?;
                self.conv_expr(e2)?;
                self.builder.add_jump(compare(*op), l_true.clone());
                self.emit("iconst_0", &[]);
                self.builder.add_jump(Cond::Always, l_end.clone());
                self.builder.add_label(&l_true)?;
                self.emit("iconst_1", &[]);
                self.builder.add_label(&l_end)?;
            }
            ExprKind::BinOp(op, e1, e2) => {
                self.conv_expr(e1)?;
                self.conv_expr(e2)?;
                self.emit(arith(*op), &[]);
            }
        }
        Ok(())
    }

    fn conv_stmt(&mut self, s: &Stmt) -> Result<(), ConvertError> {
        match &s.item {
            StmtKind::Decl(x, e) | StmtKind::Assign(x, e) => {
                let slot = self.slot(x, s.loc)?;
                self.conv_expr(e)?;
                self.builder.add_instruction(Opcode::Store(slot));
            }
            StmtKind::Print(e) => {
                self.emit("getstatic", &PRINT_STREAM);
                self.conv_expr(e)?;
                self.emit("invokevirtual", &[PRINTLN]);
            }
            StmtKind::If(cond, then, els) => {
                let l_else = id::gen_label_with("else");
                let l_end = id::gen_label_with("endif");
                self.conv_expr(cond)?;
                self.builder.add_jump(Cond::Eq, l_else.clone());
                self.conv_body(then)?;
                self.builder.add_jump(Cond::Always, l_end.clone());
                self.builder.add_label(&l_else)?;
                self.conv_body(els)?;
                self.builder.add_label(&l_end)?;
            }
            StmtKind::While(cond, body) => {
                let l_cond = id::gen_label_with("while");
                let l_end = id::gen_label_with("done");
                self.builder.add_label(&l_cond)?;
                self.conv_expr(cond)?;
                self.builder.add_jump(Cond::Eq, l_end.clone());
                self.conv_body(body)?;
                self.builder.add_jump(Cond::Always, l_cond);
                self.builder.add_label(&l_end)?;
            }
        }
        Ok(())
    }

    fn conv_body(&mut self, body: &[Stmt]) -> Result<(), ConvertError> {
        for s in body {
            self.conv_stmt(s)?;
        }
        Ok(())
    }
}

/// Lowers a type-checked program into its control-flow graph, with the frame
/// limits filled in.
pub fn convert(p: &Program, symbols: &SymbolTable) -> Result<ControlFlowGraph, ConvertError> {
    log::info!("lowering `{}` started", p.class);

    let mut head = Head::new(&p.source, &p.class);
    head.stack_size = stack::max_stack_depth(p)?;
    head.locals = symbols.local_count();

    let mut conv = Converter {
        symbols,
        builder: Builder::new(head),
    };
    conv.conv_body(&p.body)?;
    conv.emit("return", &[]);

    Ok(conv.builder.finalize()?)
}
