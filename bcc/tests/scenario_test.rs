use ast::*;
use bcc::compile_ast;
use cfg::{Cond, Opcode};
use regalloc::DataFlowGraph;
use util::{Slot, ToSpanned};

fn int(n: i32) -> Box<Expr> {
    Box::new(ExprKind::Int(n).no_span())
}

fn var(x: &str) -> Box<Expr> {
    Box::new(ExprKind::Var(x.to_string()).no_span())
}

fn bin(op: BinOp, l: Box<Expr>, r: Box<Expr>) -> Box<Expr> {
    Box::new(ExprKind::BinOp(op, l, r).no_span())
}

fn decl(x: &str, e: Box<Expr>) -> Stmt {
    StmtKind::Decl(x.to_string(), e).no_span()
}

fn print(e: Box<Expr>) -> Stmt {
    StmtKind::Print(e).no_span()
}

#[test]
fn dead_stores_share_one_register() {
    let p = Program::new(
        "Dead.java",
        "Dead",
        vec![decl("i", int(5)), decl("j", int(6)), decl("k", int(7)), print(var("i"))],
    );
    let symbols = SymbolTable::from_program(&p);
    let out = compile_ast(&p, &symbols).unwrap();

    assert_eq!(out.allocation.registers, 1);
    assert_eq!(out.interference.edges().count(), 0);
    for x in ["i", "j", "k"] {
        assert_eq!(out.allocation.color_of(x), Some(1));
    }
}

#[test]
fn operands_of_one_addition_interfere() {
    let p = Program::new(
        "Sum.java",
        "Sum",
        vec![
            decl("i", int(5)),
            decl("j", int(6)),
            decl("k", bin(BinOp::Add, var("i"), var("j"))),
            print(var("k")),
        ],
    );
    let symbols = SymbolTable::from_program(&p);
    let out = compile_ast(&p, &symbols).unwrap();

    let (i, j, k) = (Slot(1), Slot(2), Slot(3));
    assert!(out.interference.interferes(i, j));
    assert!(out.interference.interferes(j, i));
    assert!(!out.interference.interferes(i, k));
    assert!(!out.interference.interferes(j, k));
    assert_eq!(out.allocation.registers, 2);
    assert_eq!(out.allocation.color_of("k"), Some(1));
    assert_eq!(out.cfg.head.stack_size, 2);
    assert_eq!(out.cfg.head.locals, 4);
}

#[test]
fn loop_bound_stays_live_across_the_back_edge() {
    // n = 10; i = 0; while (i < n) { i = i + 1 } print(i)
    let body = vec![StmtKind::Assign("i".into(), bin(BinOp::Add, var("i"), int(1))).no_span()];
    let p = Program::new(
        "Count.java",
        "Count",
        vec![
            decl("n", int(10)),
            decl("i", int(0)),
            StmtKind::While(bin(BinOp::Lt, var("i"), var("n")), body).no_span(),
            print(var("i")),
        ],
    );
    let symbols = SymbolTable::from_program(&p);
    let out = compile_ast(&p, &symbols).unwrap();
    let (n, i) = (Slot(1), Slot(2));

    // the allocation pipeline hands back its solved graph
    let g = &out.dataflow;
    let mut resolved = DataFlowGraph::from_cfg(&out.cfg);
    resolved.solve();
    assert_eq!(g.live_sets(), resolved.live_sets());

    let back_edge = g
        .nodes()
        .iter()
        .find(|node| match &out.cfg.inst(node.inst).opcode {
            Opcode::Jump(Cond::Always, l) => l.starts_with("Lwhile"),
            _ => false,
        })
        .unwrap();
    assert!(back_edge.live_out.contains(&n));
    assert!(back_edge.live_out.contains(&i));

    // the loop test is reachable from itself
    let head = out.cfg.find_label(back_edge_target(&out.cfg, back_edge.inst)).unwrap();
    assert!(out.cfg.reachable_from(head).contains(&head));

    assert!(out.interference.interferes(n, i));
    assert_eq!(out.allocation.registers, 2);
}

fn back_edge_target(cfg: &cfg::ControlFlowGraph, inst: cfg::InstId) -> &str {
    match &cfg.inst(inst).opcode {
        Opcode::Jump(_, l) => l,
        _ => unreachable!(),
    }
}

#[test]
fn branch_locals_do_not_interfere() {
    // a = 1; if (a) { b = 2; print(b) } else { c = 3; print(c) } print(a)
    let p = Program::new(
        "Branches.java",
        "Branches",
        vec![
            decl("a", int(1)),
            decl("b", int(0)),
            decl("c", int(0)),
            StmtKind::If(
                var("a"),
                vec![
                    StmtKind::Assign("b".into(), int(2)).no_span(),
                    print(var("b")),
                ],
                vec![
                    StmtKind::Assign("c".into(), int(3)).no_span(),
                    print(var("c")),
                ],
            )
            .no_span(),
            print(var("a")),
        ],
    );
    let symbols = SymbolTable::from_program(&p);
    let out = compile_ast(&p, &symbols).unwrap();

    assert!(out.interference.interferes(Slot(1), Slot(2)));
    assert!(out.interference.interferes(Slot(1), Slot(3)));
    assert!(!out.interference.interferes(Slot(2), Slot(3)));
    assert_eq!(out.allocation.color_of("b"), out.allocation.color_of("c"));
    assert_eq!(out.allocation.registers, 2);
}

#[test]
fn undeclared_variable_is_reported() {
    let p = Program::new("U.java", "U", vec![print(var("ghost"))]);
    assert!(compile_ast(&p, &SymbolTable::new()).is_err());
}
