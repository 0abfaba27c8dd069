use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ast::SymbolTable;
use cfg::ControlFlowGraph;
use regalloc::{Allocation, DataFlowGraph, InterferenceGraph};

use crate::listing::{Listing, ListingError};

#[derive(Debug, Parser)]
pub struct Args {
    /// print the control-flow graph and the live sets
    #[clap(short, long)]
    pub verbose: bool,
    #[clap(long)]
    pub debug: bool,
    /// write the control-flow graph as Graphviz
    #[clap(long)]
    pub dot_cfg: Option<PathBuf>,
    /// write the interference graph as Graphviz
    #[clap(long)]
    pub dot_interference: Option<PathBuf>,
    pub source: String
}

/// Everything the backend produces for one compilation unit.
pub struct Compiled {
    pub cfg: ControlFlowGraph,
    // solved
    pub dataflow: DataFlowGraph,
    pub interference: InterferenceGraph,
    pub allocation: Allocation,
}

fn report(path: &str, src: &str, err: &ListingError) {
    use ariadne::{Report, ReportKind, Label, Source, ColorGenerator, Fmt};

    let mut colors = ColorGenerator::new();
    let a = colors.next();

    let printed = Report::build(ReportKind::Error, path, err.loc.0)
        .with_code(3)
        .with_message(err.item.to_string())
        .with_label(Label::new((path, err.loc.0 .. err.loc.1))
            .with_message(format!("error found {}", "here".fg(a)))
            .with_color(a))
        .finish()
        .print((path, Source::from(src)));

    if let Err(e) = printed {
        log::warn!("could not print diagnostic: {e}");
    }
}

fn read_listing(path: &str) -> Result<(ControlFlowGraph, SymbolTable)> {
    let src = std::fs::read_to_string(path).context(format!("failed to open file: {}", path))?;

    Listing::parse(&src)
        .and_then(Listing::build)
        .map_err(|err| {
            report(path, &src, &err);
            anyhow::Error::msg("aborting due to the error above")
        })
}

/// Register allocation for a graph that is already built.
pub fn allocate(cfg: ControlFlowGraph, symbols: &SymbolTable, verbose: bool) -> Result<Compiled> {
    if verbose {
        println!("[[cfg]]\n{}", cfg);
    }

    let (dataflow, interference, allocation) = regalloc::do_regalloc(&cfg, symbols)
        .context(format!("register allocation failed for `{}`", cfg.head.class))?;

    if verbose {
        println!("[[liveness]]\n{}", dataflow);
    }

    Ok(Compiled { cfg, dataflow, interference, allocation })
}

/// Backend pipeline for a type-checked syntax tree.
pub fn compile_ast(p: &ast::Program, symbols: &SymbolTable) -> Result<Compiled> {
    let cfg = codegen::convert(p, symbols).context(format!("failed to lower `{}`", p.class))?;
    allocate(cfg, symbols, false)
}

pub fn compile(args: &Args) -> Result<Allocation> {
    let (cfg, symbols) = read_listing(&args.source)?;

    let Compiled { cfg, interference, allocation, .. } = allocate(cfg, &symbols, args.verbose)?;

    // diagnostics never fail the compilation
    if let Some(path) = &args.dot_cfg {
        util::export_lines(path, cfg.dot());
    }
    if let Some(path) = &args.dot_interference {
        util::export_lines(path, interference.dot());
    }

    println!("[[allocation]]\n{}", allocation);

    Ok(allocation)
}
