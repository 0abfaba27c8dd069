//! Reader for textual event listings: one emission event per line, in the
//! assembler syntax the backend itself prints.

use ast::SymbolTable;
use cfg::{Builder, CfgError, Cond, ControlFlowGraph, Event, Head, Label, Opcode};
use thiserror::Error;
use util::{Map, Slot, Span, Spanned, ToSpanned};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ListingErrorKind {
    #[error("unknown directive `{0}`")]
    UnknownDirective(String),
    #[error("`{0}` expects {1} operand(s)")]
    Arity(String, usize),
    #[error("invalid slot number `{0}`")]
    InvalidSlot(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("`{0}` is not an instruction")]
    NotAnInstruction(String),
    #[error("variable `{0}` or its slot is already declared")]
    DuplicateVar(String),
    #[error("{0}")]
    Cfg(CfgError),
}

pub type ListingError = Spanned<ListingErrorKind>;

#[derive(Debug, Clone)]
pub struct Listing {
    pub head: Head,
    pub symbols: SymbolTable,
    pub events: Vec<Spanned<Event>>,
    // `.limit locals` given explicitly
    locals: Option<usize>,
}

// `;` opens a comment at the start of a line or after whitespace, so type
// descriptors such as `Ljava/io/PrintStream;` survive
fn strip_comment(line: &str) -> &str {
    let mut prev_ws = true;
    for (i, c) in line.char_indices() {
        if c == ';' && prev_ws {
            return &line[..i];
        }
        prev_ws = c.is_whitespace();
    }
    line
}

fn parse_slot(s: &str, loc: Span) -> Result<Slot, ListingError> {
    s.parse::<u16>()
        .map(Slot)
        .map_err(|_| ListingErrorKind::InvalidSlot(s.to_string()).with_span(loc))
}

fn parse_number(s: &str, loc: Span) -> Result<usize, ListingError> {
    s.parse::<usize>()
        .map_err(|_| ListingErrorKind::InvalidNumber(s.to_string()).with_span(loc))
}

fn expect_operands<'a>(
    name: &str,
    operands: &'a [&'a str],
    n: usize,
    loc: Span,
) -> Result<&'a [&'a str], ListingError> {
    if operands.len() == n {
        Ok(operands)
    } else {
        Err(ListingErrorKind::Arity(name.to_string(), n).with_span(loc))
    }
}

fn short_form(mnemonic: &str) -> Option<Opcode> {
    let (kind, n) = mnemonic.split_once('_')?;
    let slot = match n {
        "0" | "1" | "2" | "3" => Slot(n.parse().ok()?),
        _ => return None,
    };
    match kind {
        "iload" => Some(Opcode::Load(slot)),
        "istore" => Some(Opcode::Store(slot)),
        _ => None,
    }
}

fn parse_instruction(mnemonic: &str, operands: &[&str], loc: Span) -> Result<Event, ListingError> {
    // a second label, or a label glued to its instruction
    if mnemonic.contains(':') {
        return Err(ListingErrorKind::NotAnInstruction(mnemonic.to_string()).with_span(loc));
    }

    if let Some(op) = short_form(mnemonic) {
        expect_operands(mnemonic, operands, 0, loc)?;
        return Ok(Event::Emit(op));
    }

    if let Some(cond) = Cond::from_mnemonic(mnemonic) {
        let ops = expect_operands(mnemonic, operands, 1, loc)?;
        return Ok(Event::Jump(cond, ops[0].to_string()));
    }

    let event = match mnemonic {
        "iload" => {
            let ops = expect_operands(mnemonic, operands, 1, loc)?;
            Event::Emit(Opcode::Load(parse_slot(ops[0], loc)?))
        }
        "istore" => {
            let ops = expect_operands(mnemonic, operands, 1, loc)?;
            Event::Emit(Opcode::Store(parse_slot(ops[0], loc)?))
        }
        _ => Event::Emit(Opcode::other(mnemonic, operands)),
    };
    Ok(event)
}

impl Listing {
    fn directive(&mut self, name: &str, operands: &[&str], loc: Span) -> Result<(), ListingError> {
        match name {
            ".source" => {
                let ops = expect_operands(name, operands, 1, loc)?;
                self.head.source = ops[0].to_string();
            }
            // `.class public Foo` is accepted too
            ".class" => match operands.last() {
                Some(class) => self.head.class = class.to_string(),
                None => return Err(ListingErrorKind::Arity(name.to_string(), 1).with_span(loc)),
            },
            ".limit" => {
                let ops = expect_operands(name, operands, 2, loc)?;
                let n = parse_number(ops[1], loc)?;
                match ops[0] {
                    "stack" => self.head.stack_size = n,
                    "locals" => self.locals = Some(n),
                    other => {
                        return Err(ListingErrorKind::UnknownDirective(format!(".limit {other}"))
                            .with_span(loc))
                    }
                }
            }
            ".var" => {
                let ops = expect_operands(name, operands, 2, loc)?;
                let slot = parse_slot(ops[1], loc)?;
                if !self.symbols.declare_at(ops[0], slot) {
                    return Err(ListingErrorKind::DuplicateVar(ops[0].to_string()).with_span(loc));
                }
            }
            _ => return Err(ListingErrorKind::UnknownDirective(name.to_string()).with_span(loc)),
        }
        Ok(())
    }

    pub fn parse(src: &str) -> Result<Self, ListingError> {
        let mut listing = Self {
            head: Head::default(),
            symbols: SymbolTable::new(),
            events: vec![],
            locals: None,
        };

        let mut offset = 0;
        for raw in src.split_inclusive('\n') {
            let start = offset;
            offset += raw.len();

            let line = strip_comment(raw);
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let lo = start + (line.len() - line.trim_start().len());
            let loc = (lo, lo + text.len());

            let tokens: Vec<&str> = text.split_whitespace().collect();
            let (first, rest) = (tokens[0], &tokens[1..]);

            if first.starts_with('.') {
                listing.directive(first, rest, loc)?;
                continue;
            }

            // `Label:` may share its line with the instruction it marks
            let (tokens, loc) = match first.strip_suffix(':') {
                Some(label) if !label.is_empty() && !label.contains(':') => {
                    let label_loc = (lo, lo + first.len());
                    listing.events.push(Event::Label(label.to_string()).with_span(label_loc));

                    let inst = text[first.len()..].trim_start();
                    (rest, (lo + text.len() - inst.len(), loc.1))
                }
                _ => (&tokens[..], loc),
            };

            if let Some((mnemonic, operands)) = tokens.split_first() {
                let e = parse_instruction(mnemonic, operands, loc)?;
                listing.events.push(e.with_span(loc));
            }
        }

        listing.head.locals = listing
            .locals
            .unwrap_or_else(|| listing.symbols.local_count());

        log::debug!(
            "listing `{}`: {} events, {} variables",
            listing.head.class,
            listing.events.len(),
            listing.symbols.len()
        );

        Ok(listing)
    }

    /// Feeds the events to a fresh builder. Label errors point at the line
    /// that caused them: the redefinition, or the first jump to a label that
    /// never appears.
    pub fn build(self) -> Result<(ControlFlowGraph, SymbolTable), ListingError> {
        let mut builder = Builder::new(self.head);
        let mut first_use: Map<Label, Span> = Map::default();
        let end = self.events.last().map_or((0, 0), |e| e.loc);

        for Spanned { item, loc } in self.events {
            if let Event::Jump(_, target) = &item {
                first_use.entry(target.clone()).or_insert(loc);
            }
            builder
                .feed(item)
                .map_err(|err| ListingErrorKind::Cfg(err).with_span(loc))?;
        }

        let cfg = builder.finalize().map_err(|err| {
            let loc = match &err {
                CfgError::UnresolvedLabels(labels) => labels
                    .iter()
                    .filter_map(|l| first_use.get(l))
                    .min()
                    .copied()
                    .unwrap_or(end),
                CfgError::DuplicateLabel(_) => end,
            };
            ListingErrorKind::Cfg(err).with_span(loc)
        })?;

        Ok((cfg, self.symbols))
    }
}
