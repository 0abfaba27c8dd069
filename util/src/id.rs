use global_counter::primitive::exact::CounterUsize;

pub type Id = String;

static COUNTER: CounterUsize = CounterUsize::new(0);

fn next() -> usize {
    let n = COUNTER.get();
    COUNTER.inc();
    n
}

/// Fresh jump-target label, unique for the whole process.
pub fn gen_label_with(s: &str) -> Id {
    format!("L{}_{}", s, next())
}
