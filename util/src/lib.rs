pub mod export;
pub mod id;
pub mod slot;
pub mod span;

pub use export::export_lines;
pub use id::Id;
pub use slot::Slot;
pub use span::*;

use std::fmt;

pub fn format_vec<T: fmt::Display>(
    f: &mut fmt::Formatter,
    v: &[T],
    left: &str,
    sep: &str,
    right: &str,
) -> fmt::Result {
    write!(f, "{}", left)?;
    if !v.is_empty() {
        write!(f, "{}", v[0])?;
        for e in &v[1..v.len()] {
            write!(f, "{}{}", sep, e)?;
        }
    }
    write!(f, "{}", right)
}

pub use fnv::FnvHashMap as Map;
pub use fnv::FnvHashSet as Set;

/// Elements of a set in ascending order, for reproducible output.
pub fn sorted<T: Ord + Copy>(set: &Set<T>) -> Vec<T> {
    let mut v: Vec<T> = set.iter().copied().collect();
    v.sort_unstable();
    v
}
