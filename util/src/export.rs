use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn write_all<I>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut w = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(w, "{}", line)?;
    }
    w.flush()
}

/// Best-effort diagnostic dump. Failures are logged and otherwise ignored;
/// returns whether the file was written.
pub fn export_lines<I>(path: &Path, lines: I) -> bool
where
    I: IntoIterator<Item = String>,
{
    match write_all(path, lines) {
        Ok(()) => {
            log::info!("wrote {}", path.display());
            true
        }
        Err(err) => {
            log::warn!("could not write {}: {}", path.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_path_is_not_fatal() {
        let path = Path::new("/nonexistent-dir/definitely/missing/graph.dot");
        assert!(!export_lines(path, vec!["digraph {}".to_string()]));
    }

    #[test]
    fn writes_every_line() {
        let path = std::env::temp_dir().join(format!("util-export-{}.dot", std::process::id()));
        assert!(export_lines(&path, vec!["a".to_string(), "b".to_string()]));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a\nb\n");
        let _ = std::fs::remove_file(&path);
    }
}
