//! Rendering the dictionary.

use crate::dictionary::DictionaryEntry;
use std::io::{self, Write};

/// Write one `<frequency> <size> <score> <pattern>` line per entry, at most `top` lines.
pub fn write_dictionary<W: Write>(
    out: &mut W,
    entries: &[DictionaryEntry],
    top: Option<usize>,
) -> io::Result<()> {
    for entry in entries.iter().take(top.unwrap_or(usize::MAX)) {
        writeln!(
            out,
            "{} {} {} {}",
            entry.frequency(),
            entry.size(),
            entry.score(),
            entry.representative()
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::PatternStore;
    use crate::pattern::Pattern;

    #[test]
    fn test_write_dictionary() {
        let mut path = Pattern::new(false);
        path.add_vertex(100);
        path.add_vertex(999);
        path.add_vertex(100);
        path.add_edge(0, 1, 1);
        path.add_edge(1, 2, 2);
        let mut edge = Pattern::new(false);
        edge.add_vertex(5);
        edge.add_vertex(5);
        edge.add_edge(0, 1, 3);
        let mut store = PatternStore::new();
        for _ in 0..3 {
            store.record(path.clone(), 0).unwrap();
        }
        store.record(edge, 1).unwrap();

        let mut out = vec![];
        write_dictionary(&mut out, &store.snapshot(), None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3 2 2 v 0 100 v 1 999 v 2 100 ; e 0 1 1 e 1 2 2\n\
             1 1 0 v 0 5 v 1 5 ; e 0 1 3\n"
        );

        let mut out = vec![];
        write_dictionary(&mut out, &store.snapshot(), Some(1)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
