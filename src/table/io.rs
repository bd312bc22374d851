use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use super::observer::TableObserver;
use super::options::TableOptions;
use super::store::Table;
use crate::lines::LineStore;

impl Table {
    /// Read `path` from `store` and parse it with `options`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P, L>(
        path: P,
        options: TableOptions,
        store: &L,
        observer: &dyn TableObserver,
    ) -> Result<Table>
    where
        P: AsRef<Path>,
        L: LineStore + ?Sized,
    {
        let path = path.as_ref();
        let mut table = Table::try_with_options(options)?;
        let lines = store
            .read_lines(path)
            .with_context(|| format!("loading table from {:?}", path))?;
        debug!(lines = lines.len(), "parsing");

        table
            .read_with(&lines, observer)
            .with_context(|| format!("parsing table {:?}", path))?;
        observer.loaded(path, table.row_count());
        Ok(table)
    }

    /// Serialize and hand the lines to `store` for `path`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display(), rows = self.row_count()))]
    pub fn save<P, L>(&self, path: P, store: &L, observer: &dyn TableObserver) -> Result<()>
    where
        P: AsRef<Path>,
        L: LineStore + ?Sized,
    {
        let path = path.as_ref();
        let lines = self.write();
        store
            .write_lines(path, &lines)
            .with_context(|| format!("saving table to {:?}", path))?;
        observer.saved(path, lines.len());
        Ok(())
    }

    /// Append every row (never the headers) to an existing resource.
    pub fn append_rows_to<P, L>(&self, path: P, store: &L) -> Result<()>
    where
        P: AsRef<Path>,
        L: LineStore + ?Sized,
    {
        let path = path.as_ref();
        let lines: Vec<String> = self.rows().map(|r| self.join_line(r)).collect();
        store
            .append_lines(path, &lines)
            .with_context(|| format!("appending rows to {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{DiskLines, MemoryLines};
    use crate::table::{QuoteMode, TableError, TracingObserver};
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::{fmt, EnvFilter};

    fn init_logging() {
        let _ = fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }

    #[derive(Default)]
    struct Counts {
        loaded: Cell<usize>,
        saved: Cell<usize>,
    }

    impl TableObserver for Counts {
        fn loaded(&self, _path: &Path, rows: usize) {
            self.loaded.set(rows);
        }
        fn saved(&self, _path: &Path, lines: usize) {
            self.saved.set(lines);
        }
    }

    #[test]
    fn save_then_load_from_disk() -> Result<()> {
        init_logging();
        let tmp = tempdir()?;
        let path = tmp.path().join("out").join("people.csv");

        let mut t = Table::new(',', true);
        t.set_headers(["id", "name"])?;
        t.add_row(["1", "Alice"]);
        t.add_row(["2", "Bob,Jr"]);

        let counts = Counts::default();
        t.save(&path, &DiskLines, &counts)?;
        assert_eq!(counts.saved.get(), 3);
        assert_eq!(
            fs::read_to_string(&path)?,
            "id,name\n1,Alice\n2,\"Bob,Jr\"\n"
        );

        let back = Table::load(&path, t.options(), &DiskLines, &counts)?;
        assert_eq!(counts.loaded.get(), 2);
        assert_eq!(back, t);
        assert_eq!(back.get_by_name(1, "name")?, "\"Bob,Jr\"");
        Ok(())
    }

    #[test]
    fn load_with_strip_quotes() -> Result<()> {
        let store = MemoryLines::new();
        store.insert("t.csv", ["id,name", "2,\"Bob,Jr\""])?;
        let opts = TableOptions {
            quotes: QuoteMode::Strip,
            ..TableOptions::new(',', true)
        };
        let t = Table::load("t.csv", opts, &store, &TracingObserver)?;
        assert_eq!(t.get_by_name(0, "name")?, "Bob,Jr");
        Ok(())
    }

    #[test]
    fn strip_load_then_save_keeps_row_width() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("people.csv");
        fs::write(&path, "id,name\n2,\"Bob,Jr\"\n")?;
        let opts = TableOptions {
            quotes: QuoteMode::Strip,
            ..TableOptions::new(',', true)
        };

        let t = Table::load(&path, opts, &DiskLines, &())?;
        t.save(&path, &DiskLines, &())?;
        assert_eq!(fs::read_to_string(&path)?, "id,name\n2,\"Bob,Jr\"\n");

        let back = Table::load(&path, opts, &DiskLines, &())?;
        assert_eq!(back.row(0)?, ["2", "Bob,Jr"]);

        // appended rows are quoted the same way
        back.append_rows_to(&path, &DiskLines)?;
        let again = Table::load(&path, opts, &DiskLines, &())?;
        assert_eq!(again.column_by_name("name")?, vec!["Bob,Jr", "Bob,Jr"]);
        Ok(())
    }

    #[test]
    fn load_refuses_quote_delimiter() {
        let store = MemoryLines::new();
        let err = Table::load("q.csv", TableOptions::new('"', false), &store, &()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TableError>(),
            Some(&TableError::InvalidDelimiter('"'))
        );
    }

    #[test]
    fn load_missing_resource_fails() {
        let store = MemoryLines::new();
        let err = Table::load("nope.csv", TableOptions::default(), &store, &()).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.csv"));
    }

    #[test]
    fn strict_load_surfaces_table_error() -> Result<()> {
        let store = MemoryLines::new();
        store.insert("bad.csv", ["a,b", "1"])?;
        let opts = TableOptions {
            strict: true,
            ..TableOptions::new(',', true)
        };
        let err = Table::load("bad.csv", opts, &store, &()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TableError>(),
            Some(TableError::Malformed { line: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn append_rows_skips_headers() -> Result<()> {
        let store = MemoryLines::new();
        store.insert("log.csv", ["k,v", "1,a"])?;

        let mut extra = Table::new(',', true);
        extra.set_headers(["k", "v"])?;
        extra.add_row(["2", "b"]);
        extra.append_rows_to("log.csv", &store)?;

        let t = Table::load("log.csv", extra.options(), &store, &())?;
        assert_eq!(t.column_by_name("v")?, vec!["a", "b"]);
        Ok(())
    }
}
