use std::path::Path;
use tracing::{info, warn};

/// Receives diagnostics from table reads and file round trips.
///
/// The caller owns the observer and passes it into the operations that
/// report. Every method defaults to a no-op; `()` is the silent observer.
pub trait TableObserver {
    /// A line ended inside a quoted region and was absorbed as-is.
    fn unterminated_quote(&self, _line: usize, _text: &str) {}

    /// A parsed row's width differs from the header count.
    fn ragged_row(&self, _line: usize, _expected: usize, _found: usize) {}

    fn loaded(&self, _path: &Path, _rows: usize) {}

    fn saved(&self, _path: &Path, _lines: usize) {}
}

impl TableObserver for () {}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TableObserver for TracingObserver {
    fn unterminated_quote(&self, line: usize, text: &str) {
        warn!(line, text, "unterminated quote; rest of line kept as one field");
    }

    fn ragged_row(&self, line: usize, expected: usize, found: usize) {
        warn!(line, expected, found, "row width does not match headers");
    }

    fn loaded(&self, path: &Path, rows: usize) {
        info!(path = %path.display(), rows, "read table");
    }

    fn saved(&self, path: &Path, lines: usize) {
        info!(path = %path.display(), lines, "wrote table");
    }
}
