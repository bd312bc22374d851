pub mod lines;
pub mod table;

pub use lines::{DiskLines, LineStore, MemoryLines};
pub use table::{
    QuoteMode, Table, TableError, TableObserver, TableOptions, Tokenized, TracingObserver,
};
