pub mod error;
pub mod io;
pub mod observer;
pub mod options;
pub mod store;
pub mod tokenize;

pub use error::TableError;
pub use observer::{TableObserver, TracingObserver};
pub use options::{QuoteMode, TableOptions};
pub use store::Table;
pub use tokenize::{scan, strip_quotes, tokenize, Tokenized};
