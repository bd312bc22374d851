use super::error::{Result, TableError};
use super::observer::TableObserver;
use super::options::{QuoteMode, TableOptions};
use super::tokenize::{scan, strip_quotes, Tokenized};

/// In-memory delimited table: optional header names plus densely indexed rows.
///
/// Rows are addressed `0..row_count()` in insertion order and are never
/// removed. Header configuration is frozen once the first row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    options: TableOptions,
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// `delimiter` must not be `"` or a line terminator; such a table never
    /// splits a line. Use [`Table::try_with_options`] to have that checked.
    pub fn new(delimiter: char, has_header_row: bool) -> Self {
        Self::with_options(TableOptions::new(delimiter, has_header_row))
    }

    /// Unchecked; see [`Table::new`].
    pub fn with_options(options: TableOptions) -> Self {
        Self {
            options,
            headers: None,
            rows: Vec::new(),
        }
    }

    /// Like [`Table::with_options`], refusing a delimiter that cannot split.
    pub fn try_with_options(options: TableOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::with_options(options))
    }

    /// Build a table from raw lines in one go.
    pub fn parse<I, S>(options: TableOptions, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::try_with_options(options)?;
        table.read(lines)?;
        Ok(table)
    }

    pub fn options(&self) -> TableOptions {
        self.options
    }

    pub fn delimiter(&self) -> char {
        self.options.delimiter
    }

    pub fn has_header_row(&self) -> bool {
        self.options.has_header_row
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Replace the header names. Refused once any row exists.
    pub fn set_headers<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.rows.is_empty() {
            return Err(TableError::HeadersLocked(self.rows.len()));
        }
        self.headers = Some(names.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Position of `name` in the header list.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .as_ref()
            .and_then(|h| h.iter().position(|n| n == name))
            .ok_or_else(|| TableError::FieldNotFound(name.to_string()))
    }

    pub fn row(&self, row: usize) -> Result<&[String]> {
        self.rows
            .get(row)
            .map(Vec::as_slice)
            .ok_or(TableError::RowNotFound(row))
    }

    /// The `col`-th field of every row, in row order. Fails on the first row
    /// too short to have that column.
    pub fn column(&self, col: usize) -> Result<Vec<&str>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, fields)| {
                fields
                    .get(col)
                    .map(String::as_str)
                    .ok_or(TableError::ColumnNotFound { row, col })
            })
            .collect()
    }

    pub fn column_by_name(&self, name: &str) -> Result<Vec<&str>> {
        let col = self.column_index(name)?;
        self.column(col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&str> {
        self.row(row)?
            .get(col)
            .map(String::as_str)
            .ok_or(TableError::ColumnNotFound { row, col })
    }

    pub fn get_by_name(&self, row: usize, name: &str) -> Result<&str> {
        let col = self.column_index(name)?;
        self.get(row, col)
    }

    /// Append a row of empty strings and return its index.
    ///
    /// With a header row the width comes from the headers and `width` must
    /// be 0; without one `width` must be non-zero.
    pub fn add_empty_row(&mut self, width: usize) -> Result<usize> {
        let width = if self.options.has_header_row {
            let headers = self
                .headers
                .as_ref()
                .ok_or(TableError::HeadersNotConfigured)?;
            if width != 0 {
                return Err(TableError::WidthNotAllowed(width));
            }
            headers.len()
        } else if width == 0 {
            return Err(TableError::WidthRequired);
        } else {
            width
        };

        self.rows.push(vec![String::new(); width]);
        Ok(self.rows.len() - 1)
    }

    /// Append a row, quoting any value that contains the delimiter and no
    /// quote yet. Returns the new row's index.
    pub fn add_row<I, S>(&mut self, fields: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_optional_row(fields.into_iter().map(Some))
    }

    /// Like [`Table::add_row`], with `None` stored as an empty field.
    pub fn add_optional_row<I, S>(&mut self, fields: I) -> usize
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let delimiter = self.options.delimiter;
        let row: Vec<String> = fields
            .into_iter()
            .map(|f| match f {
                None => String::new(),
                Some(v) => quote_on_insert(v.into(), delimiter),
            })
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Overwrite an existing row verbatim.
    pub fn set_row<I, S>(&mut self, row: usize, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slot = self.rows.get_mut(row).ok_or(TableError::RowNotFound(row))?;
        *slot = fields.into_iter().map(Into::into).collect();
        Ok(())
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let fields = self.rows.get_mut(row).ok_or(TableError::RowNotFound(row))?;
        let cell = fields
            .get_mut(col)
            .ok_or(TableError::ColumnNotFound { row, col })?;
        *cell = value.into();
        Ok(())
    }

    pub fn set_by_name(&mut self, row: usize, name: &str, value: impl Into<String>) -> Result<()> {
        let col = self.column_index(name)?;
        self.set(row, col, value)
    }

    /// Parse `lines` into the table without reporting diagnostics.
    pub fn read<I, S>(&mut self, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read_with(lines, &())
    }

    /// Parse `lines` into the table, returning how many rows were appended.
    ///
    /// The first line becomes the headers when the table has a header row.
    /// Parsed fields are stored exactly as tokenized (no insert quoting).
    /// Malformed lines are reported to `observer`, or rejected in strict mode.
    /// Nothing is committed unless every line is accepted.
    pub fn read_with<I, S>(&mut self, lines: I, observer: &dyn TableObserver) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let TableOptions {
            delimiter,
            has_header_row,
            quotes,
            strict,
        } = self.options;

        let mut headers: Option<Vec<String>> = None;
        let mut staged: Vec<Vec<String>> = Vec::new();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let line_no = idx + 1;
            let Tokenized { fields, open_quote } = scan(line, delimiter);

            if open_quote {
                if strict {
                    return Err(TableError::Malformed {
                        line: line_no,
                        reason: "unterminated quote".to_string(),
                    });
                }
                observer.unterminated_quote(line_no, line);
            }

            let fields: Vec<String> = match quotes {
                QuoteMode::Retain => fields,
                QuoteMode::Strip => fields
                    .iter()
                    .map(|f| strip_quotes(f).to_string())
                    .collect(),
            };

            if idx == 0 && has_header_row {
                if !self.rows.is_empty() {
                    return Err(TableError::HeadersLocked(self.rows.len()));
                }
                headers = Some(fields);
                continue;
            }

            if let Some(expected) = headers.as_ref().or(self.headers.as_ref()).map(Vec::len) {
                if expected != fields.len() {
                    if strict {
                        return Err(TableError::Malformed {
                            line: line_no,
                            reason: format!("expected {} fields, found {}", expected, fields.len()),
                        });
                    }
                    observer.ragged_row(line_no, expected, fields.len());
                }
            }
            staged.push(fields);
        }

        if headers.is_some() {
            self.headers = headers;
        }
        let appended = staged.len();
        self.rows.extend(staged);
        Ok(appended)
    }

    /// Serialize to lines: the headers (if configured), then every row,
    /// joined by the delimiter.
    ///
    /// Fields are written verbatim under [`QuoteMode::Retain`]. Under
    /// [`QuoteMode::Strip`] the quotes removed on read are put back, so a
    /// field holding the delimiter and no `"` is quoted again.
    ///
    /// Headers set by hand on a table without a header row are still
    /// written; reading that output back with the same options yields them
    /// as row 0.
    pub fn write(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        if let Some(headers) = &self.headers {
            out.push(self.join_line(headers));
        }
        out.extend(self.rows.iter().map(|r| self.join_line(r)));
        out
    }

    /// One serialized line for `fields`, quoted per the table's [`QuoteMode`].
    pub(crate) fn join_line(&self, fields: &[String]) -> String {
        let delimiter = self.options.delimiter;
        let sep = delimiter.to_string();
        match self.options.quotes {
            QuoteMode::Retain => fields.join(&sep),
            QuoteMode::Strip => fields
                .iter()
                .map(|f| quote_on_insert(f.clone(), delimiter))
                .collect::<Vec<_>>()
                .join(&sep),
        }
    }
}

fn quote_on_insert(value: String, delimiter: char) -> String {
    if value.contains(delimiter) && !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        value
    }
}
