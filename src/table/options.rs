use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::error::TableError;

/// What `read` does with the quotes the tokenizer leaves in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Store `"Bob,Jr"` with its quotes, so a later write reproduces the line.
    #[default]
    Retain,
    /// Drop one pair of bounding quotes from each parsed field.
    Strip,
}

/// Construction-time settings for a [`Table`](super::Table).
///
/// ```yaml
/// delimiter: "|"
/// has_header_row: true
/// quotes: strip
/// strict: false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub delimiter: char,
    pub has_header_row: bool,
    pub quotes: QuoteMode,
    /// Reject unterminated quotes and ragged rows on read instead of absorbing them.
    pub strict: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header_row: false,
            quotes: QuoteMode::Retain,
            strict: false,
        }
    }
}

impl TableOptions {
    pub fn new(delimiter: char, has_header_row: bool) -> Self {
        Self {
            delimiter,
            has_header_row,
            ..Self::default()
        }
    }

    /// Refuse the quote character and line terminators as delimiters.
    pub fn validate(&self) -> std::result::Result<(), TableError> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(TableError::InvalidDelimiter(self.delimiter)),
            _ => Ok(()),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let opts: Self = serde_yaml::from_str(text).context("parsing table options YAML")?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text).context("parsing table options JSON")?;
        opts.validate()?;
        Ok(opts)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading table options {:?}", path))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.with_context(|| format!("loading table options from {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn yaml_fills_missing_fields_with_defaults() -> Result<()> {
        let opts = TableOptions::from_yaml_str("delimiter: \"|\"\nhas_header_row: true\n")?;
        assert_eq!(opts.delimiter, '|');
        assert!(opts.has_header_row);
        assert_eq!(opts.quotes, QuoteMode::Retain);
        assert!(!opts.strict);
        Ok(())
    }

    #[test]
    fn json_quote_mode() -> Result<()> {
        let opts = TableOptions::from_json_str(r#"{"delimiter":"\t","quotes":"strip"}"#)?;
        assert_eq!(opts.delimiter, '\t');
        assert_eq!(opts.quotes, QuoteMode::Strip);
        Ok(())
    }

    #[test]
    fn rejects_quote_delimiter() {
        assert!(TableOptions::from_yaml_str("delimiter: '\"'").is_err());
        assert_eq!(
            TableOptions::new('\r', false).validate(),
            Err(TableError::InvalidDelimiter('\r'))
        );
        assert!(TableOptions::new(',', false).validate().is_ok());
    }

    #[test]
    fn from_path_picks_format_by_extension() -> Result<()> {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(json, r#"{{"delimiter":";","strict":true}}"#)?;
        let opts = TableOptions::from_path(json.path())?;
        assert_eq!(opts.delimiter, ';');
        assert!(opts.strict);

        let mut yaml = NamedTempFile::new()?;
        writeln!(yaml, "has_header_row: true")?;
        let opts = TableOptions::from_path(yaml.path())?;
        assert_eq!(opts.delimiter, ',');
        assert!(opts.has_header_row);
        Ok(())
    }
}
