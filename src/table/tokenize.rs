/// Fields of one line, plus whether the scan finished inside a quoted region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub fields: Vec<String>,
    /// Set when an odd number of `"` left the tail of the line quoted.
    pub open_quote: bool,
}

/// Split `line` on `delimiter`, ignoring delimiters inside `"…"` regions.
///
/// Quoting is a parity toggle: every `"` flips the state, nothing is
/// escaped, and the quote characters stay in the emitted field. An
/// unterminated quote makes the rest of the line one field.
pub fn scan(line: &str, delimiter: char) -> Tokenized {
    let mut fields = Vec::new();
    let mut inside_quotes = false;
    let mut start = 0;

    for (idx, ch) in line.char_indices() {
        if ch == '"' {
            inside_quotes = !inside_quotes;
        } else if ch == delimiter && !inside_quotes {
            fields.push(line[start..idx].to_string());
            start = idx + ch.len_utf8();
        }
    }
    // tail after the last delimiter (or the whole line)
    fields.push(line[start..].to_string());

    Tokenized {
        fields,
        open_quote: inside_quotes,
    }
}

/// Field view of [`scan`].
pub fn tokenize(line: &str, delimiter: char) -> Vec<String> {
    scan(line, delimiter).fields
}

/// Remove one pair of bounding quotes, if present.
pub fn strip_quotes(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}
