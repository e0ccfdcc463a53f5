//! Indexed Identifiers
//!
//! Form fields inside a list carry their row index in `id`, `for` and `name`
//! attributes, either trailing (`authors-2`) or embedded (`authors-2-email`).
//! `IndexPrefix` is the part before the index and knows how to move an
//! identifier from one row index to another.

/// Identifier prefix shared by every row of one list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPrefix(String);

impl IndexPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Detect the prefix from the identifiers of the row at `index`.
    ///
    /// Every `-<index>` segment ending at a boundary proposes the text before
    /// it. The proposal made by the most identifiers wins, the longer one on a
    /// tie, so helper ids such as `select2-<field>-container` are outvoted by
    /// the field's own `id`, `name` and label `for`.
    pub fn detect<S: AsRef<str>>(identifiers: &[S], index: usize) -> Option<Self> {
        let mut votes: Vec<(&str, usize)> = Vec::new();
        for value in identifiers {
            let value = value.as_ref();
            for pos in index_positions(value, index) {
                let candidate = &value[..pos];
                match votes.iter_mut().find(|(prefix, _)| *prefix == candidate) {
                    Some((_, count)) => *count += 1,
                    None => votes.push((candidate, 1)),
                }
            }
        }
        votes
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(a.0.len().cmp(&b.0.len())))
            .map(|(prefix, _)| Self(prefix.to_string()))
    }

    /// Row index encoded in `value`, if it belongs to this prefix
    pub fn index_of(&self, value: &str) -> Option<usize> {
        let rest = value.strip_prefix(self.0.as_str())?.strip_prefix('-')?;
        let digits = rest.split('-').next()?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Rewrite `value` from row `from` to row `to`.
    ///
    /// Returns None when `value` does not carry index `from` under this prefix.
    pub fn reindex(&self, value: &str, from: usize, to: usize) -> Option<String> {
        let old = format!("{}-{}", self.0, from);
        let rest = value.strip_prefix(old.as_str())?;
        if !(rest.is_empty() || rest.starts_with('-')) {
            return None;
        }
        Some(format!("{}-{}{}", self.0, to, rest))
    }

    /// Rewrite any identifier found in a row from index `from` to `to`.
    ///
    /// Values led by the prefix go through `reindex`. Otherwise the prefix is
    /// looked for after a separator (`flatpickr-clear-button-dates-0`), and
    /// failing that the last `-<from>` segment is moved.
    pub fn rewrite(&self, value: &str, from: usize, to: usize) -> Option<String> {
        self.reindex(value, from, to)
            .or_else(|| self.reindex_embedded(value, from, to))
            .or_else(|| reindex_segment(value, from, to))
    }

    fn reindex_embedded(&self, value: &str, from: usize, to: usize) -> Option<String> {
        let old = format!("{}-{}", self.0, from);
        let bytes = value.as_bytes();
        let pos = value
            .match_indices(old.as_str())
            .map(|(pos, _)| pos)
            .filter(|&pos| {
                let end = pos + old.len();
                pos > 0
                    && !bytes[pos - 1].is_ascii_alphanumeric()
                    && (end == bytes.len() || bytes[end] == b'-')
            })
            .last()?;
        Some(format!("{}{}-{}{}", &value[..pos], self.0, to, &value[pos + old.len()..]))
    }
}

/// Start of every `-<index>` segment in `value` followed by `-` or the end
fn index_positions(value: &str, index: usize) -> Vec<usize> {
    let token = format!("-{}", index);
    let bytes = value.as_bytes();
    value
        .match_indices(token.as_str())
        .map(|(pos, _)| pos)
        .filter(|&pos| {
            let end = pos + token.len();
            pos > 0 && (end == bytes.len() || bytes[end] == b'-')
        })
        .collect()
}

/// Move the last `-<from>` segment of `value` to `-<to>`
fn reindex_segment(value: &str, from: usize, to: usize) -> Option<String> {
    let pos = *index_positions(value, from).last()?;
    let end = pos + format!("-{}", from).len();
    Some(format!("{}-{}{}", &value[..pos], to, &value[end..]))
}
