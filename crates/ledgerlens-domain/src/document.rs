//! Document identity

use std::fmt;

/// Identity of an uploaded filing.
///
/// The identity is the base filename with its final extension stripped, so
/// `uploads/ACME-2024.pdf`, `ACME-2024.pdf` and `ACME-2024.txt` all name the
/// same document. Every derived artifact (extracted text, rendered graph) is
/// keyed by this value.
///
/// # Examples
///
/// ```
/// use ledgerlens_domain::DocumentId;
///
/// let id = DocumentId::from_filename("filings/ACME-2024.pdf").unwrap();
/// assert_eq!(id.as_str(), "ACME-2024");
/// assert_eq!(id.graph_file_name(), "ACME-2024.html");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive a document id from a filename or path.
    ///
    /// Returns `None` when nothing is left after stripping the directory and
    /// extension (an empty selection).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let base = filename
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(filename)
            .trim();

        let stem = strip_extension(base);
        if stem.is_empty() {
            None
        } else {
            Some(Self(stem.to_string()))
        }
    }

    /// The identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the extracted section text artifact
    pub fn text_file_name(&self) -> String {
        format!("{}.txt", self.0)
    }

    /// File name of the rendered graph artifact
    pub fn graph_file_name(&self) -> String {
        format!("{}.html", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip the last extension, leaving dot-files (`.env`) intact.
fn strip_extension(base: &str) -> &str {
    let leading_dots = base.len() - base.trim_start_matches('.').len();
    match base[leading_dots..].rfind('.') {
        Some(idx) => &base[..leading_dots + idx],
        None => base,
    }
}
