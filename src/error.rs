/// Error type for msys2-metadata parsing and operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed CPE string or a component that cannot be represented.
    #[error("invalid CPE: {0}")]
    InvalidFormat(String),

    /// Malformed Package URL.
    #[error("invalid PURL: {0}")]
    InvalidPurl(String),

    /// A non-blank SRCINFO line without a `key = value` separator.
    #[error("malformed SRCINFO line: {0}")]
    MalformedLine(String),

    /// A field required to derive a value is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Per-environment SRCINFOs of one package disagree on `pkgbase`.
    #[error("multiple pkgbase values found: {}", .0.join(", "))]
    PkgbaseMismatch(Vec<String>),
}

/// Result type for msys2-metadata operations.
pub type Result<T> = std::result::Result<T, Error>;
