/// A package the resolver refused to expose.
///
/// Displays as the resolver's diagnostic, unmodified, e.g.
/// `cannot satisfy -package doesNotExist`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{diagnostic}")]
pub struct PackageError {
    /// The first requested package name that failed.
    pub name:       String,
    /// The resolver's message.
    pub diagnostic: String,
}

/// Why an import could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The module finder could not locate the module in any exposed package.
    ModuleNotFound,
    /// The fragment is not a well-formed import declaration.
    Syntax,
}

/// An import that could not be added to the session.
///
/// Displays as the underlying diagnostic, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{diagnostic}")]
pub struct ImportError {
    /// What went wrong.
    pub kind:       ImportErrorKind,
    /// The imported module, or the trimmed fragment when it did not parse.
    pub module:     String,
    /// The module finder's (or parser's) message.
    pub diagnostic: String,
}

impl ImportError {
    /// Returns `true` when the module could not be located.
    #[must_use]
    pub fn is_module_not_found(&self) -> bool {
        self.kind == ImportErrorKind::ModuleNotFound
    }
}

/// An extension name outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported extension: {0}")]
pub struct UnknownExtension(pub String);
