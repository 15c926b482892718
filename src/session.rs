/// The closed vocabulary of language extensions and the resolved flag set.
///
/// Every extension the session understands is a variant of
/// [`extension::ExtensionFlag`], with a static name table used for parsing and
/// printing. Enabling a flag may switch on others; [`extension::ExtensionSet`]
/// holds the closure that the parser consults.
pub mod extension;
/// The session value itself.
///
/// A [`config::SessionConfig`] records the enabled extensions, the exposed
/// packages, the active imports and the import search paths. It is a plain
/// value: the caller owns it and every mutation produces a new one.
pub mod config;
/// Packages and the two host collaborators.
///
/// Defines how a package request is recorded once exposed, including module
/// renamings, and the [`package::PackageResolver`] and
/// [`package::ModuleFinder`] traits through which the session reaches the
/// host toolchain.
pub mod package;
/// Atomic session mutations.
///
/// The [`mutator::SessionMutator`] borrows the collaborators and turns one
/// session value plus one request into a new session value or a structured
/// error. A failed request never changes anything.
pub mod mutator;
/// Human-readable session dumps for debugging and tests.
pub mod render;
