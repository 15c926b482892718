//! # evalctx
//!
//! evalctx is the session core of an interactive evaluator for a
//! Haskell-like language. It decides whether a fragment of source text is an
//! expression, and it evolves the session a fragment is evaluated in: the
//! enabled language extensions, the exposed packages and the active imports.
//!
//! Sessions are plain values. Every change goes through
//! [`SessionMutator`], which borrows the current session and returns a new
//! one or a structured error; a failed change leaves nothing behind. The
//! host toolchain is reached only through the [`PackageResolver`] and
//! [`ModuleFinder`] traits.
//!
//! ```
//! use evalctx::{
//!     ClassificationResult, ExtensionFlag, InstalledPackages, SessionConfig, SessionMutator,
//!     classify,
//! };
//!
//! let db = InstalledPackages::new().with_unit("base-4.18.0.0", ["Prelude", "Data.Maybe"]);
//! let mutator = SessionMutator::new(&db, &db);
//!
//! let session = SessionConfig::default();
//! let session = mutator.add_extension(&session, ExtensionFlag::LambdaCase);
//! let session = mutator.expose_packages(&session, &["base"]).unwrap();
//! let (session, _) = mutator.add_import(&session, "import Data.Maybe").unwrap();
//!
//! let fragment = "\\case { Just x -> x; Nothing -> 0 }";
//! assert_eq!(classify(session.extension_flags(), fragment), ClassificationResult::IsExpression);
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the syntax tree of fragments.
///
/// This module declares the `Expr` enum and the pattern, type, binding and
/// import types it is built from. The parser produces these values; the
/// classifier only cares whether one could be produced, and the session
/// keeps the [`ast::ImportDecl`]s it has accepted.
pub mod ast;
/// Classifies fragments as expressions or not.
///
/// Classification is a speculative, side-effect-free parse of the whole
/// fragment as one expression under the session's extension flags. Every
/// failure collapses into the same verdict.
pub mod classifier;
/// Loads sessions from TOML files.
///
/// A session file lists extensions, packages, imports and import paths to
/// replay onto a session, and optionally an installed package database.
pub mod config;
/// Provides error types for parsing, session mutation and session files.
///
/// # Responsibilities
/// - Defines error enums for every failure mode.
/// - Carries collaborator diagnostics verbatim so they can be shown to the
///   user unmodified.
/// - Attaches line numbers to syntax errors.
pub mod error;
/// An in-memory installed package database.
///
/// Serves as both host collaborators when no real toolchain is available,
/// as in the command-line tool and the tests.
pub mod package_db;
/// Session state and its mutation.
///
/// # Responsibilities
/// - Defines the session value and the extension vocabulary.
/// - Applies atomic, all-or-nothing changes through the collaborators.
/// - Renders sessions for debugging.
pub mod session;
/// Lexing and parsing of fragments.
///
/// Turns fragment text into tokens and then into the syntax tree, honouring
/// the extension flags in effect.
pub mod syntax;

pub use classifier::{ClassificationResult, FragmentKind, classify, fragment_kind};
pub use package_db::InstalledPackages;
pub use session::{
    config::SessionConfig,
    extension::{ExtensionFlag, ExtensionSet},
    mutator::SessionMutator,
    package::{ModuleFinder, PackageExposure, PackageResolver, UnitId},
    render::render,
};
