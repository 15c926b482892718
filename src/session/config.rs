use std::{fmt, path::PathBuf};

use crate::{
    ast::ImportDecl,
    session::{
        extension::{ExtensionFlag, ExtensionSet},
        package::PackageExposure,
        render::render,
    },
};

/// The state of one interactive session.
///
/// A session starts out empty ([`SessionConfig::default`]) and only changes
/// through [`crate::session::mutator::SessionMutator`], which borrows a
/// session and returns a new one. Independent sessions share nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub(in crate::session) extensions:       Vec<ExtensionFlag>,
    pub(in crate::session) exposed_packages: Vec<PackageExposure>,
    pub(in crate::session) active_imports:   Vec<ImportDecl>,
    pub(in crate::session) import_paths:     Vec<PathBuf>,
}

impl SessionConfig {
    /// Explicitly enabled extensions, in the order they were enabled.
    #[must_use]
    pub fn extensions(&self) -> &[ExtensionFlag] {
        &self.extensions
    }

    /// Exposed packages, most recently exposed first.
    #[must_use]
    pub fn exposed_packages(&self) -> &[PackageExposure] {
        &self.exposed_packages
    }

    /// Active imports, most recently added first.
    #[must_use]
    pub fn active_imports(&self) -> &[ImportDecl] {
        &self.active_imports
    }

    /// Module search paths, in the order they were added.
    #[must_use]
    pub fn import_paths(&self) -> &[PathBuf] {
        &self.import_paths
    }

    /// The flags in effect: the enabled extensions and everything they imply.
    ///
    /// This is what fragments are classified and imports parsed against.
    #[must_use]
    pub fn extension_flags(&self) -> ExtensionSet {
        ExtensionSet::resolve(self.extensions.iter().copied())
    }

    /// Returns `true` if some exposed package's resolved unit id starts with
    /// `name`.
    ///
    /// The match is textual, so `base` matches `base-4.18.0.0` but also
    /// `base-orphans-0.9`.
    ///
    /// # Example
    /// ```
    /// use evalctx::session::{
    ///     config::SessionConfig,
    ///     mutator::SessionMutator,
    ///     package::{PackageExposure, UnitId},
    /// };
    ///
    /// let resolver = |name: &str| Ok::<_, String>(UnitId::from(name));
    /// let finder = |_: &str, _: &[PackageExposure]| Ok::<_, String>(());
    /// let mutator = SessionMutator::new(&resolver, &finder);
    ///
    /// let config = mutator.expose_packages(&SessionConfig::default(), &["filepath-1.4.2.1"]).unwrap();
    /// assert!(config.has_package("filepath"));
    /// assert!(!config.has_package("directory"));
    /// ```
    #[must_use]
    pub fn has_package(&self, name: &str) -> bool {
        self.exposed_packages
            .iter()
            .filter_map(|exposure| exposure.resolved_unit.as_ref())
            .any(|unit| unit.as_str().starts_with(name))
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
