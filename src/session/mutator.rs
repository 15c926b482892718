use std::path::PathBuf;

use tracing::debug;

use crate::{
    ast::ImportDecl,
    error::{ImportError, ImportErrorKind, PackageError},
    session::{
        config::SessionConfig,
        extension::ExtensionFlag,
        package::{ModuleFinder, PackageExposure, PackageResolver},
    },
    syntax::parser::import::parse_import_declaration,
};

/// Applies atomic changes to a session.
///
/// Holds borrowed references to the host collaborators and nothing else.
/// Every operation borrows the current session and either returns a new one
/// or an error; the caller's value is never touched, so on failure the
/// caller simply keeps using it.
#[derive(Debug)]
pub struct SessionMutator<'h, R: ?Sized, F: ?Sized> {
    resolver: &'h R,
    finder:   &'h F,
}

impl<R: ?Sized, F: ?Sized> Clone for SessionMutator<'_, R, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized, F: ?Sized> Copy for SessionMutator<'_, R, F> {}

impl<'h, R, F> SessionMutator<'h, R, F>
    where R: PackageResolver + ?Sized,
          F: ModuleFinder + ?Sized
{
    pub const fn new(resolver: &'h R, finder: &'h F) -> Self {
        Self { resolver, finder }
    }

    /// Exposes packages, all or nothing.
    ///
    /// Each request (a package name, optionally followed by a renaming clause)
    /// is parsed and resolved in order. If every one resolves, the new
    /// exposures are prepended, in request order, ahead of the packages that
    /// were already exposed. An empty request list changes nothing.
    ///
    /// # Parameters
    /// - `config`: The current session.
    /// - `requests`: Package requests such as `"base"` or
    ///   `"containers (Data.Map as Map)"`.
    ///
    /// # Errors
    /// Returns a [`PackageError`] naming the first request that is malformed
    /// or that the resolver rejects, with its diagnostic verbatim. Packages
    /// earlier in the list that did resolve are discarded with the rest.
    pub fn expose_packages<S>(&self,
                              config: &SessionConfig,
                              requests: &[S])
                              -> Result<SessionConfig, PackageError>
        where S: AsRef<str>
    {
        let mut exposures = Vec::with_capacity(requests.len());
        for request in requests {
            let request = request.as_ref();
            let mut exposure =
                PackageExposure::parse(request).map_err(|diagnostic| PackageError { name: request.trim().to_string(),
                                                                                   diagnostic })?;
            let unit = self.resolver
                           .resolve(&exposure.requested_name)
                           .map_err(|diagnostic| PackageError { name: exposure.requested_name.clone(),
                                                                diagnostic })?;
            debug!(package = %exposure.requested_name, %unit, "resolved package");
            exposure.resolved_unit = Some(unit);
            exposures.push(exposure);
        }

        let mut next = config.clone();
        if !exposures.is_empty() {
            debug!(count = exposures.len(), "exposing packages");
            next.exposed_packages.splice(0..0, exposures);
        }
        Ok(next)
    }

    /// Adds an import declaration.
    ///
    /// The text is parsed with the import grammar under the session's
    /// extension flags, then the module finder is asked whether the module is
    /// reachable through the exposed packages. On success the declaration is
    /// prepended to the active imports.
    ///
    /// # Returns
    /// The new session and its complete import list, most recent first.
    ///
    /// # Errors
    /// - [`ImportErrorKind::Syntax`] if the text is not a single import
    ///   declaration.
    /// - [`ImportErrorKind::ModuleNotFound`] with the finder's diagnostic
    ///   verbatim if the module cannot be found.
    pub fn add_import(&self,
                      config: &SessionConfig,
                      import_text: &str)
                      -> Result<(SessionConfig, Vec<ImportDecl>), ImportError> {
        let decl = parse_import_declaration(import_text, config.extension_flags()).map_err(|e| {
                       ImportError { kind:       ImportErrorKind::Syntax,
                                     module:     import_text.trim().to_string(),
                                     diagnostic: e.to_string(), }
                   })?;

        self.finder
            .find_module(&decl.module_name, &config.exposed_packages)
            .map_err(|diagnostic| ImportError { kind: ImportErrorKind::ModuleNotFound,
                                                module: decl.module_name.clone(),
                                                diagnostic })?;

        debug!(import = %decl, "adding import");
        let mut next = config.clone();
        next.active_imports.insert(0, decl);
        let imports = next.active_imports.clone();

        Ok((next, imports))
    }

    /// Enables an extension. Enabling one that is already on changes nothing.
    #[must_use]
    pub fn add_extension(&self, config: &SessionConfig, extension: ExtensionFlag) -> SessionConfig {
        let mut next = config.clone();
        if next.extensions.contains(&extension) {
            debug!(%extension, "extension already enabled");
        } else {
            debug!(%extension, "enabling extension");
            next.extensions.push(extension);
        }
        next
    }

    /// Appends a module search path unless it is already present.
    #[must_use]
    pub fn add_import_path(&self, config: &SessionConfig, path: impl Into<PathBuf>) -> SessionConfig {
        let path = path.into();
        let mut next = config.clone();
        if !next.import_paths.contains(&path) {
            debug!(path = %path.display(), "adding import path");
            next.import_paths.push(path);
        }
        next
    }
}
