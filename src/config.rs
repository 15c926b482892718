use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ConfigError,
    package_db::InstalledPackages,
    session::{
        config::SessionConfig,
        extension::ExtensionFlag,
        mutator::SessionMutator,
        package::{ModuleFinder, PackageResolver},
    },
};

/// A session described in TOML.
///
/// ```toml
/// extensions = ["LambdaCase"]
/// packages = ["base", "containers (Data.Map as Map)"]
/// imports = ["import Data.Maybe"]
/// import_paths = ["src"]
///
/// [units]
/// "base-4.18.0.0" = ["Prelude", "Data.Maybe", "Data.List"]
/// "containers-0.6.7" = ["Data.Map", "Data.Set"]
/// ```
/// Every key is optional. `units` describes an installed package database
/// that can serve as the session's collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionFile {
    /// Extension names to enable, in order.
    pub extensions:   Vec<String>,
    /// Package requests, exposed together in one call.
    pub packages:     Vec<String>,
    /// Import declarations, added one at a time in order.
    pub imports:      Vec<String>,
    /// Module search paths.
    pub import_paths: Vec<PathBuf>,
    /// Installed units and the modules they expose.
    pub units:        BTreeMap<String, Vec<String>>,
}

impl SessionFile {
    /// Reads and parses a session file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Toml`] if it does not match the schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(),
                                                                                   source })?;
        let file = Self::from_toml(&contents)?;
        debug!(path = %path.display(), "loaded session file");
        Ok(file)
    }

    /// Parses a session file from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Toml`] if the text does not match the schema.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds the package database described by `units`.
    #[must_use]
    pub fn package_db(&self) -> InstalledPackages {
        self.units
            .iter()
            .fold(InstalledPackages::new(), |db, (unit, modules)| {
                db.with_unit(unit.as_str(), modules.iter().cloned())
            })
    }

    /// Replays the file onto `base`.
    ///
    /// Applies, in order: extensions, import paths, packages (in a single
    /// call), then each import. Imports are parsed with the extensions
    /// enabled by the file.
    ///
    /// # Errors
    /// Returns the first unknown extension, package error or import error.
    /// Nothing is returned on failure, so `base` stays as it was.
    ///
    /// # Example
    /// ```
    /// use evalctx::{
    ///     config::SessionFile,
    ///     session::{config::SessionConfig, mutator::SessionMutator},
    /// };
    ///
    /// let file = SessionFile::from_toml(r#"
    ///     packages = ["base"]
    ///     imports = ["import Data.Maybe (fromMaybe)"]
    ///
    ///     [units]
    ///     "base-4.18.0.0" = ["Prelude", "Data.Maybe"]
    /// "#).unwrap();
    /// let db = file.package_db();
    /// let mutator = SessionMutator::new(&db, &db);
    ///
    /// let config = file.apply(&mutator, &SessionConfig::default()).unwrap();
    /// assert!(config.has_package("base"));
    /// assert_eq!(config.active_imports()[0].to_string(), "import Data.Maybe (fromMaybe)");
    /// ```
    pub fn apply<R, F>(&self,
                       mutator: &SessionMutator<'_, R, F>,
                       base: &SessionConfig)
                       -> Result<SessionConfig, ConfigError>
        where R: PackageResolver + ?Sized,
              F: ModuleFinder + ?Sized
    {
        let mut config = base.clone();
        for name in &self.extensions {
            let extension = name.parse::<ExtensionFlag>()?;
            config = mutator.add_extension(&config, extension);
        }
        for path in &self.import_paths {
            config = mutator.add_import_path(&config, path.clone());
        }
        config = mutator.expose_packages(&config, self.packages.as_slice())?;
        for import in &self.imports {
            (config, _) = mutator.add_import(&config, import)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportErrorKind;

    const SESSION: &str = r#"
        extensions = ["RankNTypes", "LambdaCase"]
        packages = ["base", "containers (Data.Map as Map)"]
        imports = ["import Data.Maybe", "import qualified Map as M"]
        import_paths = ["src", "test"]

        [units]
        "base-4.18.0.0" = ["Prelude", "Data.Maybe", "Data.List"]
        "containers-0.6.7" = ["Data.Map", "Data.Set"]
    "#;

    fn build(text: &str) -> Result<SessionConfig, ConfigError> {
        let file = SessionFile::from_toml(text)?;
        let db = file.package_db();
        file.apply(&SessionMutator::new(&db, &db), &SessionConfig::default())
    }

    #[test]
    fn a_complete_session_file() {
        let config = build(SESSION).unwrap();
        assert_eq!(config.to_string(),
                   "extensions: [RankNTypes, LambdaCase]\nextension flags: [ExplicitForAll, \
                    LambdaCase, RankNTypes]\nimport paths: [src, test]\npackages: [base -> \
                    base-4.18.0.0, containers (Data.Map as Map) -> containers-0.6.7]\nimports: \
                    [import qualified Map as M, import Data.Maybe]");
    }

    #[test]
    fn unknown_keys_and_extensions_are_rejected() {
        assert!(matches!(build("colour = \"blue\""), Err(ConfigError::Toml(_))));
        assert!(matches!(build("extensions = [\"NoSuchThing\"]"),
                         Err(ConfigError::Extension(ref e)) if e.0 == "NoSuchThing"));
    }

    #[test]
    fn imports_fail_without_their_package() {
        let text = "imports = [\"import Data.Maybe\"]\n[units]\n\"base-4.18.0.0\" = [\"Data.Maybe\"]";
        assert!(matches!(build(text),
                         Err(ConfigError::Import(ref e)) if e.kind == ImportErrorKind::ModuleNotFound));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = SessionFile::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
