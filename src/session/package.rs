use std::{collections::BTreeSet, fmt};

/// A resolved, possibly versioned identifier of an installed package, e.g.
/// `base-4.18.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the package name without its version suffix, e.g. `base` for
    /// `base-4.18.0.0`.
    ///
    /// The version is the trailing `-`-separated component made of digits and
    /// dots; a unit id without one is returned whole.
    #[must_use]
    pub fn package_name(&self) -> &str {
        match self.0.rsplit_once('-') {
            Some((name, version))
                if !version.is_empty()
                   && version.chars().all(|c| c.is_ascii_digit() || c == '.') =>
            {
                name
            },
            _ => &self.0,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A module made visible under a possibly different name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleRenaming {
    /// The module's name inside the package.
    pub original: String,
    /// The name it is imported by.
    pub alias:    String,
}

impl fmt::Display for ModuleRenaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.alias {
            f.write_str(&self.original)
        } else {
            write!(f, "{} as {}", self.original, self.alias)
        }
    }
}

/// A package the session has made visible.
///
/// Created from a request string such as `base` or
/// `containers (Data.Map as Map, Data.Set)`. Without a renaming clause every
/// module of the package is visible under its own name; with one, only the
/// listed modules are, under their aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageExposure {
    /// The package name as requested, without the renaming clause.
    pub requested_name: String,
    /// The unit the resolver picked, once resolution has happened.
    pub resolved_unit:  Option<UnitId>,
    /// Module renamings; empty means "everything, unrenamed".
    pub renaming:       BTreeSet<ModuleRenaming>,
}

impl PackageExposure {
    /// Parses a package request.
    ///
    /// Grammar:
    /// ```text
    ///     request  := name ("(" (entry ("," entry)*)? ")")?
    ///     entry    := module ("as" module)?
    /// ```
    /// # Errors
    /// Returns a diagnostic if the name is missing, the parentheses are
    /// unbalanced, or an entry is not `M` or `M as N`.
    ///
    /// # Example
    /// ```
    /// use evalctx::session::package::PackageExposure;
    ///
    /// let exposure = PackageExposure::parse("containers (Data.Map as Map)").unwrap();
    /// assert_eq!(exposure.requested_name, "containers");
    /// assert_eq!(exposure.original_module("Map"), Some("Data.Map"));
    /// assert_eq!(exposure.original_module("Data.Set"), None);
    /// ```
    pub fn parse(request: &str) -> Result<Self, String> {
        let malformed = || format!("malformed package request: '{}'", request.trim());

        let (name, clause) = match request.split_once('(') {
            Some((name, rest)) => {
                let clause = rest.trim_end().strip_suffix(')').ok_or_else(malformed)?;
                (name.trim(), Some(clause))
            },
            None => (request.trim(), None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) || name.contains(')') {
            return Err(malformed());
        }

        let mut renaming = BTreeSet::new();
        if let Some(clause) = clause {
            for entry in clause.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
                let words = entry.split_whitespace().collect::<Vec<_>>();
                let (original, alias) = match words.as_slice() {
                    [module] => (*module, *module),
                    [module, "as", alias] => (*module, *alias),
                    _ => return Err(malformed()),
                };
                if !is_module_name(original) || !is_module_name(alias) {
                    return Err(malformed());
                }
                renaming.insert(ModuleRenaming { original: original.to_string(),
                                                 alias:    alias.to_string(), });
            }
        }

        Ok(Self { requested_name: name.to_string(),
                  resolved_unit: None,
                  renaming })
    }

    /// Maps a module name as written in an import to the module inside this
    /// package, or `None` if this exposure does not make it visible.
    #[must_use]
    pub fn original_module<'s>(&'s self, module: &'s str) -> Option<&'s str> {
        if self.renaming.is_empty() {
            return Some(module);
        }
        self.renaming
            .iter()
            .find(|renaming| renaming.alias == module)
            .map(|renaming| renaming.original.as_str())
    }
}

impl fmt::Display for PackageExposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.requested_name)?;
        if !self.renaming.is_empty() {
            let entries = self.renaming.iter().map(ToString::to_string).collect::<Vec<_>>();
            write!(f, " ({})", entries.join(", "))?;
        }
        if let Some(unit) = &self.resolved_unit {
            write!(f, " -> {unit}")?;
        }
        Ok(())
    }
}

fn is_module_name(name: &str) -> bool {
    name.split('.').all(|segment| {
                       let mut chars = segment.chars();
                       chars.next().is_some_and(char::is_uppercase)
                       && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '\'')
                   })
}

/// Validates package names against the installed package database.
///
/// Implemented by the host toolchain. Any `Fn(&str) -> Result<UnitId,
/// String>` closure is a resolver.
pub trait PackageResolver {
    /// Resolves `name` to an installed unit.
    ///
    /// # Errors
    /// Returns a human-readable diagnostic in the host's own phrasing, e.g.
    /// `cannot satisfy -package doesNotExist`.
    fn resolve(&self, name: &str) -> Result<UnitId, String>;
}

impl<T> PackageResolver for T where T: Fn(&str) -> Result<UnitId, String>
{
    fn resolve(&self, name: &str) -> Result<UnitId, String> {
        self(name)
    }
}

/// Decides whether a module can be imported given the exposed packages.
///
/// Implemented by the host toolchain. Any `Fn(&str, &[PackageExposure]) ->
/// Result<(), String>` closure is a finder.
pub trait ModuleFinder {
    /// Looks `module` up among `exposed`.
    ///
    /// # Errors
    /// Returns a human-readable diagnostic in the host's own phrasing, e.g.
    /// `Could not find module 'Data.Maybe'`.
    fn find_module(&self, module: &str, exposed: &[PackageExposure]) -> Result<(), String>;
}

impl<T> ModuleFinder for T where T: Fn(&str, &[PackageExposure]) -> Result<(), String>
{
    fn find_module(&self, module: &str, exposed: &[PackageExposure]) -> Result<(), String> {
        self(module, exposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_requests_expose_everything() {
        let exposure = PackageExposure::parse("  base ").unwrap();
        assert_eq!(exposure.requested_name, "base");
        assert!(exposure.renaming.is_empty());
        assert_eq!(exposure.original_module("Data.Maybe"), Some("Data.Maybe"));
    }

    #[test]
    fn renaming_clauses() {
        let exposure = PackageExposure::parse("containers (Data.Map as Map, Data.Set)").unwrap();
        assert_eq!(exposure.original_module("Map"), Some("Data.Map"));
        assert_eq!(exposure.original_module("Data.Set"), Some("Data.Set"));
        assert_eq!(exposure.original_module("Data.Map"), None);
        assert_eq!(exposure.to_string(), "containers (Data.Map as Map, Data.Set)");
    }

    #[test]
    fn module_names_may_be_unicode() {
        let exposure = PackageExposure::parse("géo (Données.Carte as Carte)").unwrap();
        assert_eq!(exposure.requested_name, "géo");
        assert_eq!(exposure.original_module("Carte"), Some("Données.Carte"));
    }

    #[test]
    fn malformed_requests() {
        for request in ["", "  ", "containers (Data.Map", "containers (Data.Map as)", "a b",
                        "containers (data.map)"]
        {
            let error = PackageExposure::parse(request).unwrap_err();
            assert!(error.starts_with("malformed package request"), "{request:?}: {error}");
        }
    }

    #[test]
    fn unit_ids_know_their_package() {
        assert_eq!(UnitId::from("base-4.18.0.0").package_name(), "base");
        assert_eq!(UnitId::from("ghc-prim-0.10.0").package_name(), "ghc-prim");
        assert_eq!(UnitId::from("main").package_name(), "main");
    }
}
