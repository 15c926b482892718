use std::collections::{BTreeMap, BTreeSet};

use crate::session::package::{ModuleFinder, PackageExposure, PackageResolver, UnitId};

/// An in-memory table of installed units and the modules each exposes.
///
/// Implements both host collaborators, so a session can run without a real
/// toolchain behind it. Diagnostics use the toolchain's own phrasing.
///
/// # Example
/// ```
/// use evalctx::{package_db::InstalledPackages, session::package::PackageResolver};
///
/// let db = InstalledPackages::new().with_unit("base-4.17.2.1", ["Prelude"])
///                                  .with_unit("base-4.18.0.0", ["Prelude"]);
/// assert_eq!(db.resolve("base").unwrap().as_str(), "base-4.18.0.0");
/// assert_eq!(db.resolve("base-4.17.2.1").unwrap().as_str(), "base-4.17.2.1");
/// assert_eq!(db.resolve("doesNotExist").unwrap_err(),
///            "cannot satisfy -package doesNotExist");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackages {
    units: BTreeMap<UnitId, BTreeSet<String>>,
}

impl InstalledPackages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table with `unit` added, exposing `modules`.
    #[must_use]
    pub fn with_unit<M>(mut self,
                        unit: impl Into<UnitId>,
                        modules: impl IntoIterator<Item = M>)
                        -> Self
        where M: Into<String>
    {
        self.insert(unit, modules);
        self
    }

    /// Adds `modules` to `unit`, registering the unit if it is new.
    pub fn insert<M>(&mut self, unit: impl Into<UnitId>, modules: impl IntoIterator<Item = M>)
        where M: Into<String>
    {
        self.units
            .entry(unit.into())
            .or_default()
            .extend(modules.into_iter().map(Into::into));
    }

    /// Iterates over the installed units in name order.
    pub fn units(&self) -> impl Iterator<Item = &UnitId> {
        self.units.keys()
    }

    /// Returns the modules exposed by `unit`.
    #[must_use]
    pub fn modules(&self, unit: &UnitId) -> Option<&BTreeSet<String>> {
        self.units.get(unit)
    }

    fn exposes(&self, unit: &UnitId, module: &str) -> bool {
        self.modules(unit).is_some_and(|modules| modules.contains(module))
    }
}

impl PackageResolver for InstalledPackages {
    /// Resolves an exact unit id, or a bare package name to its newest
    /// installed version.
    fn resolve(&self, name: &str) -> Result<UnitId, String> {
        let exact = UnitId::from(name);
        if self.units.contains_key(&exact) {
            return Ok(exact);
        }
        self.units
            .keys()
            .filter(|unit| unit.package_name() == name)
            .max_by_key(|unit| version(unit))
            .cloned()
            .ok_or_else(|| format!("cannot satisfy -package {name}"))
    }
}

impl ModuleFinder for InstalledPackages {
    /// Finds `module` in an exposed package, honouring renamings.
    ///
    /// When the module exists only in packages that are not exposed, the
    /// diagnostic names the first of them.
    fn find_module(&self, module: &str, exposed: &[PackageExposure]) -> Result<(), String> {
        let found = exposed.iter().any(|exposure| {
                                      exposure.resolved_unit
                                              .as_ref()
                                              .zip(exposure.original_module(module))
                                              .is_some_and(|(unit, original)| {
                                                  self.exposes(unit, original)
                                              })
                                  });
        if found {
            return Ok(());
        }

        let mut diagnostic = format!("Could not find module '{module}'");
        if let Some(hidden) = self.units().find(|unit| self.exposes(unit, module)) {
            diagnostic.push_str(&format!("\nIt is a member of the hidden package '{hidden}'."));
        }
        Err(diagnostic)
    }
}

/// Numeric version components of a unit id; empty when unversioned.
fn version(unit: &UnitId) -> Vec<u64> {
    unit.as_str()
        .strip_prefix(unit.package_name())
        .and_then(|rest| rest.strip_prefix('-'))
        .map(|version| version.split('.').filter_map(|part| part.parse().ok()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> InstalledPackages {
        InstalledPackages::new().with_unit("base-4.18.0.0", ["Prelude", "Data.Maybe"])
                                .with_unit("base-4.9.1.0", ["Prelude"])
                                .with_unit("containers-0.6.7", ["Data.Map", "Data.Set"])
    }

    fn exposed(db: &InstalledPackages, request: &str) -> PackageExposure {
        let mut exposure = PackageExposure::parse(request).unwrap();
        exposure.resolved_unit = Some(db.resolve(&exposure.requested_name).unwrap());
        exposure
    }

    #[test]
    fn newest_version_wins_numerically() {
        assert_eq!(db().resolve("base").unwrap().as_str(), "base-4.18.0.0");
    }

    #[test]
    fn modules_in_hidden_packages_are_reported() {
        let db = db();
        let base = exposed(&db, "base");
        assert_eq!(db.find_module("Data.Maybe", std::slice::from_ref(&base)), Ok(()));
        assert_eq!(db.find_module("Data.Map", &[base]).unwrap_err(),
                   "Could not find module 'Data.Map'\nIt is a member of the hidden package \
                    'containers-0.6.7'.");
        assert_eq!(db.find_module("Data.Nope", &[]).unwrap_err(),
                   "Could not find module 'Data.Nope'");
    }

    #[test]
    fn renamed_modules_are_found_by_alias_only() {
        let db = db();
        let containers = [exposed(&db, "containers (Data.Map as Map)")];
        assert!(db.find_module("Map", &containers).is_ok());
        assert!(db.find_module("Data.Map", &containers).is_err());
        assert!(db.find_module("Data.Set", &containers).is_err());
    }

    #[test]
    fn inserting_into_a_unit_merges_its_modules() {
        let mut db = db();
        db.insert("containers-0.6.7", ["Data.IntMap"]);
        let unit = UnitId::from("containers-0.6.7");
        let modules = db.modules(&unit).unwrap();
        assert_eq!(modules.iter().map(String::as_str).collect::<Vec<_>>(),
                   ["Data.IntMap", "Data.Map", "Data.Set"]);
        assert!(db.modules(&UnitId::from("text-2.0")).is_none());
    }
}
