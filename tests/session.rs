use evalctx::{
    ExtensionFlag, InstalledPackages, PackageExposure, SessionConfig, SessionMutator, UnitId,
    error::ImportErrorKind, render,
};

fn installed() -> InstalledPackages {
    InstalledPackages::new().with_unit("base-4.18.0.0",
                                       ["Prelude", "Data.Maybe", "Data.List", "Control.Monad"])
                            .with_unit("array-0.5.5.0", ["Data.Array"])
                            .with_unit("containers-0.6.7", ["Data.Map", "Data.Set"])
                            .with_unit("filepath-1.4.2.1", ["System.FilePath"])
}

fn exposed_names(config: &SessionConfig) -> Vec<&str> {
    config.exposed_packages()
          .iter()
          .map(|exposure| exposure.requested_name.as_str())
          .collect()
}

#[test]
fn exposing_nothing_is_a_no_op() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["base"]).unwrap();

    let unchanged = mutator.expose_packages(&config, &[] as &[&str]).unwrap();
    assert_eq!(unchanged.exposed_packages(), config.exposed_packages());
    assert_eq!(unchanged, config);
}

#[test]
fn packages_are_prepended_in_request_order() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["containers"]).unwrap();
    let config = mutator.expose_packages(&config, &["base", "array"]).unwrap();

    assert_eq!(exposed_names(&config), ["base", "array", "containers"]);
    assert_eq!(config.exposed_packages()[0].resolved_unit,
               Some(UnitId::from("base-4.18.0.0")));
}

#[test]
fn unknown_packages_are_reported_verbatim() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let error = mutator.expose_packages(&SessionConfig::default(), &["doesNotExist"])
                       .unwrap_err();

    assert_eq!(error.name, "doesNotExist");
    assert!(error.diagnostic.contains("doesNotExist"));
    assert_eq!(error.to_string(), "cannot satisfy -package doesNotExist");
}

#[test]
fn a_failed_exposure_leaves_no_trace() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let before = mutator.expose_packages(&SessionConfig::default(), &["array"]).unwrap();
    let snapshot = before.clone();

    let error = mutator.expose_packages(&before, &["base", "doesNotExist", "containers"])
                       .unwrap_err();
    assert_eq!(error.name, "doesNotExist");
    assert_eq!(before, snapshot);
    assert!(!before.has_package("base"));
}

#[test]
fn imports_need_their_package_exposed() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let empty = SessionConfig::default();

    let error = mutator.add_import(&empty, "import Data.Maybe").unwrap_err();
    assert_eq!(error.kind, ImportErrorKind::ModuleNotFound);
    assert_eq!(error.module, "Data.Maybe");
    assert!(error.diagnostic.starts_with("Could not find module 'Data.Maybe'"));
    assert!(empty.active_imports().is_empty());

    let config = mutator.expose_packages(&empty, &["base"]).unwrap();
    let (config, imports) = mutator.add_import(&config, "import Data.Maybe").unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(config.active_imports()[0].module_name, "Data.Maybe");
}

#[test]
fn imports_are_prepended_and_returned_in_full() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["base", "containers"])
                        .unwrap();

    let (config, _) = mutator.add_import(&config, "import Data.Maybe (fromMaybe)").unwrap();
    let (config, imports) = mutator.add_import(&config, "import qualified Data.Map as M").unwrap();

    let rendered = imports.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(rendered,
               ["import qualified Data.Map as M", "import Data.Maybe (fromMaybe)"]);
    assert_eq!(imports, config.active_imports());
}

#[test]
fn import_syntax_follows_the_session_extensions() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["containers"]).unwrap();

    let error = mutator.add_import(&config, "import Data.Map qualified as M").unwrap_err();
    assert_eq!(error.kind, ImportErrorKind::Syntax);
    assert!(error.diagnostic.contains("ImportQualifiedPost"));

    let config = mutator.add_extension(&config, ExtensionFlag::ImportQualifiedPost);
    let (_, imports) = mutator.add_import(&config, "import Data.Map qualified as M").unwrap();
    assert!(imports[0].qualified);
}

#[test]
fn renamed_modules_are_imported_by_alias() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(),
                                         &["containers (Data.Map as Map)"])
                        .unwrap();

    assert!(mutator.add_import(&config, "import Map").is_ok());
    let error = mutator.add_import(&config, "import Data.Map").unwrap_err();
    assert!(error.is_module_not_found());

    let malformed = mutator.expose_packages(&config, &["containers (Data.Map as"])
                           .unwrap_err();
    assert_eq!(malformed.name, "containers (Data.Map as");
}

#[test]
fn unicode_module_names_can_be_imported() {
    let db = InstalledPackages::new().with_unit("géo-1.0", ["Données.Carte"]);
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(),
                                         &["géo (Données.Carte as Carte)"])
                        .unwrap();

    let (_, imports) = mutator.add_import(&config, "import qualified Carte as Ç").unwrap();
    assert_eq!(imports[0].to_string(), "import qualified Carte as Ç");
    assert!(config.has_package("géo"));

    let error = mutator.add_import(&config, "import Données.Carte").unwrap_err();
    assert!(error.is_module_not_found());
}

#[test]
fn deeply_nested_import_lists_are_syntax_errors() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["base"]).unwrap();
    let config = mutator.add_extension(&config, ExtensionFlag::ExplicitNamespaces);

    let text = format!("import Data.Maybe ({}Maybe)", "type ".repeat(10_000));
    let error = mutator.add_import(&config, &text).unwrap_err();
    assert_eq!(error.kind, ImportErrorKind::Syntax);
}

#[test]
fn adding_an_extension_is_idempotent() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let once = mutator.add_extension(&SessionConfig::default(), ExtensionFlag::LambdaCase);
    let twice = mutator.add_extension(&once, ExtensionFlag::LambdaCase);

    assert_eq!(once.extensions(), twice.extensions());
    assert_eq!(twice.extensions(), [ExtensionFlag::LambdaCase]);
}

#[test]
fn has_package_matches_unit_id_prefixes() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = mutator.expose_packages(&SessionConfig::default(), &["filepath-1.4.2.1"])
                        .unwrap();

    assert!(config.has_package("filepath"));
    assert!(config.has_package("filepath-1.4"));
    assert!(config.has_package("file"));
    assert!(!config.has_package("base"));
    assert!(!SessionConfig::default().has_package(""));
}

#[test]
fn closures_can_stand_in_for_the_host() {
    let resolver = |name: &str| -> Result<UnitId, String> {
        if name == "base" {
            Ok(UnitId::from("base-4.18.0.0"))
        } else {
            Err(format!("cannot satisfy -package {name}"))
        }
    };
    let finder = |module: &str, exposed: &[PackageExposure]| -> Result<(), String> {
        if exposed.is_empty() {
            Err(format!("Could not find module '{module}'"))
        } else {
            Ok(())
        }
    };
    let mutator = SessionMutator::new(&resolver, &finder);

    let config = mutator.expose_packages(&SessionConfig::default(), &["base"]).unwrap();
    assert!(mutator.add_import(&config, "import Anything.At.All").is_ok());
}

#[test]
fn render_lists_every_field() {
    let db = installed();
    let mutator = SessionMutator::new(&db, &db);
    let config = SessionConfig::default();
    let config = mutator.add_extension(&config, ExtensionFlag::LambdaCase);
    let config = mutator.add_extension(&config, ExtensionFlag::RankNTypes);
    let config = mutator.add_import_path(&config, "src");
    let config = mutator.add_import_path(&config, "test");
    let config = mutator.expose_packages(&config, &["base"]).unwrap();
    let config = mutator.expose_packages(&config, &["containers"]).unwrap();
    let (config, _) = mutator.add_import(&config, "import qualified Data.Map as M").unwrap();

    assert_eq!(render(&config),
               "extensions: [LambdaCase, RankNTypes]\n\
                extension flags: [ExplicitForAll, LambdaCase, RankNTypes]\n\
                import paths: [src, test]\n\
                packages: [containers -> containers-0.6.7, base -> base-4.18.0.0]\n\
                imports: [import qualified Data.Map as M]");
}

#[test]
fn the_extension_table_matches_the_enum() {
    for (index, (name, flag)) in evalctx::session::extension::EXTENSIONS.iter().enumerate() {
        assert_eq!(*flag as usize, index, "{name} is out of place");
        assert_eq!(flag.name(), *name);
        assert_eq!(name.parse::<ExtensionFlag>(), Ok(*flag));
    }
    assert!("NoSuchExtension".parse::<ExtensionFlag>().is_err());
}
