use std::fmt::Display;

use crate::session::config::SessionConfig;

/// Renders a session as five labelled lines.
///
/// ```text
/// extensions: [LambdaCase, RankNTypes]
/// extension flags: [ExplicitForAll, LambdaCase, RankNTypes]
/// import paths: [src, test]
/// packages: [base -> base-4.18.0.0]
/// imports: [import qualified Data.Map as M]
/// ```
/// Extensions appear in the order they were enabled and the resolved flags
/// in canonical order. Packages and imports are listed most recent first,
/// as the session stores them. The output is deterministic and has no
/// trailing newline.
#[must_use]
pub fn render(config: &SessionConfig) -> String {
    let paths = config.import_paths().iter().map(|path| path.display());

    [format!("extensions: {}", bracketed(config.extensions())),
     format!("extension flags: {}", bracketed(config.extension_flags().iter())),
     format!("import paths: {}", bracketed(paths)),
     format!("packages: {}", bracketed(config.exposed_packages())),
     format!("imports: {}", bracketed(config.active_imports()))].join("\n")
}

fn bracketed<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let items = items.into_iter().map(|item| item.to_string()).collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session() {
        assert_eq!(render(&SessionConfig::default()),
                   "extensions: []\nextension flags: []\nimport paths: []\npackages: []\nimports: []");
    }
}
