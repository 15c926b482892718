/// Syntax errors.
///
/// Defines the errors raised while lexing or parsing a fragment. The
/// classifier collapses all of them into a single "not an expression"
/// verdict; import parsing surfaces them as diagnostics.
pub mod parse_error;
/// Session mutation errors.
///
/// Contains the structured failures returned by package exposure and import
/// resolution, plus the error for an unrecognised extension name. Each carries
/// the failing identifier and the collaborator's diagnostic verbatim.
pub mod session_error;
/// Session file errors.
///
/// Errors raised while reading a TOML session file and replaying it into a
/// fresh session.
pub mod config_error;

pub use config_error::ConfigError;
pub use parse_error::ParseError;
pub use session_error::{ImportError, ImportErrorKind, PackageError, UnknownExtension};
