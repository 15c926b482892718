use tracing::trace;

use crate::{
    session::extension::ExtensionSet,
    syntax::{
        lexer::{Token, tokenize},
        parser::core::parse_fragment,
    },
};

/// Whether a fragment parses as a single standalone expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationResult {
    IsExpression,
    IsNotExpression,
}

/// How the evaluation front end should treat a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// An import declaration, to be handed to the session mutator.
    Import,
    /// An expression, to be evaluated and printed.
    Expression,
    /// Anything else: declarations, bindings, statements, or text that does
    /// not parse at all.
    Declaration,
}

/// Decides whether `text` parses as exactly one expression under `flags`.
///
/// The parse is speculative and has no side effects: no names are resolved
/// and nothing in the session changes. Any failure, whether lexical,
/// syntactic, a construct whose extension is off, or trailing input, yields
/// [`ClassificationResult::IsNotExpression`]. The result depends only on
/// `flags` and `text`.
///
/// # Parameters
/// - `flags`: The resolved extension flags of the session.
/// - `text`: The fragment, possibly spanning several lines.
///
/// # Example
/// ```
/// use evalctx::{
///     classifier::{ClassificationResult, classify},
///     session::extension::ExtensionSet,
/// };
///
/// let flags = ExtensionSet::empty();
/// assert_eq!(classify(flags, "(x+y)"), ClassificationResult::IsExpression);
/// assert_eq!(classify(flags, "three=3"), ClassificationResult::IsNotExpression);
/// assert_eq!(classify(flags, "import Data.Maybe"), ClassificationResult::IsNotExpression);
/// ```
#[must_use]
pub fn classify(flags: ExtensionSet, text: &str) -> ClassificationResult {
    match parse_fragment(text, flags) {
        Ok(_) => {
            trace!(fragment = text, "classified as expression");
            ClassificationResult::IsExpression
        },
        Err(e) => {
            trace!(fragment = text, reason = %e, "classified as non-expression");
            ClassificationResult::IsNotExpression
        },
    }
}

/// Sorts a fragment into import, expression or declaration.
///
/// A fragment whose first token is `import` is an import regardless of
/// whether the rest is well formed; the mutator reports syntax errors in it.
///
/// # Example
/// ```
/// use evalctx::{
///     classifier::{FragmentKind, fragment_kind},
///     session::extension::ExtensionSet,
/// };
///
/// let flags = ExtensionSet::empty();
/// assert_eq!(fragment_kind(flags, "import Data.Maybe"), FragmentKind::Import);
/// assert_eq!(fragment_kind(flags, "map succ [1, 2]"), FragmentKind::Expression);
/// assert_eq!(fragment_kind(flags, "data T = T"), FragmentKind::Declaration);
/// ```
#[must_use]
pub fn fragment_kind(flags: ExtensionSet, text: &str) -> FragmentKind {
    if let Ok(stream) = tokenize(text)
       && let Some((Token::Import, _)) = stream.tokens.first()
    {
        return FragmentKind::Import;
    }

    match classify(flags, text) {
        ClassificationResult::IsExpression => FragmentKind::Expression,
        ClassificationResult::IsNotExpression => FragmentKind::Declaration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::extension::ExtensionFlag;

    fn is_expression(flags: ExtensionSet, text: &str) -> bool {
        classify(flags, text) == ClassificationResult::IsExpression
    }

    #[test]
    fn simple_expressions_and_declarations() {
        let flags = ExtensionSet::empty();
        assert!(is_expression(flags, "3"));
        assert!(is_expression(flags, "(x+y)"));
        assert!(!is_expression(flags, "three=3"));
        assert!(!is_expression(flags, "import Data.Maybe"));
        assert!(!is_expression(flags, ""));
    }

    #[test]
    fn trailing_and_lexical_garbage() {
        let flags = ExtensionSet::empty();
        assert!(!is_expression(flags, "f x )"));
        assert!(!is_expression(flags, "x <- getLine"));
        assert!(!is_expression(flags, "\"unterminated"));
    }

    #[test]
    fn classification_follows_the_flags() {
        let text = "\\case { Just x -> x; Nothing -> 0 }";
        assert!(!is_expression(ExtensionSet::empty(), text));
        assert!(is_expression(ExtensionSet::resolve([ExtensionFlag::LambdaCase]), text));
    }

    #[test]
    fn fragment_kinds() {
        let flags = ExtensionSet::empty();
        assert_eq!(fragment_kind(flags, "import"), FragmentKind::Import);
        assert_eq!(fragment_kind(flags, "  -- comment\n  1 + 1"), FragmentKind::Expression);
        assert_eq!(fragment_kind(flags, "f x = x"), FragmentKind::Declaration);
    }
}
