use std::iter::Peekable;

use crate::{
    ast::{ImportDecl, ImportList},
    error::ParseError,
    session::extension::{ExtensionFlag, ExtensionSet},
    syntax::{
        lexer::{Position, Token, tokenize},
        parser::{
            binary::scan_operator,
            core::{ParseContext, ParseResult},
            utils::{expect, expect_end, parse_comma_separated, peek},
        },
    },
};

/// Parses a complete import declaration.
///
/// `qualified` may follow the module name only when `ImportQualifiedPost` is
/// in effect. Whichever position it takes, the declaration renders in the
/// prefix form.
///
/// # Errors
/// Returns a `ParseError` if the text is not exactly one import declaration.
///
/// # Example
/// ```
/// use evalctx::{session::extension::ExtensionSet, syntax::parser::import::parse_import_declaration};
///
/// let decl = parse_import_declaration("import qualified Data.Map as M", ExtensionSet::empty()).unwrap();
/// assert_eq!(decl.module_name, "Data.Map");
/// assert_eq!(decl.to_string(), "import qualified Data.Map as M");
/// ```
pub fn parse_import_declaration(source: &str, flags: ExtensionSet) -> ParseResult<ImportDecl> {
    let stream = tokenize(source)?;
    let cx = ParseContext::for_stream(flags, &stream);
    let mut tokens = stream.tokens.iter().peekable();

    let decl = parse_import(&mut tokens, cx)?;
    expect_end(&mut tokens, "import declaration")?;

    Ok(decl)
}

/// Parses an import declaration.
///
/// Grammar:
/// ```text
///     import := "import" "qualified"? modid "qualified"? ("as" modid)?
///               ("hiding"? "(" (item ("," item)*)? ")")?
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at `import`.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed [`ImportDecl`].
pub fn parse_import<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<ImportDecl>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let start = expect(tokens, cx, &Token::Import, "'import'")?;

    let mut qualified = eat_word(tokens, cx, "qualified");
    let module_name = parse_module_name(tokens, cx)?;
    if !qualified && eat_word(tokens, cx, "qualified") {
        cx.require(ExtensionFlag::ImportQualifiedPost,
                   "'qualified' after the module name",
                   start.line)?;
        qualified = true;
    }

    let alias = if eat_word(tokens, cx, "as") {
        Some(parse_module_name(tokens, cx)?)
    } else {
        None
    };

    let hiding = eat_word(tokens, cx, "hiding");
    let import_list = match peek(tokens, cx) {
        Some((Token::LParen, _)) => {
            tokens.next();
            let names = parse_comma_separated(tokens, cx, parse_import_item, &Token::RParen)?;
            Some(ImportList { hiding, names })
        },
        Some((tok, position)) if hiding => {
            return Err(ParseError::UnexpectedToken { token: format!("Expected '(' after 'hiding', found {tok:?}"),
                                                     line:  position.line, });
        },
        None if hiding => return Err(cx.end_of_input()),
        _ => None,
    };

    Ok(ImportDecl { qualified,
                    module_name,
                    alias,
                    import_list })
}

/// Consumes the special identifier `word` (`qualified`, `as`, `hiding`) if
/// it comes next.
fn eat_word<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext, word: &str) -> bool
    where I: Iterator<Item = &'a (Token, Position)>
{
    if let Some((Token::VarId(name), _)) = peek(tokens, cx)
       && name == word
    {
        tokens.next();
        return true;
    }
    false
}

fn parse_module_name<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match peek(tokens, cx) {
        Some((Token::ConId(name) | Token::QConId(name), _)) => {
            tokens.next();
            Ok(name.clone())
        },
        Some((tok, position)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected a module name, found {tok:?}"),
                                              line:  position.line, })
        },
        None => Err(cx.end_of_input()),
    }
}

/// Parses one entry of an import list and returns it as written.
///
/// Grammar:
/// ```text
///     item := var | "(" operator ")"
///           | con ("(" ".." ")" | "(" (name ("," name)*)? ")")?
///           | "type" name                  (ExplicitNamespaces)
/// ```
fn parse_import_item<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::Type, position)) => {
            cx.require(ExtensionFlag::ExplicitNamespaces, "namespaced import item", position.line)?;
            tokens.next();
            Ok(format!("type {}", parse_member_name(tokens, cx)?))
        },
        Some((Token::ConId(name), _)) => {
            tokens.next();
            if !matches!(peek(tokens, cx), Some((Token::LParen, _))) {
                return Ok(name.clone());
            }
            tokens.next();
            if let Some((Token::DotDot, _)) = peek(tokens, cx) {
                tokens.next();
                expect(tokens, cx, &Token::RParen, "')' after '..'")?;
                return Ok(format!("{name}(..)"));
            }
            let members = parse_comma_separated(tokens, cx, parse_member_name, &Token::RParen)?;
            Ok(format!("{name}({})", members.join(", ")))
        },
        _ => parse_member_name(tokens, cx),
    }
}

/// Parses a plain name or a parenthesized operator.
fn parse_member_name<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::VarId(name) | Token::ConId(name), _)) => {
            tokens.next();
            Ok(name.clone())
        },
        Some((Token::LParen, position)) => {
            tokens.next();
            match scan_operator(tokens, cx) {
                Some(op) if !op.starts_with('`') => {
                    expect(tokens, cx, &Token::RParen, "')' after operator")?;
                    Ok(format!("({op})"))
                },
                _ => Err(ParseError::Other { message: "Expected an operator in parentheses".to_string(),
                                             line:    position.line, }),
            }
        },
        Some((tok, position)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected an import item, found {tok:?}"),
                                              line:  position.line, })
        },
        None => Err(cx.end_of_input()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_and_hiding_lists() {
        let decl = parse_import_declaration("import Data.List hiding (sortOn, (\\\\))",
                                            ExtensionSet::empty()).unwrap();
        let list = decl.import_list.unwrap();
        assert!(list.hiding);
        assert_eq!(list.names, ["sortOn", "(\\\\)"]);

        let decl = parse_import_declaration("import Data.Maybe (Maybe(..), fromMaybe)",
                                            ExtensionSet::empty()).unwrap();
        assert_eq!(decl.to_string(), "import Data.Maybe (Maybe(..), fromMaybe)");
    }

    #[test]
    fn postpositive_qualified_needs_its_extension() {
        let source = "import Data.Map qualified as M";
        assert!(matches!(parse_import_declaration(source, ExtensionSet::empty()),
                         Err(ParseError::ExtensionRequired { extension: ExtensionFlag::ImportQualifiedPost, .. })));

        let flags = ExtensionSet::resolve([ExtensionFlag::ImportQualifiedPost]);
        let decl = parse_import_declaration(source, flags).unwrap();
        assert_eq!(decl.to_string(), "import qualified Data.Map as M");
    }

    #[test]
    fn rejects_everything_else() {
        for source in ["import", "import data.Map", "import Data.Map as", "x = 1", "import A B"] {
            assert!(parse_import_declaration(source, ExtensionSet::empty()).is_err(),
                    "accepted {source:?}");
        }
    }

    #[test]
    fn truncated_imports_report_the_last_line() {
        assert_eq!(parse_import_declaration("import Data.List hiding", ExtensionSet::empty()),
                   Err(ParseError::UnexpectedEndOfInput { line: 1 }));
        assert_eq!(parse_import_declaration("import Data.List\n  (sortOn,\n",
                                            ExtensionSet::empty()),
                   Err(ParseError::UnexpectedEndOfInput { line: 2 }));
    }

    #[test]
    fn namespaced_items_name_exactly_one_entity() {
        let flags = ExtensionSet::resolve([ExtensionFlag::ExplicitNamespaces]);
        let decl = parse_import_declaration("import GHC.Generics (type (:+:), Generic)", flags)
                   .unwrap();
        assert_eq!(decl.import_list.unwrap().names, ["type (:+:)", "Generic"]);
        assert!(parse_import_declaration("import M (type type T)", flags).is_err());
    }
}
