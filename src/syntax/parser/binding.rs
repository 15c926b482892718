use std::iter::Peekable;

use crate::{
    ast::{Alternative, Binding, Body, Expr, GuardedExpr, Rhs, Stmt},
    syntax::{
        lexer::{Position, Token},
        parser::{
            core::{ParseContext, ParseResult, parse_expression},
            pattern::{parse_apat, parse_pattern, starts_apat},
            types::parse_type,
            utils::{expect, parse_block, peek},
        },
    },
};

/// Parses a single statement of a `do` block, comprehension or guard.
///
/// A statement may be one of:
/// - a `let` group without `in`,
/// - a generator, `pattern <- expression`,
/// - an expression.
///
/// A `let` group followed by `in` becomes a `let` expression used as a
/// statement. The generator form is tried on a copy of the stream first; if
/// no `<-` follows the pattern, the input is parsed again as an expression.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of the statement.
/// - `cx`: The context of the enclosing block.
///
/// # Returns
/// A parsed [`Stmt`] node.
pub fn parse_stmt<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if let Some((Token::Let, _)) = peek(tokens, cx) {
        tokens.next();
        let bindings = parse_block(tokens, cx, parse_binding)?;
        if let Some((Token::In, _)) = peek(tokens, cx) {
            tokens.next();
            let body = parse_expression(tokens, cx)?;
            return Ok(Stmt::Expr(Expr::Let { bindings,
                                             body: Box::new(body) }));
        }
        return Ok(Stmt::Let(bindings));
    }

    let mut lookahead = tokens.clone();
    if let Ok(pattern) = parse_pattern(&mut lookahead, cx)
       && let Some((Token::LArrow, _)) = peek(&mut lookahead, cx)
    {
        lookahead.next();
        *tokens = lookahead;
        let expr = parse_expression(tokens, cx)?;
        return Ok(Stmt::Bind { pattern, expr });
    }

    Ok(Stmt::Expr(parse_expression(tokens, cx)?))
}

/// Parses one binding of a `let` or `where` group.
///
/// A binding may be one of:
/// - a type signature for one or more names, `f, g :: Int -> Int`,
/// - a function or variable binding, `f x (Just y) = ...`,
/// - a pattern binding, `(a, b) = ...` or `all@(x:_) = ...`.
///
/// # Errors
/// Returns a `ParseError` if the left-hand side is malformed or the
/// right-hand side fails to parse.
pub fn parse_binding<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Binding>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut lookahead = tokens.clone();
    let mut names = Vec::new();
    while let Some((Token::VarId(name), _)) = peek(&mut lookahead, cx) {
        lookahead.next();
        names.push(name.clone());
        if let Some((Token::Comma, _)) = peek(&mut lookahead, cx) {
            lookahead.next();
        } else {
            break;
        }
    }
    if !names.is_empty()
       && let Some((Token::DoubleColon, _)) = peek(&mut lookahead, cx)
    {
        lookahead.next();
        *tokens = lookahead;
        let ty = parse_type(tokens, cx)?;
        return Ok(Binding::Signature { names, ty });
    }

    if let Some((Token::VarId(name), _)) = peek(tokens, cx)
       && name != "_"
    {
        let mut lookahead = tokens.clone();
        lookahead.next();
        if !matches!(peek(&mut lookahead, cx), Some((Token::At, _))) {
            *tokens = lookahead;
            let mut params = Vec::new();
            while let Some((tok, _)) = peek(tokens, cx)
                  && starts_apat(tok)
            {
                params.push(parse_apat(tokens, cx)?);
            }
            let rhs = parse_rhs(tokens, cx, &Token::Equals)?;
            return Ok(Binding::Function { name: name.clone(),
                                          params,
                                          rhs });
        }
    }

    let pattern = parse_pattern(tokens, cx)?;
    let rhs = parse_rhs(tokens, cx, &Token::Equals)?;
    Ok(Binding::Pattern { pattern, rhs })
}

/// Parses one alternative of a `case` or `\case`, `pattern -> expression`.
pub fn parse_alternative<'a, I>(tokens: &mut Peekable<I>,
                                cx: ParseContext)
                                -> ParseResult<Alternative>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pattern = parse_pattern(tokens, cx)?;
    let rhs = parse_rhs(tokens, cx, &Token::RArrow)?;
    Ok(Alternative { pattern, rhs })
}

/// Parses a right-hand side introduced by `separator` (`=` for bindings,
/// `->` for alternatives), with optional guards and a trailing `where`.
///
/// Grammar:
/// ```text
///     rhs := (separator expression | ("|" guards separator expression)+)
///            ("where" bindings)?
/// ```
fn parse_rhs<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext, separator: &Token) -> ParseResult<Rhs>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let body = if let Some((Token::Bar, _)) = peek(tokens, cx) {
        Body::Guarded(parse_guarded_branches(tokens, cx, separator)?)
    } else {
        expect(tokens, cx, separator, describe(separator))?;
        Body::Plain(Box::new(parse_expression(tokens, cx)?))
    };

    let local = if let Some((Token::Where, _)) = peek(tokens, cx) {
        tokens.next();
        parse_block(tokens, cx, parse_binding)?
    } else {
        Vec::new()
    };

    Ok(Rhs { body, local })
}

/// Parses one or more `| guards separator expression` branches.
///
/// Shared by guarded right-hand sides and multi-way `if`.
pub(in crate::syntax::parser) fn parse_guarded_branches<'a, I>(
    tokens: &mut Peekable<I>,
    cx: ParseContext,
    separator: &Token)
    -> ParseResult<Vec<GuardedExpr>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut branches = Vec::new();
    while let Some((Token::Bar, _)) = peek(tokens, cx) {
        tokens.next();
        let guards = parse_guards(tokens, cx)?;
        expect(tokens, cx, separator, describe(separator))?;
        let body = parse_expression(tokens, cx)?;
        branches.push(GuardedExpr { guards, body });
    }
    Ok(branches)
}

/// Parses a comma-separated list of guard qualifiers.
fn parse_guards<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Vec<Stmt>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut guards = vec![parse_stmt(tokens, cx)?];
    while let Some((Token::Comma, _)) = peek(tokens, cx) {
        tokens.next();
        guards.push(parse_stmt(tokens, cx)?);
    }
    Ok(guards)
}

const fn describe(separator: &Token) -> &'static str {
    match separator {
        Token::Equals => "'='",
        _ => "'->'",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::extension::ExtensionSet, syntax::lexer::tokenize};

    fn statement(source: &str) -> ParseResult<Stmt> {
        let stream = tokenize(source)?;
        let mut tokens = stream.tokens.iter().peekable();
        parse_stmt(&mut tokens, ParseContext::for_stream(ExtensionSet::empty(), &stream))
    }

    fn binding(source: &str) -> ParseResult<Binding> {
        let stream = tokenize(source)?;
        let mut tokens = stream.tokens.iter().peekable();
        parse_binding(&mut tokens, ParseContext::for_stream(ExtensionSet::empty(), &stream))
    }

    #[test]
    fn generators_and_expressions() {
        assert!(matches!(statement("Just x <- lookup k m").unwrap(), Stmt::Bind { .. }));
        assert!(matches!(statement("print (x + 1)").unwrap(), Stmt::Expr(_)));
    }

    #[test]
    fn let_with_in_is_an_expression_statement() {
        assert!(matches!(statement("let y = 2").unwrap(), Stmt::Let(ref bs) if bs.len() == 1));
        assert!(matches!(statement("let y = 2 in y").unwrap(), Stmt::Expr(Expr::Let { .. })));
    }

    #[test]
    fn signatures_functions_and_pattern_bindings() {
        assert!(matches!(binding("f, g :: Int -> Int").unwrap(),
                         Binding::Signature { ref names, .. } if names.len() == 2));
        assert!(matches!(binding("go acc (x:xs) = go (acc + x) xs").unwrap(),
                         Binding::Function { ref params, .. } if params.len() == 2));
        assert!(matches!(binding("(a, b) = (1, 2)").unwrap(), Binding::Pattern { .. }));
    }

    #[test]
    fn guards_and_where_clauses() {
        let parsed = binding("sign n\n  | n < 0 = -1\n  | otherwise = k\n  where k = 1").unwrap();
        let Binding::Function { rhs, .. } = parsed else {
            panic!("expected a function binding, got {parsed:?}");
        };
        assert!(matches!(rhs.body, Body::Guarded(ref branches) if branches.len() == 2));
        assert_eq!(rhs.local.len(), 1);
    }
}
