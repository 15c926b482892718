use std::iter::Peekable;

use crate::{
    ast::{Literal, Pattern},
    error::ParseError,
    session::extension::ExtensionFlag,
    syntax::{
        lexer::{Position, Token},
        parser::{
            core::{ParseContext, ParseResult},
            types::parse_type,
            unary::{parse_record_fields, token_literal},
            utils::{
                descend, expect, parse_comma_separated, parse_comma_separated_nonempty, peek,
            },
        },
    },
};

/// Parses a pattern, including infix constructor patterns.
///
/// Constructor operators associate to the right, so `x : y : rest` binds as
/// `x : (y : rest)`.
///
/// Grammar:
/// ```text
///     pattern := lpat (consym pattern)?
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a pattern.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed [`Pattern`].
pub fn parse_pattern<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Pattern>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let cx = descend(tokens, cx)?;
    let left = parse_lpat(tokens, cx)?;

    if let Some((Token::ConSym(op), _)) = peek(tokens, cx) {
        tokens.next();
        let right = parse_pattern(tokens, cx)?;
        return Ok(Pattern::Infix { left: Box::new(left),
                                   op:   op.clone(),
                                   right: Box::new(right) });
    }

    Ok(left)
}

/// Parses a negative literal, a constructor with arguments, or an atomic
/// pattern.
///
/// Grammar:
/// ```text
///     lpat := "-" (integer | float)
///           | con apat*
///           | con "{" fields "}"
///           | apat
/// ```
fn parse_lpat<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Pattern>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::Minus, _)) => {
            tokens.next();
            match tokens.next() {
                Some((tok, position)) => match token_literal(tok) {
                    Some(value @ (Literal::Integer(_) | Literal::Float(_))) => {
                        Ok(Pattern::Literal { value,
                                              negated: true })
                    },
                    _ => Err(ParseError::UnexpectedToken { token: format!("Expected a number after '-', found {tok:?}"),
                                                           line:  position.line, }),
                },
                None => Err(cx.end_of_input()),
            }
        },
        Some((Token::ConId(name) | Token::QConId(name), _)) => {
            tokens.next();
            if let Some((Token::LBrace, _)) = peek(tokens, cx) {
                let fields = parse_record_fields(tokens, cx, parse_pattern)?;
                return Ok(Pattern::Record { name: name.clone(),
                                            fields });
            }
            let mut args = Vec::new();
            while let Some((tok, _)) = peek(tokens, cx)
                  && starts_apat(tok)
            {
                args.push(parse_apat(tokens, cx)?);
            }
            Ok(Pattern::Con { name: name.clone(),
                              args })
        },
        _ => parse_apat(tokens, cx),
    }
}

/// Parses an atomic pattern: one that can stand as a constructor or
/// function argument without parentheses.
///
/// Grammar:
/// ```text
///     apat := var ("@" apat)?
///           | "_"
///           | con
///           | con "{" fields "}"
///           | literal
///           | "~" apat
///           | "!" apat                      (BangPatterns)
///           | "(" ")"
///           | "(" pattern ")"
///           | "(" pattern "::" type ")"     (ScopedTypeVariables)
///           | "(" pattern ("," pattern)+ ")"
///           | "[" (pattern ("," pattern)*)? "]"
/// ```
/// # Errors
/// Returns a `ParseError` if the next token cannot start a pattern, the
/// pattern is malformed, or it uses syntax whose extension is off.
pub fn parse_apat<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Pattern>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let cx = descend(tokens, cx)?;
    let (tok, position) = peek(tokens, cx).ok_or_else(|| cx.end_of_input())?;

    match tok {
        Token::VarId(name) => {
            tokens.next();
            if name == "_" {
                return Ok(Pattern::Wildcard);
            }
            if let Some((Token::At, _)) = peek(tokens, cx) {
                tokens.next();
                let pattern = parse_apat(tokens, cx)?;
                return Ok(Pattern::As { name:    name.clone(),
                                        pattern: Box::new(pattern), });
            }
            Ok(Pattern::Var(name.clone()))
        },
        Token::ConId(name) | Token::QConId(name) => {
            tokens.next();
            if let Some((Token::LBrace, _)) = peek(tokens, cx) {
                let fields = parse_record_fields(tokens, cx, parse_pattern)?;
                return Ok(Pattern::Record { name: name.clone(),
                                            fields });
            }
            Ok(Pattern::Con { name: name.clone(),
                              args: Vec::new() })
        },
        Token::Tilde => {
            tokens.next();
            Ok(Pattern::Lazy(Box::new(parse_apat(tokens, cx)?)))
        },
        Token::VarSym(op) if op == "!" => {
            cx.require(ExtensionFlag::BangPatterns, "bang pattern", position.line)?;
            tokens.next();
            Ok(Pattern::Bang(Box::new(parse_apat(tokens, cx)?)))
        },
        Token::LParen => parse_paren_pattern(tokens, cx),
        Token::LBracket => {
            tokens.next();
            let items = parse_comma_separated(tokens, cx, parse_pattern, &Token::RBracket)?;
            Ok(Pattern::List(items))
        },
        _ => match token_literal(tok) {
            Some(value) => {
                tokens.next();
                Ok(Pattern::Literal { value,
                                      negated: false })
            },
            None => {
                Err(ParseError::UnexpectedToken { token: format!("Expected a pattern, found {tok:?}"),
                                                  line:  position.line, })
            },
        },
    }
}

fn parse_paren_pattern<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Pattern>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let open = expect(tokens, cx, &Token::LParen, "'('")?;

    if let Some((Token::RParen, _)) = peek(tokens, cx) {
        tokens.next();
        return Ok(Pattern::Con { name: "()".to_string(),
                                 args: Vec::new() });
    }

    let first = parse_pattern(tokens, cx)?;
    match peek(tokens, cx) {
        Some((Token::DoubleColon, _)) => {
            cx.require(ExtensionFlag::ScopedTypeVariables,
                       "pattern type signature",
                       open.line)?;
            tokens.next();
            let ty = parse_type(tokens, cx)?;
            expect(tokens, cx, &Token::RParen, "')'")?;
            Ok(Pattern::Annotated { pattern: Box::new(first),
                                    ty })
        },
        Some((Token::Comma, _)) => {
            tokens.next();
            let mut items = vec![first];
            items.extend(parse_comma_separated_nonempty(tokens,
                                                        cx,
                                                        parse_pattern,
                                                        &Token::RParen)?);
            Ok(Pattern::Tuple(items))
        },
        _ => {
            expect(tokens, cx, &Token::RParen, "')'")?;
            Ok(first)
        },
    }
}

/// Returns `true` if `token` can begin an atomic pattern.
pub(in crate::syntax::parser) fn starts_apat(token: &Token) -> bool {
    match token {
        Token::Tilde => true,
        Token::VarSym(op) => op == "!",
        _ => token.starts_atom(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::extension::ExtensionSet, syntax::lexer::tokenize};

    fn pattern(source: &str, flags: ExtensionSet) -> ParseResult<Pattern> {
        let stream = tokenize(source)?;
        let mut tokens = stream.tokens.iter().peekable();
        parse_pattern(&mut tokens, ParseContext::for_stream(flags, &stream))
    }

    #[test]
    fn cons_patterns_associate_right() {
        let parsed = pattern("x : y : rest", ExtensionSet::empty()).unwrap();
        let Pattern::Infix { left, right, .. } = parsed else {
            panic!("expected an infix pattern, got {parsed:?}");
        };
        assert_eq!(*left, Pattern::Var("x".to_string()));
        assert!(matches!(*right, Pattern::Infix { .. }));
    }

    #[test]
    fn as_patterns_bind_the_whole_value() {
        let parsed = pattern("all@(x, _)", ExtensionSet::empty()).unwrap();
        assert!(matches!(parsed, Pattern::As { ref name, .. } if name == "all"));
    }

    #[test]
    fn bang_patterns_need_their_extension() {
        assert!(pattern("!x", ExtensionSet::empty()).is_err());
        let flags = ExtensionSet::resolve([ExtensionFlag::BangPatterns]);
        assert_eq!(pattern("!x", flags).unwrap(),
                   Pattern::Bang(Box::new(Pattern::Var("x".to_string()))));
    }

    #[test]
    fn signatures_in_patterns_need_scoped_type_variables() {
        assert!(pattern("(n :: Int)", ExtensionSet::empty()).is_err());
        let flags = ExtensionSet::resolve([ExtensionFlag::ScopedTypeVariables]);
        assert!(matches!(pattern("(n :: Int)", flags).unwrap(), Pattern::Annotated { .. }));
    }

    #[test]
    fn tuples_need_a_component_after_every_comma() {
        assert!(matches!(pattern("(a, b)", ExtensionSet::empty()).unwrap(),
                         Pattern::Tuple(ref ps) if ps.len() == 2));
        assert!(pattern("(a,)", ExtensionSet::empty()).is_err());
        assert!(pattern("(a, b,)", ExtensionSet::empty()).is_err());
    }

    #[test]
    fn deeply_nested_patterns_fail_cleanly() {
        let lazy = format!("{}x", "~".repeat(5_000));
        assert!(matches!(pattern(&lazy, ExtensionSet::empty()), Err(ParseError::Other { .. })));

        let parens = format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(matches!(pattern(&parens, ExtensionSet::empty()), Err(ParseError::Other { .. })));
    }

    #[test]
    fn truncated_patterns_report_the_last_line() {
        assert_eq!(pattern("(x,\n  y,\n  ", ExtensionSet::empty()),
                   Err(ParseError::UnexpectedEndOfInput { line: 2 }));
    }
}
