use std::iter::Peekable;

use crate::{
    ast::Type,
    error::ParseError,
    session::extension::ExtensionFlag,
    syntax::{
        lexer::{Position, Token},
        parser::{
            core::{ParseContext, ParseResult},
            utils::{descend, expect, parse_comma_separated_nonempty, peek},
        },
    },
};

/// Parses a type, as found after `::` or in a type application.
///
/// `forall` only quantifies when `ExplicitForAll` is in effect; otherwise it
/// is an ordinary type variable and the `.` that follows is left unparsed.
///
/// Grammar:
/// ```text
///     type := "forall" tyvar+ "." type      (ExplicitForAll)
///           | btype "=>" type
///           | btype "->" type
///           | btype
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a type.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed [`Type`].
pub fn parse_type<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let cx = descend(tokens, cx)?;
    if let Some((Token::VarId(word), position)) = peek(tokens, cx)
       && word == "forall"
       && cx.allows(ExtensionFlag::ExplicitForAll)
    {
        tokens.next();
        return parse_forall(tokens, cx, *position);
    }

    let ty = parse_btype(tokens, cx)?;
    match peek(tokens, cx) {
        Some((Token::FatArrow, _)) => {
            tokens.next();
            let body = parse_type(tokens, cx)?;
            Ok(Type::Qualified { context: Box::new(ty),
                                 body:    Box::new(body), })
        },
        Some((Token::RArrow, _)) => {
            tokens.next();
            let result = parse_type(tokens, cx)?;
            Ok(Type::Fun(Box::new(ty), Box::new(result)))
        },
        _ => Ok(ty),
    }
}

/// Parses the binders and body of a `forall` whose keyword was consumed.
fn parse_forall<'a, I>(tokens: &mut Peekable<I>,
                       cx: ParseContext,
                       start: Position)
                       -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut vars = Vec::new();
    while let Some((Token::VarId(var), _)) = peek(tokens, cx) {
        tokens.next();
        vars.push(var.clone());
    }
    if vars.is_empty() {
        return Err(ParseError::Other { message: "Expected type variables after 'forall'".to_string(),
                                       line:    start.line, });
    }

    match peek(tokens, cx) {
        Some((Token::VarSym(dot), _)) if dot == "." => {
            tokens.next();
        },
        Some((tok, position)) => {
            return Err(ParseError::UnexpectedToken { token: format!("Expected '.' after forall binders, found {tok:?}"),
                                                     line:  position.line, });
        },
        None => return Err(cx.end_of_input()),
    }

    let body = parse_type(tokens, cx)?;
    Ok(Type::Forall { vars,
                      body: Box::new(body) })
}

/// Parses a type application chain, `Either String a`.
fn parse_btype<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut ty = parse_atype(tokens, cx)?;
    while let Some((tok, _)) = peek(tokens, cx)
          && starts_atype(tok)
    {
        let argument = parse_atype(tokens, cx)?;
        ty = Type::App(Box::new(ty), Box::new(argument));
    }
    Ok(ty)
}

/// Parses an atomic type.
///
/// Grammar:
/// ```text
///     atype := tyvar | tycon
///            | "(" ")" | "(" "->" ")"
///            | "(" type ")"
///            | "(" type ("," type)+ ")"
///            | "[" "]" | "[" type "]"
/// ```
/// # Errors
/// Returns a `ParseError` if the next token cannot start a type or a bracket
/// is left unclosed.
pub fn parse_atype<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::VarId(name), _)) => {
            tokens.next();
            Ok(Type::Var(name.clone()))
        },
        Some((Token::ConId(name) | Token::QConId(name), _)) => {
            tokens.next();
            Ok(Type::Con(name.clone()))
        },
        Some((Token::LParen, _)) => {
            tokens.next();
            if let Some((Token::RArrow, _)) = peek(tokens, cx) {
                tokens.next();
                expect(tokens, cx, &Token::RParen, "')' after '(->'")?;
                return Ok(Type::Con("(->)".to_string()));
            }
            if let Some((Token::RParen, _)) = peek(tokens, cx) {
                tokens.next();
                return Ok(Type::Con("()".to_string()));
            }
            let mut items = parse_comma_separated_nonempty(tokens, cx, parse_type, &Token::RParen)?;
            if items.len() == 1 {
                Ok(items.remove(0))
            } else {
                Ok(Type::Tuple(items))
            }
        },
        Some((Token::LBracket, _)) => {
            tokens.next();
            if let Some((Token::RBracket, _)) = peek(tokens, cx) {
                tokens.next();
                return Ok(Type::Con("[]".to_string()));
            }
            let element = parse_type(tokens, cx)?;
            expect(tokens, cx, &Token::RBracket, "']' after list element type")?;
            Ok(Type::List(Box::new(element)))
        },
        Some((tok, position)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected a type, found {tok:?}"),
                                              line:  position.line, })
        },
        None => Err(cx.end_of_input()),
    }
}

const fn starts_atype(token: &Token) -> bool {
    matches!(token,
             Token::VarId(_)
             | Token::ConId(_)
             | Token::QConId(_)
             | Token::LParen
             | Token::LBracket)
}
