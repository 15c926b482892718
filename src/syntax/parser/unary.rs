use std::iter::Peekable;

use crate::{
    ast::{Expr, FieldBinding, Literal, Stmt},
    error::ParseError,
    session::extension::ExtensionFlag,
    syntax::{
        lexer::{Position, Token},
        parser::{
            binary::{parse_infix, scan_operator},
            binding::{parse_alternative, parse_binding, parse_guarded_branches, parse_stmt},
            core::{ParseContext, ParseResult, parse_expression},
            pattern::{parse_apat, starts_apat},
            types::parse_atype,
            utils::{
                expect, parse_block, parse_comma_separated, parse_comma_separated_nonempty, peek,
                skip_newline_before,
            },
        },
    },
};

/// Parses a keyword-introduced expression or a function application.
///
/// Grammar:
/// ```text
///     lexp := "\" apat+ "->" expression
///           | "\" "case" alternatives            (LambdaCase)
///           | "let" bindings "in" expression
///           | "if" expression "then" expression "else" expression
///           | "if" ("|" guards "->" expression)+   (MultiWayIf)
///           | "case" expression "of" alternatives
///           | "do" statements
///           | application
/// ```
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed [`Expr`].
pub(crate) fn parse_lexp<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::Backslash, _)) => parse_lambda(tokens, cx),
        Some((Token::Let, _)) => parse_let(tokens, cx),
        Some((Token::If, _)) => parse_if(tokens, cx),
        Some((Token::Case, _)) => parse_case(tokens, cx),
        Some((Token::Do, _)) => parse_do(tokens, cx),
        _ => parse_application(tokens, cx),
    }
}

/// Parses a lambda abstraction or, with `LambdaCase`, a `\case` lambda.
///
/// # Errors
/// Returns a `ParseError` if:
/// - `\case` is used without `LambdaCase`,
/// - no parameter pattern follows `\`,
/// - `->` is missing,
/// - the body fails to parse.
fn parse_lambda<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let start = expect(tokens, cx, &Token::Backslash, "'\\'")?;

    if let Some((Token::Case, _)) = peek(tokens, cx) {
        cx.require(ExtensionFlag::LambdaCase, "lambda-case", start.line)?;
        tokens.next();
        let alternatives = parse_block(tokens, cx, parse_alternative)?;
        return Ok(Expr::LambdaCase(alternatives));
    }

    let mut params = Vec::new();
    while let Some((tok, _)) = peek(tokens, cx)
          && starts_apat(tok)
    {
        params.push(parse_apat(tokens, cx)?);
    }
    if params.is_empty() {
        return Err(ParseError::Other { message: "Expected a pattern after '\\'".to_string(),
                                       line:    start.line, });
    }

    expect(tokens, cx, &Token::RArrow, "'->'")?;
    let body = parse_expression(tokens, cx)?;

    Ok(Expr::Lambda { params,
                      body: Box::new(body) })
}

/// Parses `let bindings in expression`.
///
/// A `let` without `in` is a statement, not an expression, and fails here.
fn parse_let<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, cx, &Token::Let, "'let'")?;
    let bindings = parse_block(tokens, cx, parse_binding)?;

    skip_newline_before(tokens, cx, &Token::In);
    expect(tokens, cx, &Token::In, "'in'")?;
    let body = parse_expression(tokens, cx)?;

    Ok(Expr::Let { bindings,
                   body: Box::new(body) })
}

/// Parses a conditional.
///
/// Syntax:
/// ```text
///     if <condition> then <expr> else <expr>
///     if | <guards> -> <expr> | <guards> -> <expr>
/// ```
/// `then` and `else` may start a line at the enclosing block's indentation.
///
/// # Errors
/// - `ExtensionRequired` for the guarded form without `MultiWayIf`.
/// - `UnexpectedToken` if `then` or `else` is missing.
/// - Propagates any errors from sub-expression parsing.
fn parse_if<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let start = expect(tokens, cx, &Token::If, "'if'")?;

    if let Some((Token::Bar, _)) = peek(tokens, cx) {
        cx.require(ExtensionFlag::MultiWayIf, "multi-way if-expression", start.line)?;
        let branches = parse_guarded_branches(tokens, cx, &Token::RArrow)?;
        return Ok(Expr::MultiWayIf(branches));
    }

    let condition = parse_expression(tokens, cx)?;
    skip_newline_before(tokens, cx, &Token::Then);
    expect(tokens, cx, &Token::Then, "'then' after if condition")?;
    let then_branch = parse_expression(tokens, cx)?;
    skip_newline_before(tokens, cx, &Token::Else);
    expect(tokens, cx, &Token::Else, "'else' after then branch")?;
    let else_branch = parse_expression(tokens, cx)?;

    Ok(Expr::If { condition:   Box::new(condition),
                  then_branch: Box::new(then_branch),
                  else_branch: Box::new(else_branch), })
}

/// Parses `case expression of alternatives`.
fn parse_case<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, cx, &Token::Case, "'case'")?;
    let scrutinee = parse_expression(tokens, cx)?;
    expect(tokens, cx, &Token::Of, "'of' after case scrutinee")?;
    let alternatives = parse_block(tokens, cx, parse_alternative)?;

    Ok(Expr::Case { scrutinee: Box::new(scrutinee),
                    alternatives })
}

/// Parses a `do` block.
///
/// # Errors
/// Returns a `ParseError` if the block is empty or does not end with an
/// expression statement.
fn parse_do<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let start = expect(tokens, cx, &Token::Do, "'do'")?;
    let statements = parse_block(tokens, cx, parse_stmt)?;

    match statements.last() {
        Some(Stmt::Expr(_)) => Ok(Expr::Do(statements)),
        Some(_) => {
            Err(ParseError::Other { message: "The last statement in a 'do' block must be an \
                                              expression"
                                                         .to_string(),
                                    line:    start.line, })
        },
        None => Err(ParseError::Other { message: "Empty 'do' block".to_string(),
                                        line:    start.line, }),
    }
}

/// Parses function application.
///
/// Arguments are atoms. With `TypeApplications`, `@type` arguments are
/// accepted; with `BlockArguments`, keyword-introduced expressions (`do`,
/// lambdas, `case`, `if`, `let`) may appear as arguments without
/// parentheses.
///
/// Grammar:
/// ```text
///     application := atom (atom | "@" atype | lexp)*
/// ```
/// # Errors
/// Returns `ExtensionRequired` when a type or block argument appears without
/// its extension, and propagates errors from the arguments.
fn parse_application<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut function = parse_atom(tokens, cx)?;
    loop {
        match peek(tokens, cx) {
            Some((Token::At, position)) => {
                cx.require(ExtensionFlag::TypeApplications,
                           "visible type application",
                           position.line)?;
                tokens.next();
                let ty = parse_atype(tokens, cx)?;
                function = Expr::TypeApp { expr: Box::new(function),
                                           ty };
            },
            Some((tok, position)) if starts_block_argument(tok) => {
                cx.require(ExtensionFlag::BlockArguments, "block argument", position.line)?;
                let argument = parse_lexp(tokens, cx)?;
                function = Expr::App { function: Box::new(function),
                                       argument: Box::new(argument), };
            },
            Some((tok, _)) if tok.starts_atom() => {
                let argument = parse_atom(tokens, cx)?;
                function = Expr::App { function: Box::new(function),
                                       argument: Box::new(argument), };
            },
            _ => break,
        }
    }
    Ok(function)
}

/// Parses an atom followed by any number of record braces.
///
/// Grammar: `atom := primary ("{" fields "}")*`
fn parse_atom<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut atom = parse_primary(tokens, cx)?;
    while let Some((Token::LBrace, _)) = peek(tokens, cx) {
        let fields = parse_record_fields(tokens, cx, parse_expression)?;
        atom = Expr::Record { target: Box::new(atom),
                              fields };
    }
    Ok(atom)
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - variables and constructors, plain or qualified
/// - literals
/// - parenthesized forms: grouping, tuples, sections, operator references
/// - bracketed forms: lists, ranges, comprehensions
///
/// Grammar (simplified):
/// ```text
///     primary := var | con | literal
///              | "(" ... ")"
///              | "[" ... "]"
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a primary expression.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed primary [`Expr`] or a `ParseError` on failure.
fn parse_primary<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let (tok, position) = peek(tokens, cx).ok_or_else(|| cx.end_of_input())?;

    let expr = match tok {
        Token::VarId(name) | Token::QVarId(name) => Expr::Var(name.clone()),
        Token::ConId(name) | Token::QConId(name) => Expr::Con(name.clone()),
        Token::LParen => return parse_grouping(tokens, cx),
        Token::LBracket => return parse_list(tokens, cx),
        _ => match token_literal(tok) {
            Some(literal) => Expr::Literal(literal),
            None => {
                return Err(ParseError::UnexpectedToken { token: format!("{tok:?}"),
                                                         line:  position.line, });
            },
        },
    };
    tokens.next();

    Ok(expr)
}

/// Parses everything that starts with `(`.
///
/// Handles, in order:
/// - `()` (unit),
/// - `(op)` operator references and `(op e)` right sections; `(- e)` is
///   negation, not a section,
/// - `(e op)` left sections,
/// - `(e)` grouping and `(e1, ..., en)` tuples, where missing components
///   form tuple sections (requires `TupleSections`) and `(,)`, `(,,)` … name
///   tuple constructors.
///
/// # Errors
/// Returns a `ParseError` on unbalanced parentheses, malformed components, or
/// a tuple section without `TupleSections`.
fn parse_grouping<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let open = expect(tokens, cx, &Token::LParen, "'('")?;

    if let Some((Token::RParen, _)) = peek(tokens, cx) {
        tokens.next();
        return Ok(Expr::Con("()".to_string()));
    }

    let mut lookahead = tokens.clone();
    if let Some(op) = scan_operator(&mut lookahead, cx) {
        let closes = matches!(peek(&mut lookahead, cx), Some((Token::RParen, _)));
        if closes && !op.starts_with('`') {
            lookahead.next();
            *tokens = lookahead;
            return Ok(Expr::OperatorRef(op));
        }
        if op != "-" {
            *tokens = lookahead;
            let operand = parse_infix(tokens, cx)?;
            expect(tokens, cx, &Token::RParen, "')' after right section")?;
            return Ok(Expr::RightSection { op,
                                           operand: Box::new(operand) });
        }
    }

    let mut items: Vec<Option<Expr>> = Vec::new();
    loop {
        if let Some((Token::Comma | Token::RParen, _)) = peek(tokens, cx) {
            items.push(None);
        } else {
            let expr = parse_expression(tokens, cx)?;
            if items.is_empty() {
                let mut lookahead = tokens.clone();
                if let Some(op) = scan_operator(&mut lookahead, cx)
                   && let Some((Token::RParen, _)) = peek(&mut lookahead, cx)
                {
                    lookahead.next();
                    *tokens = lookahead;
                    return Ok(Expr::LeftSection { operand: Box::new(expr),
                                                  op });
                }
            }
            items.push(Some(expr));
        }

        match peek(tokens, cx) {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((Token::RParen, _)) => {
                tokens.next();
                break;
            },
            Some((tok, position)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or ')', found {tok:?}"),
                                                         line:  position.line, });
            },
            None => return Err(cx.end_of_input()),
        }
    }

    if items.len() == 1
       && let Some(Some(expr)) = items.pop()
    {
        return Ok(Expr::Paren(Box::new(expr)));
    }
    if items.iter().all(Option::is_none) {
        return Ok(Expr::TupleCon(items.len()));
    }
    if items.iter().any(Option::is_none) {
        cx.require(ExtensionFlag::TupleSections, "tuple section", open.line)?;
    }

    Ok(Expr::Tuple(items))
}

/// Parses everything that starts with `[`.
///
/// Grammar:
/// ```text
///     list := "[" "]"
///           | "[" expression ("," expression)* "]"
///           | "[" expression ("," expression)? ".." expression? "]"
///           | "[" expression "|" qualifier ("," qualifier)* "]"
/// ```
fn parse_list<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, cx, &Token::LBracket, "'['")?;

    if let Some((Token::RBracket, _)) = peek(tokens, cx) {
        tokens.next();
        return Ok(Expr::Con("[]".to_string()));
    }

    let first = parse_expression(tokens, cx)?;
    match peek(tokens, cx) {
        Some((Token::DotDot, _)) => {
            tokens.next();
            parse_range_end(tokens, cx, first, None)
        },
        Some((Token::Bar, _)) => {
            tokens.next();
            let qualifiers = parse_comma_separated(tokens, cx, parse_stmt, &Token::RBracket)?;
            Ok(Expr::Comprehension { head: Box::new(first),
                                     qualifiers })
        },
        Some((Token::Comma, _)) => {
            tokens.next();
            let second = parse_expression(tokens, cx)?;
            match peek(tokens, cx) {
                Some((Token::DotDot, _)) => {
                    tokens.next();
                    parse_range_end(tokens, cx, first, Some(second))
                },
                Some((Token::Comma, _)) => {
                    tokens.next();
                    let mut elements = vec![first, second];
                    elements.extend(parse_comma_separated_nonempty(tokens,
                                                                   cx,
                                                                   parse_expression,
                                                                   &Token::RBracket)?);
                    Ok(Expr::List(elements))
                },
                _ => {
                    expect(tokens, cx, &Token::RBracket, "']'")?;
                    Ok(Expr::List(vec![first, second]))
                },
            }
        },
        _ => {
            expect(tokens, cx, &Token::RBracket, "']'")?;
            Ok(Expr::List(vec![first]))
        },
    }
}

/// Parses the optional upper bound and closing bracket of a range whose
/// `..` has been consumed.
fn parse_range_end<'a, I>(tokens: &mut Peekable<I>,
                          cx: ParseContext,
                          from: Expr,
                          then: Option<Expr>)
                          -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let to = match peek(tokens, cx) {
        Some((Token::RBracket, _)) => None,
        _ => Some(Box::new(parse_expression(tokens, cx)?)),
    };
    expect(tokens, cx, &Token::RBracket, "']' after range")?;

    Ok(Expr::Range { from: Box::new(from),
                     then: then.map(Box::new),
                     to })
}

/// Parses a braced list of record fields, for expressions and patterns
/// alike.
///
/// Grammar:
/// ```text
///     fields := "{" (field ("," field)*)? "}"
///     field  := var "=" value
///             | var              (NamedFieldPuns)
///             | ".."             (RecordWildCards)
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at `{`.
/// - `cx`: The enclosing parse context.
/// - `parse_value`: Parses the value bound to a field.
pub(in crate::syntax::parser) fn parse_record_fields<'a, I, T>(
    tokens: &mut Peekable<I>,
    cx: ParseContext,
    parse_value: impl Fn(&mut Peekable<I>, ParseContext) -> ParseResult<T>)
    -> ParseResult<Vec<FieldBinding<T>>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, cx, &Token::LBrace, "'{'")?;

    // Explicit braces switch layout off for the fields.
    let inner = cx.nested(0);
    parse_comma_separated(tokens,
                          inner,
                          |tokens, cx| parse_field(tokens, cx, &parse_value),
                          &Token::RBrace)
}

fn parse_field<'a, I, T>(tokens: &mut Peekable<I>,
                         cx: ParseContext,
                         parse_value: &impl Fn(&mut Peekable<I>, ParseContext) -> ParseResult<T>)
                         -> ParseResult<FieldBinding<T>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx) {
        Some((Token::DotDot, position)) => {
            cx.require(ExtensionFlag::RecordWildCards, "record wildcard", position.line)?;
            tokens.next();
            Ok(FieldBinding::Wildcard)
        },
        Some((Token::VarId(field) | Token::QVarId(field), position)) => {
            tokens.next();
            if let Some((Token::Equals, _)) = peek(tokens, cx) {
                tokens.next();
                Ok(FieldBinding::Assign(field.clone(), parse_value(tokens, cx)?))
            } else {
                cx.require(ExtensionFlag::NamedFieldPuns, "record pun", position.line)?;
                Ok(FieldBinding::Pun(field.clone()))
            }
        },
        Some((tok, position)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected field name, found {tok:?}"),
                                              line:  position.line, })
        },
        None => Err(cx.end_of_input()),
    }
}

/// Converts a literal token into a [`Literal`].
///
/// # Returns
/// `None` for tokens that are not literals.
pub(in crate::syntax::parser) fn token_literal(token: &Token) -> Option<Literal> {
    match token {
        Token::Integer(text) => Some(Literal::Integer(text.clone())),
        Token::Float(text) => Some(Literal::Float(text.clone())),
        Token::Char(text) => Some(Literal::Char(text.clone())),
        Token::String(text) => Some(Literal::String(text.clone())),
        _ => None,
    }
}

/// Returns `true` for keywords that begin an expression usable as a block
/// argument.
const fn starts_block_argument(token: &Token) -> bool {
    matches!(token,
             Token::Backslash | Token::Do | Token::Case | Token::If | Token::Let)
}
