use std::iter::Peekable;

use crate::{
    error::ParseError,
    syntax::{
        lexer::{Position, Token},
        parser::core::{ParseContext, ParseResult},
    },
};

/// Returns the next significant token without consuming it.
///
/// Line breaks that merely continue the current construct (the next line is
/// indented past the enclosing block) are consumed along the way. A line
/// break that starts a new block item or closes the block is returned like
/// any other token so the caller can stop at it.
///
/// # Parameters
/// - `tokens`: Token iterator.
/// - `cx`: The context whose indentation decides what counts as a
///   continuation.
pub(in crate::syntax::parser) fn peek<'a, I>(tokens: &mut Peekable<I>,
                                             cx: ParseContext)
                                             -> Option<&'a (Token, Position)>
    where I: Iterator<Item = &'a (Token, Position)>
{
    while let Some((Token::NewLine(column), _)) = tokens.peek()
          && *column > cx.indent
    {
        tokens.next();
    }
    tokens.peek().copied()
}

/// Enters one more level of nesting, failing once the limit is reached.
///
/// Every recursive production calls this before recursing, which bounds the
/// stack used for any input.
///
/// # Errors
/// Returns a `ParseError` on the line of the next token when the input nests
/// deeper than [`MAX_DEPTH`](crate::syntax::parser::core::MAX_DEPTH).
pub(in crate::syntax::parser) fn descend<'a, I>(tokens: &mut Peekable<I>,
                                                cx: ParseContext)
                                                -> ParseResult<ParseContext>
    where I: Iterator<Item = &'a (Token, Position)>
{
    let line = peek(tokens, cx).map_or(cx.end_line, |(_, position)| position.line);
    cx.deeper(line)
}

/// Consumes the next significant token if it equals `expected`.
///
/// # Parameters
/// - `tokens`: Token iterator.
/// - `cx`: The enclosing parse context.
/// - `expected`: The required token.
/// - `description`: How the token is named in the error message.
///
/// # Returns
/// The position of the consumed token.
///
/// # Errors
/// Returns a `ParseError` if the next token differs or the input ends.
pub(in crate::syntax::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                               cx: ParseContext,
                                               expected: &Token,
                                               description: &str)
                                               -> ParseResult<Position>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match peek(tokens, cx) {
        Some((tok, position)) if tok == expected => {
            tokens.next();
            Ok(*position)
        },
        Some((tok, position)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected {description}, found {tok:?}"),
                                              line:  position.line, })
        },
        None => Err(cx.end_of_input()),
    }
}

/// Succeeds only if every token has been consumed.
///
/// # Parameters
/// - `tokens`: Token iterator.
/// - `construct`: What was parsed, for the error message.
///
/// # Errors
/// Returns [`ParseError::UnexpectedTrailingTokens`] naming the first leftover
/// token.
pub(in crate::syntax::parser) fn expect_end<'a, I>(tokens: &mut Peekable<I>,
                                                   construct: &'static str)
                                                   -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match tokens.next() {
        None => Ok(()),
        Some((tok, position)) => {
            Err(ParseError::UnexpectedTrailingTokens { construct,
                                                       token: format!("{tok:?}"),
                                                       line: position.line })
        },
    }
}

/// Consumes a block-level line break if the token after it is `keyword`.
///
/// Lets `then`, `else` and `in` start a line at the enclosing block's
/// indentation, as they commonly do inside `do` blocks.
pub(in crate::syntax::parser) fn skip_newline_before<'a, I>(tokens: &mut Peekable<I>,
                                                            cx: ParseContext,
                                                            keyword: &Token)
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if let Some((Token::NewLine(_), _)) = peek(tokens, cx) {
        let mut lookahead = tokens.clone();
        lookahead.next();
        if matches!(lookahead.peek(), Some((tok, _)) if tok == keyword) {
            tokens.next();
        }
    }
}

/// Parses a comma-separated list of items until a closing token.
///
/// This utility is shared by tuple patterns, list patterns, record fields,
/// comprehension qualifiers and import lists. It repeatedly calls
/// `parse_item` to parse one element, expecting either:
///
/// - a comma, to continue the list, or
/// - the specified closing token, to end it.
///
/// An immediately encountered closing token produces an empty list.
///
/// Grammar (simplified): `list := item ("," item)*`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `cx`: The enclosing parse context.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (e.g., `]` or `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `ParseError` if:
/// - an item fails to parse,
/// - an unexpected token is encountered,
/// - the stream ends before the closing token.
pub(in crate::syntax::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    cx: ParseContext,
    parse_item: impl Fn(&mut Peekable<I>, ParseContext) -> ParseResult<T>,
    closing: &Token)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if let Some((tok, _)) = peek(tokens, cx)
       && tok == closing
    {
        tokens.next();

        return Ok(Vec::new());
    }
    parse_comma_separated_nonempty(tokens, cx, parse_item, closing)
}

/// Like [`parse_comma_separated`], but at least one item must come before
/// the closing token. Used after a comma has already been consumed, where
/// `,]` or `,)` would be a dangling separator.
///
/// Grammar: `list := item ("," item)* closing`
pub(in crate::syntax::parser) fn parse_comma_separated_nonempty<'a, I, T>(
    tokens: &mut Peekable<I>,
    cx: ParseContext,
    parse_item: impl Fn(&mut Peekable<I>, ParseContext) -> ParseResult<T>,
    closing: &Token)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut items = Vec::new();
    loop {
        items.push(parse_item(tokens, cx)?);
        match peek(tokens, cx) {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((tok, _)) if tok == closing => {
                tokens.next();
                break;
            },
            Some((tok, position)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or {closing:?}, found {tok:?}"),
                                                         line:  position.line, });
            },
            None => return Err(cx.end_of_input()),
        }
    }
    Ok(items)
}

/// Parses the body of a `do`, `of`, `let` or `where` block.
///
/// With an opening `{` the block is explicit: items are separated by `;` and
/// run to the matching `}`, and line breaks are insignificant. Otherwise the
/// column of the first item fixes the block's indentation and the layout rule
/// applies: a line starting at that column begins the next item, a line
/// starting further left (or any token that cannot continue an item, such as
/// `)` or `in`) ends the block. `;` also separates items in a layout block.
///
/// Grammar:
/// ```text
///     block := "{" (item (";" item)*)? "}"
///            | item ((";" | newline) item)*
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned after the block keyword.
/// - `cx`: The enclosing parse context.
/// - `parse_item`: Function used to parse each item.
///
/// # Returns
/// The parsed items, which may be empty.
pub(in crate::syntax::parser) fn parse_block<'a, I, T>(
    tokens: &mut Peekable<I>,
    cx: ParseContext,
    parse_item: impl Fn(&mut Peekable<I>, ParseContext) -> ParseResult<T>)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let cx = descend(tokens, cx)?;
    if let Some((Token::LBrace, _)) = peek(tokens, cx) {
        tokens.next();
        let inner = cx.nested(0);
        let mut items = Vec::new();
        loop {
            match peek(tokens, inner) {
                Some((Token::Semicolon, _)) => {
                    tokens.next();
                },
                Some((Token::RBrace, _)) => {
                    tokens.next();
                    return Ok(items);
                },
                Some(_) => {
                    items.push(parse_item(tokens, inner)?);
                    match peek(tokens, inner) {
                        Some((Token::Semicolon | Token::RBrace, _)) => {},
                        Some((tok, position)) => {
                            return Err(ParseError::UnexpectedToken { token: format!("Expected ';' or '}}', found {tok:?}"),
                                                                     line:  position.line, });
                        },
                        None => return Err(cx.end_of_input()),
                    }
                },
                None => return Err(cx.end_of_input()),
            }
        }
    }

    let indent = match peek(tokens, cx) {
        Some((tok, position)) if !closes_block(tok) && position.column > cx.indent => {
            position.column
        },
        _ => return Ok(Vec::new()),
    };

    let inner = cx.nested(indent);
    let mut items = vec![parse_item(tokens, inner)?];
    loop {
        match peek(tokens, inner) {
            Some((Token::NewLine(column), _)) if *column == indent => {
                tokens.next();
                items.push(parse_item(tokens, inner)?);
            },
            Some((Token::Semicolon, _)) => {
                tokens.next();
                if let Some((tok, _)) = peek(tokens, inner)
                   && !closes_block(tok)
                {
                    items.push(parse_item(tokens, inner)?);
                }
            },
            _ => break,
        }
    }

    Ok(items)
}

/// Returns `true` for tokens that end a layout block without being part of
/// any item.
const fn closes_block(token: &Token) -> bool {
    matches!(token,
             Token::NewLine(_)
             | Token::RParen
             | Token::RBracket
             | Token::RBrace
             | Token::Comma
             | Token::In
             | Token::Then
             | Token::Else
             | Token::Of)
}
