use std::iter::Peekable;

use crate::{
    ast::Expr,
    syntax::{
        lexer::{Position, Token},
        parser::{
            core::{ParseContext, ParseResult},
            unary::parse_lexp,
            utils::{descend, peek},
        },
    },
};

/// Parses an infix expression.
///
/// Operands are joined left to right by any operator: symbolic (`+`, `<$>`,
/// `:`), the minus sign, or a backticked name (`` `div` ``). Fixities are not
/// consulted. An operator immediately followed by `)` is left alone so the
/// enclosing parenthesized form can turn it into a left section.
///
/// Grammar: `infix := operand (operator operand)*`
///
/// # Parameters
/// - `tokens`: Token stream with position information.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// An `Expr::Infix` tree, or the single operand.
pub fn parse_infix<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let cx = descend(tokens, cx)?;
    let mut left = parse_operand(tokens, cx)?;
    loop {
        let mut lookahead = tokens.clone();
        let Some(op) = scan_operator(&mut lookahead, cx) else {
            break;
        };
        if let Some((Token::RParen, _)) = peek(&mut lookahead, cx) {
            break;
        }
        *tokens = lookahead;

        let right = parse_operand(tokens, cx)?;
        left = Expr::Infix { left: Box::new(left),
                             op,
                             right: Box::new(right) };
    }
    Ok(left)
}

/// Parses one operand of an infix expression, allowing prefix negation.
///
/// Grammar: `operand := "-" operand | lexp`
fn parse_operand<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if let Some((Token::Minus, position)) = peek(tokens, cx) {
        let cx = cx.deeper(position.line)?;
        tokens.next();
        let operand = parse_operand(tokens, cx)?;
        return Ok(Expr::Negate(Box::new(operand)));
    }
    parse_lexp(tokens, cx)
}

/// Consumes an operator if one comes next.
///
/// Recognises symbolic operators, constructor operators, `-`, and
/// backticked identifiers. A lone backtick that does not enclose a name is
/// not an operator and is left unconsumed.
///
/// # Returns
/// The operator as written, with backticks kept, or `None` if the next token
/// does not start an operator.
///
/// # Example
/// ```
/// use evalctx::{
///     session::extension::ExtensionSet,
///     syntax::{
///         lexer::tokenize,
///         parser::{binary::scan_operator, core::ParseContext},
///     },
/// };
///
/// let stream = tokenize("`elem` xs").unwrap();
/// let mut tokens = stream.tokens.iter().peekable();
/// let cx = ParseContext::new(ExtensionSet::empty(), 1);
/// assert_eq!(scan_operator(&mut tokens, cx).as_deref(), Some("`elem`"));
/// ```
pub fn scan_operator<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> Option<String>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    match peek(tokens, cx)? {
        (Token::VarSym(op) | Token::ConSym(op), _) => {
            tokens.next();
            Some(op.clone())
        },
        (Token::Minus, _) => {
            tokens.next();
            Some("-".to_string())
        },
        (Token::Backtick, _) => {
            let mut lookahead = tokens.clone();
            lookahead.next();
            let name = match lookahead.next() {
                Some((Token::VarId(name)
                      | Token::ConId(name)
                      | Token::QVarId(name)
                      | Token::QConId(name),
                      _)) => name,
                _ => return None,
            };
            if !matches!(lookahead.next(), Some((Token::Backtick, _))) {
                return None;
            }
            *tokens = lookahead;
            Some(format!("`{name}`"))
        },
        _ => None,
    }
}
