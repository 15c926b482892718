use std::iter::Peekable;

use crate::{
    ast::Expr,
    error::ParseError,
    session::extension::{ExtensionFlag, ExtensionSet},
    syntax::{
        lexer::{Position, Token, TokenStream, tokenize},
        parser::{
            binary::parse_infix,
            types::parse_type,
            utils::{expect_end, peek},
        },
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// How many constructs may nest inside one another before parsing gives up.
pub const MAX_DEPTH: usize = 128;

/// Grammar state threaded through every parsing function.
///
/// Holds the extension flags in effect and the indentation of the enclosing
/// layout block. A line break followed by a token indented further than
/// `indent` continues the current construct; one at exactly `indent` starts
/// the next item of the block; anything less closes the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// The extension flags in effect.
    pub flags:    ExtensionSet,
    /// Column of the enclosing layout block. Zero disables layout, as inside
    /// explicit braces.
    pub indent:   usize,
    /// How many nested constructs enclose the current one.
    pub depth:    usize,
    /// Line of the last token, reported when the input ends too early.
    pub end_line: usize,
}

impl ParseContext {
    #[must_use]
    pub const fn new(flags: ExtensionSet, indent: usize) -> Self {
        Self { flags,
               indent,
               depth: 0,
               end_line: 1 }
    }

    /// Returns the outermost context for parsing `stream`.
    #[must_use]
    pub fn for_stream(flags: ExtensionSet, stream: &TokenStream) -> Self {
        let end_line = stream.tokens.last().map_or(1, |(_, position)| position.line);
        Self { end_line,
               ..Self::new(flags, stream.indent) }
    }

    /// Returns the context for a block nested at `indent`.
    #[must_use]
    pub const fn nested(self, indent: usize) -> Self {
        Self { indent, ..self }
    }

    /// Returns the context one nesting level down.
    ///
    /// # Errors
    /// Returns [`ParseError::Other`] once [`MAX_DEPTH`] levels are open, so
    /// pathological input fails instead of exhausting the stack.
    pub fn deeper(self, line: usize) -> ParseResult<Self> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::Other { message: format!("Nesting exceeds {MAX_DEPTH} levels"),
                                           line });
        }
        Ok(Self { depth: self.depth + 1,
                  ..self })
    }

    /// The error for input that ends in the middle of a construct.
    #[must_use]
    pub const fn end_of_input(self) -> ParseError {
        ParseError::UnexpectedEndOfInput { line: self.end_line }
    }

    /// Returns `true` if `extension` is in effect.
    #[must_use]
    pub const fn allows(self, extension: ExtensionFlag) -> bool {
        self.flags.contains(extension)
    }

    /// Fails with [`ParseError::ExtensionRequired`] unless `extension` is in
    /// effect.
    ///
    /// # Parameters
    /// - `extension`: The flag that makes `construct` legal.
    /// - `construct`: Human-readable name of the rejected syntax.
    /// - `line`: Where the construct starts.
    pub fn require(self,
                   extension: ExtensionFlag,
                   construct: &'static str,
                   line: usize)
                   -> ParseResult<()> {
        if self.allows(extension) {
            Ok(())
        } else {
            Err(ParseError::ExtensionRequired { construct,
                                                extension,
                                                line })
        }
    }
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing. It parses an infix
/// expression and an optional trailing type annotation, which binds more
/// loosely than any operator.
///
/// Grammar: `expression := infix ("::" type)?`
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, Position)` pairs.
/// - `cx`: The enclosing parse context.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>, cx: ParseContext) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let expr = parse_infix(tokens, cx)?;

    if let Some((Token::DoubleColon, _)) = peek(tokens, cx) {
        tokens.next();
        let ty = parse_type(tokens, cx)?;
        return Ok(Expr::Annotated { expr: Box::new(expr),
                                    ty });
    }

    Ok(expr)
}

/// Parses an entire fragment as exactly one expression.
///
/// The fragment's first token fixes the indentation of the outermost layout
/// block, so a later line starting at that column (or further left) is a new
/// statement and makes the fragment something other than an expression.
///
/// # Errors
/// Returns the first lexical or syntax error, or
/// [`ParseError::UnexpectedTrailingTokens`] when input remains after the
/// expression.
///
/// # Example
/// ```
/// use evalctx::{session::extension::ExtensionSet, syntax::parser::core::parse_fragment};
///
/// assert!(parse_fragment("foldr (+) 0 [1, 2, 3]", ExtensionSet::empty()).is_ok());
/// assert!(parse_fragment("three = 3", ExtensionSet::empty()).is_err());
/// ```
pub fn parse_fragment(source: &str, flags: ExtensionSet) -> ParseResult<Expr> {
    let stream = tokenize(source)?;
    let cx = ParseContext::for_stream(flags, &stream);
    let mut tokens = stream.tokens.iter().peekable();

    let expr = parse_expression(&mut tokens, cx)?;
    expect_end(&mut tokens, "expression")?;

    Ok(expr)
}
