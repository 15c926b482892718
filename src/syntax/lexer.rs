use logos::Logos;

use crate::error::ParseError;

/// Represents a lexical token in a source fragment.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the fragment language.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Floating literal tokens, such as `3.14` or `2e-10`.
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    Float(String),
    /// Integer literal tokens, such as `42`, `0xff`, `0o17` or `0b1010`.
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[oO][0-7][0-7_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01][01_]*", |lex| lex.slice().to_string())]
    Integer(String),
    /// Character literal tokens, such as `'a'` or `'\n'`.
    #[regex(r"'([^'\\\n]|\\[^'\n]+|\\')'", |lex| lex.slice().to_string(), allow_greedy = true)]
    Char(String),
    /// String literal tokens, such as `"hello"`.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| lex.slice().to_string(), allow_greedy = true)]
    String(String),

    /// Variable identifiers such as `x`, `foldr'`, `café` or `_`. Letters
    /// without case count as lowercase.
    #[regex(r"[\p{Ll}\p{Lo}_][\p{L}\p{N}_']*", |lex| lex.slice().to_string())]
    VarId(String),
    /// Constructor and module names such as `Just` or `Maybe`.
    #[regex(r"[\p{Lu}\p{Lt}][\p{L}\p{N}_']*", |lex| lex.slice().to_string())]
    ConId(String),
    /// Qualified variables such as `Map.lookup`.
    #[regex(r"([\p{Lu}\p{Lt}][\p{L}\p{N}_']*\.)+[\p{Ll}\p{Lo}_][\p{L}\p{N}_']*",
            |lex| lex.slice().to_string())]
    QVarId(String),
    /// Qualified constructors and hierarchical module names such as
    /// `Data.Maybe`.
    #[regex(r"([\p{Lu}\p{Lt}][\p{L}\p{N}_']*\.)+[\p{Lu}\p{Lt}][\p{L}\p{N}_']*",
            |lex| lex.slice().to_string())]
    QConId(String),

    /// `case`
    #[token("case")]
    Case,
    /// `class`
    #[token("class")]
    Class,
    /// `data`
    #[token("data")]
    Data,
    /// `default`
    #[token("default")]
    Default,
    /// `deriving`
    #[token("deriving")]
    Deriving,
    /// `do`
    #[token("do")]
    Do,
    /// `else`
    #[token("else")]
    Else,
    /// `foreign`
    #[token("foreign")]
    Foreign,
    /// `if`
    #[token("if")]
    If,
    /// `import`
    #[token("import")]
    Import,
    /// `in`
    #[token("in")]
    In,
    /// `infix`, `infixl` or `infixr`
    #[token("infix")]
    #[token("infixl")]
    #[token("infixr")]
    Infix,
    /// `instance`
    #[token("instance")]
    Instance,
    /// `let`
    #[token("let")]
    Let,
    /// `module`
    #[token("module")]
    Module,
    /// `newtype`
    #[token("newtype")]
    Newtype,
    /// `of`
    #[token("of")]
    Of,
    /// `then`
    #[token("then")]
    Then,
    /// `type`
    #[token("type")]
    Type,
    /// `where`
    #[token("where")]
    Where,

    /// `..`
    #[token("..")]
    DotDot,
    /// `::`
    #[token("::")]
    DoubleColon,
    /// `=`
    #[token("=", priority = 5)]
    Equals,
    /// `\`
    #[token("\\", priority = 5)]
    Backslash,
    /// `|`
    #[token("|", priority = 5)]
    Bar,
    /// `<-`
    #[token("<-")]
    LArrow,
    /// `->`
    #[token("->")]
    RArrow,
    /// `@`
    #[token("@", priority = 5)]
    At,
    /// `~`
    #[token("~", priority = 5)]
    Tilde,
    /// `=>`
    #[token("=>")]
    FatArrow,
    /// `-`
    #[token("-", priority = 5)]
    Minus,
    /// Any other operator symbol, such as `+`, `<$>` or `.`.
    #[regex(r"[!#$%&*+./<=>?@\\^|~-][!#$%&*+./<=>?@\\^|~:-]*", |lex| lex.slice().to_string())]
    VarSym(String),
    /// Constructor operators, such as `:` or `:|`.
    #[regex(r":[!#$%&*+./<=>?@\\^|~:-]*", |lex| lex.slice().to_string())]
    ConSym(String),

    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `` ` ``
    #[token("`")]
    Backtick,

    /// `-- Comments.` A dash run followed by another symbol is an operator.
    #[regex(r"--+([^\n!#$%&*+./<=>?@\\^|~:-][^\n]*)?", logos::skip, allow_greedy = true, priority = 10)]
    Comment,
    /// `{- Nested block comments. -}`
    ///
    /// Emitted by the lexer and dropped by [`tokenize`].
    #[token("{-", block_comment)]
    BlockComment,

    /// A line break. Carries the column of the first token on the next line,
    /// which drives the layout rule.
    #[token("\n", |lex| {
        lex.extras.line      += 1;
        lex.extras.line_start = lex.span().end;
        0
    })]
    NewLine(usize),
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl Token {
    /// Returns `true` for tokens that can begin an atomic expression or an
    /// atomic pattern.
    #[must_use]
    pub const fn starts_atom(&self) -> bool {
        matches!(self,
                 Self::VarId(_)
                 | Self::ConId(_)
                 | Self::QVarId(_)
                 | Self::QConId(_)
                 | Self::Integer(_)
                 | Self::Float(_)
                 | Self::Char(_)
                 | Self::String(_)
                 | Self::LParen
                 | Self::LBracket)
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and where that line starts so every token
/// can be given a column.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset at which the current line starts.
    pub line_start: usize,
}

/// Where a token starts in the source, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Source line.
    pub line:   usize,
    /// Column within the line, counted in characters.
    pub column: usize,
}

/// The tokens of one fragment together with the column its first token
/// starts at, which is the indentation of the fragment's outermost layout
/// block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<(Token, Position)>,
    pub indent: usize,
}

/// Splits `source` into positioned tokens.
///
/// Comments are removed. Runs of line breaks collapse into a single
/// [`Token::NewLine`] carrying the column of the token that follows it;
/// leading and trailing line breaks are dropped.
///
/// # Errors
/// Returns [`ParseError::InvalidLexeme`] for input the lexer does not
/// recognise, including an unterminated block comment.
///
/// # Example
/// ```
/// use evalctx::syntax::lexer::{Token, tokenize};
///
/// let stream = tokenize("map f\n  xs").unwrap();
/// assert_eq!(stream.tokens[2].0, Token::NewLine(3));
/// ```
pub fn tokenize(source: &str) -> Result<TokenStream, ParseError> {
    let mut tokens: Vec<(Token, Position)> = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line:       1,
                                                                   line_start: 0, });
    let mut indent = 1;

    while let Some(token) = lexer.next() {
        let column = source.get(lexer.extras.line_start..lexer.span().start)
                           .map_or(0, |prefix| prefix.chars().count());
        let position = Position { line:   lexer.extras.line,
                                  column: column + 1, };
        match token {
            Ok(Token::BlockComment) => {},
            Ok(Token::NewLine(_)) => {
                if !tokens.is_empty() && !matches!(tokens.last(), Some((Token::NewLine(_), _))) {
                    tokens.push((Token::NewLine(0), position));
                }
            },
            Ok(tok) => {
                if let Some((Token::NewLine(column), _)) = tokens.last_mut() {
                    *column = position.column;
                } else if tokens.is_empty() {
                    indent = position.column;
                }
                tokens.push((tok, position));
            },
            Err(()) => {
                return Err(ParseError::InvalidLexeme { lexeme: lexer.slice().to_string(),
                                                       line:   lexer.extras.line, });
            },
        }
    }

    if let Some((Token::NewLine(_), _)) = tokens.last() {
        tokens.pop();
    }

    Ok(TokenStream { tokens, indent })
}

/// Skips over the body of a (possibly nested) `{- ... -}` comment.
///
/// # Returns
/// `true` once the matching `-}` has been consumed, `false` if the input ends
/// first.
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    let base = lex.span().end;
    let rest = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;

    while i < rest.len() {
        match (rest[i], rest.get(i + 1)) {
            (b'{', Some(b'-')) => {
                depth += 1;
                i += 2;
            },
            (b'-', Some(b'}')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lex.bump(i);
                    return true;
                }
            },
            (b'\n', _) => {
                lex.extras.line += 1;
                lex.extras.line_start = base + i + 1;
                i += 1;
            },
            _ => i += 1,
        }
    }

    lex.bump(rest.len());
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().tokens.into_iter().map(|(tok, _)| tok).collect()
    }

    fn sym(op: &str) -> Token {
        Token::VarSym(op.to_string())
    }

    #[test]
    fn reserved_symbols_beat_operators() {
        assert_eq!(kinds("= == -> --> \\ \\\\ | || @ ~ -"),
                   [Token::Equals,
                    sym("=="),
                    Token::RArrow,
                    sym("-->"),
                    Token::Backslash,
                    sym("\\\\"),
                    Token::Bar,
                    sym("||"),
                    Token::At,
                    Token::Tilde,
                    Token::Minus]);
    }

    #[test]
    fn dashes_start_comments_unless_they_form_an_operator() {
        assert_eq!(kinds("x -- the rest"), [Token::VarId("x".to_string())]);
        assert_eq!(kinds("x |-- y").len(), 3);
    }

    #[test]
    fn identifiers_may_be_unicode() {
        assert_eq!(kinds("café λ Ärger Données.Carte.vide"),
                   [Token::VarId("café".to_string()),
                    Token::VarId("λ".to_string()),
                    Token::ConId("Ärger".to_string()),
                    Token::QVarId("Données.Carte.vide".to_string())]);
    }

    #[test]
    fn columns_count_characters() {
        let stream = tokenize("é {- ü -} x\n  y").unwrap();
        assert_eq!(stream.tokens[1].1, Position { line: 1, column: 11 });
        assert_eq!(stream.tokens[2].0, Token::NewLine(3));
    }
}
