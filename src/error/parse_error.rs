use crate::session::extension::ExtensionFlag;

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Found an unexpected token while parsing.
    #[error("Error on line {line}: Unexpected token: {token}.")]
    UnexpectedToken {
        /// The token encountered, or a description of what was expected.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error on line {line}: Unexpected end of input.")]
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Found extra tokens after parsing should have completed.
    #[error("Error on line {line}: Extra tokens after {construct}: {token}")]
    UnexpectedTrailingTokens {
        /// What was successfully parsed before the extra tokens.
        construct: &'static str,
        /// The extra/unexpected token.
        token:     String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// The lexer could not make sense of a piece of input.
    #[error("Error on line {line}: Lexical error at '{lexeme}'.")]
    InvalidLexeme {
        /// The offending slice of source text.
        lexeme: String,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// Syntax that is only legal with a language extension enabled.
    #[error("Error on line {line}: Illegal {construct}: use {extension}")]
    ExtensionRequired {
        /// The construct that was rejected.
        construct: &'static str,
        /// The extension that would make it legal.
        extension: ExtensionFlag,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Some other kind of parse error, with a custom message.
    #[error("Error on line {line}: {message}")]
    Other {
        /// Details about the parse error.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}
