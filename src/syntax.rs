/// The lexer module tokenizes fragment text for further parsing.
///
/// The lexer (tokenizer) reads the raw source text and produces a stream of
/// positioned tokens, each corresponding to a meaningful language element
/// such as a literal, an identifier, a reserved word or an operator. Comments
/// are dropped and line breaks are kept only where the layout rule needs
/// them.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with line and column.
/// - Handles numeric, character and string literals, plain and qualified
///   names, and operator symbols.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module recognises expressions and import declarations.
///
/// The parser processes the token stream produced by the lexer and builds the
/// syntax tree defined in [`crate::ast`]. Acceptance depends on the active
/// extension flags: syntax guarded by an extension is rejected unless that
/// extension is in effect.
///
/// # Responsibilities
/// - Parses a whole fragment as a single expression, or as an import.
/// - Applies a simplified layout rule to `do`, `case`, `let` and `where`
///   blocks.
/// - Reports the first syntax error with its source line.
pub mod parser;
