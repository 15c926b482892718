/// Core parsing logic: the parse context, the expression entry point and
/// whole-fragment parsing.
pub mod core;

/// Infix expressions and operator recognition.
///
/// Operators are collected left to right without fixity resolution; the
/// classifier only needs to know that the sequence is well formed.
pub mod binary;

/// Prefix forms and atoms.
///
/// Handles lambdas, `let`, `if`, `case` and `do`, function and type
/// application, and the atomic expressions: names, literals, parenthesized
/// forms, sections, tuples, lists and records.
pub mod unary;

/// Local bindings, `case` alternatives, guards and `do` statements.
pub mod binding;

/// Patterns, as used by lambdas, alternatives, binds and local bindings.
pub mod pattern;

/// Types, as used by annotations, signatures and type applications.
pub mod types;

/// Import declarations.
///
/// This grammar is separate from the expression grammar: an import is never
/// an expression, but the session needs its parts to record it.
pub mod import;

/// Token-level helpers shared by the grammar rules: layout-aware lookahead,
/// expectation checks, comma-separated lists and layout blocks.
pub mod utils;
