use std::fmt;

/// A literal as written in the source.
///
/// The text is kept verbatim; nothing here needs the numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// An integer literal, e.g. `42` or `0xff`.
    Integer(String),
    /// A floating literal, e.g. `2.5e3`.
    Float(String),
    /// A character literal including its quotes, e.g. `'x'`.
    Char(String),
    /// A string literal including its quotes.
    String(String),
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers the expression forms an interactive session accepts: names,
/// literals, application, infix chains, the keyword-introduced forms, and the
/// bracketed forms (tuples, sections, lists, comprehensions, records).
/// Operator fixity is not resolved, so infix chains associate to the left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A variable, possibly qualified. `_` is a typed hole.
    Var(String),
    /// A data constructor, possibly qualified. `()` and `[]` are constructors.
    Con(String),
    /// A literal value.
    Literal(Literal),
    /// Function application.
    App {
        /// The applied expression.
        function: Box<Self>,
        /// The argument.
        argument: Box<Self>,
    },
    /// Visible type application, `f @Int`.
    TypeApp {
        /// The expression being instantiated.
        expr: Box<Self>,
        /// The type argument.
        ty:   Type,
    },
    /// A binary operator application, `a + b` or ``a `div` b``.
    Infix {
        /// Left operand.
        left:  Box<Self>,
        /// The operator as written (backticks included).
        op:    String,
        /// Right operand.
        right: Box<Self>,
    },
    /// Prefix negation, `- x`.
    Negate(Box<Self>),
    /// A lambda abstraction, `\x y -> body`.
    Lambda {
        /// Parameter patterns.
        params: Vec<Pattern>,
        /// The body.
        body:   Box<Self>,
    },
    /// A `\case` lambda.
    LambdaCase(Vec<Alternative>),
    /// `let bindings in body`.
    Let {
        /// Local bindings.
        bindings: Vec<Binding>,
        /// The body.
        body:     Box<Self>,
    },
    /// `if condition then a else b`.
    If {
        /// The condition.
        condition:   Box<Self>,
        /// Value when the condition holds.
        then_branch: Box<Self>,
        /// Value otherwise.
        else_branch: Box<Self>,
    },
    /// `if | guard -> a | guard -> b`.
    MultiWayIf(Vec<GuardedExpr>),
    /// `case scrutinee of alternatives`.
    Case {
        /// The inspected expression.
        scrutinee:    Box<Self>,
        /// The alternatives, in order.
        alternatives: Vec<Alternative>,
    },
    /// A `do` block. The last statement is always an expression.
    Do(Vec<Stmt>),
    /// A tuple. `None` components are tuple-section holes.
    Tuple(Vec<Option<Self>>),
    /// A tuple constructor such as `(,)` or `(,,)`, holding its arity.
    TupleCon(usize),
    /// A list literal.
    List(Vec<Self>),
    /// An arithmetic sequence, `[from, then .. to]`.
    Range {
        /// First element.
        from: Box<Self>,
        /// Second element, fixing the step.
        then: Option<Box<Self>>,
        /// Upper bound; open-ended when absent.
        to:   Option<Box<Self>>,
    },
    /// A list comprehension, `[head | qualifiers]`.
    Comprehension {
        /// The produced element.
        head:       Box<Self>,
        /// Generators, guards and local bindings.
        qualifiers: Vec<Stmt>,
    },
    /// A left section, `(x +)`.
    LeftSection {
        /// The supplied operand.
        operand: Box<Self>,
        /// The operator.
        op:      String,
    },
    /// A right section, `(+ x)`.
    RightSection {
        /// The operator.
        op:      String,
        /// The supplied operand.
        operand: Box<Self>,
    },
    /// An operator used as a value, `(+)`.
    OperatorRef(String),
    /// Record construction or update, `C { f = e }` / `r { f = e }`.
    Record {
        /// The constructor or the updated record.
        target: Box<Self>,
        /// Field assignments in source order.
        fields: Vec<FieldBinding>,
    },
    /// A type-annotated expression, `e :: T`.
    Annotated {
        /// The annotated expression.
        expr: Box<Self>,
        /// Its declared type.
        ty:   Type,
    },
    /// A parenthesized expression.
    Paren(Box<Self>),
}

/// One field in a record construction, update or pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBinding<T = Expr> {
    /// `field = value`.
    Assign(String, T),
    /// `field` on its own (a pun).
    Pun(String),
    /// `..` (a wildcard).
    Wildcard,
}

/// A pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `_`
    Wildcard,
    /// A variable binder.
    Var(String),
    /// An as-pattern, `name@pattern`.
    As {
        /// The binder for the whole value.
        name:    String,
        /// The inner pattern.
        pattern: Box<Self>,
    },
    /// A literal, possibly negated.
    Literal {
        /// The literal.
        value:   Literal,
        /// Whether a leading `-` was written.
        negated: bool,
    },
    /// A constructor applied to argument patterns.
    Con {
        /// The constructor name.
        name: String,
        /// Argument patterns.
        args: Vec<Self>,
    },
    /// An infix constructor pattern such as `x : xs`.
    Infix {
        /// Left operand.
        left:  Box<Self>,
        /// The constructor operator.
        op:    String,
        /// Right operand.
        right: Box<Self>,
    },
    /// A tuple pattern.
    Tuple(Vec<Self>),
    /// A list pattern.
    List(Vec<Self>),
    /// A record pattern, `C { f = p }`.
    Record {
        /// The constructor name.
        name:   String,
        /// Field patterns.
        fields: Vec<FieldBinding<Self>>,
    },
    /// An irrefutable pattern, `~p`.
    Lazy(Box<Self>),
    /// A strict pattern, `!p`.
    Bang(Box<Self>),
    /// A pattern with a type signature, `(p :: T)`.
    Annotated {
        /// The pattern.
        pattern: Box<Self>,
        /// Its type.
        ty:      Type,
    },
}

/// A type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A type variable.
    Var(String),
    /// A type constructor, possibly qualified. `()`, `[]` and `(->)` included.
    Con(String),
    /// Type application.
    App(Box<Self>, Box<Self>),
    /// A function type.
    Fun(Box<Self>, Box<Self>),
    /// A tuple type.
    Tuple(Vec<Self>),
    /// A list type.
    List(Box<Self>),
    /// Explicit quantification, `forall a b. T`.
    Forall {
        /// Bound variables.
        vars: Vec<String>,
        /// The quantified type.
        body: Box<Self>,
    },
    /// A constrained type, `C a => T`.
    Qualified {
        /// The constraint (a tuple for several constraints).
        context: Box<Self>,
        /// The constrained type.
        body:    Box<Self>,
    },
}

/// A local binding in `let` or `where`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A type signature, `f, g :: T`.
    Signature {
        /// The names being given the type.
        names: Vec<String>,
        /// The type.
        ty:    Type,
    },
    /// A function or variable binding, `f x y = e`.
    Function {
        /// The bound name.
        name:   String,
        /// Argument patterns; empty for a plain variable.
        params: Vec<Pattern>,
        /// The right-hand side.
        rhs:    Rhs,
    },
    /// A pattern binding, `(a, b) = e`.
    Pattern {
        /// The bound pattern.
        pattern: Pattern,
        /// The right-hand side.
        rhs:     Rhs,
    },
}

/// The right-hand side of a binding or a `case` alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rhs {
    /// The value, plain or guarded.
    pub body:  Body,
    /// Bindings from a trailing `where`.
    pub local: Vec<Binding>,
}

/// A plain or guarded right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Plain(Box<Expr>),
    Guarded(Vec<GuardedExpr>),
}

/// `| guards -> body` (or `= body` in bindings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedExpr {
    /// Boolean guards, pattern guards and `let`s, all of which must succeed.
    pub guards: Vec<Stmt>,
    /// The value when they do.
    pub body:   Expr,
}

/// A `case` (or `\case`) alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub pattern: Pattern,
    pub rhs:     Rhs,
}

/// A statement in a `do` block, a comprehension, or a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `pattern <- expr`.
    Bind {
        /// The bound pattern.
        pattern: Pattern,
        /// The monadic (or list) expression.
        expr:    Expr,
    },
    /// `let bindings`.
    Let(Vec<Binding>),
    /// A bare expression.
    Expr(Expr),
}

/// An import declaration, e.g. `import qualified Data.Map as M (lookup)`.
///
/// Renders back to source with [`fmt::Display`], always using the prefix
/// `qualified` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Whether names come into scope only qualified.
    pub qualified:   bool,
    /// The imported module.
    pub module_name: String,
    /// The `as` alias, if any.
    pub alias:       Option<String>,
    /// The explicit import or `hiding` list, if any.
    pub import_list: Option<ImportList>,
}

/// The parenthesized item list of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportList {
    /// `true` for `hiding (...)`.
    pub hiding: bool,
    /// Items as written, e.g. `lookup`, `Map`, `Maybe(..)` or `(<|>)`.
    pub names:  Vec<String>,
}

impl ImportDecl {
    /// An unqualified, unaliased import of the whole module.
    pub fn new(module_name: impl Into<String>) -> Self {
        Self { qualified:   false,
               module_name: module_name.into(),
               alias:       None,
               import_list: None, }
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if self.qualified {
            f.write_str("qualified ")?;
        }
        f.write_str(&self.module_name)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        if let Some(list) = &self.import_list {
            if list.hiding {
                f.write_str(" hiding")?;
            }
            write!(f, " ({})", list.names.join(", "))?;
        }
        Ok(())
    }
}
