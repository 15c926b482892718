use std::{fmt, str::FromStr};

use crate::error::UnknownExtension;

/// A language-feature toggle.
///
/// The vocabulary is closed: every flag the session understands is listed
/// here, and [`EXTENSIONS`] maps each one to its source-level name. Only a
/// handful of flags change what the fragment parser accepts; the rest are
/// carried through the session so the host compiler sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionFlag {
    /// `!x` in patterns.
    BangPatterns,
    /// `0b1011` literals.
    BinaryLiterals,
    /// `do`, lambdas, `case`, `if` and `let` as unparenthesized arguments.
    BlockArguments,
    /// Promotion of data constructors to the kind level.
    DataKinds,
    /// `deriving Functor`.
    DeriveFunctor,
    /// `deriving Generic`.
    DeriveGeneric,
    /// Record field disambiguation by constructor.
    DisambiguateRecordFields,
    /// `forall` in type signatures.
    ExplicitForAll,
    /// `type` namespace qualifier in import/export lists.
    ExplicitNamespaces,
    /// Interactive defaulting rules.
    ExtendedDefaultRules,
    /// Arbitrary class constraints in contexts.
    FlexibleContexts,
    /// Arbitrary instance heads.
    FlexibleInstances,
    /// Generalized algebraic data types.
    GADTs,
    /// GADT-style declaration syntax.
    GADTSyntax,
    /// `import M qualified`.
    ImportQualifiedPost,
    /// Kind annotations on type variables.
    KindSignatures,
    /// `\case` lambdas.
    LambdaCase,
    /// No generalisation of local bindings that mention outer variables.
    MonoLocalBinds,
    /// `if | guard -> expr | ...`.
    MultiWayIf,
    /// `C {field}` record puns.
    NamedFieldPuns,
    /// `1_000_000` literals.
    NumericUnderscores,
    /// List literals desugared through `IsList`.
    OverloadedLists,
    /// String literals desugared through `IsString`.
    OverloadedStrings,
    /// Kind polymorphism.
    PolyKinds,
    /// Higher-rank polymorphism.
    RankNTypes,
    /// `C {..}` record wildcards.
    RecordWildCards,
    /// Lexically scoped type variables and pattern signatures.
    ScopedTypeVariables,
    /// `(,x)` and `(x,)` tuple sections.
    TupleSections,
    /// `f @Int` visible type application.
    TypeApplications,
    /// Type families.
    TypeFamilies,
    /// Operators in types.
    TypeOperators,
    /// Type synonyms in instance heads.
    TypeSynonymInstances,
}

use ExtensionFlag::{
    BangPatterns, BinaryLiterals, BlockArguments, DataKinds, DeriveFunctor, DeriveGeneric,
    DisambiguateRecordFields, ExplicitForAll, ExplicitNamespaces, ExtendedDefaultRules,
    FlexibleContexts, FlexibleInstances, GADTSyntax, GADTs, ImportQualifiedPost, KindSignatures,
    LambdaCase, MonoLocalBinds, MultiWayIf, NamedFieldPuns, NumericUnderscores, OverloadedLists,
    OverloadedStrings, PolyKinds, RankNTypes, RecordWildCards, ScopedTypeVariables, TupleSections,
    TypeApplications, TypeFamilies, TypeOperators, TypeSynonymInstances,
};

/// Name table for every [`ExtensionFlag`], in declaration order.
pub const EXTENSIONS: &[(&str, ExtensionFlag)] = &[("BangPatterns", BangPatterns),
                                                    ("BinaryLiterals", BinaryLiterals),
                                                    ("BlockArguments", BlockArguments),
                                                    ("DataKinds", DataKinds),
                                                    ("DeriveFunctor", DeriveFunctor),
                                                    ("DeriveGeneric", DeriveGeneric),
                                                    ("DisambiguateRecordFields",
                                                     DisambiguateRecordFields),
                                                    ("ExplicitForAll", ExplicitForAll),
                                                    ("ExplicitNamespaces", ExplicitNamespaces),
                                                    ("ExtendedDefaultRules",
                                                     ExtendedDefaultRules),
                                                    ("FlexibleContexts", FlexibleContexts),
                                                    ("FlexibleInstances", FlexibleInstances),
                                                    ("GADTs", GADTs),
                                                    ("GADTSyntax", GADTSyntax),
                                                    ("ImportQualifiedPost", ImportQualifiedPost),
                                                    ("KindSignatures", KindSignatures),
                                                    ("LambdaCase", LambdaCase),
                                                    ("MonoLocalBinds", MonoLocalBinds),
                                                    ("MultiWayIf", MultiWayIf),
                                                    ("NamedFieldPuns", NamedFieldPuns),
                                                    ("NumericUnderscores", NumericUnderscores),
                                                    ("OverloadedLists", OverloadedLists),
                                                    ("OverloadedStrings", OverloadedStrings),
                                                    ("PolyKinds", PolyKinds),
                                                    ("RankNTypes", RankNTypes),
                                                    ("RecordWildCards", RecordWildCards),
                                                    ("ScopedTypeVariables", ScopedTypeVariables),
                                                    ("TupleSections", TupleSections),
                                                    ("TypeApplications", TypeApplications),
                                                    ("TypeFamilies", TypeFamilies),
                                                    ("TypeOperators", TypeOperators),
                                                    ("TypeSynonymInstances",
                                                     TypeSynonymInstances)];

/// Flags switched on implicitly whenever the key flag is enabled.
const IMPLICATIONS: &[(ExtensionFlag, &[ExtensionFlag])] =
    &[(FlexibleInstances, &[TypeSynonymInstances]),
      (GADTs, &[GADTSyntax, MonoLocalBinds]),
      (PolyKinds, &[KindSignatures]),
      (RankNTypes, &[ExplicitForAll]),
      (RecordWildCards, &[DisambiguateRecordFields]),
      (ScopedTypeVariables, &[ExplicitForAll]),
      (TypeFamilies, &[ExplicitNamespaces, KindSignatures, MonoLocalBinds]),
      (TypeOperators, &[ExplicitNamespaces])];

impl ExtensionFlag {
    /// Returns the source-level name of the flag, e.g. `"LambdaCase"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        EXTENSIONS[self as usize].0
    }

    /// Returns the flags this one switches on implicitly.
    #[must_use]
    pub fn implied(self) -> &'static [Self] {
        IMPLICATIONS.iter()
                    .find(|(flag, _)| *flag == self)
                    .map_or(&[], |(_, implied)| implied)
    }

    /// Iterates over the whole vocabulary in canonical order.
    pub fn all() -> impl Iterator<Item = Self> {
        EXTENSIONS.iter().map(|(_, flag)| *flag)
    }

    const fn bit(self) -> u64 {
        1 << self as u32
    }
}

impl fmt::Display for ExtensionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtensionFlag {
    type Err = UnknownExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EXTENSIONS.iter()
                  .find(|(name, _)| *name == s)
                  .map(|(_, flag)| *flag)
                  .ok_or_else(|| UnknownExtension(s.to_string()))
    }
}

/// A set of extension flags, iterated in canonical declaration order.
///
/// This is what the parser consults: a cheap `Copy` value that can be handed
/// to every grammar rule without borrowing the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExtensionSet(u64);

impl ExtensionSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds the set of flags in effect for `enabled`: every enabled flag
    /// plus everything it implies, transitively.
    ///
    /// # Example
    /// ```
    /// use evalctx::session::extension::{ExtensionFlag, ExtensionSet};
    ///
    /// let flags = ExtensionSet::resolve([ExtensionFlag::RankNTypes]);
    /// assert!(flags.contains(ExtensionFlag::ExplicitForAll));
    /// ```
    pub fn resolve(enabled: impl IntoIterator<Item = ExtensionFlag>) -> Self {
        let mut set = enabled.into_iter().collect::<Self>();
        loop {
            let closed = set.iter()
                            .flat_map(ExtensionFlag::implied)
                            .fold(set, |acc, flag| acc.with(*flag));
            if closed == set {
                return set;
            }
            set = closed;
        }
    }

    /// Returns a copy of the set with `flag` added.
    #[must_use]
    pub const fn with(self, flag: ExtensionFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    #[must_use]
    pub const fn contains(self, flag: ExtensionFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Iterates over the members in canonical declaration order.
    pub fn iter(self) -> impl Iterator<Item = ExtensionFlag> {
        ExtensionFlag::all().filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<ExtensionFlag> for ExtensionSet {
    fn from_iter<T: IntoIterator<Item = ExtensionFlag>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
