use std::fs::{self};

use evalctx::{ClassificationResult, ExtensionFlag, ExtensionSet, classify};
use walkdir::WalkDir;

/// A fenced fragment from the corpus, with the verdict it is tagged with.
struct Fragment {
    expected: ClassificationResult,
    flags:    ExtensionSet,
    code:     String,
}

#[test]
fn fragment_corpus_is_classified() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/fragments").into_iter()
                                       .filter_map(Result::ok)
                                       .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, fragment) in extract_fragments(&content).into_iter().enumerate() {
            count += 1;
            let actual = classify(fragment.flags, &fragment.code);
            assert_eq!(actual,
                       fragment.expected,
                       "Fragment {} in {:?} was misclassified:\n{}",
                       i + 1,
                       path,
                       fragment.code);
        }
    }

    assert!(count > 0, "No fragments found in tests/fragments");
}

/// Collects blocks fenced with ```` ```expression ```` or
/// ```` ```declaration ````, each optionally followed by the extensions to
/// enable, e.g. ```` ```expression LambdaCase ````.
fn extract_fragments(content: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current: Option<(ClassificationResult, ExtensionSet)> = None;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if current.is_none()
           && let Some(info) = trimmed.strip_prefix("```")
        {
            let mut words = info.split_whitespace();
            let expected = match words.next() {
                Some("expression") => ClassificationResult::IsExpression,
                Some("declaration") => ClassificationResult::IsNotExpression,
                _ => continue,
            };
            let flags = ExtensionSet::resolve(words.map(|name| {
                                                       name.parse::<ExtensionFlag>()
                                                           .unwrap_or_else(|e| panic!("{e}"))
                                                   }));
            current = Some((expected, flags));
            buf.clear();
            continue;
        }
        if let Some((expected, flags)) = current
           && trimmed.starts_with("```")
        {
            fragments.push(Fragment { expected,
                                      flags,
                                      code: buf.clone() });
            current = None;
            continue;
        }
        if current.is_some() {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    fragments
}

fn assert_expression(src: &str) {
    assert_expression_with(&[], src);
}

fn assert_expression_with(extensions: &[ExtensionFlag], src: &str) {
    let flags = ExtensionSet::resolve(extensions.iter().copied());
    if classify(flags, src) != ClassificationResult::IsExpression {
        panic!("Fragment was expected to be an expression:\n{src}");
    }
}

fn assert_not_expression(src: &str) {
    assert_not_expression_with(&[], src);
}

fn assert_not_expression_with(extensions: &[ExtensionFlag], src: &str) {
    let flags = ExtensionSet::resolve(extensions.iter().copied());
    if classify(flags, src) != ClassificationResult::IsNotExpression {
        panic!("Fragment was expected not to be an expression:\n{src}");
    }
}

#[test]
fn literals_and_names() {
    assert_expression("3");
    assert_expression("2.5e-3");
    assert_expression("0xff + 0o17 + 0b1010 + 1_000_000");
    assert_expression("'x'");
    assert_expression("\"hello \\\"world\\\"\"");
    assert_expression("Data.Map.empty");
    assert_expression("Nothing");
    assert_expression("_");
}

#[test]
fn application_and_operators() {
    assert_expression("(x+y)");
    assert_expression("f x y");
    assert_expression("negate <$> Just 1");
    assert_expression("a `div` b");
    assert_expression("-x + 1");
    assert_expression("x : xs ++ ys");
    assert_expression("length xs :: Int");
    assert_not_expression("1 +");
    assert_not_expression("a `div b");
}

#[test]
fn parenthesized_forms() {
    assert_expression("()");
    assert_expression("(+)");
    assert_expression("(-)");
    assert_expression("(+ 1)");
    assert_expression("(1 +)");
    assert_expression("(`elem` xs)");
    assert_expression("(- 1)");
    assert_expression("(1, \"one\", True)");
    assert_expression("(,,) 1 2 3");
    assert_not_expression("(1, 2");
    assert_not_expression("(`elem`)");
}

#[test]
fn lists_ranges_and_comprehensions() {
    assert_expression("[]");
    assert_expression("[1, 2, 3]");
    assert_expression("[1..]");
    assert_expression("[1, 3 .. 99]");
    assert_expression("['a'..'z']");
    assert_expression("[(x, y) | x <- [1..3], let y = x * x, even y]");
    assert_not_expression("[1, 2 | x <- xs]");
}

#[test]
fn keyword_forms() {
    assert_expression("\\x y -> x + y");
    assert_expression("let y = 2 in y * y");
    assert_expression("if x then 1 else 2");
    assert_expression("case m of { Just v -> v; Nothing -> 0 }");
    assert_expression("do { x <- getLine; putStrLn x }");
    assert_not_expression("\\ -> 1");
    assert_not_expression("if x then 1");
    assert_not_expression("let y = 2");
    assert_not_expression("do {}");
    assert_not_expression("do { x <- getLine }");
}

#[test]
fn records() {
    assert_expression("Point { px = 1, py = 2 }");
    assert_expression("p { px = 0 }");
    assert_not_expression("Point { px }");
    assert_expression_with(&[ExtensionFlag::NamedFieldPuns], "Point { px }");
    assert_not_expression("Point { .. }");
    assert_expression_with(&[ExtensionFlag::RecordWildCards], "Point { .. }");
}

#[test]
fn declarations_and_statements() {
    assert_not_expression("three=3");
    assert_not_expression("import Data.Maybe");
    assert_not_expression("x <- getLine");
    assert_not_expression("f x = x + 1");
    assert_not_expression("data Color = Red | Green");
    assert_not_expression("type Name = String");
    assert_not_expression("class Shape a where");
    assert_not_expression("print 1\nprint 2");
    assert_not_expression("1; 2");
    assert_not_expression("");
    assert_not_expression("-- only a comment");
}

#[test]
fn gated_syntax_needs_its_extension() {
    let cases = [(ExtensionFlag::LambdaCase, "\\case { 0 -> True; _ -> False }"),
                 (ExtensionFlag::MultiWayIf, "if | x > 0 -> 1 | otherwise -> 0"),
                 (ExtensionFlag::TupleSections, "map (, True) xs"),
                 (ExtensionFlag::TupleSections, "(1,,3)"),
                 (ExtensionFlag::TypeApplications, "read @Int \"42\""),
                 (ExtensionFlag::BlockArguments, "forM_ xs \\x -> print x"),
                 (ExtensionFlag::BlockArguments, "when b do { print 1 }"),
                 (ExtensionFlag::ExplicitForAll, "id :: forall a. a -> a"),
                 (ExtensionFlag::ScopedTypeVariables, "\\(n :: Int) -> n"),
                 (ExtensionFlag::BangPatterns, "let !x = 1 in x")];

    for (extension, src) in cases {
        assert_not_expression(src);
        assert_expression_with(&[extension], src);
    }
}

#[test]
fn implied_extensions_enable_gated_syntax() {
    assert_expression_with(&[ExtensionFlag::RankNTypes], "id :: forall a. a -> a");
    assert_expression_with(&[ExtensionFlag::ScopedTypeVariables], "undefined :: forall a. a");
}

#[test]
fn classification_is_deterministic() {
    let flags = ExtensionSet::resolve([ExtensionFlag::LambdaCase]);
    for src in ["map succ [1, 2]", "x = 1", "\\case { _ -> 1 }", "(("] {
        assert_eq!(classify(flags, src), classify(flags, src));
    }
}

#[test]
fn unicode_identifiers_and_text() {
    assert_expression("café 1");
    assert_expression("λ");
    assert_expression("Ärger \"naïve\"");
    assert_expression("[ 'ß', '→' ]");
}

#[test]
fn dangling_commas_are_rejected() {
    assert_not_expression("[1, 2,]");
    assert_not_expression("[1,]");
    assert_not_expression("\\(a,) -> a");
    assert_not_expression("x :: (Int, Bool,)");
}

#[test]
fn deep_nesting_is_rejected_without_crashing() {
    let depth = 10_000;
    let parens = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    assert_not_expression(&parens);

    let lists = format!("{}x{}", "[".repeat(depth), "]".repeat(depth));
    assert_not_expression(&lists);

    let negations = format!("{}x", "- ".repeat(depth));
    assert_not_expression(&negations);

    let sections = format!("{}x{}", "(+ ".repeat(depth), ")".repeat(depth));
    assert_not_expression(&sections);

    let lambdas = "\\x -> ".repeat(depth) + "x";
    assert_not_expression(&lambdas);

    let blocks = "do { ".repeat(depth) + "x" + &" }".repeat(depth);
    assert_not_expression(&blocks);
}

#[test]
fn moderate_nesting_is_still_an_expression() {
    let depth = 50;
    assert_expression(&format!("{}x{}", "(".repeat(depth), ")".repeat(depth)));
    assert_expression(&format!("{}x{}", "[".repeat(depth), "]".repeat(depth)));
}

#[test]
fn nested_let_statements_are_parsed_once() {
    let mut src = "x".to_string();
    for _ in 0..20 {
        src = format!("do {{ let a = {src} in a }}");
    }
    assert_expression(&src);
}
