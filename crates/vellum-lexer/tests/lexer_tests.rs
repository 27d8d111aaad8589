use vellum_common::SyntaxKind;
use vellum_lexer::{Lexer, SyntaxMode};

/// Lex the whole text, returning kinds and token texts.
fn lex(text: &str, mode: SyntaxMode) -> Vec<(SyntaxKind, String)> {
    let mut lexer = Lexer::new(text, mode);
    let mut tokens = vec![];
    loop {
        let (kind, node) = lexer.next();
        if kind == SyntaxKind::End {
            break;
        }
        tokens.push((kind, node.into_text()));
    }
    tokens
}

/// Lex the whole text, returning only the kinds.
fn kinds(text: &str, mode: SyntaxMode) -> Vec<SyntaxKind> {
    lex(text, mode).into_iter().map(|(kind, _)| kind).collect()
}

/// Assert that concatenating all token texts reproduces the input.
#[track_caller]
fn assert_lossless(text: &str, mode: SyntaxMode) {
    let joined: String =
        lex(text, mode).into_iter().map(|(_, text)| text).collect();
    assert_eq!(joined, text, "lexing must preserve the input bytes");
}

// ── Shared rules ────────────────────────────────────────────────────────

#[test]
fn comments_and_spaces() {
    use SyntaxKind::*;
    assert_eq!(
        kinds("a /* b */ c", SyntaxMode::Markup),
        vec![Text, Space, BlockComment, Space, Text],
    );
    assert_eq!(
        kinds("x // note\ny", SyntaxMode::Markup),
        vec![Text, Space, LineComment, Space, Text],
    );
    assert_lossless("a /* b */ c", SyntaxMode::Markup);
}

#[test]
fn nested_block_comments() {
    use SyntaxKind::*;
    assert_eq!(
        kinds("/* a /* b */ c */d", SyntaxMode::Markup),
        vec![BlockComment, Text],
    );
}

#[test]
fn stray_comment_end_is_an_error() {
    let tokens = lex("*/", SyntaxMode::Code);
    assert_eq!(tokens[0].0, SyntaxKind::Error);
}

#[test]
fn shebang_only_at_the_start() {
    use SyntaxKind::*;
    assert_eq!(kinds("#!/bin/v\nx", SyntaxMode::Markup), vec![Shebang, Space, Text]);
    // Not at offset zero: an ordinary hash.
    assert_eq!(kinds(" #!x", SyntaxMode::Markup)[1], Hash);
}

#[test]
fn parbreak_needs_two_newlines() {
    use SyntaxKind::*;
    assert_eq!(kinds("a\nb", SyntaxMode::Markup), vec![Text, Space, Text]);
    assert_eq!(kinds("a\n\nb", SyntaxMode::Markup), vec![Text, Parbreak, Text]);
    assert_eq!(kinds("a\r\n\r\nb", SyntaxMode::Markup), vec![Text, Parbreak, Text]);
    // In code mode there are no paragraph breaks.
    assert_eq!(kinds("a\n\nb", SyntaxMode::Code), vec![Ident, Space, Ident]);
}

// ── Markup ──────────────────────────────────────────────────────────────

#[test]
fn markers_at_line_starts() {
    use SyntaxKind::*;
    assert_eq!(
        kinds("= Heading", SyntaxMode::Markup),
        vec![HeadingMarker, Space, Text],
    );
    assert_eq!(kinds("===x", SyntaxMode::Markup), vec![Text]);
    assert_eq!(kinds("- item", SyntaxMode::Markup)[0], ListMarker);
    assert_eq!(kinds("+ item", SyntaxMode::Markup)[0], EnumMarker);
    assert_eq!(kinds("3. item", SyntaxMode::Markup)[0], EnumMarker);
    assert_eq!(kinds("/ term: x", SyntaxMode::Markup)[0], TermMarker);
}

#[test]
fn emphasis_delimiters_respect_words() {
    use SyntaxKind::*;
    assert_eq!(kinds("*strong*", SyntaxMode::Markup), vec![Star, Text, Star]);
    // Inside a word, a star is just text.
    assert_eq!(
        lex("intra*word", SyntaxMode::Markup),
        vec![(Text, "intra".into()), (Text, "*word".into())],
    );
    assert_eq!(kinds("_emph_", SyntaxMode::Markup), vec![Underscore, Text, Underscore]);
    assert_eq!(
        lex("snake_case", SyntaxMode::Markup),
        vec![(Text, "snake".into()), (Text, "_case".into())],
    );
}

#[test]
fn shorthands() {
    use SyntaxKind::*;
    for text in ["~", "--", "---", "...", "-?", "-3"] {
        let tokens = lex(text, SyntaxMode::Markup);
        assert_eq!(tokens[0].0, Shorthand, "{text:?} should start a shorthand");
    }
    // Shorthands are a markup concept.
    assert!(!kinds("--", SyntaxMode::Code).contains(&Shorthand));
}

#[test]
fn escapes_and_linebreaks() {
    use SyntaxKind::*;
    assert_eq!(kinds(r"\#", SyntaxMode::Markup), vec![Escape]);
    assert_eq!(kinds(r"\u{1F600}", SyntaxMode::Markup), vec![Escape]);
    assert_eq!(kinds("\\\nx", SyntaxMode::Markup), vec![Linebreak, Space, Text]);

    let tokens = lex(r"\u{FFFFFF}", SyntaxMode::Markup);
    assert_eq!(tokens[0].0, Error);
    let tokens = lex(r"\u{D800}", SyntaxMode::Markup);
    assert_eq!(tokens[0].0, Error, "surrogates are not valid escapes");
    let tokens = lex(r"\u{41", SyntaxMode::Markup);
    assert_eq!(tokens[0].0, Error);
}

#[test]
fn links() {
    use SyntaxKind::*;
    let tokens = lex("see https://vellum.dev/docs, ok", SyntaxMode::Markup);
    let link = tokens.iter().find(|(k, _)| *k == Link).unwrap();
    assert_eq!(link.1, "https://vellum.dev/docs");

    // Balanced brackets belong to the link, trailing punctuation does not.
    let tokens = lex("https://x.y/(a)!", SyntaxMode::Markup);
    assert_eq!(tokens[0], (Link, "https://x.y/(a)".into()));

    // Unbalanced brackets are an error.
    let tokens = lex("https://x.y/(a", SyntaxMode::Markup);
    assert_eq!(tokens[0].0, Error);
}

#[test]
fn labels_and_refs() {
    use SyntaxKind::*;
    assert_eq!(kinds("<intro>", SyntaxMode::Markup), vec![Label]);
    assert_eq!(kinds("<sec:1.2>", SyntaxMode::Markup), vec![Label]);
    assert_eq!(lex("<intro", SyntaxMode::Markup)[0].0, Error);
    assert_eq!(lex("<>", SyntaxMode::Markup)[0].0, Text);

    let tokens = lex("@intro.", SyntaxMode::Markup);
    assert_eq!(tokens[0], (RefMarker, "@intro".into()));
    assert_eq!(tokens[1].0, Text);
}

#[test]
fn smart_quotes() {
    use SyntaxKind::*;
    assert_eq!(
        kinds("'x'", SyntaxMode::Markup),
        vec![SmartQuote, Text, SmartQuote],
    );
    assert_eq!(kinds("\"x\"", SyntaxMode::Markup)[0], SmartQuote);
}

// ── Raw ─────────────────────────────────────────────────────────────────

#[test]
fn inline_raw() {
    let tokens = lex("`code`", SyntaxMode::Markup);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0], (SyntaxKind::Raw, "`code`".into()));
}

#[test]
fn empty_raw() {
    let tokens = lex("``", SyntaxMode::Markup);
    assert_eq!(tokens[0], (SyntaxKind::Raw, "``".into()));
}

#[test]
fn blocky_raw_with_language_tag() {
    let text = "```rust\nfn main() {}\n```";
    let tokens = lex(text, SyntaxMode::Markup);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, SyntaxKind::Raw);
    assert_eq!(tokens[0].1, text, "raw must be lossless");

    // The language tag is a child of the raw node.
    let mut lexer = Lexer::new(text, SyntaxMode::Markup);
    let (_, node) = lexer.next();
    let lang = node.cast_first(SyntaxKind::RawLang).unwrap();
    assert_eq!(lang.text(), "rust");
}

#[test]
fn blocky_raw_dedent() {
    // Two spaces of common indentation are trimmed.
    let text = "```\n  one\n   two\n  ```";
    let mut lexer = Lexer::new(text, SyntaxMode::Markup);
    let (_, node) = lexer.next();
    let texts: Vec<_> = node
        .cast_all(SyntaxKind::Text)
        .map(|n| n.text().to_string())
        .collect();
    assert_eq!(texts, vec!["one", " two"]);
    assert_eq!(node.into_text(), text);
}

#[test]
fn unclosed_raw_is_an_error() {
    let tokens = lex("`code", SyntaxMode::Markup);
    assert_eq!(tokens[0].0, SyntaxKind::Error);
    assert_eq!(tokens[0].1, "`code");
}

// ── Math ────────────────────────────────────────────────────────────────

#[test]
fn math_idents_and_fields() {
    use SyntaxKind::*;
    assert_eq!(kinds("pi", SyntaxMode::Math), vec![MathIdent]);
    // Single letters are math text, not identifiers.
    assert_eq!(kinds("x", SyntaxMode::Math), vec![MathText]);
    // A dotted chain lexes as one field access node.
    let tokens = lex("arrow.r.squiggly", SyntaxMode::Math);
    assert_eq!(tokens, vec![(FieldAccess, "arrow.r.squiggly".into())]);
}

#[test]
fn math_numbers_group_digits() {
    use SyntaxKind::*;
    assert_eq!(lex("12.5", SyntaxMode::Math), vec![(MathText, "12.5".into())]);
    let tokens = lex("1+2", SyntaxMode::Math);
    assert_eq!(
        tokens,
        vec![
            (MathText, "1".into()),
            (MathText, "+".into()),
            (MathText, "2".into()),
        ],
    );
}

#[test]
fn math_operators_and_shorthands() {
    use SyntaxKind::*;
    assert_eq!(kinds("a^b", SyntaxMode::Math), vec![MathText, Hat, MathText]);
    assert_eq!(kinds("a_b", SyntaxMode::Math), vec![MathText, Underscore, MathText]);
    assert_eq!(kinds("a/b", SyntaxMode::Math), vec![MathText, Slash, MathText]);
    assert_eq!(kinds("&", SyntaxMode::Math), vec![MathAlignPoint]);
    assert_eq!(kinds("f'''", SyntaxMode::Math), vec![MathText, MathPrimes]);
    assert_eq!(kinds("√", SyntaxMode::Math), vec![Root]);

    for text in ["->", "|->", "=>", "<==>", "~~", "|=", ":=", "::="] {
        assert_eq!(
            kinds(text, SyntaxMode::Math),
            vec![MathShorthand],
            "{text:?} should be a math shorthand",
        );
    }

    // Math shorthands exist only in math mode.
    assert!(!kinds("->", SyntaxMode::Code).contains(&MathShorthand));
    assert!(!kinds("->", SyntaxMode::Markup).contains(&MathShorthand));
}

#[test]
fn math_delimiters_follow_unicode_class() {
    use SyntaxKind::*;
    assert_eq!(kinds("(x)", SyntaxMode::Math), vec![LeftParen, MathText, RightParen]);
    assert_eq!(kinds("[x]", SyntaxMode::Math), vec![LeftBrace, MathText, RightBrace]);
    assert_eq!(kinds("⟨x⟩", SyntaxMode::Math), vec![LeftBrace, MathText, RightBrace]);
    assert_eq!(kinds("[|x|]", SyntaxMode::Math), vec![LeftBrace, MathText, RightBrace]);
}

// ── Code ────────────────────────────────────────────────────────────────

#[test]
fn keywords_and_idents() {
    use SyntaxKind::*;
    assert_eq!(kinds("let", SyntaxMode::Code), vec![Let]);
    assert_eq!(kinds("letter", SyntaxMode::Code), vec![Ident]);
    assert_eq!(kinds("true false", SyntaxMode::Code), vec![Bool, Space, Bool]);
    assert_eq!(kinds("none auto", SyntaxMode::Code), vec![None, Space, Auto]);
    assert_eq!(kinds("_", SyntaxMode::Code), vec![Underscore]);

    // After a dot, a keyword is a method or field name.
    assert_eq!(kinds("x.in", SyntaxMode::Code), vec![Ident, Dot, Ident]);
    // After a spread, it stays a keyword.
    assert_eq!(kinds("..in", SyntaxMode::Code), vec![Dots, In]);
}

#[test]
fn numbers() {
    use SyntaxKind::*;
    assert_eq!(kinds("120", SyntaxMode::Code), vec![Int]);
    assert_eq!(kinds("1.2", SyntaxMode::Code), vec![Float]);
    assert_eq!(kinds(".5", SyntaxMode::Code), vec![Float]);
    assert_eq!(kinds("10e-4", SyntaxMode::Code), vec![Float]);
    assert_eq!(kinds("0b1010", SyntaxMode::Code), vec![Int]);
    assert_eq!(kinds("0o777", SyntaxMode::Code), vec![Int]);
    assert_eq!(kinds("0xff", SyntaxMode::Code), vec![Int]);
    for text in ["12pt", "3mm", "4cm", "5in", "90deg", "3rad", "2em", "1fr", "50%"] {
        assert_eq!(kinds(text, SyntaxMode::Code), vec![Numeric], "{text:?}");
    }
    // `1em` must not eat `e` as an exponent.
    assert_eq!(kinds("1em", SyntaxMode::Code), vec![Numeric]);
    // A dot followed by an identifier is a method call, not a decimal.
    assert_eq!(kinds("1.pt", SyntaxMode::Code), vec![Int, Dot, Ident]);
    // A spread after a number is not a decimal point.
    assert_eq!(kinds("1..2", SyntaxMode::Code), vec![Int, Dots, Int]);
}

#[test]
fn invalid_numbers() {
    use SyntaxKind::*;
    assert_eq!(kinds("1.2e", SyntaxMode::Code), vec![Error]);
    assert_eq!(kinds("12parsec", SyntaxMode::Code), vec![Error]);
    assert_eq!(kinds("0x123z", SyntaxMode::Code), vec![Error]);

    // A based number with a unit suffix: error with a decimal hint.
    let mut lexer = Lexer::new("0b11pt", SyntaxMode::Code);
    let (kind, node) = lexer.next();
    assert_eq!(kind, Error);
    let errors = node.errors();
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].hints.iter().any(|hint| hint.contains("3pt")),
        "expected a decimal hint on {errors:?}",
    );
}

#[test]
fn strings() {
    use SyntaxKind::*;
    assert_eq!(kinds(r#""hello""#, SyntaxMode::Code), vec![Str]);
    assert_eq!(kinds(r#""a \" b""#, SyntaxMode::Code), vec![Str]);
    assert_eq!(kinds(r#""open"#, SyntaxMode::Code), vec![Error]);
}

#[test]
fn operators_use_maximal_munch() {
    use SyntaxKind::*;
    assert_eq!(kinds("==", SyntaxMode::Code), vec![EqEq]);
    assert_eq!(kinds("!=", SyntaxMode::Code), vec![ExclEq]);
    assert_eq!(kinds("<=", SyntaxMode::Code), vec![LtEq]);
    assert_eq!(kinds(">=", SyntaxMode::Code), vec![GtEq]);
    assert_eq!(kinds("+=", SyntaxMode::Code), vec![PlusEq]);
    assert_eq!(kinds("-=", SyntaxMode::Code), vec![HyphEq]);
    assert_eq!(kinds("*=", SyntaxMode::Code), vec![StarEq]);
    assert_eq!(kinds("/=", SyntaxMode::Code), vec![SlashEq]);
    assert_eq!(kinds("=>", SyntaxMode::Code), vec![Arrow]);
    assert_eq!(kinds("= =", SyntaxMode::Code), vec![Eq, Space, Eq]);
}

#[test]
fn disallowed_character_in_code() {
    assert_eq!(kinds("§", SyntaxMode::Code), vec![SyntaxKind::Error]);
}

// ── Properties ──────────────────────────────────────────────────────────

#[test]
fn lexing_is_lossless() {
    let corpus = [
        "Hello *world*, _nice_ to `see` you!",
        "= A heading\n- one\n- two\n\n3. three",
        "x /* multi\nline */ y // trailing",
        "A \\u{1F600} escape and a ~ shorthand --- dashes",
        "Link to https://vellum.dev/(docs)! <label> @ref",
        "```rust\n  fn x() {}\n```",
        "#let f(x) = x + 1; #f(2)",
    ];
    for text in corpus {
        assert_lossless(text, SyntaxMode::Markup);
    }

    assert_lossless("let x = 3.5em + f(a, ..b)", SyntaxMode::Code);
    assert_lossless("(a + b)/2 = sum_(i=0)^n x_i", SyntaxMode::Math);
}

#[test]
fn markup_tokens_relex_to_themselves() {
    let text = "Hello *world* = not a heading\n- item `raw` @ref <lab> $x$";
    for (kind, token_text) in lex(text, SyntaxMode::Markup) {
        if token_text.is_empty() {
            continue;
        }
        let again = lex(&token_text, SyntaxMode::Markup);
        assert_eq!(again.len(), 1, "{token_text:?} should relex to one token");
        assert_eq!(again[0].0, kind, "{token_text:?} should keep its kind");
    }
}

#[test]
fn token_shapes() {
    // The space joins the preceding text run, so the link is second.
    let tokens = lex("see https://vellum.dev now", SyntaxMode::Markup);
    insta::assert_snapshot!(
        format!("{:?} {:?}", tokens[1].0, tokens[1].1),
        @r#"Link "https://vellum.dev""#,
    );

    let tokens = lex("12pt", SyntaxMode::Code);
    insta::assert_snapshot!(
        format!("{:?} {:?}", tokens[0].0, tokens[0].1),
        @r#"Numeric "12pt""#,
    );
}

#[test]
fn newline_flag_tracks_trivia() {
    let mut lexer = Lexer::new("a\nb", SyntaxMode::Markup);
    let _ = lexer.next(); // a
    assert!(!lexer.newline());
    let _ = lexer.next(); // space with newline
    assert!(lexer.newline());
    let _ = lexer.next(); // b
    assert!(!lexer.newline());
}

#[test]
fn column_counts_chars_from_line_start() {
    let lexer = Lexer::new("ab\n  cd", SyntaxMode::Markup);
    assert_eq!(lexer.column(2), 2);
    assert_eq!(lexer.column(3), 0);
    assert_eq!(lexer.column(5), 2);
    assert_eq!(lexer.column(7), 4);
}
