use vellum_parser::{parse, LinkedNode, Source, Span, SyntaxNode};

/// Apply an edit through `Source::edit` and check that the result matches
/// a from-scratch parse in structure and text. Returns the affected range.
#[track_caller]
fn edit_and_check(text: &str, start: usize, end: usize, with: &str) -> (usize, usize) {
    let mut source = Source::detached(text.to_string());
    let affected = source.edit(start, end, with);

    let mut expected = String::from(text);
    expected.replace_range(start..end, with);

    assert_eq!(source.text(), expected);
    assert_eq!(source.root().into_text(), expected, "tree must stay lossless");

    let fresh = parse(&expected);
    assert!(
        source.root().spanless_eq(&fresh),
        "reparse diverged from a full parse\n\
         text: {expected:?}\nincremental: {:#?}\nfresh: {fresh:#?}",
        source.root(),
    );

    check_spans(source.root());
    assert!(affected.0 <= affected.1);
    assert!(affected.1 <= source.len());
    affected
}

/// All spans must be unique, attached, and ordered after any edit.
#[track_caller]
fn check_spans(root: &SyntaxNode) {
    let mut numbers = vec![];
    collect(root, &mut numbers);
    let mut sorted = numbers.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(numbers, sorted, "spans must stay unique and ordered");

    fn collect(node: &SyntaxNode, numbers: &mut Vec<u64>) {
        assert!(!node.span().is_detached(), "nodes must stay numbered");
        assert!(Span::FULL.contains(&node.span().number()));
        numbers.push(node.span().number());
        for child in node.children() {
            collect(child, numbers);
        }
    }
}

// ── End-to-end scenarios ────────────────────────────────────────────────

#[test]
fn scenario_reparse_inside_code_block() {
    let text = "Hello #{ x + 1 }!";
    let affected = edit_and_check(text, 9, 10, "abc");
    // The block is `{ abc + 1 }` at 7..18 in the new text; the reparse
    // stays within it instead of covering the whole file.
    assert_eq!(affected, (7, 18));
}

#[test]
fn scenario_full_reparse_on_ambiguous_edit() {
    let text = "https:/world";
    let affected = edit_and_check(text, 7, 7, "/");
    // Link recognition requires lookahead from offset zero, so everything
    // is reparsed.
    assert_eq!(affected, (0, "https://world".len()));
}

// ── Incrementality ──────────────────────────────────────────────────────

#[test]
fn markup_edit_reparses_a_proper_subrange() {
    let text = "aaa bbb ccc";
    let affected = edit_and_check(text, 4, 7, "xyz");
    assert!(
        affected != (0, "aaa xyz ccc".len()),
        "expected a surgical reparse, got the full range",
    );
}

#[test]
fn spans_outside_the_affected_range_are_stable() {
    let text = "stable #{ x + 1 } tail";
    let mut source = Source::detached(text.to_string());

    // Remember the span of the leading text leaf.
    let root = LinkedNode::new(source.root());
    let leaf = root.leftmost_leaf().unwrap();
    assert_eq!(leaf.get().text(), "stable");
    let span = leaf.get().span();
    let range = leaf.range();

    let (start, _) = source.edit(10, 11, "yy");
    assert!(start > range.end, "the edit must not touch the leading text");

    // The same span still resolves to the same leaf.
    let found = source.find(span).expect("span must survive the edit");
    assert_eq!(found.get().text(), "stable");
    assert_eq!(found.range(), range);
}

#[test]
fn code_block_edit_stays_inside_the_block() {
    let text = "before #{ let a = 1; a } after";
    let affected = edit_and_check(text, 14, 15, "b");
    let new_len = text.len();
    assert!(affected.0 >= 7, "affected {affected:?}");
    assert!(affected.1 <= new_len, "affected {affected:?}");
    assert!(affected != (0, new_len), "expected a surgical reparse");
}

#[test]
fn content_block_edit_stays_inside_the_block() {
    let text = "#box[inner text] outer";
    let affected = edit_and_check(text, 6, 11, "other");
    assert!(affected != (0, text.len()), "expected a surgical reparse");
}

// ── Equivalence over a corpus of edits ──────────────────────────────────

#[test]
fn insertions_and_deletions_match_full_parses() {
    // (text, start, end, replacement)
    let cases: &[(&str, usize, usize, &str)] = &[
        // Plain text edits.
        ("hello world", 0, 0, "say "),
        ("hello world", 5, 6, ""),
        ("hello world", 11, 11, "!"),
        // Structure-changing edits.
        ("plain text here", 6, 6, "*"),
        ("some *strong* text", 5, 6, ""),
        ("= heading\nbody", 2, 2, "= "),
        ("a b c", 2, 3, "\n- "),
        ("text", 0, 4, ""),
        ("", 0, 0, "#let x = 1"),
        // Bracket balance changes.
        ("a [b] c", 2, 3, ""),
        ("a b c", 2, 2, "["),
        // Inside raw text.
        ("`code` x", 1, 5, "other"),
        ("```\nfence\n``` y", 4, 9, "text"),
        // Inside an equation.
        ("$x + y$ z", 1, 2, "a^2"),
        // Inside code.
        ("#{ 1 + 2 }", 3, 4, "9"),
        ("#f(a, b)", 3, 4, "c"),
        ("#let x = 1\ny", 9, 10, "2"),
        // Newline-sensitive edits.
        ("- item\n  cont\n- next", 9, 9, "xx"),
        ("a\n\nb", 1, 3, " "),
        ("a b", 1, 2, "\r\n\r\n"),
        // Edits that merge tokens.
        ("ab cd", 2, 3, ""),
        ("12 34", 2, 3, ""),
    ];

    for &(text, start, end, with) in cases {
        edit_and_check(text, start, end, with);
    }
}

#[test]
fn sequential_edits_stay_consistent() {
    let mut source = Source::detached("= Title\n\nSome *text* with $m^2$.".to_string());

    let edits: &[(usize, usize, &str)] = &[
        (2, 7, "Heading"),
        (10, 10, "More "),
        (0, 0, "#set page(width: 10cm)\n"),
        (24, 24, "= "),
    ];

    for &(start, end, with) in edits {
        let mut expected = source.text().to_string();
        expected.replace_range(start..end, with);
        source.edit(start, end, with);
        assert_eq!(source.text(), expected);
        assert_eq!(source.root().into_text(), expected);
        assert!(
            source.root().spanless_eq(&parse(&expected)),
            "diverged after edit {start}..{end} -> {with:?}",
        );
        check_spans(source.root());
    }
}

#[test]
fn replace_matches_a_full_parse() {
    let mut source = Source::detached("one *two* three".to_string());
    source.replace("one *2* three");
    assert_eq!(source.text(), "one *2* three");
    assert!(source.root().spanless_eq(&parse("one *2* three")));
    check_spans(source.root());
}

#[test]
fn many_small_edits_inside_a_block_keep_numbering_space() {
    // Repeated splices into the same block must keep finding numbering
    // gaps, falling back to wider renumbering when one is exhausted.
    let mut source = Source::detached("head #{ a } tail".to_string());
    for i in 0..40 {
        let insert = format!(" + {i}");
        let offset = source.text().find('}').unwrap();
        source.edit(offset - 1, offset - 1, &insert);
        assert_eq!(source.root().into_text(), source.text());
        check_spans(source.root());
    }
    assert!(source.root().spanless_eq(&parse(source.text())));
}
