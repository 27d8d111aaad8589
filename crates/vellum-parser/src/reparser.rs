//! Incremental reparsing.
//!
//! After an edit, the old tree is refreshed with as little parsing as
//! possible. Two surgical strategies are tried before falling back to a
//! full parse:
//!
//! 1. Descend to the narrowest child that strictly contains the edit and
//!    reparse that child if it is a code or content block.
//! 2. Inside top-level or content-block markup, reparse a contiguous run
//!    of children around the edit, simulating the parser's line-start and
//!    bracket-nesting state at both edges of the run.
//!
//! Both strategies only accept a result that consumed exactly the
//! expected range, stayed balanced, and leaves the simulated state of the
//! following siblings unchanged, so splicing keeps the tree identical to
//! what a full parse would produce. Spliced nodes are renumbered into the
//! numeric gap the old ones held; when the gap is too narrow the strategy
//! is abandoned.

use std::ops::Range;

use vellum_common::{is_newline, Span, SyntaxKind, SyntaxNode};

use crate::parser::{parse, reparse_block, reparse_markup};

/// Refreshes the syntax tree for the new text, returning the range in the
/// new text that was reparsed.
pub fn reparse(
    root: &mut SyntaxNode,
    text: &str,
    replaced: Range<usize>,
    replacement_len: usize,
) -> Range<usize> {
    try_reparse(text, replaced, replacement_len, None, root, 0).unwrap_or_else(|| {
        let id = root.span().id();
        *root = parse(text);
        if let Some(id) = id {
            root.numberize(id, Span::FULL)
                .expect("full span range can number any tree");
        }
        0..text.len()
    })
}

/// Tries to reparse inside the given node.
fn try_reparse(
    text: &str,
    replaced: Range<usize>,
    replacement_len: usize,
    parent_kind: Option<SyntaxKind>,
    node: &mut SyntaxNode,
    offset: usize,
) -> Option<Range<usize>> {
    let node_kind = node.kind();

    // The range of children that overlap with the edit.
    let mut overlap = usize::MAX..0;
    let mut cursor = offset;

    for i in 0..node.children().len() {
        let child = node.children().nth(i).expect("child index is in bounds");
        let prev_len = child.len();
        let prev_descendants = child.descendants();
        let prev_range = cursor..cursor + prev_len;
        let is_inner = child.children().len() > 0;
        let is_block = child.kind().is_block();

        // If the child strictly contains the edit, try to solve the edit
        // within it, adjusting the accounting on the way back out.
        if is_inner && includes(&prev_range, &replaced) {
            let new_len = prev_len + replacement_len - replaced.len();
            let new_range = cursor..cursor + new_len;

            if let Some(range) = try_reparse(
                text,
                replaced.clone(),
                replacement_len,
                Some(node_kind),
                &mut node.children_mut()[i],
                cursor,
            ) {
                let new_descendants = node.children_mut()[i].descendants();
                debug_assert_eq!(node.children_mut()[i].len(), new_len);
                node.update_parent(prev_len, new_len, prev_descendants, new_descendants);
                return Some(range);
            }

            // The edit wasn't solved deeper down; if the child is a block,
            // reparse exactly its new range.
            if is_block {
                if let Some(newborn) = reparse_block(text, new_range.clone()) {
                    if !newborn.erroneous() {
                        return node
                            .replace_children(i..i + 1, vec![newborn])
                            .is_ok()
                            .then_some(new_range);
                    }
                }
            }
        }

        // Track which children overlap with the edit at all.
        if overlaps(&prev_range, &replaced) {
            overlap.start = overlap.start.min(i);
            overlap.end = i + 1;
        } else if replaced.end < cursor {
            break;
        }

        cursor += prev_len;
    }

    // Try to reparse a run of markup expressions. Only top-level markup
    // and content-block markup qualify; inside headings or list items the
    // line starts and indentation make boundaries too fragile.
    if overlap.start < overlap.end
        && node_kind == SyntaxKind::Markup
        && matches!(parent_kind, None | Some(SyntaxKind::ContentBlock))
    {
        return try_reparse_markup(
            text,
            replaced,
            replacement_len,
            parent_kind,
            node,
            offset,
            overlap,
        );
    }

    None
}

/// Tries to reparse a contiguous run of markup children around the edit,
/// expanding the run exponentially until a self-contained region parses.
#[allow(clippy::too_many_arguments)]
fn try_reparse_markup(
    text: &str,
    replaced: Range<usize>,
    replacement_len: usize,
    parent_kind: Option<SyntaxKind>,
    node: &mut SyntaxNode,
    offset: usize,
    overlap: Range<usize>,
) -> Option<Range<usize>> {
    let mut expansion = 1;
    loop {
        let children: Vec<SyntaxNode> = node.children().cloned().collect();
        let mut start = overlap.start.saturating_sub(expansion.max(2));
        let mut end = (overlap.end + expansion).min(children.len());

        // Expand sideways over nodes that may cross markup-expression
        // boundaries.
        while start > 0 && expand(&children[start]) {
            start -= 1;
        }
        while end < children.len() && expand(&children[end]) {
            end += 1;
        }

        // Pull in a preceding hash so an embedded expression reparses
        // whole.
        if start > 0 && children[start - 1].kind() == SyntaxKind::Hash {
            start -= 1;
        }

        // Simulate what the parser's line-start and nesting state would be
        // at the left edge of the run, by folding over all preceding
        // children without reparsing them.
        let mut prefix_len = 0;
        let mut at_start = true;
        let mut nesting = 0;
        for child in &children[..start] {
            prefix_len += child.len();
            next_at_start(child, &mut at_start);
            next_nesting(child, &mut nesting);
        }

        // Also simulate the state right after the run as it was before the
        // edit; a successful reparse must reproduce it, otherwise the
        // siblings after the splice would parse differently.
        let mut prev_at_start_after = at_start;
        let mut prev_nesting_after = nesting;
        for child in &children[start..end] {
            next_at_start(child, &mut prev_at_start_after);
            next_nesting(child, &mut prev_nesting_after);
        }

        let shifted = offset + prefix_len;
        let run_len: usize = children[start..end].iter().map(SyntaxNode::len).sum();
        let new_end = shifted + run_len + replacement_len - replaced.len();

        if let Some(newborns) = reparse_markup(
            text,
            shifted,
            new_end,
            &mut at_start,
            &mut nesting,
            parent_kind.is_none(),
        ) {
            let fits = end == children.len()
                || (at_start == prev_at_start_after && nesting == prev_nesting_after);
            if fits {
                return node
                    .replace_children(start..end, newborns)
                    .is_ok()
                    .then_some(shifted..new_end);
            }
        }

        // Everything was included and it still didn't work out.
        if start == 0 && end == children.len() {
            return None;
        }

        expansion *= 2;
    }
}

/// Whether the outer range strictly contains the inner one.
fn includes(outer: &Range<usize>, inner: &Range<usize>) -> bool {
    outer.start < inner.start && inner.end < outer.end
}

/// Whether the two ranges overlap or touch.
fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Whether a node may be absorbed into an expanded reparse range because
/// it can cross markup-expression boundaries.
fn expand(node: &SyntaxNode) -> bool {
    let kind = node.kind();
    kind.is_trivia()
        || kind.is_error()
        || kind == SyntaxKind::Semicolon
        || node.text() == "/"
        || node.text() == ":"
}

/// Folds a node into the simulated line-start state.
fn next_at_start(node: &SyntaxNode, at_start: &mut bool) {
    if node.kind().is_trivia() {
        if node.text().chars().any(is_newline) {
            *at_start = true;
        }
    } else {
        *at_start = false;
    }
}

/// Folds a node into the simulated bracket-nesting state. Brackets that
/// did not open a construct were converted to text by the parser.
fn next_nesting(node: &SyntaxNode, nesting: &mut usize) {
    if node.kind() == SyntaxKind::Text {
        match node.text() {
            "[" => *nesting += 1,
            "]" if *nesting > 0 => *nesting -= 1,
            _ => {}
        }
    }
}
