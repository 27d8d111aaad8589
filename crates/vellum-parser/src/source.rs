//! Source files.

use std::fmt::{self, Debug, Formatter};

use vellum_common::{FileId, LinkedNode, Lines, Span, SyntaxNode};

use crate::parser::parse;
use crate::reparser::reparse;

/// A source file: text, its syntax tree, and a line index, kept in sync
/// through edits.
///
/// All line and column indices start at zero; add one for user display.
#[derive(Clone)]
pub struct Source {
    id: FileId,
    lines: Lines,
    root: SyntaxNode,
}

impl Source {
    /// Create a new source file from text: parse it, assign span numbers,
    /// and index its lines.
    pub fn new(id: FileId, text: String) -> Self {
        let mut root = parse(&text);
        root.numberize(id, Span::FULL)
            .expect("full span range can number any tree");
        Self { id, lines: Lines::new(text), root }
    }

    /// Create a source file with a fresh anonymous id, for tests and
    /// on-the-fly compilation.
    pub fn detached(text: impl Into<String>) -> Self {
        Self::new(FileId::unique(), text.into())
    }

    /// The file id.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// The whole source text.
    pub fn text(&self) -> &str {
        self.lines.text()
    }

    /// The root node of the syntax tree.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The line index.
    pub fn lines(&self) -> &Lines {
        &self.lines
    }

    /// The length of the text in bytes.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// The contents of a line, without its terminator.
    pub fn get_line(&self, line_idx: usize) -> Option<&str> {
        self.lines.line(line_idx)
    }

    /// Slice out a part of the text.
    pub fn get_text(&self, start: usize, end: usize) -> Option<&str> {
        self.lines.get(start..end)
    }

    /// Find the node with the given span in this file.
    pub fn find(&self, span: Span) -> Option<LinkedNode<'_>> {
        LinkedNode::new(&self.root).find(span)
    }

    /// Map a span in this file to a byte range.
    pub fn range(&self, span: Span) -> Option<(usize, usize)> {
        let found = self.find(span)?;
        let range = found.range();
        Some((range.start, range.end))
    }

    /// Replace the given byte range with new text and refresh the tree,
    /// incrementally where possible.
    ///
    /// `start` and `end` are clamped into the text and ordered; both must
    /// lie on character boundaries. Returns the range of the new text
    /// that was reparsed; span numbers outside it are unchanged.
    pub fn edit(&mut self, start: usize, end: usize, replacement: &str) -> (usize, usize) {
        let start = start.min(self.len());
        let end = end.clamp(start, self.len());

        self.lines.edit(start..end, replacement);
        let affected =
            reparse(&mut self.root, self.lines.text(), start..end, replacement.len());
        (affected.start, affected.end)
    }

    /// Fully replace the text, editing only the part that differs.
    pub fn replace(&mut self, new: &str) -> (usize, usize) {
        let (prefix, suffix) = {
            let old = self.text();

            let mut prefix =
                old.bytes().zip(new.bytes()).take_while(|(x, y)| x == y).count();

            if prefix == old.len() && prefix == new.len() {
                // The texts are identical.
                return (prefix, prefix);
            }

            while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
                prefix -= 1;
            }

            let mut suffix = old[prefix..]
                .bytes()
                .rev()
                .zip(new[prefix..].bytes().rev())
                .take_while(|(x, y)| x == y)
                .count();

            while !old.is_char_boundary(old.len() - suffix)
                || !new.is_char_boundary(new.len() - suffix)
            {
                suffix -= 1;
            }

            (prefix, suffix)
        };

        let end = self.len() - suffix;
        self.edit(prefix, end, &new[prefix..new.len() - suffix])
    }
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Source({:?})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_numbers_the_whole_tree() {
        let source = Source::detached("Hello *world*!");
        assert_eq!(source.root().into_text(), source.text());

        fn check(node: &SyntaxNode, id: FileId) {
            assert!(!node.span().is_detached());
            assert_eq!(node.span().id(), Some(id));
            for child in node.children() {
                check(child, id);
            }
        }
        check(source.root(), source.id());
    }

    #[test]
    fn find_and_range_round_trip() {
        let source = Source::detached("A *b* c");
        let root = LinkedNode::new(source.root());
        let leaf = root.leaf_at(3, vellum_common::Side::After).unwrap();
        let span = leaf.get().span();
        let found = source.find(span).unwrap();
        assert_eq!(found.range(), leaf.range());
        let (start, end) = source.range(span).unwrap();
        assert_eq!((start, end), (leaf.range().start, leaf.range().end));
    }

    #[test]
    fn edit_clamps_out_of_bounds_ranges() {
        let mut source = Source::detached("hello");
        source.edit(3, 9999, " no");
        assert_eq!(source.text(), "hel no");
        assert_eq!(source.root().into_text(), "hel no");
    }

    #[test]
    fn replace_edits_only_the_difference() {
        let mut source = Source::detached("one two three");
        let (start, end) = source.replace("one 2 three");
        assert_eq!(source.text(), "one 2 three");
        assert_eq!(source.root().into_text(), "one 2 three");
        assert!(start <= 4 && end <= source.len());

        // Identical replacement is a no-op.
        let mut source = Source::detached("same");
        source.replace("same");
        assert_eq!(source.text(), "same");
    }

    #[test]
    fn edit_keeps_lines_in_sync() {
        let mut source = Source::detached("a\nb\nc");
        source.edit(2, 3, "bb\nx");
        assert_eq!(source.text(), "a\nbb\nx\nc");
        assert_eq!(source.line_count(), 4);
        assert_eq!(source.get_line(2), Some("x"));
    }
}
