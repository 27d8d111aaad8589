//! The lossless syntax tree.
//!
//! A [`SyntaxNode`] is one of three things: a leaf token with its source
//! text, an inner node with children, or an error with a message and the
//! text it covers. Concatenating the text of all leaves in order
//! reproduces the source byte-for-byte, comments and whitespace included.
//!
//! Inner nodes are shared behind an [`Arc`] and mutated copy-on-write, so
//! cloning a subtree is cheap. Nodes are mutated only while a tree is
//! being built or spliced; consumers treat finished trees as immutable.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

use crate::file::FileId;
use crate::kind::SyntaxKind;
use crate::set::SyntaxSet;
use crate::span::{NumberingResult, Span, Unnumberable};

/// A node in the untyped syntax tree.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SyntaxNode(Repr);

/// The three representations a node can have.
#[derive(Clone, Eq, PartialEq, Hash)]
enum Repr {
    /// A leaf token.
    Leaf(LeafNode),
    /// A reference-counted inner node.
    Inner(Arc<InnerNode>),
    /// An error node.
    Error(Arc<ErrorNode>),
}

impl SyntaxNode {
    /// Create a new leaf token node.
    pub fn leaf(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self(Repr::Leaf(LeafNode::new(kind, text)))
    }

    /// Create a new inner node with children.
    pub fn inner(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        Self(Repr::Inner(Arc::new(InnerNode::new(kind, children))))
    }

    /// Create a new error node.
    pub fn error(error: SyntaxError, text: impl Into<String>) -> Self {
        Self(Repr::Error(Arc::new(ErrorNode::new(error, text))))
    }

    /// Create a dummy node of the given kind.
    ///
    /// A zero-length leaf, used as a placeholder or `take` default.
    pub fn placeholder(kind: SyntaxKind) -> Self {
        Self(Repr::Leaf(LeafNode::new(kind, "")))
    }

    /// The type of the node.
    pub fn kind(&self) -> SyntaxKind {
        match &self.0 {
            Repr::Leaf(leaf) => leaf.kind,
            Repr::Inner(inner) => inner.kind,
            Repr::Error(_) => SyntaxKind::Error,
        }
    }

    /// The byte length of the node in the source text.
    pub fn len(&self) -> usize {
        match &self.0 {
            Repr::Leaf(leaf) => leaf.len(),
            Repr::Inner(inner) => inner.len,
            Repr::Error(error) => error.text.len(),
        }
    }

    /// Whether the node is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The span of the node.
    pub fn span(&self) -> Span {
        match &self.0 {
            Repr::Leaf(leaf) => leaf.span,
            Repr::Inner(inner) => inner.span,
            Repr::Error(error) => error.error.span,
        }
    }

    /// The text of the node if it is a leaf or error node.
    ///
    /// Returns the empty string for inner nodes.
    pub fn text(&self) -> &str {
        match &self.0 {
            Repr::Leaf(leaf) => &leaf.text,
            Repr::Inner(_) => "",
            Repr::Error(error) => &error.text,
        }
    }

    /// Extract the text of the whole subtree.
    pub fn into_text(&self) -> String {
        match &self.0 {
            Repr::Leaf(leaf) => leaf.text.clone(),
            Repr::Inner(inner) => {
                let mut text = String::with_capacity(inner.len);
                for child in &inner.children {
                    text.push_str(&child.into_text());
                }
                text
            }
            Repr::Error(error) => error.text.clone(),
        }
    }

    /// The node's children.
    pub fn children(&self) -> std::slice::Iter<'_, SyntaxNode> {
        match &self.0 {
            Repr::Leaf(_) | Repr::Error(_) => [].iter(),
            Repr::Inner(inner) => inner.children.iter(),
        }
    }

    /// Exclusive access to the node's children.
    ///
    /// Only for constructing layers: the reparser descends through here.
    pub fn children_mut(&mut self) -> &mut [SyntaxNode] {
        match &mut self.0 {
            Repr::Leaf(_) | Repr::Error(_) => &mut [],
            Repr::Inner(inner) => &mut Arc::make_mut(inner).children,
        }
    }

    /// The number of nodes in the subtree, including this node.
    pub fn descendants(&self) -> usize {
        match &self.0 {
            Repr::Leaf(_) | Repr::Error(_) => 1,
            Repr::Inner(inner) => inner.descendants,
        }
    }

    /// Whether the node or one of its descendants is erroneous.
    pub fn erroneous(&self) -> bool {
        match &self.0 {
            Repr::Leaf(_) => false,
            Repr::Inner(inner) => inner.erroneous,
            Repr::Error(_) => true,
        }
    }

    /// All error descriptors in the subtree, in document order.
    pub fn errors(&self) -> Vec<SyntaxError> {
        if !self.erroneous() {
            return vec![];
        }

        if let Repr::Error(error) = &self.0 {
            vec![error.error.clone()]
        } else {
            self.children()
                .filter(|node| node.erroneous())
                .flat_map(|node| node.errors())
                .collect()
        }
    }

    /// This node if it has the given kind.
    pub fn cast(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        (self.kind() == kind).then_some(self)
    }

    /// The first child of the given kind.
    pub fn cast_first(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children().find(|node| node.kind() == kind)
    }

    /// All children of the given kind.
    pub fn cast_all<'a>(
        &'a self,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.children().filter(move |node| node.kind() == kind)
    }

    /// The first child whose kind is in the given set.
    pub fn cast_first_in_set(&self, set: SyntaxSet) -> Option<&SyntaxNode> {
        self.children().find(|node| set.contains(node.kind()))
    }

    /// Convert the node to another kind, in place.
    ///
    /// Not applicable to error nodes.
    pub fn convert_to_kind(&mut self, kind: SyntaxKind) {
        debug_assert!(!kind.is_error());
        match &mut self.0 {
            Repr::Leaf(leaf) => leaf.kind = kind,
            Repr::Inner(inner) => Arc::make_mut(inner).kind = kind,
            Repr::Error(_) => {}
        }
    }

    /// Convert the node to an error, in place. The subtree's text becomes
    /// the error's text.
    pub fn convert_to_error(&mut self, message: impl Into<String>) {
        if !self.kind().is_error() {
            let text = std::mem::take(self).into_text();
            *self = SyntaxNode::error(SyntaxError::new(message), text);
        }
    }

    /// Convert the node to an error stating that the given thing was
    /// expected, but the current kind was found.
    pub fn expected(&mut self, expected: &str) {
        let kind = self.kind();
        self.convert_to_error(format!("expected {expected}, found {}", kind.name()));
        if kind.is_keyword() && matches!(expected, "identifier" | "pattern") {
            let text = self.text().to_string();
            self.hint(format!(
                "keyword `{text}` is not allowed as an identifier; try `{text}_` instead"
            ));
        }
    }

    /// Convert the node to an error stating it was unexpected.
    pub fn unexpected(&mut self) {
        self.convert_to_error(format!("unexpected {}", self.kind().name()));
    }

    /// Add a user-presentable hint if this is an error node.
    pub fn hint(&mut self, hint: impl Into<String>) {
        if let Repr::Error(error) = &mut self.0 {
            Arc::make_mut(error).error.hints.push(hint.into());
        }
    }

    /// Set a synthetic span for the node and all its descendants.
    pub fn synthesize(&mut self, span: Span) {
        match &mut self.0 {
            Repr::Leaf(leaf) => leaf.span = span,
            Repr::Inner(inner) => Arc::make_mut(inner).synthesize(span),
            Repr::Error(error) => Arc::make_mut(error).error.span = span,
        }
    }

    /// Assign spans to each node in the subtree, so that numeric order
    /// matches document order, with gaps on both sides of every node.
    pub fn numberize(&mut self, id: FileId, within: Range<u64>) -> NumberingResult {
        if within.start >= within.end {
            return Err(Unnumberable);
        }

        let mid = Span::from_number(id, (within.start + within.end) / 2)
            .ok_or(Unnumberable)?;
        match &mut self.0 {
            Repr::Leaf(leaf) => leaf.span = mid,
            Repr::Inner(inner) => {
                Arc::make_mut(inner).numberize(id, None, within)?;
            }
            Repr::Error(error) => Arc::make_mut(error).error.span = mid,
        }

        Ok(())
    }

    /// The upper bound of assigned numbers in this subtree.
    pub fn upper(&self) -> u64 {
        match &self.0 {
            Repr::Inner(inner) => inner.upper,
            Repr::Leaf(leaf) => leaf.span.number() + 1,
            Repr::Error(error) => error.error.span.number() + 1,
        }
    }

    /// Replace a range of children with a replacement, renumbering the new
    /// children into the numeric gap held by the old ones.
    ///
    /// May fail with [`Unnumberable`] if the gap is too narrow. Only
    /// meaningful on inner nodes; a no-op otherwise.
    pub fn replace_children(
        &mut self,
        range: Range<usize>,
        replacement: Vec<SyntaxNode>,
    ) -> NumberingResult {
        if let Repr::Inner(inner) = &mut self.0 {
            Arc::make_mut(inner).replace_children(range, replacement)?;
        }
        Ok(())
    }

    /// Update the byte length and descendant accounting of this node given
    /// old and new metrics of a replaced child subtree, and refresh the
    /// erroneous flag.
    pub fn update_parent(
        &mut self,
        prev_len: usize,
        new_len: usize,
        prev_descendants: usize,
        new_descendants: usize,
    ) {
        if let Repr::Inner(inner) = &mut self.0 {
            let inner = Arc::make_mut(inner);
            inner.len = inner.len + new_len - prev_len;
            inner.descendants = inner.descendants + new_descendants - prev_descendants;
            inner.erroneous = inner.children.iter().any(SyntaxNode::erroneous);
        }
    }

    /// Whether the two nodes are the same apart from spans.
    pub fn spanless_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Repr::Leaf(a), Repr::Leaf(b)) => a.spanless_eq(b),
            (Repr::Inner(a), Repr::Inner(b)) => a.spanless_eq(b),
            (Repr::Error(a), Repr::Error(b)) => a.spanless_eq(b),
            _ => false,
        }
    }
}

impl Default for SyntaxNode {
    fn default() -> Self {
        Self::placeholder(SyntaxKind::End)
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Leaf(leaf) => write!(f, "{:?}: {:?}", leaf.kind, leaf.text),
            Repr::Inner(inner) => write!(f, "{:?}: {}", inner.kind, inner.len),
            Repr::Error(error) => {
                write!(f, "Error: {:?} ({})", error.text, error.error.message)
            }
        }
    }
}

/// A leaf node in the untyped syntax tree.
#[derive(Clone, Eq, PartialEq, Hash)]
struct LeafNode {
    /// What kind of node this is (each kind would have its own struct in a
    /// strongly typed AST).
    kind: SyntaxKind,
    /// The source text of the node.
    text: String,
    /// The node's span.
    span: Span,
}

impl LeafNode {
    /// Create a new leaf node.
    fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        debug_assert!(!kind.is_error());
        Self { kind, text: text.into(), span: Span::detached() }
    }

    /// The byte length of the node in the source text.
    fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the two leaves are the same apart from spans.
    fn spanless_eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

/// An inner node in the untyped syntax tree.
#[derive(Clone, Eq, PartialEq, Hash)]
struct InnerNode {
    /// What kind of node this is.
    kind: SyntaxKind,
    /// The byte length of the node in the source.
    len: usize,
    /// The node's span.
    span: Span,
    /// The number of nodes in the whole subtree, including this node.
    descendants: usize,
    /// Whether this node or any of its children are erroneous.
    erroneous: bool,
    /// The upper bound of this subtree's span numbering range.
    upper: u64,
    /// This node's children, losslessly make up this node.
    children: Vec<SyntaxNode>,
}

impl InnerNode {
    /// Create a new inner node with the given kind and children.
    fn new(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        debug_assert!(!kind.is_error());

        let mut len = 0;
        let mut descendants = 1;
        let mut erroneous = false;

        for child in &children {
            len += child.len();
            descendants += child.descendants();
            erroneous |= child.erroneous();
        }

        Self {
            kind,
            len,
            span: Span::detached(),
            descendants,
            erroneous,
            upper: 0,
            children,
        }
    }

    /// Set a synthetic span for the node and all its descendants.
    fn synthesize(&mut self, span: Span) {
        self.span = span;
        for child in &mut self.children {
            child.synthesize(span);
        }
    }

    /// Assign span numbers `within` an interval to this node's subtree or
    /// just a `range` of its children.
    fn numberize(
        &mut self,
        id: FileId,
        range: Option<Range<usize>>,
        within: Range<u64>,
    ) -> NumberingResult {
        // Determine how many nodes we will number.
        let descendants = match &range {
            Some(range) if range.is_empty() => return Ok(()),
            Some(range) => self.children[range.clone()]
                .iter()
                .map(SyntaxNode::descendants)
                .sum::<usize>(),
            None => self.descendants,
        };

        // Determine the distance between two neighbouring assigned numbers.
        // If possible, we try to fit all numbers into the left half of
        // `within` so that there is space for future insertions.
        let space = within.end - within.start;
        let mut stride = space / (2 * descendants as u64);
        if stride == 0 {
            stride = space / descendants as u64;
            if stride == 0 {
                return Err(Unnumberable);
            }
        }

        // Number this node itself.
        let mut start = within.start;
        if range.is_none() {
            let end = start + stride;
            self.span = Span::from_number(id, (start + end) / 2).ok_or(Unnumberable)?;
            self.upper = within.end;
            start = end;
        }

        // Number the children.
        let len = self.children.len();
        for child in &mut self.children[range.unwrap_or(0..len)] {
            let end = start + child.descendants() as u64 * stride;
            child.numberize(id, start..end)?;
            start = end;
        }

        Ok(())
    }

    /// Replace a range of children with a replacement.
    fn replace_children(
        &mut self,
        mut range: Range<usize>,
        replacement: Vec<SyntaxNode>,
    ) -> NumberingResult {
        let Some(id) = self.span.id() else { return Err(Unnumberable) };
        let mut replacement = replacement;
        let mut replacement_range = 0..replacement.len();

        // Trim off a matching prefix and suffix so that unchanged children
        // keep their spans.
        while range.start < range.end
            && replacement_range.start < replacement_range.end
            && self.children[range.start]
                .spanless_eq(&replacement[replacement_range.start])
        {
            range.start += 1;
            replacement_range.start += 1;
        }

        while range.start < range.end
            && replacement_range.start < replacement_range.end
            && self.children[range.end - 1]
                .spanless_eq(&replacement[replacement_range.end - 1])
        {
            range.end -= 1;
            replacement_range.end -= 1;
        }

        replacement.truncate(replacement_range.end);
        let replacement: Vec<_> =
            replacement.drain(replacement_range.start..).collect();

        let superseded = &self.children[range.clone()];

        // Update the byte length and descendant accounting.
        self.len = self.len
            + replacement.iter().map(SyntaxNode::len).sum::<usize>()
            - superseded.iter().map(SyntaxNode::len).sum::<usize>();
        self.descendants = self.descendants
            + replacement.iter().map(SyntaxNode::descendants).sum::<usize>()
            - superseded.iter().map(SyntaxNode::descendants).sum::<usize>();

        // Perform the replacement.
        let replacement_count = replacement.len();
        self.children.splice(range.clone(), replacement);
        range.end = range.start + replacement_count;
        self.erroneous = self.children.iter().any(SyntaxNode::erroneous);

        // Renumber the new children. Retries until it works, taking
        // exponentially more siblings into account each time.
        let mut left = 0;
        let mut right = 0;
        let max_left = range.start;
        let max_right = self.children.len() - range.end;
        loop {
            let renumber = range.start - left..range.end + right;

            // The minimum assignable number is either the number after the
            // child right before the to-be-renumbered range, or this
            // node's own number plus one.
            let start_number = renumber
                .start
                .checked_sub(1)
                .and_then(|i| self.children.get(i))
                .map(|child| child.upper())
                .unwrap_or(self.span.number() + 1);

            // The maximum assignable number is either the number of the
            // child right after the to-be-renumbered range, or this
            // node's upper bound.
            let end_number = self
                .children
                .get(renumber.end)
                .map(|child| child.span().number())
                .unwrap_or(self.upper);

            // Try to renumber.
            if self.numberize(id, Some(renumber), start_number..end_number).is_ok() {
                return Ok(());
            }

            // If it didn't even work with all children, give up.
            if left == max_left && right == max_right {
                return Err(Unnumberable);
            }

            // Exponential expansion to both sides.
            left = (left + 1).next_power_of_two().min(max_left);
            right = (right + 1).next_power_of_two().min(max_right);
        }
    }

    /// Whether the two inner nodes are the same apart from spans.
    fn spanless_eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.len == other.len
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.spanless_eq(b))
    }
}

/// An error node in the untyped syntax tree.
#[derive(Clone, Eq, PartialEq, Hash)]
struct ErrorNode {
    /// The source text of the node.
    text: String,
    /// The syntax error.
    error: SyntaxError,
}

impl ErrorNode {
    /// Create a new error node.
    fn new(error: SyntaxError, text: impl Into<String>) -> Self {
        Self { text: text.into(), error }
    }

    /// Whether the two errors are the same apart from spans.
    fn spanless_eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.error.message == other.error.message
            && self.error.hints == other.error.hints
    }
}

/// A syntactical error.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct SyntaxError {
    /// The node's span.
    pub span: Span,
    /// The error message.
    pub message: String,
    /// Additional hints to the user, indicating how this error could be
    /// avoided or worked around.
    pub hints: Vec<String>,
}

impl SyntaxError {
    /// Create a new detached syntax error.
    pub fn new(message: impl Into<String>) -> Self {
        Self { span: Span::detached(), message: message.into(), hints: vec![] }
    }

    /// Attach a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Which side of a cursor position a [`leaf_at`](LinkedNode::leaf_at)
/// lookup should prefer when the position falls on a leaf boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    /// The leaf ending at the position.
    Before,
    /// The leaf starting at the position.
    After,
}

/// A view into a node and its metadata in the tree.
///
/// The tree itself stores no parent pointers; a `LinkedNode` reconstructs
/// them lazily as it descends from the root, which keeps the tree a pure
/// tree and cloning cheap.
#[derive(Debug, Clone)]
pub struct LinkedNode<'a> {
    node: &'a SyntaxNode,
    parent: Option<Rc<LinkedNode<'a>>>,
    index: usize,
    offset: usize,
}

impl<'a> LinkedNode<'a> {
    /// Start a new traversal at a root node.
    pub fn new(root: &'a SyntaxNode) -> Self {
        Self { node: root, parent: None, index: 0, offset: 0 }
    }

    /// Get the contained syntax node.
    pub fn get(&self) -> &'a SyntaxNode {
        self.node
    }

    /// The index of this node in its parent's children list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The absolute byte offset of this node in the source file.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The byte range of this node in the source file.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.node.len()
    }

    /// An iterator over this node's children.
    pub fn children(&self) -> LinkedChildren<'a> {
        LinkedChildren {
            parent: Rc::new(self.clone()),
            iter: self.node.children().enumerate(),
            front: self.offset,
        }
    }

    /// Whether the node is a leaf or error node.
    pub fn is_leaf(&self) -> bool {
        self.node.children().len() == 0
    }

    /// Find a descendant with the given span.
    pub fn find(&self, span: Span) -> Option<LinkedNode<'a>> {
        if self.node.span() == span {
            return Some(self.clone());
        }

        // A parent has a smaller span number than all of its descendants,
        // so there is nothing to find below a node with a larger number.
        if self.node.span().number() > span.number() {
            return None;
        }

        // Each child's subtree holds numbers strictly below the next
        // sibling's number, so only one child can contain the target.
        let mut children = self.children().peekable();
        while let Some(child) = children.next() {
            let next_past = children
                .peek()
                .map_or(true, |next| next.node.span().number() > span.number());
            if next_past {
                if let Some(found) = child.find(span) {
                    return Some(found);
                }
            }
        }

        None
    }
}

/// Access to parents and siblings.
impl<'a> LinkedNode<'a> {
    /// Get this node's parent.
    pub fn parent(&self) -> Option<&LinkedNode<'a>> {
        self.parent.as_deref()
    }

    /// Get the kind of this node's parent.
    pub fn parent_kind(&self) -> Option<SyntaxKind> {
        Some(self.parent()?.node.kind())
    }

    /// Get the previous sibling, regardless of its kind.
    fn prev_sibling_inner(&self) -> Option<Self> {
        let parent = self.parent()?;
        let index = self.index.checked_sub(1)?;
        let node = parent.node.children().nth(index)?;
        let offset = self.offset - node.len();
        Some(Self { node, parent: self.parent.clone(), index, offset })
    }

    /// Get the previous non-trivia sibling node.
    pub fn prev_sibling(&self) -> Option<Self> {
        let prev = self.prev_sibling_inner()?;
        if prev.node.kind().is_trivia() {
            prev.prev_sibling()
        } else {
            Some(prev)
        }
    }

    /// Get the next sibling, regardless of its kind.
    fn next_sibling_inner(&self) -> Option<Self> {
        let parent = self.parent()?;
        let index = self.index.checked_add(1)?;
        let node = parent.node.children().nth(index)?;
        let offset = self.offset + self.node.len();
        Some(Self { node, parent: self.parent.clone(), index, offset })
    }

    /// Get the next non-trivia sibling node.
    pub fn next_sibling(&self) -> Option<Self> {
        let next = self.next_sibling_inner()?;
        if next.node.kind().is_trivia() {
            next.next_sibling()
        } else {
            Some(next)
        }
    }
}

/// Access to leaves.
impl<'a> LinkedNode<'a> {
    /// Get the first non-trivia leaf in this subtree.
    pub fn leftmost_leaf(&self) -> Option<Self> {
        if self.is_leaf() && !self.node.kind().is_trivia() {
            return Some(self.clone());
        }

        for child in self.children() {
            if let Some(leaf) = child.leftmost_leaf() {
                return Some(leaf);
            }
        }

        None
    }

    /// Get the last non-trivia leaf in this subtree.
    pub fn rightmost_leaf(&self) -> Option<Self> {
        if self.is_leaf() && !self.node.kind().is_trivia() {
            return Some(self.clone());
        }

        let mut children: Vec<_> = self.children().collect();
        while let Some(child) = children.pop() {
            if let Some(leaf) = child.rightmost_leaf() {
                return Some(leaf);
            }
        }

        None
    }

    /// Get the leaf immediately before this node's subtree.
    pub fn prev_leaf(&self) -> Option<Self> {
        let mut node = self.clone();
        while let Some(prev) = node.prev_sibling_inner() {
            if let Some(leaf) = prev.rightmost_leaf() {
                return Some(leaf);
            }
            node = prev;
        }
        self.parent()?.prev_leaf()
    }

    /// Get the leaf immediately after this node's subtree.
    pub fn next_leaf(&self) -> Option<Self> {
        let mut node = self.clone();
        while let Some(next) = node.next_sibling_inner() {
            if let Some(leaf) = next.leftmost_leaf() {
                return Some(leaf);
            }
            node = next;
        }
        self.parent()?.next_leaf()
    }

    /// Get the leaf at the specified byte offset, resolving boundary ties
    /// towards the given side.
    pub fn leaf_at(&self, cursor: usize, side: Side) -> Option<LinkedNode<'a>> {
        if self.is_leaf() && cursor <= self.offset + self.node.len() {
            return Some(self.clone());
        }

        let count = self.node.children().len();
        for (i, child) in self.children().enumerate() {
            let right = child.offset + child.node.len();
            if (side == Side::Before && cursor <= right)
                || (side == Side::After && cursor < right)
                || (i + 1 == count && cursor == right)
            {
                return child.leaf_at(cursor, side);
            }
        }

        None
    }
}

/// An iterator over the children of a linked node.
pub struct LinkedChildren<'a> {
    parent: Rc<LinkedNode<'a>>,
    iter: std::iter::Enumerate<std::slice::Iter<'a, SyntaxNode>>,
    front: usize,
}

impl<'a> Iterator for LinkedChildren<'a> {
    type Item = LinkedNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(index, node)| {
            let offset = self.front;
            self.front += node.len();
            LinkedNode {
                node,
                parent: Some(Rc::clone(&self.parent)),
                index,
                offset,
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for LinkedChildren<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxNode {
        // `a+b` as a tiny tree.
        SyntaxNode::inner(
            SyntaxKind::Binary,
            vec![
                SyntaxNode::leaf(SyntaxKind::Ident, "a"),
                SyntaxNode::leaf(SyntaxKind::Plus, "+"),
                SyntaxNode::leaf(SyntaxKind::Ident, "b"),
            ],
        )
    }

    #[test]
    fn accounting() {
        let node = sample();
        assert_eq!(node.len(), 3);
        assert_eq!(node.descendants(), 4);
        assert!(!node.erroneous());
        assert_eq!(node.into_text(), "a+b");
    }

    #[test]
    fn erroneous_flag_propagates() {
        let node = SyntaxNode::inner(
            SyntaxKind::Markup,
            vec![
                SyntaxNode::leaf(SyntaxKind::Text, "fine"),
                SyntaxNode::error(SyntaxError::new("broken"), "!!"),
            ],
        );
        assert!(node.erroneous());
        let errors = node.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "broken");
        assert_eq!(node.into_text(), "fine!!");
    }

    #[test]
    fn convert_to_error_keeps_text() {
        let mut node = sample();
        node.convert_to_error("no good");
        assert_eq!(node.kind(), SyntaxKind::Error);
        assert_eq!(node.text(), "a+b");
        assert!(node.erroneous());
    }

    #[test]
    fn numberize_orders_spans() {
        let id = FileId::unique();
        let mut node = sample();
        node.numberize(id, Span::FULL).unwrap();

        let mut numbers = vec![node.span().number()];
        numbers.extend(node.children().map(|c| c.span().number()));
        let mut sorted = numbers.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(numbers, sorted, "spans must be unique and in document order");
        assert!(numbers.iter().all(|&n| Span::FULL.contains(&n)));
    }

    #[test]
    fn numberize_fails_in_tiny_interval() {
        let id = FileId::unique();
        let mut node = sample();
        assert_eq!(node.numberize(id, 2..4), Err(Unnumberable));
    }

    #[test]
    fn replace_children_keeps_accounting() {
        let id = FileId::unique();
        let mut node = sample();
        node.numberize(id, Span::FULL).unwrap();

        let root_span = node.span();
        node.replace_children(
            2..3,
            vec![SyntaxNode::leaf(SyntaxKind::Ident, "longer")],
        )
        .unwrap();

        assert_eq!(node.len(), 8);
        assert_eq!(node.descendants(), 4);
        assert_eq!(node.into_text(), "a+longer");
        assert_eq!(node.span(), root_span, "the parent's span must not change");

        // Order must still hold after the splice.
        let numbers: Vec<_> = node.children().map(|c| c.span().number()).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
    }

    #[test]
    fn linked_node_navigation() {
        let id = FileId::unique();
        let mut node = sample();
        node.numberize(id, Span::FULL).unwrap();

        let root = LinkedNode::new(&node);
        let plus = root.children().nth(1).unwrap();
        assert_eq!(plus.get().kind(), SyntaxKind::Plus);
        assert_eq!(plus.range(), 1..2);
        assert_eq!(plus.prev_sibling().unwrap().get().text(), "a");
        assert_eq!(plus.next_sibling().unwrap().get().text(), "b");
        assert_eq!(plus.parent().unwrap().get().kind(), SyntaxKind::Binary);

        // Span lookup round-trips.
        let span = plus.get().span();
        let found = root.find(span).unwrap();
        assert_eq!(found.range(), 1..2);
    }

    #[test]
    fn leaf_at_resolves_boundaries() {
        let node = sample();
        let root = LinkedNode::new(&node);
        assert_eq!(root.leaf_at(1, Side::Before).unwrap().get().text(), "a");
        assert_eq!(root.leaf_at(1, Side::After).unwrap().get().text(), "+");
        assert_eq!(root.leaf_at(3, Side::After).unwrap().get().text(), "b");
    }
}
