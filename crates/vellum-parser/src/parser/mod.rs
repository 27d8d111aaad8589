//! The recursive-descent parser.
//!
//! The parser consumes `(kind, node)` pairs from the lexer and assembles
//! them into a lossless tree. Finished nodes collect in a flat buffer;
//! [`wrap`](Parser::wrap) later rewraps a tail of the buffer as the
//! children of a new inner node. Markers remember buffer positions for
//! these wraps, so the grammar reads mostly top-down even though the tree
//! is built bottom-up.
//!
//! Trivia (whitespace and comments) is pushed into the buffer as soon as
//! it is lexed, before the token it precedes; the grammar never sees it
//! as the current token. `wrap` excludes trailing trivia so errors and
//! comments don't end up attached to the wrong construct.
//!
//! Newlines terminate or continue constructs depending on the current
//! [`AtNewline`] mode; when the mode says stop, the buffered token
//! masquerades as [`End`](SyntaxKind::End) until the mode changes.
//!
//! The `(` disambiguation between parenthesized expressions, arrays,
//! dictionaries, closure parameters, and destructuring patterns uses a
//! checkpoint/restore scheme with a memo table keyed by byte offset, which
//! keeps restart-heavy inputs amortized linear.

pub(crate) mod code;
pub(crate) mod markup;
pub(crate) mod math;

use std::ops::{Index, IndexMut, Range};

use rustc_hash::FxHashMap;

use vellum_common::{syntax_set, SyntaxError, SyntaxKind, SyntaxNode, SyntaxSet};
use vellum_lexer::{Lexer, SyntaxMode};

/// The greatest depth of nested productions the parser enters before it
/// folds the rest of the construct into an error.
const MAX_DEPTH: usize = 256;

/// Parses a source file as top-level markup.
pub fn parse(text: &str) -> SyntaxNode {
    let mut p = Parser::new(text, 0, SyntaxMode::Markup);
    markup::markup_exprs(&mut p, true, syntax_set!(End));
    p.finish_into(SyntaxKind::Markup)
}

/// Parses top-level code.
pub fn parse_code(text: &str) -> SyntaxNode {
    let mut p = Parser::new(text, 0, SyntaxMode::Code);
    code::code_exprs(&mut p, syntax_set!(End));
    p.finish_into(SyntaxKind::Code)
}

/// Parses top-level math.
pub fn parse_math(text: &str) -> SyntaxNode {
    let mut p = Parser::new(text, 0, SyntaxMode::Math);
    math::math_exprs(&mut p, syntax_set!(End));
    p.finish_into(SyntaxKind::Math)
}

/// Reparses a code or content block standing at `range.start` in the text.
///
/// Returns the new block node if parsing consumed exactly the expected
/// range without ever missing a grouping delimiter.
///
/// # Panics
///
/// If the text at `range.start` does not start a block.
pub fn reparse_block(text: &str, range: Range<usize>) -> Option<SyntaxNode> {
    let mut p = Parser::new(text, range.start, SyntaxMode::Code);
    assert!(p.at(SyntaxKind::LeftBracket) || p.at(SyntaxKind::LeftBrace));
    code::block(&mut p);
    (p.balanced && p.prev_end() == range.end)
        .then(|| p.finish().into_iter().next().unwrap())
}

/// Reparses a run of markup expressions from `start` up to `end`.
///
/// `at_start` and `nesting` carry the simulated parser state at `start`;
/// on success they are updated to the state after the reparsed range, so
/// the caller can check that the following siblings still fit. Returns the
/// new nodes if parsing consumed exactly the intended range while staying
/// balanced.
pub fn reparse_markup(
    text: &str,
    start: usize,
    end: usize,
    at_start: &mut bool,
    nesting: &mut usize,
    top_level: bool,
) -> Option<Vec<SyntaxNode>> {
    let mut p = Parser::new(text, start, SyntaxMode::Markup);
    *at_start |= p.had_newline();
    while !p.end() && p.current_start() < end {
        // In content-block markup, a right-bracket at the top nesting
        // level belongs to the enclosing block.
        if !top_level && *nesting == 0 && p.at(SyntaxKind::RightBracket) {
            break;
        }
        markup::markup_expr(&mut p, *at_start, nesting);
        *at_start = p.had_newline();
    }
    (p.balanced && p.current_start() == end).then(|| p.finish())
}

/// Syntax kind sets for grammar decisions.
pub(crate) mod set {
    use vellum_common::{syntax_set, SyntaxSet};

    /// Kinds that can start a code statement.
    pub const STMT: SyntaxSet = syntax_set!(Let, Set, Show, Import, Include);

    /// Kinds that are unary code operators.
    pub const UNARY_OP: SyntaxSet = syntax_set!(Plus, Minus, Not);

    /// Kinds that are binary code operators.
    pub const BINARY_OP: SyntaxSet = syntax_set!(
        Plus, Minus, Star, Slash, And, Or, EqEq, ExclEq, Lt, LtEq, Gt, GtEq,
        In, Eq, PlusEq, HyphEq, StarEq, SlashEq,
    );

    /// Kinds that can start an atomic code primary (one that postfix
    /// operators cannot extend).
    pub const ATOMIC_CODE_PRIMARY: SyntaxSet = syntax_set!(
        Ident, LeftBrace, LeftBracket, LeftParen, Dollar, Let, Set, Show,
        Context, If, While, For, Import, Include, Break, Continue, Return,
        Raw, None, Auto, Int, Float, Bool, Numeric, Str, Label,
    );

    /// Kinds that can start a code primary.
    pub const CODE_PRIMARY: SyntaxSet =
        ATOMIC_CODE_PRIMARY.add(vellum_common::SyntaxKind::Underscore);

    /// Kinds that can start an atomic code expression.
    pub const ATOMIC_CODE_EXPR: SyntaxSet = ATOMIC_CODE_PRIMARY;

    /// Kinds that can start a code expression.
    pub const CODE_EXPR: SyntaxSet = CODE_PRIMARY.union(UNARY_OP);

    /// Kinds that can start a math expression.
    pub const MATH_EXPR: SyntaxSet = syntax_set!(
        Hash, MathIdent, FieldAccess, Text, MathText, MathShorthand,
        Linebreak, MathAlignPoint, MathPrimes, Escape, Str, Root, LeftParen,
        LeftBrace, Dot, Comma, Semicolon, RightParen, RightBrace, Slash, Hat,
        Underscore,
    );

    /// Kinds that can start an item in an array or dictionary.
    pub const ARRAY_OR_DICT_ITEM: SyntaxSet =
        CODE_EXPR.add(vellum_common::SyntaxKind::Dots);

    /// Kinds that can start a function call argument.
    pub const ARG: SyntaxSet = CODE_EXPR.add(vellum_common::SyntaxKind::Dots);

    /// Kinds that can start a pattern leaf.
    pub const PATTERN_LEAF: SyntaxSet = ATOMIC_CODE_EXPR;

    /// Kinds that can start a binding or reassignment pattern.
    pub const PATTERN: SyntaxSet = PATTERN_LEAF
        .add(vellum_common::SyntaxKind::LeftParen)
        .add(vellum_common::SyntaxKind::Underscore);

    /// Kinds that can start a closure parameter.
    pub const PARAM: SyntaxSet = PATTERN.add(vellum_common::SyntaxKind::Dots);

    /// Kinds that can start an item in a destructuring pattern.
    pub const DESTRUCTURING_ITEM: SyntaxSet =
        PATTERN.add(vellum_common::SyntaxKind::Dots);
}

/// How the parser treats a newline before the current token.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum AtNewline {
    /// Ignore newlines, as inside parens.
    Continue,
    /// Any newline terminates, as in headings and after `#` expressions.
    Stop,
    /// Terminate unless the token after the newline continues the
    /// construct (`else` branches, chained `.` method calls).
    ContextualContinue,
    /// Only a paragraph break terminates, as inside strong and emphasis.
    StopParBreak,
    /// Terminate unless the token after the newline is indented beyond the
    /// given column, as in list items.
    RequireColumn(usize),
}

impl AtNewline {
    /// Whether the newline before a token of the given kind terminates the
    /// current construct.
    fn stop_at(self, newline: Newline, kind: SyntaxKind) -> bool {
        match self {
            AtNewline::Continue => false,
            AtNewline::Stop => true,
            AtNewline::ContextualContinue => {
                !matches!(kind, SyntaxKind::Else | SyntaxKind::Dot)
            }
            AtNewline::StopParBreak => newline.parbreak,
            AtNewline::RequireColumn(min_col) => {
                // Without column information (outside markup), stop.
                newline.column.map_or(true, |column| column <= min_col)
            }
        }
    }
}

/// Information about newlines in the trivia before a token.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Newline {
    /// The column of the token after the newlines, tracked only in markup.
    column: Option<usize>,
    /// Whether any of the newlines was a paragraph break.
    parbreak: bool,
}

/// A single token buffered by the parser, including bookkeeping about the
/// trivia that preceded it.
#[derive(Debug, Clone)]
struct Token {
    /// The kind the grammar currently sees. May be overridden to `End` by
    /// the newline mode.
    kind: SyntaxKind,
    /// The node to push into the buffer when the token is eaten.
    node: SyntaxNode,
    /// How many of the most recently pushed buffer entries are the trivia
    /// preceding this token.
    n_trivia: usize,
    /// Newline information, if the preceding trivia contained a newline.
    newline: Option<Newline>,
    /// The byte offset where the token starts.
    start: usize,
    /// The byte offset where the previous non-trivia token ended.
    prev_end: usize,
}

/// A position in the parser's node buffer, remembered for a later `wrap`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Marker(usize);

/// A restorable parser position.
#[derive(Clone)]
pub(crate) struct Checkpoint {
    node_len: usize,
    state: PartialState,
}

/// The parts of a checkpoint that don't concern the node buffer.
#[derive(Clone)]
struct PartialState {
    cursor: usize,
    lex_mode: SyntaxMode,
    token: Token,
}

/// Memoized parse results for restart-heavy productions.
#[derive(Default)]
struct MemoArena {
    /// Finished nodes of memoized parses, stored end to end.
    arena: Vec<SyntaxNode>,
    /// Maps from a byte offset to a range in the arena plus the parser
    /// state right after the memoized parse.
    map: FxHashMap<usize, (Range<usize>, PartialState)>,
}

/// The parser.
pub(crate) struct Parser<'s> {
    /// The source text.
    text: &'s str,
    /// The token source.
    lexer: Lexer<'s>,
    /// How newlines terminate constructs right now.
    nl_mode: AtNewline,
    /// The buffered current token.
    token: Token,
    /// Whether all expected grouping delimiters were present so far. The
    /// reparser rejects partial parses that went unbalanced.
    balanced: bool,
    /// The flat buffer of finished nodes.
    nodes: Vec<SyntaxNode>,
    /// Memoized parses for the `(` disambiguation.
    memo: MemoArena,
    /// The current recursion depth.
    depth: usize,
}

impl<'s> Parser<'s> {
    /// Create a parser at the given offset of the text.
    fn new(text: &'s str, offset: usize, mode: SyntaxMode) -> Self {
        let mut lexer = Lexer::new(text, mode);
        lexer.jump(offset);
        let nl_mode = AtNewline::Continue;
        let mut nodes = vec![];
        let token = Self::lex(&mut nodes, &mut lexer, nl_mode);
        Self {
            text,
            lexer,
            nl_mode,
            token,
            balanced: true,
            nodes,
            memo: MemoArena::default(),
            depth: 0,
        }
    }

    /// Consume the parser, returning the buffered nodes.
    fn finish(self) -> Vec<SyntaxNode> {
        self.nodes
    }

    /// Consume the parser, wrapping everything in one top-level node.
    fn finish_into(self, kind: SyntaxKind) -> SyntaxNode {
        assert!(self.at(SyntaxKind::End));
        SyntaxNode::inner(kind, self.finish())
    }

    /// The kind of the current token.
    fn current(&self) -> SyntaxKind {
        self.token.kind
    }

    /// The byte offset where the current token starts.
    fn current_start(&self) -> usize {
        self.token.start
    }

    /// The byte offset where the current token ends.
    fn current_end(&self) -> usize {
        self.lexer.cursor()
    }

    /// The text of the current token.
    fn current_text(&self) -> &'s str {
        &self.text[self.token.start..self.current_end()]
    }

    /// The byte offset where the previous non-trivia token ended.
    fn prev_end(&self) -> usize {
        self.token.prev_end
    }

    /// The column of the current token.
    fn current_column(&self) -> usize {
        self.lexer.column(self.token.start)
    }

    /// Whether the current token is of the given kind.
    fn at(&self, kind: SyntaxKind) -> bool {
        self.token.kind == kind
    }

    /// Whether the current token's kind is in the set.
    fn at_set(&self, set: SyntaxSet) -> bool {
        set.contains(self.token.kind)
    }

    /// Whether the current token is of the given kind and directly follows
    /// the previous one, without any trivia in between.
    fn directly_at(&self, kind: SyntaxKind) -> bool {
        self.token.kind == kind && self.token.prev_end == self.token.start
    }

    /// Whether the token stream is exhausted (or masked off by the current
    /// newline mode).
    fn end(&self) -> bool {
        self.at(SyntaxKind::End)
    }

    /// Whether the trivia before the current token contained a newline.
    fn had_newline(&self) -> bool {
        self.token.newline.is_some()
    }

    /// Whether there was any trivia before the current token.
    fn had_trivia(&self) -> bool {
        self.token.n_trivia > 0
    }

    /// Move the current token into the buffer and lex the next one.
    fn eat(&mut self) {
        self.nodes.push(std::mem::take(&mut self.token.node));
        self.token = Self::lex(&mut self.nodes, &mut self.lexer, self.nl_mode);
    }

    /// Eat the current token if it is of the given kind.
    fn eat_if(&mut self, kind: SyntaxKind) -> bool {
        let at = self.at(kind);
        if at {
            self.eat();
        }
        at
    }

    /// Eat the current token and return exclusive access to its node in
    /// the buffer.
    fn eat_and_get(&mut self) -> &mut SyntaxNode {
        let offset = self.nodes.len();
        self.eat();
        &mut self.nodes[offset]
    }

    /// Change the current token's kind and eat it.
    fn convert_and_eat(&mut self, kind: SyntaxKind) {
        self.token.node.convert_to_kind(kind);
        self.eat();
    }

    /// Eat a token that the grammar has already checked for.
    #[track_caller]
    fn assert(&mut self, kind: SyntaxKind) {
        assert_eq!(self.token.kind, kind);
        self.eat();
    }

    /// Adopt a node the lexer produced by lookahead as the current token
    /// and eat it. The lexer must already stand right after the node.
    fn adopt_lexed(&mut self, kind: SyntaxKind, node: SyntaxNode) {
        self.token.kind = kind;
        self.token.node = node;
        self.eat();
    }

    /// The kind the next token would have, from a lexer clone. Trivia is
    /// not skipped, so a space reports as [`Space`](SyntaxKind::Space).
    fn lexer_peek(&self) -> SyntaxKind {
        let mut lexer = self.lexer.clone();
        lexer.next().0
    }

    /// Ask the lexer whether a named argument (`ident:`) starts at the
    /// current token. On success the lexer stands after the identifier.
    fn lexer_named_arg_lookahead(&mut self) -> Option<SyntaxNode> {
        self.lexer.maybe_math_named_arg(self.token.start)
    }

    /// Ask the lexer whether a spread argument (`..expr`) starts at the
    /// current token. On success the lexer stands after the dots.
    fn lexer_spread_arg_lookahead(&mut self) -> Option<SyntaxNode> {
        self.lexer.maybe_math_spread_arg(self.token.start)
    }

    /// Remember the current buffer position.
    fn marker(&self) -> Marker {
        Marker(self.nodes.len())
    }

    /// The buffer position before the trivia that precedes the current
    /// token.
    fn before_trivia(&self) -> Marker {
        Marker(self.nodes.len() - self.token.n_trivia)
    }

    /// Rewrap everything from `from` up to the pending trivia as the
    /// children of a new inner node of the given kind. Never re-orders
    /// nodes; a no-op wrap produces an empty inner node.
    fn wrap(&mut self, from: Marker, kind: SyntaxKind) {
        let to = self.before_trivia().0.max(from.0);
        let children = self.nodes.drain(from.0..to).collect();
        self.nodes.insert(from.0, SyntaxNode::inner(kind, children));
    }

    /// Run `func` with the lexer in the given mode, converting the current
    /// token at both boundaries.
    fn enter_modes<T>(
        &mut self,
        mode: SyntaxMode,
        stop: AtNewline,
        func: impl FnOnce(&mut Parser<'s>) -> T,
    ) -> T {
        let previous = self.lexer.mode();
        if mode != previous {
            self.relex_in_mode(mode);
        }
        let ret = self.with_nl_mode(stop, func);
        if mode != previous {
            self.relex_in_mode(previous);
        }
        ret
    }

    /// Re-lex the current token (and its trivia) in another mode.
    fn relex_in_mode(&mut self, mode: SyntaxMode) {
        self.lexer.set_mode(mode);
        self.lexer.jump(self.token.prev_end);
        self.nodes.truncate(self.nodes.len() - self.token.n_trivia);
        self.token = Self::lex(&mut self.nodes, &mut self.lexer, self.nl_mode);
    }

    /// Run `func` with the given newline mode, re-evaluating whether the
    /// buffered token acts as `End` at both boundaries.
    fn with_nl_mode<T>(
        &mut self,
        mode: AtNewline,
        func: impl FnOnce(&mut Parser<'s>) -> T,
    ) -> T {
        let previous = self.nl_mode;
        self.nl_mode = mode;
        self.reevaluate_token(mode);
        let ret = func(self);
        self.nl_mode = previous;
        self.reevaluate_token(previous);
        ret
    }

    /// Decide again whether the buffered token terminates the construct
    /// under the given newline mode.
    fn reevaluate_token(&mut self, mode: AtNewline) {
        if let Some(newline) = self.token.newline {
            let kind = self.token.node.kind();
            self.token.kind =
                if mode.stop_at(newline, kind) { SyntaxKind::End } else { kind };
        }
    }

    /// Lex the next non-trivia token, pushing trivia into `nodes` as it
    /// comes up.
    fn lex(nodes: &mut Vec<SyntaxNode>, lexer: &mut Lexer, nl_mode: AtNewline) -> Token {
        let prev_end = lexer.cursor();
        let mut start = prev_end;
        let (mut kind, mut node) = lexer.next();
        let mut n_trivia = 0;
        let mut had_newline = false;
        let mut parbreak = false;

        while kind.is_trivia() {
            had_newline |= lexer.newline();
            parbreak |= kind == SyntaxKind::Parbreak;
            n_trivia += 1;
            nodes.push(node);
            start = lexer.cursor();
            (kind, node) = lexer.next();
        }

        let newline = had_newline.then(|| Newline {
            column: (lexer.mode() == SyntaxMode::Markup).then(|| lexer.column(start)),
            parbreak,
        });

        if let Some(newline) = newline {
            if nl_mode.stop_at(newline, kind) {
                // The node stays untouched, so the token can be restored
                // when the mode changes.
                kind = SyntaxKind::End;
            }
        }

        Token { kind, node, n_trivia, newline, start, prev_end }
    }
}

/// Depth guarding.
impl<'s> Parser<'s> {
    /// Enter one level of recursion, reporting whether the depth budget
    /// still allows it. Always paired with [`exit_depth`](Self::exit_depth).
    fn enter_depth(&mut self) -> bool {
        self.depth += 1;
        self.depth <= MAX_DEPTH
    }

    /// Leave one level of recursion.
    fn exit_depth(&mut self) {
        self.depth -= 1;
    }

    /// Consume a balanced run of tokens and fold it into a single error
    /// node. Used when the depth budget is exhausted; parsing continues at
    /// the enclosing boundary.
    fn overflow(&mut self) {
        let m = self.marker();
        let mut nesting = 0usize;
        loop {
            let kind = self.current();
            if kind == SyntaxKind::End {
                break;
            }
            match kind {
                SyntaxKind::LeftParen
                | SyntaxKind::LeftBrace
                | SyntaxKind::LeftBracket => nesting += 1,
                SyntaxKind::RightParen
                | SyntaxKind::RightBrace
                | SyntaxKind::RightBracket => {
                    if nesting == 0 {
                        break;
                    }
                    nesting -= 1;
                }
                SyntaxKind::Comma | SyntaxKind::Semicolon | SyntaxKind::Dollar
                    if nesting == 0 =>
                {
                    break;
                }
                _ => {}
            }
            self.eat();
        }

        let to = self.before_trivia().0.max(m.0);
        let text: String =
            self.nodes.drain(m.0..to).map(|node| node.into_text()).collect();
        let error =
            SyntaxNode::error(SyntaxError::new("maximum nesting depth exceeded"), text);
        self.nodes.insert(m.0, error);
    }
}

/// Error handling.
impl<'s> Parser<'s> {
    /// Eat the given kind or produce an error at the current position.
    fn expect(&mut self, kind: SyntaxKind) -> bool {
        let at = self.at(kind);
        if at {
            self.eat();
        } else if kind == SyntaxKind::Ident && self.token.kind.is_keyword() {
            self.trim_errors();
            self.token.node.expected(kind.name());
            self.eat();
        } else {
            self.balanced &= !kind.is_grouping();
            self.expected(kind.name());
        }
        at
    }

    /// Produce an error that the given thing was expected.
    fn expected(&mut self, thing: &str) {
        self.trim_errors();
        self.expected_at(self.before_trivia(), thing);
    }

    /// Insert a zero-width error that the given thing was expected at the
    /// marker position.
    fn expected_at(&mut self, m: Marker, thing: &str) {
        let error =
            SyntaxNode::error(SyntaxError::new(format!("expected {thing}")), "");
        self.nodes.insert(m.0, error);
    }

    /// Eat the given closing delimiter or mark the opener node at `open`
    /// as unclosed.
    fn expect_closing_delimiter(&mut self, open: Marker, kind: SyntaxKind) {
        if !self.eat_if(kind) {
            self.nodes[open.0].convert_to_error("unclosed delimiter");
            self.balanced = false;
        }
    }

    /// Consume the current token and turn it into an error stating that it
    /// was unexpected.
    fn unexpected(&mut self) {
        self.trim_errors();
        self.balanced &= !self.token.kind.is_grouping();
        self.token.node.unexpected();
        self.eat();
    }

    /// Attach a hint to the most recent node, if it is an error.
    fn hint(&mut self, hint: &str) {
        let m = self.before_trivia();
        if m.0 > 0 {
            if let Some(node) = self.nodes.get_mut(m.0 - 1) {
                node.hint(hint);
            }
        }
    }

    /// Collapse a run of zero-width trailing errors before the current
    /// token, to avoid error cascades.
    fn trim_errors(&mut self) {
        let Marker(end) = self.before_trivia();
        let mut start = end;
        while start > 0
            && self.nodes[start - 1].kind().is_error()
            && self.nodes[start - 1].is_empty()
        {
            start -= 1;
        }
        self.nodes.drain(start..end);
    }
}

/// Memoization.
impl<'s> Parser<'s> {
    /// Take a snapshot of the parser position.
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            node_len: self.nodes.len(),
            state: PartialState {
                cursor: self.lexer.cursor(),
                lex_mode: self.lexer.mode(),
                token: self.token.clone(),
            },
        }
    }

    /// Roll the parser back to a checkpoint.
    fn restore(&mut self, checkpoint: Checkpoint) {
        self.nodes.truncate(checkpoint.node_len);
        self.restore_partial(checkpoint.state);
    }

    /// Roll back the lexer and token without touching the node buffer.
    fn restore_partial(&mut self, state: PartialState) {
        self.lexer.jump(state.cursor);
        self.lexer.set_mode(state.lex_mode);
        self.token = state.token;
    }

    /// Either replay a memoized parse at the current offset, or hand out
    /// the key and checkpoint needed to memoize a fresh one. Returns
    /// `None` when a memoized result was replayed.
    fn restore_memo_or_checkpoint(&mut self) -> Option<(usize, Checkpoint)> {
        let key = self.current_start();
        match self.memo.map.get(&key).cloned() {
            Some((range, state)) => {
                self.nodes.extend_from_slice(&self.memo.arena[range]);
                // The node buffer may have changed since the memoized
                // parse, so only the partial state is restored.
                self.restore_partial(state);
                None
            }
            None => Some((key, self.checkpoint())),
        }
    }

    /// Store the nodes parsed since `prev_len` and the current state under
    /// the given key.
    fn memoize_parsed_nodes(&mut self, key: usize, prev_len: usize) {
        let Checkpoint { node_len, state } = self.checkpoint();
        let start = self.memo.arena.len();
        self.memo.arena.extend_from_slice(&self.nodes[prev_len..node_len]);
        let range = start..self.memo.arena.len();
        self.memo.map.insert(key, (range, state));
    }
}

impl Index<Marker> for Parser<'_> {
    type Output = SyntaxNode;

    fn index(&self, m: Marker) -> &Self::Output {
        &self.nodes[m.0]
    }
}

impl IndexMut<Marker> for Parser<'_> {
    fn index_mut(&mut self, m: Marker) -> &mut Self::Output {
        &mut self.nodes[m.0]
    }
}
