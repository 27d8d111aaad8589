//! SyntaxKind enum for the Vellum CST.
//!
//! One flat vocabulary shared by the lexer and the parser: token kinds
//! (leaves) and composite node kinds live in the same enum so that a node's
//! kind can be converted in place during error recovery. Every kind fits in
//! a byte. Kinds that participate in [`SyntaxSet`](crate::set::SyntaxSet)
//! bitsets must keep their discriminant below 128, so token kinds come
//! first and pure container kinds are listed at the end.

use serde::Serialize;

/// Every kind of syntax element in the Vellum CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum SyntaxKind {
    // ── Trivia and sentinels ───────────────────────────────────────────
    /// The end of the token stream.
    End = 0,
    /// An invalid sequence of characters.
    Error,
    /// A shebang line at the very start of the file: `#!/usr/bin/vellum`.
    Shebang,
    /// A line comment: `// hi`.
    LineComment,
    /// A block comment: `/* hi */`.
    BlockComment,
    /// A run of whitespace with fewer than two newlines.
    Space,
    /// A run of whitespace in markup containing two or more newlines.
    Parbreak,

    // ── Markup tokens ──────────────────────────────────────────────────
    /// Plain text without markup.
    Text,
    /// A forced line break: `\`.
    Linebreak,
    /// An escape sequence: `\#`, `\u{1F600}`.
    Escape,
    /// A shorthand for a unicode codepoint: `~`, `---`.
    Shorthand,
    /// A smart quote: `'` or `"`.
    SmartQuote,
    /// Raw text with optional syntax highlighting: `` `...` ``. The only
    /// inner node produced by the lexer.
    Raw,
    /// A language tag at the start of blocky raw text: ``typ ``.
    RawLang,
    /// A raw delimiter consisting of 1 or 3+ backticks.
    RawDelim,
    /// A sequence of whitespace characters trimmed from raw text.
    RawTrimmed,
    /// A hyperlink: `https://vellum.dev`.
    Link,
    /// A label: `<intro>`.
    Label,
    /// A reference marker: `@intro`.
    RefMarker,
    /// A section heading marker: `=`, `==`, ...
    HeadingMarker,
    /// A bullet list marker: `-`.
    ListMarker,
    /// A numbered list marker: `+` or `3.`.
    EnumMarker,
    /// A term list marker: `/`.
    TermMarker,

    // ── Math tokens ────────────────────────────────────────────────────
    /// A piece of math text, a single letter or a number.
    MathText,
    /// An identifier in math: `pi`.
    MathIdent,
    /// A shorthand for a unicode codepoint in math: `->`.
    MathShorthand,
    /// An alignment point in math: `&`.
    MathAlignPoint,
    /// A prime or run of primes in math: `'''`.
    MathPrimes,

    // ── Punctuation and operators ──────────────────────────────────────
    /// A hash that switches into code mode: `#`.
    Hash,
    /// A left curly brace: `{`.
    LeftBrace,
    /// A right curly brace: `}`.
    RightBrace,
    /// A left square bracket: `[`.
    LeftBracket,
    /// A right square bracket: `]`.
    RightBracket,
    /// A left round paren: `(`.
    LeftParen,
    /// A right round paren: `)`.
    RightParen,
    /// A comma: `,`.
    Comma,
    /// A semicolon: `;`.
    Semicolon,
    /// A colon: `:`.
    Colon,
    /// A star: `*`. Toggles strong markup or multiplies.
    Star,
    /// An underscore: `_`. Toggles emphasized markup or is a wildcard.
    Underscore,
    /// A dollar sign that delimits an equation: `$`.
    Dollar,
    /// A plus: `+`.
    Plus,
    /// A minus or hyphen: `-`.
    Minus,
    /// A slash: `/`.
    Slash,
    /// A hat in math: `^`.
    Hat,
    /// A dot: `.`.
    Dot,
    /// An equals sign: `=`.
    Eq,
    /// A double equal: `==`.
    EqEq,
    /// An exclamation mark followed by an equals sign: `!=`.
    ExclEq,
    /// A less-than sign: `<`.
    Lt,
    /// A less-than-or-equal sign: `<=`.
    LtEq,
    /// A greater-than sign: `>`.
    Gt,
    /// A greater-than-or-equal sign: `>=`.
    GtEq,
    /// A plus followed by an equals sign: `+=`.
    PlusEq,
    /// A hyphen followed by an equals sign: `-=`.
    HyphEq,
    /// A star followed by an equals sign: `*=`.
    StarEq,
    /// A slash followed by an equals sign: `/=`.
    SlashEq,
    /// Two dots: `..`. Spreads arguments or collects a rest pattern.
    Dots,
    /// An arrow between a closure's parameters and body: `=>`.
    Arrow,
    /// A root in math: `√`, `∛`, `∜`.
    Root,

    // ── Keywords ───────────────────────────────────────────────────────
    /// The `not` operator.
    Not,
    /// The short-circuiting `and` operator.
    And,
    /// The short-circuiting `or` operator.
    Or,
    /// The none literal: `none`.
    None,
    /// The auto literal: `auto`.
    Auto,
    /// The `let` keyword.
    Let,
    /// The `set` keyword.
    Set,
    /// The `show` keyword.
    Show,
    /// The `context` keyword.
    Context,
    /// The `if` keyword.
    If,
    /// The `else` keyword.
    Else,
    /// The `for` keyword.
    For,
    /// The `in` keyword.
    In,
    /// The `while` keyword.
    While,
    /// The `break` keyword.
    Break,
    /// The `continue` keyword.
    Continue,
    /// The `return` keyword.
    Return,
    /// The `import` keyword.
    Import,
    /// The `include` keyword.
    Include,
    /// The `as` keyword.
    As,

    // ── Code tokens ────────────────────────────────────────────────────
    /// An identifier: `it`.
    Ident,
    /// A boolean: `true`, `false`.
    Bool,
    /// An integer: `120`.
    Int,
    /// A floating-point number: `1.2`, `10e-4`.
    Float,
    /// A numeric value with a unit: `12pt`, `3cm`, `50%`.
    Numeric,
    /// A quoted string: `"..."`.
    Str,
    /// A field access (also produced whole by the lexer in math): `x.y`.
    FieldAccess,

    // ── Markup nodes ───────────────────────────────────────────────────
    /// The contents of a file or content block.
    Markup,
    /// Strong content: `*Strong*`.
    Strong,
    /// Emphasized content: `_Emphasized_`.
    Emph,
    /// A section heading: `= Introduction`.
    Heading,
    /// An item of a bullet list: `- ...`.
    ListItem,
    /// An item of a numbered list: `+ ...` or `1. ...`.
    EnumItem,
    /// An item of a term list: `/ Term: Details`.
    TermItem,
    /// A reference with an optional supplement: `@target[..]`.
    Ref,
    /// A mathematical equation: `$x$`, `$ x^2 $`.
    Equation,

    // ── Math nodes ─────────────────────────────────────────────────────
    /// The contents of a mathematical equation: `x^2 + 1`.
    Math,
    /// Matched delimiters in math: `[x + y]`.
    MathDelimited,
    /// A base with optional attachments in math: `a_1^2`.
    MathAttach,
    /// A fraction in math: `x/2`.
    MathFrac,
    /// A root in math: `√x`.
    MathRoot,

    // ── Code nodes ─────────────────────────────────────────────────────
    /// The contents of a code block.
    Code,
    /// A code block: `{ let x = 1; x + 2 }`.
    CodeBlock,
    /// A content block: `[*Hi* there!]`.
    ContentBlock,
    /// A grouped expression: `(1 + 2)`.
    Parenthesized,
    /// An array of expressions: `(1, "hi", 12cm)`.
    Array,
    /// A dictionary: `(thickness: 3pt, dash: "solid")`.
    Dict,
    /// A named pair: `thickness: 3pt`.
    Named,
    /// A keyed pair: `"spacy key": true`.
    Keyed,
    /// A unary operation: `-x`.
    Unary,
    /// A binary operation: `a + b`.
    Binary,
    /// An invocation of a function or method: `f(x, y)`.
    FuncCall,
    /// A function call's argument list: `(12pt, y)`.
    Args,
    /// Spread arguments or an argument sink: `..x`.
    Spread,
    /// A closure: `(x, y) => z`.
    Closure,
    /// A closure's parameters: `(x, y)`.
    Params,
    /// A let binding: `let x = 1`.
    LetBinding,
    /// A set rule: `set text(...)`.
    SetRule,
    /// A show rule: `show heading: it => emph(it.body)`.
    ShowRule,
    /// A contextual expression: `context text.lang`.
    Contextual,
    /// An if-else conditional: `if x { y } else { z }`.
    Conditional,
    /// A while loop: `while x { y }`.
    WhileLoop,
    /// A for loop: `for x in y { z }`.
    ForLoop,
    /// A module import: `import "utils.vel": a, b, c`.
    ModuleImport,
    /// Items to import from a module: `a, b, c`.
    ImportItems,
    /// A renamed import item: `a as one`.
    RenamedImportItem,
    /// A module include: `include "chapter1.vel"`.
    ModuleInclude,
    /// A break from a loop: `break`.
    LoopBreak,
    /// A continue in a loop: `continue`.
    LoopContinue,
    /// A return from a function: `return x + 1`.
    FuncReturn,
    /// A destructuring pattern: `(x, _, ..y)`.
    Destructuring,
    /// A destructuring assignment expression: `(x, y) = (1, 2)`.
    DestructAssignment,
}

impl SyntaxKind {
    /// Whether this kind is a comment, whitespace, or shebang line. Trivia
    /// is part of the tree but skipped over by the parser in code and math.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Shebang
                | Self::LineComment
                | Self::BlockComment
                | Self::Space
                | Self::Parbreak
        )
    }

    /// Whether this kind is a keyword.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::Not
                | Self::And
                | Self::Or
                | Self::None
                | Self::Auto
                | Self::Let
                | Self::Set
                | Self::Show
                | Self::Context
                | Self::If
                | Self::Else
                | Self::For
                | Self::In
                | Self::While
                | Self::Break
                | Self::Continue
                | Self::Return
                | Self::Import
                | Self::Include
                | Self::As
        )
    }

    /// Whether this kind is a delimiter that opens or closes a group.
    pub fn is_grouping(self) -> bool {
        matches!(
            self,
            Self::LeftBracket
                | Self::LeftBrace
                | Self::LeftParen
                | Self::RightBracket
                | Self::RightBrace
                | Self::RightParen
        )
    }

    /// Whether this kind ends a grouping or the token stream.
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Self::End
                | Self::Semicolon
                | Self::RightBrace
                | Self::RightParen
                | Self::RightBracket
        )
    }

    /// Whether this kind is a code statement node. Statements may omit the
    /// semicolon between themselves and a following expression.
    pub fn is_stmt(self) -> bool {
        matches!(
            self,
            Self::LetBinding
                | Self::SetRule
                | Self::ShowRule
                | Self::ModuleImport
                | Self::ModuleInclude
        )
    }

    /// Whether this kind is a code or content block node.
    pub fn is_block(self) -> bool {
        matches!(self, Self::CodeBlock | Self::ContentBlock)
    }

    /// Whether this kind is the error kind.
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    /// A human-readable name for the kind, used by default error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::End => "end of tokens",
            Self::Error => "syntax error",
            Self::Shebang => "shebang",
            Self::LineComment => "line comment",
            Self::BlockComment => "block comment",
            Self::Space => "space",
            Self::Parbreak => "paragraph break",
            Self::Text => "text",
            Self::Linebreak => "line break",
            Self::Escape => "escape sequence",
            Self::Shorthand => "shorthand",
            Self::SmartQuote => "smart quote",
            Self::Raw => "raw block",
            Self::RawLang => "raw language tag",
            Self::RawDelim => "raw delimiter",
            Self::RawTrimmed => "raw trimmed",
            Self::Link => "link",
            Self::Label => "label",
            Self::RefMarker => "reference marker",
            Self::HeadingMarker => "heading marker",
            Self::ListMarker => "list marker",
            Self::EnumMarker => "enum marker",
            Self::TermMarker => "term marker",
            Self::MathText => "math text",
            Self::MathIdent => "math identifier",
            Self::MathShorthand => "math shorthand",
            Self::MathAlignPoint => "math alignment point",
            Self::MathPrimes => "math primes",
            Self::Hash => "hash",
            Self::LeftBrace => "opening brace",
            Self::RightBrace => "closing brace",
            Self::LeftBracket => "opening bracket",
            Self::RightBracket => "closing bracket",
            Self::LeftParen => "opening paren",
            Self::RightParen => "closing paren",
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Colon => "colon",
            Self::Star => "star",
            Self::Underscore => "underscore",
            Self::Dollar => "dollar sign",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Slash => "slash",
            Self::Hat => "hat",
            Self::Dot => "dot",
            Self::Eq => "equals sign",
            Self::EqEq => "equality operator",
            Self::ExclEq => "inequality operator",
            Self::Lt => "less-than operator",
            Self::LtEq => "less-than or equal operator",
            Self::Gt => "greater-than operator",
            Self::GtEq => "greater-than or equal operator",
            Self::PlusEq => "add-assign operator",
            Self::HyphEq => "subtract-assign operator",
            Self::StarEq => "multiply-assign operator",
            Self::SlashEq => "divide-assign operator",
            Self::Dots => "dots",
            Self::Arrow => "arrow",
            Self::Root => "root",
            Self::Not => "operator `not`",
            Self::And => "operator `and`",
            Self::Or => "operator `or`",
            Self::None => "`none`",
            Self::Auto => "`auto`",
            Self::Let => "keyword `let`",
            Self::Set => "keyword `set`",
            Self::Show => "keyword `show`",
            Self::Context => "keyword `context`",
            Self::If => "keyword `if`",
            Self::Else => "keyword `else`",
            Self::For => "keyword `for`",
            Self::In => "keyword `in`",
            Self::While => "keyword `while`",
            Self::Break => "keyword `break`",
            Self::Continue => "keyword `continue`",
            Self::Return => "keyword `return`",
            Self::Import => "keyword `import`",
            Self::Include => "keyword `include`",
            Self::As => "keyword `as`",
            Self::Ident => "identifier",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Numeric => "numeric value",
            Self::Str => "string",
            Self::FieldAccess => "field access",
            Self::Markup => "markup",
            Self::Strong => "strong content",
            Self::Emph => "emphasized content",
            Self::Heading => "heading",
            Self::ListItem => "list item",
            Self::EnumItem => "enum item",
            Self::TermItem => "term list item",
            Self::Ref => "reference",
            Self::Equation => "equation",
            Self::Math => "math",
            Self::MathDelimited => "delimited math",
            Self::MathAttach => "math attachments",
            Self::MathFrac => "math fraction",
            Self::MathRoot => "math root",
            Self::Code => "code",
            Self::CodeBlock => "code block",
            Self::ContentBlock => "content block",
            Self::Parenthesized => "group",
            Self::Array => "array",
            Self::Dict => "dictionary",
            Self::Named => "named pair",
            Self::Keyed => "keyed pair",
            Self::Unary => "unary expression",
            Self::Binary => "binary expression",
            Self::FuncCall => "function call",
            Self::Args => "call arguments",
            Self::Spread => "spread",
            Self::Closure => "closure",
            Self::Params => "closure parameters",
            Self::LetBinding => "`let` expression",
            Self::SetRule => "`set` expression",
            Self::ShowRule => "`show` expression",
            Self::Contextual => "`context` expression",
            Self::Conditional => "`if` expression",
            Self::WhileLoop => "while-loop expression",
            Self::ForLoop => "for-loop expression",
            Self::ModuleImport => "`import` expression",
            Self::ImportItems => "import items",
            Self::RenamedImportItem => "renamed import item",
            Self::ModuleInclude => "`include` expression",
            Self::LoopBreak => "`break` expression",
            Self::LoopContinue => "`continue` expression",
            Self::FuncReturn => "`return` expression",
            Self::Destructuring => "destructuring pattern",
            Self::DestructAssignment => "destructuring assignment expression",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_fit_in_a_byte() {
        // The last variant bounds every discriminant.
        assert!((SyntaxKind::DestructAssignment as u16) < 256);
    }

    #[test]
    fn token_kinds_stay_below_the_set_limit() {
        // Everything up to and including the token kinds must be usable in
        // a `SyntaxSet`; only trailing container kinds may exceed 128.
        assert!((SyntaxKind::FieldAccess as u8) < 128);
        assert!((SyntaxKind::Root as u8) < 128);
        assert!((SyntaxKind::As as u8) < 128);
    }

    #[test]
    fn predicates_are_disjoint_where_expected() {
        assert!(SyntaxKind::Space.is_trivia());
        assert!(SyntaxKind::Shebang.is_trivia());
        assert!(!SyntaxKind::Text.is_trivia());
        assert!(SyntaxKind::Let.is_keyword());
        assert!(!SyntaxKind::Ident.is_keyword());
        assert!(SyntaxKind::LeftParen.is_grouping());
        assert!(SyntaxKind::RightBracket.is_terminator());
        assert!(SyntaxKind::LetBinding.is_stmt());
        assert!(SyntaxKind::CodeBlock.is_block());
        assert!(SyntaxKind::Error.is_error());
    }
}
