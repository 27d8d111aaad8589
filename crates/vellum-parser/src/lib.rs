//! Parser and source management for the Vellum typesetting language.
//!
//! The centerpiece is a lossless concrete syntax tree: parsing reproduces
//! the input byte-for-byte, errors become nodes instead of aborting, and
//! every node receives a stable span identity that survives edits far away
//! from it. [`Source`] ties a file's text, tree, and line index together
//! and refreshes them incrementally on [`edit`](Source::edit).
//!
//! Standalone entry points are available for consumers that manage text
//! themselves: [`parse`], [`parse_code`], [`parse_math`], and the
//! incremental primitives [`reparse_block`] and [`reparse_markup`].

mod parser;
mod reparser;
mod source;

pub use vellum_common::{
    is_newline, FileId, LinkedChildren, LinkedNode, Lines, NumberingResult, Side,
    Span, SyntaxError, SyntaxKind, SyntaxNode, SyntaxSet, Unnumberable,
};
pub use vellum_lexer::SyntaxMode;

pub use crate::parser::{parse, parse_code, parse_math, reparse_block, reparse_markup};
pub use crate::reparser::reparse;
pub use crate::source::Source;
