//! Shared syntax vocabulary for the Vellum front-end.
//!
//! This crate holds everything both the lexer and the parser speak:
//! the [`SyntaxKind`] enumeration and [`SyntaxSet`] bitsets, the packed
//! [`Span`] identity codec and the [`FileId`] interner, the lossless
//! [`SyntaxNode`] tree with its [`LinkedNode`] traversal view, and the
//! [`Lines`] index mapping between bytes, characters, and UTF-16 offsets.

pub mod file;
pub mod kind;
pub mod lines;
pub mod node;
pub mod set;
pub mod span;

pub use crate::file::FileId;
pub use crate::kind::SyntaxKind;
pub use crate::lines::{is_newline, Lines};
pub use crate::node::{LinkedChildren, LinkedNode, Side, SyntaxError, SyntaxNode};
pub use crate::set::SyntaxSet;
pub use crate::span::{NumberingResult, Span, Unnumberable};
