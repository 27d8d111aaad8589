//! Markup productions: text, headings, lists, emphasis, references, and
//! the entry into equations and embedded code.

use vellum_common::{syntax_set, SyntaxKind, SyntaxSet};
use vellum_lexer::SyntaxMode;

use super::code::embedded_code_expr;
use super::math::math;
use super::{AtNewline, Parser};

/// Parses a sequence of markup expressions until a kind in the stop set
/// turns up at the top nesting level.
pub(crate) fn markup_exprs(p: &mut Parser, mut at_start: bool, stop_set: SyntaxSet) {
    debug_assert!(stop_set.contains(SyntaxKind::End));
    at_start |= p.had_newline();
    let mut nesting: usize = 0;
    // A right-bracket in the stop set only stops at the top nesting level.
    while !p.at_set(stop_set) || (nesting > 0 && p.at(SyntaxKind::RightBracket)) {
        markup_expr(p, at_start, &mut nesting);
        at_start = p.had_newline();
    }
}

/// Parses markup with a newline mode, wrapping it in a `Markup` node.
/// Used for the bodies of headings, list items, strong, and emphasis.
fn markup(p: &mut Parser, at_start: bool, nl_mode: AtNewline, stop_set: SyntaxSet) {
    let m = p.marker();
    if p.enter_depth() {
        p.with_nl_mode(nl_mode, |p| markup_exprs(p, at_start, stop_set));
    } else {
        p.overflow();
    }
    p.exit_depth();
    p.wrap(m, SyntaxKind::Markup);
}

/// Parses a single markup expression, dispatching on the current token.
pub(crate) fn markup_expr(p: &mut Parser, at_start: bool, nesting: &mut usize) {
    match p.current() {
        SyntaxKind::Text
        | SyntaxKind::Linebreak
        | SyntaxKind::Escape
        | SyntaxKind::Shorthand
        | SyntaxKind::SmartQuote
        | SyntaxKind::Link
        | SyntaxKind::Label => p.eat(),

        // The lexer built the whole raw node already.
        SyntaxKind::Raw => p.eat(),

        SyntaxKind::Hash => embedded_code_expr(p),
        SyntaxKind::Star => strong(p),
        SyntaxKind::Underscore => emph(p),
        SyntaxKind::HeadingMarker if at_start => heading(p),
        SyntaxKind::ListMarker if at_start => list_item(p),
        SyntaxKind::EnumMarker if at_start => enum_item(p),
        SyntaxKind::TermMarker if at_start => term_item(p),
        SyntaxKind::RefMarker => reference(p),
        SyntaxKind::Dollar => equation(p),

        // Brackets in markup nest without recursing; the markers and colon
        // are plain text when they don't begin a construct.
        SyntaxKind::LeftBracket => {
            *nesting += 1;
            p.convert_and_eat(SyntaxKind::Text);
        }
        SyntaxKind::RightBracket if *nesting > 0 => {
            *nesting -= 1;
            p.convert_and_eat(SyntaxKind::Text);
        }

        SyntaxKind::HeadingMarker
        | SyntaxKind::ListMarker
        | SyntaxKind::EnumMarker
        | SyntaxKind::TermMarker
        | SyntaxKind::Colon => p.convert_and_eat(SyntaxKind::Text),

        SyntaxKind::RightBracket => {
            p.unexpected();
            p.hint("try using a backslash escape: \\]");
        }

        SyntaxKind::End => {}
        _ => p.unexpected(),
    }
}

/// Parses strong content: `*Strong*`.
fn strong(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Star);
    markup(
        p,
        false,
        AtNewline::StopParBreak,
        syntax_set!(Star, RightBracket, End),
    );
    p.expect_closing_delimiter(m, SyntaxKind::Star);
    p.wrap(m, SyntaxKind::Strong);
}

/// Parses emphasized content: `_Emphasized_`.
fn emph(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Underscore);
    markup(
        p,
        false,
        AtNewline::StopParBreak,
        syntax_set!(Underscore, RightBracket, End),
    );
    p.expect_closing_delimiter(m, SyntaxKind::Underscore);
    p.wrap(m, SyntaxKind::Emph);
}

/// Parses a section heading: `= Introduction`. The body ends at the next
/// label or newline.
fn heading(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::HeadingMarker);
    markup(p, false, AtNewline::Stop, syntax_set!(Label, RightBracket, End));
    p.wrap(m, SyntaxKind::Heading);
}

/// Parses a bullet list item: `- ...`. Sub-items continue as long as they
/// are indented beyond the marker.
fn list_item(p: &mut Parser) {
    let m = p.marker();
    let min_col = p.current_column();
    p.assert(SyntaxKind::ListMarker);
    markup(p, false, AtNewline::RequireColumn(min_col), syntax_set!(RightBracket, End));
    p.wrap(m, SyntaxKind::ListItem);
}

/// Parses a numbered list item: `+ ...` or `1. ...`.
fn enum_item(p: &mut Parser) {
    let m = p.marker();
    let min_col = p.current_column();
    p.assert(SyntaxKind::EnumMarker);
    markup(p, false, AtNewline::RequireColumn(min_col), syntax_set!(RightBracket, End));
    p.wrap(m, SyntaxKind::EnumItem);
}

/// Parses a term list item: `/ Term: Details`.
fn term_item(p: &mut Parser) {
    let m = p.marker();
    let min_col = p.current_column();
    p.assert(SyntaxKind::TermMarker);
    markup(p, false, AtNewline::Stop, syntax_set!(Colon, RightBracket, End));
    p.expect(SyntaxKind::Colon);
    markup(p, false, AtNewline::RequireColumn(min_col), syntax_set!(RightBracket, End));
    p.wrap(m, SyntaxKind::TermItem);
}

/// Parses a reference: `@target`, with an optional supplement content
/// block directly attached.
fn reference(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::RefMarker);
    if p.directly_at(SyntaxKind::LeftBracket) {
        super::code::content_block(p);
    }
    p.wrap(m, SyntaxKind::Ref);
}

/// Parses a mathematical equation: `$x$`, `$ x^2 $`.
pub(super) fn equation(p: &mut Parser) {
    let m = p.marker();
    p.enter_modes(SyntaxMode::Math, AtNewline::Continue, |p| {
        p.assert(SyntaxKind::Dollar);
        math(p, syntax_set!(Dollar, End));
        p.expect_closing_delimiter(m, SyntaxKind::Dollar);
    });
    p.wrap(m, SyntaxKind::Equation);
}
