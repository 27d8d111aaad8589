//! Math productions: atoms, fractions, attachments, primes, roots,
//! delimited groups, and implicit function calls.

use vellum_common::{syntax_set, SyntaxKind, SyntaxSet};

use super::code::embedded_code_expr;
use super::{set, Marker, Parser};

/// Precedence of fractions (`/`), left-associative.
const FRAC_PREC: usize = 1;
/// Precedence of attachments (`^`, `_`) and primes, right-associative.
const ATTACH_PREC: usize = 2;

/// Parses math markup, wrapping it in a `Math` node.
pub(crate) fn math(p: &mut Parser, stop_set: SyntaxSet) {
    let m = p.marker();
    math_exprs(p, stop_set);
    p.wrap(m, SyntaxKind::Math);
}

/// Parses a sequence of math expressions until a kind in the stop set.
pub(crate) fn math_exprs(p: &mut Parser, stop_set: SyntaxSet) {
    debug_assert!(stop_set.contains(SyntaxKind::End));
    while !p.at_set(stop_set) {
        if p.at_set(set::MATH_EXPR) {
            math_expr(p);
        } else {
            p.unexpected();
        }
    }
}

/// Parses a single math expression.
fn math_expr(p: &mut Parser) {
    math_expr_prec(p, 0, SyntaxKind::End);
}

/// Parses a math expression with at least the given precedence.
fn math_expr_prec(p: &mut Parser, min_prec: usize, stop: SyntaxKind) {
    if !p.enter_depth() {
        p.overflow();
        p.exit_depth();
        return;
    }
    math_expr_prec_inner(p, min_prec, stop);
    p.exit_depth();
}

fn math_expr_prec_inner(p: &mut Parser, min_prec: usize, stop: SyntaxKind) {
    let m = p.marker();
    match p.current() {
        SyntaxKind::Hash => embedded_code_expr(p),

        SyntaxKind::MathIdent | SyntaxKind::FieldAccess => {
            p.eat();
            // An identifier directly followed by parens is a call.
            if min_prec < ATTACH_PREC + 1 && p.directly_at(SyntaxKind::LeftParen) {
                math_args(p);
                p.wrap(m, SyntaxKind::FuncCall);
            }
        }

        // Punctuation that found no syntactic role becomes a plain atom.
        SyntaxKind::Dot
        | SyntaxKind::Comma
        | SyntaxKind::Semicolon
        | SyntaxKind::RightParen
        | SyntaxKind::RightBrace => p.convert_and_eat(SyntaxKind::MathText),

        SyntaxKind::Text
        | SyntaxKind::MathText
        | SyntaxKind::MathShorthand
        | SyntaxKind::Linebreak
        | SyntaxKind::MathAlignPoint
        | SyntaxKind::Escape
        | SyntaxKind::Str => p.eat(),

        // A run of primes with no base to attach to.
        SyntaxKind::MathPrimes => p.eat(),

        SyntaxKind::Root if min_prec <= ATTACH_PREC => {
            p.eat();
            let m2 = p.marker();
            math_expr_prec(p, ATTACH_PREC, stop);
            math_unparen(p, m2);
            p.wrap(m, SyntaxKind::MathRoot);
        }
        // A root in attachment position stays an atom.
        SyntaxKind::Root => p.convert_and_eat(SyntaxKind::MathText),

        SyntaxKind::LeftParen | SyntaxKind::LeftBrace => math_delimited(p),

        // Operators in primary position are atoms too.
        SyntaxKind::Slash | SyntaxKind::Hat | SyntaxKind::Underscore => {
            p.convert_and_eat(SyntaxKind::MathText)
        }

        _ => p.unexpected(),
    }

    loop {
        if p.end() || p.at(stop) {
            break;
        }

        // Primes directly attach to whatever came before them.
        if p.directly_at(SyntaxKind::MathPrimes) && ATTACH_PREC >= min_prec {
            p.eat();
            p.wrap(m, SyntaxKind::MathAttach);
            continue;
        }

        let (kind, prec, right_assoc) = match p.current() {
            SyntaxKind::Slash => (SyntaxKind::MathFrac, FRAC_PREC, false),
            SyntaxKind::Hat | SyntaxKind::Underscore => {
                (SyntaxKind::MathAttach, ATTACH_PREC, true)
            }
            _ => break,
        };

        if prec < min_prec {
            break;
        }
        let next_prec = if right_assoc { prec } else { prec + 1 };

        // Fraction operands lose their parens.
        if kind == SyntaxKind::MathFrac {
            math_unparen(p, m);
        }

        p.eat();
        let m2 = p.marker();
        math_expr_prec(p, next_prec, stop);
        math_unparen(p, m2);
        p.wrap(m, kind);
    }
}

/// Parses matched delimiters in math: `[x + y]`. If no closing delimiter
/// turns up, the opening one becomes a plain atom and its would-be
/// content stays as siblings.
fn math_delimited(p: &mut Parser) {
    let m = p.marker();
    p.eat(); // The opening delimiter.
    let m2 = p.marker();
    while !p.at_set(syntax_set!(Dollar, RightParen, RightBrace, End)) {
        if p.at_set(set::MATH_EXPR) {
            math_expr(p);
        } else {
            p.unexpected();
        }
    }

    if p.at(SyntaxKind::RightParen) || p.at(SyntaxKind::RightBrace) {
        p.wrap(m2, SyntaxKind::Math);
        p.eat();
        p.wrap(m, SyntaxKind::MathDelimited);
    } else {
        p[m].convert_to_kind(SyntaxKind::MathText);
    }
}

/// Strips the delimiters of a parenthesized group at the marker, so that
/// `(a+b)/2` divides the sum and not a parenthesized content.
fn math_unparen(p: &mut Parser, m: Marker) {
    let Some(node) = p.nodes.get_mut(m.0) else { return };
    if node.kind() != SyntaxKind::MathDelimited {
        return;
    }

    if let [first, .., last] = node.children_mut() {
        if first.text() == "(" && last.text() == ")" {
            node.convert_to_kind(SyntaxKind::Math);
        }
    }
}

/// Parses an argument list in math: `(a, b; c, d; size: #50%)`.
///
/// Commas separate positional arguments, semicolons separate rows, which
/// promotes the arguments to implicit arrays. Named and spread arguments
/// can't be recognized from math tokens alone, so the lexer is queried
/// for a limited lookahead at the start of each argument.
fn math_args(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::LeftParen);

    let mut has_arrays = false;
    let mut array = p.marker();
    let mut arg = p.marker();

    while !p.at_set(syntax_set!(Dollar, End)) && !p.at(SyntaxKind::RightParen) {
        // Named argument: `size:`.
        if let Some(node) = p.lexer_named_arg_lookahead() {
            p.adopt_lexed(SyntaxKind::Ident, node);
            p.convert_and_eat(SyntaxKind::Colon);
            math_arg_exprs(p);
            p.wrap(arg, SyntaxKind::Named);
        } else if let Some(node) = p.lexer_spread_arg_lookahead() {
            // Spread argument: `..args`.
            p.adopt_lexed(SyntaxKind::Dots, node);
            math_arg_exprs(p);
            p.wrap(arg, SyntaxKind::Spread);
        } else {
            math_arg_exprs(p);
        }

        match p.current() {
            SyntaxKind::Comma => {
                p.eat();
                arg = p.marker();
            }
            SyntaxKind::Semicolon => {
                // A row: wrap everything since the row start as an array.
                p.wrap(array, SyntaxKind::Array);
                has_arrays = true;
                p.eat();
                array = p.marker();
                arg = p.marker();
            }
            _ => {}
        }
    }

    // Trailing row of a matrix-shaped argument list.
    if has_arrays && array != p.before_trivia() {
        p.wrap(array, SyntaxKind::Array);
    }

    p.expect_closing_delimiter(m, SyntaxKind::RightParen);
    p.wrap(m, SyntaxKind::Args);
}

/// Parses the math expressions of one argument, wrapping them in a `Math`
/// node unless the argument is exactly one expression.
fn math_arg_exprs(p: &mut Parser) {
    let m = p.marker();
    let mut count = 0;
    while !p.at_set(syntax_set!(Comma, Semicolon, Dollar, End))
        && !p.at(SyntaxKind::RightParen)
    {
        if p.at_set(set::MATH_EXPR) {
            math_expr(p);
            count += 1;
        } else {
            p.unexpected();
        }
    }
    if count != 1 {
        p.wrap(m, SyntaxKind::Math);
    }
}
