//! Code productions: expressions, statements, blocks, collections,
//! closures, and patterns.

use std::collections::HashSet;

use vellum_common::{syntax_set, SyntaxKind, SyntaxSet};
use vellum_lexer::SyntaxMode;

use super::markup::{self, equation};
use super::{set, AtNewline, Parser};

/// Precedence of unary `+`, `-`, and `not`.
const UNARY_PREC: usize = 7;
/// Precedence of `not in`, the same as the other comparisons.
const NOT_IN_PREC: usize = 3;

/// The precedence and associativity of a binary operator.
fn binary_op(kind: SyntaxKind) -> Option<(usize, bool)> {
    // `(precedence, right-associative)`
    Some(match kind {
        SyntaxKind::Star | SyntaxKind::Slash => (5, false),
        SyntaxKind::Plus | SyntaxKind::Minus => (4, false),
        SyntaxKind::EqEq
        | SyntaxKind::ExclEq
        | SyntaxKind::Lt
        | SyntaxKind::LtEq
        | SyntaxKind::Gt
        | SyntaxKind::GtEq
        | SyntaxKind::In => (3, false),
        SyntaxKind::And => (2, false),
        SyntaxKind::Or => (1, false),
        SyntaxKind::Eq
        | SyntaxKind::PlusEq
        | SyntaxKind::HyphEq
        | SyntaxKind::StarEq
        | SyntaxKind::SlashEq => (0, true),
        _ => return None,
    })
}

/// Parses code interspersed with semicolons and newlines, wrapping it in
/// a `Code` node.
pub(crate) fn code(p: &mut Parser, stop_set: SyntaxSet) {
    let m = p.marker();
    code_exprs(p, stop_set);
    p.wrap(m, SyntaxKind::Code);
}

/// Parses a sequence of code expressions.
pub(crate) fn code_exprs(p: &mut Parser, stop_set: SyntaxSet) {
    debug_assert!(stop_set.contains(SyntaxKind::End));
    while !p.at_set(stop_set) {
        p.with_nl_mode(AtNewline::ContextualContinue, |p| {
            if !p.at_set(set::CODE_EXPR) {
                p.unexpected();
                return;
            }
            code_expr(p);
            if !p.at_set(stop_set) && !p.eat_if(SyntaxKind::Semicolon) {
                p.expected("semicolon or line break");
                if p.at(SyntaxKind::Label) {
                    p.hint("labels can only be applied in markup mode");
                    p.hint("try wrapping your code in a markup block (`[ ]`)");
                }
            }
        });
    }
}

/// Parses a single code expression.
fn code_expr(p: &mut Parser) {
    code_expr_prec(p, false, 0)
}

/// Parses an embedded code expression in markup or math: `#let x = 1`.
pub(crate) fn embedded_code_expr(p: &mut Parser) {
    // The hash is eaten in the outer mode; only the expression after it is
    // lexed as code.
    p.assert(SyntaxKind::Hash);
    p.enter_modes(SyntaxMode::Code, AtNewline::Stop, |p| {
        if p.had_trivia() || p.end() {
            p.expected("expression");
            return;
        }

        let stmt = p.at_set(set::STMT);
        let at = p.at_set(set::ATOMIC_CODE_EXPR);
        code_expr_prec(p, true, 0);

        // Consume error for things like `#12p`.
        if !at && !p.current().is_trivia() && !p.end() {
            p.unexpected();
        }

        let semi = (stmt || p.directly_at(SyntaxKind::Semicolon))
            && p.eat_if(SyntaxKind::Semicolon);

        if stmt && !semi && !p.end() && !p.at(SyntaxKind::RightBracket) {
            p.expected("semicolon or line break");
            if p.at(SyntaxKind::Else) {
                p.hint("the `else` branch must begin on the same line as the `if` branch");
            }
        }
    });
}

/// Parses a code expression with at least the given precedence.
fn code_expr_prec(p: &mut Parser, atomic: bool, min_prec: usize) {
    if !p.enter_depth() {
        p.overflow();
        p.exit_depth();
        return;
    }
    code_expr_prec_inner(p, atomic, min_prec);
    p.exit_depth();
}

fn code_expr_prec_inner(p: &mut Parser, atomic: bool, min_prec: usize) {
    let m = p.marker();
    if !atomic && p.at_set(set::UNARY_OP) {
        p.eat();
        code_expr_prec(p, atomic, UNARY_PREC);
        p.wrap(m, SyntaxKind::Unary);
    } else {
        code_primary(p, atomic);
    }

    loop {
        // Calls and content-block arguments bind directly to the callee.
        if p.directly_at(SyntaxKind::LeftParen) || p.directly_at(SyntaxKind::LeftBracket)
        {
            args(p);
            p.wrap(m, SyntaxKind::FuncCall);
            continue;
        }

        // A field access continues even an atomic expression, but only
        // when the dot is directly attached.
        let at_field_or_method =
            p.directly_at(SyntaxKind::Dot) && p.lexer_peek() == SyntaxKind::Ident;

        if atomic && !at_field_or_method {
            break;
        }

        if p.eat_if(SyntaxKind::Dot) {
            p.expect(SyntaxKind::Ident);
            p.wrap(m, SyntaxKind::FieldAccess);
            continue;
        }

        let binop = if p.at_set(set::BINARY_OP) {
            binary_op(p.current())
        } else if min_prec <= NOT_IN_PREC && p.eat_if(SyntaxKind::Not) {
            if p.at(SyntaxKind::In) {
                Some((NOT_IN_PREC, false))
            } else {
                p.expected("keyword `in`");
                break;
            }
        } else {
            None
        };

        if let Some((prec, right_assoc)) = binop {
            if prec < min_prec {
                break;
            }

            let next_prec = if right_assoc { prec } else { prec + 1 };
            p.eat();
            code_expr_prec(p, false, next_prec);
            p.wrap(m, SyntaxKind::Binary);
            continue;
        }

        break;
    }
}

/// Parses a primary in a code expression.
fn code_primary(p: &mut Parser, atomic: bool) {
    let m = p.marker();
    match p.current() {
        SyntaxKind::Ident => {
            p.eat();
            if !atomic && p.at(SyntaxKind::Arrow) {
                p.wrap(m, SyntaxKind::Params);
                p.assert(SyntaxKind::Arrow);
                code_expr(p);
                p.wrap(m, SyntaxKind::Closure);
            }
        }
        SyntaxKind::Underscore if !atomic => {
            p.eat();
            if p.at(SyntaxKind::Arrow) {
                p.wrap(m, SyntaxKind::Params);
                p.eat();
                code_expr(p);
                p.wrap(m, SyntaxKind::Closure);
            } else if p.eat_if(SyntaxKind::Eq) {
                code_expr(p);
                p.wrap(m, SyntaxKind::DestructAssignment);
            } else {
                p[m].expected("expression");
            }
        }

        SyntaxKind::LeftBrace => code_block(p),
        SyntaxKind::LeftBracket => content_block(p),
        SyntaxKind::LeftParen => expr_with_paren(p, atomic),
        SyntaxKind::Dollar => equation(p),
        SyntaxKind::Let => let_binding(p),
        SyntaxKind::Set => set_rule(p),
        SyntaxKind::Show => show_rule(p),
        SyntaxKind::Context => contextual(p, atomic),
        SyntaxKind::If => conditional(p),
        SyntaxKind::While => while_loop(p),
        SyntaxKind::For => for_loop(p),
        SyntaxKind::Import => module_import(p),
        SyntaxKind::Include => module_include(p),
        SyntaxKind::Break => break_stmt(p),
        SyntaxKind::Continue => continue_stmt(p),
        SyntaxKind::Return => return_stmt(p),

        // The lexer built the whole raw node already.
        SyntaxKind::Raw => p.eat(),

        SyntaxKind::None
        | SyntaxKind::Auto
        | SyntaxKind::Int
        | SyntaxKind::Float
        | SyntaxKind::Bool
        | SyntaxKind::Numeric
        | SyntaxKind::Str => p.eat(),

        SyntaxKind::Label => {
            p.eat_and_get().convert_to_error("labels are not allowed in code");
            p.hint("try wrapping the label in a markup block (`[ ]`)");
        }

        _ => p.expected("expression"),
    }
}

/// Parses a content block: `[*Hi* there!]`.
pub(crate) fn content_block(p: &mut Parser) {
    let m = p.marker();
    p.enter_modes(SyntaxMode::Markup, AtNewline::Continue, |p| {
        p.assert(SyntaxKind::LeftBracket);
        markup::markup_exprs(p, true, syntax_set!(RightBracket, End));
        p.expect_closing_delimiter(m, SyntaxKind::RightBracket);
    });
    p.wrap(m, SyntaxKind::ContentBlock);
}

/// Parses a code block: `{ let x = 1; x + 2 }`.
fn code_block(p: &mut Parser) {
    let m = p.marker();
    p.enter_modes(SyntaxMode::Code, AtNewline::Continue, |p| {
        p.assert(SyntaxKind::LeftBrace);
        code(p, syntax_set!(RightBrace, RightBracket, RightParen, End));
        p.expect_closing_delimiter(m, SyntaxKind::RightBrace);
    });
    p.wrap(m, SyntaxKind::CodeBlock);
}

/// Parses a code block or a content block.
pub(crate) fn block(p: &mut Parser) {
    match p.current() {
        SyntaxKind::LeftBracket => content_block(p),
        SyntaxKind::LeftBrace => code_block(p),
        _ => p.expected("block"),
    }
}

/// Parses a function call's argument list: `(12pt, y)` and/or trailing
/// content blocks.
fn args(p: &mut Parser) {
    if !p.directly_at(SyntaxKind::LeftParen) && !p.directly_at(SyntaxKind::LeftBracket) {
        p.expected("argument list");
        if p.at(SyntaxKind::LeftParen) || p.at(SyntaxKind::LeftBracket) {
            p.hint("there may not be any spaces before the argument list");
        }
    }

    let m = p.marker();
    if p.at(SyntaxKind::LeftParen) {
        let m2 = p.marker();
        p.with_nl_mode(AtNewline::Continue, |p| {
            p.assert(SyntaxKind::LeftParen);

            let mut seen = HashSet::new();
            while !p.current().is_terminator() {
                if !p.at_set(set::ARG) {
                    p.unexpected();
                    continue;
                }

                arg(p, &mut seen);

                if !p.eat_if(SyntaxKind::Comma) && !p.current().is_terminator() {
                    p.expected("comma");
                }
            }

            p.expect_closing_delimiter(m2, SyntaxKind::RightParen);
        });
    }

    while p.directly_at(SyntaxKind::LeftBracket) {
        content_block(p);
    }

    p.wrap(m, SyntaxKind::Args);
}

/// Parses a single argument in an argument list.
fn arg<'s>(p: &mut Parser<'s>, seen: &mut HashSet<&'s str>) {
    let m = p.marker();

    // A spread argument: `..args`.
    if p.eat_if(SyntaxKind::Dots) {
        code_expr(p);
        p.wrap(m, SyntaxKind::Spread);
        return;
    }

    // A positional argument or the name of a named one.
    let was_at_expr = p.at_set(set::CODE_EXPR);
    let text = p.current_text();
    code_expr(p);

    // A named argument: `thickness: 12pt`.
    if p.eat_if(SyntaxKind::Colon) {
        if was_at_expr {
            if p[m].kind() != SyntaxKind::Ident {
                p[m].expected("argument name");
            } else if !seen.insert(text) {
                p[m].convert_to_error(format!("duplicate argument: {text}"));
            }
            code_expr(p);
        }
        p.wrap(m, SyntaxKind::Named);
    }
}

/// State for the single-pass parse of a parenthesized group.
struct GroupState<'s> {
    /// How many items were parsed.
    count: usize,
    /// Whether this is still a candidate for a parenthesized expression.
    maybe_just_parens: bool,
    /// The group kind, once an item decided it.
    kind: Option<SyntaxKind>,
    /// The named and keyed items seen so far.
    seen: HashSet<&'s str>,
}

/// Parses an expression that starts with a parenthesis. The group can
/// turn out to be a parenthesized expression, an array, a dictionary,
/// closure parameters, or a destructuring assignment target; the last
/// two require rewinding to a checkpoint when the deciding `=>` or `=`
/// shows up after the group.
fn expr_with_paren(p: &mut Parser, atomic: bool) {
    if atomic {
        // An atomic expression cannot be continued by an arrow or equals
        // sign, so the single-pass parse is final.
        parenthesized_or_array_or_dict(p);
        return;
    }

    // A memoized result from an earlier visit at this offset replays both
    // the nodes and the resulting parser position, making restart-heavy
    // inputs amortized linear.
    let Some((key, checkpoint)) = p.restore_memo_or_checkpoint() else { return };
    let prev_len = checkpoint.node_len;

    let kind = parenthesized_or_array_or_dict(p);

    if p.at(SyntaxKind::Arrow) {
        // The group was the parameter list of a closure.
        p.restore(checkpoint);
        let m = p.marker();
        params(p);
        if p.expect(SyntaxKind::Arrow) {
            code_expr(p);
            p.wrap(m, SyntaxKind::Closure);
        }
    } else if p.at(SyntaxKind::Eq) && kind != SyntaxKind::Parenthesized {
        // The group was the target of a destructuring assignment.
        p.restore(checkpoint);
        let m = p.marker();
        destructuring_or_parenthesized(p, true, &mut HashSet::new());
        if p.expect(SyntaxKind::Eq) {
            code_expr(p);
            p.wrap(m, SyntaxKind::DestructAssignment);
        }
    }

    p.memoize_parsed_nodes(key, prev_len);
}

/// Parses a parenthesized expression, an array, or a dictionary in one
/// pass: the first named or keyed item decides dictionary-hood, a single
/// positional item without a trailing comma stays a plain group.
fn parenthesized_or_array_or_dict(p: &mut Parser) -> SyntaxKind {
    let m = p.marker();
    let mut state = GroupState {
        count: 0,
        maybe_just_parens: true,
        kind: None,
        seen: HashSet::new(),
    };

    p.with_nl_mode(AtNewline::Continue, |p| {
        p.assert(SyntaxKind::LeftParen);

        // An empty dictionary: `(:)`.
        if p.eat_if(SyntaxKind::Colon) {
            state.kind = Some(SyntaxKind::Dict);
            state.maybe_just_parens = false;
        }

        while !p.current().is_terminator() {
            if !p.at_set(set::ARRAY_OR_DICT_ITEM) {
                p.unexpected();
                continue;
            }

            array_or_dict_item(p, &mut state);
            state.count += 1;

            if p.eat_if(SyntaxKind::Comma) {
                // `(1,)` is an array, not a parenthesized integer.
                state.maybe_just_parens = false;
            } else if !p.current().is_terminator() {
                p.expected("comma");
            }
        }

        p.expect_closing_delimiter(m, SyntaxKind::RightParen);
    });

    let kind = if state.maybe_just_parens && state.count == 1 {
        SyntaxKind::Parenthesized
    } else {
        state.kind.unwrap_or(SyntaxKind::Array)
    };

    p.wrap(m, kind);
    kind
}

/// Parses a single item in an array or dictionary.
fn array_or_dict_item<'s>(p: &mut Parser<'s>, state: &mut GroupState<'s>) {
    let m = p.marker();

    // A spread item: `..value`. Does not decide between array and
    // dictionary, as both can be spread into.
    if p.eat_if(SyntaxKind::Dots) {
        code_expr(p);
        p.wrap(m, SyntaxKind::Spread);
        state.maybe_just_parens = false;
        return;
    }

    // A positional item or the key of a pair.
    let was_at_expr = p.at_set(set::CODE_EXPR);
    let text = p.current_text();
    code_expr(p);

    // A named or keyed pair: `name: value` or `"key": value`.
    if p.eat_if(SyntaxKind::Colon) {
        if was_at_expr {
            let pair_kind = match p[m].kind() {
                SyntaxKind::Ident => SyntaxKind::Named,
                SyntaxKind::Str => SyntaxKind::Keyed,
                _ => {
                    p[m].expected("named or keyed pair");
                    SyntaxKind::Named
                }
            };

            let key = text.trim_matches('"');
            if !p[m].kind().is_error() && !state.seen.insert(key) {
                p[m].convert_to_error(format!("duplicate key: {key}"));
            }

            code_expr(p);
            p.wrap(m, pair_kind);

            // A pair in a group that already read positional items can
            // belong to neither an array nor a dictionary, so it does not
            // decide the group kind either.
            if state.kind.is_none() && state.count > 0 {
                p[m].convert_to_error("cannot mix named and positional items");
            } else {
                state.kind = Some(SyntaxKind::Dict);
            }
        } else {
            state.kind = Some(SyntaxKind::Dict);
        }
        state.maybe_just_parens = false;
    }
}

/// Parses a closure's parameter list: `(x, y)`.
fn params(p: &mut Parser) {
    let m = p.marker();
    p.with_nl_mode(AtNewline::Continue, |p| {
        p.assert(SyntaxKind::LeftParen);

        let mut seen = HashSet::new();
        let mut sink = false;

        while !p.current().is_terminator() {
            if !p.at_set(set::PARAM) {
                p.unexpected();
                continue;
            }

            param(p, &mut seen, &mut sink);

            if !p.eat_if(SyntaxKind::Comma) && !p.current().is_terminator() {
                p.expected("comma");
            }
        }

        p.expect_closing_delimiter(m, SyntaxKind::RightParen);
    });
    p.wrap(m, SyntaxKind::Params);
}

/// Parses a single parameter in a parameter list.
fn param<'s>(p: &mut Parser<'s>, seen: &mut HashSet<&'s str>, sink: &mut bool) {
    let m = p.marker();

    // An argument sink: `..sink`. At most one is allowed.
    if p.eat_if(SyntaxKind::Dots) {
        if p.at_set(set::PATTERN_LEAF) {
            pattern_leaf(p, false, seen, Some("parameter"));
        }
        p.wrap(m, SyntaxKind::Spread);
        if std::mem::replace(sink, true) {
            p[m].convert_to_error("only one argument sink is allowed");
        }
        return;
    }

    // A positional parameter or the name of a named one.
    let was_at_pat = p.at_set(set::PATTERN);
    pattern(p, false, seen, Some("parameter"));

    // A named parameter with a default value: `greeting: "hello"`.
    if p.eat_if(SyntaxKind::Colon) {
        if was_at_pat {
            if p[m].kind() != SyntaxKind::Ident {
                p[m].expected("parameter name");
            }
            code_expr(p);
        }
        p.wrap(m, SyntaxKind::Named);
    }
}

/// Parses a binding or reassignment pattern.
fn pattern<'s>(
    p: &mut Parser<'s>,
    reassignment: bool,
    seen: &mut HashSet<&'s str>,
    dupe: Option<&'s str>,
) {
    match p.current() {
        SyntaxKind::Underscore => p.eat(),
        SyntaxKind::LeftParen => destructuring_or_parenthesized(p, reassignment, seen),
        _ => pattern_leaf(p, reassignment, seen, dupe),
    }
}

/// Parses a destructuring pattern, or just a parenthesized one. Nested
/// patterns recurse, so the depth guard applies here.
fn destructuring_or_parenthesized<'s>(
    p: &mut Parser<'s>,
    reassignment: bool,
    seen: &mut HashSet<&'s str>,
) {
    if !p.enter_depth() {
        p.overflow();
        p.exit_depth();
        return;
    }
    destructuring_or_parenthesized_inner(p, reassignment, seen);
    p.exit_depth();
}

fn destructuring_or_parenthesized_inner<'s>(
    p: &mut Parser<'s>,
    reassignment: bool,
    seen: &mut HashSet<&'s str>,
) {
    let mut sink = false;
    let mut count = 0;
    let mut maybe_just_parens = true;

    let m = p.marker();
    p.with_nl_mode(AtNewline::Continue, |p| {
        p.assert(SyntaxKind::LeftParen);

        while !p.current().is_terminator() {
            if !p.at_set(set::DESTRUCTURING_ITEM) {
                p.unexpected();
                continue;
            }

            destructuring_item(p, reassignment, seen, &mut maybe_just_parens, &mut sink);
            count += 1;

            if p.eat_if(SyntaxKind::Comma) {
                maybe_just_parens = false;
            } else if !p.current().is_terminator() {
                p.expected("comma");
            }
        }

        p.expect_closing_delimiter(m, SyntaxKind::RightParen);
    });

    if maybe_just_parens && count == 1 && !sink {
        p.wrap(m, SyntaxKind::Parenthesized);
    } else {
        p.wrap(m, SyntaxKind::Destructuring);
    }
}

/// Parses a single item in a destructuring pattern.
fn destructuring_item<'s>(
    p: &mut Parser<'s>,
    reassignment: bool,
    seen: &mut HashSet<&'s str>,
    maybe_just_parens: &mut bool,
    sink: &mut bool,
) {
    let m = p.marker();

    // A destructuring sink: `..rest`. At most one is allowed.
    if p.eat_if(SyntaxKind::Dots) {
        if p.at_set(set::PATTERN_LEAF) {
            pattern_leaf(p, reassignment, seen, None);
        }
        p.wrap(m, SyntaxKind::Spread);
        if std::mem::replace(sink, true) {
            p[m].convert_to_error("only one destructuring sink is allowed");
        }
        return;
    }

    // A positional pattern or the key of a named one. A checkpoint is
    // needed rather than a lexer clone because trivia may sit between the
    // identifier and the colon.
    let was_at_pat = p.at_set(set::PATTERN);
    let checkpoint = p.checkpoint();
    if !(p.eat_if(SyntaxKind::Ident) && p.at(SyntaxKind::Colon)) {
        p.restore(checkpoint);
        pattern(p, reassignment, seen, None);
    }

    // A named destructuring item: `x: a`.
    if was_at_pat && p.at(SyntaxKind::Colon) {
        *maybe_just_parens = false;
        p.eat();
        pattern(p, reassignment, seen, None);
        p.wrap(m, SyntaxKind::Named);
    }
}

/// Parses a leaf in a pattern: an identifier in a binding, any expression
/// in a reassignment.
fn pattern_leaf<'s>(
    p: &mut Parser<'s>,
    reassignment: bool,
    seen: &mut HashSet<&'s str>,
    dupe: Option<&'s str>,
) {
    if p.current().is_keyword() {
        p.eat_and_get().expected("pattern");
        return;
    } else if !p.at_set(set::PATTERN_LEAF) {
        p.expected("pattern");
        return;
    }

    let m = p.marker();
    let text = p.current_text();

    // Parse a full atomic expression for error recovery: a whole
    // non-identifier expression turns into one error instead of many.
    code_expr_prec(p, true, 0);

    if !reassignment {
        let node = &mut p[m];
        if node.kind() == SyntaxKind::Ident {
            if !seen.insert(text) {
                node.convert_to_error(format!(
                    "duplicate {}: {text}",
                    dupe.unwrap_or("binding"),
                ));
            }
        } else {
            node.expected("pattern");
        }
    }
}

/// Parses a let binding: `let x = 1` or `let f(x) = x`.
fn let_binding(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Let);

    let m2 = p.marker();
    let mut closure = false;
    let mut other = false;

    if p.at(SyntaxKind::Ident) {
        // A closure binding when parens follow the name directly.
        p.eat();
        if p.directly_at(SyntaxKind::LeftParen) {
            params(p);
            closure = true;
        }
    } else {
        pattern(p, false, &mut HashSet::new(), None);
        other = true;
    }

    // Closures and destructuring patterns need an initializer; a plain
    // identifier may stay unbound.
    let f = if closure || other { Parser::expect } else { Parser::eat_if };
    if f(p, SyntaxKind::Eq) {
        code_expr(p);
    }

    if closure {
        p.wrap(m2, SyntaxKind::Closure);
    }

    p.wrap(m, SyntaxKind::LetBinding);
}

/// Parses a set rule: `set text(12pt)`, optionally with an `if` clause.
fn set_rule(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Set);

    let m2 = p.marker();
    p.expect(SyntaxKind::Ident);
    while p.eat_if(SyntaxKind::Dot) {
        p.expect(SyntaxKind::Ident);
        p.wrap(m2, SyntaxKind::FieldAccess);
    }

    args(p);
    if p.eat_if(SyntaxKind::If) {
        code_expr(p);
    }
    p.wrap(m, SyntaxKind::SetRule);
}

/// Parses a show rule: `show heading: it => emph(it.body)`, with an
/// optional selector before the colon.
fn show_rule(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Show);
    let m2 = p.before_trivia();

    if !p.at(SyntaxKind::Colon) {
        code_expr(p);
    }

    if p.eat_if(SyntaxKind::Colon) {
        code_expr(p);
    } else {
        p.expected_at(m2, "colon");
    }

    p.wrap(m, SyntaxKind::ShowRule);
}

/// Parses a contextual expression: `context text.lang`.
fn contextual(p: &mut Parser, atomic: bool) {
    let m = p.marker();
    p.assert(SyntaxKind::Context);
    code_expr_prec(p, atomic, 0);
    p.wrap(m, SyntaxKind::Contextual);
}

/// Parses an if-else conditional: `if x { y } else { z }`. Chained
/// else-if branches recurse, so the depth guard applies here too.
fn conditional(p: &mut Parser) {
    if !p.enter_depth() {
        p.overflow();
        p.exit_depth();
        return;
    }

    let m = p.marker();
    p.assert(SyntaxKind::If);
    code_expr(p);
    block(p);
    if p.eat_if(SyntaxKind::Else) {
        if p.at(SyntaxKind::If) {
            conditional(p);
        } else {
            block(p);
        }
    }
    p.wrap(m, SyntaxKind::Conditional);

    p.exit_depth();
}

/// Parses a while loop: `while x { y }`.
fn while_loop(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::While);
    code_expr(p);
    block(p);
    p.wrap(m, SyntaxKind::WhileLoop);
}

/// Parses a for loop: `for x in y { z }`.
fn for_loop(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::For);

    let mut seen = HashSet::new();
    pattern(p, false, &mut seen, None);

    let m2 = p.marker();
    if p.eat_if(SyntaxKind::Comma) {
        let node = &mut p[m2];
        node.unexpected();
        node.hint("destructuring patterns must be wrapped in parentheses");
        if p.at_set(set::PATTERN) {
            pattern(p, false, &mut seen, None);
        }
    }

    p.expect(SyntaxKind::In);
    code_expr(p);
    block(p);
    p.wrap(m, SyntaxKind::ForLoop);
}

/// Parses a module import: `import "utils.vel": a, b, c`.
fn module_import(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Import);
    code_expr(p);

    if p.eat_if(SyntaxKind::As) {
        // Renaming the whole module.
        p.expect(SyntaxKind::Ident);
    }

    if p.eat_if(SyntaxKind::Colon) {
        if p.at(SyntaxKind::LeftParen) {
            p.with_nl_mode(AtNewline::Continue, |p| {
                let m2 = p.marker();
                p.assert(SyntaxKind::LeftParen);
                import_items(p);
                p.expect_closing_delimiter(m2, SyntaxKind::RightParen);
            });
        } else if !p.eat_if(SyntaxKind::Star) {
            import_items(p);
        }
    }

    p.wrap(m, SyntaxKind::ModuleImport);
}

/// Parses items to import from a module: `a, b.c, d as e`.
fn import_items(p: &mut Parser) {
    let m = p.marker();
    while !p.current().is_terminator() {
        let item_marker = p.marker();
        if !p.eat_if(SyntaxKind::Ident) {
            p.unexpected();
        }

        // A nested item path: `a.b.c`.
        while p.eat_if(SyntaxKind::Dot) {
            p.expect(SyntaxKind::Ident);
            p.wrap(item_marker, SyntaxKind::FieldAccess);
        }

        // A renamed item: `a as b`.
        if p.eat_if(SyntaxKind::As) {
            p.expect(SyntaxKind::Ident);
            p.wrap(item_marker, SyntaxKind::RenamedImportItem);
        }

        if !p.current().is_terminator() && !p.eat_if(SyntaxKind::Comma) {
            p.expected("comma");
        }
    }

    p.wrap(m, SyntaxKind::ImportItems);
}

/// Parses a module include: `include "chapter1.vel"`.
fn module_include(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Include);
    code_expr(p);
    p.wrap(m, SyntaxKind::ModuleInclude);
}

/// Parses a break from a loop: `break`.
fn break_stmt(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Break);
    p.wrap(m, SyntaxKind::LoopBreak);
}

/// Parses a continue in a loop: `continue`.
fn continue_stmt(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Continue);
    p.wrap(m, SyntaxKind::LoopContinue);
}

/// Parses a return from a function: `return`, `return x + 1`.
fn return_stmt(p: &mut Parser) {
    let m = p.marker();
    p.assert(SyntaxKind::Return);
    if p.at_set(set::CODE_EXPR) {
        code_expr(p);
    }
    p.wrap(m, SyntaxKind::FuncReturn);
}
