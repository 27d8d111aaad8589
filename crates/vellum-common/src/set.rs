//! Bitsets over [`SyntaxKind`].
//!
//! Grammar decisions (FIRST sets, stop sets) test membership millions of
//! times per parse, so sets are two machine words with constant-time
//! operations and `const` construction for use in statics.

use crate::kind::SyntaxKind;

/// A set of syntax kinds.
///
/// Only kinds with a discriminant below 128 can be members; the trailing
/// container kinds never participate in grammar sets.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SyntaxSet(u64, u64);

impl SyntaxSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self(0, 0)
    }

    /// Insert a kind into the set.
    ///
    /// Can only be used with kinds with discriminant < 128.
    pub const fn add(self, kind: SyntaxKind) -> Self {
        let d = kind as u8;
        assert!(d < 128, "only kinds with discriminant < 128 can be in a set");
        if d < 64 {
            Self(self.0 | (1 << d), self.1)
        } else {
            Self(self.0, self.1 | (1 << (d - 64)))
        }
    }

    /// Remove a kind from the set.
    pub const fn remove(self, kind: SyntaxKind) -> Self {
        let d = kind as u8;
        if d >= 128 {
            return self;
        }
        if d < 64 {
            Self(self.0 & !(1 << d), self.1)
        } else {
            Self(self.0, self.1 & !(1 << (d - 64)))
        }
    }

    /// Combine two sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Whether the set contains the given kind.
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let d = kind as u8;
        if d >= 128 {
            return false;
        }
        if d < 64 {
            self.0 & (1 << d) != 0
        } else {
            self.1 & (1 << (d - 64)) != 0
        }
    }

    /// Whether the set contains no kinds.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0 && self.1 == 0
    }
}

/// Construct a [`SyntaxSet`] from a list of kinds.
#[macro_export]
macro_rules! syntax_set {
    ($($kind:ident),* $(,)?) => {
        $crate::set::SyntaxSet::new()$(.add($crate::kind::SyntaxKind::$kind))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_contains() {
        let set = SyntaxSet::new()
            .add(SyntaxKind::End)
            .add(SyntaxKind::Comma)
            .add(SyntaxKind::Ident);
        assert!(set.contains(SyntaxKind::End));
        assert!(set.contains(SyntaxKind::Comma));
        assert!(set.contains(SyntaxKind::Ident));
        assert!(!set.contains(SyntaxKind::Colon));

        let set = set.remove(SyntaxKind::Comma);
        assert!(!set.contains(SyntaxKind::Comma));
        assert!(set.contains(SyntaxKind::End));
    }

    #[test]
    fn union_and_empty() {
        let a = syntax_set!(End, Semicolon);
        let b = syntax_set!(Semicolon, RightBrace);
        let u = a.union(b);
        assert!(u.contains(SyntaxKind::End));
        assert!(u.contains(SyntaxKind::RightBrace));
        assert!(!SyntaxSet::new().contains(SyntaxKind::End));
        assert!(SyntaxSet::new().is_empty());
        assert!(!u.is_empty());
    }

    #[test]
    fn high_discriminants_are_never_members() {
        // Container kinds past the limit report non-membership.
        let set = syntax_set!(End);
        assert!(!set.contains(SyntaxKind::DestructAssignment));
    }

    #[test]
    fn kinds_straddling_the_word_boundary() {
        let set = syntax_set!(Root, Not, As, Ident);
        assert!(set.contains(SyntaxKind::Root));
        assert!(set.contains(SyntaxKind::Not));
        assert!(set.contains(SyntaxKind::As));
        assert!(set.contains(SyntaxKind::Ident));
        assert!(!set.contains(SyntaxKind::Let));
    }
}
