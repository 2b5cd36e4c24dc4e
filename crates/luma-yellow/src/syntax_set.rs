use crate::SyntaxKind;

const _: () = assert!((SyntaxKind::TOMBSTONE as u16) < u128::BITS as u16, "SyntaxSet is too small");

/// Set of kinds packed into a single `u128`, usable in `const` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet(u128);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    const fn bit(kind: SyntaxKind) -> u128 {
        1 << kind as u16
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < N {
            bits |= Self::bit(kinds[i]);
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn kinds_across_the_range() {
        let set = SyntaxSet::new([LEFT_PAREN, END_KW, FUNCTION_EXPR, TOMBSTONE]);

        assert!(set.contains(LEFT_PAREN));
        assert!(set.contains(END_KW));
        assert!(set.contains(FUNCTION_EXPR));
        assert!(set.contains(TOMBSTONE));
        assert!(!set.contains(RIGHT_PAREN));
        assert!(!set.contains(FUNCTION_STMT));
    }

    #[test]
    fn union_keeps_both_sides() {
        const OPEN: SyntaxSet = SyntaxSet::new([DO_KW, THEN_KW]);
        const CLOSE: SyntaxSet = SyntaxSet::new([END_KW]);
        let set = OPEN.union(&CLOSE);

        assert!(set.contains(DO_KW));
        assert!(set.contains(THEN_KW));
        assert!(set.contains(END_KW));
        assert_eq!(SyntaxSet::EMPTY, SyntaxSet::default());
    }
}
