use errspec_lattice::SignLatticeElement::{self, *};
use proptest::prelude::*;

const PROPER: [SignLatticeElement; 8] = [
    Bottom,
    Zero,
    LessThanZero,
    GreaterThanZero,
    LessThanEqualZero,
    GreaterThanEqualZero,
    NotZero,
    Top,
];

fn proper_element() -> impl Strategy<Value = SignLatticeElement> {
    (0..PROPER.len()).prop_map(|i| PROPER[i])
}

proptest! {
    #[test]
    fn meet_is_commutative(a in proper_element(), b in proper_element()) {
        prop_assert_eq!(a.meet(b), b.meet(a));
    }

    #[test]
    fn join_is_commutative(a in proper_element(), b in proper_element()) {
        prop_assert_eq!(a.join(b), b.join(a));
    }

    #[test]
    fn meet_with_top_is_identity(a in proper_element()) {
        prop_assert_eq!(a.meet(Top), a);
    }

    #[test]
    fn join_with_bottom_is_identity(a in proper_element()) {
        prop_assert_eq!(a.join(Bottom), a);
    }

    #[test]
    fn complement_is_involutive(a in proper_element()) {
        prop_assert_eq!(a.complement().complement(), a);
    }

    #[test]
    fn is_less_than_top_or_is_top(a in proper_element()) {
        prop_assert!(a.is_less_than(Top) || a == Top);
    }

    #[test]
    fn meet_is_associative(a in proper_element(), b in proper_element(), c in proper_element()) {
        prop_assert_eq!(a.meet(b).meet(c), a.meet(b.meet(c)));
    }

    #[test]
    fn join_is_associative(a in proper_element(), b in proper_element(), c in proper_element()) {
        prop_assert_eq!(a.join(b).join(c), a.join(b.join(c)));
    }

    #[test]
    fn meet_never_exceeds_either_operand(a in proper_element(), b in proper_element()) {
        let m = a.meet(b);
        prop_assert!(m.is_less_than(a) || m == a);
        prop_assert!(m.is_less_than(b) || m == b);
    }
}

#[test]
fn invalid_is_absorbing_for_every_operation() {
    for &a in &PROPER {
        assert_eq!(Invalid.meet(a), Invalid);
        assert_eq!(a.meet(Invalid), Invalid);
        assert_eq!(Invalid.join(a), Invalid);
        assert_eq!(Invalid.complement(), Invalid);
        assert!(!Invalid.is_less_than(a));
    }
}
