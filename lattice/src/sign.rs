use std::fmt;

/// The sign lattice: an abstraction of an integer's possible signs.
///
/// The eight proper elements form the powerset lattice of `{Negative, Zero, Positive}`,
/// ordered by inclusion: [`Bottom`](SignLatticeElement::Bottom) is the empty set,
/// [`Top`](SignLatticeElement::Top) is all three, `Meet` is intersection, `Join` is
/// union, and `Complement` is set complement within that three-element universe. The
/// ninth element, [`Invalid`](SignLatticeElement::Invalid), is a sentinel outside the
/// lattice proper: every operation applied to it returns `Invalid`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SignLatticeElement {
    Bottom,
    Zero,
    LessThanZero,
    GreaterThanZero,
    LessThanEqualZero,
    GreaterThanEqualZero,
    NotZero,
    Top,
    /// Not a lattice element; used for specifications that cannot be evaluated
    /// (unparsed, malformed, or otherwise opaque). Propagates through every operation.
    Invalid,
}

use SignLatticeElement::*;

bitflags::bitflags! {
    /// The bitset representation backing [`SignLatticeElement`]'s proper elements.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    struct Signs: u8 {
        const NEGATIVE = 0b001;
        const ZERO     = 0b010;
        const POSITIVE = 0b100;
    }
}

impl SignLatticeElement {
    fn to_signs(self) -> Option<Signs> {
        match self {
            Bottom => Some(Signs::empty()),
            Zero => Some(Signs::ZERO),
            LessThanZero => Some(Signs::NEGATIVE),
            GreaterThanZero => Some(Signs::POSITIVE),
            LessThanEqualZero => Some(Signs::NEGATIVE | Signs::ZERO),
            GreaterThanEqualZero => Some(Signs::ZERO | Signs::POSITIVE),
            NotZero => Some(Signs::NEGATIVE | Signs::POSITIVE),
            Top => Some(Signs::all()),
            Invalid => None,
        }
    }

    fn from_signs(signs: Signs) -> Self {
        match signs {
            s if s.is_empty() => Bottom,
            s if s == Signs::ZERO => Zero,
            s if s == Signs::NEGATIVE => LessThanZero,
            s if s == Signs::POSITIVE => GreaterThanZero,
            s if s == Signs::NEGATIVE | Signs::ZERO => LessThanEqualZero,
            s if s == Signs::ZERO | Signs::POSITIVE => GreaterThanEqualZero,
            s if s == Signs::NEGATIVE | Signs::POSITIVE => NotZero,
            s if s == Signs::all() => Top,
            _ => unreachable!("Signs is a 3-bit flag set, every combination is named above"),
        }
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, Invalid)
    }

    /// Greatest lower bound.
    pub fn meet(self, other: Self) -> Self {
        match (self.to_signs(), other.to_signs()) {
            (Some(a), Some(b)) => Self::from_signs(a & b),
            _ => Invalid,
        }
    }

    /// Least upper bound.
    pub fn join(self, other: Self) -> Self {
        match (self.to_signs(), other.to_signs()) {
            (Some(a), Some(b)) => Self::from_signs(a | b),
            _ => Invalid,
        }
    }

    /// The lattice complement: `LessThanZero <-> GreaterThanEqualZero`,
    /// `Zero <-> NotZero`, `Top <-> Bottom`, `LessThanEqualZero <-> GreaterThanZero`.
    pub fn complement(self) -> Self {
        match self.to_signs() {
            Some(signs) => Self::from_signs(Signs::all().difference(signs)),
            None => Invalid,
        }
    }

    /// Strict partial order: `self` is a proper subset of `other`.
    ///
    /// `Invalid` is incomparable to everything, including itself, and this returns
    /// `false` in that case (there is no lattice element to hand back, unlike
    /// [`meet`](Self::meet)/[`join`](Self::join)/[`complement`](Self::complement)).
    pub fn is_less_than(self, other: Self) -> bool {
        match (self.to_signs(), other.to_signs()) {
            (Some(a), Some(b)) => a != b && a.difference(b).is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for SignLatticeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bottom => "Bottom",
            Zero => "Zero",
            LessThanZero => "LessThanZero",
            GreaterThanZero => "GreaterThanZero",
            LessThanEqualZero => "LessThanEqualZero",
            GreaterThanEqualZero => "GreaterThanEqualZero",
            NotZero => "NotZero",
            Top => "Top",
            Invalid => "Invalid",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SignLatticeElement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bottom" => Ok(Bottom),
            "Zero" => Ok(Zero),
            "LessThanZero" => Ok(LessThanZero),
            "GreaterThanZero" => Ok(GreaterThanZero),
            "LessThanEqualZero" => Ok(LessThanEqualZero),
            "GreaterThanEqualZero" => Ok(GreaterThanEqualZero),
            "NotZero" => Ok(NotZero),
            "Top" => Ok(Top),
            "Invalid" => Ok(Invalid),
            other => Err(format!("unrecognized sign lattice element: {other}")),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SignLatticeElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SignLatticeElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn meet_and_join_are_commutative() {
        for &a in &PROPER {
            for &b in &PROPER {
                assert_eq!(a.meet(b), b.meet(a));
                assert_eq!(a.join(b), b.join(a));
            }
        }
    }

    #[test]
    fn top_and_bottom_are_identities() {
        for &a in &PROPER {
            assert_eq!(a.meet(Top), a);
            assert_eq!(a.join(Bottom), a);
        }
    }

    #[test]
    fn complement_is_involutive() {
        for &a in &PROPER {
            assert_eq!(a.complement().complement(), a);
        }
    }

    #[test]
    fn named_complements_match_specification() {
        assert_eq!(LessThanZero.complement(), GreaterThanEqualZero);
        assert_eq!(Zero.complement(), NotZero);
        assert_eq!(Top.complement(), Bottom);
        assert_eq!(LessThanEqualZero.complement(), GreaterThanZero);
    }

    #[test]
    fn is_less_than_top_holds_for_everything_else() {
        for &a in &PROPER {
            assert!(a.is_less_than(Top) || a == Top);
        }
    }

    #[test]
    fn invalid_propagates() {
        assert_eq!(Invalid.meet(Top), Invalid);
        assert_eq!(Top.meet(Invalid), Invalid);
        assert_eq!(Invalid.join(Bottom), Invalid);
        assert_eq!(Invalid.complement(), Invalid);
        assert!(!Invalid.is_less_than(Top));
        assert!(!Top.is_less_than(Invalid));
    }
}
