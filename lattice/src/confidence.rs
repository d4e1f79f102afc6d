use crate::sign::SignLatticeElement;

/// A confidence triple `(z, l, g)`: how strongly the evidence gathered so far supports
/// "this value is zero", "less than zero", and "greater than zero" respectively, each in
/// `[0.0, 1.0]`.
///
/// Projected to a [`SignLatticeElement`] by a caller-supplied threshold (§4.2:
/// "never hard-coded"); see [`ConfidenceElement::project`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConfidenceElement {
    pub zero: f64,
    pub less_than_zero: f64,
    pub greater_than_zero: f64,
}

impl ConfidenceElement {
    pub fn new(zero: f64, less_than_zero: f64, greater_than_zero: f64) -> Self {
        Self {
            zero,
            less_than_zero,
            greater_than_zero,
        }
    }

    /// Identity for [`meet`](Self::meet): the top of the confidence lattice.
    pub const IDENTITY_MEET: Self = Self {
        zero: 1.0,
        less_than_zero: 1.0,
        greater_than_zero: 1.0,
    };

    /// Identity for [`join`](Self::join): the bottom of the confidence lattice.
    pub const IDENTITY_JOIN: Self = Self {
        zero: 0.0,
        less_than_zero: 0.0,
        greater_than_zero: 0.0,
    };

    pub fn meet(self, other: Self) -> Self {
        Self {
            zero: self.zero.min(other.zero),
            less_than_zero: self.less_than_zero.min(other.less_than_zero),
            greater_than_zero: self.greater_than_zero.min(other.greater_than_zero),
        }
    }

    pub fn join(self, other: Self) -> Self {
        Self {
            zero: self.zero.max(other.zero),
            less_than_zero: self.less_than_zero.max(other.less_than_zero),
            greater_than_zero: self.greater_than_zero.max(other.greater_than_zero),
        }
    }

    /// Element-wise min across a sequence, starting from [`IDENTITY_MEET`](Self::IDENTITY_MEET).
    pub fn meet_on_vector(elements: impl IntoIterator<Item = Self>) -> Self {
        elements.into_iter().fold(Self::IDENTITY_MEET, Self::meet)
    }

    /// Element-wise max across a sequence, starting from [`IDENTITY_JOIN`](Self::IDENTITY_JOIN).
    pub fn join_on_vector(elements: impl IntoIterator<Item = Self>) -> Self {
        elements.into_iter().fold(Self::IDENTITY_JOIN, Self::join)
    }

    /// The single component with the maximal value: `Zero`, `LessThanZero`, or
    /// `GreaterThanZero`, whichever confidence is largest. Ties favor `zero`, then
    /// `less_than_zero`, matching the declared field order.
    pub fn keep_highest(self) -> SignLatticeElement {
        if self.zero >= self.less_than_zero && self.zero >= self.greater_than_zero {
            SignLatticeElement::Zero
        } else if self.less_than_zero >= self.greater_than_zero {
            SignLatticeElement::LessThanZero
        } else {
            SignLatticeElement::GreaterThanZero
        }
    }

    /// Project onto the sign lattice: a component exceeding `threshold` contributes its
    /// corresponding sign to the result, which is then the join of whichever signs
    /// cleared the bar (so all three clearing it yields `Top`, none clearing it yields
    /// `Bottom`).
    pub fn project(self, threshold: f64) -> SignLatticeElement {
        let mut result = SignLatticeElement::Bottom;
        if self.zero > threshold {
            result = result.join(SignLatticeElement::Zero);
        }
        if self.less_than_zero > threshold {
            result = result.join(SignLatticeElement::LessThanZero);
        }
        if self.greater_than_zero > threshold {
            result = result.join(SignLatticeElement::GreaterThanZero);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meet_identity_is_neutral() {
        let c = ConfidenceElement::new(0.3, 0.6, 0.9);
        assert_eq!(c.meet(ConfidenceElement::IDENTITY_MEET), c);
    }

    #[test]
    fn join_identity_is_neutral() {
        let c = ConfidenceElement::new(0.3, 0.6, 0.9);
        assert_eq!(c.join(ConfidenceElement::IDENTITY_JOIN), c);
    }

    #[test]
    fn project_joins_every_component_clearing_threshold() {
        let c = ConfidenceElement::new(0.9, 0.9, 0.1);
        assert_eq!(c.project(0.5), SignLatticeElement::Zero.join(SignLatticeElement::LessThanZero));
    }

    #[test]
    fn project_nothing_clearing_threshold_is_bottom() {
        let c = ConfidenceElement::new(0.1, 0.1, 0.1);
        assert_eq!(c.project(0.5), SignLatticeElement::Bottom);
    }

    #[test]
    fn keep_highest_picks_maximal_component() {
        let c = ConfidenceElement::new(0.1, 0.8, 0.2);
        assert_eq!(c.keep_highest(), SignLatticeElement::LessThanZero);
    }
}
