/// Configuration for the dataflow analyses and the detectors built on top of them.
#[derive(Debug, Clone)]
pub struct DataFlowConfig {
    /// The threshold a [`ConfidenceElement`](errspec_lattice::ConfidenceElement) component
    /// must exceed before [`project`](errspec_lattice::ConfidenceElement::project) counts it
    /// toward the projected sign element. Never hard-coded: specifications arriving as raw
    /// confidence triples (rather than already-resolved sign elements) are only as precise
    /// as this threshold.
    confidence_threshold: f64,
}

impl Default for DataFlowConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

impl DataFlowConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn set_confidence_threshold(&mut self, threshold: f64) -> &mut Self {
        assert!((0.0..=1.0).contains(&threshold), "confidence threshold must be in [0, 1]");
        self.confidence_threshold = threshold;
        self
    }
}
