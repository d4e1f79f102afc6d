use errspec_lattice::SignLatticeElement;

/// An asserted error specification: "when `function` fails, its return value lies in
/// `lattice_element`".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specification {
    pub function: String,
    pub lattice_element: SignLatticeElement,
}

impl Specification {
    pub fn new(function: impl Into<String>, lattice_element: SignLatticeElement) -> Self {
        Self {
            function: function.into(),
            lattice_element,
        }
    }
}
