use errspec_ir::Location;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolationKind {
    InsufficientCheck,
    UnusedReturnValue,
}

/// A single detector finding: a call site that fails to respect a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub location: Location,
    /// The source name of the function containing the call site.
    pub parent: String,
    /// The source name of the callee the specification is about.
    pub callee: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, location: Location, parent: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            parent: parent.into(),
            callee: callee.into(),
        }
    }
}
