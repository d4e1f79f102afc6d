use std::fmt;

/// A field-address key into the memory model: the approximate struct type name plus the
/// two GEP indices used to reach a field, e.g. `"struct.foo.0.2"`.
///
/// Flow-insensitive by design (§4.3's "small field-of-struct abstraction"): distinct
/// `alloca`s of the same struct type share a memory-model entry for the same field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryName(String);

impl MemoryName {
    pub fn new(base: impl AsRef<str>, idx1: u32, idx2: u32) -> Self {
        Self(format!("{}.{idx1}.{idx2}", base.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keys the source treats as opaque type-punned storage and never backs with a real
    /// name (§9: `"union"` and `"union.0.0"`).
    pub fn is_opaque(&self) -> bool {
        self.0 == "union" || self.0 == "union.0.0"
    }
}

impl fmt::Display for MemoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stable symbolic name assigned to an IR value.
///
/// `Multi` is guaranteed flat: none of its members is itself a `Multi` (enforced by
/// [`VarName::multi`], the only constructor). `Empty` is the absence of a usable name,
/// not a name in its own right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarName {
    Int(String),
    ErrorCode(String),
    Function(String),
    Memory(MemoryName),
    Multi(Vec<VarName>),
    Empty,
}

impl VarName {
    /// Build a (possibly) `Multi` name from a set of candidate names, flattening any
    /// nested `Multi`s, dropping `Empty`s, and deduplicating.
    ///
    /// A single surviving candidate is returned bare rather than wrapped, so
    /// single-element results are indistinguishable from directly-resolved names (the
    /// source's `MultiName` with one entry behaves the same way through `Names()`).
    pub fn multi(names: impl IntoIterator<Item = VarName>) -> VarName {
        let mut flat = Vec::new();
        for name in names {
            match name {
                VarName::Multi(inner) => flat.extend(inner),
                VarName::Empty => {}
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        match flat.len() {
            0 => VarName::Empty,
            1 => flat.into_iter().next().expect("len checked above"),
            _ => VarName::Multi(flat),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VarName::Empty)
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, VarName::Memory(_))
    }

    /// The functions named by this value, for callee resolution: a single `Function`
    /// contributes itself, a `Multi` contributes every `Function` member, anything else
    /// contributes nothing.
    pub fn function_names(&self) -> Vec<&str> {
        match self {
            VarName::Function(name) => vec![name.as_str()],
            VarName::Multi(names) => names
                .iter()
                .filter_map(|n| match n {
                    VarName::Function(name) => Some(name.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarName::Int(n) | VarName::Function(n) => f.write_str(n),
            VarName::ErrorCode(n) => write!(f, "ErrorCode({n})"),
            VarName::Memory(m) => write!(f, "Memory({m})"),
            VarName::Multi(names) => {
                f.write_str("Multi(")?;
                for (i, n) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{n}")?;
                }
                f.write_str(")")
            }
            VarName::Empty => f.write_str("<empty>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_flattens_nested_multi() {
        let inner = VarName::multi([VarName::Int("a".into()), VarName::Int("b".into())]);
        let outer = VarName::multi([inner, VarName::Int("c".into())]);
        match &outer {
            VarName::Multi(names) => {
                assert!(!names.iter().any(|n| matches!(n, VarName::Multi(_))));
                assert_eq!(names.len(), 3);
            }
            other => panic!("expected Multi, got {other:?}"),
        }
    }

    #[test]
    fn multi_of_one_unwraps() {
        assert_eq!(VarName::multi([VarName::Int("a".into())]), VarName::Int("a".into()));
    }

    #[test]
    fn multi_drops_empty() {
        assert_eq!(
            VarName::multi([VarName::Empty, VarName::Int("a".into())]),
            VarName::Int("a".into())
        );
    }

    #[test]
    fn multi_of_nothing_is_empty() {
        assert_eq!(VarName::multi(Vec::<VarName>::new()), VarName::Empty);
    }
}
