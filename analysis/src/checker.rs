use errspec_ir::Function;
use errspec_lattice::SignLatticeElement;
use log::warn;

use crate::specification::Specification;

/// Filters out call sites no detector can usefully report on (§4.6).
///
/// `Invalid` specifications are logged, since they usually indicate a parsing mistake
/// upstream; `Bottom`/`Top` are silently skipped, since a detector would either never
/// fire (`Bottom`, nothing is in the error range) or always fire (`Top`, there's no error
/// range information at all) — neither is an actionable report.
pub fn should_check(function: &Function, specification: &Specification) -> bool {
    if function.source_name.is_empty() {
        return false;
    }
    if function.return_type.is_void() {
        return false;
    }
    match specification.lattice_element {
        SignLatticeElement::Invalid => {
            warn!(
                target: "errspec-checker",
                function = function.source_name.as_str();
                "specification has an invalid lattice element, skipping",
            );
            false
        }
        SignLatticeElement::Bottom | SignLatticeElement::Top => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errspec_ir::Type;

    #[test]
    fn rejects_void_return_type() {
        let f = Function::new("f", "f", Type::Void);
        let spec = Specification::new("f", SignLatticeElement::LessThanZero);
        assert!(!should_check(&f, &spec));
    }

    #[test]
    fn rejects_top_and_bottom_and_invalid() {
        let f = Function::new("f", "f", Type::Int(32));
        for element in [SignLatticeElement::Top, SignLatticeElement::Bottom, SignLatticeElement::Invalid] {
            let spec = Specification::new("f", element);
            assert!(!should_check(&f, &spec));
        }
    }

    #[test]
    fn accepts_proper_non_trivial_element() {
        let f = Function::new("f", "f", Type::Int(32));
        let spec = Specification::new("f", SignLatticeElement::LessThanZero);
        assert!(should_check(&f, &spec));
    }
}
