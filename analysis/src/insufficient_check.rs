//! The insufficient-check detector (§4.7): a call site whose return value is neither
//! checked against its specification nor propagated straight out via `return`.
//!
//! Grounded on `checker/src/insufficient_checks_pass.cc`'s `VisitCallInst`,
//! `IsSufficientlyChecked`, and `IsPropagated`.

use errspec_ir::{FuncId, Module, Opcode};
use errspec_lattice::SignLatticeElement;

use crate::checker::should_check;
use crate::name_resolver::NameResolver;
use crate::return_constraint::ReturnConstraintFacts;
use crate::return_value::ReturnValueFacts;
use crate::specification::Specification;
use crate::violation::{Violation, ViolationKind};

/// Whether the union of dead (unreachable-without-satisfying) constraints collected for
/// `specification.function` covers the specification's error range.
///
/// A constraint is "dead" if satisfying it would make the program point it was collected
/// from unreachable, i.e. it's the complement of a live constraint. `Top` is always added
/// to the dead set so the meet loop still runs one pass even with no live constraints at
/// all; when that's the *only* constraint in play (`only_top` never false), the call is
/// entirely unchecked on every path, and that case is left to the unused-return detector
/// rather than reported here (mirrors the source's own comment on the distinction).
///
/// `IsLessThan` here is non-strict (subset-or-equal): the source's comment describes the
/// comparison as "meet is greater than or equal to the error specification", which only
/// holds if equal constraint ranges count as sufficient — confirmed by hand against a
/// single-comparison guard, where the live/dead constraint pair is the exact complement
/// of the specification. The lattice crate's own `is_less_than` stays strict, matching
/// the specification's partial-order definition (§4.1); this detector is the one place
/// that needs the relaxed variant, so it's kept local rather than exported.
fn covers(specification: SignLatticeElement, other: SignLatticeElement) -> bool {
    specification.is_less_than(other) || specification == other
}

fn is_sufficiently_checked(facts: &ReturnConstraintFacts, specification: &Specification) -> bool {
    let mut dead: Vec<SignLatticeElement> = facts
        .collect_constraints(&specification.function)
        .into_iter()
        .map(SignLatticeElement::complement)
        .collect();
    dead.push(SignLatticeElement::Top);

    let mut only_top = true;
    for &e1 in &dead {
        for &e2 in &dead {
            let meet = e1.meet(e2);
            if meet == SignLatticeElement::Bottom {
                continue;
            }
            if meet != SignLatticeElement::Top {
                only_top = false;
            }
            let meet_complement = meet.complement();
            if covers(specification.lattice_element, meet_complement) {
                return true;
            }
        }
    }
    only_top
}

/// Run the insufficient-check detector over every call site in `func` that targets
/// `specification.function`.
pub fn detect(
    module: &Module,
    func: FuncId,
    names: &NameResolver,
    specification: &Specification,
    constraints: &ReturnConstraintFacts,
    return_values: &ReturnValueFacts,
) -> Vec<Violation> {
    let function = module.function(func);
    let Some(callee_id) = module.find_by_source_name(&specification.function) else {
        return Vec::new();
    };
    if !should_check(module.function(callee_id), specification) {
        return Vec::new();
    }

    let mut violations = Vec::new();
    for (_, inst) in function.instructions() {
        let data = function.inst(inst);
        let Opcode::Call { callee, .. } = &data.opcode else { continue };
        let callee_name = names.of_value(module, func, *callee);
        if !callee_name
            .function_names()
            .iter()
            .any(|&n| n == specification.function)
        {
            continue;
        }
        let Some(result) = data.result else { continue };

        if return_values.flows_to_return(function, result) {
            continue;
        }
        if is_sufficiently_checked(constraints, specification) {
            continue;
        }

        violations.push(Violation::new(
            ViolationKind::InsufficientCheck,
            data.location.clone(),
            function.source_name.clone(),
            specification.function.clone(),
        ));
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use errspec_ir::fixtures;

    fn run(module: &errspec_ir::Module, callee: &str, spec_element: SignLatticeElement) -> Vec<Violation> {
        let names = NameResolver::resolve(module);
        let main = module.find_by_ir_name("main").unwrap();
        let constraints = crate::return_constraint::analyze(module, main, &names);
        let return_values = crate::return_value::analyze(module.function(main));
        let spec = Specification::new(callee, spec_element);
        detect(module, main, &names, &spec, &constraints, &return_values)
    }

    #[test]
    fn guarded_call_lt_zero_is_sufficiently_checked() {
        let module = fixtures::guarded_call_lt_zero();
        assert!(run(&module, "mustcheck", SignLatticeElement::LessThanZero).is_empty());
    }

    /// A call with no live constraint collected at all (`dead_constraints` reduces to
    /// `{Top}`, so every pairwise meet is `Top`) is left alone by this detector: the
    /// source comment on `only_top` explains this is deliberate, since an entirely
    /// unchecked call is the unused-return detector's concern, not this one's.
    #[test]
    fn two_call_sites_without_any_check_produce_no_insufficient_check_violations() {
        let module = fixtures::two_call_sites();
        let violations = run(&module, "foo", SignLatticeElement::LessThanZero);
        assert!(violations.is_empty());
    }

    /// `guarded_call_lt_zero` checks `< 0` exactly, which only covers a `NotZero`
    /// specification's error range in the `GreaterThanEqualZero` half, not the
    /// `LessThanZero` half it omits: the meet/complement loop finds no pair whose
    /// complement covers `NotZero`, so this is reported as insufficiently checked.
    #[test]
    fn guarded_call_lt_zero_does_not_cover_a_not_zero_specification() {
        let module = fixtures::guarded_call_lt_zero();
        let violations = run(&module, "mustcheck", SignLatticeElement::NotZero);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].callee, "mustcheck");
    }

    /// `guarded_call_eq_zero_or_minus_one` chains two `icmp`s: `== 0` first, `== -1`
    /// second. The `== 0` check alone already narrows the `== -1` branch's "both checks
    /// failed" edge down to `GreaterThanZero` (not merely `GreaterThanEqualZero`), so a
    /// `LessThanEqualZero` specification is exactly covered by the complement of that
    /// narrowed path while a `GreaterThanEqualZero` specification is not.
    #[test]
    fn guarded_call_eq_zero_or_minus_one_covers_less_than_equal_zero_but_not_greater_than_equal_zero() {
        let module = fixtures::guarded_call_eq_zero_or_minus_one();
        assert!(run(&module, "mustcheck", SignLatticeElement::LessThanEqualZero).is_empty());

        let violations = run(&module, "mustcheck", SignLatticeElement::GreaterThanEqualZero);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].callee, "mustcheck");
        assert_eq!(violations[0].kind, ViolationKind::InsufficientCheck);
    }
}
