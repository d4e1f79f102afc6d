//! The unused-return-value detector (§4.8): a checked-for-errors function whose result is
//! computed and then never read by anything.
//!
//! Grounded on `checker/src/unused_values_pass.cc`'s `VisitCallInst`, which walks the
//! defined value's use-list; this object model carries no use-lists, so [`is_used`] scans
//! operands directly, which is equivalent for an intraprocedural query.

use errspec_ir::{Function, Opcode, ValueId};

use crate::checker::should_check;
use crate::specification::Specification;
use crate::violation::{Violation, ViolationKind};
use errspec_ir::{FuncId, Module};

fn operands_of(opcode: &Opcode) -> Vec<ValueId> {
    match opcode {
        Opcode::Store { value, ptr } => vec![*value, *ptr],
        Opcode::Load { ptr } => vec![*ptr],
        Opcode::Call { callee, args } => {
            let mut v = vec![*callee];
            v.extend(args);
            v
        }
        Opcode::Icmp { lhs, rhs, .. } => vec![*lhs, *rhs],
        Opcode::Phi { incoming } => incoming.iter().map(|&(_, v)| v).collect(),
        Opcode::Select { cond, if_true, if_false } => vec![*cond, *if_true, *if_false],
        Opcode::Gep { base, .. } => vec![*base],
        Opcode::CondBr { cond, .. } => vec![*cond],
        Opcode::Ret { value } => value.iter().copied().collect(),
        Opcode::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
        Opcode::DebugDeclare { value, .. } => vec![*value],
        Opcode::Alloca | Opcode::Br { .. } | Opcode::Other { .. } => Vec::new(),
    }
}

/// Whether any other instruction in `function` references `value` as an operand.
fn is_used(function: &Function, value: ValueId) -> bool {
    function
        .instructions()
        .any(|(_, inst)| operands_of(&function.inst(inst).opcode).contains(&value))
}

/// Run the unused-return-value detector over every call site in `func` that targets
/// `specification.function`.
pub fn detect(module: &Module, func: FuncId, names: &crate::name_resolver::NameResolver, specification: &Specification) -> Vec<Violation> {
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

        let used = match data.result {
            Some(result) => is_used(function, result),
            None => false,
        };
        if used {
            continue;
        }

        violations.push(Violation::new(
            ViolationKind::UnusedReturnValue,
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
    use crate::name_resolver::NameResolver;
    use errspec_ir::fixtures;
    use errspec_lattice::SignLatticeElement;

    #[test]
    fn discarded_call_result_is_unused() {
        let module = fixtures::hello_printf();
        let names = NameResolver::resolve(&module);
        let main = module.find_by_ir_name("main").unwrap();
        let spec = Specification::new("printf", SignLatticeElement::LessThanZero);
        let violations = detect(&module, main, &names, &spec);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::UnusedReturnValue);
    }

    #[test]
    fn checked_call_result_is_used() {
        let module = fixtures::guarded_call_lt_zero();
        let names = NameResolver::resolve(&module);
        let main = module.find_by_ir_name("main").unwrap();
        let spec = Specification::new("mustcheck", SignLatticeElement::LessThanZero);
        assert!(detect(&module, main, &names, &spec).is_empty());
    }
}
