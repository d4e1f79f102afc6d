//! Name resolution, intraprocedural dataflow, and the two call-site detectors that
//! operate purely on a single function's body.
//!
//! The interprocedural pieces (the call graph, the pushdown system, the random walker)
//! live in `errspec-icfg`; this crate only needs enough of a function's own body to
//! decide whether one call site inside it respects one specification.

pub mod checker;
pub mod config;
pub mod insufficient_check;
pub mod name_resolver;
pub mod return_constraint;
pub mod return_value;
pub mod specification;
pub mod unused_return;
pub mod var_name;
pub mod violation;

pub use checker::should_check;
pub use config::DataFlowConfig;
pub use name_resolver::NameResolver;
pub use specification::Specification;
pub use var_name::VarName;
pub use violation::{Violation, ViolationKind};

use errspec_ir::Module;
use rayon::prelude::*;

/// Run both intraprocedural detectors over every analyzable function in `module` against
/// every specification, in parallel (§5's detector pool).
///
/// Each worker analyzes one function's `return_constraint`/`return_value` facts once and
/// reuses them across every specification that names a callee appearing in that function,
/// rather than recomputing per-specification.
pub fn run_detectors(module: &Module, names: &NameResolver, specifications: &[Specification]) -> Vec<Violation> {
    module
        .analyzable_functions()
        .collect::<Vec<_>>()
        .into_par_iter()
        .flat_map(|func| {
            let function = module.function(func);
            let constraints = return_constraint::analyze(module, func, names);
            let return_values = return_value::analyze(function);

            specifications
                .iter()
                .flat_map(|spec| {
                    let mut found = insufficient_check::detect(module, func, names, spec, &constraints, &return_values);
                    found.extend(unused_return::detect(module, func, names, spec));
                    found
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use errspec_ir::fixtures;
    use errspec_lattice::SignLatticeElement;

    #[test]
    fn run_detectors_reports_both_violation_kinds_for_an_unchecked_call() {
        let module = fixtures::hello_printf();
        let names = NameResolver::resolve(&module);
        let specs = vec![Specification::new("printf", SignLatticeElement::LessThanZero)];
        let violations = run_detectors(&module, &names, &specs);

        assert!(violations.iter().any(|v| v.kind == ViolationKind::InsufficientCheck));
        assert!(violations.iter().any(|v| v.kind == ViolationKind::UnusedReturnValue));
    }

    #[test]
    fn run_detectors_is_silent_for_a_sufficiently_checked_call() {
        let module = fixtures::guarded_call_lt_zero();
        let names = NameResolver::resolve(&module);
        let specs = vec![Specification::new("mustcheck", SignLatticeElement::LessThanZero)];
        assert!(run_detectors(&module, &names, &specs).is_empty());
    }
}
