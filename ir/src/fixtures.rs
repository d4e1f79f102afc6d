//! Hand-built seed programs shared by this crate's own tests and by the downstream
//! `errspec-analysis`/`errspec-icfg` test suites, so the "concrete end-to-end scenarios"
//! only need to be constructed once.

use crate::{
    function::Function,
    module::Module,
    types::{IcmpPredicate, Type},
    location::Location,
};

/// `int main() { printf("hi"); return 0; }`
///
/// `printf` is an external declaration called once, its result never checked or used.
/// Exercises both the insufficient-check and the unused-return detector against a
/// `LessThanZero` specification on `printf`.
pub fn hello_printf() -> Module {
    let mut module = Module::new();

    let printf = Function::declaration("printf", "printf", Type::Int(32));
    module.add_function(printf);

    let mut main = Function::new("main", "main", Type::Int(32));
    let entry = main.create_block();
    let printf_value = main.function_value(
        module.find_by_ir_name("printf").expect("printf declared above"),
        Type::Pointer(Box::new(Type::Int(32))),
    );
    main.call_void(entry, printf_value, Vec::new(), Location::new("hello.c", 1));
    let zero = main.const_int(0);
    main.ret(entry, Some(zero), Location::new("hello.c", 1));
    module.add_function(main);

    module
}

/// `if (mustcheck() < 0) { return; } return;`
///
/// The call's result is checked against `< 0` before either path returns: sufficient for
/// a `LessThanZero` specification.
pub fn guarded_call_lt_zero() -> Module {
    let mut module = Module::new();
    module.add_function(Function::declaration("mustcheck", "mustcheck", Type::Int(32)));

    let mut main = Function::new("main", "main", Type::Void);
    let entry = main.create_block();
    let then_block = main.create_block();
    let else_block = main.create_block();

    let callee = main.function_value(
        module.find_by_ir_name("mustcheck").unwrap(),
        Type::Pointer(Box::new(Type::Int(32))),
    );
    let loc = Location::new("guard.c", 1);
    let result = main.call(entry, callee, Vec::new(), Type::Int(32), loc.clone());
    let zero = main.const_int(0);
    let cond = main.icmp(entry, IcmpPredicate::Slt, result, zero, loc.clone());
    main.cond_br(entry, cond, then_block, else_block, loc.clone());
    main.ret(then_block, None, loc.clone());
    main.ret(else_block, None, loc);
    module.add_function(main);

    module
}

/// `if (mustcheck() == 0) { return; } if (mustcheck_result == -1) { return; } return;`,
/// the short-circuit lowering of `mustcheck() == 0 || mustcheck_result == -1` as two
/// chained single-icmp branches (the shape return-constraint propagation actually seeds
/// on; a combined boolean feeding one branch produces no refinement at all, per §4.5).
pub fn guarded_call_eq_zero_or_minus_one() -> Module {
    let mut module = Module::new();
    module.add_function(Function::declaration("mustcheck", "mustcheck", Type::Int(32)));

    let mut main = Function::new("main", "main", Type::Void);
    let entry = main.create_block();
    let check2 = main.create_block();
    let then_block = main.create_block();
    let else_block = main.create_block();

    let callee = main.function_value(
        module.find_by_ir_name("mustcheck").unwrap(),
        Type::Pointer(Box::new(Type::Int(32))),
    );
    let loc = Location::new("guard_or.c", 1);
    let result = main.call(entry, callee, Vec::new(), Type::Int(32), loc.clone());
    let zero = main.const_int(0);
    let eq_zero = main.icmp(entry, IcmpPredicate::Eq, result, zero, loc.clone());
    main.cond_br(entry, eq_zero, then_block, check2, loc.clone());

    let minus_one = main.const_int(-1);
    let eq_minus_one = main.icmp(check2, IcmpPredicate::Eq, result, minus_one, loc.clone());
    main.cond_br(check2, eq_minus_one, then_block, else_block, loc.clone());

    main.ret(then_block, None, loc.clone());
    main.ret(else_block, None, loc);
    module.add_function(main);

    module
}

/// `main` calls `foo` twice, once per call site, `foo` always returns normally.
///
/// Used to check that a context-sensitive walk returning from `foo` at one call site
/// never resumes at the other call site's return edge.
pub fn two_call_sites() -> Module {
    let mut module = Module::new();

    let mut foo = Function::new("foo", "foo", Type::Int(32));
    let foo_entry = foo.create_block();
    let one = foo.const_int(1);
    foo.ret(foo_entry, Some(one), Location::new("two_calls.c", 1));
    module.add_function(foo);

    let mut main = Function::new("main", "main", Type::Int(32));
    let entry = main.create_block();
    let foo_id = module.find_by_ir_name("foo").unwrap();
    let foo_value = main.function_value(foo_id, Type::Pointer(Box::new(Type::Int(32))));
    let call1 = main.call(entry, foo_value, Vec::new(), Type::Int(32), Location::new("two_calls.c", 10));
    let call2 = main.call(entry, foo_value, Vec::new(), Type::Int(32), Location::new("two_calls.c", 11));
    let sum = main.binary(
        entry,
        crate::types::BinaryOp::Add,
        call1,
        call2,
        Type::Int(32),
        Location::new("two_calls.c", 12),
    );
    main.ret(entry, Some(sum), Location::new("two_calls.c", 12));
    module.add_function(main);

    module
}
