use errspec_ir::{fixtures, inst::Opcode, Location};
use pretty_assertions::assert_eq;

#[test]
fn hello_printf_calls_printf_once_unchecked() {
    let module = fixtures::hello_printf();
    let main = module.function(module.find_by_ir_name("main").unwrap());

    let calls: Vec<_> = main
        .instructions()
        .filter(|&(_, inst)| main.inst(inst).opcode.is_call())
        .collect();
    assert_eq!(calls.len(), 1);

    let (_, call_inst) = calls[0];
    assert_eq!(main.inst(call_inst).result, None);
    assert_eq!(main.inst(call_inst).location, Location::new("hello.c", 1));
}

#[test]
fn guarded_call_branches_on_checked_result() {
    let module = fixtures::guarded_call_lt_zero();
    let main = module.function(module.find_by_ir_name("main").unwrap());

    let icmp_count = main
        .instructions()
        .filter(|&(_, inst)| matches!(main.inst(inst).opcode, Opcode::Icmp { .. }))
        .count();
    assert_eq!(icmp_count, 1);

    let entry = main.entry_block.expect("builder sets entry block");
    assert_eq!(main.successors(entry).len(), 2);
}

#[test]
fn guarded_call_or_combines_two_comparisons() {
    let module = fixtures::guarded_call_eq_zero_or_minus_one();
    let main = module.function(module.find_by_ir_name("main").unwrap());

    let icmp_count = main
        .instructions()
        .filter(|&(_, inst)| matches!(main.inst(inst).opcode, Opcode::Icmp { .. }))
        .count();
    assert_eq!(icmp_count, 2);
}

#[test]
fn two_call_sites_target_the_same_callee() {
    let module = fixtures::two_call_sites();
    let main = module.function(module.find_by_ir_name("main").unwrap());

    let call_callees: Vec<_> = main
        .instructions()
        .filter_map(|(_, inst)| match &main.inst(inst).opcode {
            Opcode::Call { callee, .. } => Some(*callee),
            _ => None,
        })
        .collect();
    assert_eq!(call_callees.len(), 2);
    assert_eq!(call_callees[0], call_callees[1]);
}

#[test]
fn predecessor_map_is_consistent_with_successors() {
    let module = fixtures::guarded_call_lt_zero();
    let main = module.function(module.find_by_ir_name("main").unwrap());
    let preds = main.predecessor_map();

    for block in main.blocks.keys() {
        for succ in main.successors(block) {
            assert!(preds[&succ].contains(&block));
        }
    }
}
