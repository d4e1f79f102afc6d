//! Intraprocedural return-constraint propagation (§4.5): for each instruction, a map
//! from callee source-name to the sign-lattice element its return value is constrained
//! to, under which execution is still live at that instruction.
//!
//! No source file for this pass survived retrieval (it isn't among the 37 files kept in
//! the original source dump), so this is grounded on the narrowing idiom
//! `checker/src/insufficient_checks_pass.cc` itself uses (`Meet` combines constraints
//! that both still hold) rather than on a matching pass file: each `icmp` branch seeds a
//! per-edge refinement, and a block merges its predecessors by meeting each one's edge
//! refinement with whatever that predecessor already had narrowed (so a second, chained
//! `icmp` compounds onto the first instead of replacing it), then joining across
//! predecessors. Instructions with no bearing on any callee's constraint pass their
//! incoming fact through unchanged.

use rustc_hash::{FxHashMap, FxHashSet};

use errspec_ir::{BlockId, FuncId, IcmpPredicate, InstId, Module, Opcode, ValueId, ValueKind};
use errspec_lattice::SignLatticeElement;

use crate::name_resolver::NameResolver;

pub type ConstraintMap = FxHashMap<String, SignLatticeElement>;

#[derive(Debug, Default)]
pub struct ReturnConstraintFacts {
    in_facts: FxHashMap<InstId, ConstraintMap>,
}

impl ReturnConstraintFacts {
    pub fn in_fact(&self, inst: InstId) -> Option<&ConstraintMap> {
        self.in_facts.get(&inst)
    }

    /// Every distinct constraint ever recorded against `callee_name`, across every
    /// instruction in the function (§4.7 step 2's `CollectConstraints`).
    pub fn collect_constraints(&self, callee_name: &str) -> Vec<SignLatticeElement> {
        let mut seen = Vec::new();
        for facts in self.in_facts.values() {
            if let Some(&element) = facts.get(callee_name) {
                if !seen.contains(&element) {
                    seen.push(element);
                }
            }
        }
        seen
    }
}

/// The sign element a literal int's value falls into: `Zero`, `LessThanZero`, or
/// `GreaterThanZero`. Used to classify the constant operand of an `icmp`.
fn sign_of_const(value: i64) -> SignLatticeElement {
    use std::cmp::Ordering::*;
    match value.cmp(&0) {
        Equal => SignLatticeElement::Zero,
        Less => SignLatticeElement::LessThanZero,
        Greater => SignLatticeElement::GreaterThanZero,
    }
}

/// The lattice element a predicate compared against a literal of the given sign admits,
/// e.g. `(Slt, Zero) -> LessThanZero`.
fn predicate_element(pred: IcmpPredicate, const_sign: SignLatticeElement) -> SignLatticeElement {
    use IcmpPredicate::*;
    use SignLatticeElement::*;
    match (pred, const_sign) {
        (Eq, s) => s,
        (Ne, s) => s.complement(),
        (Slt, Zero) => LessThanZero,
        (Sle, Zero) => LessThanEqualZero,
        (Sgt, Zero) => GreaterThanZero,
        (Sge, Zero) => GreaterThanEqualZero,
        // Non-zero literal comparisons are over-approximated by the literal's own sign
        // category; there is no element in this lattice for "< -3" more precise than
        // "< 0".
        (Slt, GreaterThanZero) | (Sle, GreaterThanZero) => Top,
        (Slt, LessThanZero) | (Sle, LessThanZero) => LessThanZero,
        (Sgt, LessThanZero) | (Sge, LessThanZero) => Top,
        (Sgt, GreaterThanZero) | (Sge, GreaterThanZero) => GreaterThanZero,
        _ => Top,
    }
}

/// Resolve which callee (if any) a comparison operand names, and the sign of the other
/// operand if it is a known constant. Returns `(callee_name, predicate, const_sign)` with
/// the predicate already swapped if the callee operand was on the right.
fn seed_from_icmp(
    module: &Module,
    func: FuncId,
    names: &NameResolver,
    pred: IcmpPredicate,
    lhs: ValueId,
    rhs: ValueId,
) -> Option<(String, IcmpPredicate, SignLatticeElement)> {
    let function = module.function(func);
    let rhs_const = match function.value(rhs).kind {
        ValueKind::ConstInt(v) => Some(sign_of_const(v)),
        _ => None,
    };
    let lhs_callee = callee_of_exchange(names.of_value(module, func, lhs));

    if let (Some(callee), Some(sign)) = (lhs_callee.clone(), rhs_const) {
        return Some((callee, pred, sign));
    }

    let lhs_const = match function.value(lhs).kind {
        ValueKind::ConstInt(v) => Some(sign_of_const(v)),
        _ => None,
    };
    let rhs_callee = callee_of_exchange(names.of_value(module, func, rhs));
    if let (Some(callee), Some(sign)) = (rhs_callee, lhs_const) {
        return Some((callee, pred.swapped(), sign));
    }

    None
}

fn callee_of_exchange(name: crate::var_name::VarName) -> Option<String> {
    match name {
        crate::var_name::VarName::Int(n) => n.strip_suffix("$return").map(str::to_string),
        _ => None,
    }
}

pub fn analyze(module: &Module, func: FuncId, names: &NameResolver) -> ReturnConstraintFacts {
    let function = module.function(func);
    let preds = function.predecessor_map();
    let mut block_in: FxHashMap<BlockId, ConstraintMap> = FxHashMap::default();
    let mut edge_refinement: FxHashMap<(BlockId, BlockId), ConstraintMap> = FxHashMap::default();
    let mut facts = ReturnConstraintFacts::default();

    // Seed edge refinements once: they only depend on each block's terminator, not on
    // the fixpoint state, so there's no need to recompute them every iteration.
    for block in function.blocks.keys() {
        let Some(term) = function.block(block).last_inst() else { continue };
        if let Opcode::CondBr { cond, then_block, else_block } = &function.inst(term).opcode {
            let (cond, then_block, else_block) = (*cond, *then_block, *else_block);
            if let ValueKind::InstResult(cond_inst) = function.value(cond).kind {
                if let Opcode::Icmp { pred, lhs, rhs } = &function.inst(cond_inst).opcode {
                    let (pred, lhs, rhs) = (*pred, *lhs, *rhs);
                    if let Some((callee, pred, sign)) = seed_from_icmp(module, func, names, pred, lhs, rhs) {
                        let element = predicate_element(pred, sign);
                        edge_refinement.entry((block, then_block)).or_default().insert(callee.clone(), element);
                        edge_refinement
                            .entry((block, else_block))
                            .or_default()
                            .insert(callee, element.complement());
                    }
                }
            }
        }
    }

    let blocks: Vec<BlockId> = function.blocks.keys().collect();
    let mut changed = true;
    while changed {
        changed = false;
        for &block in &blocks {
            let mut merged: FxHashMap<String, (SignLatticeElement, usize)> = FxHashMap::default();
            let pred_list: Vec<BlockId> = preds.get(&block).cloned().unwrap_or_default();
            for &p in &pred_list {
                let Some(out) = block_in.get(&p) else { continue };
                let refined = edge_refinement.get(&(p, block));
                let mut callees: FxHashSet<&str> = out.keys().map(String::as_str).collect();
                if let Some(refined) = refined {
                    callees.extend(refined.keys().map(String::as_str));
                }
                for callee in callees {
                    // An edge's own refinement narrows whatever the predecessor already
                    // established, it doesn't replace it: a second `icmp` chained off an
                    // earlier one (e.g. `== 0 || == -1`) must retain the first check's
                    // narrowing on the branch where the second check fails, or the two
                    // conditions stop compounding.
                    let refined_value = refined.and_then(|r| r.get(callee)).copied();
                    let out_value = out.get(callee).copied();
                    let value = match (refined_value, out_value) {
                        (Some(r), Some(o)) => r.meet(o),
                        (Some(r), None) => r,
                        (None, Some(o)) => o,
                        (None, None) => unreachable!("callee came from out or refined keys"),
                    };
                    let entry = merged.entry(callee.to_string()).or_insert((value, 0));
                    entry.0 = entry.0.join(value);
                    entry.1 += 1;
                }
            }
            // Callees present in only some predecessors default to Top (§4.5).
            let mut new_in = ConstraintMap::default();
            for (callee, (value, count)) in merged {
                let value = if count < pred_list.len() { value.join(SignLatticeElement::Top) } else { value };
                new_in.insert(callee, value);
            }

            if block_in.get(&block) != Some(&new_in) {
                block_in.insert(block, new_in);
                changed = true;
            }

            let in_fact = block_in[&block].clone();
            for &inst in &function.block(block).insts {
                facts.in_facts.insert(inst, in_fact.clone());
            }
        }
    }

    facts
}
