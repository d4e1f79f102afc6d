use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashMap;

use crate::{
    block::Block,
    entities::{BlockId, InstId, ValueId},
    inst::Inst,
    types::Type,
    value::ValueData,
};

/// A function definition or declaration.
///
/// Functions carry two names (§3 "Function identity"): `source_name`, taken from debug
/// info and possibly empty, and `ir_name`, the (possibly mangled) name the IR itself
/// uses and which the intraprocedural analyses key their per-instruction facts by.
#[derive(Debug, Clone)]
pub struct Function {
    pub source_name: String,
    pub ir_name: String,
    pub return_type: Type,
    pub is_declaration: bool,
    pub is_intrinsic: bool,
    pub entry_block: Option<BlockId>,
    pub blocks: PrimaryMap<BlockId, Block>,
    pub insts: PrimaryMap<InstId, Inst>,
    pub values: PrimaryMap<ValueId, ValueData>,
    /// Value ids of the function's formal parameters, in order.
    pub params: Vec<ValueId>,
}

impl Function {
    pub fn new(source_name: impl Into<String>, ir_name: impl Into<String>, return_type: Type) -> Self {
        Self {
            source_name: source_name.into(),
            ir_name: ir_name.into(),
            return_type,
            is_declaration: false,
            is_intrinsic: false,
            entry_block: None,
            blocks: PrimaryMap::new(),
            insts: PrimaryMap::new(),
            values: PrimaryMap::new(),
            params: Vec::new(),
        }
    }

    pub fn declaration(source_name: impl Into<String>, ir_name: impl Into<String>, return_type: Type) -> Self {
        let mut f = Self::new(source_name, ir_name, return_type);
        f.is_declaration = true;
        f
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id]
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    /// Every instruction in the function, in block and then program order.
    pub fn instructions(&self) -> impl Iterator<Item = (BlockId, InstId)> + '_ {
        self.blocks
            .keys()
            .flat_map(move |bb| self.blocks[bb].insts.iter().map(move |&inst| (bb, inst)))
    }

    /// The successor blocks of `block`, derived from its terminator instruction.
    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        match self.blocks[block].last_inst() {
            Some(inst) => self.insts[inst].opcode.successors(),
            None => Vec::new(),
        }
    }

    /// The predecessor blocks of `block`, computed by scanning every block's terminator.
    ///
    /// Intraprocedural, so a linear scan per query is acceptable; callers that need this
    /// repeatedly should cache the result via [`Function::predecessor_map`].
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        self.blocks
            .keys()
            .filter(|&bb| self.successors(bb).contains(&block))
            .collect()
    }

    /// A precomputed predecessor map for every block in the function.
    pub fn predecessor_map(&self) -> FxHashMap<BlockId, Vec<BlockId>> {
        let mut preds: FxHashMap<BlockId, Vec<BlockId>> =
            self.blocks.keys().map(|bb| (bb, Vec::new())).collect();
        for bb in self.blocks.keys() {
            for succ in self.successors(bb) {
                preds.entry(succ).or_default().push(bb);
            }
        }
        preds
    }

    /// Values semantically local to this function: its parameters and every
    /// instruction-defined value. Globals and constants are never local (§4.3
    /// `local_values`).
    pub fn local_values(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.values.keys()
    }
}
