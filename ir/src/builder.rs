//! A small in-memory builder for constructing [`Module`]s and [`Function`]s directly,
//! used by tests (and by any caller that already has its own IR and just wants to
//! construct our object model without writing a full reader).
//!
//! This is not a parser: it has no notion of C, LLVM textual IR, or bitcode. It exists
//! purely so the analyses in `errspec-analysis`/`errspec-icfg` have something concrete to
//! run against in tests.

use crate::{
    block::Block,
    entities::{BlockId, FuncId, GlobalId, InstId, ValueId},
    function::Function,
    inst::{Inst, Opcode},
    location::Location,
    module::Module,
    types::{BinaryOp, IcmpPredicate, Type},
    value::{Global, ValueData, ValueKind},
};

impl Function {
    pub fn create_block(&mut self) -> BlockId {
        let block = self.blocks.push(Block::default());
        if self.entry_block.is_none() {
            self.entry_block = Some(block);
        }
        block
    }

    pub fn append_param(&mut self, ty: Type) -> ValueId {
        let index = self.params.len() as u32;
        let value = self.values.push(ValueData {
            kind: ValueKind::Arg(index),
            ty,
        });
        self.params.push(value);
        value
    }

    pub fn const_int(&mut self, value: i64) -> ValueId {
        self.values.push(ValueData {
            kind: ValueKind::ConstInt(value),
            ty: Type::Int(64),
        })
    }

    pub fn null_value(&mut self, ty: Type) -> ValueId {
        self.values.push(ValueData {
            kind: ValueKind::Null,
            ty,
        })
    }

    pub fn global_value(&mut self, global: GlobalId, ty: Type) -> ValueId {
        self.values.push(ValueData {
            kind: ValueKind::Global(global),
            ty,
        })
    }

    pub fn function_value(&mut self, callee: FuncId, ty: Type) -> ValueId {
        self.values.push(ValueData {
            kind: ValueKind::Function(callee),
            ty,
        })
    }

    /// Append an instruction that defines a value of type `ty` to `block`, returning the
    /// new value id.
    fn push_defining(&mut self, block: BlockId, opcode: Opcode, ty: Type, loc: Location) -> ValueId {
        let inst = self.insts.push(Inst::new(opcode, None, loc));
        let value = self.values.push(ValueData {
            kind: ValueKind::InstResult(inst),
            ty,
        });
        self.insts[inst].result = Some(value);
        self.blocks[block].insts.push(inst);
        value
    }

    /// Append an instruction with no result (terminators, stores, debug intrinsics).
    fn push_void(&mut self, block: BlockId, opcode: Opcode, loc: Location) -> InstId {
        let inst = self.insts.push(Inst::new(opcode, None, loc));
        self.blocks[block].insts.push(inst);
        inst
    }

    pub fn alloca(&mut self, block: BlockId, loc: Location) -> ValueId {
        self.push_defining(block, Opcode::Alloca, Type::Pointer(Box::new(Type::Int(64))), loc)
    }

    pub fn store(&mut self, block: BlockId, value: ValueId, ptr: ValueId, loc: Location) -> InstId {
        self.push_void(block, Opcode::Store { value, ptr }, loc)
    }

    pub fn load(&mut self, block: BlockId, ptr: ValueId, ty: Type, loc: Location) -> ValueId {
        self.push_defining(block, Opcode::Load { ptr }, ty, loc)
    }

    pub fn call(
        &mut self,
        block: BlockId,
        callee: ValueId,
        args: Vec<ValueId>,
        ret_ty: Type,
        loc: Location,
    ) -> ValueId {
        self.push_defining(block, Opcode::Call { callee, args }, ret_ty, loc)
    }

    /// A call whose return value is discarded (no result value, matching `use_empty()`
    /// in the original for a call with no uses — we simply never materialize a value).
    pub fn call_void(&mut self, block: BlockId, callee: ValueId, args: Vec<ValueId>, loc: Location) -> InstId {
        self.push_void(block, Opcode::Call { callee, args }, loc)
    }

    pub fn icmp(
        &mut self,
        block: BlockId,
        pred: IcmpPredicate,
        lhs: ValueId,
        rhs: ValueId,
        loc: Location,
    ) -> ValueId {
        self.push_defining(block, Opcode::Icmp { pred, lhs, rhs }, Type::Int(1), loc)
    }

    pub fn phi(&mut self, block: BlockId, incoming: Vec<(BlockId, ValueId)>, ty: Type, loc: Location) -> ValueId {
        self.push_defining(block, Opcode::Phi { incoming }, ty, loc)
    }

    pub fn select(
        &mut self,
        block: BlockId,
        cond: ValueId,
        if_true: ValueId,
        if_false: ValueId,
        ty: Type,
        loc: Location,
    ) -> ValueId {
        self.push_defining(
            block,
            Opcode::Select {
                cond,
                if_true,
                if_false,
            },
            ty,
            loc,
        )
    }

    pub fn gep(
        &mut self,
        block: BlockId,
        base: ValueId,
        struct_ty: Option<String>,
        idx1: u32,
        idx2: u32,
        loc: Location,
    ) -> ValueId {
        self.push_defining(
            block,
            Opcode::Gep {
                base,
                struct_ty,
                idx1,
                idx2,
            },
            Type::Pointer(Box::new(Type::Int(64))),
            loc,
        )
    }

    pub fn br(&mut self, block: BlockId, target: BlockId, loc: Location) -> InstId {
        self.push_void(block, Opcode::Br { target }, loc)
    }

    pub fn cond_br(
        &mut self,
        block: BlockId,
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
        loc: Location,
    ) -> InstId {
        self.push_void(
            block,
            Opcode::CondBr {
                cond,
                then_block,
                else_block,
            },
            loc,
        )
    }

    pub fn ret(&mut self, block: BlockId, value: Option<ValueId>, loc: Location) -> InstId {
        self.push_void(block, Opcode::Ret { value }, loc)
    }

    pub fn binary(&mut self, block: BlockId, op: BinaryOp, lhs: ValueId, rhs: ValueId, ty: Type, loc: Location) -> ValueId {
        self.push_defining(block, Opcode::Binary { op, lhs, rhs }, ty, loc)
    }

    pub fn debug_declare(&mut self, block: BlockId, value: ValueId, var_name: impl Into<String>, loc: Location) -> InstId {
        self.push_void(
            block,
            Opcode::DebugDeclare {
                value,
                var_name: var_name.into(),
            },
            loc,
        )
    }
}

impl Module {
    pub fn add_function(&mut self, function: Function) -> FuncId {
        let is_main = function.source_name == "main";
        let id = self.functions.push(function);
        if is_main {
            self.main = Some(id);
        }
        id
    }

    pub fn add_global(&mut self, global: Global) -> GlobalId {
        self.globals.push(global)
    }
}
