//! Assigns every IR value a stable [`VarName`], and every instruction/block/function a
//! stable string identity used by the ICFG builder and, downstream, the walker.
//!
//! Grounded on `getgraph/src/names_pass.cc`'s `NamesPass`: one forward pass over the
//! module building a `names_` map (here, `value_names`), with its separate
//! `memory_model_` side table for field-address stores and loads.

use rustc_hash::FxHashMap;

use errspec_ir::{BlockId, FuncId, InstId, Module, Opcode, ValueId, ValueKind};

use crate::var_name::{MemoryName, VarName};

/// The resolved names for an entire module, computed once and then queried freely.
#[derive(Debug, Default)]
pub struct NameResolver {
    global_names: FxHashMap<errspec_ir::GlobalId, VarName>,
    function_names: FxHashMap<FuncId, VarName>,
    value_names: FxHashMap<(FuncId, ValueId), VarName>,
    stack_names: FxHashMap<(FuncId, InstId), String>,
    memory_model: FxHashMap<MemoryName, VarName>,
    load_index: FxHashMap<(FuncId, InstId), MemoryName>,
    stack_counter: u32,
    intermediate_counter: u32,
}

impl NameResolver {
    /// Resolve every value in `module`, in module (function/block/instruction) order.
    pub fn resolve(module: &Module) -> Self {
        let mut resolver = Self::default();
        resolver.resolve_globals(module);
        resolver.resolve_functions(module);
        for func in module.functions.keys() {
            if module.function(func).is_declaration || module.function(func).is_intrinsic {
                continue;
            }
            resolver.resolve_function_body(module, func);
        }
        resolver
    }

    fn resolve_globals(&mut self, module: &Module) {
        for id in module.globals.keys() {
            let global = module.global(id);
            let name = if let Some(ec) = &global.error_code_name {
                VarName::ErrorCode(ec.clone())
            } else if !global.name.is_empty()
                && !global.is_unnamed_addr
                && !global.is_null_pointer
                && global.ty.is_pointer_or_int()
            {
                VarName::Int(global.name.clone())
            } else {
                VarName::Empty
            };
            self.global_names.insert(id, name);
        }
    }

    fn resolve_functions(&mut self, module: &Module) {
        for id in module.functions.keys() {
            let function = module.function(id);
            self.function_names.insert(id, VarName::Function(function.source_name.clone()));
            for (i, &param) in function.params.iter().enumerate() {
                let name = format!("{}$arg{i}", function.source_name);
                self.value_names.insert((id, param), VarName::Int(name));
            }
        }
    }

    fn resolve_function_body(&mut self, module: &Module, func: FuncId) {
        let function = module.function(func);
        for (block, inst) in function.instructions() {
            self.stack_name_of(func, inst, function);
            let data = function.inst(inst);
            match &data.opcode {
                Opcode::Alloca => {
                    if !self.value_names.contains_key(&(func, data.result.unwrap())) {
                        let name = format!("cabs2cil_{}", self.intermediate_counter);
                        self.intermediate_counter += 1;
                        self.value_names.insert((func, data.result.unwrap()), VarName::Int(name));
                    }
                }
                Opcode::DebugDeclare { value, var_name } => {
                    let name = format!("{}#{var_name}", function.source_name);
                    self.value_names.insert((func, *value), VarName::Int(name));
                }
                Opcode::Store { value, ptr } => self.resolve_store(module, func, *value, *ptr),
                Opcode::Load { ptr } => self.resolve_load(module, func, data.result.unwrap(), *ptr),
                Opcode::Call { callee, .. } => self.resolve_call(module, func, data.result, *callee),
                Opcode::Phi { incoming } => {
                    let names = incoming
                        .iter()
                        .map(|&(_, v)| self.of_value(module, func, v))
                        .collect::<Vec<_>>();
                    self.value_names.insert((func, data.result.unwrap()), VarName::multi(names));
                }
                Opcode::Select { if_true, if_false, .. } => {
                    let names = vec![
                        self.of_value(module, func, *if_true),
                        self.of_value(module, func, *if_false),
                    ];
                    self.value_names.insert((func, data.result.unwrap()), VarName::multi(names));
                }
                Opcode::Gep { base, struct_ty, idx1, idx2 } => {
                    if let Some(ty) = struct_ty {
                        let key = MemoryName::new(ty, *idx1, *idx2);
                        self.value_names.insert((func, data.result.unwrap()), VarName::Memory(key));
                    } else {
                        let _ = base;
                    }
                }
                Opcode::Binary { .. } => {
                    self.value_names
                        .insert((func, data.result.unwrap()), VarName::ErrorCode("OK".to_string()));
                }
                _ => {}
            }
            let _ = block;
        }
    }

    fn resolve_store(&mut self, module: &Module, func: FuncId, value: ValueId, ptr: ValueId) {
        let sender_name = self.of_value(module, func, value);

        let function = module.function(func);
        if let ValueKind::InstResult(ptr_inst) = function.value(ptr).kind {
            if let Opcode::Gep { struct_ty: Some(ty), idx1, idx2, .. } = &function.inst(ptr_inst).opcode {
                let key = MemoryName::new(ty, *idx1, *idx2);
                self.update_memory(key, sender_name);
                return;
            }
        }

        // Copying a function value into a local makes that local an alias for the
        // function (direct assignment of a function pointer).
        if let VarName::Function(_) = &sender_name {
            self.value_names.insert((func, ptr), sender_name);
        }
    }

    fn resolve_load(&mut self, module: &Module, func: FuncId, result: ValueId, ptr: ValueId) {
        let function = module.function(func);
        if let ValueKind::InstResult(ptr_inst) = function.value(ptr).kind {
            if let Opcode::Gep { struct_ty: Some(ty), idx1, idx2, .. } = &function.inst(ptr_inst).opcode {
                let key = MemoryName::new(ty, *idx1, *idx2);
                if let Some(backing) = self.memory_model.get(&key) {
                    self.value_names.insert((func, result), backing.clone());
                }
                if let Some(inst) = find_inst_defining(function, result) {
                    self.load_index.insert((func, inst), key);
                }
                return;
            }
        }

        let from_name = self.of_value(module, func, ptr);
        if !from_name.is_memory() && !from_name.is_empty() {
            self.value_names.insert((func, result), from_name);
        }
    }

    fn resolve_call(&mut self, module: &Module, func: FuncId, result: Option<ValueId>, callee: ValueId) {
        let Some(result) = result else { return };
        let callee_name = self.of_value(module, func, callee);
        let exchange_names = callee_name
            .function_names()
            .into_iter()
            .map(|name| VarName::Int(format!("{name}$return")))
            .collect::<Vec<_>>();
        if !exchange_names.is_empty() {
            self.value_names.insert((func, result), VarName::multi(exchange_names));
        }
    }

    fn update_memory(&mut self, key: MemoryName, update: VarName) {
        if key.is_opaque() {
            return;
        }
        let merged = match self.memory_model.remove(&key) {
            None => update,
            Some(existing) => merge_memory(existing, update),
        };
        self.memory_model.insert(key, merged);
    }

    fn stack_name_of(&mut self, func: FuncId, inst: InstId, function: &errspec_ir::Function) {
        if self.stack_names.contains_key(&(func, inst)) {
            return;
        }
        let counter = self.stack_counter;
        self.stack_counter += 1;
        self.stack_names
            .insert((func, inst), format!("{}.{counter}", function.source_name));
    }

    /// `"functionName.N"`, `N` a module-wide monotonic counter assigned the first time
    /// this instruction is queried.
    pub fn stack_name(&self, func: FuncId, inst: InstId) -> &str {
        self.stack_names
            .get(&(func, inst))
            .map(String::as_str)
            .expect("stack_name_of must run before stack_name is queried")
    }

    /// `("{stack_name}bbe", "{stack_name}bbx")` of the block's first instruction.
    pub fn bb_names(&self, func: FuncId, block: BlockId, function: &errspec_ir::Function) -> (String, String) {
        let first = function.block(block).first_inst().expect("non-empty block");
        let base = self.stack_name(func, first);
        (format!("{base}bbe"), format!("{base}bbx"))
    }

    /// `"functionName.0"`.
    pub fn call_name(function: &errspec_ir::Function) -> String {
        format!("{}.0", function.source_name)
    }

    pub fn of_value(&self, module: &Module, func: FuncId, value: ValueId) -> VarName {
        let function = module.function(func);
        match function.value(value).kind {
            ValueKind::Global(g) => self.global_names.get(&g).cloned().unwrap_or(VarName::Empty),
            ValueKind::Function(f) => self.function_names.get(&f).cloned().unwrap_or(VarName::Empty),
            ValueKind::ConstInt(v) => VarName::Int(v.to_string()),
            ValueKind::Null => VarName::Empty,
            ValueKind::Arg(_) | ValueKind::InstResult(_) => self
                .value_names
                .get(&(func, value))
                .cloned()
                .unwrap_or(VarName::Empty),
        }
    }

    pub fn load_index_of(&self, func: FuncId, inst: InstId) -> Option<&MemoryName> {
        self.load_index.get(&(func, inst))
    }

    pub fn local_values<'f>(&self, function: &'f errspec_ir::Function) -> impl Iterator<Item = ValueId> + 'f {
        function.local_values()
    }
}

fn merge_memory(existing: VarName, update: VarName) -> VarName {
    match (existing, update) {
        (VarName::Multi(a), VarName::Multi(b)) => VarName::multi(a.into_iter().chain(b)),
        (VarName::Multi(a), other) | (other, VarName::Multi(a)) => VarName::multi(a.into_iter().chain([other])),
        (VarName::Function(a), VarName::Function(b)) if a != b => {
            VarName::multi([VarName::Function(a), VarName::Function(b)])
        }
        (_, update) => update,
    }
}

fn find_inst_defining(function: &errspec_ir::Function, value: ValueId) -> Option<InstId> {
    function
        .instructions()
        .map(|(_, inst)| inst)
        .find(|&inst| function.inst(inst).result == Some(value))
}
