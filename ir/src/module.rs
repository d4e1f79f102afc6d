use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashMap;

use crate::{
    entities::{FuncId, GlobalId},
    function::Function,
    value::Global,
};

/// Maps error-code names to their integer constant values, e.g. `ENOMEM -> -12`.
///
/// Supplied alongside a module by the (external) IR reader; used when presenting
/// sentinel names externally, which are prefixed `TENTATIVE_` per §6.
#[derive(Debug, Clone, Default)]
pub struct ErrorCodeTable {
    by_name: FxHashMap<String, i64>,
    by_value: FxHashMap<i64, String>,
}

impl ErrorCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        let name = name.into();
        self.by_value.insert(value, name.clone());
        self.by_name.insert(name, value);
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }

    /// The externally-presented sentinel form of an error-code name, e.g.
    /// `ENOMEM -> TENTATIVE_ENOMEM` (§6).
    pub fn tentative_name(name: &str) -> String {
        format!("TENTATIVE_{name}")
    }
}

/// A compiled module: a collection of functions and globals, as yielded by the (external)
/// IR reader.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub functions: PrimaryMap<FuncId, Function>,
    pub globals: PrimaryMap<GlobalId, Global>,
    pub error_codes: ErrorCodeTable,
    /// The `main` function, if the module defines one.
    pub main: Option<FuncId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id]
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id]
    }

    /// Functions that have a body and are not compiler intrinsics, i.e. the functions the
    /// detectors and the ICFG builder actually analyze.
    pub fn analyzable_functions(&self) -> impl Iterator<Item = FuncId> + '_ {
        self.functions
            .keys()
            .filter(move |&id| {
                let f = &self.functions[id];
                !f.is_declaration && !f.is_intrinsic
            })
    }

    pub fn find_by_ir_name(&self, ir_name: &str) -> Option<FuncId> {
        self.functions.keys().find(|&id| self.functions[id].ir_name == ir_name)
    }

    pub fn find_by_source_name(&self, source_name: &str) -> Option<FuncId> {
        self.functions
            .keys()
            .find(|&id| self.functions[id].source_name == source_name)
    }
}
