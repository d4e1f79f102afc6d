use crate::{entities::FuncId, entities::GlobalId, entities::InstId, types::Type};

/// What an SSA value actually is: the result of an instruction, an incoming argument, a
/// literal constant, a reference to a module-level global, or a reference to a function
/// (the callee operand of a direct call, or a function pointer taken by address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    InstResult(InstId),
    Arg(u32),
    ConstInt(i64),
    Global(GlobalId),
    Function(FuncId),
    /// A null pointer constant.
    Null,
}

#[derive(Debug, Clone)]
pub struct ValueData {
    pub kind: ValueKind,
    pub ty: Type,
}

/// The literal operand of a global initializer field: either a constant integer, a
/// pointer to another global (e.g. a function address), or null.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstOperand {
    Int(i64),
    Global(GlobalId),
    Null,
}

/// One field of a global struct literal initializer, as consumed by the name resolver's
/// memory-model seeding rule (§4.3: "if `s` is a global struct literal, seed backings for
/// each field pointing to constants").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub index: u32,
    pub value: ConstOperand,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobalInit {
    StructLiteral(Vec<StructField>),
}

/// A module-scoped global variable or external declaration.
#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub ty: Type,
    /// `llvm.unnamed_addr`-style flag: the global's address is not significant.
    pub is_unnamed_addr: bool,
    pub is_null_pointer: bool,
    /// Set when this global is known (by correlation with the `ErrorCodeTable`) to be a
    /// named error code constant, e.g. `ENOMEM`. When set, the name resolver assigns this
    /// global a `VarName::ErrorCode` instead of the default `VarName::Int`.
    pub error_code_name: Option<String>,
    pub init: Option<GlobalInit>,
}

impl Global {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_unnamed_addr: false,
            is_null_pointer: false,
            error_code_name: None,
            init: None,
        }
    }
}
