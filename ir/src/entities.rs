//! Arena-indexed entity handles for the IR object model.
//!
//! Every concrete IR object (function, block, instruction, value, global) is identified
//! by a small `Copy` handle backed by a [`cranelift_entity::PrimaryMap`], the same
//! indexing idiom the teacher compiler workspace uses throughout its own IR.

use cranelift_entity::entity_impl;

/// A function within a [`Module`](crate::Module).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(u32);
entity_impl!(FuncId, "func");

/// A basic block within a [`Function`](crate::Function).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);
entity_impl!(BlockId, "block");

/// An instruction within a [`Function`](crate::Function).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(u32);
entity_impl!(InstId, "inst");

/// An SSA value local to a [`Function`](crate::Function): an instruction result, a
/// parameter, or a reference to a module-level constant or global.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u32);
entity_impl!(ValueId, "v");

/// A module-scoped global variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(u32);
entity_impl!(GlobalId, "g");
