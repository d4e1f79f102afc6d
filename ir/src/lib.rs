//! The object model shared by every error-specification analysis: modules, functions,
//! basic blocks, instructions, and values, as read from a compiled C translation unit.
//!
//! Reading real IR (C, LLVM bitcode, whatever the frontend produces) is out of scope
//! here; this crate only defines the in-memory shape the analyses operate on. See
//! [`builder`] for a way to construct that shape directly, which is what the test
//! suites across this workspace use in place of a reader.

pub mod block;
pub mod builder;
pub mod entities;
pub mod fixtures;
pub mod function;
pub mod inst;
pub mod location;
pub mod module;
pub mod types;
pub mod value;

pub use block::Block;
pub use entities::{BlockId, FuncId, GlobalId, InstId, ValueId};
pub use function::Function;
pub use inst::{Inst, Opcode};
pub use location::Location;
pub use module::{ErrorCodeTable, Module};
pub use types::{BinaryOp, IcmpPredicate, Type};
pub use value::{ConstOperand, Global, GlobalInit, StructField, ValueData, ValueKind};
