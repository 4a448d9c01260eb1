//! mbasic-runtime: a tree-walking executor for a classic Microsoft BASIC
//! dialect. Programs are parsed once into a [`program::CompiledProgram`]
//! and then interpreted statement by statement — there is no bytecode or
//! native compilation step.

pub mod builtins;
pub mod channels;
pub mod control;
pub mod data;
pub mod functions;
pub mod interpreter;
pub mod program;
pub mod storage;

pub use control::{ControlStacks, ForFrame};
pub use data::DataTable;
pub use functions::{UserFunction, UserFunctionTable};
pub use interpreter::Interpreter;
pub use program::{CompiledLine, CompiledProgram, Program, ProgramCounter};
pub use storage::{ArrayStore, VariableStore};
