//! mbasic-parser: the AST and the statement/expression parser for a
//! classic Microsoft BASIC dialect.

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::Parser;
