use std::collections::HashMap;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_parser::{Expr, Statement};

use crate::program::CompiledProgram;

#[derive(Debug, Clone)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Expr,
}

/// Every `DEF FNname(params) = expr` in the program, collected once at
/// compile time. Classic BASIC allows a function to be called before its
/// `DEF` is textually reached, so these are gathered up front rather than
/// registered as execution passes over the `DEF` statement.
#[derive(Debug, Default)]
pub struct UserFunctionTable {
    functions: HashMap<String, UserFunction>,
}

impl UserFunctionTable {
    pub fn build(program: &CompiledProgram) -> Self {
        let mut functions = HashMap::new();
        for line in &program.lines {
            for statement in &line.statements {
                if let Statement::Def { name, params, body } = statement {
                    functions.insert(
                        name.clone(),
                        UserFunction {
                            params: params.clone(),
                            body: body.clone(),
                        },
                    );
                }
            }
        }
        UserFunctionTable { functions }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str, line: usize) -> BasicResult<&UserFunction> {
        self.functions
            .get(name)
            .ok_or_else(|| BasicError::runtime(format!("Undefined function: {name}"), line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbasic_parser::Parser;

    #[test]
    fn collects_a_function_defined_after_its_call_site() {
        let mut program = crate::program::Program::new();
        program.set_line(10, "PRINT FNSQ(3)".into());
        program.set_line(20, "DEF FNSQ(X) = X * X".into());
        let mut parser = Parser::new();
        let compiled = program.compile(&mut parser).unwrap();
        let table = UserFunctionTable::build(&compiled);
        let func = table.get("FNSQ", 0).unwrap();
        assert_eq!(func.params, vec!["X".to_string()]);
    }

    #[test]
    fn unknown_function_is_an_error() {
        let program = crate::program::Program::new();
        let table = UserFunctionTable::build(&program.compile(&mut Parser::new()).unwrap());
        assert!(table.get("FNX", 0).is_err());
    }
}
