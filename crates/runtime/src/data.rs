use std::collections::HashMap;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::value::Value;
use mbasic_parser::{DataLiteral, Statement};

use crate::program::CompiledProgram;

/// The flattened contents of every `DATA` statement in the program, in line
/// order, plus a single cursor shared by every `READ`. `RESTORE <line>`
/// moves the cursor to the first item belonging to that line (or the next
/// line that has one); `RESTORE` with no argument rewinds to the start.
#[derive(Debug, Default)]
pub struct DataTable {
    values: Vec<Value>,
    /// Maps a line number to the cursor offset of its first `DATA` item,
    /// for every line that has one.
    line_offsets: HashMap<u32, usize>,
    cursor: usize,
}

impl DataTable {
    pub fn build(program: &CompiledProgram) -> Self {
        let mut values = Vec::new();
        let mut line_offsets = HashMap::new();
        for line in &program.lines {
            for statement in &line.statements {
                if let Statement::Data { values: literals } = statement {
                    if !literals.is_empty() {
                        line_offsets.entry(line.number).or_insert(values.len());
                    }
                    for literal in literals {
                        values.push(match literal {
                            DataLiteral::Number(n) => Value::Number(*n),
                            DataLiteral::Text(s) => Value::Text(s.clone()),
                        });
                    }
                }
            }
        }
        DataTable {
            values,
            line_offsets,
            cursor: 0,
        }
    }

    pub fn read(&mut self, line: usize) -> BasicResult<Value> {
        let value = self
            .values
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| BasicError::runtime("Out of data", line))?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn restore(&mut self) {
        self.cursor = 0;
    }

    /// Sets the cursor to the first `DATA` item whose source line is `>=
    /// line`, or past the end if no such item exists — so the next `READ`
    /// raises `Out of data` rather than jumping anywhere. Never an error:
    /// an out-of-range `RESTORE` target is a classic-BASIC no-op-until-read.
    pub fn restore_to_line(&mut self, line: u32) {
        self.cursor = self
            .line_offsets
            .iter()
            .filter(|(&number, _)| number >= line)
            .min_by_key(|(&number, _)| number)
            .map(|(_, &offset)| offset)
            .unwrap_or(self.values.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbasic_parser::Parser;

    fn compile(lines: &[(u32, &str)]) -> CompiledProgram {
        let mut program = crate::program::Program::new();
        for (number, text) in lines {
            program.set_line(*number, (*text).to_string());
        }
        let mut parser = Parser::new();
        program.compile(&mut parser).unwrap()
    }

    #[test]
    fn reads_values_across_lines_in_order() {
        let program = compile(&[(10, "DATA 1, 2"), (20, "DATA 3")]);
        let mut table = DataTable::build(&program);
        assert_eq!(table.read(0).unwrap(), Value::Number(1.0));
        assert_eq!(table.read(0).unwrap(), Value::Number(2.0));
        assert_eq!(table.read(0).unwrap(), Value::Number(3.0));
        assert!(table.read(0).is_err());
    }

    #[test]
    fn restore_rewinds_to_the_start() {
        let program = compile(&[(10, "DATA 1, 2")]);
        let mut table = DataTable::build(&program);
        table.read(0).unwrap();
        table.restore();
        assert_eq!(table.read(0).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn restore_to_line_with_no_data_finds_the_next_one() {
        let program = compile(&[(10, "PRINT 1"), (20, "DATA 9")]);
        let mut table = DataTable::build(&program);
        table.restore_to_line(10);
        assert_eq!(table.read(0).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn restore_past_the_last_data_line_exhausts_the_table() {
        let program = compile(&[(10, "DATA 9")]);
        let mut table = DataTable::build(&program);
        table.restore_to_line(20);
        assert!(table.read(0).is_err());
    }
}
