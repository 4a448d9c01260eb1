use std::collections::BTreeMap;

use mbasic_core::errors::BasicResult;
use mbasic_parser::{Parser, Statement};

/// The editable program: an ordered map from line number to raw source
/// text (the line number itself stripped). Setting a line to empty text
/// deletes it, matching classic BASIC's immediate-mode editing.
#[derive(Debug, Clone, Default)]
pub struct Program {
    lines: BTreeMap<u32, String>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn set_line(&mut self, number: u32, text: String) {
        if text.trim().is_empty() {
            self.lines.remove(&number);
        } else {
            self.lines.insert(number, text);
        }
    }

    pub fn remove_line(&mut self, number: u32) {
        self.lines.remove(&number);
    }

    pub fn get_line(&self, number: u32) -> Option<&str> {
        self.lines.get(&number).map(|s| s.as_str())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.lines.iter().map(|(n, t)| (*n, t.as_str()))
    }

    /// Tokenizes and parses every line into a [`CompiledProgram`], wrapping
    /// any parse failure with the line it occurred on.
    pub fn compile(&self, parser: &mut Parser) -> BasicResult<CompiledProgram> {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut index = std::collections::HashMap::with_capacity(self.lines.len());
        for (number, text) in &self.lines {
            let statements = parser.parse_line(text, *number as usize)?;
            index.insert(*number, lines.len());
            lines.push(CompiledLine {
                number: *number,
                statements,
            });
        }
        Ok(CompiledProgram { lines, index })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledLine {
    pub number: u32,
    pub statements: Vec<Statement>,
}

/// The result of compiling a [`Program`]: an ordered, indexable list of
/// lines plus a line-number lookup for `GOTO`/`GOSUB`/`ON ... GOTO`.
#[derive(Debug, Clone, Default)]
pub struct CompiledProgram {
    pub lines: Vec<CompiledLine>,
    index: std::collections::HashMap<u32, usize>,
}

impl CompiledProgram {
    pub fn line_index_of(&self, number: u32) -> Option<usize> {
        self.index.get(&number).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Position of execution within a [`CompiledProgram`]: the current line
/// and the statement index within that line's statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter {
    pub line_index: usize,
    pub statement_index: usize,
}

impl ProgramCounter {
    pub fn at_line(line_index: usize) -> Self {
        ProgramCounter {
            line_index,
            statement_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_line_with_blank_text_deletes_it() {
        let mut program = Program::new();
        program.set_line(10, "PRINT 1".into());
        program.set_line(10, "".into());
        assert_eq!(program.get_line(10), None);
    }

    #[test]
    fn compile_wraps_syntax_errors_with_the_failing_line() {
        let mut program = Program::new();
        program.set_line(10, "PRINT 1".into());
        program.set_line(20, "GOTO".into());
        let mut parser = Parser::new();
        let err = program.compile(&mut parser).unwrap_err();
        assert_eq!(err.line(), Some(20));
    }

    #[test]
    fn compile_orders_lines_by_number_not_insertion_order() {
        let mut program = Program::new();
        program.set_line(20, "PRINT 2".into());
        program.set_line(10, "PRINT 1".into());
        let mut parser = Parser::new();
        let compiled = program.compile(&mut parser).unwrap();
        assert_eq!(compiled.lines[0].number, 10);
        assert_eq!(compiled.lines[1].number, 20);
    }
}
