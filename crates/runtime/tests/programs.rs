use std::io::{Read, Write};

use mbasic_core::errors::BasicResult;
use mbasic_core::io::{FileSystem, LineIo};
use mbasic_parser::Parser;
use mbasic_runtime::{Interpreter, Program};

/// A scripted console: feeds canned `INPUT` answers and records every
/// `PRINT`ed character for assertions.
#[derive(Default)]
struct ScriptedConsole {
    output: String,
    answers: Vec<String>,
}

impl LineIo for ScriptedConsole {
    fn print(&mut self, text: &str) -> BasicResult<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> BasicResult<Option<String>> {
        if self.answers.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.answers.remove(0)))
        }
    }
}

struct NoFiles;

impl FileSystem for NoFiles {
    fn open_read(&mut self, _path: &str) -> BasicResult<Box<dyn Read>> {
        Err(mbasic_core::errors::BasicError::io("no files in this test"))
    }

    fn open_write(&mut self, _path: &str, _append: bool) -> BasicResult<Box<dyn Write>> {
        Err(mbasic_core::errors::BasicError::io("no files in this test"))
    }
}

fn run_lines(lines: &[(u32, &str)], answers: Vec<&str>) -> String {
    let mut program = Program::new();
    for (number, text) in lines {
        program.set_line(*number, (*text).to_string());
    }
    let mut parser = Parser::new();
    let compiled = program.compile(&mut parser).expect("program should compile");
    let mut console = ScriptedConsole {
        output: String::new(),
        answers: answers.into_iter().map(String::from).collect(),
    };
    let mut fs = NoFiles;
    let mut interpreter = Interpreter::new(&compiled, &mut console, &mut fs);
    interpreter.seed_rng(1);
    interpreter.run().expect("program should run to completion");
    console.output
}

#[test]
fn accumulator_loop_sums_one_through_five() {
    let output = run_lines(
        &[
            (10, "LET S = 0"),
            (20, "FOR I = 1 TO 5"),
            (30, "LET S = S + I"),
            (40, "NEXT I"),
            (50, "PRINT S"),
        ],
        vec![],
    );
    assert_eq!(output, "15\n");
}

#[test]
fn gosub_return_resumes_after_the_call_site() {
    let output = run_lines(
        &[
            (10, "GOSUB 100"),
            (20, "PRINT \"BACK\""),
            (30, "END"),
            (100, "PRINT \"IN SUB\""),
            (110, "RETURN"),
        ],
        vec![],
    );
    assert_eq!(output, "IN SUB\nBACK\n");
}

#[test]
fn string_slicing_builtins_compose() {
    let output = run_lines(&[(10, "PRINT LEFT$(\"HELLO WORLD\", 5)"), (20, "PRINT MID$(\"HELLO WORLD\", 7, 5)")], vec![]);
    assert_eq!(output, "HELLO\nWORLD\n");
}

#[test]
fn numeric_input_is_read_and_used_in_arithmetic() {
    let output = run_lines(&[(10, "INPUT A"), (20, "PRINT A * 2")], vec!["21"]);
    assert_eq!(output, "? 42\n");
}

#[test]
fn numeric_input_reprompts_on_unparseable_text() {
    let output = run_lines(&[(10, "INPUT \"NUMBER\";N"), (20, "PRINT N * 2")], vec!["abc", "5"]);
    assert_eq!(output, "NUMBER? ?Redo from start\n? 10\n");
}

#[test]
fn if_then_with_a_bare_line_number_jumps_there() {
    let output = run_lines(
        &[
            (10, "LET X = 1"),
            (20, "IF X = 1 THEN 40"),
            (30, "PRINT \"SKIPPED\""),
            (40, "PRINT \"LANDED\""),
        ],
        vec![],
    );
    assert_eq!(output, "LANDED\n");
}

#[test]
fn array_elements_auto_allocate_without_a_dim() {
    let output = run_lines(&[(10, "LET A(3) = 99"), (20, "PRINT A(3)"), (30, "PRINT A(0)")], vec![]);
    assert_eq!(output, "99\n0\n");
}

#[test]
fn data_read_restore_cycle_replays_values() {
    let output = run_lines(
        &[
            (10, "DATA 1, 2, 3"),
            (20, "READ A"),
            (30, "READ B"),
            (40, "RESTORE"),
            (50, "READ C"),
            (60, "PRINT A, B, C"),
        ],
        vec![],
    );
    assert_eq!(output, "1\t2\t1\n");
}

#[test]
fn user_defined_function_evaluates_with_its_own_parameter_scope() {
    let output = run_lines(&[(10, "DEF FNSQ(X) = X * X"), (20, "LET X = 7"), (30, "PRINT FNSQ(3)"), (40, "PRINT X")], vec![]);
    assert_eq!(output, "9\n7\n");
}

#[test]
fn on_goto_dispatches_by_one_based_index() {
    let output = run_lines(
        &[
            (10, "ON 2 GOTO 100, 200"),
            (20, "PRINT \"FELL THROUGH\""),
            (30, "END"),
            (100, "PRINT \"FIRST\""),
            (110, "END"),
            (200, "PRINT \"SECOND\""),
        ],
        vec![],
    );
    assert_eq!(output, "SECOND\n");
}
