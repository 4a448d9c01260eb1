use rand::rngs::StdRng;
use rand::SeedableRng;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::io::{FileSystem, LineIo};
use mbasic_core::value::{CompareOp, Value, EPSILON};
use mbasic_parser::{
    BinaryOp, DimSpec, Expr, FileMode, OnKind, PrintPart, PrintSep, Statement, ThenClause, UnaryOp,
    VariableTarget,
};

use crate::builtins::call_builtin;
use crate::channels::ChannelTable;
use crate::control::{ControlStacks, ForFrame};
use crate::data::DataTable;
use crate::functions::UserFunctionTable;
use crate::program::{CompiledProgram, ProgramCounter};
use crate::storage::{ArrayStore, VariableStore};

/// A classic BASIC interpreter walks the parsed statement tree directly
/// rather than compiling to any intermediate form; `Interpreter` owns every
/// piece of mutable state a running program touches.
pub struct Interpreter<'a> {
    program: &'a CompiledProgram,
    io: &'a mut dyn LineIo,
    fs: &'a mut dyn FileSystem,
    variables: VariableStore,
    arrays: ArrayStore,
    data: DataTable,
    functions: UserFunctionTable,
    control: ControlStacks,
    channels: ChannelTable,
    rng: StdRng,
    pc: ProgramCounter,
    pending_jump: Option<ProgramCounter>,
    running: bool,
    /// Leftover characters from a `GET` call's last `LineIo::read_line`,
    /// since the abstract console only hands back whole lines.
    keyboard_buffer: String,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a CompiledProgram, io: &'a mut dyn LineIo, fs: &'a mut dyn FileSystem) -> Self {
        Interpreter {
            functions: UserFunctionTable::build(program),
            data: DataTable::build(program),
            program,
            io,
            fs,
            variables: VariableStore::new(),
            arrays: ArrayStore::new(),
            control: ControlStacks::new(),
            channels: ChannelTable::new(),
            rng: StdRng::from_entropy(),
            pc: ProgramCounter::at_line(0),
            pending_jump: None,
            running: true,
            keyboard_buffer: String::new(),
        }
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Runs the program to completion (`END`/`STOP`, falling off the last
    /// line, or a runtime error).
    pub fn run(&mut self) -> BasicResult<()> {
        if self.program.is_empty() {
            return Ok(());
        }
        self.running = true;
        while self.running {
            if self.pc.line_index >= self.program.lines.len() {
                break;
            }
            let line = &self.program.lines[self.pc.line_index];
            let line_number = line.number as usize;
            if self.pc.statement_index >= line.statements.len() {
                self.pc = ProgramCounter::at_line(self.pc.line_index + 1);
                continue;
            }
            let statement = line.statements[self.pc.statement_index].clone();
            self.exec_statement(&statement, line_number)?;
            if let Some(target) = self.pending_jump.take() {
                self.pc = target;
            } else {
                self.pc.statement_index += 1;
            }
        }
        Ok(())
    }

    fn jump_to_line(&mut self, number: u32, line: usize) -> BasicResult<()> {
        let index = self
            .program
            .line_index_of(number)
            .ok_or_else(|| BasicError::runtime(format!("Undefined line {number}"), line))?;
        self.pending_jump = Some(ProgramCounter::at_line(index));
        Ok(())
    }

    fn exec_statement(&mut self, statement: &Statement, line: usize) -> BasicResult<()> {
        match statement {
            Statement::Rem => Ok(()),
            Statement::Let { target, value } => {
                let v = self.eval(value, line)?;
                self.store(target, v, line)
            }
            Statement::Print { parts } => self.exec_print(parts, line),
            Statement::PrintFile { channel, parts } => self.exec_print_file(channel, parts, line),
            Statement::Input { prompt, targets } => self.exec_input(prompt.as_deref(), targets, line),
            Statement::InputFile { channel, targets } => self.exec_input_file(channel, targets, line),
            Statement::Read { targets } => {
                for target in targets {
                    let value = self.data.read(line)?;
                    let coerced = value.coerce_to(target.is_string());
                    self.store(target, coerced, line)?;
                }
                Ok(())
            }
            Statement::Data { .. } => Ok(()),
            Statement::If { condition, then_branch, else_branch } => {
                let truth = self.eval(condition, line)?.is_truthy();
                let clause = if truth { Some(then_branch) } else { else_branch.as_ref() };
                match clause {
                    Some(ThenClause::Goto(target)) => self.jump_to_line(*target, line),
                    Some(ThenClause::Statements(statements)) => self.exec_inline(statements, line),
                    None => Ok(()),
                }
            }
            Statement::On { selector, kind, targets } => {
                let index = self.eval(selector, line)?.as_int32();
                if index < 1 || index as usize > targets.len() {
                    return Ok(());
                }
                let target = targets[index as usize - 1];
                match kind {
                    OnKind::Goto => self.jump_to_line(target, line),
                    OnKind::Gosub => self.do_gosub(target, line),
                }
            }
            Statement::For { var, from, to, step } => self.exec_for(var, from, to, step, line),
            Statement::Next { vars } => self.exec_next(vars, line),
            Statement::Goto(target) => self.jump_to_line(*target, line),
            Statement::Gosub(target) => self.do_gosub(*target, line),
            Statement::Return => {
                let target = self.control.pop_gosub(line)?;
                self.pending_jump = Some(target);
                Ok(())
            }
            Statement::End | Statement::Stop => {
                self.running = false;
                Ok(())
            }
            Statement::Clear => {
                self.variables.clear();
                self.arrays.clear();
                self.control.clear();
                Ok(())
            }
            Statement::Restore(target) => {
                match target {
                    Some(expr) => {
                        let number = self.eval(expr, line)?.as_int32().max(0) as u32;
                        self.data.restore_to_line(number);
                    }
                    None => self.data.restore(),
                }
                Ok(())
            }
            Statement::Randomize(expr) => {
                let seed = match expr {
                    Some(e) => self.eval(e, line)?.as_int32() as u64,
                    None => std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_nanos() as u64)
                        .unwrap_or_default(),
                };
                self.seed_rng(seed);
                Ok(())
            }
            Statement::Dim(specs) => self.exec_dim(specs, line),
            Statement::Open { path, mode, channel } => self.exec_open(path, *mode, channel, line),
            Statement::Close(channels) => self.exec_close(channels, line),
            Statement::Def { .. } => Ok(()),
        }
    }

    /// Runs a one-line `IF`'s inline statement list without advancing the
    /// outer program counter between statements, matching how a single
    /// source line executes as one unit; a `GOTO` inside still takes effect.
    fn exec_inline(&mut self, statements: &[Statement], line: usize) -> BasicResult<()> {
        for statement in statements {
            self.exec_statement(statement, line)?;
            if self.pending_jump.is_some() || !self.running {
                break;
            }
        }
        Ok(())
    }

    fn do_gosub(&mut self, target: u32, line: usize) -> BasicResult<()> {
        let return_to = ProgramCounter {
            line_index: self.pc.line_index,
            statement_index: self.pc.statement_index + 1,
        };
        self.control.push_gosub(return_to);
        self.jump_to_line(target, line)
    }

    fn exec_for(&mut self, var: &VariableTarget, from: &Expr, to: &Expr, step: &Option<Expr>, line: usize) -> BasicResult<()> {
        let start = self.eval(from, line)?.as_number();
        let limit = self.eval(to, line)?.as_number();
        let step_value = match step {
            Some(e) => self.eval(e, line)?.as_number(),
            None => 1.0,
        };
        self.store(var, Value::Number(start), line)?;
        let body_start = ProgramCounter {
            line_index: self.pc.line_index,
            statement_index: self.pc.statement_index + 1,
        };
        if loop_finished(start, limit, step_value) {
            self.skip_to_matching_next(var, line)?;
        } else {
            self.control.push_for(ForFrame {
                var: var.name.clone(),
                limit,
                step: step_value,
                body_start,
            });
        }
        Ok(())
    }

    /// A loop whose initial value already exceeds its bound never runs its
    /// body at all; this scans forward for the matching `NEXT` so execution
    /// resumes right after it.
    fn skip_to_matching_next(&mut self, var: &VariableTarget, line: usize) -> BasicResult<()> {
        let mut index = self.pc.line_index;
        let mut stmt = self.pc.statement_index + 1;
        loop {
            if index >= self.program.lines.len() {
                return Err(BasicError::runtime("FOR without matching NEXT", line));
            }
            let statements = &self.program.lines[index].statements;
            if stmt >= statements.len() {
                index += 1;
                stmt = 0;
                continue;
            }
            if let Statement::Next { vars } = &statements[stmt] {
                let matches = vars.is_empty() || vars.iter().any(|v| v.name == var.name);
                if matches {
                    self.pending_jump = Some(ProgramCounter { line_index: index, statement_index: stmt + 1 });
                    return Ok(());
                }
            }
            stmt += 1;
        }
    }

    fn exec_next(&mut self, vars: &[VariableTarget], line: usize) -> BasicResult<()> {
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        if names.is_empty() {
            self.step_for(None, line)?;
        } else {
            for name in names {
                self.step_for(Some(name), line)?;
            }
        }
        Ok(())
    }

    fn step_for(&mut self, name: Option<&str>, line: usize) -> BasicResult<()> {
        let frame = self.control.pop_for(name, line)?;
        let current = self.variables.get(&frame.var).as_number();
        let next = current + frame.step;
        self.variables.set(&frame.var, Value::Number(next));
        if loop_finished(next, frame.limit, frame.step) {
            Ok(())
        } else {
            self.control.push_for(ForFrame {
                var: frame.var,
                limit: frame.limit,
                step: frame.step,
                body_start: frame.body_start,
            });
            self.pending_jump = Some(frame.body_start);
            Ok(())
        }
    }

    fn exec_dim(&mut self, specs: &[DimSpec], line: usize) -> BasicResult<()> {
        for spec in specs {
            let bounds = spec
                .bounds
                .iter()
                .map(|e| self.eval(e, line).map(|v| v.as_int32()))
                .collect::<BasicResult<Vec<_>>>()?;
            self.arrays.dim(&spec.name, &bounds, line)?;
        }
        Ok(())
    }

    fn exec_print(&mut self, parts: &[PrintPart], line: usize) -> BasicResult<()> {
        let (text, suppress_newline) = self.render_print_parts(parts, line, false)?;
        self.io.print(&text)?;
        if suppress_newline {
            Ok(())
        } else {
            self.io.print("\n")
        }
    }

    fn exec_print_file(&mut self, channel: &Expr, parts: &[PrintPart], line: usize) -> BasicResult<()> {
        let (text, suppress_newline) = self.render_print_parts(parts, line, true)?;
        let number = self.eval(channel, line)?.as_int32();
        self.channels.write_line(number, &text, !suppress_newline, line)
    }

    /// Renders a `PRINT`/`PRINT #`'s items, returning the text and whether a
    /// trailing `,`/`;` suppresses the statement's terminal newline. Commas
    /// become a tab on the console but a literal `,` in a file, since a file
    /// has no column position to tab to.
    fn render_print_parts(&mut self, parts: &[PrintPart], line: usize, to_file: bool) -> BasicResult<(String, bool)> {
        let mut out = String::new();
        let mut trailing_separator = false;
        for part in parts {
            match part {
                PrintPart::Expr(expr) => {
                    out.push_str(&self.eval(expr, line)?.to_print_string());
                    trailing_separator = false;
                }
                PrintPart::Sep(PrintSep::Comma) => {
                    out.push(if to_file { ',' } else { '\t' });
                    trailing_separator = true;
                }
                PrintPart::Sep(PrintSep::Semicolon) => {
                    trailing_separator = true;
                }
            }
        }
        Ok((out, trailing_separator))
    }

    /// A failed numeric conversion doesn't abort the statement: it prints
    /// `?Redo from start` and re-reads the whole line, matching classic
    /// BASIC's console `INPUT` rather than failing the target in place.
    fn exec_input(&mut self, prompt: Option<&str>, targets: &[VariableTarget], line: usize) -> BasicResult<()> {
        if let Some(text) = prompt {
            self.io.print(text)?;
        }
        loop {
            self.io.print("? ")?;
            let raw = self
                .io
                .read_line()?
                .ok_or_else(|| BasicError::runtime("INPUT received end of stream", line))?;
            let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
            let mut values = Vec::with_capacity(targets.len());
            let mut redo = false;
            for (i, target) in targets.iter().enumerate() {
                let field = fields.get(i).copied().unwrap_or("");
                if target.is_string() {
                    values.push(Value::Text(field.to_string()));
                } else {
                    match field.parse::<f64>() {
                        Ok(n) => values.push(Value::Number(n)),
                        Err(_) => {
                            redo = true;
                            break;
                        }
                    }
                }
            }
            if redo {
                self.io.print("?Redo from start\n")?;
                continue;
            }
            for (target, value) in targets.iter().zip(values) {
                self.store(target, value, line)?;
            }
            return Ok(());
        }
    }

    fn exec_input_file(&mut self, channel: &Expr, targets: &[VariableTarget], line: usize) -> BasicResult<()> {
        let number = self.eval(channel, line)?.as_int32();
        for target in targets {
            let field = self.channels.next_field(number, line)?;
            let value = if target.is_string() {
                Value::Text(field)
            } else {
                Value::Number(field.trim().parse::<f64>().unwrap_or(0.0))
            };
            self.store(target, value, line)?;
        }
        Ok(())
    }

    fn exec_open(&mut self, path: &Expr, mode: FileMode, channel: &Expr, line: usize) -> BasicResult<()> {
        let path = self.eval(path, line)?.as_string();
        let number = self.eval(channel, line)?.as_int32();
        match mode {
            FileMode::Input => self.channels.open_read(self.fs, number, &path, line),
            FileMode::Output => self.channels.open_write(self.fs, number, &path, false, line),
            FileMode::Append => self.channels.open_write(self.fs, number, &path, true, line),
        }
    }

    fn exec_close(&mut self, channels: &[Expr], line: usize) -> BasicResult<()> {
        if channels.is_empty() {
            self.channels.close_all();
            return Ok(());
        }
        for expr in channels {
            let number = self.eval(expr, line)?.as_int32();
            self.channels.close(number);
        }
        Ok(())
    }

    fn store(&mut self, target: &VariableTarget, value: Value, line: usize) -> BasicResult<()> {
        match &target.indices {
            None => {
                self.variables.set(&target.name, value);
                Ok(())
            }
            Some(index_exprs) => {
                let indices = index_exprs
                    .iter()
                    .map(|e| self.eval(e, line).map(|v| v.as_int32()))
                    .collect::<BasicResult<Vec<_>>>()?;
                self.arrays.set(&target.name, &indices, value, line)
            }
        }
    }

    fn eval(&mut self, expr: &Expr, line: usize) -> BasicResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Text(s.clone())),
            Expr::Var(target) => self.load(target, line),
            Expr::Unary(op, inner) => {
                let v = self.eval(inner, line)?;
                Ok(match op {
                    UnaryOp::Neg => v.negate(),
                    UnaryOp::Not => v.logical_not(),
                })
            }
            Expr::Binary(op, lhs, rhs) => {
                let left = self.eval(lhs, line)?;
                let right = self.eval(rhs, line)?;
                self.apply_binary(*op, &left, &right, line)
            }
            Expr::Call(name, args) => {
                if name == "GET" {
                    return self.eval_get(line);
                }
                if self.functions.contains(name) {
                    let func = self.functions.get(name, line)?.clone();
                    return self.call_user_function(&func, args, line);
                }
                let values = args
                    .iter()
                    .map(|a| self.eval(a, line))
                    .collect::<BasicResult<Vec<_>>>()?;
                call_builtin(name, &values, &mut self.rng, line)
            }
        }
    }

    fn load(&mut self, target: &VariableTarget, line: usize) -> BasicResult<Value> {
        match &target.indices {
            None => Ok(self.variables.get(&target.name)),
            Some(index_exprs) => {
                let indices = index_exprs
                    .iter()
                    .map(|e| self.eval(e, line).map(|v| v.as_int32()))
                    .collect::<BasicResult<Vec<_>>>()?;
                self.arrays.get(&target.name, &indices, line)
            }
        }
    }

    fn apply_binary(&self, op: BinaryOp, left: &Value, right: &Value, line: usize) -> BasicResult<Value> {
        Ok(match op {
            BinaryOp::Add => left.add(right),
            BinaryOp::Sub => left.sub(right),
            BinaryOp::Mul => left.mul(right),
            BinaryOp::Div => left.div(right, line)?,
            BinaryOp::Pow => left.pow(right),
            BinaryOp::Eq => left.compare(right, CompareOp::Eq),
            BinaryOp::Ne => left.compare(right, CompareOp::Ne),
            BinaryOp::Lt => left.compare(right, CompareOp::Lt),
            BinaryOp::Le => left.compare(right, CompareOp::Le),
            BinaryOp::Gt => left.compare(right, CompareOp::Gt),
            BinaryOp::Ge => left.compare(right, CompareOp::Ge),
            BinaryOp::And => left.logical_and(right),
            BinaryOp::Or => left.logical_or(right),
        })
    }

    /// `GET` (a keystroke read) on top of a line-oriented console: pulls one
    /// character at a time from a buffered line, refilling from `read_line`
    /// when it runs dry. Not a faithful single-keystroke read, since the
    /// abstract console has no raw mode, but preserves GET's one-char-per-
    /// call contract for scripted input.
    fn eval_get(&mut self, _line: usize) -> BasicResult<Value> {
        if self.keyboard_buffer.is_empty() {
            match self.io.read_line()? {
                Some(text) => {
                    self.keyboard_buffer = text;
                    self.keyboard_buffer.push('\n');
                }
                None => return Ok(Value::Number(0.0)),
            }
        }
        let ch = self.keyboard_buffer.remove(0);
        Ok(Value::Number(ch as u32 as f64))
    }

    fn call_user_function(&mut self, func: &crate::functions::UserFunction, args: &[Expr], line: usize) -> BasicResult<Value> {
        if args.len() != func.params.len() {
            return Err(BasicError::runtime("Wrong number of arguments to function", line));
        }
        let values = args
            .iter()
            .map(|a| self.eval(a, line))
            .collect::<BasicResult<Vec<_>>>()?;
        let saved: Vec<(String, Value)> = func
            .params
            .iter()
            .map(|p| (p.clone(), self.variables.get(p)))
            .collect();
        for (param, value) in func.params.iter().zip(values.into_iter()) {
            self.variables.set(param, value);
        }
        let result = self.eval(&func.body, line);
        for (name, old_value) in saved {
            self.variables.set(&name, old_value);
        }
        result
    }
}

fn loop_finished(current: f64, limit: f64, step: f64) -> bool {
    if step == 0.0 {
        true
    } else if step > 0.0 {
        current > limit + EPSILON
    } else {
        current < limit - EPSILON
    }
}
