use mbasic_core::errors::{BasicError, BasicResult};

use crate::program::ProgramCounter;

/// A live `FOR` loop: the loop variable, its bounds, and where execution
/// resumes on the next iteration.
#[derive(Debug, Clone)]
pub struct ForFrame {
    pub var: String,
    pub limit: f64,
    pub step: f64,
    pub body_start: ProgramCounter,
}

/// The `GOSUB` return-address stack and the `FOR`/`NEXT` frame stack.
///
/// Both are plain stacks rather than a single unified call stack: `GOSUB`
/// nests arbitrarily with `RETURN`, while `NEXT` can name a variable that
/// isn't on the top of the `FOR` stack, which unwinds every enclosing loop
/// up to and including the matching one.
#[derive(Debug, Default)]
pub struct ControlStacks {
    gosub_stack: Vec<ProgramCounter>,
    for_stack: Vec<ForFrame>,
}

impl ControlStacks {
    pub fn new() -> Self {
        ControlStacks::default()
    }

    pub fn push_gosub(&mut self, return_to: ProgramCounter) {
        self.gosub_stack.push(return_to);
    }

    pub fn pop_gosub(&mut self, line: usize) -> BasicResult<ProgramCounter> {
        self.gosub_stack
            .pop()
            .ok_or_else(|| BasicError::runtime("RETURN without GOSUB", line))
    }

    pub fn push_for(&mut self, frame: ForFrame) {
        self.for_stack.push(frame);
    }

    /// Finds the frame matching `var` (the innermost one if unnamed) and
    /// pops it along with everything nested inside it. Returns the frame to
    /// re-test against its loop bounds.
    pub fn pop_for(&mut self, var: Option<&str>, line: usize) -> BasicResult<ForFrame> {
        let target = match var {
            Some(name) => self
                .for_stack
                .iter()
                .rposition(|f| f.var == name)
                .ok_or_else(|| BasicError::runtime("NEXT without matching FOR", line))?,
            None => {
                if self.for_stack.is_empty() {
                    return Err(BasicError::runtime("NEXT without FOR", line));
                }
                self.for_stack.len() - 1
            }
        };
        self.for_stack.truncate(target + 1);
        Ok(self.for_stack.pop().unwrap())
    }

    pub fn clear(&mut self) {
        self.gosub_stack.clear();
        self.for_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc(line_index: usize) -> ProgramCounter {
        ProgramCounter::at_line(line_index)
    }

    #[test]
    fn return_without_gosub_is_an_error() {
        let mut stacks = ControlStacks::new();
        assert!(stacks.pop_gosub(10).is_err());
    }

    #[test]
    fn gosub_return_is_lifo() {
        let mut stacks = ControlStacks::new();
        stacks.push_gosub(pc(1));
        stacks.push_gosub(pc(2));
        assert_eq!(stacks.pop_gosub(0).unwrap(), pc(2));
        assert_eq!(stacks.pop_gosub(0).unwrap(), pc(1));
    }

    #[test]
    fn next_with_no_name_pops_the_innermost_loop() {
        let mut stacks = ControlStacks::new();
        stacks.push_for(ForFrame { var: "I".into(), limit: 10.0, step: 1.0, body_start: pc(1) });
        stacks.push_for(ForFrame { var: "J".into(), limit: 10.0, step: 1.0, body_start: pc(2) });
        let popped = stacks.pop_for(None, 0).unwrap();
        assert_eq!(popped.var, "J");
        let popped = stacks.pop_for(None, 0).unwrap();
        assert_eq!(popped.var, "I");
    }

    #[test]
    fn next_naming_an_outer_loop_unwinds_the_inner_one_too() {
        let mut stacks = ControlStacks::new();
        stacks.push_for(ForFrame { var: "I".into(), limit: 10.0, step: 1.0, body_start: pc(1) });
        stacks.push_for(ForFrame { var: "J".into(), limit: 10.0, step: 1.0, body_start: pc(2) });
        let popped = stacks.pop_for(Some("I"), 0).unwrap();
        assert_eq!(popped.var, "I");
        assert!(stacks.pop_for(None, 0).is_err());
    }

    #[test]
    fn next_naming_an_unknown_variable_is_an_error() {
        let mut stacks = ControlStacks::new();
        stacks.push_for(ForFrame { var: "I".into(), limit: 10.0, step: 1.0, body_start: pc(1) });
        assert!(stacks.pop_for(Some("K"), 0).is_err());
    }
}
