use std::io::{self, Write};

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::io::LineIo;

/// Drives `PRINT`/`INPUT` against the real terminal.
#[derive(Default)]
pub struct ConsoleIo;

impl ConsoleIo {
    pub fn new() -> Self {
        ConsoleIo
    }
}

impl LineIo for ConsoleIo {
    fn print(&mut self, text: &str) -> BasicResult<()> {
        print!("{text}");
        io::stdout().flush().map_err(BasicError::from)
    }

    fn read_line(&mut self) -> BasicResult<Option<String>> {
        let mut buf = String::new();
        let n = io::stdin().read_line(&mut buf).map_err(BasicError::from)?;
        if n == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}
