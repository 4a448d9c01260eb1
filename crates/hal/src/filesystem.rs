use std::fs::OpenOptions;
use std::io::{Read, Write};

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::io::FileSystem;

/// Resolves `OPEN` paths against the real file system.
#[derive(Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    pub fn new() -> Self {
        NativeFileSystem
    }
}

impl FileSystem for NativeFileSystem {
    fn open_read(&mut self, path: &str) -> BasicResult<Box<dyn Read>> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(BasicError::from)?;
        Ok(Box::new(file))
    }

    fn open_write(&mut self, path: &str, append: bool) -> BasicResult<Box<dyn Write>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(BasicError::from)?;
        Ok(Box::new(file))
    }
}
