use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::io::{Cursor, Read, Write};
use std::rc::Rc;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::io::{FileSystem, LineIo};

/// A scripted console for tests: `read_line` pops from a preloaded answer
/// queue, `print` appends to an in-memory transcript.
#[derive(Default)]
pub struct BufferedConsole {
    pub output: String,
    answers: VecDeque<String>,
}

impl BufferedConsole {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        BufferedConsole {
            output: String::new(),
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineIo for BufferedConsole {
    fn print(&mut self, text: &str) -> BasicResult<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> BasicResult<Option<String>> {
        Ok(self.answers.pop_front())
    }
}

type FileTable = Rc<RefCell<HashMap<String, Vec<u8>>>>;

/// An in-memory file system for tests, avoiding real disk I/O in a
/// scripted `OPEN`/`PRINT #`/`INPUT #` run.
#[derive(Default, Clone)]
pub struct InMemoryFileSystem {
    files: FileTable,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        InMemoryFileSystem::default()
    }

    pub fn seed(&self, path: &str, contents: &str) {
        self.files.borrow_mut().insert(path.to_string(), contents.as_bytes().to_vec());
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

struct MemoryWriter {
    path: String,
    files: FileTable,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.files.borrow_mut().entry(self.path.clone()).or_default().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl FileSystem for InMemoryFileSystem {
    fn open_read(&mut self, path: &str) -> BasicResult<Box<dyn Read>> {
        let data = self
            .files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| BasicError::io(format!("File not found: {path}")))?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn open_write(&mut self, path: &str, append: bool) -> BasicResult<Box<dyn Write>> {
        if !append {
            self.files.borrow_mut().insert(path.to_string(), Vec::new());
        } else {
            self.files.borrow_mut().entry(path.to_string()).or_default();
        }
        Ok(Box::new(MemoryWriter {
            path: path.to_string(),
            files: self.files.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_console_drains_answers_in_order() {
        let mut console = BufferedConsole::new(["1", "2"]);
        assert_eq!(console.read_line().unwrap(), Some("1".to_string()));
        assert_eq!(console.read_line().unwrap(), Some("2".to_string()));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn buffered_console_records_printed_text() {
        let mut console = BufferedConsole::default();
        console.print("A").unwrap();
        console.print("B").unwrap();
        assert_eq!(console.output, "AB");
    }

    #[test]
    fn in_memory_filesystem_write_then_read_round_trips() {
        let mut fs = InMemoryFileSystem::new();
        {
            let mut writer = fs.open_write("A.TXT", false).unwrap();
            writer.write_all(b"hi").unwrap();
        }
        assert_eq!(fs.contents("A.TXT"), Some("hi".to_string()));
        let mut reader = fs.open_read("A.TXT").unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hi");
    }

    #[test]
    fn appending_preserves_existing_contents() {
        let fs = InMemoryFileSystem::new();
        fs.seed("A.TXT", "one\n");
        {
            let mut fs = fs.clone();
            let mut writer = fs.open_write("A.TXT", true).unwrap();
            writer.write_all(b"two\n").unwrap();
        }
        assert_eq!(fs.contents("A.TXT"), Some("one\ntwo\n".to_string()));
    }
}
