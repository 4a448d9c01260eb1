use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, BufReader, Read, Write};

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::io::FileSystem;

enum Channel {
    Reader(BufReader<Box<dyn Read>>),
    Writer(Box<dyn Write>),
}

/// Open file channels, keyed by the numeric channel used in `OPEN ... AS
/// #n`. `CLOSE` of a channel that isn't open is a no-op, matching classic
/// BASIC's forgiving behavior.
#[derive(Default)]
pub struct ChannelTable {
    channels: HashMap<i32, Channel>,
    /// Fields from the most recently read line that `INPUT #` hasn't
    /// consumed yet, one queue per channel.
    pending_fields: HashMap<i32, VecDeque<String>>,
}

impl ChannelTable {
    pub fn new() -> Self {
        ChannelTable::default()
    }

    pub fn open_read(&mut self, fs: &mut dyn FileSystem, number: i32, path: &str, line: usize) -> BasicResult<()> {
        let reader = fs.open_read(path).map_err(|e| with_line(e, line))?;
        self.channels.insert(number, Channel::Reader(BufReader::new(reader)));
        self.pending_fields.remove(&number);
        Ok(())
    }

    pub fn open_write(
        &mut self,
        fs: &mut dyn FileSystem,
        number: i32,
        path: &str,
        append: bool,
        line: usize,
    ) -> BasicResult<()> {
        let writer = fs.open_write(path, append).map_err(|e| with_line(e, line))?;
        self.channels.insert(number, Channel::Writer(writer));
        Ok(())
    }

    pub fn close(&mut self, number: i32) {
        self.channels.remove(&number);
        self.pending_fields.remove(&number);
    }

    pub fn close_all(&mut self) {
        self.channels.clear();
        self.pending_fields.clear();
    }

    pub fn write_line(&mut self, number: i32, text: &str, with_newline: bool, line: usize) -> BasicResult<()> {
        match self.channels.get_mut(&number) {
            Some(Channel::Writer(w)) => {
                let result = if with_newline { writeln!(w, "{text}") } else { write!(w, "{text}") };
                result.map_err(BasicError::from).map_err(|e| with_line(e, line))
            }
            Some(Channel::Reader(_)) | None => Err(BasicError::runtime(format!("File #{number} is not open for output"), line)),
        }
    }

    pub fn read_line(&mut self, number: i32, line: usize) -> BasicResult<Option<String>> {
        match self.channels.get_mut(&number) {
            Some(Channel::Reader(r)) => {
                let mut buf = String::new();
                let n = r.read_line(&mut buf).map_err(BasicError::from).map_err(|e| with_line(e, line))?;
                if n == 0 {
                    Ok(None)
                } else {
                    while buf.ends_with('\n') || buf.ends_with('\r') {
                        buf.pop();
                    }
                    Ok(Some(buf))
                }
            }
            Some(Channel::Writer(_)) | None => Err(BasicError::runtime(format!("File #{number} is not open for input"), line)),
        }
    }

    pub fn is_eof(&mut self, number: i32, line: usize) -> BasicResult<bool> {
        match self.channels.get_mut(&number) {
            Some(Channel::Reader(r)) => Ok(r.fill_buf().map_err(BasicError::from).map_err(|e| with_line(e, line))?.is_empty()),
            Some(Channel::Writer(_)) | None => Err(BasicError::runtime(format!("File #{number} is not open for input"), line)),
        }
    }

    /// `INPUT #`'s per-target field read: pops the next field from the
    /// channel's pending queue, refilling it by reading and splitting
    /// another line when the queue runs dry.
    pub fn next_field(&mut self, number: i32, line: usize) -> BasicResult<String> {
        let needs_refill = self.pending_fields.get(&number).map_or(true, VecDeque::is_empty);
        if needs_refill {
            let raw = self
                .read_line(number, line)?
                .ok_or_else(|| BasicError::runtime(format!("End of file on channel {number}"), line))?;
            self.pending_fields.insert(number, split_input_fields(&raw).into());
        }
        Ok(self.pending_fields.get_mut(&number).and_then(VecDeque::pop_front).unwrap_or_default())
    }
}

fn with_line(err: BasicError, line: usize) -> BasicError {
    match err {
        BasicError::Io(message) => BasicError::runtime(message, line),
        other => other,
    }
}

/// Splits one `INPUT #`-read line into fields on commas outside quotes,
/// stripping a field's surrounding quotes and collapsing `""` to `"`.
fn split_input_fields(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut fields = Vec::new();
    let mut i = 0;
    loop {
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        let mut field = String::new();
        if chars.get(i) == Some(&'"') {
            i += 1;
            while i < chars.len() {
                if chars[i] == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        field.push('"');
                        i += 2;
                    } else {
                        i += 1;
                        break;
                    }
                } else {
                    field.push(chars[i]);
                    i += 1;
                }
            }
            while i < chars.len() && chars[i] != ',' {
                i += 1;
            }
        } else {
            while i < chars.len() && chars[i] != ',' {
                field.push(chars[i]);
                i += 1;
            }
            while field.ends_with(' ') {
                field.pop();
            }
        }
        fields.push(field);
        if i < chars.len() && chars[i] == ',' {
            i += 1;
        } else {
            break;
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap as StdHashMap;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Default)]
    struct MemoryFs {
        files: Rc<RefCell<StdHashMap<String, Vec<u8>>>>,
    }

    impl FileSystem for MemoryFs {
        fn open_read(&mut self, path: &str) -> BasicResult<Box<dyn Read>> {
            let data = self
                .files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| BasicError::io(format!("File not found: {path}")))?;
            Ok(Box::new(Cursor::new(data)))
        }

        fn open_write(&mut self, path: &str, _append: bool) -> BasicResult<Box<dyn Write>> {
            self.files.borrow_mut().entry(path.to_string()).or_default();
            struct Writer {
                path: String,
                files: Rc<RefCell<StdHashMap<String, Vec<u8>>>>,
            }
            impl Write for Writer {
                fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                    self.files.borrow_mut().get_mut(&self.path).unwrap().extend_from_slice(buf);
                    Ok(buf.len())
                }
                fn flush(&mut self) -> std::io::Result<()> {
                    Ok(())
                }
            }
            Ok(Box::new(Writer { path: path.to_string(), files: self.files.clone() }))
        }
    }

    #[test]
    fn close_of_unopened_channel_is_a_no_op() {
        let mut table = ChannelTable::new();
        table.close(1);
    }

    #[test]
    fn write_then_read_round_trips_through_the_filesystem() {
        let mut fs = MemoryFs::default();
        fs.files.borrow_mut().insert("A.TXT".into(), Vec::new());
        let mut table = ChannelTable::new();
        table.open_write(&mut fs, 1, "A.TXT", false, 0).unwrap();
        table.write_line(1, "HELLO", true, 0).unwrap();
        table.close(1);

        table.open_read(&mut fs, 2, "A.TXT", 0).unwrap();
        assert_eq!(table.read_line(2, 0).unwrap(), Some("HELLO".to_string()));
        assert_eq!(table.read_line(2, 0).unwrap(), None);
    }

    #[test]
    fn reading_from_a_write_only_channel_is_an_error() {
        let mut fs = MemoryFs::default();
        let mut table = ChannelTable::new();
        table.open_write(&mut fs, 1, "A.TXT", false, 0).unwrap();
        assert!(table.read_line(1, 0).is_err());
    }

    #[test]
    fn next_field_splits_one_line_across_several_reads() {
        let mut fs = MemoryFs::default();
        fs.files.borrow_mut().insert("A.TXT".into(), b"10,20\n".to_vec());
        let mut table = ChannelTable::new();
        table.open_read(&mut fs, 1, "A.TXT", 0).unwrap();
        assert_eq!(table.next_field(1, 0).unwrap(), "10");
        assert_eq!(table.next_field(1, 0).unwrap(), "20");
    }

    #[test]
    fn next_field_strips_quotes_and_keeps_commas_inside_them() {
        let mut fs = MemoryFs::default();
        fs.files.borrow_mut().insert("A.TXT".into(), b"\"A, B\",3\n".to_vec());
        let mut table = ChannelTable::new();
        table.open_read(&mut fs, 1, "A.TXT", 0).unwrap();
        assert_eq!(table.next_field(1, 0).unwrap(), "A, B");
        assert_eq!(table.next_field(1, 0).unwrap(), "3");
    }

    #[test]
    fn next_field_unescapes_doubled_quotes() {
        let mut fs = MemoryFs::default();
        fs.files.borrow_mut().insert("A.TXT".into(), b"\"say \"\"hi\"\"\"\n".to_vec());
        let mut table = ChannelTable::new();
        table.open_read(&mut fs, 1, "A.TXT", 0).unwrap();
        assert_eq!(table.next_field(1, 0).unwrap(), "say \"hi\"");
    }
}
