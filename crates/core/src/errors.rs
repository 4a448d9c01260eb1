use thiserror::Error;

/// Errors raised while tokenizing, parsing, or executing a program.
///
/// `Syntax` errors are caught at compile time (tokenizing/parsing a line);
/// `Runtime` errors surface during execution. Both carry the 1-based source
/// line number so the caller can render `Line <n>: <message>`. `Io` wraps
/// failures from the abstract [`crate::io::FileSystem`]/[`crate::io::LineIo`]
/// adapters, which have no notion of a BASIC line number.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BasicError {
    #[error("Syntax error: {message}")]
    Syntax { message: String, line: usize },

    #[error("{message}")]
    Runtime { message: String, line: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

pub type BasicResult<T> = Result<T, BasicError>;

impl BasicError {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        BasicError::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn runtime(message: impl Into<String>, line: usize) -> Self {
        BasicError::Runtime {
            message: message.into(),
            line,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        BasicError::Io(message.into())
    }

    /// The line number this error occurred on, if it has one (`Io` errors
    /// do not).
    pub fn line(&self) -> Option<usize> {
        match self {
            BasicError::Syntax { line, .. } | BasicError::Runtime { line, .. } => Some(*line),
            BasicError::Io(_) => None,
        }
    }

    /// `?`-prefixed message the REPL surfaces at the console, with the
    /// `Line <n>:` prefix spec §7 requires for anything carrying a line
    /// number.
    pub fn display_with_line(&self) -> String {
        match self.line() {
            Some(line) => format!("?Line {line}: {self}"),
            None => format!("?{self}"),
        }
    }
}

impl From<std::io::Error> for BasicError {
    fn from(e: std::io::Error) -> Self {
        BasicError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_line_prefixes_question_mark_and_line() {
        let err = BasicError::runtime("Division by zero", 40);
        assert_eq!(err.display_with_line(), "?Line 40: Division by zero");
    }

    #[test]
    fn io_errors_have_no_line() {
        let err = BasicError::io("file not found");
        assert_eq!(err.line(), None);
        assert_eq!(err.display_with_line(), "?I/O error: file not found");
    }
}
