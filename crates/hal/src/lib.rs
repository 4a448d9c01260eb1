//! mbasic-hal: concrete backends for `mbasic-core`'s `LineIo`/`FileSystem`
//! traits — a real stdin/stdout console and `std::fs`-backed files for the
//! CLI, plus in-memory test doubles for scripted runs.

pub mod console;
pub mod filesystem;
pub mod testing;

pub use console::ConsoleIo;
pub use filesystem::NativeFileSystem;
pub use testing::{BufferedConsole, InMemoryFileSystem};
