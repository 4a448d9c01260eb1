//! mbasic-lexer: tokenizes a single line of classic Microsoft BASIC source.

pub mod tokenizer;
pub mod tokens;

pub use tokenizer::{tokenize, Tokenizer};
pub use tokens::{string_to_keyword, Token, TokenKind};
