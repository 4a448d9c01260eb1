use mbasic_core::errors::BasicError;

use crate::tokens::{match_keyword, Token, TokenKind};

/// Tokenizes a single BASIC source line (no line number prefix — the
/// caller strips that before handing the rest of the line to
/// [`tokenize`]).
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Tokenizer {
    pub fn new(src: &str, line: usize) -> Self {
        Tokenizer {
            chars: src.chars().collect(),
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn column(&self) -> usize {
        self.pos + 1
    }

    fn error(&self, message: impl Into<String>) -> BasicError {
        BasicError::syntax(message, self.line)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, BasicError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_spaces();
            let Some(c) = self.peek() else { break };
            let column = self.column();

            if c == '\'' {
                let rest: String = self.chars[self.pos + 1..].iter().collect();
                tokens.push(Token::new(TokenKind::Rem(rest), column));
                break;
            }

            if c == '?' {
                self.advance();
                tokens.push(Token::new(TokenKind::Print, column));
                continue;
            }

            if c.is_ascii_digit() || (c == '.' && self.peek_at(1).map_or(false, |d| d.is_ascii_digit())) {
                tokens.push(self.scan_number(column)?);
                continue;
            }

            if c == '"' {
                tokens.push(self.scan_string(column)?);
                continue;
            }

            if c.is_ascii_alphabetic() {
                let tok = self.scan_word(column)?;
                if let TokenKind::Rem(_) = tok.kind {
                    let rest: String = self.chars[self.pos..].iter().collect();
                    tokens.push(Token::new(TokenKind::Rem(rest.trim_start().to_string()), column));
                    break;
                }
                tokens.push(tok);
                continue;
            }

            if let Some(tok) = self.scan_operator(column)? {
                tokens.push(tok);
                continue;
            }

            return Err(self.error(format!("Unrecognized character '{c}'")));
        }
        Ok(tokens)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c == ' ' || c == '\t') {
            self.advance();
        }
    }

    /// Scans a numeric literal, accepting `.5`, `1E10`, `1D10` (the `D`
    /// exponent marker is classic BASIC's double-precision suffix and is
    /// folded into the same `f64` as `E`).
    fn scan_number(&mut self, column: usize) -> Result<Token, BasicError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('E') | Some('e') | Some('D') | Some('d')) {
            let save = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                self.pos = save;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let normalized = text.replace(['D', 'd'], "E");
        let value = normalized
            .parse::<f64>()
            .map_err(|_| self.error(format!("Invalid number '{text}'")))?;
        Ok(Token::new(TokenKind::Number(value), column))
    }

    /// Scans a string literal. `""` inside the literal is a doubled-quote
    /// escape for a single embedded `"`. An EOL before the closing quote
    /// terminates the string rather than erroring, matching classic BASIC.
    fn scan_string(&mut self, column: usize) -> Result<Token, BasicError> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek() {
                None => break,
                Some('"') => {
                    if self.peek_at(1) == Some('"') {
                        text.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::Str(text), column))
    }

    /// Scans a maximal run of identifier characters (letters, digits, and
    /// a trailing `$` sigil), then recovers any keyword prefix from it —
    /// splitting `IFA` into `IF` + `A` but leaving `FORMAT$` intact since
    /// `FOR` is not in the adjacency-allowed set.
    fn scan_word(&mut self, column: usize) -> Result<Token, BasicError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric()) {
            self.advance();
        }
        if self.peek() == Some('$') {
            self.advance();
        }
        let run: String = self.chars[start..self.pos].iter().collect();

        if let Some((kind, consumed)) = match_keyword(&run) {
            if consumed < run.chars().count() {
                // Rewind to just past the keyword; the remainder is
                // rescanned as its own token(s).
                self.pos = start + consumed;
            }
            return Ok(Token::new(kind, column));
        }

        Ok(Token::new(TokenKind::Identifier(run.to_ascii_uppercase()), column))
    }

    fn scan_operator(&mut self, column: usize) -> Result<Option<Token>, BasicError> {
        let c = self.advance().unwrap();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '#' => TokenKind::Hash,
            '=' => TokenKind::Equal,
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::LessEqual
                }
                Some('>') => {
                    self.advance();
                    TokenKind::NotEqual
                }
                _ => TokenKind::Less,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::GreaterEqual
                }
                Some('<') => {
                    self.advance();
                    TokenKind::NotEqual
                }
                _ => TokenKind::Greater,
            },
            _ => return Ok(None),
        };
        Ok(Some(Token::new(kind, column)))
    }
}

pub fn tokenize(src: &str, line: usize) -> Result<Vec<Token>, BasicError> {
    Tokenizer::new(src, line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, 10).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn splits_glued_if_then() {
        assert_eq!(
            kinds("IFA=1THEN10"),
            vec![
                TokenKind::If,
                TokenKind::Identifier("A".into()),
                TokenKind::Equal,
                TokenKind::Number(1.0),
                TokenKind::Then,
                TokenKind::Number(10.0),
            ]
        );
    }

    #[test]
    fn keeps_identifier_starting_with_keyword_spelling_intact() {
        assert_eq!(kinds("FORMAT$ = 1"), vec![
            TokenKind::Identifier("FORMAT$".into()),
            TokenKind::Equal,
            TokenKind::Number(1.0),
        ]);
    }

    #[test]
    fn question_mark_is_print() {
        assert_eq!(kinds("?X"), vec![TokenKind::Print, TokenKind::Identifier("X".into())]);
    }

    #[test]
    fn apostrophe_becomes_rem_and_swallows_rest_of_line() {
        let toks = kinds("X=1 ' a comment");
        assert!(matches!(toks.last(), Some(TokenKind::Rem(_))));
    }

    #[test]
    fn doubled_quote_is_escaped_quote() {
        assert_eq!(kinds(r#""SAY ""HI""""#), vec![TokenKind::Str(r#"SAY "HI""#.into())]);
    }

    #[test]
    fn unterminated_string_stops_at_end_of_line() {
        assert_eq!(kinds("\"HELLO"), vec![TokenKind::Str("HELLO".into())]);
    }

    #[test]
    fn exponent_markers_e_and_d_both_parse() {
        assert_eq!(kinds("1E2"), vec![TokenKind::Number(100.0)]);
        assert_eq!(kinds("1D2"), vec![TokenKind::Number(100.0)]);
    }

    #[test]
    fn two_char_comparisons() {
        assert_eq!(kinds("A<=B"), vec![
            TokenKind::Identifier("A".into()),
            TokenKind::LessEqual,
            TokenKind::Identifier("B".into()),
        ]);
        assert_eq!(kinds("A><B"), vec![
            TokenKind::Identifier("A".into()),
            TokenKind::NotEqual,
            TokenKind::Identifier("B".into()),
        ]);
    }

    #[test]
    fn unknown_character_is_a_syntax_error() {
        assert!(tokenize("A@B", 3).is_err());
    }
}
