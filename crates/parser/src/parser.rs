use std::collections::HashSet;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_lexer::{tokenize, Token, TokenKind};

use crate::ast::*;

/// Built-in function names. Any parenthesized call to one of these (or to
/// a name previously registered via `DEF FN`) parses as `Expr::Call`;
/// every other `name(...)` is an array reference.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "ABS", "ATN", "COS", "EXP", "INT", "LOG", "SGN", "SIN", "SQR", "TAN", "RND", "GET", "LEN",
    "LEFT$", "RIGHT$", "MID$", "CHR$", "ASC", "STR$", "VAL", "TAB", "SPC",
];

/// Parses BASIC source one line at a time, carrying the `DEF FN` name
/// registry across calls so a function defined on one line is callable
/// from any other, in either direction.
pub struct Parser {
    user_functions: HashSet<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            user_functions: HashSet::new(),
        }
    }

    /// Clears the function registry, as `NEW` does.
    pub fn reset(&mut self) {
        self.user_functions.clear();
    }

    pub fn parse_line(&mut self, src: &str, line: usize) -> BasicResult<Vec<Statement>> {
        let tokens = tokenize(src, line)?;
        let mut state = LineParser {
            tokens,
            pos: 0,
            line,
            source: src,
            funcs: &mut self.user_functions,
        };
        state.parse_statement_sequence(&[])
    }
}

struct LineParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
    source: &'a str,
    funcs: &'a mut HashSet<String>,
}

impl<'a> LineParser<'a> {
    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: impl Into<String>) -> BasicError {
        BasicError::syntax(message, self.line)
    }

    fn expect(&mut self, expected: &TokenKind) -> BasicResult<()> {
        match self.peek_kind() {
            Some(k) if k == expected => {
                self.advance();
                Ok(())
            }
            Some(k) => Err(self.error(format!("Expected {expected:?}, found {k:?}"))),
            None => Err(self.error(format!("Expected {expected:?}, found end of statement"))),
        }
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_statement_boundary(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Colon) | Some(TokenKind::Else))
    }

    fn expect_identifier(&mut self) -> BasicResult<String> {
        match self.advance() {
            Some(TokenKind::Identifier(name)) => Ok(name),
            Some(other) => Err(self.error(format!("Expected identifier, found {other:?}"))),
            None => Err(self.error("Expected identifier, found end of statement")),
        }
    }

    fn expect_number(&mut self) -> BasicResult<f64> {
        match self.advance() {
            Some(TokenKind::Number(n)) => Ok(n),
            Some(other) => Err(self.error(format!("Expected a number, found {other:?}"))),
            None => Err(self.error("Expected a number, found end of statement")),
        }
    }

    // ---- statement sequence -------------------------------------------------

    fn parse_statement_sequence(&mut self, stop: &[TokenKind]) -> BasicResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            if self.at_end() {
                break;
            }
            if let Some(k) = self.peek_kind() {
                if stop.contains(k) {
                    break;
                }
            }
            statements.push(self.parse_statement()?);
            if self.matches(&TokenKind::Colon) {
                continue;
            }
            break;
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> BasicResult<Statement> {
        let kind = self
            .peek_kind()
            .cloned()
            .ok_or_else(|| self.error("Expected a statement"))?;
        match kind {
            TokenKind::Rem(_) => {
                self.advance();
                Ok(Statement::Rem)
            }
            TokenKind::Let => {
                self.advance();
                self.parse_assignment()
            }
            TokenKind::Identifier(_) => self.parse_assignment(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Dim => self.parse_dim(),
            TokenKind::If => self.parse_if(),
            TokenKind::On => self.parse_on(),
            TokenKind::For => self.parse_for(),
            TokenKind::Next => self.parse_next(),
            TokenKind::Goto => {
                self.advance();
                Ok(Statement::Goto(self.expect_number()? as u32))
            }
            TokenKind::Gosub => {
                self.advance();
                Ok(Statement::Gosub(self.expect_number()? as u32))
            }
            TokenKind::Return => {
                self.advance();
                Ok(Statement::Return)
            }
            TokenKind::End => {
                self.advance();
                Ok(Statement::End)
            }
            TokenKind::Stop => {
                self.advance();
                Ok(Statement::Stop)
            }
            TokenKind::Clear => {
                self.advance();
                Ok(Statement::Clear)
            }
            TokenKind::Data => self.parse_data(),
            TokenKind::Read => self.parse_read(),
            TokenKind::Restore => {
                self.advance();
                let target = if self.is_statement_boundary() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Statement::Restore(target))
            }
            TokenKind::Randomize => {
                self.advance();
                let seed = if self.is_statement_boundary() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Statement::Randomize(seed))
            }
            TokenKind::Def => self.parse_def(),
            TokenKind::Open => self.parse_open(),
            TokenKind::Close => self.parse_close(),
            other => Err(self.error(format!("Unexpected {other:?} at start of statement"))),
        }
    }

    fn parse_assignment(&mut self) -> BasicResult<Statement> {
        let target = self.parse_variable_target()?;
        self.expect(&TokenKind::Equal)?;
        let value = self.parse_expr()?;
        Ok(Statement::Let { target, value })
    }

    fn parse_variable_target(&mut self) -> BasicResult<VariableTarget> {
        let name = self.expect_identifier()?;
        if self.matches(&TokenKind::LParen) {
            let indices = self.parse_expr_list(&TokenKind::RParen)?;
            self.expect(&TokenKind::RParen)?;
            Ok(VariableTarget {
                name,
                indices: Some(indices),
            })
        } else {
            Ok(VariableTarget::scalar(name))
        }
    }

    fn parse_variable_list(&mut self) -> BasicResult<Vec<VariableTarget>> {
        let mut targets = vec![self.parse_variable_target()?];
        while self.matches(&TokenKind::Comma) {
            targets.push(self.parse_variable_target()?);
        }
        Ok(targets)
    }

    fn parse_expr_list(&mut self, until: &TokenKind) -> BasicResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek_kind() == Some(until) {
            return Ok(items);
        }
        items.push(self.parse_expr()?);
        while self.matches(&TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    // ---- individual statements ----------------------------------------------

    fn parse_print(&mut self) -> BasicResult<Statement> {
        self.advance();
        if self.matches(&TokenKind::Hash) {
            let channel = self.parse_expr()?;
            self.expect(&TokenKind::Comma)?;
            let parts = self.parse_print_parts()?;
            return Ok(Statement::PrintFile { channel, parts });
        }
        let parts = self.parse_print_parts()?;
        Ok(Statement::Print { parts })
    }

    fn parse_print_parts(&mut self) -> BasicResult<Vec<PrintPart>> {
        let mut parts = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Colon) | Some(TokenKind::Else) => break,
                Some(TokenKind::Comma) => {
                    self.advance();
                    parts.push(PrintPart::Sep(PrintSep::Comma));
                }
                Some(TokenKind::Semicolon) => {
                    self.advance();
                    parts.push(PrintPart::Sep(PrintSep::Semicolon));
                }
                _ => parts.push(PrintPart::Expr(self.parse_expr()?)),
            }
        }
        Ok(parts)
    }

    fn parse_input(&mut self) -> BasicResult<Statement> {
        self.advance();
        if self.matches(&TokenKind::Hash) {
            let channel = self.parse_expr()?;
            self.expect(&TokenKind::Comma)?;
            let targets = self.parse_variable_list()?;
            return Ok(Statement::InputFile { channel, targets });
        }
        let prompt = if let Some(TokenKind::Str(_)) = self.peek_kind() {
            let Some(TokenKind::Str(text)) = self.advance() else {
                unreachable!()
            };
            if !self.matches(&TokenKind::Semicolon) {
                self.expect(&TokenKind::Comma)?;
            }
            Some(text)
        } else {
            None
        };
        let targets = self.parse_variable_list()?;
        Ok(Statement::Input { prompt, targets })
    }

    fn parse_dim(&mut self) -> BasicResult<Statement> {
        self.advance();
        let mut specs = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::LParen)?;
            let bounds = self.parse_expr_list(&TokenKind::RParen)?;
            self.expect(&TokenKind::RParen)?;
            specs.push(DimSpec { name, bounds });
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::Dim(specs))
    }

    fn parse_if(&mut self) -> BasicResult<Statement> {
        self.advance();
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::Then)?;
        let then_branch = self.parse_then_clause()?;
        let else_branch = if self.matches(&TokenKind::Else) {
            Some(self.parse_then_clause()?)
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_then_clause(&mut self) -> BasicResult<ThenClause> {
        if let Some(TokenKind::Number(n)) = self.peek_kind() {
            let n = *n;
            self.advance();
            return Ok(ThenClause::Goto(n as u32));
        }
        let statements = self.parse_statement_sequence(&[TokenKind::Else])?;
        Ok(ThenClause::Statements(statements))
    }

    fn parse_on(&mut self) -> BasicResult<Statement> {
        self.advance();
        let selector = self.parse_expr()?;
        let kind = match self.advance() {
            Some(TokenKind::Goto) => OnKind::Goto,
            Some(TokenKind::Gosub) => OnKind::Gosub,
            _ => return Err(self.error("Expected GOTO or GOSUB after ON expression")),
        };
        let mut targets = vec![self.expect_number()? as u32];
        while self.matches(&TokenKind::Comma) {
            targets.push(self.expect_number()? as u32);
        }
        Ok(Statement::On {
            selector,
            kind,
            targets,
        })
    }

    fn parse_for(&mut self) -> BasicResult<Statement> {
        self.advance();
        let name = self.expect_identifier()?;
        let var = VariableTarget::scalar(name);
        self.expect(&TokenKind::Equal)?;
        let from = self.parse_expr()?;
        self.expect(&TokenKind::To)?;
        let to = self.parse_expr()?;
        let step = if self.matches(&TokenKind::Step) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::For { var, from, to, step })
    }

    fn parse_next(&mut self) -> BasicResult<Statement> {
        self.advance();
        let mut vars = Vec::new();
        while let Some(TokenKind::Identifier(name)) = self.peek_kind().cloned() {
            self.advance();
            vars.push(VariableTarget::scalar(name));
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::Next { vars })
    }

    fn parse_data(&mut self) -> BasicResult<Statement> {
        self.advance();
        let start_col = self.tokens.get(self.pos).map(|t| t.column);
        while !matches!(self.peek_kind(), None | Some(TokenKind::Colon)) {
            self.pos += 1;
        }
        let end_col = self.tokens.get(self.pos).map(|t| t.column);
        let raw = slice_columns(self.source, start_col, end_col);
        let values = split_data_literals(&raw);
        Ok(Statement::Data { values })
    }

    fn parse_read(&mut self) -> BasicResult<Statement> {
        self.advance();
        let targets = self.parse_variable_list()?;
        Ok(Statement::Read { targets })
    }

    fn parse_def(&mut self) -> BasicResult<Statement> {
        self.advance();
        let name = self.expect_identifier()?;
        if !name.starts_with("FN") {
            return Err(self.error("DEF must declare a function name starting with FN"));
        }
        self.funcs.insert(name.clone());
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.peek_kind() != Some(&TokenKind::RParen) {
            params.push(self.expect_identifier()?);
            while self.matches(&TokenKind::Comma) {
                params.push(self.expect_identifier()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Equal)?;
        let body = self.parse_expr()?;
        Ok(Statement::Def { name, params, body })
    }

    fn parse_open(&mut self) -> BasicResult<Statement> {
        self.advance();
        let path = self.parse_expr()?;
        self.expect(&TokenKind::For)?;
        let mode = match self.advance() {
            Some(TokenKind::Input) => FileMode::Input,
            Some(TokenKind::Output) => FileMode::Output,
            Some(TokenKind::Append) => FileMode::Append,
            _ => return Err(self.error("Expected INPUT, OUTPUT, or APPEND after OPEN ... FOR")),
        };
        self.expect(&TokenKind::As)?;
        self.matches(&TokenKind::Hash);
        let channel = self.parse_expr()?;
        Ok(Statement::Open { path, mode, channel })
    }

    fn parse_close(&mut self) -> BasicResult<Statement> {
        self.advance();
        let mut channels = Vec::new();
        if self.is_statement_boundary() {
            return Ok(Statement::Close(channels));
        }
        loop {
            self.matches(&TokenKind::Hash);
            channels.push(self.parse_expr()?);
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::Close(channels))
    }

    // ---- expressions: precedence climbs OR < AND < comparisons < +- < */NOT < ^/unary --

    fn parse_expr(&mut self) -> BasicResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> BasicResult<Expr> {
        let mut left = self.parse_and()?;
        while self.matches(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> BasicResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.matches(&TokenKind::And) {
            let right = self.parse_comparison()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> BasicResult<Expr> {
        let mut left = self.parse_add_sub()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Equal) => BinaryOp::Eq,
                Some(TokenKind::NotEqual) => BinaryOp::Ne,
                Some(TokenKind::Less) => BinaryOp::Lt,
                Some(TokenKind::LessEqual) => BinaryOp::Le,
                Some(TokenKind::Greater) => BinaryOp::Gt,
                Some(TokenKind::GreaterEqual) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_add_sub()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_add_sub(&mut self) -> BasicResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `*`, `/`, and unary `NOT` share this precedence level.
    fn parse_term(&mut self) -> BasicResult<Expr> {
        if self.matches(&TokenKind::Not) {
            let operand = self.parse_term()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `^` and unary minus share this precedence level; `^` is
    /// right-associative via same-precedence recursion.
    fn parse_power(&mut self) -> BasicResult<Expr> {
        if self.matches(&TokenKind::Minus) {
            let operand = self.parse_power()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        if self.matches(&TokenKind::Plus) {
            return self.parse_power();
        }
        let left = self.parse_primary()?;
        if self.matches(&TokenKind::Caret) {
            let right = self.parse_power()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> BasicResult<Expr> {
        match self.advance() {
            Some(TokenKind::Number(n)) => Ok(Expr::Number(n)),
            Some(TokenKind::Str(s)) => Ok(Expr::Str(s)),
            Some(TokenKind::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            Some(TokenKind::Identifier(name)) => {
                if self.matches(&TokenKind::LParen) {
                    let args = self.parse_expr_list(&TokenKind::RParen)?;
                    self.expect(&TokenKind::RParen)?;
                    if BUILTIN_FUNCTIONS.contains(&name.as_str()) || self.funcs.contains(&name) {
                        Ok(Expr::Call(name, args))
                    } else {
                        Ok(Expr::Var(VariableTarget {
                            name,
                            indices: Some(args),
                        }))
                    }
                } else if name == "RND" || name == "GET" {
                    Ok(Expr::Call(name, Vec::new()))
                } else {
                    Ok(Expr::Var(VariableTarget::scalar(name)))
                }
            }
            Some(other) => Err(self.error(format!("Unexpected {other:?} in expression"))),
            None => Err(self.error("Unexpected end of expression")),
        }
    }
}

fn slice_columns(source: &str, start: Option<usize>, end: Option<usize>) -> String {
    let chars: Vec<char> = source.chars().collect();
    let start = start.map(|c| c - 1).unwrap_or(chars.len());
    let end = end.map(|c| c - 1).unwrap_or(chars.len());
    if start >= chars.len() || start >= end {
        return String::new();
    }
    chars[start..end.min(chars.len())].iter().collect::<String>()
}

/// Splits a raw `DATA` argument list on commas that are outside quotes,
/// unquoting (with `""` escapes) quoted items and leaving unquoted items
/// as literal text, matching classic BASIC's untyped `DATA` constants.
fn split_data_literals(raw: &str) -> Vec<DataLiteral> {
    let mut values = Vec::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        if chars[i] == '"' {
            i += 1;
            let mut text = String::new();
            while i < chars.len() {
                if chars[i] == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        text.push('"');
                        i += 2;
                    } else {
                        i += 1;
                        break;
                    }
                } else {
                    text.push(chars[i]);
                    i += 1;
                }
            }
            values.push(DataLiteral::Text(text));
            while i < chars.len() && chars[i] != ',' {
                i += 1;
            }
        } else {
            let start = i;
            while i < chars.len() && chars[i] != ',' {
                i += 1;
            }
            let item: String = chars[start..i].iter().collect();
            let trimmed = item.trim();
            match trimmed.parse::<f64>() {
                Ok(n) => values.push(DataLiteral::Number(n)),
                Err(_) => values.push(DataLiteral::Text(trimmed.to_string())),
            }
        }
        if i < chars.len() && chars[i] == ',' {
            i += 1;
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<Statement> {
        Parser::new().parse_line(src, 10).unwrap()
    }

    #[test]
    fn parses_implicit_let() {
        assert_eq!(
            parse("X = 1 + 2"),
            vec![Statement::Let {
                target: VariableTarget::scalar("X"),
                value: Expr::Binary(BinaryOp::Add, Box::new(Expr::Number(1.0)), Box::new(Expr::Number(2.0))),
            }]
        );
    }

    #[test]
    fn power_is_right_associative() {
        let stmts = parse("X = 2 ^ 3 ^ 2");
        let Statement::Let { value, .. } = &stmts[0] else { panic!() };
        assert_eq!(
            *value,
            Expr::Binary(
                BinaryOp::Pow,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Binary(BinaryOp::Pow, Box::new(Expr::Number(3.0)), Box::new(Expr::Number(2.0)))),
            )
        );
    }

    #[test]
    fn if_then_with_bare_line_number_is_goto() {
        let stmts = parse("IF X = 1 THEN 100");
        match &stmts[0] {
            Statement::If { then_branch, .. } => assert_eq!(*then_branch, ThenClause::Goto(100)),
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn if_then_with_statement_list() {
        let stmts = parse("IF X THEN Y = 1 : Z = 2");
        match &stmts[0] {
            Statement::If { then_branch, .. } => match then_branch {
                ThenClause::Statements(stmts) => assert_eq!(stmts.len(), 2),
                _ => panic!("expected statement list"),
            },
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn array_reference_vs_builtin_call() {
        let stmts = parse("X = A(1) + ABS(-2)");
        let Statement::Let { value, .. } = &stmts[0] else { panic!() };
        let Expr::Binary(BinaryOp::Add, lhs, rhs) = value else { panic!() };
        assert!(matches!(**lhs, Expr::Var(_)));
        assert!(matches!(**rhs, Expr::Call(_, _)));
    }

    #[test]
    fn user_function_registered_by_def_is_callable() {
        let mut parser = Parser::new();
        parser.parse_line("DEF FNSQ(X) = X * X", 10).unwrap();
        let stmts = parser.parse_line("Y = FNSQ(5)", 20).unwrap();
        let Statement::Let { value, .. } = &stmts[0] else { panic!() };
        assert!(matches!(value, Expr::Call(name, _) if name == "FNSQ"));
    }

    #[test]
    fn data_statement_preserves_unquoted_case_and_quoted_text() {
        let stmts = parse(r#"DATA 1, "Hello, World", Red"#);
        match &stmts[0] {
            Statement::Data { values } => {
                assert_eq!(values[0], DataLiteral::Number(1.0));
                assert_eq!(values[1], DataLiteral::Text("Hello, World".into()));
                assert_eq!(values[2], DataLiteral::Text("Red".into()));
            }
            _ => panic!("expected Data"),
        }
    }

    #[test]
    fn for_next_round_trip() {
        let stmts = parse("FOR I = 1 TO 10 STEP 2");
        assert!(matches!(stmts[0], Statement::For { .. }));
        let stmts = parse("NEXT I");
        assert_eq!(
            stmts[0],
            Statement::Next {
                vars: vec![VariableTarget::scalar("I")]
            }
        );
    }

    #[test]
    fn print_tracks_separators() {
        let stmts = parse(r#"PRINT "X="; X, Y"#);
        match &stmts[0] {
            Statement::Print { parts } => {
                assert_eq!(parts.len(), 5);
                assert_eq!(parts[1], PrintPart::Sep(PrintSep::Semicolon));
                assert_eq!(parts[3], PrintPart::Sep(PrintSep::Comma));
            }
            _ => panic!("expected Print"),
        }
    }
}
