/// A reference to a scalar variable or an array element. `indices` is
/// `None` for a scalar; index expressions are evaluated at the point of
/// use, never pre-computed and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTarget {
    pub name: String,
    pub indices: Option<Vec<Expr>>,
}

impl VariableTarget {
    pub fn scalar(name: impl Into<String>) -> Self {
        VariableTarget {
            name: name.into(),
            indices: None,
        }
    }

    pub fn is_string(&self) -> bool {
        self.name.ends_with('$')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Var(VariableTarget),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A call to a built-in function or a `DEF FN`-declared user function.
    /// Array element reads are `Expr::Var` with indices, not `Call` —
    /// the parser tells the two apart using its function-name registry.
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintSep {
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintPart {
    Expr(Expr),
    Sep(PrintSep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Input,
    Output,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnKind {
    Goto,
    Gosub,
}

/// Either a `DATA` statement entry as written in the source (before `READ`
/// coerces it to match its target's sigil).
#[derive(Debug, Clone, PartialEq)]
pub enum DataLiteral {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimSpec {
    pub name: String,
    /// Upper-bound expressions, one per dimension.
    pub bounds: Vec<Expr>,
}

/// The target of a one-line `IF`'s `THEN`/`ELSE` clause: either a bare
/// line number (an implicit `GOTO`) or an inline statement list.
#[derive(Debug, Clone, PartialEq)]
pub enum ThenClause {
    Goto(u32),
    Statements(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Rem,
    Let {
        target: VariableTarget,
        value: Expr,
    },
    Print {
        parts: Vec<PrintPart>,
    },
    Input {
        prompt: Option<String>,
        targets: Vec<VariableTarget>,
    },
    PrintFile {
        channel: Expr,
        parts: Vec<PrintPart>,
    },
    InputFile {
        channel: Expr,
        targets: Vec<VariableTarget>,
    },
    Read {
        targets: Vec<VariableTarget>,
    },
    Data {
        values: Vec<DataLiteral>,
    },
    If {
        condition: Expr,
        then_branch: ThenClause,
        else_branch: Option<ThenClause>,
    },
    On {
        selector: Expr,
        kind: OnKind,
        targets: Vec<u32>,
    },
    For {
        var: VariableTarget,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
    },
    Next {
        vars: Vec<VariableTarget>,
    },
    Goto(u32),
    Gosub(u32),
    Return,
    End,
    Stop,
    Clear,
    Restore(Option<Expr>),
    Randomize(Option<Expr>),
    Dim(Vec<DimSpec>),
    Open {
        path: Expr,
        mode: FileMode,
        channel: Expr,
    },
    Close(Vec<Expr>),
    Def {
        name: String,
        params: Vec<String>,
        body: Expr,
    },
}
