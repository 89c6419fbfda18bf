//=====================================================
// File: ast.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: HyperTalk abstract syntax tree consumed by the runtime
// Objective: Define the serde-described handler, statement, expression,
//            chunk, container and part-expression nodes an upstream parser
//            hands to the evaluator
//=====================================================

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Source position of a node. The runtime never interprets it; it only
/// travels with errors so an editor can highlight the failing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

//=====================================================
// Section 1.0 - Scripts & Handlers
//=====================================================

/// A compiled script: the handlers attached to one part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub handlers: Vec<Handler>,
}

impl Script {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self { handlers }
    }

    /// Finds the `on` (or `function`) handler for `name`, ignoring case.
    pub fn handler(&self, name: &str, function: bool) -> Option<&Handler> {
        self.handlers
            .iter()
            .find(|handler| handler.is_function == function && handler.name.matches(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    pub name: Symbol,
    #[serde(default)]
    pub params: Vec<Symbol>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub is_function: bool,
    #[serde(default)]
    pub span: Span,
}

impl Handler {
    pub fn on(name: &str, params: &[&str], body: Vec<Statement>) -> Self {
        Self {
            name: Symbol::new(name),
            params: params.iter().map(|param| Symbol::new(param)).collect(),
            body,
            is_function: false,
            span: Span::default(),
        }
    }

    pub fn function(name: &str, params: &[&str], body: Vec<Statement>) -> Self {
        Self {
            is_function: true,
            ..Self::on(name, params, body)
        }
    }
}

//=====================================================
// Section 2.0 - Statements
//=====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub span: Span,
    pub command: Command,
}

impl Statement {
    pub fn new(command: Command) -> Self {
        Self {
            span: Span::default(),
            command,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

impl From<Command> for Statement {
    fn from(command: Command) -> Self {
        Statement::new(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preposition {
    Before,
    After,
    Into,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Ticks,
    Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatKind {
    Forever,
    Count(Expr),
    While(Expr),
    Until(Expr),
    With {
        variable: Symbol,
        from: Expr,
        to: Expr,
        #[serde(default)]
        down: bool,
    },
}

/// Built-in verbs and control constructs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Put {
        value: Expr,
        preposition: Preposition,
        target: Container,
    },
    Get {
        value: Expr,
    },
    Set {
        property: Symbol,
        #[serde(default)]
        part: Option<PartExpr>,
        value: Expr,
    },
    Global {
        names: Vec<Symbol>,
    },
    Add {
        value: Expr,
        target: Container,
    },
    Subtract {
        value: Expr,
        target: Container,
    },
    Multiply {
        target: Container,
        value: Expr,
    },
    Divide {
        target: Container,
        value: Expr,
    },
    /// `go` with no destination goes back.
    Go {
        #[serde(default)]
        destination: Option<PartExpr>,
    },
    Beep {
        #[serde(default)]
        count: Option<Expr>,
    },
    Wait {
        duration: Expr,
        unit: TimeUnit,
    },
    Send {
        message: Expr,
        #[serde(default)]
        target: Option<PartExpr>,
    },
    VisualEffect {
        effect: Expr,
    },
    NewCard,
    NewBackground,
    DeleteCard {
        #[serde(default)]
        card: Option<PartExpr>,
    },
    /// A bare `name arg, arg` line: a message sent to `me`.
    Message {
        name: Symbol,
        #[serde(default)]
        args: Vec<Expr>,
    },
    If {
        condition: Expr,
        then_branch: Vec<Statement>,
        #[serde(default)]
        else_branch: Vec<Statement>,
    },
    Repeat {
        kind: RepeatKind,
        body: Vec<Statement>,
    },
    ExitRepeat,
    NextRepeat,
    ExitHandler,
    ExitToHyperCard,
    Pass,
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
}

//=====================================================
// Section 3.0 - Expressions
//=====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Div,
    Mod,
    Power,
    Concat,
    ConcatSpaced,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Contains,
    IsIn,
    IsNotIn,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal {
        text: String,
        #[serde(default)]
        quoted: bool,
    },
    /// A variable read; an undeclared name reads as its own spelling.
    Variable(Symbol),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Chunk {
        chunk: Chunk,
        of: Box<Expr>,
    },
    /// `the <property> of <part>`, or a HyperCard property when `part` is absent.
    Property {
        property: Symbol,
        #[serde(default)]
        part: Option<PartExpr>,
    },
    /// The contents of a part (a field's text, a button's contents).
    Part(PartExpr),
    Call {
        name: Symbol,
        #[serde(default)]
        args: Vec<Expr>,
    },
    CountChunks {
        kind: ChunkType,
        of: Box<Expr>,
    },
    CountParts {
        ty: PartType,
        #[serde(default)]
        layer: Option<Layer>,
        #[serde(default)]
        owner: Option<Box<PartExpr>>,
    },
}

impl Expr {
    pub fn literal(text: impl Into<String>) -> Self {
        Expr::Literal {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Expr::Literal {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn var(name: &str) -> Self {
        Expr::Variable(Symbol::new(name))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: Symbol::new(name),
            args,
        }
    }
}

//=====================================================
// Section 4.0 - Chunks & Containers
//=====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Char,
    Word,
    Item,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordinal {
    Last,
    Middle,
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkIndex {
    At(Box<Expr>),
    Ordinal(Ordinal),
}

impl ChunkIndex {
    pub fn at(expr: Expr) -> Self {
        ChunkIndex::At(Box::new(expr))
    }
}

/// `<kind> <start> [to <end>] [of <within>]`. `within` is the enclosing
/// chunk, i.e. the one closer to the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub kind: ChunkType,
    pub start: ChunkIndex,
    #[serde(default)]
    pub end: Option<ChunkIndex>,
    #[serde(default)]
    pub within: Option<Box<Chunk>>,
}

impl Chunk {
    pub fn single(kind: ChunkType, index: i64) -> Self {
        Self {
            kind,
            start: ChunkIndex::at(Expr::literal(index.to_string())),
            end: None,
            within: None,
        }
    }

    pub fn range(kind: ChunkType, start: i64, end: i64) -> Self {
        Self {
            end: Some(ChunkIndex::at(Expr::literal(end.to_string()))),
            ..Self::single(kind, start)
        }
    }

    pub fn of(mut self, within: Chunk) -> Self {
        self.within = Some(Box::new(within));
        self
    }
}

/// Something that can be read, and written through with `put`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Variable {
        name: Symbol,
        #[serde(default)]
        chunk: Option<Chunk>,
    },
    Part {
        part: PartExpr,
        #[serde(default)]
        chunk: Option<Chunk>,
    },
    Property {
        property: Symbol,
        #[serde(default)]
        part: Option<PartExpr>,
        #[serde(default)]
        chunk: Option<Chunk>,
    },
    MessageBox,
}

impl Container {
    pub fn variable(name: &str) -> Self {
        Container::Variable {
            name: Symbol::new(name),
            chunk: None,
        }
    }

    pub fn variable_chunk(name: &str, chunk: Chunk) -> Self {
        Container::Variable {
            name: Symbol::new(name),
            chunk: Some(chunk),
        }
    }
}

//=====================================================
// Section 5.0 - Part Expressions
//=====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Button,
    Field,
    Card,
    Background,
    Stack,
}

/// Which layer a button or field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Card,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Next,
    Prev,
    This,
}

/// Unevaluated part reference. Evaluating one yields a `PartSpecifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartExpr {
    Id {
        #[serde(default)]
        layer: Option<Layer>,
        ty: PartType,
        id: Box<Expr>,
    },
    /// `button "OK"` or `card 3`: an unquoted integer means an ordinal.
    Named {
        #[serde(default)]
        layer: Option<Layer>,
        ty: PartType,
        name: Box<Expr>,
    },
    Ordinal {
        #[serde(default)]
        layer: Option<Layer>,
        ty: PartType,
        ordinal: Ordinal,
    },
    Position {
        ty: PartType,
        position: Position,
    },
    Stack {
        #[serde(default)]
        name: Option<Box<Expr>>,
    },
    Of {
        part: Box<PartExpr>,
        owner: Box<PartExpr>,
    },
    Me,
    Target,
}

impl PartExpr {
    pub fn named(ty: PartType, name: Expr) -> Self {
        PartExpr::Named {
            layer: None,
            ty,
            name: Box::new(name),
        }
    }

    pub fn id(ty: PartType, id: i64) -> Self {
        PartExpr::Id {
            layer: None,
            ty,
            id: Box::new(Expr::literal(id.to_string())),
        }
    }

    pub fn position(ty: PartType, position: Position) -> Self {
        PartExpr::Position { ty, position }
    }

    pub fn of(self, owner: PartExpr) -> Self {
        PartExpr::Of {
            part: Box::new(self),
            owner: Box::new(owner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_lookup_ignores_case_and_kind() {
        let script = Script::new(vec![
            Handler::on("mouseUp", &[], Vec::new()),
            Handler::function("double", &["n"], Vec::new()),
        ]);
        assert!(script.handler("MOUSEUP", false).is_some());
        assert!(script.handler("double", false).is_none());
        assert!(script.handler("Double", true).is_some());
    }

    #[test]
    fn statements_deserialize_from_json() {
        let json = r#"{
            "span": { "line": 2, "column": 3 },
            "command": { "put": {
                "value": { "literal": { "text": "5" } },
                "preposition": "into",
                "target": { "variable": { "name": "x" } }
            } }
        }"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(statement.span, Span::new(2, 3));
        match statement.command {
            Command::Put { preposition, target, .. } => {
                assert_eq!(preposition, Preposition::Into);
                assert_eq!(target, Container::variable("x"));
            }
            other => panic!("expected put, found {other:?}"),
        }
    }
}

//=====================================================
// End of file
//=====================================================
