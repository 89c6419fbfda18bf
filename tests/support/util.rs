//=====================================================
// File: util.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Shared fixtures for the integration tests
// Objective: Build a small two-background stack on a headless desktop and
//            offer terse builders for the statements the tests run
//=====================================================

#![allow(dead_code)]

use std::sync::Arc;

use hypertalk::ast::{
    BinaryOp, Chunk, Command, Container, Expr, Handler, Layer, PartExpr, PartType, Preposition,
    Script, Statement,
};
use hypertalk::document::{BackgroundSpec, CardSpec, PartId, PartSpec};
use hypertalk::symbol::Symbol;
use hypertalk::{
    Desktop, ExecutionContext, Host, Runtime, RuntimeConfig, ScriptResult, StackDocument,
    StackSpec, Value,
};

//=====================================================
// Section 1.0 - Fixture World
//=====================================================

pub struct World {
    pub desktop: Arc<Desktop>,
    pub runtime: Arc<Runtime>,
    pub stack: Arc<StackDocument>,
}

impl World {
    pub fn new(spec: StackSpec) -> Self {
        Self::with_config(spec, RuntimeConfig::default())
    }

    pub fn with_config(spec: StackSpec, config: RuntimeConfig) -> Self {
        let stack = StackDocument::from_spec(&spec).expect("fixture stack is valid");
        let desktop = Arc::new(Desktop::new());
        desktop.open(Arc::clone(&stack));
        let runtime = Runtime::new(config, Arc::clone(&desktop) as Arc<dyn Host>);
        Self {
            desktop,
            runtime,
            stack,
        }
    }

    /// The four-card stack most tests use.
    pub fn home() -> Self {
        Self::new(home_spec())
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::bound_to(Arc::clone(&self.runtime), Arc::clone(&self.stack))
    }

    pub fn card_ids(&self) -> Vec<PartId> {
        self.stack.read().cards().iter().map(|card| card.id()).collect()
    }

    /// Runs message-box statements in a fresh context; yields `it`.
    pub fn run(&self, statements: Vec<Statement>) -> ScriptResult<Value> {
        let mut ctx = self.context();
        hypertalk::interpreter::run_scriptlet(&mut ctx, &statements)
    }

    /// Sends `message` to the current card; yields `the result`.
    pub fn send(&self, message: &str, args: Vec<Value>) -> ScriptResult<Value> {
        let mut ctx = self.context();
        let card = ctx.current_card()?;
        hypertalk::interpreter::dispatch(&mut ctx, card, message, args)?;
        Ok(ctx.result())
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.runtime.globals().get(&Symbol::new(name))
    }
}

/// "Home": background "Main" (field "Notes") holds cards "Intro" and
/// "Second"; background "Archive" holds "Third" and "Fourth". Intro carries
/// buttons "OK" and "1" and a card field "Title".
pub fn home_spec() -> StackSpec {
    home_spec_with(Script::default(), Script::default(), Script::default())
}

/// The home stack with scripts on the stack, the first background and the
/// first card.
pub fn home_spec_with(stack: Script, background: Script, card: Script) -> StackSpec {
    StackSpec {
        name: "Home".into(),
        script: stack,
        backgrounds: vec![
            BackgroundSpec {
                name: "Main".into(),
                script: background,
                fields: vec![PartSpec::named("Notes")],
                ..BackgroundSpec::default()
            },
            BackgroundSpec {
                name: "Archive".into(),
                ..BackgroundSpec::default()
            },
        ],
        cards: vec![
            CardSpec {
                name: "Intro".into(),
                background: 0,
                script: card,
                buttons: vec![PartSpec::named("OK"), PartSpec::named("1")],
                fields: vec![PartSpec {
                    text: "Welcome".into(),
                    ..PartSpec::named("Title")
                }],
                ..CardSpec::default()
            },
            CardSpec {
                name: "Second".into(),
                background: 0,
                ..CardSpec::default()
            },
            CardSpec {
                name: "Third".into(),
                background: 1,
                ..CardSpec::default()
            },
            CardSpec {
                name: "Fourth".into(),
                background: 1,
                ..CardSpec::default()
            },
        ],
    }
}

//=====================================================
// Section 2.0 - Builders
//=====================================================

pub fn lit(text: impl ToString) -> Expr {
    Expr::literal(text.to_string())
}

pub fn quoted(text: &str) -> Expr {
    Expr::quoted(text)
}

pub fn var(name: &str) -> Expr {
    Expr::var(name)
}

pub fn op(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs)
}

pub fn put(value: Expr, target: Container) -> Statement {
    put_with(value, Preposition::Into, target)
}

pub fn put_with(value: Expr, preposition: Preposition, target: Container) -> Statement {
    Statement::new(Command::Put {
        value,
        preposition,
        target,
    })
}

pub fn get(value: Expr) -> Statement {
    Statement::new(Command::Get { value })
}

pub fn global(names: &[&str]) -> Statement {
    Statement::new(Command::Global {
        names: names.iter().map(|name| Symbol::new(name)).collect(),
    })
}

pub fn message(name: &str, args: Vec<Expr>) -> Statement {
    Statement::new(Command::Message {
        name: Symbol::new(name),
        args,
    })
}

pub fn ret(value: Expr) -> Statement {
    Statement::new(Command::Return { value: Some(value) })
}

pub fn pass() -> Statement {
    Statement::new(Command::Pass)
}

pub fn go(destination: PartExpr) -> Statement {
    Statement::new(Command::Go {
        destination: Some(destination),
    })
}

pub fn variable(name: &str) -> Container {
    Container::variable(name)
}

pub fn variable_chunk(name: &str, chunk: Chunk) -> Container {
    Container::variable_chunk(name, chunk)
}

pub fn part_container(part: PartExpr) -> Container {
    Container::Part { part, chunk: None }
}

pub fn part_chunk(part: PartExpr, chunk: Chunk) -> Container {
    Container::Part {
        part,
        chunk: Some(chunk),
    }
}

/// `field "<name>"`.
pub fn field(name: &str) -> PartExpr {
    PartExpr::named(PartType::Field, quoted(name))
}

/// `card field "<name>"`.
pub fn card_field(name: &str) -> PartExpr {
    PartExpr::Named {
        layer: Some(Layer::Card),
        ty: PartType::Field,
        name: Box::new(quoted(name)),
    }
}

/// `card <n>`, an unquoted ordinal.
pub fn card(number: i64) -> PartExpr {
    PartExpr::named(PartType::Card, lit(number))
}

pub fn background(number: i64) -> PartExpr {
    PartExpr::named(PartType::Background, lit(number))
}

/// `global counter; add 1 to counter` as a handler body.
pub fn increment_global(name: &str) -> Vec<Statement> {
    vec![
        global(&[name]),
        Statement::new(Command::Add {
            value: lit(1),
            target: variable(name),
        }),
    ]
}

pub fn handler(name: &str, params: &[&str], body: Vec<Statement>) -> Handler {
    Handler::on(name, params, body)
}

//=====================================================
// End of file
//=====================================================
