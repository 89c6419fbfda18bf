//=====================================================
// File: interpreter.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Tree-walking HyperTalk evaluator
// Objective: Execute statements, evaluate expressions, chunk descriptors
//            and part expressions against an execution context
//=====================================================

pub mod builtins;
pub mod commands;
pub mod container;
pub mod errors;
pub mod messages;

use std::sync::Arc;

use tracing::trace;

use crate::ast::{BinaryOp, Chunk, ChunkIndex, Expr, Layer, PartExpr, PartType, Statement, UnaryOp};
use crate::chunk::{Index, ResolvedChunk, count_chunks, get_chunk};
use crate::document::{PartKind, PartModel};
use crate::parts::specifier::type_word;
use crate::parts::{PartHandle, PartRef, PartSpecifier};
use crate::runtime::ExecutionContext;
use crate::value::Value;

pub use container::Address;
pub use errors::{ErrorCode, HtError, HtResult, ScriptError, ScriptResult};
pub use messages::{call_function, dispatch, notify, run_scriptlet, send};

/// How a statement finished. Anything but `Normal` unwinds enclosing
/// blocks until something consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    ExitRepeat,
    NextRepeat,
    ExitHandler,
    ExitToHyperCard,
    Pass,
    Return(Value),
}

pub fn execute_block(statements: &[Statement], ctx: &mut ExecutionContext) -> ScriptResult<Flow> {
    for statement in statements {
        let flow = statement.execute(ctx)?;
        if flow != Flow::Normal {
            return Ok(flow);
        }
    }
    Ok(Flow::Normal)
}

impl Statement {
    pub fn execute(&self, ctx: &mut ExecutionContext) -> ScriptResult<Flow> {
        trace!(line = self.span.line, "execute");
        commands::execute(&self.command, ctx).map_err(|err| err.at(self.span))
    }
}

//=====================================================
// Section 1.0 - Expressions
//=====================================================

impl Expr {
    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> ScriptResult<Value> {
        match self {
            Expr::Literal { text, quoted: true } => Ok(Value::quoted(text.as_str())),
            Expr::Literal { text, quoted: false } => Ok(Value::text(text.as_str())),
            Expr::Variable(name) => Ok(ctx.get_variable(name)),
            Expr::Binary { op, lhs, rhs } => binary(*op, lhs, rhs, ctx),
            Expr::Unary { op, operand } => {
                let operand = operand.evaluate(ctx)?;
                Ok(match op {
                    UnaryOp::Not => operand.not()?,
                    UnaryOp::Negate => operand.negate()?,
                })
            }
            Expr::Chunk { chunk, of } => {
                let text = of.evaluate(ctx)?;
                let chunk = chunk.evaluate(ctx)?;
                Ok(Value::text(get_chunk(text.as_str(), &chunk, &ctx.item_delimiter())))
            }
            Expr::Property { property, part } => match part {
                Some(part) => Ok(part.resolve(ctx)?.get_property(property.as_str())?),
                None => {
                    let runtime = Arc::clone(ctx.runtime());
                    Ok(runtime.properties().get(property.as_str(), runtime.host())?)
                }
            },
            Expr::Part(part) => Ok(part.resolve(ctx)?.contents()?),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(ctx))
                    .collect::<ScriptResult<Vec<_>>>()?;
                call_function(ctx, name.as_str(), args)
            }
            Expr::CountChunks { kind, of } => {
                let text = of.evaluate(ctx)?;
                let count = count_chunks(text.as_str(), *kind, &ctx.item_delimiter());
                Ok(Value::integer(count as i64))
            }
            Expr::CountParts { ty, layer, owner } => count_parts(ctx, *ty, *layer, owner.as_deref()),
        }
    }
}

/// Operands evaluate left to right; `and` and `or` skip the right operand
/// once the answer is known.
fn binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, ctx: &mut ExecutionContext) -> ScriptResult<Value> {
    let left = lhs.evaluate(ctx)?;
    match op {
        BinaryOp::And if !left.boolean_value()? => return Ok(Value::boolean(false)),
        BinaryOp::Or if left.boolean_value()? => return Ok(Value::boolean(true)),
        _ => {}
    }
    let right = rhs.evaluate(ctx)?;
    let value = match op {
        BinaryOp::Add => left.add(&right)?,
        BinaryOp::Subtract => left.subtract(&right)?,
        BinaryOp::Multiply => left.multiply(&right)?,
        BinaryOp::Divide => left.divide(&right)?,
        BinaryOp::Div => left.div(&right)?,
        BinaryOp::Mod => left.modulo(&right)?,
        BinaryOp::Power => left.power(&right)?,
        BinaryOp::Concat => left.concat(&right),
        BinaryOp::ConcatSpaced => left.concat_spaced(&right),
        BinaryOp::Equal => left.equals(&right),
        BinaryOp::NotEqual => left.not_equals(&right),
        BinaryOp::Less => left.less_than(&right),
        BinaryOp::Greater => left.greater_than(&right),
        BinaryOp::LessEqual => left.less_than_or_equal(&right),
        BinaryOp::GreaterEqual => left.greater_than_or_equal(&right),
        BinaryOp::Contains => left.contains(&right),
        BinaryOp::IsIn => left.is_in(&right),
        BinaryOp::IsNotIn => left.is_in(&right).not()?,
        BinaryOp::And => left.and(&right)?,
        BinaryOp::Or => left.or(&right)?,
    };
    Ok(value)
}

fn count_parts(
    ctx: &mut ExecutionContext,
    ty: PartType,
    layer: Option<Layer>,
    owner: Option<&PartExpr>,
) -> ScriptResult<Value> {
    let owner = match owner {
        Some(owner) => owner.resolve(ctx)?,
        None if matches!(ty, PartType::Card | PartType::Background) => {
            PartHandle::stack_handle(ctx.current_stack()?)
        }
        None => ctx.current_card()?,
    };
    let kind = match ty {
        PartType::Button => Some(PartKind::Button),
        PartType::Field => Some(PartKind::Field),
        _ => None,
    };
    let layer = layer.unwrap_or(match ty {
        PartType::Field => Layer::Background,
        _ => Layer::Card,
    });
    let count = {
        let model = owner.stack().read();
        let of_kind = |parts: &[Arc<PartModel>]| {
            parts.iter().filter(|part| Some(part.kind()) == kind).count()
        };
        match (ty, owner.part()) {
            (PartType::Card, PartRef::Stack) => Some(model.cards().len()),
            (PartType::Card, PartRef::Background(id)) => Some(model.cards_of_background(id).len()),
            (PartType::Background, PartRef::Stack) => Some(model.backgrounds_in_order().len()),
            (PartType::Button | PartType::Field, PartRef::Card(id)) => {
                model.card(id).and_then(|card| match layer {
                    Layer::Card => Some(of_kind(card.parts())),
                    Layer::Background => model
                        .background(card.background())
                        .map(|background| of_kind(background.parts())),
                })
            }
            (PartType::Button | PartType::Field, PartRef::Background(id)) => {
                model.background(id).map(|background| of_kind(background.parts()))
            }
            _ => None,
        }
    };
    count.map(|count| Value::integer(count as i64)).ok_or_else(|| {
        HtError::semantic(format!(
            "Can't count the {}s of {}.",
            type_word(ty),
            owner.describe()
        ))
        .into()
    })
}

//=====================================================
// Section 2.0 - Chunks & Parts
//=====================================================

fn index(index: &ChunkIndex, ctx: &mut ExecutionContext) -> ScriptResult<Index> {
    match index {
        ChunkIndex::Ordinal(ordinal) => Ok(Index::Ordinal(*ordinal)),
        ChunkIndex::At(expr) => {
            let value = expr.evaluate(ctx)?;
            value.integer_value().map(Index::At).map_err(|_| {
                HtError::ChunkRange(format!(
                    "Expected a chunk number but found \"{}\".",
                    value.as_str()
                ))
                .into()
            })
        }
    }
}

impl Chunk {
    /// Evaluates the index expressions, enclosing chunk first.
    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> ScriptResult<ResolvedChunk> {
        let within = match &self.within {
            Some(within) => Some(Box::new(within.evaluate(ctx)?)),
            None => None,
        };
        let start = index(&self.start, ctx)?;
        let end = match &self.end {
            Some(end) => Some(index(end, ctx)?),
            None => None,
        };
        Ok(ResolvedChunk {
            kind: self.kind,
            start,
            end,
            within,
        })
    }
}

impl PartExpr {
    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> ScriptResult<PartSpecifier> {
        let spec = match self {
            PartExpr::Id { layer, ty, id } => {
                let value = id.evaluate(ctx)?;
                let id = value
                    .integer_value()
                    .ok()
                    .and_then(|id| u64::try_from(id).ok())
                    .ok_or_else(|| {
                        HtError::no_such_part(format!("{} id {}", type_word(*ty), value.as_str()))
                    })?;
                PartSpecifier::Id {
                    layer: *layer,
                    ty: *ty,
                    id,
                }
            }
            PartExpr::Named { layer, ty, name } => {
                let value = name.evaluate(ctx)?;
                match value.integer_value() {
                    Ok(number) if !value.is_quoted_literal() => PartSpecifier::Number {
                        layer: *layer,
                        ty: *ty,
                        number,
                    },
                    _ => PartSpecifier::Name {
                        layer: *layer,
                        ty: *ty,
                        literal: value.is_quoted_literal(),
                        name: value.into_string(),
                    },
                }
            }
            PartExpr::Ordinal { layer, ty, ordinal } => PartSpecifier::Ordinal {
                layer: *layer,
                ty: *ty,
                ordinal: *ordinal,
            },
            PartExpr::Position { ty, position } => PartSpecifier::Position {
                ty: *ty,
                position: *position,
            },
            PartExpr::Stack { name } => PartSpecifier::Stack {
                name: match name {
                    Some(name) => Some(name.evaluate(ctx)?.into_string()),
                    None => None,
                },
            },
            PartExpr::Of { part, owner } => {
                let owner = owner.evaluate(ctx)?;
                part.evaluate(ctx)?.of(owner)
            }
            PartExpr::Me => ctx
                .me()
                .map(PartSpecifier::Resolved)
                .ok_or_else(|| HtError::semantic("There is no \"me\" here."))?,
            PartExpr::Target => ctx
                .target()
                .map(PartSpecifier::Resolved)
                .ok_or_else(|| HtError::semantic("There is no target."))?,
        };
        Ok(spec)
    }

    pub fn resolve(&self, ctx: &mut ExecutionContext) -> ScriptResult<PartHandle> {
        let spec = self.evaluate(ctx)?;
        Ok(ctx.resolve(&spec)?)
    }
}

//=====================================================
// End of file
//=====================================================
