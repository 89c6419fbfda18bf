//=====================================================
// File: commands.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Built-in HyperTalk commands and control structures
// Objective: Execute each command variant against an execution context and
//            report how control leaves the statement
//=====================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::ast::{Command, Container, Expr, PartExpr, Preposition, RepeatKind, Statement, TimeUnit};
use crate::document::{PartId, StackDocument};
use crate::interpreter::errors::{HtError, HtResult, ScriptResult};
use crate::interpreter::{Flow, execute_block, messages};
use crate::parts::{PartHandle, PartRef, PartSpecifier};
use crate::runtime::{AbortSignal, Destination, ExecutionContext};
use crate::symbol::Symbol;
use crate::value::Value;

const NO_SUCH_STACK: &str = "No such stack.";
const NO_SUCH_CARD: &str = "No such card.";

pub(crate) fn execute(command: &Command, ctx: &mut ExecutionContext) -> ScriptResult<Flow> {
    match command {
        Command::Put {
            value,
            preposition,
            target,
        } => {
            let value = value.evaluate(ctx)?;
            target.address(ctx)?.write(ctx, *preposition, value)?;
        }
        Command::Get { value } => {
            let value = value.evaluate(ctx)?;
            ctx.set_variable(&Symbol::new("it"), value)?;
        }
        Command::Set {
            property,
            part,
            value,
        } => {
            let value = value.evaluate(ctx)?;
            match part {
                Some(part) => part.resolve(ctx)?.set_property(property.as_str(), value)?,
                None => ctx.runtime().properties().set(property.as_str(), value)?,
            }
        }
        Command::Global { names } => {
            for name in names {
                ctx.define_global(name)?;
            }
        }
        Command::Add { value, target } => arithmetic(ctx, value, target, Value::add)?,
        Command::Subtract { value, target } => arithmetic(ctx, value, target, Value::subtract)?,
        Command::Multiply { target, value } => arithmetic(ctx, value, target, Value::multiply)?,
        Command::Divide { target, value } => arithmetic(ctx, value, target, Value::divide)?,
        Command::Go { destination } => return go(ctx, destination.as_ref()),
        Command::Beep { count } => beep(ctx, count.as_ref())?,
        Command::Wait { duration, unit } => wait(ctx, duration, *unit)?,
        Command::Send { message, target } => return send(ctx, message, target.as_ref()),
        Command::VisualEffect { effect } => {
            let effect = effect.evaluate(ctx)?.into_string();
            ctx.set_visual_effect(Some(effect))?;
        }
        Command::NewCard => {
            let stack = ctx.current_stack()?;
            let card = stack.new_card()?;
            return created(ctx, stack, card, "newCard");
        }
        Command::NewBackground => {
            let stack = ctx.current_stack()?;
            let card = stack.new_background()?;
            return created(ctx, stack, card, "newBackground");
        }
        Command::DeleteCard { card } => return delete_card(ctx, card.as_ref()),
        Command::Message { name, args } => {
            let args = args
                .iter()
                .map(|arg| arg.evaluate(ctx))
                .collect::<ScriptResult<Vec<_>>>()?;
            let receiver = match ctx.me() {
                Some(me) => me,
                None => ctx.current_card()?,
            };
            return exit_or_continue(messages::send(ctx, receiver, name.as_str(), args)?);
        }
        Command::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let branch = if condition.evaluate(ctx)?.boolean_value()? {
                then_branch
            } else {
                else_branch
            };
            return execute_block(branch, ctx);
        }
        Command::Repeat { kind, body } => return repeat(ctx, kind, body),
        Command::ExitRepeat => return Ok(Flow::ExitRepeat),
        Command::NextRepeat => return Ok(Flow::NextRepeat),
        Command::ExitHandler => return Ok(Flow::ExitHandler),
        Command::ExitToHyperCard => return Ok(Flow::ExitToHyperCard),
        Command::Pass => return Ok(Flow::Pass),
        Command::Return { value } => {
            let value = match value {
                Some(value) => value.evaluate(ctx)?,
                None => Value::empty(),
            };
            return Ok(Flow::Return(value));
        }
    }
    Ok(Flow::Normal)
}

/// Only `exit to HyperCard` keeps unwinding once a message was handled.
fn exit_or_continue(flow: Flow) -> ScriptResult<Flow> {
    match flow {
        Flow::ExitToHyperCard => Ok(Flow::ExitToHyperCard),
        _ => Ok(Flow::Normal),
    }
}

//=====================================================
// Section 1.0 - Containers
//=====================================================

/// Reads, combines and writes back through one resolved address.
fn arithmetic(
    ctx: &mut ExecutionContext,
    value: &Expr,
    target: &Container,
    op: fn(&Value, &Value) -> HtResult<Value>,
) -> ScriptResult<()> {
    let operand = value.evaluate(ctx)?;
    let address = target.address(ctx)?;
    let current = address.read(ctx)?;
    let updated = op(&current, &operand)?;
    address.write(ctx, Preposition::Into, updated)?;
    Ok(())
}

//=====================================================
// Section 2.0 - Timing
//=====================================================

fn pause(ctx: &ExecutionContext, duration: Duration) -> ScriptResult<()> {
    let poll = Duration::from_millis(ctx.runtime().config().abort_poll_ms.max(1));
    if !AbortSignal::sleep_polling(duration, poll, || ctx.did_abort()) {
        ctx.check_abort()?;
    }
    Ok(())
}

fn beep(ctx: &mut ExecutionContext, count: Option<&Expr>) -> ScriptResult<()> {
    let count = match count {
        Some(count) => count.evaluate(ctx)?.integer_value()?,
        None => 1,
    };
    let interval = Duration::from_millis(ctx.runtime().config().beep_interval_ms);
    for beeped in 0..count.max(0) {
        if beeped > 0 {
            pause(ctx, interval)?;
        }
        ctx.runtime().host().beep();
    }
    Ok(())
}

fn wait(ctx: &mut ExecutionContext, duration: &Expr, unit: TimeUnit) -> ScriptResult<()> {
    let amount = duration.evaluate(ctx)?.real_value()?;
    let seconds = match unit {
        TimeUnit::Ticks => amount / 60.0,
        TimeUnit::Seconds => amount,
    };
    if seconds > 0.0 {
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);
        pause(ctx, duration)?;
    }
    ctx.check_abort()?;
    Ok(())
}

//=====================================================
// Section 3.0 - Loops
//=====================================================

/// Runs one pass of a loop body. `Some` carries a flow that leaves the loop.
fn iterate(ctx: &mut ExecutionContext, body: &[Statement]) -> ScriptResult<Option<Flow>> {
    ctx.check_abort()?;
    match execute_block(body, ctx)? {
        Flow::Normal | Flow::NextRepeat => Ok(None),
        Flow::ExitRepeat => Ok(Some(Flow::Normal)),
        other => Ok(Some(other)),
    }
}

fn repeat(ctx: &mut ExecutionContext, kind: &RepeatKind, body: &[Statement]) -> ScriptResult<Flow> {
    match kind {
        RepeatKind::Forever => loop {
            if let Some(flow) = iterate(ctx, body)? {
                return Ok(flow);
            }
        },
        RepeatKind::Count(count) => {
            let count = count.evaluate(ctx)?.integer_value()?;
            for _ in 0..count.max(0) {
                if let Some(flow) = iterate(ctx, body)? {
                    return Ok(flow);
                }
            }
        }
        RepeatKind::While(condition) => {
            while condition.evaluate(ctx)?.boolean_value()? {
                if let Some(flow) = iterate(ctx, body)? {
                    return Ok(flow);
                }
            }
        }
        RepeatKind::Until(condition) => {
            while !condition.evaluate(ctx)?.boolean_value()? {
                if let Some(flow) = iterate(ctx, body)? {
                    return Ok(flow);
                }
            }
        }
        RepeatKind::With {
            variable,
            from,
            to,
            down,
        } => {
            let from = from.evaluate(ctx)?.integer_value()?;
            let to = to.evaluate(ctx)?.integer_value()?;
            let step: i64 = if *down { -1 } else { 1 };
            let mut counter = from;
            while (*down && counter >= to) || (!*down && counter <= to) {
                ctx.set_variable(variable, Value::integer(counter))?;
                if let Some(flow) = iterate(ctx, body)? {
                    return Ok(flow);
                }
                match counter.checked_add(step) {
                    Some(next) => counter = next,
                    None => break,
                }
            }
        }
    }
    Ok(Flow::Normal)
}

//=====================================================
// Section 4.0 - Navigation
//=====================================================

/// Finds the stack and card a `go` lands on, or the result text to report.
fn locate(ctx: &ExecutionContext, spec: &PartSpecifier) -> Result<(Arc<StackDocument>, PartId), &'static str> {
    let stack = ctx.stack_for(spec).map_err(|_| NO_SUCH_STACK)?;
    if spec.is_stack() {
        let card = stack.current_card_id();
        return Ok((stack, card));
    }
    let handle = ctx.resolve(spec).map_err(|_| NO_SUCH_CARD)?;
    let card = match handle.part() {
        PartRef::Card(id) => id,
        PartRef::Background(_) => handle.card_context().ok_or(NO_SUCH_CARD)?,
        PartRef::Stack => handle.stack().current_card_id(),
        PartRef::Part { .. } => return Err(NO_SUCH_CARD),
    };
    Ok((Arc::clone(handle.stack()), card))
}

/// A destination that can't be found is not an error: `the result` says
/// why and the script carries on.
fn go(ctx: &mut ExecutionContext, destination: Option<&PartExpr>) -> ScriptResult<Flow> {
    let visual_effect = ctx.take_visual_effect();
    let Some(destination) = destination else {
        return match ctx.runtime().host().go_back() {
            Some(back) => arrive(ctx, back, false),
            None => {
                ctx.set_result(Value::empty());
                Ok(Flow::Normal)
            }
        };
    };
    let spec = destination.evaluate(ctx)?;
    match locate(ctx, &spec) {
        Ok((stack, card)) => arrive(
            ctx,
            Destination {
                stack,
                card,
                visual_effect,
            },
            true,
        ),
        Err(reason) => {
            debug!(destination = %spec, reason, "go failed");
            ctx.set_result(Value::text(reason));
            Ok(Flow::Normal)
        }
    }
}

/// Leaves the current card and shows `destination`, sending closeCard and
/// openCard around the move.
fn arrive(ctx: &mut ExecutionContext, destination: Destination, announce: bool) -> ScriptResult<Flow> {
    if let Ok(leaving) = ctx.current_card() {
        if messages::notify(ctx, leaving, "closeCard")? == Flow::ExitToHyperCard {
            return Ok(Flow::ExitToHyperCard);
        }
    }
    if announce {
        ctx.runtime().host().navigate(&destination);
    }
    let Destination { stack, card, .. } = destination;
    stack.write().set_current_card(card)?;
    ctx.bind(Arc::clone(&stack));
    ctx.set_current_card(None);
    ctx.set_result(Value::empty());
    let arriving = PartHandle::card_handle(stack, card);
    exit_or_continue(messages::notify(ctx, arriving, "openCard")?)
}

//=====================================================
// Section 5.0 - Structure Edits
//=====================================================

fn created(ctx: &mut ExecutionContext, stack: Arc<StackDocument>, card: PartId, message: &str) -> ScriptResult<Flow> {
    info!(stack = %stack.name(), card, "card created");
    ctx.set_current_card(None);
    let visual_effect = ctx.take_visual_effect();
    ctx.runtime().host().navigate(&Destination {
        stack: Arc::clone(&stack),
        card,
        visual_effect,
    });
    let handle = PartHandle::card_handle(stack, card);
    exit_or_continue(messages::notify(ctx, handle, message)?)
}

fn delete_card(ctx: &mut ExecutionContext, card: Option<&PartExpr>) -> ScriptResult<Flow> {
    let handle = match card {
        Some(card) => card.resolve(ctx)?,
        None => ctx.current_card()?,
    };
    let PartRef::Card(id) = handle.part() else {
        return Err(HtError::semantic(format!("Can't delete {}.", handle.describe())).into());
    };
    if messages::notify(ctx, handle.clone(), "deleteCard")? == Flow::ExitToHyperCard {
        return Ok(Flow::ExitToHyperCard);
    }
    let stack = Arc::clone(handle.stack());
    let was_current = stack.current_card_id() == id;
    stack.delete_card(id)?;
    info!(stack = %stack.name(), card = id, "card deleted");
    ctx.set_current_card(None);
    if was_current {
        let visual_effect = ctx.take_visual_effect();
        ctx.runtime().host().navigate(&Destination {
            card: stack.current_card_id(),
            stack,
            visual_effect,
        });
    }
    Ok(Flow::Normal)
}

//=====================================================
// Section 6.0 - Send
//=====================================================

/// `send "name arg1, arg2" to <part>`: the first word names the message and
/// the rest is a comma-separated argument list.
fn send(ctx: &mut ExecutionContext, message: &Expr, target: Option<&PartExpr>) -> ScriptResult<Flow> {
    let text = message.evaluate(ctx)?.into_string();
    let text = text.trim();
    let (name, args) = match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (
            name,
            rest.split(',').map(|arg| Value::text(arg.trim())).collect(),
        ),
        None => (text, Vec::new()),
    };
    if name.is_empty() {
        return Err(HtError::semantic("Can't send an empty message.").into());
    }
    let receiver = match target {
        Some(target) => target.resolve(ctx)?,
        None => match ctx.me() {
            Some(me) => me,
            None => ctx.current_card()?,
        },
    };
    exit_or_continue(messages::send(ctx, receiver, name, args)?)
}

//=====================================================
// End of file
//=====================================================
