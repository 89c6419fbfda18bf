//=====================================================
// File: messages.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Message passing along the part hierarchy
// Objective: Deliver messages and function calls to the first handler on the
//            message path, run handlers in their own frames, and honor pass
//=====================================================

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::ast::{Handler, Statement};
use crate::interpreter::errors::{HtError, ScriptError, ScriptResult};
use crate::interpreter::{Flow, builtins, execute_block};
use crate::parts::PartHandle;
use crate::runtime::ExecutionContext;
use crate::symbol::Symbol;
use crate::value::Value;

/// Messages HyperCard itself sends. Nobody is obliged to handle them.
static SYSTEM_MESSAGES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mouseup",
        "mousedown",
        "mousestilldown",
        "mouseenter",
        "mouseleave",
        "mousewithin",
        "opencard",
        "closecard",
        "openbackground",
        "closebackground",
        "openstack",
        "closestack",
        "openfield",
        "closefield",
        "exitfield",
        "enterinfield",
        "returninfield",
        "keydown",
        "arrowkey",
        "tabkey",
        "enterkey",
        "returnkey",
        "newcard",
        "deletecard",
        "newbackground",
        "deletebackground",
        "idle",
        "startup",
        "resume",
        "suspend",
        "quit",
    ]
    .into_iter()
    .collect()
});

pub fn is_system_message(name: &str) -> bool {
    SYSTEM_MESSAGES.contains(name.to_lowercase().as_str())
}

//=====================================================
// Section 1.0 - Handler Invocation
//=====================================================

/// Runs `handler` from `owner`'s script in a fresh frame. The frame is
/// popped however the body ends.
fn run_handler(
    ctx: &mut ExecutionContext,
    owner: &PartHandle,
    handler: &Handler,
    args: Vec<Value>,
) -> ScriptResult<Flow> {
    let name = handler.name.as_str();
    ctx.push_frame(name, Some(owner.clone()), args.clone())
        .map_err(|err| ScriptError::new(err).at(handler.span).in_handler(name))?;
    trace!(handler = name, owner = %owner.describe(), "enter handler");
    let outcome = bind_parameters(ctx, &handler.params, args)
        .map_err(ScriptError::from)
        .and_then(|_| execute_block(&handler.body, ctx));
    ctx.pop_frame();
    outcome.map_err(|err| err.in_handler(name))
}

/// Missing arguments bind as empty; extra ones stay reachable via `param`.
fn bind_parameters(
    ctx: &mut ExecutionContext,
    params: &[Symbol],
    args: Vec<Value>,
) -> Result<(), HtError> {
    let mut args = args.into_iter();
    for param in params {
        ctx.set_variable(param, args.next().unwrap_or_default())?;
    }
    Ok(())
}

//=====================================================
// Section 2.0 - Messages
//=====================================================

/// Sends `message` to `target`, which becomes `the target` until delivery
/// finishes. Returns `Flow::ExitToHyperCard` when a handler ended all
/// pending handlers; any other outcome is `Flow::Normal`.
pub fn send(
    ctx: &mut ExecutionContext,
    target: PartHandle,
    message: &str,
    args: Vec<Value>,
) -> ScriptResult<Flow> {
    debug!(message, target = %target.describe(), "send");
    let previous = ctx.target();
    ctx.set_target(Some(target.clone()));
    let outcome = deliver(ctx, target, message, args);
    ctx.set_target(previous);
    outcome
}

fn deliver(
    ctx: &mut ExecutionContext,
    target: PartHandle,
    message: &str,
    args: Vec<Value>,
) -> ScriptResult<Flow> {
    let mut receiver = Some(target);
    let mut passed = false;
    while let Some(part) = receiver {
        let script = part.script()?;
        if let Some(handler) = script.handler(message, false) {
            match run_handler(ctx, &part, handler, args.clone())? {
                Flow::Pass => passed = true,
                Flow::ExitToHyperCard => return Ok(Flow::ExitToHyperCard),
                Flow::Return(value) => {
                    ctx.set_result(value);
                    return Ok(Flow::Normal);
                }
                _ => return Ok(Flow::Normal),
            }
        }
        receiver = part.parent();
    }
    if passed || is_system_message(message) {
        trace!(message, passed, "message reached the end of the path");
        return Ok(Flow::Normal);
    }
    Err(HtError::semantic(format!("Never heard of {message}.")).into())
}

/// Sends a system notification such as `openCard`, unless lockMessages is
/// set.
pub fn notify(ctx: &mut ExecutionContext, target: PartHandle, message: &str) -> ScriptResult<Flow> {
    if ctx.runtime().properties().lock_messages() {
        trace!(message, "notification suppressed by lockMessages");
        return Ok(Flow::Normal);
    }
    send(ctx, target, message, Vec::new())
}

/// Entry point for a message arriving from outside any script.
pub fn dispatch(
    ctx: &mut ExecutionContext,
    target: PartHandle,
    message: &str,
    args: Vec<Value>,
) -> ScriptResult<()> {
    send(ctx, target, message, args).map(|_| ())
}

//=====================================================
// Section 3.0 - Functions
//=====================================================

/// Calls a user function found on the message path starting at `me` (or
/// the current card), falling back to the built-in of the same name.
pub fn call_function(ctx: &mut ExecutionContext, name: &str, args: Vec<Value>) -> ScriptResult<Value> {
    let mut receiver = match ctx.me() {
        Some(me) => Some(me),
        None => ctx.current_card().ok(),
    };
    while let Some(part) = receiver {
        let script = part.script()?;
        if let Some(handler) = script.handler(name, true) {
            match run_handler(ctx, &part, handler, args.clone())? {
                Flow::Pass => {}
                Flow::Return(value) => return Ok(value),
                _ => return Ok(Value::empty()),
            }
        }
        receiver = part.parent();
    }
    match builtins::call(ctx, name, &args) {
        Some(result) => result.map_err(ScriptError::from),
        None => Err(HtError::semantic(format!("No such function {name}.")).into()),
    }
}

//=====================================================
// Section 4.0 - Scriptlets
//=====================================================

/// Runs loose statements, as typed into the message box, in a frame with
/// no `me`. Returns the final value of `it`.
pub fn run_scriptlet(ctx: &mut ExecutionContext, statements: &[Statement]) -> ScriptResult<Value> {
    ctx.push_anonymous_frame()?;
    let outcome = execute_block(statements, ctx);
    let it = ctx.lookup_variable(&Symbol::new("it")).unwrap_or_default();
    ctx.pop_frame();
    outcome.map(|_| it)
}

//=====================================================
// End of file
//=====================================================
