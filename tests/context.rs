//=====================================================
// File: context.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Execution context scoping and limits
// Objective: Check global visibility across frames, the call depth limit,
//            abort requests and message-box binding to the focused stack
//=====================================================

#[path = "support/util.rs"]
mod util;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hypertalk::ast::{Command, RepeatKind, Script, Statement, TimeUnit};
use hypertalk::symbol::Symbol;
use hypertalk::{ExecutionContext, RuntimeConfig, ScriptResult, StackDocument, StackSpec, Value};
use util::*;

#[test]
fn globals_are_shared_only_with_frames_that_declare_them() {
    let world = World::home();
    let mut ctx = world.context();
    let counter = Symbol::new("counter");

    ctx.push_frame("writer", None, Vec::new()).unwrap();
    ctx.define_global(&counter).unwrap();
    ctx.set_variable(&counter, Value::integer(5)).unwrap();

    ctx.push_frame("stranger", None, Vec::new()).unwrap();
    assert_eq!(ctx.lookup_variable(&counter), None);
    assert_eq!(ctx.get_variable(&counter).as_str(), "counter");
    ctx.set_variable(&counter, Value::integer(99)).unwrap();
    ctx.pop_frame();

    ctx.push_frame("reader", None, Vec::new()).unwrap();
    ctx.define_global(&counter).unwrap();
    assert_eq!(ctx.get_variable(&counter).as_str(), "5");
    ctx.pop_frame();

    assert_eq!(world.global("counter").unwrap().as_str(), "5");
}

#[test]
fn globals_survive_between_dispatches_until_reset() {
    let world = World::home();
    world
        .run(vec![global(&["total"]), put(lit(3), variable("total"))])
        .unwrap();
    let it = world
        .run(vec![global(&["total"]), get(var("total"))])
        .unwrap();
    assert_eq!(it.as_str(), "3");

    world.runtime.reset();
    assert_eq!(world.global("total"), None);
}

#[test]
fn depth_limit_fails_without_leaking_a_frame() {
    let config = RuntimeConfig {
        max_call_depth: 8,
        ..RuntimeConfig::default()
    };
    let world = World::with_config(home_spec(), config);
    let mut ctx = world.context();
    for depth in 0..8 {
        ctx.push_frame(&format!("level{depth}"), None, Vec::new())
            .unwrap();
    }
    let err = ctx.push_frame("one too many", None, Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "Too much recursion.");
    assert_eq!(ctx.depth(), 8);
}

#[test]
fn runaway_recursion_unwinds_every_frame() {
    let card_script = Script::new(vec![handler(
        "dive",
        &[],
        vec![message("dive", Vec::new())],
    )]);
    let config = RuntimeConfig {
        max_call_depth: 32,
        ..RuntimeConfig::default()
    };
    let world = World::with_config(
        home_spec_with(Script::default(), Script::default(), card_script),
        config,
    );
    let mut ctx = world.context();
    let card = ctx.current_card().unwrap();
    let err = hypertalk::interpreter::dispatch(&mut ctx, card, "dive", Vec::new()).unwrap_err();
    assert_eq!(err.code_str(), "E102");
    assert_eq!(err.handler.as_deref(), Some("dive"));
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn abort_stops_frames_started_before_the_request() {
    let world = World::home();
    let mut running = world.context();
    running.push_frame("busy", None, Vec::new()).unwrap();

    world.runtime.request_abort();
    let err = running.check_abort().unwrap_err();
    assert_eq!(err.to_string(), "Script aborted.");

    let mut fresh = world.context();
    fresh.push_frame("later", None, Vec::new()).unwrap();
    assert!(fresh.check_abort().is_ok());
}

/// Runs `busy` on its own thread after flagging the global `started`, asks
/// for an abort once the flag shows up, and returns how the script ended.
fn abort_while_running(world: &World, busy: Statement) -> ScriptResult<Value> {
    let runtime = Arc::clone(&world.runtime);
    let stack = Arc::clone(&world.stack);
    let worker = thread::spawn(move || {
        let mut ctx = ExecutionContext::bound_to(runtime, stack);
        hypertalk::interpreter::run_scriptlet(
            &mut ctx,
            &[global(&["started"]), put(lit(1), variable("started")), busy],
        )
    });
    let deadline = Instant::now() + Duration::from_secs(10);
    while world.global("started").is_none_or(|flag| flag.as_str() != "1") {
        assert!(Instant::now() < deadline, "script never started");
        thread::sleep(Duration::from_millis(1));
    }
    world.runtime.request_abort();
    worker.join().unwrap()
}

#[test]
fn abort_breaks_an_endless_repeat() {
    let world = World::home();
    let busy = Statement::new(Command::Repeat {
        kind: RepeatKind::Forever,
        body: Vec::new(),
    });
    let err = abort_while_running(&world, busy).unwrap_err();
    assert_eq!(err.error.to_string(), "Script aborted.");

    let it = world
        .run(vec![
            put(lit(0), variable("n")),
            Statement::new(Command::Repeat {
                kind: RepeatKind::Count(lit(3)),
                body: vec![Statement::new(Command::Add {
                    value: lit(1),
                    target: variable("n"),
                })],
            }),
            get(var("n")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "3");
}

#[test]
fn abort_cuts_an_unbounded_wait_short() {
    let world = World::home();
    let busy = Statement::new(Command::Wait {
        duration: lit("1e300"),
        unit: TimeUnit::Seconds,
    });
    let err = abort_while_running(&world, busy).unwrap_err();
    assert_eq!(err.error.to_string(), "Script aborted.");
}

#[test]
fn unbound_context_follows_the_focused_stack() {
    let world = World::home();
    let ctx = ExecutionContext::new(Arc::clone(&world.runtime));
    assert!(!ctx.is_bound());
    let card = ctx.current_card().unwrap();
    assert!(Arc::ptr_eq(card.stack(), &world.stack));
    assert_eq!(card.name().unwrap(), "Intro");
}

#[test]
fn unbinding_returns_to_the_focused_stack() {
    let world = World::home();
    let other = StackDocument::from_spec(&StackSpec {
        name: "Other".into(),
        ..StackSpec::default()
    })
    .unwrap();
    let mut ctx = ExecutionContext::bound_to(Arc::clone(&world.runtime), Arc::clone(&other));
    assert_eq!(ctx.current_stack().unwrap().name(), "Other");
    ctx.unbind();
    assert!(!ctx.is_bound());
    assert!(Arc::ptr_eq(&ctx.current_stack().unwrap(), &world.stack));
}

#[test]
fn override_card_is_ignored_once_deleted() {
    let world = World::home();
    let ids = world.card_ids();
    let mut ctx = world.context();
    ctx.set_current_card(Some(ids[3]));
    assert_eq!(ctx.current_card().unwrap().name().unwrap(), "Fourth");
    world.stack.delete_card(ids[3]).unwrap();
    assert_eq!(ctx.current_card().unwrap().name().unwrap(), "Intro");
}

//=====================================================
// End of file
//=====================================================
