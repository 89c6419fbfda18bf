//=====================================================
// File: interpreter.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: End-to-end script execution
// Objective: Drive handlers, functions, loops, containers, navigation and
//            message sending through the evaluator on the fixture stack
//=====================================================

#[path = "support/util.rs"]
mod util;

use hypertalk::ast::{
    BinaryOp, Command, Container, Expr, Handler, PartExpr, PartType, Preposition, RepeatKind, Script,
    Statement, TimeUnit,
};
use hypertalk::symbol::Symbol;
use hypertalk::{RuntimeConfig, Value};
use util::*;

fn log_after(text: &str) -> Vec<Statement> {
    vec![
        global(&["log"]),
        put_with(quoted(text), Preposition::After, variable("log")),
    ]
}

fn with_pass(mut body: Vec<Statement>) -> Vec<Statement> {
    body.push(pass());
    body
}

fn the_result() -> Expr {
    Expr::call("result", Vec::new())
}

//=====================================================
// Section 1.0 - Messages & Handlers
//=====================================================

#[test]
fn passed_message_climbs_the_whole_path() {
    let mut spec = home_spec_with(
        Script::new(vec![handler("mouseUp", &[], log_after("s"))]),
        Script::new(vec![handler("mouseUp", &[], with_pass(log_after("g")))]),
        Script::new(vec![handler("mouseUp", &[], with_pass(log_after("c")))]),
    );
    spec.cards[0].buttons[0].script =
        Script::new(vec![handler("mouseUp", &[], with_pass(log_after("b")))]);
    let world = World::new(spec);

    let mut ctx = world.context();
    let button = PartExpr::named(PartType::Button, quoted("OK"))
        .resolve(&mut ctx)
        .unwrap();
    hypertalk::interpreter::dispatch(&mut ctx, button, "mouseUp", Vec::new()).unwrap();
    assert_eq!(world.global("log").unwrap().as_str(), "bcgs");
}

#[test]
fn handled_message_stops_at_the_first_handler() {
    let world = World::new(home_spec_with(
        Script::new(vec![handler("mouseUp", &[], log_after("s"))]),
        Script::default(),
        Script::new(vec![handler("mouseUp", &[], log_after("c"))]),
    ));
    world.send("mouseUp", Vec::new()).unwrap();
    assert_eq!(world.global("log").unwrap().as_str(), "c");
}

#[test]
fn unknown_messages_fail_but_system_messages_do_not() {
    let world = World::home();
    assert!(world.send("mouseUp", Vec::new()).is_ok());
    let err = world.send("frobnicate", Vec::new()).unwrap_err();
    assert_eq!(err.code_str(), "E102");
    assert_eq!(err.to_string(), "Never heard of frobnicate.");
}

#[test]
fn return_from_a_message_handler_sets_the_result() {
    let card = Script::new(vec![handler(
        "compute",
        &["a", "b"],
        vec![ret(op(BinaryOp::Add, var("a"), var("b")))],
    )]);
    let world = World::new(home_spec_with(Script::default(), Script::default(), card));
    let result = world
        .send("compute", vec![Value::integer(2), Value::integer(3)])
        .unwrap();
    assert_eq!(result.as_str(), "5");
}

#[test]
fn missing_arguments_bind_empty_and_extras_stay_reachable() {
    let card = Script::new(vec![handler(
        "tally",
        &["first", "second"],
        vec![ret(op(
            BinaryOp::ConcatSpaced,
            op(BinaryOp::Concat, var("second"), quoted("|")),
            Expr::call("paramCount", Vec::new()),
        ))],
    )]);
    let world = World::new(home_spec_with(Script::default(), Script::default(), card));
    assert_eq!(world.send("tally", vec![Value::text("x")]).unwrap().as_str(), "| 1");
    let three = vec![Value::text("x"), Value::text("y"), Value::text("z")];
    assert_eq!(world.send("tally", three).unwrap().as_str(), "y| 3");
}

#[test]
fn errors_report_the_innermost_handler_and_line() {
    let card = Script::new(vec![
        handler("outer", &[], vec![message("inner", Vec::new())]),
        handler(
            "inner",
            &[],
            vec![put(op(BinaryOp::Add, quoted("abc"), lit(1)), variable("x")).at(7, 5)],
        ),
    ]);
    let world = World::new(home_spec_with(Script::default(), Script::default(), card));
    let err = world.send("outer", Vec::new()).unwrap_err();
    assert_eq!(err.handler.as_deref(), Some("inner"));
    assert_eq!(err.span.map(|span| span.line), Some(7));
}

#[test]
fn exit_to_hypercard_ends_every_pending_handler() {
    let card = Script::new(vec![
        handler(
            "outer",
            &[],
            vec![
                message("inner", Vec::new()),
                put(quoted("after"), variable("never")),
                global(&["log"]),
                put(quoted("outer continued"), variable("log")),
            ],
        ),
        handler(
            "inner",
            &[],
            vec![Statement::new(Command::ExitToHyperCard)],
        ),
    ]);
    let world = World::new(home_spec_with(Script::default(), Script::default(), card));
    world.send("outer", Vec::new()).unwrap();
    assert_eq!(world.global("log"), None);
}

#[test]
fn send_to_a_part_sets_the_target() {
    let card = Script::new(vec![handler(
        "ping",
        &["word"],
        vec![ret(op(
            BinaryOp::ConcatSpaced,
            var("word"),
            Expr::Property {
                property: Symbol::new("short name"),
                part: Some(PartExpr::Target),
            },
        ))],
    )]);
    let world = World::new(home_spec_with(Script::default(), Script::default(), card));
    let it = world
        .run(vec![
            Statement::new(Command::Send {
                message: quoted("ping hello"),
                target: Some(PartExpr::named(PartType::Button, quoted("OK"))),
            }),
            get(the_result()),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "hello OK");
}

//=====================================================
// Section 2.0 - Functions & Loops
//=====================================================

#[test]
fn user_functions_shadow_and_builtins_fill_in() {
    let stack = Script::new(vec![Handler::function(
        "double",
        &["n"],
        vec![ret(op(BinaryOp::Multiply, var("n"), lit(2)))],
    )]);
    let world = World::new(home_spec_with(stack, Script::default(), Script::default()));
    let it = world
        .run(vec![get(Expr::call("double", vec![lit(21)]))])
        .unwrap();
    assert_eq!(it.as_str(), "42");

    let it = world
        .run(vec![get(Expr::call("sum", vec![lit(1), lit(2), lit(3)]))])
        .unwrap();
    assert_eq!(it.as_str(), "6");

    let err = world
        .run(vec![get(Expr::call("nope", Vec::new()))])
        .unwrap_err();
    assert_eq!(err.code_str(), "E102");
    assert!(err.to_string().starts_with("No such function nope."));
}

#[test]
fn repeat_with_counts_in_both_directions() {
    let world = World::home();
    let body = vec![put_with(var("i"), Preposition::After, variable("seen"))];
    let it = world
        .run(vec![
            put(quoted(""), variable("seen")),
            Statement::new(Command::Repeat {
                kind: RepeatKind::With {
                    variable: Symbol::new("i"),
                    from: lit(1),
                    to: lit(4),
                    down: false,
                },
                body: body.clone(),
            }),
            Statement::new(Command::Repeat {
                kind: RepeatKind::With {
                    variable: Symbol::new("i"),
                    from: lit(3),
                    to: lit(1),
                    down: true,
                },
                body,
            }),
            get(var("seen")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "1234321");
}

#[test]
fn repeat_with_stops_at_the_integer_limits() {
    let world = World::home();
    let counted = |from: i64, to: i64, down: bool| {
        world
            .run(vec![
                put(quoted(""), variable("seen")),
                Statement::new(Command::Repeat {
                    kind: RepeatKind::With {
                        variable: Symbol::new("i"),
                        from: lit(from),
                        to: lit(to),
                        down,
                    },
                    body: vec![put_with(var("i"), Preposition::After, variable("seen"))],
                }),
                get(var("seen")),
            ])
            .unwrap()
    };
    assert_eq!(counted(i64::MAX, i64::MAX, false).as_str(), i64::MAX.to_string());
    assert_eq!(counted(i64::MIN, i64::MIN, true).as_str(), i64::MIN.to_string());
}

#[test]
fn logic_skips_the_right_operand_once_decided() {
    let world = World::home();
    let failing = || op(BinaryOp::Add, quoted("x"), lit(1));
    let it = world
        .run(vec![get(op(BinaryOp::And, lit("false"), failing()))])
        .unwrap();
    assert_eq!(it.as_str(), "false");
    let it = world
        .run(vec![get(op(BinaryOp::Or, lit("true"), failing()))])
        .unwrap();
    assert_eq!(it.as_str(), "true");
    let err = world
        .run(vec![get(op(BinaryOp::And, lit("true"), failing()))])
        .unwrap_err();
    assert_eq!(err.code_str(), "E102");
}

#[test]
fn exit_and_next_repeat_steer_the_loop() {
    let world = World::home();
    let it = world
        .run(vec![
            put(lit(0), variable("n")),
            put(quoted(""), variable("odd")),
            Statement::new(Command::Repeat {
                kind: RepeatKind::Forever,
                body: vec![
                    Statement::new(Command::Add {
                        value: lit(1),
                        target: variable("n"),
                    }),
                    Statement::new(Command::If {
                        condition: op(BinaryOp::Greater, var("n"), lit(7)),
                        then_branch: vec![Statement::new(Command::ExitRepeat)],
                        else_branch: Vec::new(),
                    }),
                    Statement::new(Command::If {
                        condition: op(
                            BinaryOp::Equal,
                            op(BinaryOp::Mod, var("n"), lit(2)),
                            lit(0),
                        ),
                        then_branch: vec![Statement::new(Command::NextRepeat)],
                        else_branch: Vec::new(),
                    }),
                    put_with(var("n"), Preposition::After, variable("odd")),
                ],
            }),
            get(var("odd")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "1357");
}

//=====================================================
// Section 3.0 - Containers
//=====================================================

#[test]
fn arithmetic_commands_write_back_to_fields_and_variables() {
    let world = World::home();
    let it = world
        .run(vec![
            put(lit(5), part_container(card_field("Title"))),
            Statement::new(Command::Add {
                value: lit(2),
                target: part_container(card_field("Title")),
            }),
            put(lit(3), variable("x")),
            Statement::new(Command::Multiply {
                target: variable("x"),
                value: Expr::Part(card_field("Title")),
            }),
            Statement::new(Command::Divide {
                target: variable("x"),
                value: lit(2),
            }),
            get(var("x")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "10.5");
}

#[test]
fn put_before_and_after_splice_around_contents() {
    let world = World::home();
    let it = world
        .run(vec![
            put_with(quoted("<"), Preposition::Before, part_container(card_field("Title"))),
            put_with(quoted(">"), Preposition::After, part_container(card_field("Title"))),
            get(Expr::Part(card_field("Title"))),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "<Welcome>");
}

#[test]
fn message_box_receives_puts() {
    let world = World::home();
    world
        .run(vec![put(quoted("hello"), Container::MessageBox)])
        .unwrap();
    assert_eq!(world.desktop.messages(), vec!["hello".to_string()]);
}

//=====================================================
// Section 4.0 - Navigation
//=====================================================

fn navigation_logger() -> Script {
    Script::new(vec![
        handler("closeCard", &[], log_after("close ")),
        handler("openCard", &[], log_after("open ")),
        handler("newCard", &[], log_after("new ")),
        handler("deleteCard", &[], log_after("delete ")),
    ])
}

#[test]
fn go_moves_the_stack_and_announces_the_cards() {
    let world = World::new(home_spec_with(
        navigation_logger(),
        Script::default(),
        Script::default(),
    ));
    let ids = world.card_ids();
    let it = world
        .run(vec![
            Statement::new(Command::VisualEffect {
                effect: quoted("dissolve"),
            }),
            go(card(3)),
            get(the_result()),
        ])
        .unwrap();
    assert!(it.is_empty());
    assert_eq!(world.stack.current_card_id(), ids[2]);
    assert_eq!(world.global("log").unwrap().as_str(), "close open ");
    let navigations = world.desktop.navigations();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].card, ids[2]);
    assert_eq!(navigations[0].visual_effect.as_deref(), Some("dissolve"));
}

#[test]
fn go_nowhere_reports_through_the_result() {
    let world = World::home();
    let it = world
        .run(vec![
            go(PartExpr::named(PartType::Card, quoted("Nowhere"))),
            get(the_result()),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "No such card.");

    let it = world
        .run(vec![
            go(PartExpr::Stack {
                name: Some(Box::new(quoted("Elsewhere"))),
            }),
            get(the_result()),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "No such stack.");
    assert!(world.desktop.navigations().is_empty());
}

#[test]
fn go_without_destination_returns_to_the_previous_card() {
    let world = World::home();
    let ids = world.card_ids();
    world.run(vec![go(card(4))]).unwrap();
    assert_eq!(world.stack.current_card_id(), ids[3]);
    world
        .run(vec![Statement::new(Command::Go { destination: None })])
        .unwrap();
    assert_eq!(world.stack.current_card_id(), ids[0]);
}

#[test]
fn lock_messages_silences_notifications() {
    let world = World::new(home_spec_with(
        navigation_logger(),
        Script::default(),
        Script::default(),
    ));
    world
        .run(vec![
            Statement::new(Command::Set {
                property: Symbol::new("lockMessages"),
                part: None,
                value: lit("true"),
            }),
            go(card(2)),
        ])
        .unwrap();
    assert_eq!(world.global("log"), None);
}

#[test]
fn new_and_deleted_cards_are_announced() {
    let world = World::new(home_spec_with(
        navigation_logger(),
        Script::default(),
        Script::default(),
    ));
    let it = world
        .run(vec![
            Statement::new(Command::NewCard),
            get(Expr::CountParts {
                ty: PartType::Card,
                layer: None,
                owner: None,
            }),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "5");
    let created = world.stack.current_card_id();
    assert_eq!(world.card_ids()[1], created);

    world
        .run(vec![Statement::new(Command::DeleteCard { card: None })])
        .unwrap();
    assert_eq!(world.card_ids().len(), 4);
    assert!(!world.card_ids().contains(&created));
    assert_eq!(world.global("log").unwrap().as_str(), "new delete ");
}

#[test]
fn beep_reaches_the_host() {
    let config = RuntimeConfig {
        beep_interval_ms: 1,
        ..RuntimeConfig::default()
    };
    let world = World::with_config(home_spec(), config);
    world
        .run(vec![Statement::new(Command::Beep {
            count: Some(lit(3)),
        })])
        .unwrap();
    assert_eq!(world.desktop.beeps(), 3);
}

#[test]
fn waiting_zero_or_less_returns_at_once() {
    let world = World::home();
    for amount in ["0", "-5"] {
        world
            .run(vec![Statement::new(Command::Wait {
                duration: lit(amount),
                unit: TimeUnit::Ticks,
            })])
            .unwrap();
    }
}

//=====================================================
// End of file
//=====================================================
