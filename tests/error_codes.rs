#[path = "support/util.rs"]
mod util;

use hypertalk::ast::{BinaryOp, Chunk, ChunkIndex, ChunkType, Expr, PartExpr, PartType, Span};
use hypertalk::symbol::Symbol;
use hypertalk::{HtError, ScriptError};
use util::*;

#[test]
fn syntax_error_uses_e101() {
    let err: ScriptError = HtError::Syntax("unexpected end of handler".into()).into();
    assert_eq!(err.code_str(), "E101");
}

#[test]
fn arithmetic_on_text_uses_e102() {
    let world = World::home();
    let err = world
        .run(vec![put(
            op(BinaryOp::Multiply, quoted("seven"), lit(2)),
            variable("x"),
        )])
        .unwrap_err();
    assert_eq!(err.code_str(), "E102");
}

#[test]
fn missing_card_uses_e103() {
    let world = World::home();
    let err = world
        .run(vec![get(Expr::Part(field("Notes").of(card(9))))])
        .unwrap_err();
    assert_eq!(err.code_str(), "E103");
    assert!(err.to_string().starts_with("No such card 9."));
}

#[test]
fn unknown_property_uses_e104() {
    let world = World::home();
    let err = world
        .run(vec![get(Expr::Property {
            property: Symbol::new("flavour"),
            part: Some(card(1)),
        })])
        .unwrap_err();
    assert_eq!(err.code_str(), "E104");
}

#[test]
fn chunk_of_a_card_uses_e105() {
    let world = World::home();
    let err = world
        .run(vec![put(
            quoted("x"),
            part_chunk(card(1), Chunk::single(ChunkType::Char, 1)),
        )])
        .unwrap_err();
    assert_eq!(err.code_str(), "E105");
}

#[test]
fn non_numeric_chunk_index_uses_e105() {
    let world = World::home();
    let chunk = Chunk {
        start: ChunkIndex::at(quoted("two")),
        ..Chunk::single(ChunkType::Word, 1)
    };
    let err = world
        .run(vec![get(Expr::Chunk {
            chunk,
            of: Box::new(quoted("one two")),
        })])
        .unwrap_err();
    assert_eq!(err.code_str(), "E105");
}

#[test]
fn internal_errors_use_e199_and_keep_their_position() {
    let err = ScriptError::new(HtError::internal("unexpected node"))
        .at(Span::new(3, 1))
        .at(Span::new(9, 9))
        .in_handler("openCard");
    assert_eq!(err.code_str(), "E199");
    assert!(err.error.is_internal());
    assert_eq!(err.span, Some(Span::new(3, 1)));
    assert_eq!(
        err.to_string(),
        "Internal error: unexpected node (in openCard) at line 3, column 1"
    );
}

#[test]
fn counting_buttons_of_a_stack_is_semantic() {
    let world = World::home();
    let err = world
        .run(vec![get(Expr::CountParts {
            ty: PartType::Button,
            layer: None,
            owner: Some(Box::new(PartExpr::Stack { name: None })),
        })])
        .unwrap_err();
    assert_eq!(err.code_str(), "E102");
}
