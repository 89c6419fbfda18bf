//=====================================================
// File: chunks.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Value arithmetic and chunk expressions through the evaluator
// Objective: Check division round-trips, chunk write-back identity, item
//            padding, delimiter changes and random chunk pinning
//=====================================================

#[path = "support/util.rs"]
mod util;

use hypertalk::ast::{BinaryOp, Chunk, ChunkIndex, ChunkType, Command, Expr, Ordinal, Statement};
use hypertalk::symbol::Symbol;
use hypertalk::Value;
use util::*;

fn chunk_of(chunk: Chunk, of: Expr) -> Expr {
    Expr::Chunk {
        chunk,
        of: Box::new(of),
    }
}

#[test]
fn division_text_reparses_to_the_same_quotient() {
    for a in [-9_i64, -4, 0, 1, 7, 10, 22, 1_000_003] {
        for b in [1_i64, 2, 3, 4, 7] {
            let quotient = Value::integer(a).divide(&Value::integer(b)).unwrap();
            let reparsed = Value::text(quotient.as_str()).real_value().unwrap();
            let direct = a as f64 / b as f64;
            assert!(
                (reparsed - direct).abs() <= f64::EPSILON * direct.abs().max(1.0),
                "{a} / {b} printed as {quotient}"
            );
        }
    }
}

#[test]
fn dividing_by_text_that_reads_as_zero_fails_cleanly() {
    let world = World::home();
    let err = world
        .run(vec![put(
            op(BinaryOp::Divide, lit(10), quoted(" 0 ")),
            variable("x"),
        )])
        .unwrap_err();
    assert_eq!(err.code_str(), "E102");
    assert!(err.to_string().contains("Can't divide by zero."));
}

#[test]
fn reading_a_chunk_and_writing_it_back_changes_nothing() {
    let world = World::home();
    let original = "alpha beta, gamma\ndelta,  epsilon zeta\n\nlast line";
    for kind in [ChunkType::Char, ChunkType::Word, ChunkType::Item, ChunkType::Line] {
        for index in 1..=4 {
            let statements = vec![
                put(quoted(original), part_container(card_field("Title"))),
                put(
                    chunk_of(Chunk::single(kind, index), Expr::Part(card_field("Title"))),
                    variable("piece"),
                ),
                put(var("piece"), part_chunk(card_field("Title"), Chunk::single(kind, index))),
                get(Expr::Part(card_field("Title"))),
            ];
            let it = world.run(statements).unwrap();
            assert_eq!(it.as_str(), original, "{kind:?} {index}");
        }
    }
}

#[test]
fn writing_item_five_of_two_items_pads_with_empties() {
    let world = World::home();
    let it = world
        .run(vec![
            put(quoted("red,green"), variable("colors")),
            put(
                quoted("blue"),
                variable_chunk("colors", Chunk::single(ChunkType::Item, 5)),
            ),
            get(var("colors")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "red,green,,,blue");
    let items = it.items(",");
    assert_eq!(items.len(), 5);
    assert!(items[2].is_empty() && items[3].is_empty());
}

#[test]
fn item_delimiter_property_changes_item_boundaries() {
    let world = World::home();
    let it = world
        .run(vec![
            Statement::new(Command::Set {
                property: Symbol::new("itemDelimiter"),
                part: None,
                value: quoted(";"),
            }),
            get(chunk_of(
                Chunk::single(ChunkType::Item, 2),
                quoted("a,b;c,d"),
            )),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "c,d");
}

#[test]
fn nested_chunk_writes_inside_the_enclosing_line() {
    let world = World::home();
    let chunk = Chunk::single(ChunkType::Word, 2).of(Chunk::single(ChunkType::Line, 2));
    let it = world
        .run(vec![
            put(quoted("one two\nthree four"), variable("text")),
            put(quoted("FIVE"), variable_chunk("text", chunk)),
            get(var("text")),
        ])
        .unwrap();
    assert_eq!(it.as_str(), "one two\nthree FIVE");
}

#[test]
fn any_chunk_write_lands_on_a_single_item() {
    let world = World::home();
    let chunk = Chunk {
        kind: ChunkType::Item,
        start: ChunkIndex::Ordinal(Ordinal::Any),
        end: None,
        within: None,
    };
    for _ in 0..20 {
        let it = world
            .run(vec![
                put(quoted("a,b,c"), variable("list")),
                put(quoted("X"), variable_chunk("list", chunk.clone())),
                get(var("list")),
            ])
            .unwrap();
        let items = it.items(",");
        assert_eq!(items.len(), 3, "{it}");
        assert_eq!(items.iter().filter(|item| item.as_str() == "X").count(), 1);
    }
}

#[test]
fn counting_chunks_of_an_expression() {
    let world = World::home();
    let it = world
        .run(vec![get(Expr::CountChunks {
            kind: ChunkType::Word,
            of: Box::new(quoted("  the quick   brown fox ")),
        })])
        .unwrap();
    assert_eq!(it.as_str(), "4");
}

//=====================================================
// End of file
//=====================================================
