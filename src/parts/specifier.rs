//=====================================================
// File: specifier.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Evaluated part addresses
// Objective: Describe which document component a script means, by id, name,
//            ordinal, relative position or ownership, and print each address
//            the way a script would write it
//=====================================================

use std::fmt;

use crate::ast::{Layer, Ordinal, PartType, Position};
use crate::document::PartId;
use crate::parts::handle::PartHandle;

/// A part address whose expressions have been evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum PartSpecifier {
    Id {
        layer: Option<Layer>,
        ty: PartType,
        id: PartId,
    },
    /// `literal` is set when the name came from a quoted string; such a name
    /// never falls back to an ordinal.
    Name {
        layer: Option<Layer>,
        ty: PartType,
        name: String,
        literal: bool,
    },
    Number {
        layer: Option<Layer>,
        ty: PartType,
        number: i64,
    },
    Ordinal {
        layer: Option<Layer>,
        ty: PartType,
        ordinal: Ordinal,
    },
    Position {
        ty: PartType,
        position: Position,
    },
    /// `None` is the current stack.
    Stack {
        name: Option<String>,
    },
    Composite {
        part: Box<PartSpecifier>,
        owner: Box<PartSpecifier>,
    },
    /// A part that is already known, such as `me` or `the target`.
    Resolved(PartHandle),
}

impl PartSpecifier {
    pub fn ty(&self) -> PartType {
        match self {
            PartSpecifier::Id { ty, .. }
            | PartSpecifier::Name { ty, .. }
            | PartSpecifier::Number { ty, .. }
            | PartSpecifier::Ordinal { ty, .. }
            | PartSpecifier::Position { ty, .. } => *ty,
            PartSpecifier::Stack { .. } => PartType::Stack,
            PartSpecifier::Composite { part, .. } => part.ty(),
            PartSpecifier::Resolved(handle) => handle.part_type(),
        }
    }

    /// The layer a button or field address refers to. Unqualified buttons
    /// are card buttons; unqualified fields are background fields.
    pub fn layer(&self) -> Layer {
        self.explicit_layer().unwrap_or(match self.ty() {
            PartType::Field | PartType::Background => Layer::Background,
            _ => Layer::Card,
        })
    }

    pub fn explicit_layer(&self) -> Option<Layer> {
        match self {
            PartSpecifier::Id { layer, .. }
            | PartSpecifier::Name { layer, .. }
            | PartSpecifier::Number { layer, .. }
            | PartSpecifier::Ordinal { layer, .. } => *layer,
            _ => None,
        }
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, PartSpecifier::Stack { .. })
    }

    pub fn of(self, owner: PartSpecifier) -> Self {
        PartSpecifier::Composite {
            part: Box::new(self),
            owner: Box::new(owner),
        }
    }
}

pub(crate) fn type_word(ty: PartType) -> &'static str {
    match ty {
        PartType::Button => "button",
        PartType::Field => "field",
        PartType::Card => "card",
        PartType::Background => "background",
        PartType::Stack => "stack",
    }
}

fn prefix(layer: &Option<Layer>) -> &'static str {
    match layer {
        Some(Layer::Card) => "card ",
        Some(Layer::Background) => "bkgnd ",
        None => "",
    }
}

impl fmt::Display for PartSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartSpecifier::Id { layer, ty, id } => {
                write!(f, "{}{} id {id}", prefix(layer), type_word(*ty))
            }
            PartSpecifier::Name { layer, ty, name, .. } => {
                write!(f, "{}{} \"{name}\"", prefix(layer), type_word(*ty))
            }
            PartSpecifier::Number { layer, ty, number } => {
                write!(f, "{}{} {number}", prefix(layer), type_word(*ty))
            }
            PartSpecifier::Ordinal { layer, ty, ordinal } => {
                let word = match ordinal {
                    Ordinal::Last => "last",
                    Ordinal::Middle => "middle",
                    Ordinal::Any => "any",
                };
                write!(f, "{word} {}{}", prefix(layer), type_word(*ty))
            }
            PartSpecifier::Position { ty, position } => {
                let word = match position {
                    Position::Next => "next",
                    Position::Prev => "prev",
                    Position::This => "this",
                };
                write!(f, "{word} {}", type_word(*ty))
            }
            PartSpecifier::Stack { name: Some(name) } => write!(f, "stack \"{name}\""),
            PartSpecifier::Stack { name: None } => f.write_str("this stack"),
            PartSpecifier::Composite { part, owner } => write!(f, "{part} of {owner}"),
            PartSpecifier::Resolved(handle) => f.write_str(&handle.describe()),
        }
    }
}


//=====================================================
// End of file
//=====================================================
