//=====================================================
// File: handle.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Handles to resolved document components
// Objective: Read and write component properties and contents through a
//            resolved part, using the card it was reached through for
//            per-card background data, and walk the message-passing chain
//=====================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::ast::{Layer, PartType, Script};
use crate::document::{PartId, PartKind, PropertyTable, StackDocument};
use crate::interpreter::errors::{HtError, HtResult};
use crate::parts::finder::{Found, PartRef};
use crate::parts::specifier::{PartSpecifier, type_word};
use crate::value::Value;

/// Properties every component reports without storing them.
const COMPUTED: &[&str] = &[
    "id",
    "number",
    "short name",
    "abbreviated name",
    "abbrev name",
    "long name",
];

/// A resolved component. Holds ids rather than references, so a handle
/// outlives structural edits and simply fails to resolve afterwards.
#[derive(Clone)]
pub struct PartHandle {
    stack: Arc<StackDocument>,
    found: Found,
}

impl PartHandle {
    pub fn new(stack: Arc<StackDocument>, found: Found) -> Self {
        Self { stack, found }
    }

    pub fn stack_handle(stack: Arc<StackDocument>) -> Self {
        Self::new(
            stack,
            Found {
                part: PartRef::Stack,
                card_context: None,
            },
        )
    }

    pub fn card_handle(stack: Arc<StackDocument>, card: PartId) -> Self {
        Self::new(
            stack,
            Found {
                part: PartRef::Card(card),
                card_context: Some(card),
            },
        )
    }

    pub fn stack(&self) -> &Arc<StackDocument> {
        &self.stack
    }

    pub fn part(&self) -> PartRef {
        self.found.part
    }

    pub fn found(&self) -> Found {
        self.found
    }

    /// The card through which this part was reached, if any.
    pub fn card_context(&self) -> Option<PartId> {
        self.found.card_context
    }

    pub fn part_type(&self) -> PartType {
        match self.found.part {
            PartRef::Stack => PartType::Stack,
            PartRef::Background(_) => PartType::Background,
            PartRef::Card(_) => PartType::Card,
            PartRef::Part {
                kind: PartKind::Button,
                ..
            } => PartType::Button,
            PartRef::Part {
                kind: PartKind::Field,
                ..
            } => PartType::Field,
        }
    }

    pub fn id(&self) -> Option<PartId> {
        match self.found.part {
            PartRef::Stack => None,
            PartRef::Background(id) | PartRef::Card(id) | PartRef::Part { id, .. } => Some(id),
        }
    }

    /// Same component, regardless of the card it was reached through.
    pub fn same_part(&self, other: &PartHandle) -> bool {
        Arc::ptr_eq(&self.stack, &other.stack) && self.found.part == other.found.part
    }

    pub fn to_specifier(&self) -> PartSpecifier {
        PartSpecifier::Resolved(self.clone())
    }

    fn vanished(&self) -> HtError {
        HtError::no_such_part(self.id_form())
    }

    fn id_form(&self) -> String {
        match (self.found.part, self.id()) {
            (PartRef::Stack, _) | (_, None) => "this stack".to_string(),
            (_, Some(id)) => format!("{} id {id}", self.type_words()),
        }
    }

    fn type_words(&self) -> String {
        match self.found.part {
            PartRef::Part { layer, .. } => {
                let layer = match layer {
                    Layer::Card => "card",
                    Layer::Background => "bkgnd",
                };
                format!("{layer} {}", type_word(self.part_type()))
            }
            PartRef::Background(_) => "bkgnd".to_string(),
            _ => type_word(self.part_type()).to_string(),
        }
    }

    //==================================================
    // Section 1.0 - Component Access
    //==================================================

    /// Runs `f` against the component's property table. The structural lock
    /// is released before the property lock is taken.
    fn with_table<R>(&self, f: impl FnOnce(&RwLock<PropertyTable>) -> R) -> HtResult<R> {
        match self.found.part {
            PartRef::Stack => Ok(f(self.stack.properties())),
            PartRef::Card(id) => {
                let card = self.stack.read().card(id).cloned();
                card.map(|card| f(card.properties()))
                    .ok_or_else(|| self.vanished())
            }
            PartRef::Background(id) => {
                let background = self.stack.read().background(id).cloned();
                background
                    .map(|bg| f(bg.properties()))
                    .ok_or_else(|| self.vanished())
            }
            PartRef::Part { id, .. } => {
                let part = self.stack.read().find_part(id);
                part.map(|part| f(part.properties()))
                    .ok_or_else(|| self.vanished())
            }
        }
    }

    pub fn script(&self) -> HtResult<Arc<Script>> {
        let model = self.stack.read();
        let script = match self.found.part {
            PartRef::Stack => Some(self.stack.script()),
            PartRef::Card(id) => model.card(id).map(|card| card.script()),
            PartRef::Background(id) => model.background(id).map(|bg| bg.script()),
            PartRef::Part { id, .. } => model.find_part(id).map(|part| part.script()),
        };
        script.ok_or_else(|| self.vanished())
    }

    fn raw_name(&self) -> HtResult<String> {
        self.with_table(|table| {
            table
                .read()
                .get("name")
                .map(Value::into_string)
                .unwrap_or_default()
        })
    }

    /// The `name` property: the stored name, or the id form when unnamed.
    pub fn name(&self) -> HtResult<String> {
        let raw = self.raw_name()?;
        Ok(if raw.is_empty() { self.id_form() } else { raw })
    }

    /// Script-style reference such as `card button "OK"` or `card id 104`.
    pub fn describe(&self) -> String {
        match self.raw_name() {
            Ok(name) if !name.is_empty() => format!("{} \"{name}\"", self.type_words()),
            _ => self.id_form(),
        }
    }

    fn long_name(&self) -> String {
        match self.found.part {
            PartRef::Stack => self.describe(),
            _ => format!("{} of stack \"{}\"", self.describe(), self.stack.name()),
        }
    }

    /// 1-based position among siblings of the same type, in display order.
    pub fn number(&self) -> HtResult<i64> {
        let model = self.stack.read();
        let index = match self.found.part {
            PartRef::Stack => None,
            PartRef::Card(id) => model.card_index(id),
            PartRef::Background(id) => model
                .backgrounds_in_order()
                .iter()
                .position(|bg| bg.id() == id),
            PartRef::Part { kind, layer, id } => {
                let owner = model.find_part(id).map(|part| part.owner());
                let siblings = match (layer, owner) {
                    (Layer::Card, Some(owner)) => model.card(owner).map(|card| card.parts().to_vec()),
                    (Layer::Background, Some(owner)) => {
                        model.background(owner).map(|bg| bg.parts().to_vec())
                    }
                    (_, None) => None,
                };
                siblings.and_then(|parts| {
                    parts
                        .iter()
                        .filter(|part| part.kind() == kind)
                        .position(|part| part.id() == id)
                })
            }
        };
        index
            .map(|index| index as i64 + 1)
            .ok_or_else(|| self.vanished())
    }

    //==================================================
    // Section 2.0 - Properties & Contents
    //==================================================

    fn is_contents_property(&self, key: &str) -> bool {
        match self.found.part {
            PartRef::Part {
                kind: PartKind::Field,
                ..
            } => key == "text",
            PartRef::Part {
                kind: PartKind::Button,
                ..
            } => key == "contents",
            _ => false,
        }
    }

    pub fn get_property(&self, name: &str) -> HtResult<Value> {
        let key = name.to_lowercase();
        let is_stack = self.found.part == PartRef::Stack;
        match key.as_str() {
            "id" if !is_stack => Ok(Value::from(self.id().unwrap_or_default() as i64)),
            "number" if !is_stack => self.number().map(Value::integer),
            "name" | "short name" => self.name().map(Value::text),
            "abbreviated name" | "abbrev name" => Ok(Value::text(self.describe())),
            "long name" => Ok(Value::text(self.long_name())),
            _ if self.is_contents_property(&key) => self.contents(),
            _ => self.with_table(|table| table.read().get(name))?,
        }
    }

    pub fn set_property(&self, name: &str, value: Value) -> HtResult<()> {
        let key = name.to_lowercase();
        if COMPUTED.contains(&key.as_str()) {
            return Err(HtError::semantic(format!("Can't set property {name}.")));
        }
        if self.is_contents_property(&key) {
            return self.set_contents(value);
        }
        self.with_table(|table| table.write().set(name, value))?
    }

    /// A button's contents or a field's text, per card for background fields.
    pub fn contents(&self) -> HtResult<Value> {
        match self.found.part {
            PartRef::Part { id, .. } => {
                let part = self.stack.read().find_part(id).ok_or_else(|| self.vanished())?;
                part.text(self.card_context())
            }
            _ => Err(HtError::semantic(format!(
                "Can't get the contents of {}.",
                self.describe()
            ))),
        }
    }

    pub fn set_contents(&self, value: Value) -> HtResult<()> {
        match self.found.part {
            PartRef::Part { id, .. } => {
                let part = self.stack.read().find_part(id).ok_or_else(|| self.vanished())?;
                part.set_text(self.card_context(), value)
            }
            _ => Err(HtError::semantic(format!(
                "Can't put into {}.",
                self.describe()
            ))),
        }
    }

    pub fn holds_text(&self) -> bool {
        matches!(self.found.part, PartRef::Part { .. })
    }

    //==================================================
    // Section 3.0 - Message Passing
    //==================================================

    /// The next component in the message-passing order: part, card,
    /// background, stack.
    pub fn parent(&self) -> Option<PartHandle> {
        let model = self.stack.read();
        let next = match self.found.part {
            PartRef::Part {
                layer: Layer::Card,
                id,
                ..
            } => {
                let owner = model.find_part(id)?.owner();
                Found {
                    part: PartRef::Card(owner),
                    card_context: Some(owner),
                }
            }
            PartRef::Part {
                layer: Layer::Background,
                ..
            } => {
                let card = self.card_context().unwrap_or_else(|| model.current_card_id());
                Found {
                    part: PartRef::Card(card),
                    card_context: Some(card),
                }
            }
            PartRef::Card(id) => Found {
                part: PartRef::Background(model.card(id)?.background()),
                card_context: Some(id),
            },
            PartRef::Background(_) => Found {
                part: PartRef::Stack,
                card_context: None,
            },
            PartRef::Stack => return None,
        };
        drop(model);
        Some(PartHandle::new(Arc::clone(&self.stack), next))
    }
}

impl PartialEq for PartHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_part(other) && self.found.card_context == other.found.card_context
    }
}

impl fmt::Debug for PartHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartHandle({}", self.id_form())?;
        if let Some(card) = self.found.card_context {
            write!(f, " via card id {card}")?;
        }
        f.write_str(")")
    }
}


//==================================================
// End of file
//==================================================
