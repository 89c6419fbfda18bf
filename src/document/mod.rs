//=====================================================
// File: document.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: In-memory stack document graph
// Objective: Model stacks, backgrounds, cards, buttons and fields with their
//            scripts and property tables, serialise structural edits behind a
//            per-document lock, and build documents from serde snapshots
//=====================================================

pub mod properties;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::ast::{Layer, Script};
use crate::interpreter::errors::{HtError, HtResult};
use crate::value::Value;

pub use properties::PropertyTable;

pub type PartId = u64;

const FIRST_ID: PartId = 100;

//==================================================
// Section 1.0 - Components
//==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Button,
    Field,
}

/// A button or field. Background fields keep one text per card unless their
/// `sharedText` is set.
#[derive(Debug)]
pub struct PartModel {
    id: PartId,
    kind: PartKind,
    layer: Layer,
    owner: PartId,
    script: Arc<Script>,
    properties: RwLock<PropertyTable>,
    card_text: RwLock<HashMap<PartId, Value>>,
}

impl PartModel {
    fn new(id: PartId, kind: PartKind, layer: Layer, owner: PartId, spec: &PartSpec) -> Self {
        let mut table = PropertyTable::new();
        table.define("name", spec.name.as_str());
        table.define("visible", true);
        match kind {
            PartKind::Button => {
                table.define("contents", spec.text.as_str());
                table.define("hilite", false);
                table.define("enabled", true);
                table.define("style", "roundRect");
            }
            PartKind::Field => {
                table.define("text", spec.text.as_str());
                table.define("lockText", false);
                table.define("sharedText", spec.shared_text);
                table.define("dontWrap", false);
                table.define("style", "rectangle");
            }
        }
        for (name, value) in &spec.properties {
            table.define(name, value.as_str());
        }
        Self {
            id,
            kind,
            layer,
            owner,
            script: Arc::new(spec.script.clone()),
            properties: RwLock::new(table),
            card_text: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// The card or background the part sits on.
    pub fn owner(&self) -> PartId {
        self.owner
    }

    pub fn script(&self) -> Arc<Script> {
        Arc::clone(&self.script)
    }

    pub fn properties(&self) -> &RwLock<PropertyTable> {
        &self.properties
    }

    pub fn name(&self) -> String {
        self.properties
            .read()
            .get("name")
            .map(Value::into_string)
            .unwrap_or_default()
    }

    fn contents_property(&self) -> &'static str {
        match self.kind {
            PartKind::Button => "contents",
            PartKind::Field => "text",
        }
    }

    fn per_card(&self) -> bool {
        self.kind == PartKind::Field
            && self.layer == Layer::Background
            && !self
                .properties
                .read()
                .get("sharedText")
                .and_then(|shared| shared.boolean_value())
                .unwrap_or(false)
    }

    /// The part's text as seen from `card`.
    pub fn text(&self, card: Option<PartId>) -> HtResult<Value> {
        match card {
            Some(card) if self.per_card() => Ok(self
                .card_text
                .read()
                .get(&card)
                .cloned()
                .unwrap_or_default()),
            _ => self.properties.read().get(self.contents_property()),
        }
    }

    pub fn set_text(&self, card: Option<PartId>, value: Value) -> HtResult<()> {
        match card {
            Some(card) if self.per_card() => {
                self.card_text.write().insert(card, value);
                Ok(())
            }
            _ => self.properties.write().set(self.contents_property(), value),
        }
    }
}

#[derive(Debug)]
pub struct CardModel {
    id: PartId,
    background: PartId,
    script: Arc<Script>,
    properties: RwLock<PropertyTable>,
    parts: Vec<Arc<PartModel>>,
}

impl CardModel {
    fn new(id: PartId, background: PartId, name: &str, script: Script) -> Self {
        let mut table = PropertyTable::new();
        table.define("name", name);
        table.define("marked", false);
        table.define("dontSearch", false);
        Self {
            id,
            background,
            script: Arc::new(script),
            properties: RwLock::new(table),
            parts: Vec::new(),
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn background(&self) -> PartId {
        self.background
    }

    pub fn script(&self) -> Arc<Script> {
        Arc::clone(&self.script)
    }

    pub fn properties(&self) -> &RwLock<PropertyTable> {
        &self.properties
    }

    /// Buttons and fields in front-to-back order.
    pub fn parts(&self) -> &[Arc<PartModel>] {
        &self.parts
    }

    pub fn name(&self) -> String {
        self.properties
            .read()
            .get("name")
            .map(Value::into_string)
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct BackgroundModel {
    id: PartId,
    script: Arc<Script>,
    properties: RwLock<PropertyTable>,
    parts: Vec<Arc<PartModel>>,
}

impl BackgroundModel {
    fn new(id: PartId, name: &str, script: Script) -> Self {
        let mut table = PropertyTable::new();
        table.define("name", name);
        table.define("dontSearch", false);
        Self {
            id,
            script: Arc::new(script),
            properties: RwLock::new(table),
            parts: Vec::new(),
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn script(&self) -> Arc<Script> {
        Arc::clone(&self.script)
    }

    pub fn properties(&self) -> &RwLock<PropertyTable> {
        &self.properties
    }

    pub fn parts(&self) -> &[Arc<PartModel>] {
        &self.parts
    }

    pub fn name(&self) -> String {
        self.properties
            .read()
            .get("name")
            .map(Value::into_string)
            .unwrap_or_default()
    }
}

//==================================================
// Section 2.0 - Stack Structure
//==================================================

/// The structural part of a stack: which cards exist, in which order, and
/// which one is displayed.
#[derive(Debug)]
pub struct StackModel {
    next_id: PartId,
    cards: Vec<Arc<CardModel>>,
    backgrounds: Vec<Arc<BackgroundModel>>,
    current_card: PartId,
}

impl StackModel {
    fn allocate_id(&mut self) -> PartId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn cards(&self) -> &[Arc<CardModel>] {
        &self.cards
    }

    pub fn card(&self, id: PartId) -> Option<&Arc<CardModel>> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn card_index(&self, id: PartId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    pub fn background(&self, id: PartId) -> Option<&Arc<BackgroundModel>> {
        self.backgrounds.iter().find(|bg| bg.id == id)
    }

    /// Backgrounds ordered by the first card that uses each one.
    pub fn backgrounds_in_order(&self) -> Vec<Arc<BackgroundModel>> {
        let mut ordered: Vec<Arc<BackgroundModel>> = Vec::new();
        for card in &self.cards {
            if ordered.iter().all(|bg| bg.id != card.background) {
                if let Some(bg) = self.background(card.background) {
                    ordered.push(Arc::clone(bg));
                }
            }
        }
        ordered
    }

    pub fn cards_of_background(&self, background: PartId) -> Vec<Arc<CardModel>> {
        self.cards
            .iter()
            .filter(|card| card.background == background)
            .cloned()
            .collect()
    }

    pub fn current_card_id(&self) -> PartId {
        self.current_card
    }

    pub fn current_card(&self) -> HtResult<Arc<CardModel>> {
        self.card(self.current_card)
            .cloned()
            .ok_or_else(|| HtError::internal("current card is not part of its stack"))
    }

    pub fn set_current_card(&mut self, id: PartId) -> HtResult<()> {
        if self.card(id).is_none() {
            return Err(HtError::no_such_part(format!("card id {id}")));
        }
        self.current_card = id;
        Ok(())
    }

    /// Looks a button or field up by id on any card or background.
    pub fn find_part(&self, id: PartId) -> Option<Arc<PartModel>> {
        self.cards
            .iter()
            .flat_map(|card| card.parts.iter())
            .chain(self.backgrounds.iter().flat_map(|bg| bg.parts.iter()))
            .find(|part| part.id == id)
            .cloned()
    }

    fn insert_after_current(&mut self, card: CardModel) -> PartId {
        let id = card.id;
        let index = self
            .card_index(self.current_card)
            .map(|index| index + 1)
            .unwrap_or(self.cards.len());
        self.cards.insert(index, Arc::new(card));
        self.current_card = id;
        id
    }
}

/// An open stack. Structure is guarded by one lock; each component's
/// properties are guarded separately so unrelated reads do not contend.
pub struct StackDocument {
    script: Arc<Script>,
    properties: RwLock<PropertyTable>,
    model: RwLock<StackModel>,
}

impl StackDocument {
    pub fn from_spec(spec: &StackSpec) -> HtResult<Arc<Self>> {
        let mut model = StackModel {
            next_id: FIRST_ID,
            cards: Vec::new(),
            backgrounds: Vec::new(),
            current_card: 0,
        };

        let default_background = [BackgroundSpec::default()];
        let background_specs: &[BackgroundSpec] = if spec.backgrounds.is_empty() {
            &default_background
        } else {
            &spec.backgrounds
        };
        let mut background_ids = Vec::with_capacity(background_specs.len());
        for bg_spec in background_specs {
            let id = model.allocate_id();
            let mut background = BackgroundModel::new(id, &bg_spec.name, bg_spec.script.clone());
            for part in &bg_spec.buttons {
                let part_id = model.allocate_id();
                background.parts.push(Arc::new(PartModel::new(
                    part_id,
                    PartKind::Button,
                    Layer::Background,
                    id,
                    part,
                )));
            }
            for part in &bg_spec.fields {
                let part_id = model.allocate_id();
                background.parts.push(Arc::new(PartModel::new(
                    part_id,
                    PartKind::Field,
                    Layer::Background,
                    id,
                    part,
                )));
            }
            background_ids.push(id);
            model.backgrounds.push(Arc::new(background));
        }

        let default_card = [CardSpec::default()];
        let card_specs: &[CardSpec] = if spec.cards.is_empty() {
            &default_card
        } else {
            &spec.cards
        };
        for card_spec in card_specs {
            let background = *background_ids.get(card_spec.background).ok_or_else(|| {
                HtError::semantic(format!(
                    "Card \"{}\" refers to missing background {}.",
                    card_spec.name, card_spec.background
                ))
            })?;
            let id = model.allocate_id();
            let mut card = CardModel::new(id, background, &card_spec.name, card_spec.script.clone());
            for part in &card_spec.buttons {
                let part_id = model.allocate_id();
                card.parts.push(Arc::new(PartModel::new(
                    part_id,
                    PartKind::Button,
                    Layer::Card,
                    id,
                    part,
                )));
            }
            for part in &card_spec.fields {
                let part_id = model.allocate_id();
                card.parts.push(Arc::new(PartModel::new(
                    part_id,
                    PartKind::Field,
                    Layer::Card,
                    id,
                    part,
                )));
            }
            if let Some(bg) = model.background(background) {
                for (field_name, text) in &card_spec.background_text {
                    let field = bg.parts.iter().find(|part| {
                        part.kind == PartKind::Field && part.name().eq_ignore_ascii_case(field_name)
                    });
                    match field {
                        Some(field) => field.set_text(Some(id), Value::text(text.as_str()))?,
                        None => {
                            return Err(HtError::no_such_part(format!(
                                "background field \"{field_name}\""
                            )));
                        }
                    }
                }
            }
            model.cards.push(Arc::new(card));
        }
        model.current_card = model.cards.first().map(|card| card.id).unwrap_or_default();

        let mut properties = PropertyTable::new();
        properties.define("name", spec.name.as_str());
        properties.define("cantModify", false);
        properties.define("userLevel", 5);
        Ok(Arc::new(Self {
            script: Arc::new(spec.script.clone()),
            properties: RwLock::new(properties),
            model: RwLock::new(model),
        }))
    }

    pub fn name(&self) -> String {
        self.properties
            .read()
            .get("name")
            .map(Value::into_string)
            .unwrap_or_default()
    }

    pub fn script(&self) -> Arc<Script> {
        Arc::clone(&self.script)
    }

    pub fn properties(&self) -> &RwLock<PropertyTable> {
        &self.properties
    }

    pub fn read(&self) -> RwLockReadGuard<'_, StackModel> {
        self.model.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, StackModel> {
        self.model.write()
    }

    pub fn current_card_id(&self) -> PartId {
        self.model.read().current_card
    }

    //==================================================
    // Section 3.0 - Structural Edits
    //==================================================

    /// Adds a card after the current one, sharing its background.
    pub fn new_card(&self) -> HtResult<PartId> {
        let mut model = self.model.write();
        let background = model.current_card()?.background;
        let id = model.allocate_id();
        Ok(model.insert_after_current(CardModel::new(id, background, "", Script::default())))
    }

    /// Adds a background with one card, placed after the current card.
    pub fn new_background(&self) -> HtResult<PartId> {
        let mut model = self.model.write();
        let background = model.allocate_id();
        model
            .backgrounds
            .push(Arc::new(BackgroundModel::new(background, "", Script::default())));
        let id = model.allocate_id();
        Ok(model.insert_after_current(CardModel::new(id, background, "", Script::default())))
    }

    /// Removes a card; a background left without cards goes with it.
    pub fn delete_card(&self, id: PartId) -> HtResult<()> {
        let mut model = self.model.write();
        let index = model
            .card_index(id)
            .ok_or_else(|| HtError::no_such_part(format!("card id {id}")))?;
        if model.cards.len() == 1 {
            return Err(HtError::semantic("Can't delete the last card of a stack."));
        }
        let removed = model.cards.remove(index);
        if model.cards.iter().all(|card| card.background != removed.background) {
            model.backgrounds.retain(|bg| bg.id != removed.background);
        }
        if model.current_card == id {
            let next = index.min(model.cards.len() - 1);
            model.current_card = model.cards[next].id;
        }
        Ok(())
    }
}

impl fmt::Debug for StackDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackDocument")
            .field("name", &self.name())
            .field("cards", &self.model.read().cards.len())
            .finish()
    }
}

//==================================================
// Section 4.0 - Snapshots
//==================================================

/// Serde description of a stack, used to open one in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSpec {
    pub name: String,
    pub script: Script,
    pub backgrounds: Vec<BackgroundSpec>,
    pub cards: Vec<CardSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSpec {
    pub name: String,
    pub script: Script,
    pub buttons: Vec<PartSpec>,
    pub fields: Vec<PartSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSpec {
    pub name: String,
    /// Index into the stack's `backgrounds`.
    pub background: usize,
    pub script: Script,
    pub buttons: Vec<PartSpec>,
    pub fields: Vec<PartSpec>,
    /// This card's text for background fields, by field name.
    pub background_text: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSpec {
    pub name: String,
    pub script: Script,
    pub text: String,
    pub shared_text: bool,
    pub properties: BTreeMap<String, String>,
}

impl PartSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}


//==================================================
// End of file
//==================================================
