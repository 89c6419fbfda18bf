//=====================================================
// File: finder.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Part resolution over a stack snapshot
// Objective: Resolve part specifiers within stack, card and background scopes,
//            delegating between scopes for composite and layered lookups
//=====================================================

use std::sync::Arc;

use crate::ast::{Layer, PartType, Position};
use crate::chunk::ordinal_position;
use crate::document::{BackgroundModel, CardModel, PartId, PartKind, StackModel};
use crate::interpreter::errors::{HtError, HtResult};
use crate::parts::specifier::PartSpecifier;

/// Which component a resolution landed on, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartRef {
    Stack,
    Background(PartId),
    Card(PartId),
    Part {
        kind: PartKind,
        layer: Layer,
        id: PartId,
    },
}

/// A resolved part plus the card it was reached through. Background parts
/// are shared by every card of their background, so per-card reads need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub part: PartRef,
    pub card_context: Option<PartId>,
}

impl Found {
    fn card(id: PartId) -> Self {
        Self {
            part: PartRef::Card(id),
            card_context: Some(id),
        }
    }
}

/// Resolve a specifier against the components one scope directly contains.
pub trait PartFinder {
    fn find(&self, spec: &PartSpecifier) -> HtResult<Found>;
}

//==================================================
// Section 1.0 - Selection Helpers
//==================================================

/// Picks by id, name, ordinal number or ordinal word. An unquoted name that
/// matches nothing but reads as an integer is taken as an ordinal.
fn select<'m, T>(
    items: &'m [Arc<T>],
    spec: &PartSpecifier,
    id_of: impl Fn(&Arc<T>) -> PartId,
    name_of: impl Fn(&Arc<T>) -> String,
) -> Option<&'m Arc<T>> {
    let nth = |n: i64| {
        if n >= 1 {
            items.get((n - 1) as usize)
        } else {
            None
        }
    };
    match spec {
        PartSpecifier::Id { id, .. } => items.iter().find(|item| id_of(*item) == *id),
        PartSpecifier::Name { name, literal, .. } => items
            .iter()
            .find(|item| {
                let own = name_of(*item);
                !own.is_empty() && own.eq_ignore_ascii_case(name)
            })
            .or_else(|| {
                if *literal {
                    None
                } else {
                    name.trim().parse::<i64>().ok().and_then(nth)
                }
            }),
        PartSpecifier::Number { number, .. } => nth(*number),
        PartSpecifier::Ordinal { ordinal, .. } => nth(ordinal_position(*ordinal, items.len())),
        _ => None,
    }
}

fn part_kind(ty: PartType) -> Option<PartKind> {
    match ty {
        PartType::Button => Some(PartKind::Button),
        PartType::Field => Some(PartKind::Field),
        _ => None,
    }
}

fn missing(spec: &PartSpecifier) -> HtError {
    HtError::no_such_part(spec)
}

//==================================================
// Section 2.0 - Stack Scope
//==================================================

pub struct StackScope<'a> {
    model: &'a StackModel,
    current: PartId,
}

impl<'a> StackScope<'a> {
    pub fn new(model: &'a StackModel) -> Self {
        Self::with_current(model, model.current_card_id())
    }

    /// `current` is the card relative positions and unqualified parts are
    /// measured from.
    pub fn with_current(model: &'a StackModel, current: PartId) -> Self {
        Self { model, current }
    }

    fn current_index(&self) -> HtResult<usize> {
        self.model
            .card_index(self.current)
            .ok_or_else(|| HtError::no_such_part(format!("card id {}", self.current)))
    }

    fn current_card(&self) -> HtResult<Arc<CardModel>> {
        let index = self.current_index()?;
        Ok(Arc::clone(&self.model.cards()[index]))
    }

    /// The card a background is viewed through: the current card when it
    /// belongs to that background, else the background's first card.
    fn context_for(&self, background: PartId) -> Option<PartId> {
        match self.model.card(self.current) {
            Some(card) if card.background() == background => Some(card.id()),
            _ => self
                .model
                .cards_of_background(background)
                .first()
                .map(|card| card.id()),
        }
    }

    fn find_card(&self, spec: &PartSpecifier) -> HtResult<Found> {
        let cards = self.model.cards();
        let card = match spec {
            PartSpecifier::Position { position, .. } => {
                let index = self.current_index()?;
                let target = match position {
                    Position::This => Some(index),
                    Position::Next => Some(index + 1),
                    Position::Prev => index.checked_sub(1),
                };
                target.and_then(|index| cards.get(index))
            }
            _ => select(cards, spec, |card| card.id(), |card| card.name()),
        };
        card.map(|card| Found::card(card.id()))
            .ok_or_else(|| missing(spec))
    }

    fn find_background(&self, spec: &PartSpecifier) -> HtResult<Found> {
        if let PartSpecifier::Position { position, .. } = spec {
            return self.relative_background(spec, *position);
        }
        let ordered = self.model.backgrounds_in_order();
        let background = select(&ordered, spec, |bg| bg.id(), |bg| bg.name())
            .ok_or_else(|| missing(spec))?;
        Ok(Found {
            part: PartRef::Background(background.id()),
            card_context: self.context_for(background.id()),
        })
    }

    /// Next and previous backgrounds are runs of cards: the nearest card in
    /// that direction whose background differs from the current one.
    fn relative_background(&self, spec: &PartSpecifier, position: Position) -> HtResult<Found> {
        let cards = self.model.cards();
        let index = self.current_index()?;
        let here = cards[index].background();
        let card = match position {
            Position::This => Some(&cards[index]),
            Position::Next => cards[index..].iter().find(|card| card.background() != here),
            Position::Prev => cards[..=index]
                .iter()
                .rev()
                .find(|card| card.background() != here),
        };
        card.map(|card| Found {
            part: PartRef::Background(card.background()),
            card_context: Some(card.id()),
        })
        .ok_or_else(|| missing(spec))
    }

    fn scope_of(&self, owner: Found, inner: &PartSpecifier) -> HtResult<Box<dyn PartFinder + 'a>> {
        match owner.part {
            PartRef::Stack => Ok(Box::new(StackScope::with_current(self.model, self.current))),
            PartRef::Card(id) => {
                let card = self.model.card(id).ok_or_else(|| missing(inner))?;
                Ok(Box::new(CardScope::new(self.model, Arc::clone(card))))
            }
            PartRef::Background(id) => {
                let background = self.model.background(id).ok_or_else(|| missing(inner))?;
                let context = owner.card_context.or_else(|| self.context_for(id));
                Ok(Box::new(BackgroundScope::new(
                    self.model,
                    Arc::clone(background),
                    context,
                )))
            }
            PartRef::Part { .. } => Err(missing(inner)),
        }
    }
}

impl PartFinder for StackScope<'_> {
    fn find(&self, spec: &PartSpecifier) -> HtResult<Found> {
        match spec {
            PartSpecifier::Composite { part, owner } => {
                let owner = self.find(owner)?;
                self.scope_of(owner, part)?.find(part)
            }
            PartSpecifier::Resolved(handle) => Ok(handle.found()),
            _ => match spec.ty() {
                PartType::Stack => Ok(Found {
                    part: PartRef::Stack,
                    card_context: None,
                }),
                PartType::Card => self.find_card(spec),
                PartType::Background => self.find_background(spec),
                PartType::Button | PartType::Field => {
                    CardScope::new(self.model, self.current_card()?).find(spec)
                }
            },
        }
    }
}

//==================================================
// Section 3.0 - Card & Background Scopes
//==================================================

pub struct CardScope<'a> {
    model: &'a StackModel,
    card: Arc<CardModel>,
}

impl<'a> CardScope<'a> {
    pub fn new(model: &'a StackModel, card: Arc<CardModel>) -> Self {
        Self { model, card }
    }
}

impl PartFinder for CardScope<'_> {
    fn find(&self, spec: &PartSpecifier) -> HtResult<Found> {
        if matches!(
            spec,
            PartSpecifier::Composite { .. } | PartSpecifier::Resolved(_) | PartSpecifier::Stack { .. }
        ) {
            return StackScope::with_current(self.model, self.card.id()).find(spec);
        }
        let Some(kind) = part_kind(spec.ty()) else {
            return match spec {
                PartSpecifier::Position {
                    ty: PartType::Background,
                    position: Position::This,
                } => Ok(Found {
                    part: PartRef::Background(self.card.background()),
                    card_context: Some(self.card.id()),
                }),
                _ => Err(missing(spec)),
            };
        };
        match spec.layer() {
            Layer::Card => {
                let parts: Vec<_> = self
                    .card
                    .parts()
                    .iter()
                    .filter(|part| part.kind() == kind)
                    .cloned()
                    .collect();
                let part = select(&parts, spec, |part| part.id(), |part| part.name())
                    .ok_or_else(|| missing(spec))?;
                Ok(Found {
                    part: PartRef::Part {
                        kind,
                        layer: Layer::Card,
                        id: part.id(),
                    },
                    card_context: Some(self.card.id()),
                })
            }
            Layer::Background => {
                let background = self
                    .model
                    .background(self.card.background())
                    .ok_or_else(|| missing(spec))?;
                BackgroundScope::new(self.model, Arc::clone(background), Some(self.card.id()))
                    .find(spec)
            }
        }
    }
}

pub struct BackgroundScope<'a> {
    model: &'a StackModel,
    background: Arc<BackgroundModel>,
    card_context: Option<PartId>,
}

impl<'a> BackgroundScope<'a> {
    pub fn new(
        model: &'a StackModel,
        background: Arc<BackgroundModel>,
        card_context: Option<PartId>,
    ) -> Self {
        Self {
            model,
            background,
            card_context,
        }
    }
}

impl PartFinder for BackgroundScope<'_> {
    fn find(&self, spec: &PartSpecifier) -> HtResult<Found> {
        if matches!(
            spec,
            PartSpecifier::Composite { .. } | PartSpecifier::Resolved(_) | PartSpecifier::Stack { .. }
        ) {
            let current = self
                .card_context
                .unwrap_or_else(|| self.model.current_card_id());
            return StackScope::with_current(self.model, current).find(spec);
        }
        match spec.ty() {
            PartType::Card => {
                let cards = self.model.cards_of_background(self.background.id());
                select(&cards, spec, |card| card.id(), |card| card.name())
                    .map(|card| Found::card(card.id()))
                    .ok_or_else(|| missing(spec))
            }
            PartType::Button | PartType::Field if spec.explicit_layer() != Some(Layer::Card) => {
                let Some(kind) = part_kind(spec.ty()) else {
                    return Err(missing(spec));
                };
                let parts: Vec<_> = self
                    .background
                    .parts()
                    .iter()
                    .filter(|part| part.kind() == kind)
                    .cloned()
                    .collect();
                let part = select(&parts, spec, |part| part.id(), |part| part.name())
                    .ok_or_else(|| missing(spec))?;
                Ok(Found {
                    part: PartRef::Part {
                        kind,
                        layer: Layer::Background,
                        id: part.id(),
                    },
                    card_context: self.card_context,
                })
            }
            _ => Err(missing(spec)),
        }
    }
}


//==================================================
// End of file
//==================================================
