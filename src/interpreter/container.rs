//=====================================================
// File: container.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Readable and writable containers
// Objective: Resolve a container once into an address, then read it or
//            splice into it with before/after/into, chunk by chunk
//=====================================================

use crate::ast::{Container, Ordinal, Preposition};
use crate::chunk::{Index, ResolvedChunk, get_chunk, put_chunk};
use crate::interpreter::errors::{HtError, HtResult, ScriptResult};
use crate::parts::PartHandle;
use crate::runtime::ExecutionContext;
use crate::symbol::Symbol;
use crate::value::Value;

enum Slot {
    Variable(Symbol),
    Part(PartHandle),
    Property {
        name: Symbol,
        part: Option<PartHandle>,
    },
    MessageBox,
}

/// A container whose part and chunk expressions have been evaluated.
pub struct Address {
    slot: Slot,
    chunk: Option<ResolvedChunk>,
}

impl Container {
    pub fn address(&self, ctx: &mut ExecutionContext) -> ScriptResult<Address> {
        let (slot, chunk) = match self {
            Container::Variable { name, chunk } => (Slot::Variable(name.clone()), chunk.as_ref()),
            Container::Part { part, chunk } => (Slot::Part(part.resolve(ctx)?), chunk.as_ref()),
            Container::Property {
                property,
                part,
                chunk,
            } => {
                let part = match part {
                    Some(part) => Some(part.resolve(ctx)?),
                    None => None,
                };
                let slot = Slot::Property {
                    name: property.clone(),
                    part,
                };
                (slot, chunk.as_ref())
            }
            Container::MessageBox => (Slot::MessageBox, None),
        };
        let chunk = match chunk {
            Some(chunk) => Some(chunk.evaluate(ctx)?),
            None => None,
        };
        let mut address = Address { slot, chunk };
        address.pin_random_indices(ctx)?;
        Ok(address)
    }

    pub fn read(&self, ctx: &mut ExecutionContext) -> ScriptResult<Value> {
        Ok(self.address(ctx)?.read(ctx)?)
    }
}

fn mentions_any(chunk: &ResolvedChunk) -> bool {
    let any = Index::Ordinal(Ordinal::Any);
    chunk.start == any
        || chunk.end == Some(any)
        || chunk.within.as_deref().is_some_and(mentions_any)
}

impl Address {
    fn pin_random_indices(&mut self, ctx: &ExecutionContext) -> HtResult<()> {
        let Some(chunk) = &self.chunk else {
            return Ok(());
        };
        if mentions_any(chunk) {
            let current = self.current(ctx)?;
            self.chunk = Some(chunk.pin(current.as_str(), &ctx.item_delimiter()));
        }
        Ok(())
    }

    fn check_chunkable(&self) -> HtResult<()> {
        match (&self.slot, &self.chunk) {
            (Slot::Part(part), Some(_)) if !part.holds_text() => Err(HtError::ChunkRange(format!(
                "Can't take a chunk of {}.",
                part.describe()
            ))),
            _ => Ok(()),
        }
    }

    /// The stored value before a write. A variable that is not in scope
    /// starts out empty.
    fn current(&self, ctx: &ExecutionContext) -> HtResult<Value> {
        match &self.slot {
            Slot::Variable(name) => Ok(ctx.lookup_variable(name).unwrap_or_default()),
            Slot::Part(part) => part.contents(),
            Slot::Property { name, part: Some(part) } => part.get_property(name.as_str()),
            Slot::Property { name, part: None } => {
                let runtime = ctx.runtime();
                runtime.properties().get(name.as_str(), runtime.host())
            }
            Slot::MessageBox => Ok(Value::empty()),
        }
    }

    pub fn read(&self, ctx: &ExecutionContext) -> HtResult<Value> {
        self.check_chunkable()?;
        let whole = match &self.slot {
            Slot::Variable(name) => ctx.get_variable(name),
            _ => self.current(ctx)?,
        };
        match &self.chunk {
            Some(chunk) => Ok(Value::text(get_chunk(
                whole.as_str(),
                chunk,
                &ctx.item_delimiter(),
            ))),
            None => Ok(whole),
        }
    }

    pub fn write(&self, ctx: &mut ExecutionContext, preposition: Preposition, value: Value) -> HtResult<()> {
        if let Slot::MessageBox = self.slot {
            ctx.runtime().host().show_message(value.as_str());
            return Ok(());
        }
        self.check_chunkable()?;
        let updated = match (&self.chunk, preposition) {
            (Some(chunk), _) => {
                let current = self.current(ctx)?;
                Value::text(put_chunk(
                    current.as_str(),
                    chunk,
                    preposition,
                    value.as_str(),
                    &ctx.item_delimiter(),
                )?)
            }
            (None, Preposition::Into) => value,
            (None, Preposition::Before) => value.concat(&self.current(ctx)?),
            (None, Preposition::After) => self.current(ctx)?.concat(&value),
        };
        self.store(ctx, updated)
    }

    fn store(&self, ctx: &mut ExecutionContext, value: Value) -> HtResult<()> {
        match &self.slot {
            Slot::Variable(name) => ctx.set_variable(name, value),
            Slot::Part(part) => part.set_contents(value),
            Slot::Property { name, part: Some(part) } => part.set_property(name.as_str(), value),
            Slot::Property { name, part: None } => ctx.runtime().properties().set(name.as_str(), value),
            Slot::MessageBox => {
                ctx.runtime().host().show_message(value.as_str());
                Ok(())
            }
        }
    }
}

//=====================================================
// End of file
//=====================================================
