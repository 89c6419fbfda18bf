//=====================================================
// File: desktop.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: In-memory user interface host
// Objective: Track open stacks, focus and navigation history, and record
//            every navigation, beep and message the runtime hands over
//=====================================================

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::document::StackDocument;
use crate::interpreter::errors::{HtError, HtResult};
use crate::runtime::host::{Destination, Host};
use crate::value::Value;

#[derive(Default)]
struct DesktopState {
    stacks: Vec<Arc<StackDocument>>,
    focused: Option<usize>,
    location: Option<Destination>,
    back: Vec<Destination>,
    navigations: Vec<Destination>,
    beeps: usize,
    messages: Vec<String>,
    selection: Option<String>,
}

/// A headless desktop: stands in for windows when running from the command
/// line or under test.
#[derive(Default)]
pub struct Desktop {
    state: RwLock<DesktopState>,
}

impl Desktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a stack (once) and gives it focus.
    pub fn open(&self, stack: Arc<StackDocument>) {
        let mut state = self.state.write();
        let index = match state.stacks.iter().position(|open| Arc::ptr_eq(open, &stack)) {
            Some(index) => index,
            None => {
                state.stacks.push(Arc::clone(&stack));
                state.stacks.len() - 1
            }
        };
        state.focused = Some(index);
        state.location = Some(Destination {
            card: stack.current_card_id(),
            stack,
            visual_effect: None,
        });
    }

    pub fn navigations(&self) -> Vec<Destination> {
        self.state.read().navigations.clone()
    }

    pub fn beeps(&self) -> usize {
        self.state.read().beeps
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.read().messages.clone()
    }

    pub fn set_selection(&self, selection: Option<&str>) {
        self.state.write().selection = selection.map(str::to_string);
    }

    fn focus(state: &mut DesktopState, stack: &Arc<StackDocument>) {
        match state.stacks.iter().position(|open| Arc::ptr_eq(open, stack)) {
            Some(index) => state.focused = Some(index),
            None => {
                state.stacks.push(Arc::clone(stack));
                state.focused = Some(state.stacks.len() - 1);
            }
        }
    }
}

impl Host for Desktop {
    fn focused_stack(&self) -> Option<Arc<StackDocument>> {
        let state = self.state.read();
        state.focused.and_then(|index| state.stacks.get(index).cloned())
    }

    fn find_stack(&self, name: &str) -> Option<Arc<StackDocument>> {
        self.state
            .read()
            .stacks
            .iter()
            .find(|stack| stack.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    fn navigate(&self, destination: &Destination) {
        info!(
            stack = %destination.stack.name(),
            card = destination.card,
            effect = destination.visual_effect.as_deref().unwrap_or("plain"),
            "navigate"
        );
        let mut state = self.state.write();
        if let Some(previous) = state.location.replace(destination.clone()) {
            state.back.push(previous);
        }
        Self::focus(&mut state, &destination.stack);
        state.navigations.push(destination.clone());
    }

    fn go_back(&self) -> Option<Destination> {
        let mut state = self.state.write();
        let previous = state.back.pop()?;
        Self::focus(&mut state, &previous.stack);
        state.location = Some(previous.clone());
        info!(stack = %previous.stack.name(), card = previous.card, "navigate back");
        Some(previous)
    }

    fn beep(&self) {
        self.state.write().beeps += 1;
    }

    fn show_message(&self, text: &str) {
        info!(message = text, "message box");
        self.state.write().messages.push(text.to_string());
    }

    fn selected_text(&self) -> HtResult<Value> {
        self.state
            .read()
            .selection
            .as_deref()
            .map(Value::text)
            .ok_or_else(|| HtError::semantic("No text is selected."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StackSpec;

    #[test]
    fn back_returns_previous_location() {
        let desktop = Desktop::new();
        let stack = StackDocument::from_spec(&StackSpec::default()).unwrap();
        let first = stack.current_card_id();
        desktop.open(Arc::clone(&stack));
        let second = stack.new_card().unwrap();
        desktop.navigate(&Destination {
            stack: Arc::clone(&stack),
            card: second,
            visual_effect: Some("dissolve".into()),
        });
        let back = desktop.go_back().unwrap();
        assert_eq!(back.card, first);
        assert!(desktop.go_back().is_none());
        assert_eq!(desktop.navigations().len(), 1);
    }

    #[test]
    fn stacks_are_found_by_name() {
        let desktop = Desktop::new();
        let spec = StackSpec {
            name: "Addresses".into(),
            ..StackSpec::default()
        };
        desktop.open(StackDocument::from_spec(&spec).unwrap());
        assert!(desktop.find_stack("addresses").is_some());
        assert!(desktop.find_stack("Home").is_none());
    }
}

//=====================================================
// End of file
//=====================================================
