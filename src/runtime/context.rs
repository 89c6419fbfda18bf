//=====================================================
// File: context.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Per-dispatch execution state
// Objective: Thread the call stack, variable scoping, document binding and
//            the implicit result/target state through one script execution
//=====================================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::document::{PartId, StackDocument};
use crate::interpreter::errors::{HtError, HtResult};
use crate::parts::{PartFinder, PartHandle, PartSpecifier, StackScope};
use crate::runtime::Runtime;
use crate::symbol::Symbol;
use crate::value::Value;

//==================================================
// Section 1.0 - Frames
//==================================================

/// One handler, function or scriptlet invocation.
#[derive(Debug, Clone)]
pub struct Frame {
    message: String,
    me: Option<PartHandle>,
    args: Vec<Value>,
    locals: HashMap<Symbol, Value>,
    globals_in_scope: HashSet<Symbol>,
    created_at: u64,
    visual_effect: Option<String>,
}

impl Frame {
    fn new(message: &str, me: Option<PartHandle>, args: Vec<Value>, created_at: u64) -> Self {
        Self {
            message: message.to_string(),
            me,
            args,
            locals: HashMap::new(),
            globals_in_scope: HashSet::new(),
            created_at,
            visual_effect: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn me(&self) -> Option<&PartHandle> {
        self.me.as_ref()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn declares_global(&self, name: &Symbol) -> bool {
        self.globals_in_scope.contains(name)
    }
}

//==================================================
// Section 2.0 - Execution Context
//==================================================

/// Owned by exactly one task; never shared between dispatches.
pub struct ExecutionContext {
    runtime: Arc<Runtime>,
    stack: Option<Arc<StackDocument>>,
    frames: Vec<Frame>,
    result: Value,
    target: Option<PartHandle>,
    current_card: Option<PartId>,
}

impl ExecutionContext {
    /// An unbound context follows whichever stack has focus.
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            runtime,
            stack: None,
            frames: Vec::new(),
            result: Value::empty(),
            target: None,
            current_card: None,
        }
    }

    pub fn bound_to(runtime: Arc<Runtime>, stack: Arc<StackDocument>) -> Self {
        let mut context = Self::new(runtime);
        context.bind(stack);
        context
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    //==================================================
    // Section 2.1 - Call Stack
    //==================================================

    pub fn push_frame(&mut self, message: &str, me: Option<PartHandle>, args: Vec<Value>) -> HtResult<()> {
        let limit = self.runtime.config().max_call_depth;
        if self.frames.len() >= limit {
            debug!(message, depth = self.frames.len(), "call depth limit reached");
            return Err(HtError::semantic("Too much recursion."));
        }
        let created_at = self.runtime.abort_signal().stamp();
        trace!(message, depth = self.frames.len() + 1, "push frame");
        self.frames.push(Frame::new(message, me, args, created_at));
        Ok(())
    }

    /// Frame for a message-box style scriptlet with no handler or `me`.
    pub fn push_anonymous_frame(&mut self) -> HtResult<()> {
        self.push_frame("", None, Vec::new())
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            trace!(message = frame.message.as_str(), depth = self.frames.len(), "pop frame");
        }
        frame
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self) -> HtResult<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| HtError::internal("no active frame"))
    }

    fn frame_mut(&mut self) -> HtResult<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| HtError::internal("no active frame"))
    }

    pub fn me(&self) -> Option<PartHandle> {
        self.frames.last().and_then(|frame| frame.me.clone())
    }

    pub fn args(&self) -> &[Value] {
        self.frames
            .last()
            .map(|frame| frame.args.as_slice())
            .unwrap_or(&[])
    }

    //==================================================
    // Section 2.2 - Variables
    //==================================================

    /// Globals declared in this frame, then locals, then the name itself.
    pub fn get_variable(&self, name: &Symbol) -> Value {
        self.lookup_variable(name)
            .unwrap_or_else(|| Value::text(name.as_str()))
    }

    /// Like `get_variable`, but `None` where a read would fall back to the
    /// bare-word literal.
    pub fn lookup_variable(&self, name: &Symbol) -> Option<Value> {
        let frame = self.frames.last()?;
        if frame.globals_in_scope.contains(name) {
            return Some(self.runtime.globals().get(name).unwrap_or_default());
        }
        frame.locals.get(name).cloned()
    }

    pub fn set_variable(&mut self, name: &Symbol, value: Value) -> HtResult<()> {
        let runtime = Arc::clone(&self.runtime);
        let frame = self.frame_mut()?;
        if frame.globals_in_scope.contains(name) {
            runtime.globals().set(name, value);
        } else {
            frame.locals.insert(name.clone(), value);
        }
        Ok(())
    }

    /// Makes `name` global for the current frame only.
    pub fn define_global(&mut self, name: &Symbol) -> HtResult<()> {
        self.runtime.globals().seed(name);
        self.frame_mut()?.globals_in_scope.insert(name.clone());
        Ok(())
    }

    //==================================================
    // Section 2.3 - Document Binding
    //==================================================

    pub fn bind(&mut self, stack: Arc<StackDocument>) {
        debug!(stack = %stack.name(), "context bound");
        self.stack = Some(stack);
    }

    /// Releases the binding so the context tracks the focused stack again.
    pub fn unbind(&mut self) {
        self.stack = None;
    }

    pub fn is_bound(&self) -> bool {
        self.stack.is_some()
    }

    /// The bound stack, or the focused one for an unbound context.
    pub fn current_stack(&self) -> HtResult<Arc<StackDocument>> {
        match &self.stack {
            Some(stack) => Ok(Arc::clone(stack)),
            None => self
                .runtime
                .host()
                .focused_stack()
                .ok_or_else(|| HtError::semantic("No stack is open.")),
        }
    }

    fn current_card_id(&self, stack: &StackDocument) -> PartId {
        self.current_card
            .filter(|id| stack.read().card(*id).is_some())
            .unwrap_or_else(|| stack.current_card_id())
    }

    /// The override card if one is set, otherwise the displayed card.
    pub fn current_card(&self) -> HtResult<PartHandle> {
        let stack = self.current_stack()?;
        let card = self.current_card_id(&stack);
        Ok(PartHandle::card_handle(stack, card))
    }

    /// Temporarily treats `card` as current, e.g. while visiting each card.
    pub fn set_current_card(&mut self, card: Option<PartId>) {
        self.current_card = card;
    }

    //==================================================
    // Section 2.4 - Result, Target & Abort
    //==================================================

    pub fn result(&self) -> Value {
        self.result.clone()
    }

    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    pub fn target(&self) -> Option<PartHandle> {
        self.target.clone()
    }

    pub fn set_target(&mut self, target: Option<PartHandle>) {
        self.target = target;
    }

    /// True when an abort was requested after the current frame began.
    pub fn did_abort(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| self.runtime.abort_signal().aborts(frame.created_at))
    }

    pub fn check_abort(&self) -> HtResult<()> {
        if self.did_abort() {
            debug!("frame observed abort request");
            return Err(HtError::semantic("Script aborted."));
        }
        Ok(())
    }

    pub fn set_visual_effect(&mut self, effect: Option<String>) -> HtResult<()> {
        self.frame_mut()?.visual_effect = effect;
        Ok(())
    }

    pub fn take_visual_effect(&mut self) -> Option<String> {
        self.frames
            .last_mut()
            .and_then(|frame| frame.visual_effect.take())
    }

    pub fn item_delimiter(&self) -> String {
        self.runtime.properties().item_delimiter()
    }

    //==================================================
    // Section 2.5 - Part Resolution
    //==================================================

    /// Resolves `spec` in the stack it names (following composite owners),
    /// measuring relative positions from that stack's current card.
    pub fn resolve(&self, spec: &PartSpecifier) -> HtResult<PartHandle> {
        let stack = self.stack_for(spec)?;
        let current = self.current_card_id(&stack);
        let found = {
            let model = stack.read();
            StackScope::with_current(&model, current).find(spec)?
        };
        Ok(PartHandle::new(stack, found))
    }

    pub(crate) fn stack_for(&self, spec: &PartSpecifier) -> HtResult<Arc<StackDocument>> {
        match spec {
            PartSpecifier::Stack { name: Some(name) } => self.find_stack(name, spec),
            PartSpecifier::Composite { owner, .. } => self.stack_for(owner),
            PartSpecifier::Resolved(handle) => Ok(Arc::clone(handle.stack())),
            _ => self.current_stack(),
        }
    }

    fn find_stack(&self, name: &str, spec: &PartSpecifier) -> HtResult<Arc<StackDocument>> {
        if let Ok(current) = self.current_stack() {
            if current.name().eq_ignore_ascii_case(name) {
                return Ok(current);
            }
        }
        self.runtime
            .host()
            .find_stack(name)
            .ok_or_else(|| HtError::no_such_part(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::desktop::Desktop;
    use crate::document::StackSpec;

    fn context_with_depth(max_call_depth: usize) -> ExecutionContext {
        let config = RuntimeConfig {
            max_call_depth,
            ..RuntimeConfig::default()
        };
        let desktop = Arc::new(Desktop::new());
        let stack = StackDocument::from_spec(&StackSpec::default()).unwrap();
        desktop.open(Arc::clone(&stack));
        ExecutionContext::new(Runtime::new(config, desktop))
    }

    #[test]
    fn undeclared_names_read_as_themselves() {
        let mut context = context_with_depth(8);
        context.push_anonymous_frame().unwrap();
        assert_eq!(context.get_variable(&Symbol::new("Hello")).as_str(), "Hello");
        context.set_variable(&Symbol::new("hello"), Value::from(1)).unwrap();
        assert_eq!(context.get_variable(&Symbol::new("HELLO")), Value::from(1));
    }

    #[test]
    fn depth_limit_leaves_stack_at_maximum() {
        let mut context = context_with_depth(3);
        for _ in 0..3 {
            context.push_anonymous_frame().unwrap();
        }
        let err = context.push_anonymous_frame().unwrap_err();
        assert_eq!(err, HtError::semantic("Too much recursion."));
        assert_eq!(context.depth(), 3);
    }

    #[test]
    fn abort_only_hits_frames_started_before_request() {
        let mut context = context_with_depth(8);
        context.push_anonymous_frame().unwrap();
        context.runtime().request_abort();
        assert!(context.check_abort().is_err());
        context.push_anonymous_frame().unwrap();
        assert!(!context.did_abort());
        context.pop_frame();
        assert!(context.did_abort());
    }

    #[test]
    fn unbound_context_follows_focus() {
        let context = context_with_depth(8);
        assert!(!context.is_bound());
        let card = context.current_card().unwrap();
        assert_eq!(card.part_type(), crate::ast::PartType::Card);
    }

    #[test]
    fn writes_without_frame_are_internal_errors() {
        let mut context = context_with_depth(8);
        let err = context.set_variable(&Symbol::new("x"), Value::empty()).unwrap_err();
        assert!(err.is_internal());
    }
}

//==================================================
// End of file
//==================================================
