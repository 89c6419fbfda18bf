//=====================================================
// File: lib.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: HyperTalk language runtime
// Objective: Expose the value model, chunk engine, part addressing, stack
//            documents, evaluator and dispatcher as one library
//=====================================================

pub mod ast;
pub mod chunk;
pub mod config;
pub mod desktop;
pub mod dispatch;
pub mod document;
pub mod interpreter;
pub mod logging;
pub mod parts;
pub mod runtime;
pub mod symbol;
pub mod value;

pub use config::RuntimeConfig;
pub use desktop::Desktop;
pub use dispatch::Dispatcher;
pub use document::{StackDocument, StackSpec};
pub use interpreter::{Flow, HtError, HtResult, ScriptError, ScriptResult};
pub use parts::{PartHandle, PartSpecifier};
pub use runtime::{ExecutionContext, Host, Runtime};
pub use symbol::Symbol;
pub use value::Value;

//=====================================================
// End of file
//=====================================================
