//=====================================================
// File: dispatch.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Concurrent script dispatch
// Objective: Run each incoming message or scriptlet in its own execution
//            context on a bounded pool of blocking workers, and log failures
//            on the way out
//=====================================================

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, warn};

use crate::ast::Statement;
use crate::document::StackDocument;
use crate::interpreter::errors::{HtError, ScriptError, ScriptResult};
use crate::interpreter::messages;
use crate::parts::PartSpecifier;
use crate::runtime::{ExecutionContext, Runtime};
use crate::value::Value;

/// Hands work to blocking tasks. Each task owns its execution context; only
/// the runtime, the documents and the host are shared.
pub struct Dispatcher {
    runtime: Arc<Runtime>,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        let workers = runtime.config().worker_threads.max(1);
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(workers)),
        }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Sends `message` to `target` (the current card when absent) in
    /// `stack`, returning `the result` once delivery finishes.
    pub async fn send(
        &self,
        stack: Arc<StackDocument>,
        target: Option<PartSpecifier>,
        message: impl Into<String>,
        args: Vec<Value>,
    ) -> ScriptResult<Value> {
        let message = message.into();
        let label = message.clone();
        self.run(label, move |runtime| {
            let mut ctx = ExecutionContext::bound_to(runtime, stack);
            let receiver = match &target {
                Some(spec) => ctx.resolve(spec)?,
                None => ctx.current_card()?,
            };
            messages::dispatch(&mut ctx, receiver, &message, args)?;
            Ok(ctx.result())
        })
        .await
    }

    /// Runs message-box statements against `stack`, or against whichever
    /// stack has focus. Returns the final value of `it`.
    pub async fn eval(
        &self,
        stack: Option<Arc<StackDocument>>,
        statements: Vec<Statement>,
    ) -> ScriptResult<Value> {
        self.run("scriptlet".to_string(), move |runtime| {
            let mut ctx = match stack {
                Some(stack) => ExecutionContext::bound_to(runtime, stack),
                None => ExecutionContext::new(runtime),
            };
            messages::run_scriptlet(&mut ctx, &statements)
        })
        .await
    }

    async fn run<T, F>(&self, label: String, job: F) -> ScriptResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Runtime>) -> ScriptResult<T> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ScriptError::new(HtError::internal("dispatcher is shut down")))?;
        let runtime = Arc::clone(&self.runtime);
        debug!(job = label.as_str(), "dispatching");
        let outcome = task::spawn_blocking(move || {
            let _permit = permit;
            job(runtime)
        })
        .await
        .map_err(|err| ScriptError::new(HtError::internal(format!("script task failed: {err}"))))?;
        if let Err(err) = &outcome {
            warn!(job = label.as_str(), code = err.code_str(), error = %err, "script failed");
        }
        outcome
    }
}

//=====================================================
// End of file
//=====================================================
