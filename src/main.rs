//=====================================================
// File: main.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Command-line driver for the HyperTalk runtime
// Objective: Load a stack document, send it a message or run message-box
//            statements on a headless desktop, and validate configuration
//=====================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use hypertalk::ast::{PartType, Statement};
use hypertalk::{
    Desktop, Dispatcher, PartSpecifier, Runtime, RuntimeConfig, ScriptError, StackDocument,
    StackSpec, Value, logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "hypertalk",
    about = "Runs HyperTalk scripts against stack documents.",
    version
)]
struct Args {
    /// Runtime configuration file; defaults to the per-user file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Send a message to a card of a stack document (JSON).
    Run {
        #[arg(long)]
        stack: PathBuf,
        #[arg(long)]
        message: String,
        /// Id of the card that receives the message; the current card when
        /// omitted.
        #[arg(long)]
        target: Option<u64>,
        /// Message argument; repeat for several.
        #[arg(long = "arg")]
        args: Vec<String>,
    },
    /// Run message-box statements (a JSON statement list) against a stack.
    Eval {
        #[arg(long)]
        stack: PathBuf,
        scriptlet: PathBuf,
    },
    /// Validate a configuration file and print the effective settings.
    CheckConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Mode::CheckConfig { path } = &args.mode {
        let config = RuntimeConfig::load(path)?;
        println!("{} is valid", path.display());
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::load_default()?.0,
    };
    logging::init(&config.log_filter);

    match args.mode {
        Mode::Run {
            stack,
            message,
            target,
            args,
        } => {
            let (desktop, dispatcher, stack) = open(config, &stack)?;
            let target = target.map(|id| PartSpecifier::Id {
                layer: None,
                ty: PartType::Card,
                id,
            });
            let args = args.into_iter().map(Value::text).collect();
            let outcome = dispatcher.send(stack, target, message, args).await;
            report(&desktop, outcome)?;
            for (name, value) in dispatcher.runtime().globals().snapshot() {
                println!("global {name} = {value}");
            }
            for destination in desktop.navigations() {
                println!(
                    "navigated to card id {} of stack \"{}\"{}",
                    destination.card,
                    destination.stack.name(),
                    destination
                        .visual_effect
                        .map(|effect| format!(" with {effect}"))
                        .unwrap_or_default()
                );
            }
            Ok(())
        }
        Mode::Eval { stack, scriptlet } => {
            let (desktop, dispatcher, stack) = open(config, &stack)?;
            let source = fs::read_to_string(&scriptlet)
                .with_context(|| format!("failed to read {}", scriptlet.display()))?;
            let statements: Vec<Statement> = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse {}", scriptlet.display()))?;
            // Message-box statements follow focus rather than a fixed stack.
            drop(stack);
            let outcome = dispatcher.eval(None, statements).await;
            report(&desktop, outcome)
        }
        Mode::CheckConfig { .. } => Ok(()),
    }
}

fn open(config: RuntimeConfig, path: &Path) -> Result<(Arc<Desktop>, Dispatcher, Arc<StackDocument>)> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let spec: StackSpec = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse stack {}", path.display()))?;
    let stack = StackDocument::from_spec(&spec)
        .with_context(|| format!("invalid stack {}", path.display()))?;
    let desktop = Arc::new(Desktop::new());
    desktop.open(Arc::clone(&stack));
    let runtime = Runtime::new(config, Arc::clone(&desktop) as Arc<dyn hypertalk::Host>);
    Ok((desktop, Dispatcher::new(runtime), stack))
}

/// Prints what the message box showed, then the outcome value.
fn report(desktop: &Desktop, outcome: Result<Value, ScriptError>) -> Result<()> {
    for message in desktop.messages() {
        println!("{message}");
    }
    match outcome {
        Ok(value) => {
            if !value.is_empty() {
                println!("{value}");
            }
            Ok(())
        }
        Err(err) => Err(anyhow!("{} {err}", err.code_str())),
    }
}

//=====================================================
// End of file
//=====================================================
