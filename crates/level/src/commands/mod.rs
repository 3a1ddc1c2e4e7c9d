//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod alerts;
pub mod automations;
pub mod config_cmd;
pub mod devices;
pub mod groups;
pub mod run;
pub mod util;
pub mod webhook;

use level_core::{Executor, Invocation, Operation};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    executor: &Executor,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Alerts(args) => alerts::handle(executor, args, global).await,
        Command::Devices(args) => devices::handle(executor, args, global).await,
        Command::Groups(args) => groups::handle(executor, args, global).await,
        Command::Automations(args) => automations::handle(executor, args, global).await,
        Command::Run(args) => run::handle(executor, args, global).await,
        // Handled before a client is built
        Command::Webhook(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Wrap an operation with the global `--response-property`.
pub(crate) fn invocation(operation: Operation, global: &GlobalOpts) -> Invocation {
    let invocation = Invocation::new(operation);
    match global.response_property.as_deref() {
        Some(property) => invocation.with_response_property(property),
        None => invocation,
    }
}
