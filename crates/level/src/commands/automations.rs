//! Automation command handlers.

use serde_json::Value;

use level_core::{AutomationPayload, AutomationTriggerParams, Executor, Operation};

use crate::cli::{AutomationsArgs, AutomationsCommand, GlobalOpts};
use crate::error::CliError;

use super::{invocation, util};

pub async fn handle(
    executor: &Executor,
    args: AutomationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AutomationsCommand::Trigger {
            token,
            json,
            json_file,
            device,
            param,
        } => {
            let payload = match (json, json_file) {
                (Some(raw), _) => AutomationPayload::Json {
                    json_payload: Value::String(raw),
                },
                (None, Some(path)) => AutomationPayload::Json {
                    json_payload: Value::String(util::read_input(&path)?),
                },
                (None, None) => AutomationPayload::Fields {
                    device_ids: device,
                    custom_parameters: param,
                },
            };

            let operation = Operation::TriggerAutomation(AutomationTriggerParams { token, payload });
            let records = executor.execute(&invocation(operation, global)).await?;
            if !global.quiet {
                eprintln!("Automation triggered");
            }
            util::print_records(&records, global)
        }
    }
}
