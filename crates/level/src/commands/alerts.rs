//! Alert command handlers.

use serde_json::Value;
use tabled::Tabled;

use level_core::{AlertListParams, Executor, GetParams, Operation};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{invocation, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Started")]
    started: String,
}

impl From<&Value> for AlertRow {
    fn from(a: &Value) -> Self {
        Self {
            id: output::record_id(a),
            name: output::field(a, &["name", "title", "description"]),
            severity: output::field(a, &["severity"]),
            status: output::field(a, &["status"]),
            device: output::field(a, &["device_hostname", "device_id"]),
            started: output::field(a, &["started_at", "created_at"]),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    executor: &Executor,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlertsCommand::List {
            list,
            device,
            status,
        } => {
            let operation = Operation::ListAlerts(AlertListParams {
                list: list.into(),
                device_id: device,
                status: status.into(),
            });
            let alerts = executor.execute(&invocation(operation, global)).await?;
            let out = output::render_list(
                global.output,
                &alerts,
                |a| AlertRow::from(a),
                output::record_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Get { id } => {
            let operation = Operation::GetAlert(GetParams { id });
            let records = executor.execute(&invocation(operation, global)).await?;
            util::print_records(&records, global)
        }
    }
}
