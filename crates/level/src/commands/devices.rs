//! Device command handlers.

use serde_json::Value;
use tabled::Tabled;

use level_core::search::MAX_SEARCH_RESULTS;
use level_core::{
    DeviceGetParams, DeviceListParams, DeviceMatch, Executor, Operation,
    search_devices_by_hostname,
};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{invocation, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Online")]
    online: String,
}

impl From<&Value> for DeviceRow {
    fn from(d: &Value) -> Self {
        Self {
            id: output::record_id(d),
            hostname: output::field(d, &["hostname", "nickname"]),
            group: output::field(d, &["group_name", "group_id"]),
            platform: output::field(d, &["platform", "operating_system"]),
            online: output::field(d, &["online"]),
        }
    }
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Device")]
    name: String,
}

impl From<&DeviceMatch> for MatchRow {
    fn from(m: &DeviceMatch) -> Self {
        Self {
            id: m.value.clone(),
            name: m.name.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    executor: &Executor,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List {
            list,
            group_id,
            ancestor_group_id,
            include,
        } => {
            let operation = Operation::ListDevices(DeviceListParams {
                list: list.into(),
                group_id,
                ancestor_group_id,
                include: include.into(),
            });
            let devices = executor.execute(&invocation(operation, global)).await?;
            let out = output::render_list(
                global.output,
                &devices,
                |d| DeviceRow::from(d),
                output::record_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get {
            device,
            include,
            query,
        } => {
            let operation = Operation::GetDevice(DeviceGetParams {
                id: device,
                include: include.into(),
                extra_query: query,
            });
            let records = executor.execute(&invocation(operation, global)).await?;
            util::print_records(&records, global)
        }

        DevicesCommand::Search { filter, token } => {
            let search =
                search_devices_by_hostname(executor.client(), &filter, token.as_deref()).await?;
            let out = output::render_list(
                global.output,
                &search.results,
                |m| MatchRow::from(m),
                |m| m.value.clone(),
            )?;
            output::print_output(&out, global.quiet);
            if let Some(next) = search.pagination_token.filter(|_| !global.quiet) {
                eprintln!(
                    "More than {MAX_SEARCH_RESULTS} matches. Continue with: level devices search {filter:?} --token {next}"
                );
            }
            Ok(())
        }
    }
}
