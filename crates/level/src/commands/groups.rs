//! Group command handlers.

use serde_json::Value;
use tabled::Tabled;

use level_core::{Executor, GetParams, GroupListParams, Operation};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

use super::{invocation, util};

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Parent")]
    parent: String,
}

impl From<&Value> for GroupRow {
    fn from(g: &Value) -> Self {
        Self {
            id: output::record_id(g),
            name: output::field(g, &["name"]),
            parent: output::field(g, &["parent_id"]),
        }
    }
}

pub async fn handle(
    executor: &Executor,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List { list, parent_id } => {
            let operation = Operation::ListGroups(GroupListParams {
                list: list.into(),
                parent_id,
            });
            let groups = executor.execute(&invocation(operation, global)).await?;
            let out = output::render_list(
                global.output,
                &groups,
                |g| GroupRow::from(g),
                output::record_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Get { id } => {
            let operation = Operation::GetGroup(GetParams { id });
            let records = executor.execute(&invocation(operation, global)).await?;
            util::print_records(&records, global)
        }
    }
}
