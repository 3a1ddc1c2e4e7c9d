//! Batch execution of JSON-described operations.
//!
//! The input is one operation object or an array of them, e.g.
//! `{"operation": "get_device", "id": "d1", "include_cpus": true}`.

use serde_json::Value;
use tabled::Tabled;

use level_core::{Executor, FailurePolicy, Invocation, ItemOutput};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Item")]
    item: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&ItemOutput> for ItemRow {
    fn from(o: &ItemOutput) -> Self {
        Self {
            item: o.item_index,
            id: output::record_id(&o.json),
            error: output::field(&o.json, &["error"]),
        }
    }
}

/// Parse a batch document into invocations. The global
/// `--response-property` fills in items that do not name their own.
pub(crate) fn parse_batch(doc: Value, global: &GlobalOpts) -> Result<Vec<Invocation>, CliError> {
    let items = match doc {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        _ => {
            return Err(CliError::Validation {
                field: "run".into(),
                reason: "expected an operation object or an array of them".into(),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let mut invocation: Invocation =
                serde_json::from_value(item).map_err(|e| CliError::Validation {
                    field: format!("item {index}"),
                    reason: e.to_string(),
                })?;
            if invocation.response_property.is_none() {
                invocation.response_property.clone_from(&global.response_property);
            }
            Ok(invocation)
        })
        .collect()
}

pub async fn handle(executor: &Executor, args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let doc = util::read_json_file(&args.file, "run")?;
    let invocations = parse_batch(doc, global)?;
    let policy = if args.continue_on_fail {
        FailurePolicy::ContinueOnFail
    } else {
        FailurePolicy::Abort
    };

    tracing::debug!(items = invocations.len(), ?policy, "running batch");
    let outputs = executor.run_items(&invocations, policy).await?;

    let out = output::render_list(
        global.output,
        &outputs,
        |o| ItemRow::from(o),
        |o| output::record_id(&o.json),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
