//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Print single-record results. Lookups yield one record; anything else
/// is shown as a list of detail blocks.
pub fn print_records(records: &[Value], global: &GlobalOpts) -> Result<(), CliError> {
    let out = match records {
        [one] => output::render_single(global.output, one, output::detail, output::record_id)?,
        many => output::render_single(
            global.output,
            &many,
            |items| {
                items
                    .iter()
                    .map(output::detail)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            },
            |items| {
                items
                    .iter()
                    .map(output::record_id)
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Read and parse a JSON file for `--json-file` style flags.
pub fn read_json_file(path: &Path, field: &str) -> Result<Value, CliError> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })
}
