// ── Core error types ──
//
// Failures of a single executed item. The item index travels with the
// error explicitly; the executor passes it in, nothing is looked up.

use thiserror::Error;

/// A failed item, tagged with its position in the input batch.
#[derive(Debug, Error)]
#[error("item {item_index}: {source}")]
pub struct ItemError {
    pub item_index: usize,
    #[source]
    pub source: level_api::Error,
}

impl ItemError {
    pub fn new(item_index: usize, source: level_api::Error) -> Self {
        Self { item_index, source }
    }

    /// Short message without the item prefix, used for error records.
    pub fn message(&self) -> String {
        self.source.to_string()
    }
}
