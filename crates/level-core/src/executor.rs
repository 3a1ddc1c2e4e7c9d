// ── Per-item executor ──
//
// Runs invocations one at a time against a `LevelClient`. Pages inside an
// item are fetched strictly in order; items never run concurrently.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use level_api::{Collection, DEFAULT_PAGE_SIZE, Error, LevelClient, Query};

use crate::error::ItemError;
use crate::params::ListParams;
use crate::resource::{Invocation, Operation};

/// What to do when an item fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing item.
    #[default]
    Abort,
    /// Record `{"error": ...}` for the failing item and keep going.
    ContinueOnFail,
}

/// One output record, paired with the input item it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutput {
    pub item_index: usize,
    pub json: Value,
}

/// Executes Level operations.
#[derive(Debug, Clone)]
pub struct Executor {
    client: LevelClient,
}

impl Executor {
    pub fn new(client: LevelClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LevelClient {
        &self.client
    }

    /// Run a single invocation and return its records.
    pub async fn execute(&self, invocation: &Invocation) -> Result<Vec<Value>, Error> {
        let explicit = invocation.explicit_property();
        debug!(
            resource = %invocation.operation.resource(),
            action = %invocation.operation.action(),
            "executing operation"
        );

        match &invocation.operation {
            Operation::ListAlerts(params) => {
                self.list(Collection::Alerts, params, explicit).await
            }
            Operation::ListDevices(params) => {
                self.list(Collection::Devices, params, explicit).await
            }
            Operation::ListGroups(params) => {
                self.list(Collection::Groups, params, explicit).await
            }
            Operation::GetAlert(params) => {
                self.client
                    .get_record(Collection::Alerts, &params.id, &Query::new(), explicit)
                    .await
            }
            Operation::GetGroup(params) => {
                self.client
                    .get_record(Collection::Groups, &params.id, &Query::new(), explicit)
                    .await
            }
            Operation::GetDevice(params) => {
                self.client
                    .get_record(
                        Collection::Devices,
                        &params.device_id(),
                        &params.query(),
                        explicit,
                    )
                    .await
            }
            Operation::TriggerAutomation(params) => {
                let body = params.payload.to_body()?;
                let response = self
                    .client
                    .trigger_automation_webhook(&params.token, &body)
                    .await?;
                Ok(vec![match response {
                    Value::Null => json!({}),
                    other => other,
                }])
            }
        }
    }

    /// First page, then either the remaining pages or a truncation to
    /// `limit`.
    async fn list<P: ListParams>(
        &self,
        collection: Collection,
        params: &P,
        explicit: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let options = params.options();
        options.validate()?;

        let first = self
            .client
            .list_page(collection, &params.page_query(), explicit)
            .await?;

        if options.return_all {
            return self
                .client
                .list_all(
                    collection,
                    &params.base_query(),
                    DEFAULT_PAGE_SIZE,
                    explicit,
                    Some(first),
                )
                .await;
        }

        let mut records = first;
        records.truncate(usize::try_from(options.limit).unwrap_or(usize::MAX));
        Ok(records)
    }

    /// Run every item in order.
    ///
    /// With [`FailurePolicy::Abort`] the first failure is returned with its
    /// item index. With [`FailurePolicy::ContinueOnFail`] it becomes an
    /// `{"error": message}` record for that item.
    pub async fn run_items(
        &self,
        items: &[Invocation],
        policy: FailurePolicy,
    ) -> Result<Vec<ItemOutput>, ItemError> {
        let mut out = Vec::new();

        for (item_index, invocation) in items.iter().enumerate() {
            match self.execute(invocation).await {
                Ok(records) => out.extend(
                    records
                        .into_iter()
                        .map(|json| ItemOutput { item_index, json }),
                ),
                Err(source) => {
                    let err = ItemError::new(item_index, source);
                    if policy == FailurePolicy::Abort {
                        return Err(err);
                    }
                    warn!(item_index, error = %err.message(), "item failed, continuing");
                    out.push(ItemOutput {
                        item_index,
                        json: json!({ "error": err.message() }),
                    });
                }
            }
        }

        Ok(out)
    }
}
