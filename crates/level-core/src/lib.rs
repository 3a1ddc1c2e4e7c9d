// level-core: Level resource operations, item execution, and device search.

pub mod error;
pub mod executor;
pub mod params;
pub mod resource;
pub mod search;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::ItemError;
pub use executor::{Executor, FailurePolicy, ItemOutput};
pub use params::{
    AlertListParams, AlertStatus, AutomationPayload, AutomationTriggerParams, DeviceGetParams,
    DeviceListParams, GetParams, GroupListParams, IncludeFlags, ListOptions, ListParams,
};
pub use resource::{Action, Invocation, Operation, Resource};
pub use search::{DeviceMatch, DeviceSearch, search_devices_by_hostname};
