// ── Resource / operation model ──
//
// Every selectable Level operation as one tagged enum. An `Invocation` is
// one input item: the operation plus the optional envelope property used
// to unwrap its response.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use level_api::Collection;

use crate::params::{
    AlertListParams, AutomationTriggerParams, DeviceGetParams, DeviceListParams, GetParams,
    GroupListParams, ListParams,
};

/// The resource an operation works on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Alerts,
    Devices,
    Groups,
    Automations,
}

impl Resource {
    /// The paginated collection behind this resource, if it has one.
    pub fn collection(self) -> Option<Collection> {
        match self {
            Self::Alerts => Some(Collection::Alerts),
            Self::Devices => Some(Collection::Devices),
            Self::Groups => Some(Collection::Groups),
            Self::Automations => None,
        }
    }
}

/// What an operation does to its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Get,
    Trigger,
}

/// One selectable operation with its typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    // ── Alerts ──────────────────────────────────────────────────────
    ListAlerts(AlertListParams),
    GetAlert(GetParams),

    // ── Devices ─────────────────────────────────────────────────────
    ListDevices(DeviceListParams),
    GetDevice(DeviceGetParams),

    // ── Groups ──────────────────────────────────────────────────────
    ListGroups(GroupListParams),
    GetGroup(GetParams),

    // ── Automations ─────────────────────────────────────────────────
    TriggerAutomation(AutomationTriggerParams),
}

impl Operation {
    pub fn resource(&self) -> Resource {
        match self {
            Self::ListAlerts(_) | Self::GetAlert(_) => Resource::Alerts,
            Self::ListDevices(_) | Self::GetDevice(_) => Resource::Devices,
            Self::ListGroups(_) | Self::GetGroup(_) => Resource::Groups,
            Self::TriggerAutomation(_) => Resource::Automations,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::ListAlerts(_) | Self::ListDevices(_) | Self::ListGroups(_) => Action::List,
            Self::GetAlert(_) | Self::GetDevice(_) | Self::GetGroup(_) => Action::Get,
            Self::TriggerAutomation(_) => Action::Trigger,
        }
    }

    /// The list parameters, for list operations.
    pub fn list_params(&self) -> Option<&dyn ListParams> {
        let params: &dyn ListParams = match self {
            Self::ListAlerts(p) => p,
            Self::ListDevices(p) => p,
            Self::ListGroups(p) => p,
            _ => return None,
        };
        Some(params)
    }
}

/// One input item: an operation and how to unwrap its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(flatten)]
    pub operation: Operation,
    /// Envelope key holding the records. Empty means "probe the defaults".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_property: Option<String>,
}

impl Invocation {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            response_property: None,
        }
    }

    pub fn with_response_property(mut self, property: impl Into<String>) -> Self {
        self.response_property = Some(property.into());
        self
    }

    /// The explicit property, with blanks treated as unset.
    pub fn explicit_property(&self) -> Option<&str> {
        self.response_property
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

impl From<Operation> for Invocation {
    fn from(operation: Operation) -> Self {
        Self::new(operation)
    }
}
