//! Worker lifecycle phases and the host's page-control capability.

use std::fmt;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Where a worker instance is in its lifecycle.
///
/// Phases only move forward: `Parsed → Installing → Installed → Activating →
/// Activated`. A failed install or activation ends in `Redundant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Parsed => "parsed",
            LifecyclePhase::Installing => "installing",
            LifecyclePhase::Installed => "installed",
            LifecyclePhase::Activating => "activating",
            LifecyclePhase::Activated => "activated",
            LifecyclePhase::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Host capability to make this worker authoritative for pages that are
/// already open.
#[async_trait]
pub trait PageControl: Send + Sync {
    async fn claim(&self) -> Result<(), Error>;
}
