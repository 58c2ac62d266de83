use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Inactive,
    Background,
}

/// The two states the timer actually accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Foregrounded,
    Backgrounded,
}

impl LifecycleState {
    pub fn phase(self) -> Phase {
        match self {
            LifecycleState::Active => Phase::Foregrounded,
            LifecycleState::Inactive | LifecycleState::Background => Phase::Backgrounded,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Inactive => "inactive",
            LifecycleState::Background => "background",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LifecycleState::Active),
            "inactive" => Ok(LifecycleState::Inactive),
            "background" => Ok(LifecycleState::Background),
            other => Err(anyhow::anyhow!("Unknown lifecycle state: {:?}", other)),
        }
    }
}

/// Which calendar the stored date is computed in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateBasis {
    #[default]
    Utc,
    Local,
}
