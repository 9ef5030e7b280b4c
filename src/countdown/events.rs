//! Lifecycle events and the emission policy

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::CountdownError, state::TimeUnits};

/// Lifecycle notification names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Start,
    Count,
    VisibilityHidden,
    VisibilityVisible,
    Pause,
    Continue,
    End,
    Finish,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        Self::Start,
        Self::Count,
        Self::VisibilityHidden,
        Self::VisibilityVisible,
        Self::Pause,
        Self::Continue,
        Self::End,
        Self::Finish,
    ];

    /// Wire name, e.g. `visibility-hidden`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Count => "count",
            Self::VisibilityHidden => "visibility-hidden",
            Self::VisibilityVisible => "visibility-visible",
            Self::Pause => "pause",
            Self::Continue => "continue",
            Self::End => "end",
            Self::Finish => "finish",
        }
    }

    /// camelCase key used in allow-maps, e.g. `visibilityHidden`
    pub fn camel_name(self) -> &'static str {
        match self {
            Self::VisibilityHidden => "visibilityHidden",
            Self::VisibilityVisible => "visibilityVisible",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CountdownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name || kind.camel_name() == name)
            .ok_or_else(|| CountdownError::UnknownEvent(name.to_string()))
    }
}

/// A delivered notification with the time-unit snapshot at emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownEvent {
    pub kind: EventKind,
    pub units: TimeUnits,
}

/// Which lifecycle notifications get delivered to observers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub enum EmitPolicy {
    #[default]
    All,
    None,
    /// Per-event allow-map; missing events are not delivered
    Selected(BTreeMap<EventKind, bool>),
}

impl EmitPolicy {
    /// Allow exactly the given events
    pub fn only(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self::Selected(kinds.into_iter().map(|kind| (kind, true)).collect())
    }

    pub fn allows(&self, kind: EventKind) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Selected(map) => map.get(&kind).copied().unwrap_or(false),
        }
    }
}

impl FromStr for EmitPolicy {
    type Err = CountdownError;

    /// `all`/`true`, `none`/`false`, or a comma-separated list of event names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "true" => Ok(Self::All),
            "none" | "false" | "" => Ok(Self::None),
            list => list
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(EventKind::from_str)
                .collect::<Result<Vec<_>, _>>()
                .map(|kinds| Self::only(kinds)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Flag(bool),
    Map(BTreeMap<String, bool>),
}

impl TryFrom<PolicyRepr> for EmitPolicy {
    type Error = CountdownError;

    fn try_from(repr: PolicyRepr) -> Result<Self, Self::Error> {
        match repr {
            PolicyRepr::Flag(true) => Ok(Self::All),
            PolicyRepr::Flag(false) => Ok(Self::None),
            PolicyRepr::Map(map) => map
                .into_iter()
                .map(|(name, enabled)| name.parse::<EventKind>().map(|kind| (kind, enabled)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Self::Selected),
        }
    }
}

impl From<EmitPolicy> for PolicyRepr {
    fn from(policy: EmitPolicy) -> Self {
        match policy {
            EmitPolicy::All => Self::Flag(true),
            EmitPolicy::None => Self::Flag(false),
            EmitPolicy::Selected(map) => Self::Map(
                map.into_iter()
                    .map(|(kind, enabled)| (kind.camel_name().to_string(), enabled))
                    .collect(),
            ),
        }
    }
}
